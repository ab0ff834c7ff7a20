//! Overlay text layout.
//!
//! Rendering produces positioned text items in image coordinates. Drawing
//! them onto pixels is left to the consumer of the report.

use crate::aggregator::FrameAnnotations;
use crate::config::Config;
use crate::constants::{OVERLAY_BASE_LINES, OVERLAY_LINE_HEIGHT};
use crate::frame::{Frame, KeypointIndex, TrackId};
use crate::stats::{SessionStats, LEGEND_HEADER};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Position of the frame header
const HEADER_ORIGIN: (f64, f64) = (10.0, 30.0);

/// Position of the legend header line
const LEGEND_ORIGIN: (f64, f64) = (50.0, 70.0);

/// Text colours used on the overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Colour {
    White,
    Blue,
    Green,
}

impl Colour {
    /// Blue, green, red channel values
    #[must_use]
    pub const fn bgr(self) -> [u8; 3] {
        match self {
            Self::White => [255, 255, 255],
            Self::Blue => [255, 0, 0],
            Self::Green => [0, 255, 0],
        }
    }
}

/// One piece of positioned text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayText {
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub colour: Colour,
    pub scale: f64,
}

impl OverlayText {
    fn new(x: f64, y: f64, text: impl Into<String>, colour: Colour, scale: f64) -> Self {
        Self {
            x,
            y,
            text: text.into(),
            colour,
            scale,
        }
    }
}

/// Text lines drawn for one person, stacked upwards from the bounding box
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackLabel {
    pub tracking_id: TrackId,
    pub lines: Vec<OverlayText>,
}

/// Everything drawn on top of one frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    pub header: Vec<OverlayText>,
    pub labels: Vec<TrackLabel>,
    pub keypoint_labels: Vec<OverlayText>,
    pub legend: Vec<OverlayText>,
}

impl Overlay {
    /// Every text item in draw order
    pub fn texts(&self) -> impl Iterator<Item = &OverlayText> {
        self.header
            .iter()
            .chain(self.labels.iter().flat_map(|label| label.lines.iter()))
            .chain(self.keypoint_labels.iter())
            .chain(self.legend.iter())
    }
}

/// Lays out overlay text for annotated frames
#[derive(Debug, Clone)]
pub struct OverlayRenderer {
    visibility_threshold: f64,
    show_keypoints: bool,
    show_legend: bool,
}

impl OverlayRenderer {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            visibility_threshold: config.thresholds.visibility_threshold,
            show_keypoints: config.display.show_keypoints,
            show_legend: config.display.show_legend,
        }
    }

    /// Lay out the overlay for a frame
    #[must_use]
    pub fn render(
        &self,
        frame: &Frame,
        annotations: &FrameAnnotations,
        posture_quality: &BTreeMap<TrackId, f64>,
        stats: &SessionStats,
    ) -> Overlay {
        let summary = &annotations.summary;
        let header = vec![OverlayText::new(
            HEADER_ORIGIN.0,
            HEADER_ORIGIN.1,
            format!("FPS: {:.1}  Tracks: {}", summary.fps, summary.active_tracks),
            Colour::Green,
            1.0,
        )];

        let labels = annotations
            .annotations
            .iter()
            .filter_map(|(&id, annotation)| {
                let detection = frame.detection(id)?;
                let (x, y) = detection.bounding_box.bottom_left();
                let mut line = OVERLAY_BASE_LINES;
                let mut next_y = || {
                    #[allow(clippy::cast_precision_loss)]
                    let offset = line as f64 * OVERLAY_LINE_HEIGHT;
                    line += 1;
                    y - offset
                };

                let mut lines = vec![OverlayText::new(
                    x,
                    next_y(),
                    format!("ID {id} BBox {:.2}", detection.confidence),
                    Colour::White,
                    1.0,
                )];
                for label in annotation.labels() {
                    lines.push(OverlayText::new(x, next_y(), label, Colour::Blue, 1.0));
                }
                if let Some(quality) = posture_quality.get(&id) {
                    lines.push(OverlayText::new(
                        x,
                        next_y(),
                        format!("Posture {:.0}%", quality * 100.0),
                        Colour::White,
                        1.0,
                    ));
                }

                Some(TrackLabel { tracking_id: id, lines })
            })
            .collect();

        let keypoint_labels = if self.show_keypoints {
            self.keypoint_labels(frame)
        } else {
            Vec::new()
        };

        let legend = if self.show_legend {
            Self::legend(stats)
        } else {
            Vec::new()
        };

        Overlay {
            header,
            labels,
            keypoint_labels,
            legend,
        }
    }

    fn keypoint_labels(&self, frame: &Frame) -> Vec<OverlayText> {
        frame
            .detections()
            .iter()
            .flat_map(|detection| {
                KeypointIndex::ALL
                    .iter()
                    .filter_map(move |&joint| detection.visible_point(joint, self.visibility_threshold))
            })
            .map(|point| {
                OverlayText::new(
                    point.x,
                    point.y,
                    format!("({:.0}, {:.0})", point.x, point.y),
                    Colour::White,
                    0.5,
                )
            })
            .collect()
    }

    fn legend(stats: &SessionStats) -> Vec<OverlayText> {
        let (x, y) = LEGEND_ORIGIN;
        std::iter::once(OverlayText::new(x, y, LEGEND_HEADER, Colour::White, 0.7))
            .chain(stats.legend_rows().into_iter().enumerate().map(|(i, row)| {
                #[allow(clippy::cast_precision_loss)]
                let row_y = y + (i + 1) as f64 * OVERLAY_LINE_HEIGHT;
                OverlayText::new(x, row_y, row, Colour::Blue, 0.7)
            }))
            .collect()
    }
}
