//! Per-frame posture pipeline.
//!
//! Body geometry is extracted once per frame, then flows through the
//! classifiers in a fixed order, the aggregator, the session statistics and
//! the overlay renderer. Frames must be
//! fed in stream order; the leaning classifier's history depends on it.

use crate::aggregator::{Aggregator, ClassifierOutputs, FrameAnnotations};
use crate::classifiers::{ArmsFoldedClassifier, LeaningClassifier, PostureClassifier, TouchingFaceClassifier};
use crate::config::Config;
use crate::error::Result;
use crate::fps::FpsCounter;
use crate::frame::Frame;
use crate::geometry::FrameGeometry;
use crate::overlay::{Overlay, OverlayRenderer};
use crate::stats::SessionStats;
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Upstream collaborator producing tracked frames
pub trait FrameSource {
    /// Next frame, or `None` at end of stream
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying stream fails
    fn next_frame(&mut self) -> Result<Option<Frame>>;
}

/// Downstream collaborator consuming frame reports
pub trait FrameSink {
    /// Accept the report for one frame
    ///
    /// # Errors
    ///
    /// Returns an error if the report cannot be delivered
    fn write_report(&mut self, report: &FrameReport) -> Result<()>;

    /// Flush buffered reports
    ///
    /// # Errors
    ///
    /// Returns an error if the flush fails
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Frame source backed by any iterator of frames
#[derive(Debug, Clone)]
pub struct IterSource<I>(pub I);

impl<I: Iterator<Item = Frame>> FrameSource for IterSource<I> {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        Ok(self.0.next())
    }
}

impl FrameSink for Vec<FrameReport> {
    fn write_report(&mut self, report: &FrameReport) -> Result<()> {
        self.push(report.clone());
        Ok(())
    }
}

/// Output of the pipeline for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    pub annotations: FrameAnnotations,
    pub overlay: Overlay,
}

/// Posture analysis pipeline
pub struct PosturePipeline {
    config: Config,
    arms_folded: ArmsFoldedClassifier,
    touching_face: TouchingFaceClassifier,
    leaning: LeaningClassifier,
    aggregator: Aggregator,
    renderer: OverlayRenderer,
    fps: FpsCounter,
    stats: SessionStats,
}

impl PosturePipeline {
    /// Create a pipeline from a configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the configuration is invalid
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        info!("Initializing posture pipeline");
        debug!("Configuration: {config:?}");

        Ok(Self {
            arms_folded: ArmsFoldedClassifier::new(&config),
            touching_face: TouchingFaceClassifier::new(&config),
            leaning: LeaningClassifier::new(&config)?,
            aggregator: Aggregator::new(),
            renderer: OverlayRenderer::new(&config),
            fps: FpsCounter::new(),
            stats: SessionStats::from_config(&config),
            config,
        })
    }

    /// Analyse one frame
    pub fn process_frame(&mut self, frame: &Frame) -> FrameReport {
        let fps = self.fps.tick(frame.timestamp);

        let geometry = FrameGeometry::extract(frame, self.config.thresholds.visibility_threshold);
        let arms_folded = self.arms_folded.classify_geometry(&geometry);
        let touching_face = self.touching_face.classify_geometry(&geometry);
        let leaning = self.leaning.classify_geometry(&geometry);
        let posture_quality = frame
            .track_ids()
            .filter_map(|id| self.leaning.posture_quality(id).map(|q| (id, q)))
            .collect();
        let outputs = ClassifierOutputs {
            arms_folded,
            touching_face,
            leaning,
            posture_quality,
        };

        let annotations = self.aggregator.aggregate(frame, &outputs, fps);
        self.stats.record(&annotations);
        let overlay = self
            .renderer
            .render(frame, &annotations, &outputs.posture_quality, &self.stats);

        let interval = self.config.display.summary_interval_frames;
        if interval > 0 && self.stats.frames() % interval == 0 {
            self.stats.log_summary();
        }

        FrameReport { annotations, overlay }
    }

    /// Process frames from `source` until end of stream, writing one report per frame
    ///
    /// # Errors
    ///
    /// Returns the first error raised by the source or the sink
    pub fn run(&mut self, source: &mut dyn FrameSource, sink: &mut dyn FrameSink) -> Result<u64> {
        info!("Starting posture analysis");

        let mut frame_count = 0;
        while let Some(frame) = source.next_frame()? {
            let report = self.process_frame(&frame);
            sink.write_report(&report)?;
            frame_count += 1;
        }
        sink.flush()?;

        info!("End of stream after {frame_count} frames");
        self.stats.log_summary();
        Ok(frame_count)
    }

    /// Drop all per-track history and statistics
    pub fn reset(&mut self) {
        self.leaning.reset();
        self.fps.reset();
        self.stats = SessionStats::from_config(&self.config);
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    #[must_use]
    pub fn leaning(&self) -> &LeaningClassifier {
        &self.leaning
    }
}
