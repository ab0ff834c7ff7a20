//! Merges the per-classifier verdict maps into one annotation per track.
//!
//! Aggregation is a pure function of its inputs: running it twice on the same
//! frame and classifier outputs gives identical annotations.

use crate::classifiers::ClassificationMap;
use crate::frame::{Frame, TrackId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Posture verdicts for one track in one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PostureAnnotation {
    pub arms_folded: bool,
    pub touching_face: bool,
    pub is_leaning: bool,
}

impl PostureAnnotation {
    /// Whether any detrimental behaviour is flagged
    #[must_use]
    pub fn any(&self) -> bool {
        self.arms_folded || self.touching_face || self.is_leaning
    }

    /// Display labels of the flagged behaviours
    #[must_use]
    pub fn labels(&self) -> Vec<&'static str> {
        [
            (self.arms_folded, "Arms Folded"),
            (self.is_leaning, "Leaning"),
            (self.touching_face, "Touching Face"),
        ]
        .into_iter()
        .filter_map(|(flag, label)| flag.then_some(label))
        .collect()
    }
}

/// Everything the classifiers produced for one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassifierOutputs {
    pub arms_folded: ClassificationMap,
    pub touching_face: ClassificationMap,
    pub leaning: ClassificationMap,
    /// Posture quality of tracks the leaning classifier holds state for
    pub posture_quality: BTreeMap<TrackId, f64>,
}

/// Frame-level metadata for the overlay
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameSummary {
    pub frame_index: u64,
    /// Measured frames per second
    pub fps: f64,
    /// Tracks present in this frame
    pub active_tracks: usize,
}

/// Annotations for every track in a frame plus the frame summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameAnnotations {
    pub summary: FrameSummary,
    pub annotations: BTreeMap<TrackId, PostureAnnotation>,
}

/// Stateless merge of classifier outputs
#[derive(Debug, Clone, Copy, Default)]
pub struct Aggregator;

impl Aggregator {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Build the annotation for every track present in `frame`.
    ///
    /// A track absent from a classifier's map takes that classifier's
    /// fail-safe value, `false`.
    #[must_use]
    pub fn aggregate(&self, frame: &Frame, outputs: &ClassifierOutputs, fps: f64) -> FrameAnnotations {
        let verdict = |map: &ClassificationMap, id: TrackId| map.get(&id).copied().unwrap_or(false);

        let annotations: BTreeMap<TrackId, PostureAnnotation> = frame
            .track_ids()
            .map(|id| {
                (
                    id,
                    PostureAnnotation {
                        arms_folded: verdict(&outputs.arms_folded, id),
                        touching_face: verdict(&outputs.touching_face, id),
                        is_leaning: verdict(&outputs.leaning, id),
                    },
                )
            })
            .collect();

        FrameAnnotations {
            summary: FrameSummary {
                frame_index: frame.index,
                fps,
                active_tracks: annotations.len(),
            },
            annotations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{BoundingBox, Detection};

    fn frame(ids: &[TrackId]) -> Frame {
        let detections = ids
            .iter()
            .map(|&id| Detection::new(id, BoundingBox::default(), 0.9, Vec::new()))
            .collect();
        Frame::new(12, 0.4, detections)
    }

    #[test]
    fn test_merge_and_defaults() {
        let mut outputs = ClassifierOutputs::default();
        outputs.arms_folded.insert(1, true);
        outputs.leaning.insert(2, true);
        outputs.touching_face.insert(99, true);

        let result = Aggregator::new().aggregate(&frame(&[1, 2]), &outputs, 25.0);

        assert_eq!(result.summary.active_tracks, 2);
        assert_eq!(result.summary.frame_index, 12);
        assert_eq!(
            result.annotations[&1],
            PostureAnnotation {
                arms_folded: true,
                touching_face: false,
                is_leaning: false
            }
        );
        assert!(result.annotations[&2].is_leaning);
        assert!(!result.annotations.contains_key(&99));
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let mut outputs = ClassifierOutputs::default();
        outputs.touching_face.insert(3, true);
        let f = frame(&[3, 4]);
        let aggregator = Aggregator::new();

        assert_eq!(aggregator.aggregate(&f, &outputs, 30.0), aggregator.aggregate(&f, &outputs, 30.0));
    }

    #[test]
    fn test_labels() {
        let annotation = PostureAnnotation {
            arms_folded: true,
            touching_face: true,
            is_leaning: false,
        };
        assert!(annotation.any());
        assert_eq!(annotation.labels(), vec!["Arms Folded", "Touching Face"]);
        assert!(PostureAnnotation::default().labels().is_empty());
    }
}
