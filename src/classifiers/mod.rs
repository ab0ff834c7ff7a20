//! Per-track posture classifiers.
//!
//! Every classifier has the same shape: the body geometry of a frame's tracked
//! detections in, a map from tracking id to verdict out. A tracking id whose
//! keypoints are too sparse to judge gets `false`, so the map always covers
//! every id in the frame.

/// Folded arms across the body
pub mod arms_folded;

/// Torso leaning and swaying, with per-track history
pub mod leaning;

/// Wrist near the face
pub mod touching_face;

use crate::frame::{Frame, TrackId};
use crate::geometry::{BodyGeometry, FrameGeometry};
use std::collections::BTreeMap;

pub use arms_folded::ArmsFoldedClassifier;
pub use leaning::{LeaningClassifier, TrackState};
pub use touching_face::TouchingFaceClassifier;

/// Verdict per tracking id, ordered by id
pub type ClassificationMap = BTreeMap<TrackId, bool>;

/// Trait for all posture classifiers
pub trait PostureClassifier: Send {
    /// Classify every body in a frame's extracted geometry
    fn classify_geometry(&mut self, geometry: &FrameGeometry) -> ClassificationMap;

    /// Minimum keypoint score for a joint to be used
    fn visibility_threshold(&self) -> f64;

    /// Extract geometry from the frame and classify every detection
    fn classify(&mut self, frame: &Frame) -> ClassificationMap {
        let geometry = FrameGeometry::extract(frame, self.visibility_threshold());
        self.classify_geometry(&geometry)
    }

    /// Forget any state carried between frames
    fn reset(&mut self) {}

    /// Get classifier name
    fn name(&self) -> &str;
}

/// Apply a single-frame geometric test to each body
pub(crate) fn classify_each<F>(geometry: &FrameGeometry, test: F) -> ClassificationMap
where
    F: Fn(&BodyGeometry) -> bool,
{
    geometry.iter().map(|(id, body)| (id, test(body))).collect()
}
