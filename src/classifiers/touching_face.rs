//! Face-touching detection.
//!
//! The touch distance is scaled by shoulder width so the same configuration
//! works whether the presenter stands close to or far from the camera.

use super::{classify_each, ClassificationMap, PostureClassifier};
use crate::config::Config;
use crate::geometry::{BodyGeometry, FrameGeometry};

/// Stateless face-touching classifier
#[derive(Debug, Clone)]
pub struct TouchingFaceClassifier {
    visibility_threshold: f64,
    distance_scale: f64,
}

impl TouchingFaceClassifier {
    /// Create a classifier from the pipeline configuration
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            visibility_threshold: config.thresholds.visibility_threshold,
            distance_scale: config.thresholds.face_touch_distance_scale,
        }
    }

    /// Whether either visible wrist is within the scaled touch distance of the face centroid
    #[must_use]
    pub fn is_face_touched(&self, geometry: &BodyGeometry) -> bool {
        let (Some(face), Some(shoulder_width)) = (geometry.face_centroid, geometry.shoulder_width) else {
            return false;
        };
        let threshold = self.distance_scale * shoulder_width;

        [geometry.left_wrist, geometry.right_wrist]
            .into_iter()
            .flatten()
            .any(|wrist| nalgebra::distance(&wrist, &face) < threshold)
    }
}

impl PostureClassifier for TouchingFaceClassifier {
    fn classify_geometry(&mut self, geometry: &FrameGeometry) -> ClassificationMap {
        classify_each(geometry, |body| self.is_face_touched(body))
    }

    fn visibility_threshold(&self) -> f64 {
        self.visibility_threshold
    }

    fn name(&self) -> &str {
        "touching_face"
    }
}
