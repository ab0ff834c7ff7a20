//! Folded-arms detection.
//!
//! An arm counts as folded when its wrist has been carried across the body:
//! horizontally the wrist sits between the body midline and the opposite
//! elbow, give or take a margin proportional to shoulder width. Each frame is
//! judged on its own.

use super::{classify_each, ClassificationMap, PostureClassifier};
use crate::config::Config;
use crate::geometry::{ArmGeometry, BodyGeometry, FrameGeometry};

/// Stateless folded-arms classifier
#[derive(Debug, Clone)]
pub struct ArmsFoldedClassifier {
    visibility_threshold: f64,
    overlap_margin: f64,
    max_elbow_angle_deg: f64,
    min_forearm_ratio: f64,
}

impl ArmsFoldedClassifier {
    /// Create a classifier from the pipeline configuration
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            visibility_threshold: config.thresholds.visibility_threshold,
            overlap_margin: config.thresholds.arm_overlap_margin,
            max_elbow_angle_deg: config.arms_folded.max_elbow_angle_deg,
            min_forearm_ratio: config.arms_folded.min_forearm_ratio,
        }
    }

    /// Whether both arms are folded. Missing joints on either arm give `false`.
    #[must_use]
    pub fn are_arms_folded(&self, geometry: &BodyGeometry) -> bool {
        let (Some(left), Some(right), Some(shoulder_width)) =
            (geometry.left_arm.as_ref(), geometry.right_arm.as_ref(), geometry.shoulder_width)
        else {
            return false;
        };
        if shoulder_width <= 0.0 {
            return false;
        }

        // Unit direction from the body midline towards the person's left side
        let left_direction = (left.shoulder.x - right.shoulder.x).signum();
        let midline = (left.shoulder.x + right.shoulder.x) / 2.0;
        let margin = self.overlap_margin * shoulder_width;
        let shoulder_line = left.shoulder.y.min(right.shoulder.y);

        self.is_arm_folded(left, right, left_direction, midline, margin, shoulder_line, shoulder_width)
            && self.is_arm_folded(right, left, -left_direction, midline, margin, shoulder_line, shoulder_width)
    }

    /// One arm is folded if its wrist lies between the midline and the
    /// opposite elbow, below the shoulders, with the elbow bent.
    #[allow(clippy::too_many_arguments)]
    fn is_arm_folded(
        &self,
        arm: &ArmGeometry,
        opposite: &ArmGeometry,
        own_side: f64,
        midline: f64,
        margin: f64,
        shoulder_line: f64,
        shoulder_width: f64,
    ) -> bool {
        // Lateral offsets measured positive towards this arm's own side
        let wrist_offset = (arm.wrist.x - midline) * own_side;
        let opposite_elbow_offset = (opposite.elbow.x - midline) * own_side;

        let crosses_body = wrist_offset <= margin && wrist_offset >= opposite_elbow_offset - margin;
        let below_shoulders = arm.wrist.y > shoulder_line;
        let forearm_long_enough = arm.forearm_length() >= self.min_forearm_ratio * shoulder_width;
        let elbow_bent = arm
            .elbow_angle_deg()
            .is_some_and(|angle| angle < self.max_elbow_angle_deg);

        crosses_body && below_shoulders && forearm_long_enough && elbow_bent
    }
}

impl PostureClassifier for ArmsFoldedClassifier {
    fn classify_geometry(&mut self, geometry: &FrameGeometry) -> ClassificationMap {
        classify_each(geometry, |body| self.are_arms_folded(body))
    }

    fn visibility_threshold(&self) -> f64 {
        self.visibility_threshold
    }

    fn name(&self) -> &str {
        "arms_folded"
    }
}
