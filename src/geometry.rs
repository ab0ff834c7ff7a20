//! Geometry extraction from a single detection's keypoints.
//!
//! Every derived quantity is optional: if any joint it depends on is below the
//! visibility threshold, the quantity is absent instead of being computed from
//! placeholder coordinates.

use crate::constants::EPSILON;
use crate::frame::{Detection, Frame, KeypointIndex, TrackId};
use nalgebra::{Point2, Vector2};

/// Angle between two vectors in radians, in `[0, π]`.
///
/// Returns `None` if either vector has (near) zero length.
#[must_use]
pub fn angle_between_vectors(a: &Vector2<f64>, b: &Vector2<f64>) -> Option<f64> {
    let norms = a.norm() * b.norm();
    if !norms.is_finite() || norms < EPSILON {
        return None;
    }

    // Rounding can push the cosine marginally outside the acos domain
    let cos = (a.dot(b) / norms).clamp(-1.0, 1.0);
    Some(cos.acos())
}

/// Signed tilt of a bottom-to-top torso vector away from vertical, in degrees.
///
/// Zero means upright. Positive values lean towards increasing x. Image y grows
/// downward, so "up" is `(0, -1)`.
#[must_use]
pub fn tilt_from_vertical_deg(torso: &Vector2<f64>) -> Option<f64> {
    if !torso.x.is_finite() || !torso.y.is_finite() || torso.norm() < EPSILON {
        return None;
    }
    Some(torso.x.atan2(-torso.y).to_degrees())
}

/// Joints and segments of one arm
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArmGeometry {
    pub shoulder: Point2<f64>,
    pub elbow: Point2<f64>,
    pub wrist: Point2<f64>,
    /// Shoulder to elbow
    pub upper_arm: Vector2<f64>,
    /// Elbow to wrist
    pub forearm: Vector2<f64>,
}

impl ArmGeometry {
    fn new(shoulder: Point2<f64>, elbow: Point2<f64>, wrist: Point2<f64>) -> Self {
        Self {
            shoulder,
            elbow,
            wrist,
            upper_arm: elbow - shoulder,
            forearm: wrist - elbow,
        }
    }

    /// Interior shoulder-elbow-wrist angle in degrees; 180 is a straight arm
    #[must_use]
    pub fn elbow_angle_deg(&self) -> Option<f64> {
        angle_between_vectors(&(-self.upper_arm), &self.forearm).map(f64::to_degrees)
    }

    #[must_use]
    pub fn forearm_length(&self) -> f64 {
        self.forearm.norm()
    }
}

/// Normalised body measurements for one tracked person in one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BodyGeometry {
    pub left_shoulder: Option<Point2<f64>>,
    pub right_shoulder: Option<Point2<f64>>,
    pub left_wrist: Option<Point2<f64>>,
    pub right_wrist: Option<Point2<f64>>,
    /// Present only when shoulder, elbow and wrist are all visible
    pub left_arm: Option<ArmGeometry>,
    pub right_arm: Option<ArmGeometry>,
    pub shoulder_midpoint: Option<Point2<f64>>,
    pub hip_midpoint: Option<Point2<f64>>,
    /// Distance between the shoulders, the body-size normaliser
    pub shoulder_width: Option<f64>,
    /// Hip midpoint to shoulder midpoint
    pub torso: Option<Vector2<f64>>,
    /// Signed torso tilt from vertical in degrees
    pub torso_tilt_deg: Option<f64>,
    /// Mean of the visible face joints
    pub face_centroid: Option<Point2<f64>>,
}

impl BodyGeometry {
    /// Extract geometry using only joints visible at `visibility_threshold`
    #[must_use]
    pub fn extract(detection: &Detection, visibility_threshold: f64) -> Self {
        let joint = |index| detection.visible_point(index, visibility_threshold);

        let left_shoulder = joint(KeypointIndex::LeftShoulder);
        let right_shoulder = joint(KeypointIndex::RightShoulder);
        let left_elbow = joint(KeypointIndex::LeftElbow);
        let right_elbow = joint(KeypointIndex::RightElbow);
        let left_wrist = joint(KeypointIndex::LeftWrist);
        let right_wrist = joint(KeypointIndex::RightWrist);
        let left_hip = joint(KeypointIndex::LeftHip);
        let right_hip = joint(KeypointIndex::RightHip);

        let left_arm = match (left_shoulder, left_elbow, left_wrist) {
            (Some(s), Some(e), Some(w)) => Some(ArmGeometry::new(s, e, w)),
            _ => None,
        };
        let right_arm = match (right_shoulder, right_elbow, right_wrist) {
            (Some(s), Some(e), Some(w)) => Some(ArmGeometry::new(s, e, w)),
            _ => None,
        };

        let shoulder_midpoint = midpoint(left_shoulder, right_shoulder);
        let hip_midpoint = midpoint(left_hip, right_hip);
        let shoulder_width = match (left_shoulder, right_shoulder) {
            (Some(l), Some(r)) => Some(nalgebra::distance(&l, &r)),
            _ => None,
        };

        let torso = match (hip_midpoint, shoulder_midpoint) {
            (Some(hip), Some(shoulder)) => Some(shoulder - hip),
            _ => None,
        };
        let torso_tilt_deg = torso.as_ref().and_then(tilt_from_vertical_deg);

        let face: Vec<Point2<f64>> = KeypointIndex::FACE.iter().filter_map(|&j| joint(j)).collect();
        let face_centroid = centroid(&face);

        Self {
            left_shoulder,
            right_shoulder,
            left_wrist,
            right_wrist,
            left_arm,
            right_arm,
            shoulder_midpoint,
            hip_midpoint,
            shoulder_width,
            torso,
            torso_tilt_deg,
            face_centroid,
        }
    }
}

/// Body geometry of every detection in a frame, in detection order
///
/// Extracted once per frame and shared by all classifiers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameGeometry {
    bodies: Vec<(TrackId, BodyGeometry)>,
}

impl FrameGeometry {
    #[must_use]
    pub fn extract(frame: &Frame, visibility_threshold: f64) -> Self {
        Self {
            bodies: frame
                .detections()
                .iter()
                .map(|detection| {
                    (
                        detection.tracking_id,
                        BodyGeometry::extract(detection, visibility_threshold),
                    )
                })
                .collect(),
        }
    }

    /// Tracking ids with their geometry
    pub fn iter(&self) -> impl Iterator<Item = (TrackId, &BodyGeometry)> + '_ {
        self.bodies.iter().map(|(id, body)| (*id, body))
    }

    /// Geometry of one tracking id
    #[must_use]
    pub fn body(&self, tracking_id: TrackId) -> Option<&BodyGeometry> {
        self.bodies.iter().find(|(id, _)| *id == tracking_id).map(|(_, body)| body)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}

fn midpoint(a: Option<Point2<f64>>, b: Option<Point2<f64>>) -> Option<Point2<f64>> {
    match (a, b) {
        (Some(a), Some(b)) => Some(nalgebra::center(&a, &b)),
        _ => None,
    }
}

#[allow(clippy::cast_precision_loss)] // Face has at most five joints
fn centroid(points: &[Point2<f64>]) -> Option<Point2<f64>> {
    if points.is_empty() {
        return None;
    }
    let sum = points.iter().fold(Vector2::zeros(), |acc, p| acc + p.coords);
    Some(Point2::from(sum / points.len() as f64))
}
