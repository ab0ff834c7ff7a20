//! Per-frame perception data supplied by the upstream detection, pose and
//! tracking stages.
//!
//! Keypoints follow the 17-joint COCO layout. Coordinates may be in pixels or
//! relative to the image size; every classifier works with ratios and angles so
//! the unit does not matter, as long as the y axis points down the image.

use crate::constants::NUM_BODY_KEYPOINTS;
use log::warn;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Stable identifier the upstream tracker assigns to one physical person
///
/// Signed: some trackers report negative ids for tentative tracks.
pub type TrackId = i64;

/// Named body joints in COCO order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeypointIndex {
    Nose,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

impl KeypointIndex {
    /// All joints in the order they appear in a keypoint list
    pub const ALL: [Self; NUM_BODY_KEYPOINTS] = [
        Self::Nose,
        Self::LeftEye,
        Self::RightEye,
        Self::LeftEar,
        Self::RightEar,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
    ];

    /// Joints that make up the face region
    pub const FACE: [Self; 5] = [Self::Nose, Self::LeftEye, Self::RightEye, Self::LeftEar, Self::RightEar];

    /// Position of this joint in a keypoint list
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Snake case joint name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::LeftEye => "left_eye",
            Self::RightEye => "right_eye",
            Self::LeftEar => "left_ear",
            Self::RightEar => "right_ear",
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
            Self::LeftElbow => "left_elbow",
            Self::RightElbow => "right_elbow",
            Self::LeftWrist => "left_wrist",
            Self::RightWrist => "right_wrist",
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::LeftAnkle => "left_ankle",
            Self::RightAnkle => "right_ankle",
        }
    }
}

/// A single 2D joint location with its visibility score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate, growing down the image
    pub y: f64,
    /// Visibility confidence (0.0-1.0)
    pub score: f64,
}

impl Keypoint {
    /// Create a keypoint
    #[must_use]
    pub const fn new(x: f64, y: f64, score: f64) -> Self {
        Self { x, y, score }
    }

    /// Whether the joint is usable at the given visibility threshold.
    ///
    /// Non-finite coordinates or scores never count as visible.
    #[must_use]
    pub fn is_visible(&self, threshold: f64) -> bool {
        self.score >= threshold && self.x.is_finite() && self.y.is_finite()
    }

    /// Location as a point
    #[must_use]
    pub fn point(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }
}

/// Axis-aligned bounding box given by its top-left and bottom-right corners
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl BoundingBox {
    /// Create a bounding box
    #[must_use]
    pub const fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Bottom-left corner, where per-person overlay text is anchored
    #[must_use]
    pub fn bottom_left(&self) -> (f64, f64) {
        (self.x1.min(self.x2), self.y1.max(self.y2))
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        (self.x2 - self.x1).abs()
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        (self.y2 - self.y1).abs()
    }
}

/// One tracked person in one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Identifier assigned by the upstream tracker
    pub tracking_id: TrackId,
    /// Person bounding box
    pub bounding_box: BoundingBox,
    /// Detection confidence (0.0-1.0)
    pub confidence: f64,
    /// Body keypoints in COCO order; a short list leaves the tail joints missing
    #[serde(default)]
    pub keypoints: Vec<Keypoint>,
}

impl Detection {
    /// Create a detection
    #[must_use]
    pub fn new(tracking_id: TrackId, bounding_box: BoundingBox, confidence: f64, keypoints: Vec<Keypoint>) -> Self {
        Self {
            tracking_id,
            bounding_box,
            confidence,
            keypoints,
        }
    }

    /// Raw keypoint for a joint, if the upstream stage reported one
    #[must_use]
    pub fn keypoint(&self, joint: KeypointIndex) -> Option<&Keypoint> {
        self.keypoints.get(joint.index())
    }

    /// Joint location, only if it is visible at `threshold`
    #[must_use]
    pub fn visible_point(&self, joint: KeypointIndex, threshold: f64) -> Option<Point2<f64>> {
        self.keypoint(joint)
            .filter(|kp| kp.is_visible(threshold))
            .map(Keypoint::point)
    }
}

/// Wire shape of a frame before track deduplication
#[derive(Deserialize)]
struct FrameRecord {
    #[serde(default)]
    index: u64,
    #[serde(default)]
    timestamp: f64,
    #[serde(default)]
    detections: Vec<Detection>,
}

impl From<FrameRecord> for Frame {
    fn from(record: FrameRecord) -> Self {
        Self::new(record.index, record.timestamp, record.detections)
    }
}

/// All detections for one video frame
///
/// Each tracking id appears at most once, in the order it was first reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "FrameRecord")]
pub struct Frame {
    /// Sequential frame number
    pub index: u64,
    /// Capture time in seconds
    pub timestamp: f64,
    detections: Vec<Detection>,
}

impl Frame {
    /// Create a frame, keeping the last detection reported for a repeated tracking id
    #[must_use]
    pub fn new(index: u64, timestamp: f64, detections: Vec<Detection>) -> Self {
        let mut unique: Vec<Detection> = Vec::with_capacity(detections.len());
        for detection in detections {
            if let Some(existing) = unique.iter_mut().find(|d| d.tracking_id == detection.tracking_id) {
                warn!(
                    "Frame {index}: tracking id {} reported twice, keeping the later detection",
                    detection.tracking_id
                );
                *existing = detection;
            } else {
                unique.push(detection);
            }
        }

        Self {
            index,
            timestamp,
            detections: unique,
        }
    }

    /// Detections in report order
    #[must_use]
    pub fn detections(&self) -> &[Detection] {
        &self.detections
    }

    /// Detection for a tracking id
    #[must_use]
    pub fn detection(&self, tracking_id: TrackId) -> Option<&Detection> {
        self.detections.iter().find(|d| d.tracking_id == tracking_id)
    }

    /// Tracking ids present in this frame
    pub fn track_ids(&self) -> impl Iterator<Item = TrackId> + '_ {
        self.detections.iter().map(|d| d.tracking_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.detections.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detection(id: TrackId, confidence: f64) -> Detection {
        Detection::new(id, BoundingBox::new(0.0, 0.0, 10.0, 20.0), confidence, Vec::new())
    }

    #[test]
    fn test_keypoint_visibility() {
        assert!(Keypoint::new(1.0, 2.0, 0.9).is_visible(0.6));
        assert!(Keypoint::new(1.0, 2.0, 0.6).is_visible(0.6));
        assert!(!Keypoint::new(1.0, 2.0, 0.3).is_visible(0.6));
        assert!(!Keypoint::new(f64::NAN, 2.0, 0.9).is_visible(0.6));
        assert!(!Keypoint::new(1.0, 2.0, f64::NAN).is_visible(0.6));
    }

    #[test]
    fn test_keypoint_index_order() {
        for (i, joint) in KeypointIndex::ALL.iter().enumerate() {
            assert_eq!(joint.index(), i);
        }
        assert_eq!(KeypointIndex::RightAnkle.index(), 16);
        assert_eq!(KeypointIndex::LeftWrist.name(), "left_wrist");
    }

    #[test]
    fn test_short_keypoint_list_is_missing_not_panicking() {
        let mut det = detection(1, 0.9);
        det.keypoints = vec![Keypoint::new(5.0, 5.0, 1.0)];

        assert!(det.visible_point(KeypointIndex::Nose, 0.5).is_some());
        assert!(det.visible_point(KeypointIndex::RightAnkle, 0.5).is_none());
    }

    #[test]
    fn test_frame_deduplicates_tracks() {
        let frame = Frame::new(3, 0.1, vec![detection(7, 0.5), detection(2, 0.8), detection(7, 0.9)]);

        assert_eq!(frame.len(), 2);
        assert_eq!(frame.track_ids().collect::<Vec<_>>(), vec![7, 2]);
        assert_eq!(frame.detection(7).map(|d| d.confidence), Some(0.9));
    }

    #[test]
    fn test_frame_deserialization_deduplicates() {
        let json = r#"{"index":1,"timestamp":0.5,"detections":[
            {"tracking_id":4,"bounding_box":{"x1":0,"y1":0,"x2":1,"y2":1},"confidence":0.2},
            {"tracking_id":4,"bounding_box":{"x1":0,"y1":0,"x2":1,"y2":1},"confidence":0.7}
        ]}"#;
        let frame: Frame = serde_json::from_str(json).unwrap();

        assert_eq!(frame.len(), 1);
        assert_eq!(frame.detection(4).map(|d| d.confidence), Some(0.7));
        assert!(frame.detection(4).unwrap().keypoints.is_empty());
    }

    #[test]
    fn test_negative_tracking_id_deserializes() {
        let json = r#"{"index":2,"timestamp":0.1,"detections":[
            {"tracking_id":-3,"bounding_box":{"x1":0,"y1":0,"x2":1,"y2":1},"confidence":0.4},
            {"tracking_id":5,"bounding_box":{"x1":0,"y1":0,"x2":1,"y2":1},"confidence":0.9}
        ]}"#;
        let frame: Frame = serde_json::from_str(json).unwrap();

        assert_eq!(frame.track_ids().collect::<Vec<_>>(), vec![-3, 5]);
        assert_eq!(frame.detection(-3).map(|d| d.confidence), Some(0.4));
    }

    #[test]
    fn test_bounding_box_anchor() {
        let bbox = BoundingBox::new(10.0, 20.0, 50.0, 120.0);
        assert_eq!(bbox.bottom_left(), (10.0, 120.0));
        assert_eq!(bbox.width(), 40.0);
        assert_eq!(bbox.height(), 100.0);
    }
}
