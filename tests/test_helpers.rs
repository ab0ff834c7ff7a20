//! Helper functions and synthetic poses for tests
#![allow(dead_code)]

use presenter_posture::constants::NUM_BODY_KEYPOINTS;
use presenter_posture::frame::{BoundingBox, Detection, Frame, Keypoint, KeypointIndex, TrackId};

/// Score given to every placed keypoint
pub const VISIBLE: f64 = 0.9;

/// Builder for a synthetic standing presenter in image coordinates
///
/// The upright pose has shoulders at x 80..120 on y 100, hips at y 250 and
/// arms hanging at the sides.
#[derive(Debug, Clone)]
pub struct PoseBuilder {
    keypoints: Vec<Keypoint>,
}

impl PoseBuilder {
    pub fn upright() -> Self {
        let mut pose = Self {
            keypoints: vec![Keypoint::new(0.0, 0.0, 0.0); NUM_BODY_KEYPOINTS],
        };
        pose.set(KeypointIndex::Nose, 100.0, 40.0)
            .set(KeypointIndex::LeftEye, 105.0, 35.0)
            .set(KeypointIndex::RightEye, 95.0, 35.0)
            .set(KeypointIndex::LeftEar, 110.0, 40.0)
            .set(KeypointIndex::RightEar, 90.0, 40.0)
            .set(KeypointIndex::LeftShoulder, 120.0, 100.0)
            .set(KeypointIndex::RightShoulder, 80.0, 100.0)
            .set(KeypointIndex::LeftElbow, 125.0, 150.0)
            .set(KeypointIndex::RightElbow, 75.0, 150.0)
            .set(KeypointIndex::LeftWrist, 125.0, 200.0)
            .set(KeypointIndex::RightWrist, 75.0, 200.0)
            .set(KeypointIndex::LeftHip, 112.0, 250.0)
            .set(KeypointIndex::RightHip, 88.0, 250.0)
            .set(KeypointIndex::LeftKnee, 112.0, 320.0)
            .set(KeypointIndex::RightKnee, 88.0, 320.0)
            .set(KeypointIndex::LeftAnkle, 112.0, 380.0)
            .set(KeypointIndex::RightAnkle, 88.0, 380.0);
        pose
    }

    /// Place a joint as visible
    pub fn set(&mut self, joint: KeypointIndex, x: f64, y: f64) -> &mut Self {
        self.keypoints[joint.index()] = Keypoint::new(x, y, VISIBLE);
        self
    }

    /// Drop a joint below any visibility threshold
    pub fn hide(mut self, joint: KeypointIndex) -> Self {
        self.keypoints[joint.index()].score = 0.0;
        self
    }

    /// Shift the upper body so the torso tilts `degrees` from vertical about the hips
    pub fn tilted(mut self, degrees: f64) -> Self {
        let torso_length = 150.0;
        let radians = degrees.to_radians();
        // Upright shoulder midpoint sits one torso length above the hips
        let dx = torso_length * radians.sin();
        let dy = torso_length * (1.0 - radians.cos());
        for joint in &KeypointIndex::ALL[..=KeypointIndex::RightWrist.index()] {
            let kp = &mut self.keypoints[joint.index()];
            kp.x += dx;
            kp.y += dy;
        }
        self
    }

    /// Wrists tucked across the chest, each inside the opposite elbow
    pub fn arms_folded(mut self) -> Self {
        self.set(KeypointIndex::LeftWrist, 85.0, 140.0)
            .set(KeypointIndex::RightWrist, 115.0, 140.0);
        self
    }

    /// Left wrist resting at the chin
    pub fn hand_on_face(mut self) -> Self {
        self.set(KeypointIndex::LeftElbow, 130.0, 110.0)
            .set(KeypointIndex::LeftWrist, 105.0, 45.0);
        self
    }

    pub fn keypoints(&self) -> Vec<Keypoint> {
        self.keypoints.clone()
    }

    pub fn detection(&self, tracking_id: TrackId) -> Detection {
        Detection::new(
            tracking_id,
            BoundingBox::new(50.0, 20.0, 150.0, 380.0),
            0.9,
            self.keypoints(),
        )
    }
}

/// Frame at 30 frames per second
pub fn frame(index: u64, detections: Vec<Detection>) -> Frame {
    #[allow(clippy::cast_precision_loss)]
    let timestamp = index as f64 / 30.0;
    Frame::new(index, timestamp, detections)
}

/// Frames for one track following a sequence of torso tilts
pub fn tilt_sequence(tracking_id: TrackId, tilts: &[f64]) -> Vec<Frame> {
    tilts
        .iter()
        .zip(0u64..)
        .map(|(&tilt, index)| frame(index, vec![PoseBuilder::upright().tilted(tilt).detection(tracking_id)]))
        .collect()
}
