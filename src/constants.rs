//! Constants used throughout the library

/// Number of body keypoints in the COCO layout produced upstream
pub const NUM_BODY_KEYPOINTS: usize = 17;

/// Default minimum keypoint score for a joint to count as visible
pub const DEFAULT_VISIBILITY_THRESHOLD: f64 = 0.6;

/// Default horizontal tolerance for folded arms, as a fraction of shoulder width
pub const DEFAULT_ARM_OVERLAP_MARGIN: f64 = 0.1;

/// Default wrist-to-face distance, as a fraction of shoulder width
pub const DEFAULT_FACE_TOUCH_DISTANCE_SCALE: f64 = 0.5;

/// Default smoothed torso tilt (degrees) above which a presenter is leaning
pub const DEFAULT_LEANING_TILT_THRESHOLD: f64 = 15.0;

/// Default robust spread of raw tilt (degrees) above which a presenter is swaying
pub const DEFAULT_LEANING_SWAY_THRESHOLD: f64 = 8.0;

/// Default number of frames in the leaning window
pub const DEFAULT_LEANING_WINDOW_SIZE: usize = 10;

/// Default number of frames a track may go unseen before eviction
pub const DEFAULT_TRACK_TIMEOUT_FRAMES: u64 = 30;

/// Largest shoulder-elbow-wrist angle (degrees) for an arm to count as folded
pub const DEFAULT_MAX_ELBOW_ANGLE_DEG: f64 = 120.0;

/// Minimum forearm length for folded arms, as a fraction of shoulder width
pub const DEFAULT_MIN_FOREARM_RATIO: f64 = 0.5;

/// Default alpha for exponential tilt smoothing
pub const DEFAULT_EXPONENTIAL_ALPHA: f64 = 0.3;

/// Default Hampel threshold: tilt samples further than this many robust
/// standard deviations from the window median are replaced by the median
pub const DEFAULT_OUTLIER_THRESHOLD: f64 = 3.0;

/// Default decay of the posture quality signal
pub const DEFAULT_QUALITY_DECAY: f64 = 0.9;

/// Frames between periodic session summaries in the log
pub const DEFAULT_SUMMARY_INTERVAL_FRAMES: u64 = 200;

/// Frames a silent track's statistics are retained (five minutes at 30 fps)
pub const DEFAULT_STATS_RETENTION_FRAMES: u64 = 9000;

/// Scale factor turning a median absolute deviation into a standard deviation estimate
pub const MAD_TO_SIGMA: f64 = 1.4826;

/// Overlay line height in pixels
pub const OVERLAY_LINE_HEIGHT: f64 = 30.0;

/// Number of overlay lines kept clear above the bounding box bottom edge
pub const OVERLAY_BASE_LINES: usize = 3;

/// Numeric precision epsilon
pub const EPSILON: f64 = 1e-10;
