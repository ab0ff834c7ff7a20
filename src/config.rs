//! Configuration management for the posture pipeline

use crate::constants::{
    DEFAULT_ARM_OVERLAP_MARGIN, DEFAULT_EXPONENTIAL_ALPHA, DEFAULT_FACE_TOUCH_DISTANCE_SCALE,
    DEFAULT_LEANING_SWAY_THRESHOLD, DEFAULT_LEANING_TILT_THRESHOLD, DEFAULT_LEANING_WINDOW_SIZE,
    DEFAULT_MAX_ELBOW_ANGLE_DEG, DEFAULT_MIN_FOREARM_RATIO, DEFAULT_OUTLIER_THRESHOLD, DEFAULT_QUALITY_DECAY,
    DEFAULT_STATS_RETENTION_FRAMES, DEFAULT_SUMMARY_INTERVAL_FRAMES, DEFAULT_TRACK_TIMEOUT_FRAMES,
    DEFAULT_VISIBILITY_THRESHOLD,
};
use crate::filters::Smoothing;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Classifier thresholds
    pub thresholds: ThresholdConfig,

    /// Arms-folded refinements
    pub arms_folded: ArmsFoldedConfig,

    /// Leaning smoothing and quality signal
    pub leaning: LeaningConfig,

    /// Overlay and summary settings
    pub display: DisplayConfig,
}

/// Thresholds shared by the classifiers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Horizontal tolerance for a wrist crossing the body, as a fraction of shoulder width
    pub arm_overlap_margin: f64,

    /// Wrist-to-face distance counted as touching, as a fraction of shoulder width
    pub face_touch_distance_scale: f64,

    /// Minimum keypoint score for a joint to be used (0.0-1.0)
    pub visibility_threshold: f64,

    /// Smoothed torso tilt in degrees above which the presenter is leaning
    pub leaning_tilt_threshold: f64,

    /// Robust spread of raw torso tilt in degrees above which the presenter is swaying
    pub leaning_sway_threshold: f64,

    /// Number of frames of tilt history kept per track
    pub leaning_window_size: usize,

    /// Frames a track may go unseen before its history is dropped
    pub track_timeout_frames: u64,
}

/// Arms-folded refinements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArmsFoldedConfig {
    /// Largest shoulder-elbow-wrist angle in degrees for a folded arm
    pub max_elbow_angle_deg: f64,

    /// Minimum forearm length as a fraction of shoulder width
    pub min_forearm_ratio: f64,
}

/// Leaning smoothing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeaningConfig {
    /// Smoothing applied to the raw tilt
    pub smoothing: Smoothing,

    /// Exponential smoothing alpha (used with `exponential` smoothing)
    pub exponential_alpha: f64,

    /// Hampel threshold in robust standard deviations; farther tilt samples
    /// are replaced by the window median before smoothing
    pub outlier_threshold: f64,

    /// Per-frame decay of the posture quality signal (0.0-1.0)
    pub quality_decay: f64,
}

/// Display configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Frames between session summaries in the log (0 disables them)
    pub summary_interval_frames: u64,

    /// Label every visible keypoint with its coordinates
    pub show_keypoints: bool,

    /// Include the per-track statistics legend
    pub show_legend: bool,

    /// Frames a track may stay unseen before its session statistics are dropped
    pub stats_retention_frames: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            thresholds: ThresholdConfig::default(),
            arms_folded: ArmsFoldedConfig::default(),
            leaning: LeaningConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            arm_overlap_margin: DEFAULT_ARM_OVERLAP_MARGIN,
            face_touch_distance_scale: DEFAULT_FACE_TOUCH_DISTANCE_SCALE,
            visibility_threshold: DEFAULT_VISIBILITY_THRESHOLD,
            leaning_tilt_threshold: DEFAULT_LEANING_TILT_THRESHOLD,
            leaning_sway_threshold: DEFAULT_LEANING_SWAY_THRESHOLD,
            leaning_window_size: DEFAULT_LEANING_WINDOW_SIZE,
            track_timeout_frames: DEFAULT_TRACK_TIMEOUT_FRAMES,
        }
    }
}

impl Default for ArmsFoldedConfig {
    fn default() -> Self {
        Self {
            max_elbow_angle_deg: DEFAULT_MAX_ELBOW_ANGLE_DEG,
            min_forearm_ratio: DEFAULT_MIN_FOREARM_RATIO,
        }
    }
}

impl Default for LeaningConfig {
    fn default() -> Self {
        Self {
            smoothing: Smoothing::MovingAverage,
            exponential_alpha: DEFAULT_EXPONENTIAL_ALPHA,
            outlier_threshold: DEFAULT_OUTLIER_THRESHOLD,
            quality_decay: DEFAULT_QUALITY_DECAY,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            summary_interval_frames: DEFAULT_SUMMARY_INTERVAL_FRAMES,
            show_keypoints: false,
            show_legend: true,
            stats_retention_frames: DEFAULT_STATS_RETENTION_FRAMES,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid configuration
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = self.to_yaml()?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Serialize configuration as YAML text
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the first invalid value
    pub fn validate(&self) -> Result<()> {
        let t = &self.thresholds;

        if !(0.0..=1.0).contains(&t.visibility_threshold) {
            return Err(Error::ConfigError(
                "Visibility threshold must be between 0.0 and 1.0".to_string(),
            ));
        }
        if !(t.arm_overlap_margin >= 0.0 && t.arm_overlap_margin.is_finite()) {
            return Err(Error::ConfigError("Arm overlap margin must be non-negative".to_string()));
        }
        if !(t.face_touch_distance_scale > 0.0 && t.face_touch_distance_scale.is_finite()) {
            return Err(Error::ConfigError(
                "Face touch distance scale must be greater than 0".to_string(),
            ));
        }
        if !(t.leaning_tilt_threshold > 0.0 && t.leaning_tilt_threshold <= 180.0) {
            return Err(Error::ConfigError(
                "Leaning tilt threshold must be in (0, 180] degrees".to_string(),
            ));
        }
        if !(t.leaning_sway_threshold > 0.0 && t.leaning_sway_threshold.is_finite()) {
            return Err(Error::ConfigError(
                "Leaning sway threshold must be greater than 0".to_string(),
            ));
        }
        if t.leaning_window_size == 0 {
            return Err(Error::ConfigError(
                "Leaning window size must be greater than 0".to_string(),
            ));
        }
        if t.track_timeout_frames == 0 {
            return Err(Error::ConfigError(
                "Track timeout must be at least 1 frame".to_string(),
            ));
        }

        if !(self.arms_folded.max_elbow_angle_deg > 0.0 && self.arms_folded.max_elbow_angle_deg <= 180.0) {
            return Err(Error::ConfigError(
                "Maximum elbow angle must be in (0, 180] degrees".to_string(),
            ));
        }
        if !(self.arms_folded.min_forearm_ratio >= 0.0 && self.arms_folded.min_forearm_ratio.is_finite()) {
            return Err(Error::ConfigError(
                "Minimum forearm ratio must be non-negative".to_string(),
            ));
        }

        if !(self.leaning.exponential_alpha > 0.0 && self.leaning.exponential_alpha <= 1.0) {
            return Err(Error::ConfigError(
                "Exponential alpha must be in (0, 1]".to_string(),
            ));
        }
        if !(self.leaning.outlier_threshold > 0.0 && self.leaning.outlier_threshold.is_finite()) {
            return Err(Error::ConfigError(
                "Outlier threshold must be greater than 0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.leaning.quality_decay) {
            return Err(Error::ConfigError(
                "Quality decay must be between 0.0 and 1.0".to_string(),
            ));
        }

        if self.display.stats_retention_frames < t.track_timeout_frames {
            return Err(Error::ConfigError(
                "Statistics retention must be at least the track timeout".to_string(),
            ));
        }

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Presenter Posture Configuration

# Classifier thresholds
thresholds:
  arm_overlap_margin: 0.1
  face_touch_distance_scale: 0.5
  visibility_threshold: 0.6
  leaning_tilt_threshold: 15.0
  leaning_sway_threshold: 8.0
  leaning_window_size: 10
  track_timeout_frames: 30

# Arms folded refinements
arms_folded:
  max_elbow_angle_deg: 120.0
  min_forearm_ratio: 0.5

# Leaning smoothing
leaning:
  smoothing: "moving_average"
  exponential_alpha: 0.3
  outlier_threshold: 3.0
  quality_decay: 0.9

# Overlay and summaries
display:
  summary_interval_frames: 200
  show_keypoints: false
  show_legend: true
  stats_retention_frames: 9000
"#;
