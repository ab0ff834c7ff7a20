//! Leaning and swaying detection with per-track memory.
//!
//! Each tracking id owns a [`TrackState`] holding a fixed-size window of raw
//! torso tilt samples and a smoothing filter reading that window. A presenter
//! is leaning when the smoothed tilt exceeds the tilt threshold, or swaying
//! when the spread of the raw window exceeds the sway threshold. Both paths
//! are robust to a single bad pose estimate: the smoother Hampel-filters the
//! window before averaging, and spread is the median absolute deviation.
//!
//! Frames where hips or shoulders are not visible leave the track untouched:
//! the previous verdict stands until the torso is seen again. Tracks that stay
//! unseen for longer than the timeout are dropped.

use super::{ClassificationMap, PostureClassifier};
use crate::config::Config;
use crate::filters::{create_filter, AngleFilter, Smoothing};
use crate::frame::TrackId;
use crate::geometry::FrameGeometry;
use crate::window::AngleWindow;
use crate::{Error, Result};
use log::debug;
use std::collections::HashMap;
use std::fmt;

/// Leaning parameters copied out of the configuration
#[derive(Debug, Clone, Copy)]
struct LeaningParams {
    visibility_threshold: f64,
    tilt_threshold: f64,
    sway_threshold: f64,
    window_size: usize,
    track_timeout_frames: u64,
    smoothing: Smoothing,
    exponential_alpha: f64,
    outlier_threshold: f64,
    quality_decay: f64,
}

/// Per-track memory owned by the leaning classifier
pub struct TrackState {
    angle_history: AngleWindow,
    smoother: Box<dyn AngleFilter>,
    smoothed_angle: Option<f64>,
    is_leaning: bool,
    posture_quality: f64,
    last_seen_frame: u64,
}

impl TrackState {
    fn new(params: &LeaningParams, frame: u64) -> Result<Self> {
        Ok(Self {
            angle_history: AngleWindow::new(params.window_size),
            smoother: create_filter(params.smoothing, params.exponential_alpha, params.outlier_threshold)?,
            smoothed_angle: None,
            is_leaning: false,
            posture_quality: 1.0,
            last_seen_frame: frame,
        })
    }

    /// Fold one tilt measurement into the track
    fn update(&mut self, angle: f64, params: &LeaningParams) {
        self.angle_history.push(angle);
        let smoothed = self.smoother.apply(&mut self.angle_history);
        self.smoothed_angle = Some(smoothed);

        let tilted = smoothed.abs() > params.tilt_threshold;
        let swaying = self.angle_history.is_full()
            && self
                .angle_history
                .statistics()
                .is_some_and(|stats| stats.robust_std_dev() > params.sway_threshold);
        self.is_leaning = tilted || swaying;

        let target = if self.is_leaning { 0.0 } else { 1.0 };
        self.posture_quality = params.quality_decay * self.posture_quality + (1.0 - params.quality_decay) * target;
    }

    /// Raw tilt samples, oldest first
    #[must_use]
    pub fn angle_history(&self) -> &AngleWindow {
        &self.angle_history
    }

    /// Smoothed tilt in degrees, once at least one tilt has been measured
    #[must_use]
    pub fn smoothed_angle(&self) -> Option<f64> {
        self.smoothed_angle
    }

    #[must_use]
    pub fn is_leaning(&self) -> bool {
        self.is_leaning
    }

    /// Decayed share of recent evaluated frames spent upright, in `[0, 1]`
    #[must_use]
    pub fn posture_quality(&self) -> f64 {
        self.posture_quality
    }

    /// Classifier frame counter value when this track was last seen
    #[must_use]
    pub fn last_seen_frame(&self) -> u64 {
        self.last_seen_frame
    }
}

impl fmt::Debug for TrackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackState")
            .field("angle_history", &self.angle_history.iter().collect::<Vec<_>>())
            .field("smoother", &self.smoother.name())
            .field("smoothed_angle", &self.smoothed_angle)
            .field("is_leaning", &self.is_leaning)
            .field("posture_quality", &self.posture_quality)
            .field("last_seen_frame", &self.last_seen_frame)
            .finish()
    }
}

/// Stateful leaning classifier
#[derive(Debug)]
pub struct LeaningClassifier {
    params: LeaningParams,
    tracks: HashMap<TrackId, TrackState>,
    frames_processed: u64,
}

impl LeaningClassifier {
    /// Create a classifier from the pipeline configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the window is empty or the smoothing parameters
    /// cannot build a filter
    pub fn new(config: &Config) -> Result<Self> {
        let t = &config.thresholds;
        let params = LeaningParams {
            visibility_threshold: t.visibility_threshold,
            tilt_threshold: t.leaning_tilt_threshold,
            sway_threshold: t.leaning_sway_threshold,
            window_size: t.leaning_window_size,
            track_timeout_frames: t.track_timeout_frames,
            smoothing: config.leaning.smoothing,
            exponential_alpha: config.leaning.exponential_alpha,
            outlier_threshold: config.leaning.outlier_threshold,
            quality_decay: config.leaning.quality_decay,
        };

        if params.window_size == 0 {
            return Err(Error::FilterError(
                "Leaning window size must be greater than 0".to_string(),
            ));
        }
        // Reject bad smoothing parameters up front
        create_filter(params.smoothing, params.exponential_alpha, params.outlier_threshold)?;

        Ok(Self {
            params,
            tracks: HashMap::new(),
            frames_processed: 0,
        })
    }

    /// Record a torso tilt for a track, or just refresh it when the tilt is unknown
    ///
    /// Returns the track's current verdict.
    pub fn observe(&mut self, tracking_id: TrackId, tilt_deg: Option<f64>) -> bool {
        let frame = self.frames_processed;
        let params = self.params;

        let state = match self.tracks.entry(tracking_id) {
            std::collections::hash_map::Entry::Occupied(entry) => entry.into_mut(),
            std::collections::hash_map::Entry::Vacant(entry) => match TrackState::new(&params, frame) {
                Ok(state) => {
                    debug!("Leaning: tracking new id {tracking_id}");
                    entry.insert(state)
                }
                // Unreachable once `new` has checked the parameters
                Err(e) => {
                    debug!("Leaning: could not create state for id {tracking_id}: {e}");
                    return false;
                }
            },
        };
        state.last_seen_frame = frame;

        match tilt_deg.filter(|angle| angle.is_finite()) {
            Some(angle) => state.update(angle, &params),
            None => debug!("Leaning: torso not visible for id {tracking_id}, keeping previous verdict"),
        }
        state.is_leaning
    }

    /// Drop tracks not seen for more than the timeout
    fn evict_stale(&mut self) {
        let now = self.frames_processed;
        let timeout = self.params.track_timeout_frames;
        self.tracks.retain(|id, state| {
            let fresh = now - state.last_seen_frame <= timeout;
            if !fresh {
                debug!("Leaning: evicting id {id}, unseen since frame {}", state.last_seen_frame);
            }
            fresh
        });
    }

    /// State held for a track, if any
    #[must_use]
    pub fn track_state(&self, tracking_id: TrackId) -> Option<&TrackState> {
        self.tracks.get(&tracking_id)
    }

    /// Posture quality of a track, if it is being tracked
    #[must_use]
    pub fn posture_quality(&self, tracking_id: TrackId) -> Option<f64> {
        self.tracks.get(&tracking_id).map(TrackState::posture_quality)
    }

    /// Number of tracks currently held in memory
    #[must_use]
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Frames classified so far
    #[must_use]
    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }
}

impl PostureClassifier for LeaningClassifier {
    fn classify_geometry(&mut self, geometry: &FrameGeometry) -> ClassificationMap {
        let verdicts = geometry
            .iter()
            .map(|(id, body)| (id, self.observe(id, body.torso_tilt_deg)))
            .collect();

        self.evict_stale();
        self.frames_processed += 1;
        verdicts
    }

    fn visibility_threshold(&self) -> f64 {
        self.params.visibility_threshold
    }

    fn reset(&mut self) {
        self.tracks.clear();
        self.frames_processed = 0;
    }

    fn name(&self) -> &str {
        "leaning"
    }
}
