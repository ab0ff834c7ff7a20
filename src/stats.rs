//! Cumulative per-track session statistics.
//!
//! Counts how many frames each tracking id was seen and how many of those
//! were flagged for each behaviour, and formats the result as the legend table
//! shown on screen and in periodic log summaries.
//!
//! Memory stays bounded on long streams: the on-screen legend lists only
//! tracks seen within the active window, and tallies for tracks silent longer
//! than the retention window are dropped.

use crate::aggregator::FrameAnnotations;
use crate::config::Config;
use crate::constants::{DEFAULT_STATS_RETENTION_FRAMES, DEFAULT_TRACK_TIMEOUT_FRAMES};
use crate::frame::TrackId;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Frame counts for one tracking id
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackTally {
    pub total_frames: u64,
    pub arms_folded_frames: u64,
    pub leaning_frames: u64,
    pub touching_face_frames: u64,
    /// Session frame count when the track was last recorded
    pub last_seen_frame: u64,
}

impl TrackTally {
    #[allow(clippy::cast_precision_loss)]
    fn percent(&self, count: u64) -> f64 {
        if self.total_frames == 0 {
            0.0
        } else {
            count as f64 / self.total_frames as f64 * 100.0
        }
    }

    #[must_use]
    pub fn arms_folded_percent(&self) -> f64 {
        self.percent(self.arms_folded_frames)
    }

    #[must_use]
    pub fn leaning_percent(&self) -> f64 {
        self.percent(self.leaning_frames)
    }

    #[must_use]
    pub fn touching_face_percent(&self) -> f64 {
        self.percent(self.touching_face_frames)
    }
}

/// Statistics over the whole session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStats {
    tracks: BTreeMap<TrackId, TrackTally>,
    frames: u64,
    /// Frames a track stays in the legend after it was last seen
    active_frames: u64,
    /// Frames a track's tally is kept after it was last seen
    retention_frames: u64,
}

impl Default for SessionStats {
    fn default() -> Self {
        Self::with_limits(DEFAULT_TRACK_TIMEOUT_FRAMES, DEFAULT_STATS_RETENTION_FRAMES)
    }
}

/// Header of the statistics legend
pub const LEGEND_HEADER: &str = " ID ArmFold Leaning FaceTouch  Total";

impl SessionStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Statistics with explicit legend and retention windows, in frames
    #[must_use]
    pub fn with_limits(active_frames: u64, retention_frames: u64) -> Self {
        Self {
            tracks: BTreeMap::new(),
            frames: 0,
            active_frames,
            retention_frames: retention_frames.max(active_frames),
        }
    }

    /// Statistics using the track timeout as the legend window
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::with_limits(
            config.thresholds.track_timeout_frames,
            config.display.stats_retention_frames,
        )
    }

    /// Count one frame's annotations
    pub fn record(&mut self, frame: &FrameAnnotations) {
        self.frames += 1;
        let now = self.frames;
        for (&id, annotation) in &frame.annotations {
            let tally = self.tracks.entry(id).or_default();
            tally.total_frames += 1;
            tally.arms_folded_frames += u64::from(annotation.arms_folded);
            tally.leaning_frames += u64::from(annotation.is_leaning);
            tally.touching_face_frames += u64::from(annotation.touching_face);
            tally.last_seen_frame = now;
        }

        let retention = self.retention_frames;
        self.tracks.retain(|id, tally| {
            let keep = now - tally.last_seen_frame <= retention;
            if !keep {
                debug!("Stats: dropping id {id} after {retention} silent frames");
            }
            keep
        });
    }

    /// Frames recorded so far
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Tally for a tracking id
    #[must_use]
    pub fn tally(&self, id: TrackId) -> Option<&TrackTally> {
        self.tracks.get(&id)
    }

    /// Tallies ordered by tracking id
    pub fn tallies(&self) -> impl Iterator<Item = (TrackId, &TrackTally)> {
        self.tracks.iter().map(|(&id, tally)| (id, tally))
    }

    /// Whether a track was recorded within the legend window
    #[must_use]
    pub fn is_active(&self, id: TrackId) -> bool {
        self.tracks
            .get(&id)
            .is_some_and(|tally| self.frames - tally.last_seen_frame <= self.active_frames)
    }

    /// Legend rows for recently seen tracks, aligned under [`LEGEND_HEADER`]
    #[must_use]
    pub fn legend_rows(&self) -> Vec<String> {
        self.rows(|id| self.is_active(id))
    }

    fn rows(&self, include: impl Fn(TrackId) -> bool) -> Vec<String> {
        self.tallies()
            .filter(|&(id, _)| include(id))
            .map(|(id, tally)| {
                format!(
                    "{:^3} {:^7} {:^7} {:^9} {:^5}",
                    id,
                    format!("{:.2}%", tally.arms_folded_percent()),
                    format!("{:.2}%", tally.leaning_percent()),
                    format!("{:.2}%", tally.touching_face_percent()),
                    tally.total_frames
                )
            })
            .collect()
    }

    /// Log the legend table
    pub fn log_summary(&self) {
        let mut lines = vec![
            String::new(),
            "----------------------".to_string(),
            "  Current Statistics".to_string(),
            "----------------------".to_string(),
            LEGEND_HEADER.to_string(),
        ];
        lines.extend(self.rows(|_| true));
        lines.push(format!("[ Frame Count : {} ]", self.frames));
        info!("{}", lines.join("\n"));
    }
}
