//! Signal filtering algorithms for smoothing torso tilt.
//!
//! Pose estimation jitters from frame to frame; these filters turn the raw
//! per-frame tilt of one track into a steadier signal before thresholding.
//! Filters read the track's own [`AngleWindow`] rather than buffering samples
//! themselves, and every filter first applies a Hampel test so that a single
//! wild pose estimate cannot move the smoothed value.

/// Moving average over a fixed-size window
pub mod moving_average;

/// Exponential smoothing for responsive decay
pub mod exponential;

use crate::window::AngleWindow;
use crate::Result;
use serde::{Deserialize, Serialize};

/// Trait for all scalar angle filters
pub trait AngleFilter: Send + Sync {
    /// Smoothed value once the newest sample has been pushed into `window`
    fn apply(&mut self, window: &mut AngleWindow) -> f64;

    /// Reset filter state
    fn reset(&mut self);

    /// Get filter name
    fn name(&self) -> &str;
}

/// Smoothing strategy for the leaning classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Smoothing {
    /// Hampel-filtered mean of the last `window_size` samples
    MovingAverage,
    /// Exponentially decayed average
    Exponential,
}

impl std::str::FromStr for Smoothing {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "moving_average" | "movingaverage" => Ok(Self::MovingAverage),
            "exponential" => Ok(Self::Exponential),
            _ => Err(crate::Error::FilterError(format!("Unknown filter type: {s}"))),
        }
    }
}

/// Build a filter for a smoothing strategy
///
/// # Errors
///
/// Returns an error if the parameters are out of range for the chosen filter
pub fn create_filter(smoothing: Smoothing, alpha: f64, outlier_threshold: f64) -> Result<Box<dyn AngleFilter>> {
    if !(outlier_threshold > 0.0 && outlier_threshold.is_finite()) {
        return Err(crate::Error::FilterError(format!(
            "Outlier threshold must be greater than 0, got {outlier_threshold}"
        )));
    }
    match smoothing {
        Smoothing::MovingAverage => Ok(Box::new(moving_average::MovingAverageFilter::new(outlier_threshold))),
        Smoothing::Exponential => {
            if !(alpha > 0.0 && alpha <= 1.0) {
                return Err(crate::Error::FilterError(format!(
                    "Exponential alpha must be in (0, 1], got {alpha}"
                )));
            }
            Ok(Box::new(exponential::ExponentialFilter::new(alpha, outlier_threshold)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_filter() {
        assert!(create_filter(Smoothing::MovingAverage, 0.5, 3.0).is_ok());
        assert!(create_filter(Smoothing::Exponential, 0.5, 3.0).is_ok());
        assert!(create_filter(Smoothing::MovingAverage, 0.5, 0.0).is_err());
        assert!(create_filter(Smoothing::Exponential, 0.0, 3.0).is_err());
        assert!(create_filter(Smoothing::Exponential, f64::NAN, 3.0).is_err());
        assert!(create_filter(Smoothing::Exponential, 0.5, f64::INFINITY).is_err());
    }

    #[test]
    fn test_parse_smoothing() {
        assert_eq!("moving_average".parse::<Smoothing>().unwrap(), Smoothing::MovingAverage);
        assert_eq!("Exponential".parse::<Smoothing>().unwrap(), Smoothing::Exponential);
        assert!("kalman".parse::<Smoothing>().is_err());
    }
}
