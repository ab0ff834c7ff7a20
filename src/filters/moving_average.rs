use super::AngleFilter;
use crate::window::AngleWindow;

/// Moving average with Hampel outlier replacement
///
/// Samples further than `outlier_threshold` robust standard deviations from
/// the window median count as the median, so one bad frame cannot drag the
/// average across a threshold.
pub struct MovingAverageFilter {
    outlier_threshold: f64,
}

impl MovingAverageFilter {
    /// Create a moving average with the given Hampel threshold
    ///
    /// # Panics
    ///
    /// Panics if `outlier_threshold` is not positive
    #[must_use]
    pub fn new(outlier_threshold: f64) -> Self {
        assert!(
            outlier_threshold > 0.0,
            "Outlier threshold must be positive, got {outlier_threshold}"
        );
        Self { outlier_threshold }
    }
}

impl AngleFilter for MovingAverageFilter {
    fn apply(&mut self, window: &mut AngleWindow) -> f64 {
        window.hampel_mean(self.outlier_threshold).unwrap_or_default()
    }

    fn reset(&mut self) {}

    fn name(&self) -> &str {
        "MovingAverageFilter"
    }
}
