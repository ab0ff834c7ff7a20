use super::AngleFilter;
use crate::window::AngleWindow;

/// Exponential smoothing filter
///
/// The newest sample is Hampel-tested against the window before it is folded
/// in; an outlier contributes the window median instead.
pub struct ExponentialFilter {
    alpha: f64,
    outlier_threshold: f64,
    last: Option<f64>,
}

impl ExponentialFilter {
    /// Create a filter giving weight `alpha` to each new sample
    ///
    /// # Panics
    ///
    /// Panics if `alpha` is not in `(0, 1]` or `outlier_threshold` is not positive
    #[must_use]
    pub fn new(alpha: f64, outlier_threshold: f64) -> Self {
        assert!(alpha > 0.0 && alpha <= 1.0, "Alpha must be in (0, 1]");
        assert!(
            outlier_threshold > 0.0,
            "Outlier threshold must be positive, got {outlier_threshold}"
        );
        Self {
            alpha,
            outlier_threshold,
            last: None,
        }
    }
}

impl AngleFilter for ExponentialFilter {
    fn apply(&mut self, window: &mut AngleWindow) -> f64 {
        let Some(angle) = window.hampel_latest(self.outlier_threshold) else {
            return self.last.unwrap_or_default();
        };
        let filtered = match self.last {
            Some(last) => self.alpha * angle + (1.0 - self.alpha) * last,
            None => angle,
        };
        self.last = Some(filtered);
        filtered
    }

    fn reset(&mut self) {
        self.last = None;
    }

    fn name(&self) -> &str {
        "ExponentialFilter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(filter: &mut ExponentialFilter, window: &mut AngleWindow, value: f64) -> f64 {
        window.push(value);
        filter.apply(window)
    }

    #[test]
    fn test_exponential_filter() {
        let mut filter = ExponentialFilter::new(0.5, 3.0);
        let mut window = AngleWindow::new(10);

        // First value passes through
        assert_eq!(feed(&mut filter, &mut window, 10.0), 10.0);

        // Second value is smoothed
        assert_eq!(feed(&mut filter, &mut window, 20.0), 15.0); // 0.5 * 20 + 0.5 * 10
    }

    #[test]
    fn test_alpha_bounds() {
        let mut window = AngleWindow::new(10);

        // High alpha = less smoothing
        let mut filter1 = ExponentialFilter::new(0.9, 3.0);
        feed(&mut filter1, &mut window, 10.0);
        assert!((feed(&mut filter1, &mut window, 20.0) - 19.0).abs() < 0.001);

        // Low alpha = more smoothing
        window.clear();
        let mut filter2 = ExponentialFilter::new(0.1, 3.0);
        feed(&mut filter2, &mut window, 10.0);
        assert!((feed(&mut filter2, &mut window, 20.0) - 11.0).abs() < 0.001);
    }

    #[test]
    fn test_outlier_is_folded_in_as_median() {
        let mut filter = ExponentialFilter::new(0.5, 3.0);
        let mut window = AngleWindow::new(5);
        for _ in 0..5 {
            feed(&mut filter, &mut window, 2.0);
        }

        assert_eq!(feed(&mut filter, &mut window, 90.0), 2.0);
    }

    #[test]
    fn test_reset() {
        let mut filter = ExponentialFilter::new(0.5, 3.0);
        let mut window = AngleWindow::new(5);
        feed(&mut filter, &mut window, 10.0);
        filter.reset();
        window.clear();

        assert_eq!(feed(&mut filter, &mut window, 4.0), 4.0);
    }

    #[test]
    #[should_panic(expected = "Alpha must be in (0, 1]")]
    fn test_zero_alpha() {
        let _ = ExponentialFilter::new(0.0, 3.0);
    }
}
