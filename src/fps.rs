//! Frame rate measurement from frame timestamps.

/// Length of the measurement interval in seconds
const INTERVAL_SECS: f64 = 1.0;

/// Frames-per-second counter over a rolling one second interval
#[derive(Debug, Clone, Default)]
pub struct FpsCounter {
    interval_start: Option<f64>,
    frames_in_interval: u32,
    fps: f64,
}

impl FpsCounter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a frame and return the current rate.
    ///
    /// The rate is 0 until a full interval has elapsed. A timestamp earlier
    /// than the current interval start restarts the interval.
    pub fn tick(&mut self, timestamp: f64) -> f64 {
        if !timestamp.is_finite() {
            return self.fps;
        }

        match self.interval_start {
            Some(start) if timestamp >= start => {
                self.frames_in_interval += 1;
                let elapsed = timestamp - start;
                if elapsed >= INTERVAL_SECS {
                    self.fps = f64::from(self.frames_in_interval) / elapsed;
                    self.interval_start = Some(timestamp);
                    self.frames_in_interval = 0;
                }
            }
            _ => {
                self.interval_start = Some(timestamp);
                self.frames_in_interval = 0;
            }
        }

        self.fps
    }

    /// Most recently measured rate
    #[must_use]
    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
