//! Fixed-capacity sliding window over recent measurements.
//!
//! Storage is allocated once at construction; pushing into a full window
//! overwrites the oldest slot in place, so a long-running stream never grows
//! memory. Order statistics (median, MAD) are computed in a scratch buffer of
//! the same capacity, also allocated once.

use crate::constants::MAD_TO_SIGMA;

/// Ring buffer of the most recent `capacity` samples
#[derive(Debug, Clone)]
pub struct AngleWindow {
    slots: Vec<f64>,
    /// Index of the oldest sample
    head: usize,
    len: usize,
    /// Sort space for order statistics, never reallocated
    scratch: Vec<f64>,
}

impl AngleWindow {
    /// Create an empty window
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Window size must be greater than 0");
        Self {
            slots: vec![0.0; capacity],
            head: 0,
            len: 0,
            scratch: Vec::with_capacity(capacity),
        }
    }

    /// Append a sample, returning the evicted oldest sample if the window was full
    pub fn push(&mut self, value: f64) -> Option<f64> {
        let capacity = self.capacity();
        if self.len < capacity {
            let tail = (self.head + self.len) % capacity;
            self.slots[tail] = value;
            self.len += 1;
            None
        } else {
            let evicted = std::mem::replace(&mut self.slots[self.head], value);
            self.head = (self.head + 1) % capacity;
            Some(evicted)
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    /// Drop all samples, keeping the allocation
    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }

    /// Samples from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        let capacity = self.capacity();
        (0..self.len).map(move |i| self.slots[(self.head + i) % capacity])
    }

    /// Most recent sample
    #[must_use]
    pub fn latest(&self) -> Option<f64> {
        if self.is_empty() {
            None
        } else {
            Some(self.slots[(self.head + self.len - 1) % self.capacity()])
        }
    }

    /// Arithmetic mean of the samples
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // Window sizes are small
    pub fn mean(&self) -> Option<f64> {
        if self.is_empty() {
            None
        } else {
            Some(self.iter().sum::<f64>() / self.len as f64)
        }
    }

    /// Summary statistics of the current samples
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // Window sizes are small
    pub fn statistics(&mut self) -> Option<Statistics> {
        if self.is_empty() {
            return None;
        }
        let n = self.len as f64;
        let mean = self.iter().sum::<f64>() / n;

        let variance = self.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
        let std_dev = variance.sqrt();

        let min = self.iter().fold(f64::INFINITY, f64::min);
        let max = self.iter().fold(f64::NEG_INFINITY, f64::max);
        let range = max - min;

        let (median, mad) = self.median_and_mad();

        Some(Statistics {
            mean,
            std_dev,
            min,
            max,
            range,
            median,
            mad,
        })
    }

    /// Hampel-filtered mean: samples further than `k` robust standard
    /// deviations from the median count as the median
    ///
    /// With fewer than three samples there is no robust spread to test
    /// against and the plain mean is returned.
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // Window sizes are small
    pub fn hampel_mean(&mut self, k: f64) -> Option<f64> {
        if self.len < 3 {
            return self.mean();
        }
        let (median, mad) = self.median_and_mad();
        let limit = k * MAD_TO_SIGMA * mad;
        let sum: f64 = self
            .iter()
            .map(|x| if (x - median).abs() > limit { median } else { x })
            .sum();
        Some(sum / self.len as f64)
    }

    /// Hampel test of the newest sample against the whole window
    ///
    /// Returns the window median when the newest sample lies more than `k`
    /// robust standard deviations from it, otherwise the sample itself.
    #[must_use]
    pub fn hampel_latest(&mut self, k: f64) -> Option<f64> {
        let latest = self.latest()?;
        if self.len < 3 {
            return Some(latest);
        }
        let (median, mad) = self.median_and_mad();
        if (latest - median).abs() > k * MAD_TO_SIGMA * mad {
            Some(median)
        } else {
            Some(latest)
        }
    }

    /// Median and median absolute deviation of a non-empty window
    fn median_and_mad(&mut self) -> (f64, f64) {
        let Self {
            slots,
            head,
            len,
            scratch,
        } = self;
        let capacity = slots.len();

        scratch.clear();
        scratch.extend((0..*len).map(|i| slots[(*head + i) % capacity]));
        let median = median_in_place(scratch);

        for value in scratch.iter_mut() {
            *value = (*value - median).abs();
        }
        let mad = median_in_place(scratch);
        (median, mad)
    }
}

/// Statistical summary of a data window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Statistics {
    /// Mean value of the data
    pub mean: f64,
    /// Population standard deviation of the data
    pub std_dev: f64,
    /// Minimum value in the window
    pub min: f64,
    /// Maximum value in the window
    pub max: f64,
    /// Range (max - min) of the data
    pub range: f64,
    /// Median value of the data
    pub median: f64,
    /// Median absolute deviation from the median
    pub mad: f64,
}

impl Statistics {
    /// Outlier-resistant standard deviation estimate (scaled MAD)
    #[must_use]
    pub fn robust_std_dev(&self) -> f64 {
        MAD_TO_SIGMA * self.mad
    }
}

fn median_in_place(values: &mut [f64]) -> f64 {
    values.sort_unstable_by(f64::total_cmp);

    let len = values.len();
    if len == 0 {
        0.0
    } else if len % 2 == 0 {
        (values[len / 2 - 1] + values[len / 2]) / 2.0
    } else {
        values[len / 2]
    }
}
