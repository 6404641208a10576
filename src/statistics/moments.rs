//! Running statistics (count, mean, variance, min, max)
//!
//! Single-pass moments using Welford's update, which never subtracts two
//! large accumulated sums. Supports merging for distributed computation.

use tracing::trace;

use crate::error::MergeError;
use crate::math;
use crate::traits::Sketch;

/// Running statistics calculator using Welford's algorithm
///
/// Computes mean, variance, standard deviation, min and max in a single pass
/// with O(1) memory. Moments that are undefined for the current count are
/// reported as NaN: the mean of nothing, the variance of a single value.
///
/// The result depends only on the multiset of values added, not on their
/// order (up to floating-point rounding).
///
/// # Example
///
/// ```
/// use descstats::statistics::RunningStats;
///
/// let mut stats = RunningStats::new();
///
/// for value in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
///     stats.add(value);
/// }
///
/// assert!((stats.mean() - 5.0).abs() < 1e-12);
/// assert!((stats.variance() - 32.0 / 7.0).abs() < 1e-12);
/// assert!((stats.population_variance() - 4.0).abs() < 1e-12);
/// assert_eq!(stats.min(), Some(2.0));
/// assert_eq!(stats.max(), Some(9.0));
/// ```
///
/// # Distributed Usage
///
/// ```
/// use descstats::statistics::RunningStats;
/// use descstats::traits::Sketch;
///
/// let mut stats1 = RunningStats::new();
/// let mut stats2 = RunningStats::new();
///
/// for v in [1.0, 2.0, 3.0] {
///     stats1.add(v);
/// }
/// for v in [4.0, 5.0, 6.0] {
///     stats2.add(v);
/// }
///
/// stats1.merge(&stats2).unwrap();
/// assert!((stats1.mean() - 3.5).abs() < 1e-12);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct RunningStats {
    /// Number of values seen
    count: u64,
    /// Running mean
    mean: f64,
    /// Sum of squared deviations from the mean (M2 in Welford's algorithm)
    m2: f64,
    /// Minimum value
    min: f64,
    /// Maximum value
    max: f64,
}

impl Default for RunningStats {
    fn default() -> Self {
        Self::new()
    }
}

impl RunningStats {
    /// Create a new empty accumulator
    pub fn new() -> Self {
        Self {
            count: 0,
            mean: 0.0,
            m2: 0.0,
            min: f64::NAN,
            max: f64::NAN,
        }
    }

    /// Add a value
    ///
    /// NaN values are ignored to prevent poisoning the statistics.
    pub fn add(&mut self, value: f64) {
        if value.is_nan() {
            trace!("Ignoring NaN value.");
            return;
        }

        self.count += 1;
        let n = self.count as f64;

        if self.count == 1 {
            self.min = value;
            self.max = value;
        } else {
            // Independent checks: a value can only move one bound, but both
            // have to be looked at.
            if value < self.min {
                self.min = value;
            }
            if value > self.max {
                self.max = value;
            }
        }

        let delta = value - self.mean;
        let delta_n = delta / n;
        self.mean += delta_n;
        self.m2 += delta * delta_n * (n - 1.0);
    }

    /// Number of values added
    pub fn len(&self) -> u64 {
        self.count
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Arithmetic mean, NaN when empty
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            f64::NAN
        } else {
            self.mean
        }
    }

    /// Sample variance with Bessel's correction (`m2 / (n - 1)`)
    ///
    /// NaN for fewer than two values.
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            f64::NAN
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// Population variance (`m2 / n`), NaN when empty
    pub fn population_variance(&self) -> f64 {
        if self.count == 0 {
            f64::NAN
        } else {
            self.m2 / self.count as f64
        }
    }

    /// Sample standard deviation
    pub fn stddev(&self) -> f64 {
        math::sqrt(self.variance())
    }

    /// Population standard deviation
    pub fn population_stddev(&self) -> f64 {
        math::sqrt(self.population_variance())
    }

    /// Smallest value seen
    pub fn min(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.min)
        }
    }

    /// Largest value seen
    pub fn max(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.max)
        }
    }

    /// Range (max - min)
    pub fn range(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.max - self.min)
        }
    }

    /// Sum of all values
    pub fn sum(&self) -> f64 {
        self.mean * self.count as f64
    }

    /// Merge with another accumulator
    ///
    /// Uses Chan et al.'s pairwise update for the combined M2.
    pub fn merge_stats(&mut self, other: &Self) {
        if other.count == 0 {
            return;
        }

        if self.count == 0 {
            *self = other.clone();
            return;
        }

        let combined_count = self.count + other.count;
        let delta = other.mean - self.mean;

        let combined_mean = self.mean + delta * (other.count as f64 / combined_count as f64);
        let combined_m2 = self.m2
            + other.m2
            + delta * delta * (self.count as f64 * other.count as f64 / combined_count as f64);

        self.count = combined_count;
        self.mean = combined_mean;
        self.m2 = combined_m2;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }
}

impl Sketch for RunningStats {
    type Item = f64;

    fn update(&mut self, item: &Self::Item) {
        self.add(*item);
    }

    fn merge(&mut self, other: &Self) -> Result<(), MergeError> {
        self.merge_stats(other);
        Ok(())
    }

    fn clear(&mut self) {
        *self = Self::new();
    }

    fn size_bytes(&self) -> usize {
        core::mem::size_of::<Self>()
    }

    fn count(&self) -> u64 {
        self.count
    }
}
