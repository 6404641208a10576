//! Core traits for streaming summaries
//!
//! Every summary kept by a [`Dataset`](crate::dataset::Dataset) implements the
//! base [`Sketch`] trait. Quantile estimators additionally implement
//! [`QuantileSketch`].

use core::fmt::Debug;

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::error::{MergeError, StatsError};

/// Core trait for all streaming summaries
pub trait Sketch: Clone + Debug {
    /// The type of item this summary processes
    type Item: ?Sized;

    /// Add an item to the summary
    fn update(&mut self, item: &Self::Item);

    /// Merge another summary into this one
    ///
    /// Returns an error if the two were built with different parameters.
    fn merge(&mut self, other: &Self) -> Result<(), MergeError>;

    /// Reset to the empty state
    fn clear(&mut self);

    /// Memory usage in bytes
    fn size_bytes(&self) -> usize;

    /// Number of items processed
    fn count(&self) -> u64;

    /// Check if nothing has been processed
    fn is_empty(&self) -> bool {
        self.count() == 0
    }
}

/// Quantile estimation sketches
pub trait QuantileSketch: Sketch {
    /// Add a value with unit weight
    fn add(&mut self, value: f64);

    /// Estimate the value at quantile `q` (0.0 to 1.0)
    ///
    /// Fails with [`StatsError::EmptySketch`] when nothing has been added and
    /// [`StatsError::InvalidQuantile`] when `q` is outside `[0, 1]`.
    fn quantile(&self, q: f64) -> Result<f64, StatsError>;

    /// Estimate the fraction of values below `value`
    fn rank(&self, value: f64) -> f64;

    /// Smallest value seen
    fn min(&self) -> Option<f64>;

    /// Largest value seen
    fn max(&self) -> Option<f64>;

    /// Estimated median (0.5 quantile)
    fn median(&self) -> Result<f64, StatsError> {
        self.quantile(0.5)
    }

    /// Estimate several quantiles at once
    fn quantiles(&self, qs: &[f64]) -> Vec<Result<f64, StatsError>> {
        qs.iter().map(|&q| self.quantile(q)).collect()
    }
}
