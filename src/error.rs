//! Error types
//!
//! Statistics that are merely undefined for the current data (variance of a
//! single value, the median of an empty dataset) are reported as NaN by the
//! [`Dataset`](crate::dataset::Dataset) façade. The errors here cover the
//! cases a caller has to act on.

use snafu::Snafu;

#[cfg(not(feature = "std"))]
use alloc::string::String;

/// Error raised by the statistics engine
#[derive(Debug, Clone, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum StatsError {
    /// A quantile was requested from a sketch holding no centroids
    #[snafu(display("cannot compute a quantile from an empty sketch"))]
    EmptySketch,

    /// Quantile outside `[0, 1]` (or NaN)
    #[snafu(display("quantile must be within [0, 1], got {q}"))]
    InvalidQuantile { q: f64 },

    /// The exact-mode buffer could not grow
    ///
    /// Every value ingested before the failure is still retained.
    #[snafu(display(
        "failed to grow value buffer to {requested} slots ({retained} values retained)"
    ))]
    Allocation { requested: usize, retained: usize },
}

/// Invalid configuration
#[derive(Debug, Clone, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ConfigError {
    #[snafu(display("digest accuracy must be finite and within (0, 1], got {delta}"))]
    InvalidDelta { delta: f64 },

    #[snafu(display("digest scale must be finite and positive, got {scale}"))]
    InvalidScale { scale: f64 },

    #[snafu(display("sample capacity must be positive"))]
    ZeroCapacity,

    #[snafu(display("buffer growth base must be positive"))]
    InvalidGrowthBase,
}

/// Error during a merge of two summaries
#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum MergeError {
    /// The two summaries were built with different parameters
    #[snafu(display("incompatible config: expected {expected}, found {found}"))]
    IncompatibleConfig { expected: String, found: String },
}
