//! # descstats
//!
//! Descriptive statistics for streams of floating-point values.
//!
//! descstats reports the classic summary of a dataset (count, min, quartiles,
//! mean, median, max, IQR, variance and standard deviation) either exactly,
//! by retaining every value, or in bounded memory, by summarizing the stream
//! as it arrives.
//!
//! ## Features
//!
//! - **Exact order statistics**: partition selection in expected linear time
//! - **Online moments**: Welford's numerically stable one-pass mean and variance
//! - **Quantile sketch**: clustering t-digest with seedable randomness
//! - **Bounded sampling**: reservoir sampling, or the legacy coin-flip policy
//! - **Mergeable summaries**: every sketch implements [`Sketch::merge`](traits::Sketch::merge)
//!
//! ## Quick Start
//!
//! ```rust
//! use descstats::prelude::*;
//!
//! let mut dataset = Dataset::new();
//! dataset.extend([4.3, 9.4, 2.1, -6.5, 34.2, 3.34, 67.5, 8.64]).unwrap();
//!
//! let summary = dataset.summary();
//! assert_eq!(summary.count, 8);
//! assert!((summary.median - 6.47).abs() < 1e-9);
//! assert!((summary.sd - 24.126734283).abs() < 1e-8);
//! ```
//!
//! ## Streaming
//!
//! A streaming dataset never holds more than a fixed number of values.
//! Moments stay exact; quantiles come from a t-digest (or a bounded sample):
//!
//! ```rust
//! use descstats::config::{DatasetConfig, DigestConfig};
//! use descstats::dataset::Dataset;
//!
//! let config = DatasetConfig::streaming()
//!     .with_digest(DigestConfig::new(0.01, 100.0))
//!     .with_seed(42);
//! let mut dataset = Dataset::with_config(config).unwrap();
//!
//! for i in 0..10_000u32 {
//!     dataset.ingest(f64::from(i * 7919 % 10_000)).unwrap();
//! }
//!
//! assert!((dataset.mean() - 4999.5).abs() < 1e-9);
//! assert!((dataset.median() - 5000.0).abs() < 250.0);
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): standard library support and the [`input`] module
//! - `serde`: serialization of configuration, summaries and digests
//!
//! Without `std` the crate is `no_std` + `alloc`; math goes through `libm`.

#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod config;
pub mod dataset;
pub mod error;
pub mod quantiles;
pub mod sampling;
pub mod selection;
pub mod statistics;
pub mod traits;

#[cfg(feature = "std")]
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
pub mod input;

mod math;

pub mod prelude {
    pub use crate::config::{DatasetConfig, DigestConfig, Mode, SampleConfig, SamplingPolicy};
    pub use crate::dataset::{Dataset, Summary};
    pub use crate::error::{ConfigError, MergeError, StatsError};
    pub use crate::quantiles::TDigest;
    pub use crate::sampling::BoundedSample;
    pub use crate::statistics::RunningStats;
    pub use crate::traits::*;
}

pub use dataset::{Dataset, Summary};
pub use error::{ConfigError, MergeError, StatsError};
pub use quantiles::TDigest;
pub use sampling::BoundedSample;
pub use statistics::RunningStats;
