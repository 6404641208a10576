//! Datasets and their value storage
//!
//! [`Dataset`] is the entry point of the crate: feed it values with
//! [`Dataset::ingest`], then ask for any statistic.
//!
//! # Example
//!
//! ```
//! use descstats::dataset::Dataset;
//!
//! let mut dataset = Dataset::streaming();
//!
//! // 0..10_000 in scrambled order
//! for i in 0..10_000u32 {
//!     dataset.ingest(f64::from(i * 7919 % 10_000)).unwrap();
//! }
//!
//! let summary = dataset.summary();
//! assert_eq!(summary.count, 10_000);
//! assert_eq!(summary.min, 0.0);
//! assert_eq!(summary.max, 9_999.0);
//! assert!((summary.median - 5_000.0).abs() < 250.0);
//! ```

mod buffer;
mod store;

pub use buffer::{GrowableBuffer, GrowthPolicy, DEFAULT_GROWTH_BASE};
pub use store::{Dataset, Summary};
