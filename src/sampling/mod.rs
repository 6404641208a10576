//! Stream sampling
//!
//! Keeps a bounded random sample of a stream that is too long to store.
//!
//! # Example
//!
//! ```
//! use descstats::config::SampleConfig;
//! use descstats::sampling::BoundedSample;
//!
//! let mut sample = BoundedSample::<f64>::new(SampleConfig::default()).unwrap();
//!
//! for i in 0..1_000_000 {
//!     sample.add(i as f64);
//! }
//!
//! assert_eq!(sample.len(), 4096);
//! let median = sample.median();
//! assert!((median - 500_000.0).abs() < 50_000.0);
//! ```

mod reservoir;

pub use crate::config::SamplingPolicy;
pub use reservoir::BoundedSample;
