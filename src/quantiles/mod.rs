//! Approximate quantiles for streams
//!
//! # Algorithms
//!
//! - [`TDigest`]: clustering t-digest, accurate in the tails, bounded memory
//!
//! # Example
//!
//! ```
//! use descstats::config::DigestConfig;
//! use descstats::quantiles::TDigest;
//! use descstats::traits::QuantileSketch;
//!
//! let mut digest = TDigest::with_seed(DigestConfig::default(), 1).unwrap();
//!
//! for value in [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0] {
//!     digest.add(value);
//! }
//!
//! let median = digest.median();
//! println!("Median: {:?}", median);
//! ```

mod tdigest;

pub use tdigest::{Centroid, TDigest};
