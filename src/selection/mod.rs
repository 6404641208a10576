//! Exact order statistics
//!
//! This module computes order statistics of a slice by partition selection
//! in expected linear time, without sorting it.
//!
//! All functions take `&mut [f64]` and may permute the slice. Copy the data
//! first if the original order matters.
//!
//! # Example
//!
//! ```
//! use descstats::selection::{median, percentile, select};
//!
//! let mut values = [9.4, 2.1, -6.5, 34.2, 3.34, 67.5, 8.64];
//!
//! assert_eq!(select(&mut values, 0), -6.5);
//! assert_eq!(median(&mut values), 8.64);
//! assert_eq!(percentile(&mut values, 100.0), 67.5);
//! ```

mod select;

pub use select::{median, percentile, select};
