//! Fixed-capacity random sample of a stream
//!
//! The first `capacity` items fill the sample unconditionally. After that the
//! [`SamplingPolicy`] decides whether an item replaces a uniformly chosen
//! slot. A sample of `f64` values doubles as an approximate percentile
//! source: selection runs over the retained values instead of the stream.

use core::fmt::Debug;

use rand::rngs::SmallRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use snafu::ensure;

use crate::config::{SampleConfig, SamplingPolicy, DEFAULT_SEED};
use crate::error::{ConfigError, IncompatibleConfigSnafu, MergeError};
use crate::selection;
use crate::traits::Sketch;

#[cfg(not(feature = "std"))]
use alloc::{format, vec::Vec};

/// Bounded random sample
///
/// With [`SamplingPolicy::Reservoir`] this is Algorithm R (Vitter, 1985):
/// the ith item replaces a random slot with probability `capacity / i`, so
/// every item of the stream is retained with equal probability.
///
/// With [`SamplingPolicy::CoinFlip`] every item past the first `capacity`
/// replaces a random slot with probability 1/2. The sample then favours
/// recent items once the stream is much longer than the capacity.
///
/// # Example
///
/// ```
/// use descstats::config::{SampleConfig, SamplingPolicy};
/// use descstats::sampling::BoundedSample;
///
/// let config = SampleConfig::new(5, SamplingPolicy::Reservoir);
/// let mut sample = BoundedSample::<i32>::with_seed(config, 7).unwrap();
///
/// for i in 0..100 {
///     sample.add(i);
/// }
///
/// assert_eq!(sample.len(), 5);
/// assert_eq!(sample.items_seen(), 100);
/// ```
#[derive(Clone, Debug)]
pub struct BoundedSample<T, R = SmallRng> {
    config: SampleConfig,
    items: Vec<T>,
    /// Number of items offered
    seen: u64,
    rng: R,
}

impl<T> BoundedSample<T> {
    /// Create a sample with the default seed
    pub fn new(config: SampleConfig) -> Result<Self, ConfigError> {
        Self::with_seed(config, DEFAULT_SEED)
    }

    /// Create a sample seeded with a fixed value
    pub fn with_seed(config: SampleConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(config, SmallRng::seed_from_u64(seed))
    }
}

impl<T, R: Rng> BoundedSample<T, R> {
    /// Create a sample drawing its randomness from `rng`
    pub fn with_rng(config: SampleConfig, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_parts(config, rng))
    }

    pub(crate) fn from_parts(config: SampleConfig, rng: R) -> Self {
        Self {
            config,
            items: Vec::new(),
            seen: 0,
            rng,
        }
    }

    /// Offer an item to the sample
    pub fn add(&mut self, item: T) {
        self.seen += 1;

        if self.items.len() < self.config.capacity {
            self.items.push(item);
            return;
        }

        match self.config.policy {
            SamplingPolicy::Reservoir => {
                let j = self.rng.random_range(0..self.seen);
                if j < self.config.capacity as u64 {
                    self.items[j as usize] = item;
                }
            }
            SamplingPolicy::CoinFlip => {
                if self.rng.random_bool(0.5) {
                    let j = self.rng.random_range(0..self.items.len());
                    self.items[j] = item;
                }
            }
        }
    }

    /// Retained items, in no particular order
    pub fn sample(&self) -> &[T] {
        &self.items
    }

    pub fn into_sample(self) -> Vec<T> {
        self.items
    }

    pub fn config(&self) -> &SampleConfig {
        &self.config
    }

    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    pub fn policy(&self) -> SamplingPolicy {
        self.config.policy
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.config.capacity
    }

    /// Number of items offered so far
    pub fn items_seen(&self) -> u64 {
        self.seen
    }

    /// Probability that a given item of the stream is retained
    ///
    /// Exact for the reservoir policy. For the coin-flip policy this is the
    /// value a uniform sample would have, not the actual, recency-skewed
    /// retention probability.
    pub fn sampling_probability(&self) -> f64 {
        if self.seen == 0 {
            0.0
        } else {
            (self.config.capacity as f64 / self.seen as f64).min(1.0)
        }
    }
}

impl<R: Rng> BoundedSample<f64, R> {
    /// Percentile `q` (0 to 100) of the retained values
    ///
    /// NaN while fewer than two values are retained. Reorders the sample.
    pub fn percentile(&mut self, q: f64) -> f64 {
        if self.items.len() < 2 {
            return f64::NAN;
        }
        selection::percentile(&mut self.items, q)
    }

    /// Median of the retained values, NaN while fewer than two are retained
    pub fn median(&mut self) -> f64 {
        if self.items.len() < 2 {
            return f64::NAN;
        }
        selection::median(&mut self.items)
    }
}

impl<T, R> Sketch for BoundedSample<T, R>
where
    T: Clone + Debug,
    R: Rng + Clone + Debug,
{
    type Item = T;

    fn update(&mut self, item: &T) {
        self.add(item.clone());
    }

    /// Combine two samples of disjoint streams
    ///
    /// The merged sample takes slots from `self` and `other` in proportion to
    /// the number of items each has seen, drawing the retained items of each
    /// side without replacement.
    fn merge(&mut self, other: &Self) -> Result<(), MergeError> {
        ensure!(
            self.config == other.config,
            IncompatibleConfigSnafu {
                expected: format!("{:?}", self.config),
                found: format!("{:?}", other.config),
            }
        );

        if other.seen == 0 {
            return Ok(());
        }
        if self.seen == 0 {
            self.items = other.items.clone();
            self.seen = other.seen;
            return Ok(());
        }

        let total = self.seen + other.seen;
        let capacity = self.config.capacity;
        let own_len = self.items.len();
        let other_len = other.items.len();

        if own_len + other_len <= capacity {
            self.items.extend(other.items.iter().cloned());
        } else {
            let proportional =
                (capacity as u128 * self.seen as u128 + total as u128 / 2) / total as u128;
            let own_take = (proportional as usize)
                .min(own_len)
                .max(capacity.saturating_sub(other_len));
            let other_take = capacity - own_take;

            let own = index::sample(&mut self.rng, own_len, own_take);
            let theirs = index::sample(&mut self.rng, other_len, other_take);

            let mut merged = Vec::with_capacity(capacity);
            merged.extend(own.iter().map(|i| self.items[i].clone()));
            merged.extend(theirs.iter().map(|i| other.items[i].clone()));
            self.items = merged;
        }

        self.seen = total;
        Ok(())
    }

    fn clear(&mut self) {
        self.items.clear();
        self.seen = 0;
    }

    fn size_bytes(&self) -> usize {
        core::mem::size_of::<Self>() + self.items.capacity() * core::mem::size_of::<T>()
    }

    fn count(&self) -> u64 {
        self.seen
    }
}
