//! t-digest quantile estimator
//!
//! Streaming quantile estimation with the clustering t-digest of Dunning.
//! Every value is offered to its nearest centroid, which accepts it only while
//! its weight stays under a bound proportional to `q * (1 - q)` at its
//! position in the distribution. Centroids near the median can grow large
//! while centroids in the tails stay small, so accuracy is best exactly where
//! quantiles are most sensitive.
//!
//! # Randomness
//!
//! Ties between equally distant centroids are broken at random, and a
//! compression re-inserts centroids in random order. The random source is a
//! type parameter so results are reproducible under a fixed seed; the
//! default is [`SmallRng`].

use core::fmt::Debug;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use smallvec::SmallVec;
use snafu::ensure;
use tracing::debug;

use crate::config::{DigestConfig, DEFAULT_SEED};
use crate::error::{
    ConfigError, EmptySketchSnafu, IncompatibleConfigSnafu, InvalidQuantileSnafu, MergeError,
    StatsError,
};
use crate::math;
use crate::traits::{QuantileSketch, Sketch};

#[cfg(not(feature = "std"))]
use alloc::{format, vec::Vec};

/// Two centroids whose distances to a value differ by no more than this are
/// considered equally close.
const TIE_TOLERANCE: f64 = 1e-9;

/// A centroid in the t-digest
///
/// Centroids represent clusters of values with a mean and a weight (the
/// number of values absorbed). Centroids are ordered by mean.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Centroid {
    /// Mean value of the centroid
    pub mean: f64,
    /// Number of values in the centroid
    pub weight: u64,
}

impl Centroid {
    /// Create a new centroid
    pub fn new(mean: f64, weight: u64) -> Self {
        Self { mean, weight }
    }

    /// Absorb `weight` copies of `value`, updating the weighted mean
    pub fn add(&mut self, value: f64, weight: u64) {
        self.weight += weight;
        self.mean += weight as f64 * (value - self.mean) / self.weight as f64;
    }
}

/// t-digest quantile sketch
///
/// - Memory bounded by the `K / δ` centroid limit of its [`DigestConfig`]
/// - Exact minimum and maximum, approximate interior quantiles
/// - Mergeable with any digest built with the same parameters
///
/// The centroid limit is reached only when `K` is large compared to the
/// number of centroids the accuracy bound naturally produces; with the
/// defaults (δ = 0.01, K = 100) that takes streams of astronomical length.
///
/// # Example
///
/// ```
/// use descstats::quantiles::TDigest;
/// use descstats::traits::QuantileSketch;
///
/// let mut digest = TDigest::default();
///
/// for i in 1..=1000 {
///     digest.add(i as f64);
/// }
///
/// let p50 = digest.quantile(0.5).unwrap();
/// assert!((p50 - 500.0).abs() < 25.0);
/// assert_eq!(digest.quantile(1.0).unwrap(), 1000.0);
/// ```
#[derive(Clone, Debug)]
pub struct TDigest<R = SmallRng> {
    config: DigestConfig,
    /// Centroids sorted by mean
    centroids: Vec<Centroid>,
    /// Sum of all centroid weights
    total: u64,
    min: f64,
    max: f64,
    /// Number of compressions performed so far
    compressions: u64,
    rng: R,
}

impl Default for TDigest {
    fn default() -> Self {
        Self::from_parts(DigestConfig::default(), SmallRng::seed_from_u64(DEFAULT_SEED))
    }
}

impl TDigest {
    /// Create a digest seeded with a fixed value
    pub fn with_seed(config: DigestConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(config, SmallRng::seed_from_u64(seed))
    }
}

impl<R: Rng> TDigest<R> {
    /// Create a digest drawing its randomness from `rng`
    pub fn with_rng(config: DigestConfig, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_parts(config, rng))
    }

    pub(crate) fn from_parts(config: DigestConfig, rng: R) -> Self {
        Self {
            config,
            centroids: Vec::new(),
            total: 0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            compressions: 0,
            rng,
        }
    }

    pub fn config(&self) -> &DigestConfig {
        &self.config
    }

    /// Centroids in increasing order of mean
    pub fn centroids(&self) -> &[Centroid] {
        &self.centroids
    }

    pub fn num_centroids(&self) -> usize {
        self.centroids.len()
    }

    /// Total weight added
    pub fn total_weight(&self) -> u64 {
        self.total
    }

    /// Number of compressions performed so far
    pub fn compressions(&self) -> u64 {
        self.compressions
    }

    /// Add `weight` copies of `value`
    ///
    /// NaN values and zero weights are ignored.
    pub fn add_weighted(&mut self, value: f64, weight: u64) {
        if value.is_nan() || weight == 0 {
            return;
        }

        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.total += weight;
        self.insert(value, weight);

        if self.centroids.len() > self.config.max_centroids() {
            self.compress();
        }
    }

    /// Offer `weight` copies of `value` to the nearest centroids, creating a
    /// new centroid if none of them can take it. `self.total` must already
    /// include `weight`.
    fn insert(&mut self, value: f64, weight: u64) {
        if value.is_infinite() {
            // An infinite value has no distance to any other centroid; it
            // only ever joins a centroid sitting at the same infinity.
            match self.centroids.iter().position(|c| c.mean == value) {
                Some(index) => self.centroids[index].weight += weight,
                None => self.insert_centroid(Centroid::new(value, weight)),
            }
            return;
        }

        let mut candidates = self.closest(value);

        while !candidates.is_empty() {
            let pick = self.rng.random_range(0..candidates.len());
            let index = candidates.swap_remove(pick);

            let q = self.centroid_quantile(index);
            let threshold = 4.0 * self.total as f64 * self.config.delta * q * (1.0 - q);
            if (self.centroids[index].weight + weight) as f64 <= threshold {
                // The mean is the sort key: take the centroid out before
                // moving it and put it back where it now belongs.
                let mut centroid = self.centroids.remove(index);
                centroid.add(value, weight);
                self.insert_centroid(centroid);
                return;
            }
        }

        self.insert_centroid(Centroid::new(value, weight));
    }

    /// Indices of all centroids whose mean is closest to `value`
    fn closest(&self, value: f64) -> SmallVec<[usize; 4]> {
        let mut closest = SmallVec::new();
        if self.centroids.is_empty() {
            return closest;
        }

        let len = self.centroids.len();
        let split = self.centroids.partition_point(|c| c.mean < value);
        let distance = |i: usize| math::abs(value - self.centroids[i].mean);

        let mut nearest = f64::INFINITY;
        if split > 0 {
            nearest = distance(split - 1);
        }
        if split < len {
            nearest = nearest.min(distance(split));
        }
        let is_nearest = |i: usize| math::abs(distance(i) - nearest) <= TIE_TOLERANCE;

        let mut lo = split;
        while lo > 0 && is_nearest(lo - 1) {
            lo -= 1;
        }
        let mut hi = split;
        while hi < len && is_nearest(hi) {
            hi += 1;
        }

        closest.extend(lo..hi);
        closest
    }

    /// Fraction of the total weight below the centre of centroid `index`
    fn centroid_quantile(&self, index: usize) -> f64 {
        let before: u64 = self.centroids[..index].iter().map(|c| c.weight).sum();
        (before as f64 + self.centroids[index].weight as f64 / 2.0) / self.total as f64
    }

    /// Insert after any centroid with an equal mean
    fn insert_centroid(&mut self, centroid: Centroid) {
        let position = self.centroids.partition_point(|c| c.mean <= centroid.mean);
        self.centroids.insert(position, centroid);
    }

    /// Rebuild the digest by re-adding every centroid in random order
    ///
    /// Runs automatically once the digest holds more than `K / δ` centroids.
    /// Total weight, minimum and maximum are preserved.
    pub fn compress(&mut self) {
        let before = self.centroids.len();
        let mut centroids = core::mem::take(&mut self.centroids);
        centroids.shuffle(&mut self.rng);

        self.total = 0;
        for centroid in centroids {
            self.total += centroid.weight;
            self.insert(centroid.mean, centroid.weight);
        }
        self.compressions += 1;

        debug!(
            before,
            after = self.centroids.len(),
            compressions = self.compressions,
            "Compressed t-digest."
        );
    }

    /// Interpolation span of centroid `index`
    ///
    /// Half the distance between the neighbouring means, as in Dunning's
    /// paper, or the one-sided gap at either end. Infinite neighbours are
    /// skipped so a finite centroid always gets a finite span.
    fn span(&self, index: usize) -> f64 {
        let c = &self.centroids;
        let mean = c[index].mean;
        let finite = |i: usize| c.get(i).map(|c| c.mean).filter(|m| m.is_finite());
        let prev = index.checked_sub(1).and_then(finite);
        let next = finite(index + 1);

        match (prev, next) {
            (Some(prev), Some(next)) => next / 2.0 - prev / 2.0,
            (Some(prev), None) => mean - prev,
            (None, Some(next)) => next - mean,
            (None, None) => 0.0,
        }
    }

    fn quantile_impl(&self, q: f64) -> Result<f64, StatsError> {
        ensure!(!self.centroids.is_empty(), EmptySketchSnafu);
        ensure!((0.0..=1.0).contains(&q), InvalidQuantileSnafu { q });

        if q == 0.0 {
            return Ok(self.min);
        }
        if q == 1.0 {
            return Ok(self.max);
        }

        // Each centroid spreads its weight uniformly over `span` around its
        // mean; find the centroid holding the target weight and place the
        // answer at the target's relative position within it.
        let target = q * self.total as f64;
        let mut cumulative = 0.0;
        for (index, centroid) in self.centroids.iter().enumerate() {
            let weight = centroid.weight as f64;
            if target < cumulative + weight {
                if centroid.mean.is_infinite() {
                    return Ok(centroid.mean);
                }
                let offset = (target - cumulative) / weight - 0.5;
                let estimate = centroid.mean + offset * self.span(index);
                return Ok(estimate.clamp(self.min, self.max));
            }
            cumulative += weight;
        }

        Ok(self.max)
    }

    /// Piecewise-linear CDF through each centroid's midpoint, anchored at
    /// `(min, 0)` and `(max, total)`.
    fn rank_impl(&self, value: f64) -> f64 {
        if self.total == 0 || value.is_nan() {
            return f64::NAN;
        }
        if value >= self.max {
            return 1.0;
        }
        if value < self.min {
            return 0.0;
        }

        let total = self.total as f64;
        let mut prev_rank = 0.0;
        let mut prev_mean = self.min;
        let mut cumulative = 0.0;

        for centroid in &self.centroids {
            let mid_rank = cumulative + centroid.weight as f64 / 2.0;
            if value < centroid.mean {
                let denom = centroid.mean - prev_mean;
                if denom <= 0.0 {
                    return prev_rank / total;
                }
                if denom.is_infinite() {
                    return cumulative / total;
                }
                let t = (value - prev_mean) / denom;
                return (prev_rank + t * (mid_rank - prev_rank)) / total;
            }
            cumulative += centroid.weight as f64;
            prev_rank = mid_rank;
            prev_mean = centroid.mean;
        }

        let denom = self.max - prev_mean;
        if denom <= 0.0 {
            return 1.0;
        }
        let t = (value - prev_mean) / denom;
        (prev_rank + t * (total - prev_rank)) / total
    }

    fn compatible_with(&self, other: &Self) -> bool {
        let close =
            |a: f64, b: f64| math::abs(a - b) <= 1e-6 * (math::abs(a) + math::abs(b)) * 0.5;
        close(self.config.delta, other.config.delta) && close(self.config.scale, other.config.scale)
    }
}

impl<R: Rng + Clone + Debug> Sketch for TDigest<R> {
    type Item = f64;

    fn update(&mut self, item: &f64) {
        self.add_weighted(*item, 1);
    }

    /// Re-add every centroid of `other` in random order
    fn merge(&mut self, other: &Self) -> Result<(), MergeError> {
        ensure!(
            self.compatible_with(other),
            IncompatibleConfigSnafu {
                expected: format!("delta={}, scale={}", self.config.delta, self.config.scale),
                found: format!("delta={}, scale={}", other.config.delta, other.config.scale),
            }
        );

        if other.total == 0 {
            return Ok(());
        }

        let mut incoming = other.centroids.clone();
        incoming.shuffle(&mut self.rng);
        for centroid in incoming {
            self.add_weighted(centroid.mean, centroid.weight);
        }
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);

        Ok(())
    }

    fn clear(&mut self) {
        self.centroids.clear();
        self.total = 0;
        self.min = f64::INFINITY;
        self.max = f64::NEG_INFINITY;
        self.compressions = 0;
    }

    fn size_bytes(&self) -> usize {
        core::mem::size_of::<Self>() + self.centroids.capacity() * core::mem::size_of::<Centroid>()
    }

    fn count(&self) -> u64 {
        self.total
    }
}

impl<R: Rng + Clone + Debug> QuantileSketch for TDigest<R> {
    fn add(&mut self, value: f64) {
        self.add_weighted(value, 1);
    }

    fn quantile(&self, q: f64) -> Result<f64, StatsError> {
        self.quantile_impl(q)
    }

    fn rank(&self, value: f64) -> f64 {
        self.rank_impl(value)
    }

    fn min(&self) -> Option<f64> {
        (self.total > 0).then_some(self.min)
    }

    fn max(&self) -> Option<f64> {
        (self.total > 0).then_some(self.max)
    }
}

#[cfg(feature = "serde")]
impl<R> serde::Serialize for TDigest<R> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("TDigest", 6)?;
        state.serialize_field("delta", &self.config.delta)?;
        state.serialize_field("scale", &self.config.scale)?;
        state.serialize_field("centroids", &self.centroids)?;
        state.serialize_field("total", &self.total)?;
        state.serialize_field("min", &self.min)?;
        state.serialize_field("max", &self.max)?;
        state.end()
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Centroid {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeTuple;
        let mut tuple = serializer.serialize_tuple(2)?;
        tuple.serialize_element(&self.mean)?;
        tuple.serialize_element(&self.weight)?;
        tuple.end()
    }
}
