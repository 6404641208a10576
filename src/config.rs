//! Configuration
//!
//! All configuration types have defaults matching the classic `desc` tool
//! (δ = 0.01, K = 100, a 4096-slot sample) and are validated before use.
//! With the `serde` feature they can be loaded from any serde format.
//!
//! # Example
//!
//! ```
//! use descstats::config::{DatasetConfig, DigestConfig, Mode, QuantileBackend};
//!
//! let config = DatasetConfig::streaming()
//!     .with_backend(QuantileBackend::Digest)
//!     .with_digest(DigestConfig::new(0.005, 200.0))
//!     .with_seed(7);
//!
//! assert_eq!(config.mode, Mode::Streaming);
//! assert!(config.validate().is_ok());
//! ```

use snafu::ensure;

use crate::dataset::GrowthPolicy;
use crate::error::{
    ConfigError, InvalidDeltaSnafu, InvalidGrowthBaseSnafu, InvalidScaleSnafu, ZeroCapacitySnafu,
};

/// Seed used when none is configured
pub const DEFAULT_SEED: u64 = 0x12345678;

/// Whether a dataset retains every value
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Mode {
    /// Keep all values; quantiles are exact
    #[default]
    Exact,
    /// Keep bounded summaries; quantiles are approximate
    Streaming,
}

/// Quantile source of a streaming dataset
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum QuantileBackend {
    /// t-digest
    #[default]
    Digest,
    /// Selection over a bounded random sample
    Sample,
}

/// Admission policy of a [`BoundedSample`](crate::sampling::BoundedSample) once full
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SamplingPolicy {
    /// Algorithm R: the ith item replaces a random slot with probability
    /// `capacity / i`, giving a uniform sample of the whole stream
    #[default]
    Reservoir,
    /// Every item replaces a random slot with probability 1/2
    ///
    /// Matches the output of the classic `desc` tool. The retained sample
    /// is skewed toward the most recent items once the stream is much longer
    /// than the capacity.
    CoinFlip,
}

/// t-digest parameters
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DigestConfig {
    /// Target relative accuracy δ
    pub delta: f64,
    /// Scale K; the digest compresses once it holds more than `K / δ` centroids
    pub scale: f64,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            delta: 0.01,
            scale: 100.0,
        }
    }
}

impl DigestConfig {
    pub fn new(delta: f64, scale: f64) -> Self {
        Self { delta, scale }
    }

    /// Maximum number of centroids before a compression is triggered
    pub fn max_centroids(&self) -> usize {
        (self.scale / self.delta) as usize
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure!(
            self.delta.is_finite() && self.delta > 0.0 && self.delta <= 1.0,
            InvalidDeltaSnafu { delta: self.delta }
        );
        ensure!(
            self.scale.is_finite() && self.scale > 0.0,
            InvalidScaleSnafu { scale: self.scale }
        );
        Ok(())
    }
}

/// Bounded sample parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SampleConfig {
    pub capacity: usize,
    pub policy: SamplingPolicy,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            capacity: 4096,
            policy: SamplingPolicy::Reservoir,
        }
    }
}

impl SampleConfig {
    pub fn new(capacity: usize, policy: SamplingPolicy) -> Self {
        Self { capacity, policy }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure!(self.capacity > 0, ZeroCapacitySnafu);
        Ok(())
    }
}

/// Full configuration of a [`Dataset`](crate::dataset::Dataset)
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DatasetConfig {
    pub mode: Mode,
    /// Quantile source in streaming mode; ignored in exact mode
    pub backend: QuantileBackend,
    pub digest: DigestConfig,
    pub sample: SampleConfig,
    /// Exact-mode buffer growth
    pub growth: GrowthPolicy,
    /// Seed of the random sources used by the digest and the sample
    pub seed: u64,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Exact,
            backend: QuantileBackend::Digest,
            digest: DigestConfig::default(),
            sample: SampleConfig::default(),
            growth: GrowthPolicy::default(),
            seed: DEFAULT_SEED,
        }
    }
}

impl DatasetConfig {
    /// Default configuration in exact mode
    pub fn exact() -> Self {
        Self::default()
    }

    /// Default configuration in streaming mode
    pub fn streaming() -> Self {
        Self {
            mode: Mode::Streaming,
            ..Self::default()
        }
    }

    pub fn with_backend(mut self, backend: QuantileBackend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_digest(mut self, digest: DigestConfig) -> Self {
        self.digest = digest;
        self
    }

    pub fn with_sample(mut self, sample: SampleConfig) -> Self {
        self.sample = sample;
        self
    }

    pub fn with_growth(mut self, growth: GrowthPolicy) -> Self {
        self.growth = growth;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Check every section, including the ones the chosen mode will not use
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.digest.validate()?;
        self.sample.validate()?;
        ensure!(self.growth.base > 0, InvalidGrowthBaseSnafu);
        Ok(())
    }
}
