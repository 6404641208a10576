//! The `Dataset` façade

use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::trace;

use crate::config::{DatasetConfig, Mode, QuantileBackend};
use crate::error::{ConfigError, StatsError};
use crate::quantiles::TDigest;
use crate::sampling::BoundedSample;
use crate::selection;
use crate::statistics::RunningStats;
use crate::traits::QuantileSketch;

use super::buffer::GrowableBuffer;

/// Every statistic a [`Dataset`] reports
///
/// Fields are NaN where the statistic is undefined for the data seen.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Summary {
    pub count: u64,
    pub min: f64,
    pub q1: f64,
    pub mean: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub iqr: f64,
    pub variance: f64,
    pub sd: f64,
}

#[derive(Clone, Debug)]
enum Storage {
    Exact {
        buffer: GrowableBuffer,
        q1: Option<f64>,
        q3: Option<f64>,
    },
    Digest(TDigest),
    Sample(BoundedSample<f64>),
}

/// Descriptive statistics over a stream of `f64` values
///
/// In [`Mode::Exact`] every value is retained and order statistics are
/// exact. In [`Mode::Streaming`] memory is bounded and order statistics come
/// from a t-digest or a bounded sample. Count, mean, variance, min and max
/// are exact in both modes.
///
/// Statistics that are undefined for the current data are NaN: everything
/// on an empty dataset, the variance and every percentile below two values.
///
/// In exact mode the quartiles are computed once, on first request, and
/// then kept even if more values are ingested afterwards.
///
/// # Example
///
/// ```
/// use descstats::dataset::Dataset;
///
/// let mut dataset = Dataset::new();
/// dataset.extend([9.4, 2.1, -6.5, 34.2, 3.34, 67.5, 8.64]).unwrap();
///
/// assert_eq!(dataset.count(), 7);
/// assert_eq!(dataset.median(), 8.64);
/// assert_eq!(dataset.min(), -6.5);
/// assert!((dataset.mean() - 16.954285714).abs() < 1e-8);
/// ```
#[derive(Clone, Debug)]
pub struct Dataset {
    config: DatasetConfig,
    stats: RunningStats,
    storage: Storage,
}

impl Default for Dataset {
    fn default() -> Self {
        Self::new()
    }
}

impl Dataset {
    /// Empty exact-mode dataset with the default configuration
    pub fn new() -> Self {
        Self::exact()
    }

    /// Empty exact-mode dataset with the default configuration
    pub fn exact() -> Self {
        Self::build(DatasetConfig::exact())
    }

    /// Empty streaming dataset with the default configuration
    pub fn streaming() -> Self {
        Self::build(DatasetConfig::streaming())
    }

    pub fn with_config(config: DatasetConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: DatasetConfig) -> Self {
        let storage = match (config.mode, config.backend) {
            (Mode::Exact, _) => Storage::Exact {
                buffer: GrowableBuffer::new(config.growth),
                q1: None,
                q3: None,
            },
            (Mode::Streaming, QuantileBackend::Digest) => Storage::Digest(TDigest::from_parts(
                config.digest,
                SmallRng::seed_from_u64(config.seed),
            )),
            (Mode::Streaming, QuantileBackend::Sample) => Storage::Sample(
                BoundedSample::from_parts(config.sample, SmallRng::seed_from_u64(config.seed)),
            ),
        };

        Self {
            config,
            stats: RunningStats::new(),
            storage,
        }
    }

    pub fn config(&self) -> &DatasetConfig {
        &self.config
    }

    pub fn mode(&self) -> Mode {
        self.config.mode
    }

    /// Add a value
    ///
    /// NaN is ignored. In exact mode this fails only when the value buffer
    /// cannot grow; the value is then dropped and every earlier value is
    /// kept.
    pub fn ingest(&mut self, value: f64) -> Result<(), StatsError> {
        if value.is_nan() {
            trace!("Ignoring NaN value.");
            return Ok(());
        }

        match &mut self.storage {
            Storage::Exact { buffer, .. } => buffer.push(value)?,
            Storage::Digest(digest) => digest.add(value),
            Storage::Sample(sample) => sample.add(value),
        }
        self.stats.add(value);
        Ok(())
    }

    /// Add every value, stopping at the first failure
    pub fn extend<I>(&mut self, values: I) -> Result<(), StatsError>
    where
        I: IntoIterator<Item = f64>,
    {
        values.into_iter().try_for_each(|value| self.ingest(value))
    }

    /// Number of values ingested
    pub fn count(&self) -> u64 {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    pub fn min(&self) -> f64 {
        self.stats.min().unwrap_or(f64::NAN)
    }

    pub fn max(&self) -> f64 {
        self.stats.max().unwrap_or(f64::NAN)
    }

    pub fn mean(&self) -> f64 {
        self.stats.mean()
    }

    /// Sample variance (Bessel-corrected)
    pub fn variance(&self) -> f64 {
        self.stats.variance()
    }

    /// Sample standard deviation
    pub fn sd(&self) -> f64 {
        self.stats.stddev()
    }

    /// Percentile `q`, from 0 (minimum) to 100 (maximum)
    ///
    /// NaN when `q` is out of range or fewer than two values were ingested.
    pub fn percentile(&mut self, q: f64) -> f64 {
        if self.count() < 2 || !(0.0..=100.0).contains(&q) {
            return f64::NAN;
        }

        match &mut self.storage {
            Storage::Exact { buffer, .. } => selection::percentile(buffer.as_mut_slice(), q),
            Storage::Digest(digest) => digest.quantile(q / 100.0).unwrap_or(f64::NAN),
            Storage::Sample(sample) => sample.percentile(q),
        }
    }

    pub fn median(&mut self) -> f64 {
        if self.count() < 2 {
            return f64::NAN;
        }

        match &mut self.storage {
            Storage::Exact { buffer, .. } => selection::median(buffer.as_mut_slice()),
            Storage::Digest(digest) => digest.median().unwrap_or(f64::NAN),
            Storage::Sample(sample) => sample.median(),
        }
    }

    /// 25th percentile
    pub fn first_quartile(&mut self) -> f64 {
        if self.count() < 2 {
            return f64::NAN;
        }

        if let Storage::Exact { buffer, q1, .. } = &mut self.storage {
            return *q1.get_or_insert_with(|| selection::percentile(buffer.as_mut_slice(), 25.0));
        }
        self.percentile(25.0)
    }

    /// 75th percentile
    pub fn third_quartile(&mut self) -> f64 {
        if self.count() < 2 {
            return f64::NAN;
        }

        if let Storage::Exact { buffer, q3, .. } = &mut self.storage {
            return *q3.get_or_insert_with(|| selection::percentile(buffer.as_mut_slice(), 75.0));
        }
        self.percentile(75.0)
    }

    /// Interquartile range, `Q3 - Q1`
    pub fn iqr(&mut self) -> f64 {
        self.third_quartile() - self.first_quartile()
    }

    /// Compute every statistic at once
    pub fn summary(&mut self) -> Summary {
        let q1 = self.first_quartile();
        let q3 = self.third_quartile();
        Summary {
            count: self.count(),
            min: self.min(),
            q1,
            mean: self.mean(),
            median: self.median(),
            q3,
            max: self.max(),
            iqr: q3 - q1,
            variance: self.variance(),
            sd: self.sd(),
        }
    }

    /// Release unused buffer capacity in exact mode
    pub fn shrink_to_fit(&mut self) {
        if let Storage::Exact { buffer, .. } = &mut self.storage {
            buffer.shrink_to_fit();
        }
    }

    /// Retained values in exact mode, in unspecified order
    pub fn values(&self) -> Option<&[f64]> {
        match &self.storage {
            Storage::Exact { buffer, .. } => Some(buffer.as_slice()),
            _ => None,
        }
    }

    /// The t-digest backing a streaming dataset, if any
    pub fn digest(&self) -> Option<&TDigest> {
        match &self.storage {
            Storage::Digest(digest) => Some(digest),
            _ => None,
        }
    }

    /// The sample backing a streaming dataset, if any
    pub fn sample(&self) -> Option<&BoundedSample<f64>> {
        match &self.storage {
            Storage::Sample(sample) => Some(sample),
            _ => None,
        }
    }
}
