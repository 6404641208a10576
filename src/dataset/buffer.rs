//! Growable value buffer with an explicit, fallible growth policy

use tracing::{error, warn};

use crate::error::{AllocationSnafu, StatsError};

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// Number of slots reserved by the first growth
pub const DEFAULT_GROWTH_BASE: usize = 32;

/// How the exact-mode buffer grows when it is full
///
/// Growth first tries to double the capacity. When that allocation fails it
/// falls back to progressively smaller increments (half, quarter, ... of the
/// current capacity, never less than `base` slots). Only when every attempt
/// fails is an error reported, and the buffer is left untouched.
///
/// `max_len` caps the number of values the buffer may ever hold. Attempts
/// above the cap are treated exactly like allocation failures; when every
/// regular step overshoots it, the cap itself is the last attempt.
///
/// # Example
///
/// ```
/// use descstats::dataset::GrowthPolicy;
///
/// let policy = GrowthPolicy::default();
/// let attempts: Vec<usize> = policy.candidates(256).collect();
/// assert_eq!(attempts, vec![512, 384, 320, 288]);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GrowthPolicy {
    /// Initial capacity and smallest increment
    pub base: usize,
    /// Hard cap on the number of retained values
    pub max_len: Option<usize>,
}

impl Default for GrowthPolicy {
    fn default() -> Self {
        Self {
            base: DEFAULT_GROWTH_BASE,
            max_len: None,
        }
    }
}

impl GrowthPolicy {
    pub fn new(base: usize) -> Self {
        Self {
            base,
            max_len: None,
        }
    }

    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = Some(max_len);
        self
    }

    /// Capacities to try, in order, when a buffer of `capacity` slots is full
    pub fn candidates(&self, capacity: usize) -> impl Iterator<Item = usize> {
        let base = self.base.max(1);
        let first = if capacity == 0 {
            base
        } else {
            capacity.saturating_mul(2)
        };

        // Below or at one base block, doubling is already the smallest step.
        let mut increment = if capacity > base { capacity / 2 } else { 0 };
        let fallbacks = core::iter::from_fn(move || {
            if increment == 0 {
                return None;
            }
            if increment > base {
                let next = capacity.saturating_add(increment);
                increment /= 2;
                Some(next)
            } else {
                increment = 0;
                Some(capacity.saturating_add(base))
            }
        });

        // The smallest regular step; a cap below it is tried on its own.
        let smallest = if capacity > base {
            capacity.saturating_add(base)
        } else {
            first
        };
        let cap = self.max_len.filter(|&max| max > capacity && max < smallest);

        core::iter::once(first).chain(fallbacks).chain(cap)
    }

    fn allows(&self, capacity: usize) -> bool {
        self.max_len.map_or(true, |max| capacity <= max)
    }
}

/// Append-only `f64` buffer following a [`GrowthPolicy`]
#[derive(Clone, Debug, Default)]
pub struct GrowableBuffer {
    values: Vec<f64>,
    policy: GrowthPolicy,
}

impl GrowableBuffer {
    pub fn new(policy: GrowthPolicy) -> Self {
        Self {
            values: Vec::new(),
            policy,
        }
    }

    /// Append a value, growing first if the buffer is full
    ///
    /// On error the value is not added and every earlier value is retained.
    pub fn push(&mut self, value: f64) -> Result<(), StatsError> {
        if self.values.len() == self.values.capacity() {
            self.grow()?;
        }
        self.values.push(value);
        Ok(())
    }

    fn grow(&mut self) -> Result<(), StatsError> {
        let len = self.values.len();
        let capacity = self.values.capacity();
        let mut requested = capacity;

        for (attempt, target) in self.policy.candidates(capacity).enumerate() {
            requested = target;
            if attempt > 0 {
                warn!(
                    capacity,
                    target, "Value buffer growth failed, retrying with a smaller increment."
                );
            }
            if !self.policy.allows(target) {
                continue;
            }
            if self.values.try_reserve_exact(target - len).is_ok() {
                return Ok(());
            }
        }

        error!(
            retained = len,
            requested, "Unable to grow value buffer; dataset is full."
        );
        AllocationSnafu {
            requested,
            retained: len,
        }
        .fail()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.values.capacity()
    }

    /// Release unused capacity
    pub fn shrink_to_fit(&mut self) {
        self.values.shrink_to_fit();
    }

    pub fn policy(&self) -> &GrowthPolicy {
        &self.policy
    }
}
