//! Bounded continuous distribution with optional log scale and step grid.

use core::fmt;
use std::collections::HashSet;

use parking_lot::Mutex;

use super::{Advisory, AttributeReader, Distribution, FromAttributes, UniqueSample};
use crate::error::{Error, Result};
use crate::rng_util;
use crate::value::{Mapping, Value};

/// Default cap on sampling rounds in [`FloatDist::sample_unique_f64`].
pub const DEFAULT_MAX_ATTEMPTS: usize = 1000;

/// Slack added before flooring a grid position, so a value that sits on a
/// grid point is not pushed into the cell below by rounding error.
const GRID_EPS: f64 = 1e-9;

/// Step counts at or above this do not fit in a `usize`.
#[allow(clippy::cast_precision_loss)]
const USIZE_LIMIT: f64 = usize::MAX as f64;

/// A continuous distribution over `[min_val, max_val]`.
///
/// Values are drawn uniformly, or log-uniformly when log scale is enabled.
/// With a step set, every value is snapped down onto the grid
/// `min_val, min_val + step, min_val + 2 * step, ...` and each grid point is
/// equally likely (in the chosen scale). The top grid point owns a full
/// step-wide cell like the others, so it is not under-weighted when
/// `max_val` sits just above it.
///
/// # Examples
///
/// ```
/// use trialspec::distribution::FloatDist;
///
/// let lr = FloatDist::builder("lr", 1e-5, 1e-1).log_scale().seed(7).build().unwrap();
/// for v in lr.sample_f64(20).unwrap() {
///     assert!((1e-5..=1e-1).contains(&v));
/// }
///
/// let depth = FloatDist::builder("depth", 1.0, 10.0).step(1.0).build().unwrap();
/// assert_eq!(depth.cardinality(), Some(10));
///
/// let unique = depth.sample_unique_f64(15).unwrap();
/// assert_eq!(unique.len(), 10);
/// assert!(!unique.is_complete());
/// ```
pub struct FloatDist {
    name: String,
    min_val: f64,
    max_val: f64,
    step: Option<f64>,
    log: bool,
    max_attempts: usize,
    rng: Mutex<fastrand::Rng>,
}

impl FloatDist {
    /// Creates a linear, unstepped distribution.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBounds`] unless `min_val < max_val`.
    pub fn new(name: impl Into<String>, min_val: f64, max_val: f64) -> Result<Self> {
        Self::builder(name, min_val, max_val).build()
    }

    /// Starts a builder for the range `[min_val, max_val]`.
    #[must_use]
    pub fn builder(name: impl Into<String>, min_val: f64, max_val: f64) -> FloatDistBuilder {
        FloatDistBuilder::new(name, min_val, max_val)
    }

    #[must_use]
    pub fn min_val(&self) -> f64 {
        self.min_val
    }

    #[must_use]
    pub fn max_val(&self) -> f64 {
        self.max_val
    }

    #[must_use]
    pub fn step(&self) -> Option<f64> {
        self.step
    }

    #[must_use]
    pub fn is_log(&self) -> bool {
        self.log
    }

    #[must_use]
    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Number of distinct reachable values, or `None` for an unstepped range.
    ///
    /// For a step grid this is `floor((max_val - min_val) / step) + 1`,
    /// saturating at `usize::MAX` for grids too large to count.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn cardinality(&self) -> Option<usize> {
        self.step.map(|step| {
            let steps = self.grid_steps(step);
            if steps >= USIZE_LIMIT {
                usize::MAX
            } else {
                (steps as usize).saturating_add(1)
            }
        })
    }

    /// Whole steps from `min_val` to the last grid point.
    fn grid_steps(&self, step: f64) -> f64 {
        grid_position((self.max_val - self.min_val) / step)
    }

    /// Draws `n` values, possibly with repeats.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSampleSize`] if `n` is zero.
    pub fn sample_f64(&self, n: usize) -> Result<Vec<f64>> {
        if n == 0 {
            return Err(Error::InvalidSampleSize);
        }
        let mut rng = self.rng.lock();
        Ok((0..n).map(|_| self.draw(&mut rng)).collect())
    }

    /// Draws up to `n` distinct values.
    ///
    /// The target is `n`, capped at [`cardinality`](Self::cardinality) for a
    /// stepped range. Batches of `target` values are drawn until the target
    /// is reached or `max_attempts` batches have been spent. Either shortfall
    /// is reported as an [`Advisory`] rather than an error.
    ///
    /// # Errors
    ///
    /// Only propagates sampling errors; the result is otherwise always `Ok`.
    pub fn sample_unique_f64(&self, n: usize) -> Result<UniqueSample<f64>> {
        let mut advisories = Vec::new();
        let target = match self.cardinality() {
            Some(available) if n > available => {
                advisories.push(
                    Advisory::CardinalityExceeded {
                        name: self.name.clone(),
                        requested: n,
                        available,
                    }
                    .reported(),
                );
                available
            }
            _ => n,
        };
        if target == 0 {
            return Ok(UniqueSample {
                values: Vec::new(),
                advisories,
            });
        }

        let mut seen = HashSet::new();
        let mut values = Vec::new();
        let mut attempts = 0;
        while values.len() < target && attempts < self.max_attempts {
            attempts += 1;
            for v in self.sample_f64(target)? {
                if values.len() == target {
                    break;
                }
                if seen.insert(dedup_key(v)) {
                    values.push(v);
                }
            }
        }

        if values.len() < target {
            advisories.push(
                Advisory::AttemptsExhausted {
                    name: self.name.clone(),
                    requested: target,
                    found: values.len(),
                    attempts,
                }
                .reported(),
            );
        }
        Ok(UniqueSample { values, advisories })
    }

    fn draw(&self, rng: &mut fastrand::Rng) -> f64 {
        let Some(step) = self.step else {
            return if self.log {
                rng_util::f64_range(rng, self.min_val.ln(), self.max_val.ln())
                    .exp()
                    .clamp(self.min_val, self.max_val)
            } else {
                rng_util::f64_range(rng, self.min_val, self.max_val)
            };
        };

        // The draw covers the whole cell above the last grid point, so that
        // point is as likely as any other instead of needing an exact hit on
        // `max_val`.
        let n_steps = self.grid_steps(step);
        let upper = self.min_val + (n_steps + 1.0) * step;
        let raw = if self.log {
            rng_util::f64_range(rng, self.min_val.ln(), upper.ln()).exp()
        } else {
            rng_util::f64_range(rng, self.min_val, upper)
        };
        self.snap(raw, step, n_steps)
    }

    /// Rounds `v` down to the nearest grid point, never leaving the bounds.
    fn snap(&self, v: f64, step: f64, n_steps: f64) -> f64 {
        let k = grid_position((v - self.min_val) / step).min(n_steps);
        (self.min_val + k * step).clamp(self.min_val, self.max_val)
    }
}

/// Floors a position measured in steps, tolerating rounding just below a grid point.
fn grid_position(position: f64) -> f64 {
    (position + GRID_EPS).floor().max(0.0)
}

/// Hash key for float uniqueness; folds `-0.0` into `0.0`.
fn dedup_key(v: f64) -> u64 {
    (v + 0.0).to_bits()
}

impl Clone for FloatDist {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            min_val: self.min_val,
            max_val: self.max_val,
            step: self.step,
            log: self.log,
            max_attempts: self.max_attempts,
            rng: Mutex::new(self.rng.lock().fork()),
        }
    }
}

impl fmt::Debug for FloatDist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FloatDist")
            .field("name", &self.name)
            .field("min_val", &self.min_val)
            .field("max_val", &self.max_val)
            .field("step", &self.step)
            .field("log", &self.log)
            .field("max_attempts", &self.max_attempts)
            .finish_non_exhaustive()
    }
}

/// Compares the attributes; RNG state is ignored.
impl PartialEq for FloatDist {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.min_val.to_bits() == other.min_val.to_bits()
            && self.max_val.to_bits() == other.max_val.to_bits()
            && self.step.map(f64::to_bits) == other.step.map(f64::to_bits)
            && self.log == other.log
            && self.max_attempts == other.max_attempts
    }
}

impl Distribution for FloatDist {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &str {
        Self::KIND
    }

    fn sample(&self, n: usize) -> Result<Vec<Value>> {
        Ok(self.sample_f64(n)?.into_iter().map(Value::Float).collect())
    }

    fn sample_unique(&self, n: usize) -> Result<UniqueSample> {
        Ok(self.sample_unique_f64(n)?.map(Value::Float))
    }

    fn attributes(&self) -> Mapping {
        let mut attrs = Mapping::new();
        attrs.insert("name", self.name.as_str());
        attrs.insert("min_val", self.min_val);
        attrs.insert("max_val", self.max_val);
        attrs.insert("step", self.step);
        attrs.insert("log", self.log);
        attrs.insert(
            "max_attempts",
            i64::try_from(self.max_attempts).unwrap_or(i64::MAX),
        );
        attrs
    }
}

impl FromAttributes for FloatDist {
    const KIND: &'static str = "FloatDist";

    fn from_attributes(attributes: &Mapping) -> Result<Self> {
        let reader = AttributeReader::new(Self::KIND, attributes);
        let mut builder = Self::builder(
            reader.str("name")?,
            reader.f64("min_val")?,
            reader.f64("max_val")?,
        )
        .max_attempts(reader.usize_or("max_attempts", DEFAULT_MAX_ATTEMPTS)?);
        builder.step = reader.opt_f64("step")?;
        builder.log = reader.bool_or("log", false)?;
        builder.build()
    }
}

/// Builder for [`FloatDist`].
///
/// Validation is deferred to [`build`](Self::build).
#[derive(Clone, Debug)]
pub struct FloatDistBuilder {
    name: String,
    min_val: f64,
    max_val: f64,
    step: Option<f64>,
    log: bool,
    max_attempts: usize,
    seed: Option<u64>,
}

impl FloatDistBuilder {
    /// Creates a builder for a linear, unstepped range with default settings.
    #[must_use]
    pub fn new(name: impl Into<String>, min_val: f64, max_val: f64) -> Self {
        Self {
            name: name.into(),
            min_val,
            max_val,
            step: None,
            log: false,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            seed: None,
        }
    }

    /// Snaps sampled values onto a grid with this spacing.
    #[must_use]
    pub fn step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }

    /// Samples log-uniformly. Both bounds must then be positive.
    #[must_use]
    pub fn log_scale(mut self) -> Self {
        self.log = true;
        self
    }

    /// Caps the number of sampling rounds spent hunting for unique values.
    #[must_use]
    pub fn max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Fixes the RNG seed for reproducible draws.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration and builds the distribution.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidBounds`] unless `min_val < max_val`, or when log
    ///   scale is enabled and a bound is not positive.
    /// - [`Error::InvalidStep`] if the step is not a positive finite number.
    /// - [`Error::InvalidMaxAttempts`] if `max_attempts` is zero.
    pub fn build(self) -> Result<FloatDist> {
        let bounds_error = |reason: &'static str| Error::InvalidBounds {
            name: self.name.clone(),
            min_val: self.min_val,
            max_val: self.max_val,
            reason,
        };
        if !self.min_val.is_finite() || !self.max_val.is_finite() || self.min_val >= self.max_val
        {
            return Err(bounds_error("min_val must be finite and below max_val"));
        }
        if self.log && self.min_val <= 0.0 {
            return Err(bounds_error("log scale requires positive bounds"));
        }
        if let Some(step) = self.step
            && (!step.is_finite() || step <= 0.0)
        {
            return Err(Error::InvalidStep {
                name: self.name,
                step,
            });
        }
        if self.max_attempts == 0 {
            return Err(Error::InvalidMaxAttempts(self.name));
        }

        let rng = self.seed.map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);
        Ok(FloatDist {
            name: self.name,
            min_val: self.min_val,
            max_val: self.max_val,
            step: self.step,
            log: self.log,
            max_attempts: self.max_attempts,
            rng: Mutex::new(rng),
        })
    }
}
