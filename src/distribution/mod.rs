//! Parameter distributions.
//!
//! A [`Distribution`] draws candidate values for one named parameter. Two
//! variants ship with the crate:
//!
//! | Type | Space | Kind tag |
//! |------|-------|----------|
//! | [`FloatDist`] | bounded continuous range, optionally log-uniform and/or snapped to a step grid | `"FloatDist"` |
//! | [`CatDist`] | an ordered list of arbitrary options | `"CatDist"` |
//!
//! Any type implementing [`Distribution`] (and [`FromAttributes`] if it should
//! be decodable) can be attached to a [`Spec`](crate::Spec) alongside them.
//!
//! # Advisories
//!
//! [`Distribution::sample_unique`] is best-effort. When the requested number
//! of distinct values cannot be produced, the call still succeeds and the
//! shortfall is reported as an [`Advisory`] inside the returned
//! [`UniqueSample`]. With the `tracing` feature enabled each advisory is also
//! emitted as a `warn` event.

mod categorical;
mod float;

use core::fmt;

pub use categorical::CatDist;
pub use float::{DEFAULT_MAX_ATTEMPTS, FloatDist, FloatDistBuilder};

use crate::error::{Error, Result};
use crate::value::{Mapping, Value};

/// A sampler over the value space of one named parameter.
///
/// # Implementing a custom distribution
///
/// ```
/// use trialspec::distribution::{Distribution, UniqueSample};
/// use trialspec::{Mapping, Result, Value};
///
/// #[derive(Debug)]
/// struct Constant {
///     name: String,
///     value: f64,
/// }
///
/// impl Distribution for Constant {
///     fn name(&self) -> &str {
///         &self.name
///     }
///
///     fn kind(&self) -> &str {
///         "Constant"
///     }
///
///     fn sample(&self, n: usize) -> Result<Vec<Value>> {
///         Ok(vec![Value::Float(self.value); n])
///     }
///
///     fn sample_unique(&self, n: usize) -> Result<UniqueSample> {
///         let values = if n == 0 { vec![] } else { vec![Value::Float(self.value)] };
///         Ok(UniqueSample::complete(values))
///     }
///
///     fn attributes(&self) -> Mapping {
///         [("name", Value::from(self.name.as_str())), ("value", Value::Float(self.value))]
///             .into_iter()
///             .collect()
///     }
/// }
///
/// let c = Constant { name: "c".into(), value: 2.0 };
/// assert_eq!(c.sample(3).unwrap().len(), 3);
/// ```
pub trait Distribution: fmt::Debug + Send + Sync {
    /// The parameter name this distribution samples for.
    fn name(&self) -> &str;

    /// The type tag used to look up a constructor when decoding.
    fn kind(&self) -> &str;

    /// Draws `n` values, possibly with repeats.
    ///
    /// # Errors
    ///
    /// Implementations return [`Error::InvalidSampleSize`] for `n == 0`.
    fn sample(&self, n: usize) -> Result<Vec<Value>>;

    /// Draws up to `n` distinct values.
    ///
    /// # Errors
    ///
    /// Only for failures of the underlying sampler; an unreachable target
    /// is reported through [`UniqueSample::advisories`] instead.
    fn sample_unique(&self, n: usize) -> Result<UniqueSample>;

    /// Every attribute set at construction, including `name`.
    ///
    /// This is the serialization descriptor: feeding it back to the
    /// matching [`FromAttributes::from_attributes`] must rebuild an
    /// equivalent distribution.
    fn attributes(&self) -> Mapping;

    /// Draws a single value.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`sample`](Self::sample).
    fn sample_one(&self) -> Result<Value> {
        self.sample(1)?
            .into_iter()
            .next()
            .ok_or(Error::Internal("sample(1) returned no values"))
    }
}

/// Construction of a distribution from its attribute mapping.
///
/// This is the decode half of the contract with [`Distribution::attributes`].
pub trait FromAttributes: Distribution + Sized + 'static {
    /// The kind tag written by [`Distribution::kind`].
    const KIND: &'static str;

    /// Builds an instance from attributes produced by [`Distribution::attributes`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingAttribute`] or [`Error::InvalidAttribute`] for
    /// malformed attributes, or any validation error of the constructor.
    fn from_attributes(attributes: &Mapping) -> Result<Self>;
}

/// A non-fatal deviation from the requested outcome of a sampling call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Advisory {
    /// More distinct values were requested than the space contains.
    CardinalityExceeded {
        /// The distribution name.
        name: String,
        /// The number of values asked for.
        requested: usize,
        /// The number of distinct values the space can produce.
        available: usize,
    },
    /// The retry budget ran out before enough distinct values were found.
    AttemptsExhausted {
        /// The distribution name.
        name: String,
        /// The number of distinct values targeted.
        requested: usize,
        /// The number of distinct values found.
        found: usize,
        /// The number of sampling rounds performed.
        attempts: usize,
    },
}

impl Advisory {
    /// Emits the advisory as a warning event and hands it back.
    pub(crate) fn reported(self) -> Self {
        trace_warn!(advisory = %self, "sample_unique fell short");
        self
    }
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CardinalityExceeded {
                name,
                requested,
                available,
            } => write!(
                f,
                "'{name}': requested {requested} unique samples but only {available} exist"
            ),
            Self::AttemptsExhausted {
                name,
                requested,
                found,
                attempts,
            } => write!(
                f,
                "'{name}': found {found} of {requested} unique samples after {attempts} attempts"
            ),
        }
    }
}

/// Result of [`Distribution::sample_unique`]: distinct values plus any advisories.
#[derive(Clone, Debug, PartialEq)]
pub struct UniqueSample<T = Value> {
    /// Distinct sampled values. Order carries no meaning.
    pub values: Vec<T>,
    /// Conditions that kept the call from reaching the requested count.
    pub advisories: Vec<Advisory>,
}

impl<T> UniqueSample<T> {
    /// A sample that met its target.
    #[must_use]
    pub fn complete(values: Vec<T>) -> Self {
        Self {
            values,
            advisories: Vec::new(),
        }
    }

    /// `true` when no advisory was raised.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.advisories.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Converts every value, keeping the advisories.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> UniqueSample<U> {
        UniqueSample {
            values: self.values.into_iter().map(f).collect(),
            advisories: self.advisories,
        }
    }
}

/// Typed access to an attribute mapping, for [`FromAttributes`] implementations.
///
/// Every accessor reports failures against the distribution kind so the
/// error names which constructor rejected the data.
///
/// ```
/// use trialspec::distribution::AttributeReader;
/// use trialspec::{Mapping, Value};
///
/// let attrs: Mapping = [("name", Value::from("lr")), ("mean", Value::Float(0.1))]
///     .into_iter()
///     .collect();
/// let reader = AttributeReader::new("Normal", &attrs);
/// assert_eq!(reader.str("name").unwrap(), "lr");
/// assert_eq!(reader.f64("mean").unwrap(), 0.1);
/// assert!(reader.f64("sd").is_err());
/// ```
#[derive(Clone, Copy, Debug)]
pub struct AttributeReader<'a> {
    kind: &'a str,
    attributes: &'a Mapping,
}

impl<'a> AttributeReader<'a> {
    #[must_use]
    pub fn new(kind: &'a str, attributes: &'a Mapping) -> Self {
        Self { kind, attributes }
    }

    fn invalid(&self, key: &str, expected: &'static str) -> Error {
        Error::InvalidAttribute {
            kind: self.kind.to_owned(),
            attribute: key.to_owned(),
            expected,
        }
    }

    /// The raw value under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingAttribute`] if `key` is absent.
    pub fn value(&self, key: &str) -> Result<&'a Value> {
        self.attributes
            .get(key)
            .ok_or_else(|| Error::MissingAttribute {
                kind: self.kind.to_owned(),
                attribute: key.to_owned(),
            })
    }

    /// A required string attribute.
    ///
    /// # Errors
    ///
    /// Returns an error if `key` is absent or not a string.
    pub fn str(&self, key: &str) -> Result<&'a str> {
        self.value(key)?
            .as_str()
            .ok_or_else(|| self.invalid(key, "a string"))
    }

    /// A required number attribute; integers are widened.
    ///
    /// # Errors
    ///
    /// Returns an error if `key` is absent or not a number.
    pub fn f64(&self, key: &str) -> Result<f64> {
        self.value(key)?
            .as_f64()
            .ok_or_else(|| self.invalid(key, "a number"))
    }

    /// An optional number attribute; absent and null both read as `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is present but not a number.
    pub fn opt_f64(&self, key: &str) -> Result<Option<f64>> {
        match self.attributes.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(v) => v
                .as_f64()
                .map(Some)
                .ok_or_else(|| self.invalid(key, "a number or null")),
        }
    }

    /// An optional boolean attribute with a default.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is present but not a boolean.
    pub fn bool_or(&self, key: &str, default: bool) -> Result<bool> {
        match self.attributes.get(key) {
            None | Some(Value::Null) => Ok(default),
            Some(v) => v.as_bool().ok_or_else(|| self.invalid(key, "a boolean")),
        }
    }

    /// An optional non-negative integer attribute with a default.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is present but not a non-negative integer.
    pub fn usize_or(&self, key: &str, default: usize) -> Result<usize> {
        match self.attributes.get(key) {
            None | Some(Value::Null) => Ok(default),
            Some(v) => v
                .as_i64()
                .and_then(|i| usize::try_from(i).ok())
                .ok_or_else(|| self.invalid(key, "a non-negative integer")),
        }
    }

    /// A required sequence attribute (list or tuple).
    ///
    /// # Errors
    ///
    /// Returns an error if `key` is absent or not a sequence.
    pub fn list(&self, key: &str) -> Result<&'a [Value]> {
        self.value(key)?
            .as_slice()
            .ok_or_else(|| self.invalid(key, "a list"))
    }
}
