//! Categorical distribution over an ordered option list.

use core::fmt;

use parking_lot::Mutex;

use super::{Advisory, AttributeReader, Distribution, FromAttributes, UniqueSample};
use crate::error::{Error, Result};
use crate::value::{Mapping, Value};

/// A distribution that picks from a fixed list of options.
///
/// Options may be any [`Value`], including callables and nested structures,
/// and need not be unique. Repeated options weigh more in [`sample`], while
/// [`sample_unique`] treats equal options as one.
///
/// [`sample`]: Distribution::sample
/// [`sample_unique`]: Distribution::sample_unique
///
/// # Examples
///
/// ```
/// use trialspec::Value;
/// use trialspec::distribution::{CatDist, Distribution};
///
/// let optim = CatDist::new("optim", vec!["sgd".into(), "adam".into(), "rmsprop".into()]).unwrap();
///
/// // Asking for exactly as many values as there are options returns them all, in order.
/// assert_eq!(optim.sample(3).unwrap(), optim.options());
///
/// // Oversampling keeps every option and prepends random extras.
/// let five = optim.sample(5).unwrap();
/// assert_eq!(&five[2..], optim.options());
/// ```
pub struct CatDist {
    name: String,
    options: Vec<Value>,
    /// Index of the first occurrence of each distinct option, in order.
    distinct: Vec<usize>,
    rng: Mutex<fastrand::Rng>,
}

impl CatDist {
    /// Creates a categorical distribution.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyOptions`] if `options` is empty.
    pub fn new(name: impl Into<String>, options: Vec<Value>) -> Result<Self> {
        Self::build(name.into(), options, fastrand::Rng::new())
    }

    /// Creates a categorical distribution with a fixed RNG seed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyOptions`] if `options` is empty.
    pub fn with_seed(name: impl Into<String>, options: Vec<Value>, seed: u64) -> Result<Self> {
        Self::build(name.into(), options, fastrand::Rng::with_seed(seed))
    }

    fn build(name: String, options: Vec<Value>, rng: fastrand::Rng) -> Result<Self> {
        if options.is_empty() {
            return Err(Error::EmptyOptions(name));
        }
        let mut distinct: Vec<usize> = Vec::with_capacity(options.len());
        for (i, option) in options.iter().enumerate() {
            if !distinct.iter().any(|&j| options[j] == *option) {
                distinct.push(i);
            }
        }
        Ok(Self {
            name,
            options,
            distinct,
            rng: Mutex::new(rng),
        })
    }

    /// The options in their original order.
    #[must_use]
    pub fn options(&self) -> &[Value] {
        &self.options
    }

    fn pick(&self, rng: &mut fastrand::Rng, n: usize) -> Vec<Value> {
        (0..n)
            .map(|_| self.options[rng.usize(..self.options.len())].clone())
            .collect()
    }
}

impl Clone for CatDist {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            options: self.options.clone(),
            distinct: self.distinct.clone(),
            rng: Mutex::new(self.rng.lock().fork()),
        }
    }
}

impl fmt::Debug for CatDist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatDist")
            .field("name", &self.name)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Compares the attributes; RNG state is ignored.
impl PartialEq for CatDist {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.options == other.options
    }
}

impl Distribution for CatDist {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &str {
        Self::KIND
    }

    /// Draws `n` options.
    ///
    /// - `n < len`: `n` draws with replacement.
    /// - `n == len`: the options themselves, in order.
    /// - `n > len`: `n - len` draws with replacement followed by every option,
    ///   so each option appears at least once.
    fn sample(&self, n: usize) -> Result<Vec<Value>> {
        if n == 0 {
            return Err(Error::InvalidSampleSize);
        }
        let len = self.options.len();
        if n == len {
            return Ok(self.options.clone());
        }
        let mut rng = self.rng.lock();
        if n < len {
            return Ok(self.pick(&mut rng, n));
        }
        let mut out = self.pick(&mut rng, n - len);
        out.extend(self.options.iter().cloned());
        Ok(out)
    }

    /// Draws `n` distinct options without replacement.
    ///
    /// Equal options count once. Asking for more than the number of distinct
    /// options returns each of them once, in order, with an
    /// [`Advisory::CardinalityExceeded`].
    fn sample_unique(&self, n: usize) -> Result<UniqueSample> {
        let available = self.distinct.len();
        if n > available {
            let advisory = Advisory::CardinalityExceeded {
                name: self.name.clone(),
                requested: n,
                available,
            }
            .reported();
            return Ok(UniqueSample {
                values: self.distinct.iter().map(|&i| self.options[i].clone()).collect(),
                advisories: vec![advisory],
            });
        }
        let picked = self.rng.lock().choose_multiple(self.distinct.iter(), n);
        Ok(UniqueSample::complete(
            picked.into_iter().map(|&i| self.options[i].clone()).collect(),
        ))
    }

    fn attributes(&self) -> Mapping {
        let mut attrs = Mapping::new();
        attrs.insert("name", self.name.as_str());
        attrs.insert("options", self.options.clone());
        attrs
    }
}

impl FromAttributes for CatDist {
    const KIND: &'static str = "CatDist";

    fn from_attributes(attributes: &Mapping) -> Result<Self> {
        let reader = AttributeReader::new(Self::KIND, attributes);
        Self::new(reader.str("name")?, reader.list("options")?.to_vec())
    }
}
