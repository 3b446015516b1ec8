//! Experiment specification and trial log.
//!
//! A [`Spec`] groups everything needed to rerun or continue a search: the
//! fit and predict functions, metrics, parameter distributions, fixed
//! arguments, preprocessing steps, and the [`TrialRecord`]s collected so far.
//!
//! # Persistence
//!
//! | Operation | Format | Contents |
//! |-----------|--------|----------|
//! | [`Spec::trials_to_csv`] / [`Spec::trials_from_csv`] | CSV | trial records only |
//! | [`Spec::save_spec`] / [`Spec::load_spec`] | JSON | the whole spec |
//! | [`Spec::trials_from_spec`] | JSON | trial records of a saved spec |
//!
//! # Example
//!
//! ```
//! use trialspec::distribution::{CatDist, FloatDist};
//! use trialspec::{Callable, Spec, TrialRecord, Value};
//!
//! let fit = Callable::new("fit", |_: &[Value]| Value::Null);
//! let pred = Callable::new("pred", |_: &[Value]| Value::Null);
//!
//! let mut spec = Spec::builder()
//!     .name("ridge")
//!     .fit(fit)
//!     .pred(pred)
//!     .param(FloatDist::builder("alpha", 1e-4, 10.0).log_scale().build().unwrap())
//!     .param(CatDist::new("solver", vec!["svd".into(), "lsqr".into()]).unwrap())
//!     .build();
//!
//! let alpha = spec.param("alpha").unwrap().sample_one().unwrap();
//! let solver = spec.param("solver").unwrap().sample_one().unwrap();
//!
//! let mut trial = TrialRecord::new();
//! trial.insert("alpha", alpha);
//! trial.insert("solver", solver);
//! trial.insert("rmse", 0.42);
//! spec.add_trial(trial);
//! assert_eq!(spec.trials().len(), 1);
//! ```

mod export;
mod path;
mod persistence;

pub use self::export::{CsvWrite, IfExists, csv_cell, restore_cell};
pub use self::persistence::SpecDocument;

use crate::distribution::Distribution;
use crate::value::{Callable, Mapping, Value};

/// One completed evaluation: parameter values and resulting metrics, by field name.
pub type TrialRecord = Mapping;

/// An experiment specification plus its trial log.
///
/// Every field except the trial log is optional and public. The trial log
/// only grows through [`add_trial`](Self::add_trial) or is read from a file.
#[derive(Debug, Default)]
pub struct Spec {
    /// Human-readable name of the experiment.
    pub spec_name: Option<String>,
    /// The training function.
    pub fit: Option<Callable>,
    /// The prediction function.
    pub pred: Option<Callable>,
    /// Metric functions by metric name.
    pub metrics: Option<Mapping<Callable>>,
    /// Parameter distributions, looked up by their names.
    pub params: Option<Vec<Box<dyn Distribution>>>,
    /// Fixed arguments passed to `fit`.
    pub fit_params: Option<Mapping>,
    /// Fixed arguments passed to `pred`.
    pub pred_params: Option<Mapping>,
    /// Preprocessing steps by name.
    pub preprocessing: Option<Mapping<Callable>>,
    trials: Vec<TrialRecord>,
}

impl Spec {
    /// Creates an empty spec.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a builder for a spec.
    #[must_use]
    pub fn builder() -> SpecBuilder {
        SpecBuilder::default()
    }

    /// Trial records in the order they were added.
    #[must_use]
    pub fn trials(&self) -> &[TrialRecord] {
        &self.trials
    }

    /// Appends one trial record.
    ///
    /// Records are not checked against each other; fields may differ
    /// between trials.
    pub fn add_trial(&mut self, record: TrialRecord) {
        self.trials.push(record);
    }

    /// Returns the parameter distribution called `name`.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&dyn Distribution> {
        let found = self.params.as_deref()?.iter().find(|d| d.name() == name)?;
        Some(&**found)
    }

    /// Draws one value from every parameter distribution, keyed by name.
    ///
    /// # Errors
    ///
    /// Propagates sampling errors.
    pub fn sample_params(&self) -> crate::Result<Mapping> {
        let mut out = Mapping::new();
        for dist in self.params.iter().flatten() {
            out.insert(dist.name(), dist.sample_one()?);
        }
        Ok(out)
    }

    fn merge_trials(&mut self, records: Vec<TrialRecord>, replace: bool) -> usize {
        if replace {
            self.trials.clear();
        }
        let n = records.len();
        self.trials.extend(records);
        n
    }
}

/// Builder for [`Spec`].
#[derive(Debug, Default)]
pub struct SpecBuilder {
    spec: Spec,
}

impl SpecBuilder {
    /// Sets the spec name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.spec.spec_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn fit(mut self, fit: Callable) -> Self {
        self.spec.fit = Some(fit);
        self
    }

    #[must_use]
    pub fn pred(mut self, pred: Callable) -> Self {
        self.spec.pred = Some(pred);
        self
    }

    /// Adds a metric under `name`.
    #[must_use]
    pub fn metric(mut self, name: impl Into<String>, metric: Callable) -> Self {
        self.spec
            .metrics
            .get_or_insert_with(Mapping::new)
            .insert(name, metric);
        self
    }

    /// Appends a parameter distribution.
    #[must_use]
    pub fn param(mut self, distribution: impl Distribution + 'static) -> Self {
        self.spec
            .params
            .get_or_insert_with(Vec::new)
            .push(Box::new(distribution));
        self
    }

    /// Sets a fixed argument for `fit`.
    #[must_use]
    pub fn fit_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.spec
            .fit_params
            .get_or_insert_with(Mapping::new)
            .insert(key, value);
        self
    }

    /// Sets a fixed argument for `pred`.
    #[must_use]
    pub fn pred_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.spec
            .pred_params
            .get_or_insert_with(Mapping::new)
            .insert(key, value);
        self
    }

    /// Adds a preprocessing step under `name`.
    #[must_use]
    pub fn preprocessing(mut self, name: impl Into<String>, step: Callable) -> Self {
        self.spec
            .preprocessing
            .get_or_insert_with(Mapping::new)
            .insert(name, step);
        self
    }

    #[must_use]
    pub fn build(self) -> Spec {
        self.spec
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::{CatDist, FloatDist};

    fn record(pairs: &[(&str, Value)]) -> TrialRecord {
        pairs.iter().cloned().collect()
    }

    #[test]
    fn new_spec_is_empty() {
        let spec = Spec::new();
        assert!(spec.spec_name.is_none());
        assert!(spec.params.is_none());
        assert!(spec.trials().is_empty());
    }

    #[test]
    fn add_trial_accepts_differing_fields() {
        let mut spec = Spec::new();
        spec.add_trial(record(&[("a", Value::Int(1))]));
        spec.add_trial(record(&[("b", Value::from("x"))]));
        assert_eq!(spec.trials().len(), 2);
        assert_eq!(spec.trials()[1].get("b"), Some(&Value::from("x")));
    }

    #[test]
    fn param_lookup_by_name() {
        let spec = Spec::builder()
            .param(FloatDist::new("x", 0.0, 1.0).unwrap())
            .param(CatDist::new("c", vec![Value::Int(1)]).unwrap())
            .build();
        assert_eq!(spec.param("c").unwrap().kind(), "CatDist");
        assert_eq!(spec.param("x").unwrap().kind(), "FloatDist");
        assert!(spec.param("y").is_none());
        assert!(Spec::new().param("x").is_none());
    }

    #[test]
    fn sample_params_covers_every_distribution() {
        let spec = Spec::builder()
            .param(FloatDist::new("x", 0.0, 1.0).unwrap())
            .param(CatDist::new("c", vec![Value::Int(7)]).unwrap())
            .build();
        let drawn = spec.sample_params().unwrap();
        assert_eq!(drawn.keys().collect::<Vec<_>>(), ["x", "c"]);
        assert_eq!(drawn.get("c"), Some(&Value::Int(7)));
        assert!(Spec::new().sample_params().unwrap().is_empty());
    }

    #[test]
    fn builder_collects_mappings() {
        let noop = |name: &str| Callable::new(name, |_: &[Value]| Value::Null);
        let spec = Spec::builder()
            .name("s")
            .metric("m1", noop("m"))
            .metric("m2", noop("m"))
            .fit_param("lr", 0.1)
            .pred_param("batch", 32)
            .preprocessing("scale", noop("scale"))
            .build();
        assert_eq!(spec.spec_name.as_deref(), Some("s"));
        assert_eq!(spec.metrics.as_ref().unwrap().len(), 2);
        assert_eq!(
            spec.fit_params.as_ref().unwrap().get("lr"),
            Some(&Value::Float(0.1))
        );
        assert_eq!(
            spec.pred_params.as_ref().unwrap().get("batch"),
            Some(&Value::Int(32))
        );
        assert!(spec.preprocessing.as_ref().unwrap().contains_key("scale"));
    }

    #[test]
    fn merge_trials_replace_and_append() {
        let mut spec = Spec::new();
        spec.add_trial(record(&[("a", Value::Int(0))]));
        spec.merge_trials(vec![record(&[("a", Value::Int(1))])], false);
        assert_eq!(spec.trials().len(), 2);
        spec.merge_trials(vec![record(&[("a", Value::Int(2))])], true);
        assert_eq!(spec.trials(), &[record(&[("a", Value::Int(2))])]);
    }
}
