#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(clippy::correctness)]
#![deny(clippy::suspicious)]
#![deny(clippy::style)]
#![deny(clippy::complexity)]
#![deny(clippy::perf)]
#![deny(clippy::pedantic)]
#![deny(clippy::std_instead_of_core)]

//! Experiment specifications for hyperparameter search: parameter
//! distributions that sample candidate values, a spec that bundles the
//! functions and distributions of an experiment, and a trial log that can
//! be exported to CSV or saved with the whole spec as JSON.
//!
//! # Getting Started
//!
//! ```
//! use trialspec::prelude::*;
//!
//! let lr = FloatDist::builder("lr", 1e-4, 1e-1).log_scale().build().unwrap();
//! let layers = FloatDist::builder("layers", 1.0, 4.0).step(1.0).build().unwrap();
//!
//! let mut spec = Spec::builder().name("mlp").param(lr).param(layers).build();
//!
//! for _ in 0..3 {
//!     let mut trial = spec.sample_params().unwrap();
//!     let lr = trial.get("lr").and_then(Value::as_f64).unwrap();
//!     trial.insert("loss", (lr - 0.01).abs());
//!     spec.add_trial(trial);
//! }
//! assert_eq!(spec.trials().len(), 3);
//! ```
//!
//! # Core Concepts
//!
//! | Type | Role |
//! |------|------|
//! | [`Distribution`](distribution::Distribution) | A named source of candidate values; plain and unique sampling. |
//! | [`FloatDist`](distribution::FloatDist) | Real range, optionally log-scaled and snapped to a step grid. |
//! | [`CatDist`](distribution::CatDist) | Finite list of options of any [`Value`] type. |
//! | [`Spec`] | Fit/predict functions, metrics, distributions, fixed arguments, trial log. |
//! | [`Value`] / [`Mapping`] | Dynamic values held in trials, options and arguments. |
//! | [`Callable`] / [`Callables`] | Named functions, persisted by name and resolved on load. |
//! | [`DistributionRegistry`](codec::DistributionRegistry) | Kind tag to constructor table used when loading. |
//!
//! # Persistence
//!
//! Saved specs never contain code. Callables are written by name and
//! distributions by kind tag plus attributes; loading resolves both through
//! tables the caller supplies. See [`codec`] for the JSON markers.
//!
//! # Feature Flags
//!
//! | Flag | What it enables | Default |
//! |------|----------------|---------|
//! | `tracing` | Structured log events via [`tracing`](https://docs.rs/tracing) for file I/O, decoding and unique-sampling shortfalls | off |

/// Emit a `tracing::info!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_info {
    ($($arg:tt)*) => { tracing::info!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_info {
    ($($arg:tt)*) => {};
}

/// Emit a `tracing::debug!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_debug {
    ($($arg:tt)*) => { tracing::debug!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_debug {
    ($($arg:tt)*) => {};
}

/// Emit a `tracing::warn!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_warn {
    ($($arg:tt)*) => { tracing::warn!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_warn {
    ($($arg:tt)*) => {};
}

pub mod codec;
pub mod distribution;
mod error;
mod rng_util;
pub mod spec;
mod value;

pub use error::{Error, Result};
pub use spec::{CsvWrite, IfExists, Spec, SpecBuilder, SpecDocument, TrialRecord};
pub use value::{Callable, Callables, Mapping, Value};

/// Convenient wildcard import for the most common types.
///
/// ```
/// use trialspec::prelude::*;
/// ```
pub mod prelude {
    pub use crate::codec::DistributionRegistry;
    pub use crate::distribution::{
        Advisory, CatDist, Distribution, FloatDist, FromAttributes, UniqueSample,
    };
    pub use crate::error::{Error, Result};
    pub use crate::spec::{CsvWrite, IfExists, Spec, SpecBuilder, TrialRecord};
    pub use crate::value::{Callable, Callables, Mapping, Value};
}
