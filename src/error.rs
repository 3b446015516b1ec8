use std::path::PathBuf;

/// Errors produced by distributions, codecs and the spec store.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when a distribution's bounds are unusable.
    ///
    /// Either `min_val >= max_val`, or log scale was requested with a
    /// non-positive bound.
    #[error("invalid bounds for '{name}': {reason} (min_val = {min_val}, max_val = {max_val})")]
    InvalidBounds {
        /// The name of the offending distribution.
        name: String,
        /// The lower bound value.
        min_val: f64,
        /// The upper bound value.
        max_val: f64,
        /// Why the bounds were rejected.
        reason: &'static str,
    },

    /// Returned when the step size is not a positive finite number.
    #[error("invalid step for '{name}': step must be positive, got {step}")]
    InvalidStep {
        /// The name of the offending distribution.
        name: String,
        /// The rejected step.
        step: f64,
    },

    /// Returned when `max_attempts` is zero.
    #[error("invalid max_attempts for '{0}': must be at least 1")]
    InvalidMaxAttempts(String),

    /// Returned when a categorical distribution is given no options.
    #[error("categorical distribution '{0}' needs at least one option")]
    EmptyOptions(String),

    /// Returned when zero samples are requested from `sample`.
    #[error("sample size must be at least 1")]
    InvalidSampleSize,

    /// Returned when a path is missing, malformed, or of the wrong kind.
    #[error("invalid path '{}': {reason}", path.display())]
    Path {
        /// The rejected path.
        path: PathBuf,
        /// Why the path was rejected.
        reason: &'static str,
    },

    /// Returned when a serialized distribution names a kind that is not registered.
    #[error("unknown distribution kind '{0}'")]
    UnknownDistributionKind(String),

    /// Returned when a serialized callable names a function that is not in the lookup table.
    #[error("unknown callable '{0}'")]
    UnknownCallableName(String),

    /// Returned when a constructor is missing a required attribute.
    #[error("{kind}: missing attribute '{attribute}'")]
    MissingAttribute {
        /// The distribution kind being constructed.
        kind: String,
        /// The missing attribute name.
        attribute: String,
    },

    /// Returned when an attribute has the wrong type.
    #[error("{kind}: attribute '{attribute}' must be {expected}")]
    InvalidAttribute {
        /// The distribution kind being constructed.
        kind: String,
        /// The attribute name.
        attribute: String,
        /// Description of the expected type.
        expected: &'static str,
    },

    /// Returned when a JSON document does not have the expected shape.
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    /// Returned when a trial record carries a field missing from the CSV header.
    #[error("trial {index} has field '{field}' which is not in the header")]
    FieldMismatch {
        /// Zero-based position of the trial in the trial list.
        index: usize,
        /// The unexpected field.
        field: String,
    },

    /// Returned when an internal invariant is violated.
    #[error("internal error: {0}")]
    Internal(&'static str),

    /// Returned when a file operation fails.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Returned when JSON (de)serialization fails.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Returned when reading or writing CSV fails.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = core::result::Result<T, Error>;
