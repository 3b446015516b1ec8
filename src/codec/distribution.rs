//! Distribution codec: `{"kind": ..., "args": {...}}` and a kind → constructor registry.

use core::fmt;
use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value as Json};

use super::value::{decode_mapping, encode_mapping};
use crate::distribution::{CatDist, Distribution, FloatDist, FromAttributes};
use crate::error::{Error, Result};
use crate::value::{Callables, Mapping};

/// Key holding the kind tag in an encoded distribution.
pub const KIND_KEY: &str = "kind";

/// Key holding the encoded attributes in an encoded distribution.
pub const ARGS_KEY: &str = "args";

type Constructor = dyn Fn(&Mapping) -> Result<Box<dyn Distribution>> + Send + Sync;

/// Maps distribution kind tags to constructors.
///
/// Decoding only ever builds kinds registered here, so the table is the
/// caller's statement of which distribution types a document may contain.
///
/// # Examples
///
/// ```
/// use trialspec::codec::DistributionRegistry;
/// use trialspec::distribution::FloatDist;
///
/// let mut registry = DistributionRegistry::new();
/// registry.register::<FloatDist>();
/// assert!(registry.contains("FloatDist"));
/// assert!(!registry.contains("CatDist"));
///
/// let builtins = DistributionRegistry::with_builtins();
/// assert!(builtins.contains("CatDist"));
/// ```
#[derive(Clone, Default)]
pub struct DistributionRegistry {
    constructors: HashMap<String, Arc<Constructor>>,
}

impl DistributionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding [`FloatDist`] and [`CatDist`].
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register::<FloatDist>().register::<CatDist>();
        registry
    }

    /// Registers `D` under [`FromAttributes::KIND`].
    pub fn register<D: FromAttributes>(&mut self) -> &mut Self {
        self.register_fn(D::KIND, |attrs| {
            D::from_attributes(attrs).map(|d| Box::new(d) as Box<dyn Distribution>)
        })
    }

    /// Registers an arbitrary constructor under `kind`, replacing any previous one.
    pub fn register_fn(
        &mut self,
        kind: impl Into<String>,
        constructor: impl Fn(&Mapping) -> Result<Box<dyn Distribution>> + Send + Sync + 'static,
    ) -> &mut Self {
        self.constructors.insert(kind.into(), Arc::new(constructor));
        self
    }

    #[must_use]
    pub fn contains(&self, kind: &str) -> bool {
        self.constructors.contains_key(kind)
    }

    /// Registered kind tags, in no particular order.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }

    /// Builds a distribution of `kind` from decoded attributes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownDistributionKind`] if `kind` is not registered,
    /// or the constructor's own error.
    pub fn construct(&self, kind: &str, attributes: &Mapping) -> Result<Box<dyn Distribution>> {
        let constructor = self
            .constructors
            .get(kind)
            .ok_or_else(|| Error::UnknownDistributionKind(kind.to_owned()))?;
        constructor(attributes)
    }
}

impl fmt::Debug for DistributionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<&str> = self.kinds().collect();
        kinds.sort_unstable();
        f.debug_struct("DistributionRegistry")
            .field("kinds", &kinds)
            .finish()
    }
}

/// Encodes a distribution as `{"kind": <kind>, "args": <attributes>}`.
///
/// Attributes pass through [`encode_value`](super::encode_value), so callables
/// or tuples among them are encoded with the usual markers.
///
/// ```
/// use serde_json::json;
/// use trialspec::codec::encode_distribution;
/// use trialspec::distribution::FloatDist;
///
/// let d = FloatDist::builder("x", 1.0, 10.0).step(1.0).build().unwrap();
/// assert_eq!(
///     encode_distribution(&d),
///     json!({
///         "kind": "FloatDist",
///         "args": {
///             "name": "x",
///             "min_val": 1.0,
///             "max_val": 10.0,
///             "step": 1.0,
///             "log": false,
///             "max_attempts": 1000
///         }
///     })
/// );
/// ```
#[must_use]
pub fn encode_distribution(distribution: &dyn Distribution) -> Json {
    let mut obj = Map::with_capacity(2);
    obj.insert(KIND_KEY.to_owned(), Json::String(distribution.kind().to_owned()));
    obj.insert(ARGS_KEY.to_owned(), encode_mapping(&distribution.attributes()));
    Json::Object(obj)
}

/// Rebuilds a distribution encoded by [`encode_distribution`].
///
/// # Errors
///
/// - [`Error::MalformedDocument`] if `json` is not a `{"kind", "args"}` object.
/// - [`Error::UnknownDistributionKind`] if the kind is not in `registry`.
/// - [`Error::UnknownCallableName`] if an attribute references an unknown callable.
/// - Any error raised by the constructor.
pub fn decode_distribution(
    json: &Json,
    registry: &DistributionRegistry,
    callables: &Callables,
) -> Result<Box<dyn Distribution>> {
    let Json::Object(obj) = json else {
        return Err(Error::MalformedDocument(
            "a distribution must be encoded as an object".to_owned(),
        ));
    };
    let kind = obj
        .get(KIND_KEY)
        .and_then(Json::as_str)
        .ok_or_else(|| Error::MalformedDocument(format!("distribution is missing '{KIND_KEY}'")))?;
    if !registry.contains(kind) {
        return Err(Error::UnknownDistributionKind(kind.to_owned()));
    }
    let args = obj
        .get(ARGS_KEY)
        .ok_or_else(|| Error::MalformedDocument(format!("distribution is missing '{ARGS_KEY}'")))?;
    let attributes = decode_mapping(args, callables)?;
    trace_debug!(kind, "constructing distribution");
    registry.construct(kind, &attributes)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::value::{Callable, Value};

    #[test]
    fn float_dist_round_trip() {
        let d = FloatDist::builder("x", 0.01, 100.0)
            .log_scale()
            .step(2.5)
            .max_attempts(10)
            .build()
            .unwrap();
        let encoded = encode_distribution(&d);
        let decoded = decode_distribution(
            &encoded,
            &DistributionRegistry::with_builtins(),
            &Callables::new(),
        )
        .unwrap();
        assert_eq!(decoded.kind(), "FloatDist");
        assert_eq!(decoded.attributes(), d.attributes());
    }

    #[test]
    fn cat_dist_with_callable_options() {
        let relu = Callable::new("relu", |_: &[Value]| Value::Null);
        let d = CatDist::new(
            "act",
            vec![
                Value::Callable(relu.clone()),
                Value::Tuple(vec![Value::Int(1), Value::Int(2)]),
            ],
        )
        .unwrap();
        let encoded = encode_distribution(&d);
        assert_eq!(encoded["args"]["options"][0], json!({"__fn__": "relu"}));

        let callables: Callables = [relu].into_iter().collect();
        let decoded =
            decode_distribution(&encoded, &DistributionRegistry::with_builtins(), &callables)
                .unwrap();
        assert_eq!(decoded.attributes(), d.attributes());

        let missing =
            decode_distribution(&encoded, &DistributionRegistry::with_builtins(), &Callables::new());
        assert!(matches!(missing, Err(Error::UnknownCallableName(_))));
    }

    #[test]
    fn unknown_kind() {
        let encoded = json!({"kind": "Normal", "args": {"name": "x"}});
        let err = decode_distribution(
            &encoded,
            &DistributionRegistry::with_builtins(),
            &Callables::new(),
        );
        assert!(matches!(err, Err(Error::UnknownDistributionKind(k)) if k == "Normal"));
    }

    #[test]
    fn malformed_shapes() {
        let registry = DistributionRegistry::with_builtins();
        for bad in [
            json!([1, 2]),
            json!({"args": {}}),
            json!({"kind": 3, "args": {}}),
            json!({"kind": "FloatDist"}),
            json!({"kind": "FloatDist", "args": [1]}),
        ] {
            assert!(
                matches!(
                    decode_distribution(&bad, &registry, &Callables::new()),
                    Err(Error::MalformedDocument(_))
                ),
                "{bad}"
            );
        }
    }

    #[test]
    fn constructor_errors_propagate() {
        let encoded = json!({"kind": "FloatDist", "args": {"name": "x", "min_val": 0.0}});
        let err = decode_distribution(
            &encoded,
            &DistributionRegistry::with_builtins(),
            &Callables::new(),
        );
        assert!(matches!(err, Err(Error::MissingAttribute { attribute, .. }) if attribute == "max_val"));
    }

    #[test]
    fn register_fn_overrides() {
        let mut registry = DistributionRegistry::with_builtins();
        registry.register_fn("FloatDist", |_| Err(Error::Internal("disabled")));
        let d = FloatDist::new("x", 0.0, 1.0).unwrap();
        let err = decode_distribution(&encode_distribution(&d), &registry, &Callables::new());
        assert!(matches!(err, Err(Error::Internal("disabled"))));
        assert_eq!(
            format!("{registry:?}"),
            "DistributionRegistry { kinds: [\"CatDist\", \"FloatDist\"] }"
        );
    }
}
