//! JSON codecs for values and distributions.
//!
//! Two layers sit on top of `serde_json`:
//!
//! - The **value codec** ([`encode_value`] / [`decode_value`]) walks a
//!   [`Value`](crate::Value) tree and produces a JSON structure that keeps
//!   tuples distinct from lists and stores callables by name.
//! - The **distribution codec** ([`encode_distribution`] /
//!   [`decode_distribution`]) writes a distribution as its kind tag plus its
//!   attribute mapping, and rebuilds it through a [`DistributionRegistry`].
//!
//! Decoding never creates code from a document. Every callable and every
//! distribution kind must be supplied by the caller, through
//! [`Callables`](crate::Callables) and [`DistributionRegistry`] respectively.
//!
//! # Reserved markers
//!
//! | JSON | Meaning |
//! |------|---------|
//! | `{"__fn__": "name"}` | callable reference |
//! | `[..., {"__tuple__": true}]` | the enclosing array is a tuple |
//! | `{"__map__": {...}}` | a mapping whose only key is itself a marker |
//!
//! # Example
//!
//! ```
//! use trialspec::codec::{decode_value, encode_value};
//! use trialspec::{Callable, Callables, Mapping, Value};
//!
//! let relu = Callable::new("relu", |_: &[Value]| Value::Null);
//! let mut layer: Mapping = Mapping::new();
//! layer.insert("activation", relu.clone());
//! layer.insert("kernel", Value::Tuple(vec![Value::Int(3), Value::Int(3)]));
//! let value = Value::Map(layer);
//!
//! let callables: Callables = [relu].into_iter().collect();
//! let decoded = decode_value(&encode_value(&value), &callables).unwrap();
//! assert_eq!(decoded, value);
//! ```

mod distribution;
mod value;

pub use distribution::{
    ARGS_KEY, DistributionRegistry, KIND_KEY, decode_distribution, encode_distribution,
};
pub use value::{
    FN_MARKER, MAP_MARKER, TUPLE_MARKER, decode_mapping, decode_value, encode_mapping,
    encode_value, from_plain_json, to_plain_json,
};
