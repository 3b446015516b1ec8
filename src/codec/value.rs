//! Generic value codec: [`Value`] to JSON and back.

use serde_json::{Map, Number, Value as Json};

use crate::error::{Error, Result};
use crate::value::{Callables, Mapping, Value};

/// Object key marking a callable reference: `{"__fn__": "name"}`.
pub const FN_MARKER: &str = "__fn__";

/// Object key of the trailing element that turns an array back into a tuple:
/// `[1, 2, {"__tuple__": true}]`.
pub const TUPLE_MARKER: &str = "__tuple__";

/// Object key wrapping a genuine single-entry mapping whose key is itself a
/// marker, so user data can never be mistaken for one.
pub const MAP_MARKER: &str = "__map__";

fn is_reserved(key: &str) -> bool {
    matches!(key, FN_MARKER | TUPLE_MARKER | MAP_MARKER)
}

fn marker(key: &str, value: Json) -> Json {
    let mut obj = Map::with_capacity(1);
    obj.insert(key.to_owned(), value);
    Json::Object(obj)
}

fn is_tuple_sentinel(json: &Json) -> bool {
    matches!(json, Json::Object(obj) if obj.len() == 1 && obj.get(TUPLE_MARKER) == Some(&Json::Bool(true)))
}

fn float_to_json(f: f64) -> Json {
    Number::from_f64(f).map_or(Json::Null, Json::Number)
}

/// Encodes a value into a JSON-safe structure.
///
/// Callables become `{"__fn__": name}`, tuples become arrays with a trailing
/// `{"__tuple__": true}`, and non-finite floats become `null`. Everything else
/// maps onto the obvious JSON shape.
///
/// ```
/// use serde_json::json;
/// use trialspec::codec::encode_value;
/// use trialspec::{Callable, Value};
///
/// let relu = Callable::new("relu", |_: &[Value]| Value::Null);
/// let v = Value::List(vec![
///     Value::Callable(relu),
///     Value::Tuple(vec![Value::Int(3), Value::Int(4)]),
/// ]);
/// assert_eq!(
///     encode_value(&v),
///     json!([{"__fn__": "relu"}, [3, 4, {"__tuple__": true}]])
/// );
/// ```
#[must_use]
pub fn encode_value(value: &Value) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Int(i) => Json::from(*i),
        Value::Float(f) => float_to_json(*f),
        Value::Str(s) => Json::String(s.clone()),
        Value::Callable(c) => marker(FN_MARKER, Json::String(c.name().to_owned())),
        Value::List(items) => Json::Array(items.iter().map(encode_value).collect()),
        Value::Tuple(items) => {
            let mut out: Vec<Json> = items.iter().map(encode_value).collect();
            out.push(marker(TUPLE_MARKER, Json::Bool(true)));
            Json::Array(out)
        }
        Value::Map(m) => encode_mapping(m),
    }
}

/// Encodes a mapping, escaping it when it could be read back as a marker.
#[must_use]
pub fn encode_mapping(mapping: &Mapping) -> Json {
    let obj: Map<String, Json> = mapping
        .iter()
        .map(|(k, v)| (k.to_owned(), encode_value(v)))
        .collect();
    match mapping.keys().next() {
        Some(key) if mapping.len() == 1 && is_reserved(key) => marker(MAP_MARKER, Json::Object(obj)),
        _ => Json::Object(obj),
    }
}

/// Decodes a structure produced by [`encode_value`].
///
/// Callable references are resolved through `callables`.
///
/// # Errors
///
/// - [`Error::UnknownCallableName`] if a referenced callable is not in the table.
/// - [`Error::MalformedDocument`] if a marker object carries the wrong payload.
pub fn decode_value(json: &Json, callables: &Callables) -> Result<Value> {
    Ok(match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => number_to_value(n),
        Json::String(s) => Value::Str(s.clone()),
        Json::Array(items) => match items.split_last() {
            Some((last, rest)) if is_tuple_sentinel(last) => Value::Tuple(
                rest.iter()
                    .map(|item| decode_value(item, callables))
                    .collect::<Result<_>>()?,
            ),
            _ => Value::List(
                items
                    .iter()
                    .map(|item| decode_value(item, callables))
                    .collect::<Result<_>>()?,
            ),
        },
        Json::Object(obj) => {
            if obj.len() == 1 {
                if let Some(name) = obj.get(FN_MARKER) {
                    let name = name.as_str().ok_or_else(|| {
                        Error::MalformedDocument(format!("'{FN_MARKER}' must name a callable"))
                    })?;
                    trace_debug!(callable = name, "resolving callable");
                    return callables.resolve(name).map(Value::Callable);
                }
                if let Some(inner) = obj.get(MAP_MARKER) {
                    let Json::Object(inner) = inner else {
                        return Err(Error::MalformedDocument(format!(
                            "'{MAP_MARKER}' must wrap an object"
                        )));
                    };
                    return decode_object(inner, callables).map(Value::Map);
                }
            }
            Value::Map(decode_object(obj, callables)?)
        }
    })
}

/// Decodes a JSON object into a [`Mapping`], unwrapping an escaped mapping.
///
/// # Errors
///
/// Returns [`Error::MalformedDocument`] if `json` does not decode to a mapping,
/// or any error of [`decode_value`].
pub fn decode_mapping(json: &Json, callables: &Callables) -> Result<Mapping> {
    match decode_value(json, callables)? {
        Value::Map(m) => Ok(m),
        other => Err(Error::MalformedDocument(format!(
            "expected a mapping, found {}",
            other.type_name()
        ))),
    }
}

fn decode_object(obj: &Map<String, Json>, callables: &Callables) -> Result<Mapping> {
    let mut mapping = Mapping::new();
    for (k, v) in obj {
        mapping.insert(k.clone(), decode_value(v, callables)?);
    }
    Ok(mapping)
}

#[allow(clippy::cast_precision_loss)]
fn number_to_value(n: &Number) -> Value {
    if let Some(i) = n.as_i64() {
        Value::Int(i)
    } else if let Some(u) = n.as_u64() {
        Value::Float(u as f64)
    } else {
        Value::Float(n.as_f64().unwrap_or(f64::NAN))
    }
}

/// Converts a value to JSON without any markers.
///
/// Used for trial records, which hold plain data: tuples flatten to arrays
/// and callables to their names, so the result reads back as lists and
/// strings.
#[must_use]
pub fn to_plain_json(value: &Value) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Int(i) => Json::from(*i),
        Value::Float(f) => float_to_json(*f),
        Value::Str(s) => Json::String(s.clone()),
        Value::Callable(c) => Json::String(c.name().to_owned()),
        Value::List(items) | Value::Tuple(items) => {
            Json::Array(items.iter().map(to_plain_json).collect())
        }
        Value::Map(m) => Json::Object(
            m.iter()
                .map(|(k, v)| (k.to_owned(), to_plain_json(v)))
                .collect(),
        ),
    }
}

/// Converts JSON to a value without interpreting markers.
#[must_use]
pub fn from_plain_json(json: &Json) -> Value {
    match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => number_to_value(n),
        Json::String(s) => Value::Str(s.clone()),
        Json::Array(items) => Value::List(items.iter().map(from_plain_json).collect()),
        Json::Object(obj) => Value::Map(
            obj.iter()
                .map(|(k, v)| (k.clone(), from_plain_json(v)))
                .collect(),
        ),
    }
}
