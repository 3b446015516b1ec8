use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};

use super::path::{check_readable, check_writable};
use super::{Spec, TrialRecord};
use crate::codec::{
    DistributionRegistry, decode_distribution, decode_mapping, decode_value, encode_distribution,
    encode_mapping, encode_value, from_plain_json, to_plain_json,
};
use crate::error::{Error, Result};
use crate::value::{Callable, Callables, Mapping, Value};

const VERSION: u32 = 1;

fn current_version() -> u32 {
    VERSION
}

/// The on-disk form of a [`Spec`].
///
/// Callables are stored as `{"__fn__": name}` references, distributions as
/// `{"kind", "args"}` objects, and trial records as plain JSON objects.
/// Absent members read as `null` (or no trials), so documents with only
/// some fields load.
///
/// # Schema versioning
///
/// `version` is `1`. Documents without it are read as version `1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecDocument {
    #[serde(default = "current_version")]
    pub version: u32,
    #[serde(default)]
    pub spec_name: Option<String>,
    #[serde(default)]
    pub fit: Json,
    #[serde(default)]
    pub pred: Json,
    #[serde(default)]
    pub metrics: Json,
    #[serde(default)]
    pub params: Option<Vec<Json>>,
    #[serde(default)]
    pub fit_params: Json,
    #[serde(default)]
    pub pred_params: Json,
    #[serde(default)]
    pub preprocessing: Json,
    #[serde(default)]
    pub trials: Vec<Map<String, Json>>,
}

fn encode_callable(callable: Option<&Callable>) -> Json {
    callable.map_or(Json::Null, |c| encode_value(&Value::Callable(c.clone())))
}

fn encode_callables(mapping: Option<&Mapping<Callable>>) -> Json {
    mapping.map_or(Json::Null, |m| {
        encode_mapping(
            &m.iter()
                .map(|(k, c)| (k, Value::Callable(c.clone())))
                .collect(),
        )
    })
}

fn encode_args(mapping: Option<&Mapping>) -> Json {
    mapping.map_or(Json::Null, encode_mapping)
}

fn encode_trial(trial: &TrialRecord) -> Map<String, Json> {
    trial
        .iter()
        .map(|(k, v)| (k.to_owned(), to_plain_json(v)))
        .collect()
}

fn decode_trial(obj: &Map<String, Json>) -> TrialRecord {
    obj.iter()
        .map(|(k, v)| (k.as_str(), from_plain_json(v)))
        .collect()
}

fn decode_callable(field: &str, json: &Json, callables: &Callables) -> Result<Option<Callable>> {
    if json.is_null() {
        return Ok(None);
    }
    match decode_value(json, callables)? {
        Value::Callable(c) => Ok(Some(c)),
        other => Err(Error::MalformedDocument(format!(
            "'{field}' must be a callable, found {}",
            other.type_name()
        ))),
    }
}

fn decode_callables(
    field: &str,
    json: &Json,
    callables: &Callables,
) -> Result<Option<Mapping<Callable>>> {
    if json.is_null() {
        return Ok(None);
    }
    let mut out = Mapping::new();
    for (key, value) in decode_mapping(json, callables)? {
        match value {
            Value::Callable(c) => {
                out.insert(key, c);
            }
            other => {
                return Err(Error::MalformedDocument(format!(
                    "'{field}.{key}' must be a callable, found {}",
                    other.type_name()
                )));
            }
        }
    }
    Ok(Some(out))
}

fn decode_args(json: &Json, callables: &Callables) -> Result<Option<Mapping>> {
    if json.is_null() {
        return Ok(None);
    }
    decode_mapping(json, callables).map(Some)
}

impl SpecDocument {
    fn read(path: &Path) -> Result<Self> {
        check_readable(path)?;
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

impl Spec {
    /// Captures the spec as a serializable document.
    #[must_use]
    pub fn to_document(&self) -> SpecDocument {
        SpecDocument {
            version: VERSION,
            spec_name: self.spec_name.clone(),
            fit: encode_callable(self.fit.as_ref()),
            pred: encode_callable(self.pred.as_ref()),
            metrics: encode_callables(self.metrics.as_ref()),
            params: self
                .params
                .as_ref()
                .map(|ps| ps.iter().map(|d| encode_distribution(d.as_ref())).collect()),
            fit_params: encode_args(self.fit_params.as_ref()),
            pred_params: encode_args(self.pred_params.as_ref()),
            preprocessing: encode_callables(self.preprocessing.as_ref()),
            trials: self.trials.iter().map(encode_trial).collect(),
        }
    }

    /// Rebuilds a spec from a document.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownCallableName`] if a callable is missing from `callables`.
    /// - [`Error::UnknownDistributionKind`] if a distribution kind is not registered.
    /// - [`Error::MalformedDocument`] if a member has the wrong shape.
    /// - Any error raised while constructing a distribution.
    pub fn from_document(
        document: &SpecDocument,
        callables: &Callables,
        registry: &DistributionRegistry,
    ) -> Result<Self> {
        let params = document
            .params
            .as_ref()
            .map(|ps| {
                ps.iter()
                    .map(|p| decode_distribution(p, registry, callables))
                    .collect::<Result<Vec<_>>>()
            })
            .transpose()?;
        Ok(Self {
            spec_name: document.spec_name.clone(),
            fit: decode_callable("fit", &document.fit, callables)?,
            pred: decode_callable("pred", &document.pred, callables)?,
            metrics: decode_callables("metrics", &document.metrics, callables)?,
            params,
            fit_params: decode_args(&document.fit_params, callables)?,
            pred_params: decode_args(&document.pred_params, callables)?,
            preprocessing: decode_callables("preprocessing", &document.preprocessing, callables)?,
            trials: document.trials.iter().map(decode_trial).collect(),
        })
    }

    /// Encodes the whole spec as a JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if serialization fails.
    pub fn to_json(&self) -> Result<Json> {
        Ok(serde_json::to_value(self.to_document())?)
    }

    /// Decodes a spec from a JSON value produced by [`to_json`](Self::to_json).
    ///
    /// # Errors
    ///
    /// [`Error::Json`] if `json` is not a spec document, otherwise as
    /// [`from_document`](Self::from_document).
    pub fn from_json(
        json: &Json,
        callables: &Callables,
        registry: &DistributionRegistry,
    ) -> Result<Self> {
        let document = SpecDocument::deserialize(json)?;
        Self::from_document(&document, callables, registry)
    }

    /// Writes the whole spec to `path` as pretty-printed JSON, replacing any
    /// existing file.
    ///
    /// # Errors
    ///
    /// [`Error::Path`] for an unusable path, or I/O and serialization errors.
    pub fn save_spec(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        check_writable(path)?;
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, &self.to_document())?;
        writer.flush()?;
        trace_info!(path = %path.display(), trials = self.trials.len(), "spec saved");
        Ok(())
    }

    /// Replaces every field of this spec with the one saved at `path`.
    ///
    /// On error the spec is left unchanged.
    ///
    /// # Errors
    ///
    /// [`Error::Path`] if `path` is not an existing file, parse errors, or
    /// anything [`from_document`](Self::from_document) reports.
    pub fn load_spec(
        &mut self,
        path: impl AsRef<Path>,
        callables: &Callables,
        registry: &DistributionRegistry,
    ) -> Result<()> {
        let path = path.as_ref();
        let document = SpecDocument::read(path)?;
        *self = Self::from_document(&document, callables, registry)?;
        trace_info!(path = %path.display(), trials = self.trials.len(), "spec loaded");
        Ok(())
    }

    /// Reads only the trial records of a spec saved at `path`.
    ///
    /// No callables or distributions are resolved. With `replace` the
    /// current trials are discarded first. Returns the number of trials read.
    ///
    /// # Errors
    ///
    /// [`Error::Path`] if `path` is not an existing file, or parse errors.
    pub fn trials_from_spec(&mut self, path: impl AsRef<Path>, replace: bool) -> Result<usize> {
        let path = path.as_ref();
        let document = SpecDocument::read(path)?;
        let records = document.trials.iter().map(decode_trial).collect();
        let n = self.merge_trials(records, replace);
        trace_info!(path = %path.display(), trials = n, replace, "trials read from spec");
        Ok(n)
    }
}
