use std::fs::{File, OpenOptions};
use std::path::Path;

use super::path::{check_readable, check_writable};
use super::{Spec, TrialRecord};
use crate::codec::to_plain_json;
use crate::error::{Error, Result};
use crate::value::Value;

/// What [`Spec::trials_to_csv`] does when the target file already exists.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IfExists {
    /// Leave the file alone.
    #[default]
    Skip,
    /// Truncate and rewrite it, header included.
    Overwrite,
    /// Add rows to the end without repeating the header.
    Append,
}

/// Outcome of [`Spec::trials_to_csv`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CsvWrite {
    /// A new file was written.
    Created,
    /// An existing file was replaced.
    Overwritten,
    /// Rows were added to an existing file.
    Appended,
    /// The file existed and [`IfExists::Skip`] was requested.
    Skipped,
    /// There were no trials to write; nothing was touched.
    NoTrials,
}

/// Renders a trial field as a CSV cell.
///
/// Floats always carry a `.` or an exponent so they read back as floats.
/// Missing values (`Null`) become empty cells. Lists, tuples and mappings
/// are written as JSON text, and callables by name.
///
/// ```
/// use trialspec::Value;
/// use trialspec::spec::csv_cell;
///
/// assert_eq!(csv_cell(&Value::Float(2.0)), "2.0");
/// assert_eq!(csv_cell(&Value::Int(2)), "2");
/// assert_eq!(csv_cell(&Value::Bool(true)), "true");
/// assert_eq!(csv_cell(&Value::Null), "");
/// ```
#[must_use]
pub fn csv_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => format!("{f:?}"),
        Value::Str(s) => s.clone(),
        Value::Callable(c) => c.name().to_owned(),
        Value::List(_) | Value::Tuple(_) | Value::Map(_) => to_plain_json(value).to_string(),
    }
}

/// Restores a typed value from a CSV cell.
///
/// Parsers are tried in a fixed order:
///
/// 1. text containing `.`, `e` or `E` is tried as a float;
/// 2. anything else is tried as an integer;
/// 3. `true` / `false` in any case become booleans;
/// 4. everything else, including the empty cell, stays text.
///
/// ```
/// use trialspec::Value;
/// use trialspec::spec::restore_cell;
///
/// assert_eq!(restore_cell("0.5"), Value::Float(0.5));
/// assert_eq!(restore_cell("1e-3"), Value::Float(0.001));
/// assert_eq!(restore_cell("42"), Value::Int(42));
/// assert_eq!(restore_cell("TRUE"), Value::Bool(true));
/// assert_eq!(restore_cell("adam"), Value::from("adam"));
/// ```
#[must_use]
pub fn restore_cell(text: &str) -> Value {
    let trimmed = text.trim();
    let parsed = if trimmed.contains(['.', 'e', 'E']) {
        trimmed.parse::<f64>().ok().map(Value::Float)
    } else {
        trimmed.parse::<i64>().ok().map(Value::Int)
    };
    parsed.unwrap_or_else(|| {
        if text.eq_ignore_ascii_case("true") {
            Value::Bool(true)
        } else if text.eq_ignore_ascii_case("false") {
            Value::Bool(false)
        } else {
            Value::Str(text.to_owned())
        }
    })
}

/// Builds the rows to write, checking every record against the header.
fn rows(trials: &[TrialRecord]) -> Result<(Vec<&str>, Vec<Vec<String>>)> {
    let Some(first) = trials.first() else {
        return Ok((Vec::new(), Vec::new()));
    };
    let header: Vec<&str> = first.keys().collect();
    let mut rows = Vec::with_capacity(trials.len());
    for (index, trial) in trials.iter().enumerate() {
        if let Some(field) = trial.keys().find(|k| !header.contains(k)) {
            return Err(Error::FieldMismatch {
                index,
                field: field.to_owned(),
            });
        }
        rows.push(
            header
                .iter()
                .map(|k| trial.get(k).map(csv_cell).unwrap_or_default())
                .collect(),
        );
    }
    Ok((header, rows))
}

impl Spec {
    /// Writes the trial records to a CSV file.
    ///
    /// The header is the field order of the first trial. Later trials may
    /// omit fields (written as empty cells) but may not add new ones.
    ///
    /// # Errors
    ///
    /// - [`Error::Path`] if `path` cannot name a writable file.
    /// - [`Error::FieldMismatch`] if a trial has a field the first one lacks.
    ///   Nothing is written in that case.
    /// - I/O and CSV errors from writing.
    pub fn trials_to_csv(&self, path: impl AsRef<Path>, if_exists: IfExists) -> Result<CsvWrite> {
        let path = path.as_ref();
        check_writable(path)?;
        if self.trials.is_empty() {
            return Ok(CsvWrite::NoTrials);
        }
        let (header, rows) = rows(&self.trials)?;

        let exists = path.exists();
        let (file, outcome) = match (exists, if_exists) {
            (true, IfExists::Skip) => {
                trace_debug!(path = %path.display(), "csv exists, skipping");
                return Ok(CsvWrite::Skipped);
            }
            (true, IfExists::Overwrite) => (File::create(path)?, CsvWrite::Overwritten),
            (true, IfExists::Append) => (
                OpenOptions::new().append(true).open(path)?,
                CsvWrite::Appended,
            ),
            (false, _) => (File::create(path)?, CsvWrite::Created),
        };

        let mut writer = csv::Writer::from_writer(file);
        if outcome != CsvWrite::Appended {
            writer.write_record(&header)?;
        }
        for row in &rows {
            writer.write_record(row)?;
        }
        writer.flush()?;

        trace_info!(path = %path.display(), rows = rows.len(), ?outcome, "trials written to csv");
        Ok(outcome)
    }

    /// Reads trial records from a CSV file written by [`trials_to_csv`](Self::trials_to_csv).
    ///
    /// Cells are restored with [`restore_cell`]. With `replace` the current
    /// trials are discarded first; otherwise the rows are appended. Returns
    /// the number of rows read.
    ///
    /// # Errors
    ///
    /// - [`Error::Path`] if `path` is not an existing file.
    /// - CSV errors, including rows whose length differs from the header.
    pub fn trials_from_csv(&mut self, path: impl AsRef<Path>, replace: bool) -> Result<usize> {
        let path = path.as_ref();
        check_readable(path)?;

        let mut reader = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;
        let header = reader.headers()?.clone();
        let mut records = Vec::new();
        for row in reader.records() {
            let row = row?;
            records.push(
                header
                    .iter()
                    .zip(row.iter())
                    .map(|(field, cell)| (field, restore_cell(cell)))
                    .collect::<TrialRecord>(),
            );
        }

        let n = self.merge_trials(records, replace);
        trace_info!(path = %path.display(), rows = n, replace, "trials read from csv");
        Ok(n)
    }
}
