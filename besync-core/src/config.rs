//! Config loading and validation.
//!
//! # Document shape
//!
//! ```text
//! {
//!   "source": "~/.ssh",
//!   "sourceMachines": ["laptop", "desktop"],   // alias: destinationMachines
//!   "cachePath": "~/.cache/besync/ssh",
//!   "rsyncOptions": ["-avz"],                  // optional
//!   "exclude": ["*.tmp"]                       // optional
//! }
//! ```
//!
//! Loading happens in two steps: [`parse_document`] turns bytes into a
//! `serde_json::Value`, then [`validate`] checks the shape and reports every
//! problem at once instead of stopping at the first.

use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{ConfigError, ConfigProblem};
use crate::types::{MachineName, NamedConfig, SyncConfig, DEFAULT_RSYNC_OPTIONS};

const SOURCE: &str = "source";
const SOURCE_MACHINES: &str = "sourceMachines";
const DESTINATION_MACHINES: &str = "destinationMachines";
const CACHE_PATH: &str = "cachePath";
const RSYNC_OPTIONS: &str = "rsyncOptions";
const EXCLUDE: &str = "exclude";

/// Read, parse and validate the config at `path`.
///
/// Returns [`ConfigError::Parse`] if the file is missing, unreadable or not
/// JSON, and [`ConfigError::Validation`] listing each malformed field.
pub fn load(path: &Path) -> Result<NamedConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let document = parse_document(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let config = validate(&document).map_err(|problems| ConfigError::Validation {
        path: path.to_path_buf(),
        problems,
    })?;
    Ok(NamedConfig::new(path, config))
}

/// Parse raw JSON text without checking its shape.
pub fn parse_document(contents: &str) -> Result<Value, serde_json::Error> {
    serde_json::from_str(contents)
}

/// Check a parsed document and build a [`SyncConfig`] with defaults applied.
pub fn validate(document: &Value) -> Result<SyncConfig, Vec<ConfigProblem>> {
    let Some(obj) = document.as_object() else {
        return Err(vec![ConfigProblem::NotAnObject]);
    };

    let mut problems = Vec::new();

    let source = required_string(obj, SOURCE, &mut problems);
    let machines = machine_list(obj, &mut problems);
    let cache_path = required_string(obj, CACHE_PATH, &mut problems);
    let rsync_options = optional_string_list(obj, RSYNC_OPTIONS, &mut problems);
    let exclude = optional_string_list(obj, EXCLUDE, &mut problems);

    match (source, machines, cache_path) {
        (Some(source), Some(machines), Some(cache_path)) if problems.is_empty() => {
            Ok(SyncConfig {
                source,
                source_machines: machines,
                cache_path,
                rsync_options: rsync_options.unwrap_or_else(|| {
                    DEFAULT_RSYNC_OPTIONS.iter().map(|s| s.to_string()).collect()
                }),
                exclude: exclude.unwrap_or_default(),
            })
        }
        _ => Err(problems),
    }
}

fn required_string(
    obj: &Map<String, Value>,
    field: &'static str,
    problems: &mut Vec<ConfigProblem>,
) -> Option<String> {
    match obj.get(field) {
        None | Some(Value::Null) => {
            problems.push(ConfigProblem::Missing { field });
            None
        }
        Some(Value::String(s)) if s.trim().is_empty() => {
            problems.push(ConfigProblem::Blank { field });
            None
        }
        Some(Value::String(s)) => Some(s.trim().to_string()),
        Some(_) => {
            problems.push(ConfigProblem::WrongType {
                field,
                expected: "a string",
            });
            None
        }
    }
}

/// `sourceMachines`, falling back to its `destinationMachines` alias.
fn machine_list(
    obj: &Map<String, Value>,
    problems: &mut Vec<ConfigProblem>,
) -> Option<Vec<MachineName>> {
    let field = if obj.get(SOURCE_MACHINES).is_some_and(|v| !v.is_null()) {
        SOURCE_MACHINES
    } else if obj.get(DESTINATION_MACHINES).is_some_and(|v| !v.is_null()) {
        DESTINATION_MACHINES
    } else {
        problems.push(ConfigProblem::Missing {
            field: SOURCE_MACHINES,
        });
        return None;
    };

    let entries = string_entries(obj, field, problems)?;
    if entries.is_empty() {
        problems.push(ConfigProblem::EmptyList { field });
        return None;
    }
    Some(entries.into_iter().map(MachineName::from).collect())
}

fn optional_string_list(
    obj: &Map<String, Value>,
    field: &'static str,
    problems: &mut Vec<ConfigProblem>,
) -> Option<Vec<String>> {
    match obj.get(field) {
        None | Some(Value::Null) => None,
        Some(_) => string_entries(obj, field, problems),
    }
}

/// Returns the trimmed elements of an array of non-blank strings, recording
/// a problem for each bad element.
fn string_entries(
    obj: &Map<String, Value>,
    field: &'static str,
    problems: &mut Vec<ConfigProblem>,
) -> Option<Vec<String>> {
    let Some(items) = obj.get(field).and_then(Value::as_array) else {
        problems.push(ConfigProblem::WrongType {
            field,
            expected: "an array of strings",
        });
        return None;
    };

    let before = problems.len();
    let mut out = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match item.as_str().map(str::trim) {
            Some(s) if !s.is_empty() => out.push(s.to_string()),
            _ => problems.push(ConfigProblem::BadEntry { field, index }),
        }
    }
    (problems.len() == before).then_some(out)
}
