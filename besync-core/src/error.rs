//! Error types for besync-core.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while turning a config file into a [`crate::SyncConfig`].
///
/// Both variants are fatal for the configuration they belong to.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read or is not valid JSON.
    #[error("failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// The JSON parsed but required fields are absent or malformed.
    #[error("invalid configuration {path}: {}", join_problems(.problems))]
    Validation {
        path: PathBuf,
        problems: Vec<ConfigProblem>,
    },
}

impl ConfigError {
    /// Problems reported by validation; empty for parse failures.
    pub fn problems(&self) -> &[ConfigProblem] {
        match self {
            ConfigError::Validation { problems, .. } => problems,
            ConfigError::Parse { .. } => &[],
        }
    }
}

/// A single shape violation found in a config document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigProblem {
    /// The document root is not a JSON object.
    NotAnObject,
    /// A required field is absent.
    Missing { field: &'static str },
    /// A string field is empty or whitespace only.
    Blank { field: &'static str },
    /// A field has the wrong JSON type.
    WrongType {
        field: &'static str,
        expected: &'static str,
    },
    /// A required list has no elements.
    EmptyList { field: &'static str },
    /// One element of a list is blank or of the wrong type.
    BadEntry { field: &'static str, index: usize },
}

impl ConfigProblem {
    /// Name of the offending field, if the problem is tied to one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ConfigProblem::NotAnObject => None,
            ConfigProblem::Missing { field }
            | ConfigProblem::Blank { field }
            | ConfigProblem::WrongType { field, .. }
            | ConfigProblem::EmptyList { field }
            | ConfigProblem::BadEntry { field, .. } => Some(field),
        }
    }
}

impl fmt::Display for ConfigProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigProblem::NotAnObject => write!(f, "config root must be a JSON object"),
            ConfigProblem::Missing { field } => write!(f, "missing required field `{field}`"),
            ConfigProblem::Blank { field } => write!(f, "`{field}` must not be blank"),
            ConfigProblem::WrongType { field, expected } => {
                write!(f, "`{field}` must be {expected}")
            }
            ConfigProblem::EmptyList { field } => {
                write!(f, "`{field}` must list at least one entry")
            }
            ConfigProblem::BadEntry { field, index } => {
                write!(f, "`{field}[{index}]` must be a non-blank string")
            }
        }
    }
}

fn join_problems(problems: &[ConfigProblem]) -> String {
    problems
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
