//! Error types for besync-sync.

use std::path::PathBuf;

use thiserror::Error;

use besync_core::ConfigError;

/// Errors that stop a pipeline run or a delete before any machine is touched.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A config failed to load (single-config mode only; directory mode
    /// logs and moves on).
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory mode found no `*.json` files.
    #[error("no config files (*.json) found in {dir}")]
    NoConfigs { dir: PathBuf },

    /// The sync argument is neither a directory nor a `.json` file.
    #[error("{path} is neither a directory nor a .json config file")]
    NotAConfig { path: PathBuf },

    /// The delete target cannot be mapped to a single entry under `source`.
    #[error("refusing to delete '{target}': {reason}")]
    InvalidTarget {
        target: String,
        reason: &'static str,
    },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}

/// A single machine's pull, push or remove command failed.
///
/// Always contained by the engine: it is logged and recorded in the report,
/// never returned to the caller.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("failed to execute {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("SSH connection failed: {stderr}")]
    Connection { stderr: String },

    #[error("permission denied: {stderr}")]
    PermissionDenied { stderr: String },

    #[error("{program} exited with {}: {stderr}", describe_code(*.code))]
    Exit {
        program: String,
        code: Option<i32>,
        stderr: String,
    },
}

fn describe_code(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "no status (terminated by signal)".to_string(),
    }
}
