//! besync core library — configuration types, loading, validation, paths.
//!
//! - [`types`] — [`SyncConfig`] and its newtypes
//! - [`config`] — load a JSON config file and validate its shape
//! - [`paths`] — home expansion, cache resolution, relative target paths
//! - [`error`] — [`ConfigError`] and [`ConfigProblem`]

pub mod config;
pub mod error;
pub mod paths;
pub mod types;

pub use error::{ConfigError, ConfigProblem};
pub use types::{MachineName, NamedConfig, SyncConfig, DEFAULT_RSYNC_OPTIONS};
