//! # besync-sync
//!
//! Two-stage cache reconciliation over an external transfer tool.
//!
//! Build an [`Engine`] around a [`CommandRunner`] and an [`EventLog`], then
//! call [`Engine::sync`] or [`Engine::delete`] for a loaded config, or hand a
//! directory of configs to [`pipeline::run`].

pub mod command;
mod delete;
mod engine;
pub mod error;
pub mod log;
pub mod pipeline;
pub mod report;
pub mod transport;

pub use command::{CommandRunner, DryRunRunner, Invocation, SystemRunner};
pub use engine::Engine;
pub use error::{SyncError, TransferError};
pub use log::{EventLog, Level, LogPaths};
pub use report::{CacheOutcome, DeleteReport, MachineOutcome, Stage, SyncReport};
pub use transport::Transport;
