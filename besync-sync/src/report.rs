//! Outcome records returned by the engines.
//!
//! Reports describe what happened; they never turn per-machine failures
//! into errors for the caller.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

use besync_core::MachineName;

use crate::error::TransferError;

/// Sync stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Machine → cache.
    Pull,
    /// Cache → machine.
    Push,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Pull => write!(f, "pull"),
            Stage::Push => write!(f, "push"),
        }
    }
}

/// Result of one command against one machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MachineOutcome {
    pub machine: String,
    pub success: bool,
    pub error: Option<String>,
    pub duration_ms: u64,
}

impl MachineOutcome {
    pub(crate) fn new(
        machine: &MachineName,
        result: &Result<(), TransferError>,
        elapsed: Duration,
    ) -> Self {
        Self {
            machine: machine.0.clone(),
            success: result.is_ok(),
            error: result.as_ref().err().map(ToString::to_string),
            duration_ms: elapsed.as_millis() as u64,
        }
    }
}

/// Report from syncing one configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub config: String,
    pub cache_dir: PathBuf,
    pub dry_run: bool,
    pub pulls: Vec<MachineOutcome>,
    pub pushes: Vec<MachineOutcome>,
    /// Set when the run stopped before Stage 1 (cache directory unusable).
    pub aborted: Option<String>,
}

impl SyncReport {
    pub(crate) fn new(config: impl Into<String>, cache_dir: PathBuf, dry_run: bool) -> Self {
        Self {
            config: config.into(),
            cache_dir,
            dry_run,
            pulls: Vec::new(),
            pushes: Vec::new(),
            aborted: None,
        }
    }

    pub fn outcomes(&self, stage: Stage) -> &[MachineOutcome] {
        match stage {
            Stage::Pull => &self.pulls,
            Stage::Push => &self.pushes,
        }
    }

    pub fn succeeded(&self, stage: Stage) -> usize {
        self.outcomes(stage).iter().filter(|o| o.success).count()
    }

    pub fn failed(&self) -> usize {
        self.pulls
            .iter()
            .chain(self.pushes.iter())
            .filter(|o| !o.success)
            .count()
    }

    pub fn is_clean(&self) -> bool {
        self.aborted.is_none() && self.failed() == 0
    }
}

/// What happened to the cached copy of a deleted path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CacheOutcome {
    Removed { path: PathBuf },
    NotFound { path: PathBuf },
    Failed { path: PathBuf, error: String },
}

/// Report from deleting one path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteReport {
    pub config: String,
    pub relative_path: String,
    pub cache: CacheOutcome,
    pub machines: Vec<MachineOutcome>,
}

impl DeleteReport {
    pub fn failed(&self) -> usize {
        self.machines.iter().filter(|o| !o.success).count()
    }
}
