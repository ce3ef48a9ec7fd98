//! Two-stage pull-then-push reconciliation.
//!
//! The local cache is the only party every machine talks to:
//!
//! 1. ensure the cache directory exists (abort this config if it cannot be
//!    created),
//! 2. **pull** from each machine in list order, only adding files the cache
//!    lacks or that are newer remotely,
//! 3. **push** the merged cache to each machine in the same order, only
//!    replacing remote files older than the cache.
//!
//! Machines are visited strictly one after another. A failed machine is
//! logged as a warning and skipped; nothing is retried.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use besync_core::NamedConfig;

use crate::command::CommandRunner;
use crate::log::{ConfigLog, EventLog};
use crate::report::{MachineOutcome, Stage, SyncReport};
use crate::transport::Transport;

/// Runs sync and delete operations for loaded configs.
#[derive(Debug)]
pub struct Engine<R> {
    pub(crate) runner: R,
    pub(crate) transport: Transport,
    pub(crate) log: EventLog,
    /// Anchor for relative cache paths.
    pub(crate) base_dir: PathBuf,
}

impl<R: CommandRunner> Engine<R> {
    /// Engine with the default transport, resolving relative cache paths
    /// against `base_dir`.
    pub fn new(runner: R, log: EventLog, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            transport: Transport::default(),
            log,
            base_dir: base_dir.into(),
        }
    }

    pub fn with_transport(mut self, transport: Transport) -> Self {
        self.transport = transport;
        self
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Reconcile the cache with every machine of `named`.
    ///
    /// Never fails: per-machine errors are logged and recorded in the
    /// returned report.
    pub fn sync(&mut self, named: &NamedConfig) -> SyncReport {
        let config = &named.config;
        let cache_dir = config.cache_dir(&self.base_dir);
        let dry_run = self.runner.is_dry_run();
        let log = self.log.for_config(&named.name);
        let prefix = if dry_run { "[dry-run] " } else { "" };
        let count = config.machines().len();
        let mut report = SyncReport::new(&named.name, cache_dir.clone(), dry_run);

        log.info(&format!(
            "{prefix}Starting sync for {} with {count} machines",
            config.source
        ));

        if let Err(reason) = ensure_cache_dir(&cache_dir, dry_run, &log) {
            report.aborted = Some(reason);
            return report;
        }

        for stage in [Stage::Pull, Stage::Push] {
            let heading = match stage {
                Stage::Pull => format!("Stage 1: Pulling updates from {count} machines to cache"),
                Stage::Push => format!("Stage 2: Pushing updates from cache to {count} machines"),
            };
            log.info(&format!("{prefix}{heading}"));

            for machine in config.machines() {
                let invocation = self.transport.transfer(stage, config, machine, &cache_dir);
                tracing::debug!(config = %named.name, %stage, %machine, command = %invocation, "transfer");

                let started = Instant::now();
                let result = self.runner.run(&invocation);
                match (&result, stage) {
                    (Ok(()), Stage::Pull) => {
                        log.success(&format!("{prefix}Pulled updates from {machine}"))
                    }
                    (Ok(()), Stage::Push) => {
                        log.success(&format!("{prefix}Pushed updates to {machine}"))
                    }
                    (Err(err), Stage::Pull) => {
                        log.warning(&format!("{prefix}Failed to pull from {machine}: {err}"))
                    }
                    (Err(err), Stage::Push) => {
                        log.warning(&format!("{prefix}Failed to push to {machine}: {err}"))
                    }
                }

                let outcome = MachineOutcome::new(machine, &result, started.elapsed());
                match stage {
                    Stage::Pull => report.pulls.push(outcome),
                    Stage::Push => report.pushes.push(outcome),
                }
            }

            log.info(&format!(
                "{prefix}Stage {} finished: {}/{count} machines succeeded",
                if stage == Stage::Pull { 1 } else { 2 },
                report.succeeded(stage),
            ));
        }

        log.info(&format!("{prefix}Sync completed for {}", config.source));
        report
    }
}

/// Create the cache directory if needed. Dry runs only report it.
fn ensure_cache_dir(cache_dir: &Path, dry_run: bool, log: &ConfigLog<'_>) -> Result<(), String> {
    if cache_dir.is_dir() {
        return Ok(());
    }
    if dry_run {
        log.info(&format!(
            "[dry-run] Would create cache directory: {}",
            cache_dir.display()
        ));
        return Ok(());
    }

    match fs::create_dir_all(cache_dir) {
        Ok(()) => {
            set_dir_permissions(cache_dir);
            Ok(())
        }
        Err(err) => {
            let reason = format!(
                "Failed to create cache directory: {}: {err}",
                cache_dir.display()
            );
            log.error(&reason);
            Err(reason)
        }
    }
}

#[cfg(unix)]
fn set_dir_permissions(dir: &Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(err) = fs::set_permissions(dir, fs::Permissions::from_mode(0o755)) {
        tracing::warn!(path = %dir.display(), error = %err, "cannot set cache directory mode");
    }
}

#[cfg(not(unix))]
fn set_dir_permissions(_dir: &Path) {}
