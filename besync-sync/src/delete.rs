//! Remove one path from the cache and from every machine.
//!
//! No rollback and no confirmation: the cache entry goes first, then each
//! machine gets a forced recursive remove. A machine that fails is logged
//! as an error and the rest are still attempted.

use std::fs;
use std::io;
use std::path::Path;
use std::time::Instant;

use besync_core::{paths, NamedConfig};

use crate::command::CommandRunner;
use crate::engine::Engine;
use crate::error::SyncError;
use crate::log::ConfigLog;
use crate::report::{CacheOutcome, DeleteReport, MachineOutcome};
use crate::transport::remote_target;

impl<R: CommandRunner> Engine<R> {
    /// Delete `target` (absolute under `source`, or already relative).
    ///
    /// Returns [`SyncError::InvalidTarget`] without touching anything when
    /// the target names the whole tree or climbs out of it.
    pub fn delete(&mut self, named: &NamedConfig, target: &str) -> Result<DeleteReport, SyncError> {
        let config = &named.config;
        let relative =
            paths::normalize_relative(&paths::relative_to_source(&config.source, target.trim()));
        if relative.is_empty() {
            return Err(SyncError::InvalidTarget {
                target: target.to_string(),
                reason: "path resolves to the root of `source`",
            });
        }
        if paths::escapes_root(&relative) {
            return Err(SyncError::InvalidTarget {
                target: target.to_string(),
                reason: "path contains `..`",
            });
        }

        let log = self.log.for_config(&named.name);
        log.info(&format!(
            "Deleting {relative} from cache and {} machines",
            config.machines().len()
        ));

        let cache_path = config.cache_dir(&self.base_dir).join(&relative);
        let cache = remove_cached(&cache_path, &relative, &log);

        let remote_path = remote_target(config, &relative);
        let mut machines = Vec::with_capacity(config.machines().len());
        for machine in config.machines() {
            let invocation = self.transport.remove(machine, &remote_path);
            tracing::debug!(config = %named.name, %machine, command = %invocation, "remove");

            let started = Instant::now();
            let result = self.runner.run(&invocation);
            match &result {
                Ok(()) => log.success(&format!("Deleted {relative} from {machine}")),
                Err(err) => log.error(&format!(
                    "Failed to delete {relative} from {machine}: {err}"
                )),
            }
            machines.push(MachineOutcome::new(machine, &result, started.elapsed()));
        }

        log.info(&format!("Done deleting {relative}"));
        Ok(DeleteReport {
            config: named.name.clone(),
            relative_path: relative,
            cache,
            machines,
        })
    }
}

/// Remove a cached file, symlink or directory tree. Absence is not an error.
fn remove_cached(path: &Path, relative: &str, log: &ConfigLog<'_>) -> CacheOutcome {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            log.info(&format!("Not found in cache: {relative}"));
            return CacheOutcome::NotFound {
                path: path.to_path_buf(),
            };
        }
        Err(err) => return cache_failure(path, err, log),
    };

    let removed = if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    match removed {
        Ok(()) => {
            log.success(&format!("Deleted from cache: {}", path.display()));
            CacheOutcome::Removed {
                path: path.to_path_buf(),
            }
        }
        Err(err) => cache_failure(path, err, log),
    }
}

fn cache_failure(path: &Path, err: io::Error, log: &ConfigLog<'_>) -> CacheOutcome {
    log.error(&format!(
        "Failed to delete from cache: {}: {err}",
        path.display()
    ));
    CacheOutcome::Failed {
        path: path.to_path_buf(),
        error: err.to_string(),
    }
}
