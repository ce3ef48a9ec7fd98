//! `besync delete` — remove one path from the cache and every machine.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use besync_core::config;
use besync_sync::{CacheOutcome, Engine, EventLog, SystemRunner};

use crate::Settings;

/// Arguments for `besync delete`.
#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Config file naming the source, machines and cache.
    pub config: PathBuf,

    /// Path to delete, either under `source` or relative to it.
    pub path: String,
}

impl DeleteArgs {
    pub fn run(self, settings: &Settings) -> Result<()> {
        let named = config::load(&self.config)?;
        let log = EventLog::new(settings.log_paths.clone());
        let mut engine = Engine::new(SystemRunner, log, &settings.base_dir)
            .with_transport(settings.transport.clone());

        let report = engine
            .delete(&named, &self.path)
            .with_context(|| format!("delete failed for '{}'", self.path))?;

        let cache = match &report.cache {
            CacheOutcome::Removed { .. } => "removed from cache".to_string(),
            CacheOutcome::NotFound { .. } => "not in cache".to_string(),
            CacheOutcome::Failed { error, .. } => format!("cache removal failed: {error}"),
        };
        let reached = report.machines.len() - report.failed();
        let mark = if report.failed() == 0 && !matches!(report.cache, CacheOutcome::Failed { .. }) {
            "✓".green()
        } else {
            "!".yellow()
        };
        println!(
            "{mark} '{}' deleted {} ({cache}; {reached}/{} machines)",
            report.config,
            report.relative_path,
            report.machines.len()
        );
        for outcome in report.machines.iter().filter(|o| !o.success) {
            println!(
                "  {}  {}: {}",
                "✗".red(),
                outcome.machine,
                outcome.error.as_deref().unwrap_or("unknown error")
            );
        }
        Ok(())
    }
}
