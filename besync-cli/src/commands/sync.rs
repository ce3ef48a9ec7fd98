//! `besync sync` — reconcile one config or a directory of configs.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use besync_sync::{
    pipeline::{self, ConfigRun},
    CommandRunner, DryRunRunner, Engine, EventLog, Stage, SyncReport, SystemRunner,
};

use crate::Settings;

/// Arguments for `besync sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// A `.json` config file, or a directory whose `*.json` files are synced in name order.
    pub target: PathBuf,

    /// Log the transfers that would run without running them.
    #[arg(long)]
    pub dry_run: bool,

    /// Print a machine-readable summary instead of the table.
    #[arg(long)]
    pub json: bool,
}

impl SyncArgs {
    pub fn run(self, settings: &Settings) -> Result<()> {
        let scope = pipeline::resolve_scope(&self.target)?;
        if self.dry_run {
            let mut engine = engine(DryRunRunner::new(), settings, self.json);
            let runs = pipeline::run(&mut engine, &scope)
                .with_context(|| format!("sync failed for {}", self.target.display()))?;
            self.report(&runs)?;
            if !self.json {
                for invocation in engine.runner().planned() {
                    println!("  ~  {invocation}");
                }
            }
        } else {
            let mut engine = engine(SystemRunner, settings, self.json);
            let runs = pipeline::run(&mut engine, &scope)
                .with_context(|| format!("sync failed for {}", self.target.display()))?;
            self.report(&runs)?;
        }
        Ok(())
    }

    fn report(&self, runs: &[ConfigRun]) -> Result<()> {
        if self.json {
            let summary: Vec<_> = runs.iter().map(JsonRun::from).collect();
            println!("{}", serde_json::to_string_pretty(&summary)?);
        } else {
            for run in runs {
                print_run(run);
            }
        }
        Ok(())
    }
}

/// Event lines stay off stdout in `--json` mode so the output parses.
fn engine<R: CommandRunner>(runner: R, settings: &Settings, json: bool) -> Engine<R> {
    let log = if json {
        EventLog::quiet(settings.log_paths.clone())
    } else {
        EventLog::new(settings.log_paths.clone())
    };
    Engine::new(runner, log, &settings.base_dir).with_transport(settings.transport.clone())
}

#[derive(Serialize)]
struct JsonRun<'a> {
    name: &'a str,
    path: &'a std::path::Path,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<&'a SyncReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<'a> From<&'a ConfigRun> for JsonRun<'a> {
    fn from(run: &'a ConfigRun) -> Self {
        Self {
            name: &run.name,
            path: &run.path,
            report: run.result.as_ref().ok(),
            error: run.result.as_ref().err().map(ToString::to_string),
        }
    }
}

fn print_run(run: &ConfigRun) {
    let report = match &run.result {
        Ok(report) => report,
        Err(err) => {
            println!("{} '{}' — {err}", "✗".red(), run.name);
            return;
        }
    };
    let prefix = if report.dry_run { "[dry-run] " } else { "" };

    if let Some(reason) = &report.aborted {
        println!("{prefix}{} '{}' — aborted: {reason}", "✗".red(), report.config);
        return;
    }

    let total = report.pulls.len();
    let mark = if report.is_clean() {
        "✓".green()
    } else {
        "!".yellow()
    };
    println!(
        "{prefix}{mark} '{}' synced ({}/{total} pulled, {}/{total} pushed)",
        report.config,
        report.succeeded(Stage::Pull),
        report.succeeded(Stage::Push),
    );

    for stage in [Stage::Pull, Stage::Push] {
        for outcome in report.outcomes(stage).iter().filter(|o| !o.success) {
            println!(
                "  {}  {stage} {}: {}",
                "✗".red(),
                outcome.machine,
                outcome.error.as_deref().unwrap_or("unknown error")
            );
        }
    }
}
