//! besync — mirror a tree across machines through a local cache.
//!
//! # Usage
//!
//! ```text
//! besync sync <folder-or-config> [--dry-run] [--json]
//! besync delete <config> <file-subpath>
//! ```
//!
//! Global options: `--log-file`, `--log-dir`, `--rsync`, `--ssh`,
//! `--connect-timeout`.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use besync_sync::{
    log::{CONFIG_LOG_DIR, GLOBAL_LOG},
    LogPaths, Transport,
};
use commands::{delete::DeleteArgs, sync::SyncArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "besync",
    version,
    about = "Mirror a file tree across machines through a local cache",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Global append-only log file.
    #[arg(long, global = true, env = "BESYNC_LOG_FILE", default_value = GLOBAL_LOG)]
    log_file: PathBuf,

    /// Directory for per-configuration log files.
    #[arg(long, global = true, env = "BESYNC_LOG_DIR", default_value = CONFIG_LOG_DIR)]
    log_dir: PathBuf,

    /// File-transfer executable.
    #[arg(long, global = true, env = "BESYNC_RSYNC", default_value = "rsync")]
    rsync: String,

    /// Remote-shell executable.
    #[arg(long, global = true, env = "BESYNC_SSH", default_value = "ssh")]
    ssh: String,

    /// Seconds allowed for establishing each remote-shell connection.
    #[arg(long, global = true, env = "BESYNC_CONNECT_TIMEOUT", default_value_t = 30)]
    connect_timeout: u64,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Pull every machine into the cache, then push the cache to every machine.
    Sync(SyncArgs),

    /// Delete one path from the cache and from every machine.
    Delete(DeleteArgs),
}

/// Settings shared by every subcommand.
#[derive(Debug, Clone)]
pub struct Settings {
    pub log_paths: LogPaths,
    pub transport: Transport,
    /// Working directory; anchors relative cache paths.
    pub base_dir: PathBuf,
}

impl Cli {
    fn settings(&self) -> Result<Settings> {
        let base_dir = std::env::current_dir().context("could not determine working directory")?;
        Ok(Settings {
            log_paths: LogPaths {
                global: self.log_file.clone(),
                per_config_dir: Some(self.log_dir.clone()),
            },
            transport: Transport {
                rsync: self.rsync.clone(),
                ssh: self.ssh.clone(),
                connect_timeout: Duration::from_secs(self.connect_timeout),
            },
            base_dir,
        })
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    // Usage errors exit 1; --help and --version still exit 0.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if err.use_stderr() => {
            let _ = err.print();
            return ExitCode::FAILURE;
        }
        Err(err) => err.exit(),
    };

    init_tracing();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let settings = cli.settings()?;
    match cli.command {
        Commands::Sync(args) => args.run(&settings),
        Commands::Delete(args) => args.run(&settings),
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
