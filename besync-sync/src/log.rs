//! Append-only event log.
//!
//! Every event becomes one line
//!
//! ```text
//! [2024-05-01T08:30:00.123Z] [SUCCESS] Pulled updates from laptop
//! ```
//!
//! appended to the global log, to `<per_config_dir>/<config>.log` when the
//! event belongs to a configuration, and echoed to stdout. Log files are
//! never rotated or truncated. A log file that cannot be written is reported
//! through `tracing` and otherwise ignored.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

/// Global log file name used by [`LogPaths::in_dir`].
pub const GLOBAL_LOG: &str = "besync.log";
/// Per-config log directory name used by [`LogPaths::in_dir`].
pub const CONFIG_LOG_DIR: &str = "configs";

/// Severity of an event-log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Info => write!(f, "INFO"),
            Level::Success => write!(f, "SUCCESS"),
            Level::Warning => write!(f, "WARNING"),
            Level::Error => write!(f, "ERROR"),
        }
    }
}

/// Where log lines land.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogPaths {
    pub global: PathBuf,
    /// Directory holding one `<config>.log` per configuration; `None`
    /// disables per-config logs.
    pub per_config_dir: Option<PathBuf>,
}

impl LogPaths {
    /// `<base>/besync.log` plus `<base>/configs/<config>.log`.
    pub fn in_dir(base: &Path) -> Self {
        Self {
            global: base.join(GLOBAL_LOG),
            per_config_dir: Some(base.join(CONFIG_LOG_DIR)),
        }
    }

    pub fn config_log(&self, config: &str) -> Option<PathBuf> {
        self.per_config_dir
            .as_ref()
            .map(|dir| dir.join(format!("{config}.log")))
    }
}

/// Process-wide event log with explicit file locations.
#[derive(Debug, Clone)]
pub struct EventLog {
    paths: LogPaths,
    echo: bool,
}

impl EventLog {
    /// Log to `paths` and echo every line to stdout.
    pub fn new(paths: LogPaths) -> Self {
        Self { paths, echo: true }
    }

    /// Log to `paths` without echoing.
    pub fn quiet(paths: LogPaths) -> Self {
        Self { paths, echo: false }
    }

    /// Append one event. `config` selects the per-config log, if any.
    pub fn record(&self, level: Level, config: Option<&str>, message: &str) {
        let line = format_line(Utc::now(), level, message);

        append_line(&self.paths.global, &line);
        if let Some(path) = config.and_then(|name| self.paths.config_log(name)) {
            append_line(&path, &line);
        }
        if self.echo {
            println!("{line}");
        }
    }

    /// Handle that tags every event with `config`.
    pub fn for_config<'a>(&'a self, config: &'a str) -> ConfigLog<'a> {
        ConfigLog { log: self, config }
    }
}

/// Event log bound to one configuration name.
#[derive(Debug, Clone, Copy)]
pub struct ConfigLog<'a> {
    log: &'a EventLog,
    config: &'a str,
}

impl ConfigLog<'_> {
    pub fn info(&self, message: &str) {
        self.log.record(Level::Info, Some(self.config), message);
    }

    pub fn success(&self, message: &str) {
        self.log.record(Level::Success, Some(self.config), message);
    }

    pub fn warning(&self, message: &str) {
        self.log.record(Level::Warning, Some(self.config), message);
    }

    pub fn error(&self, message: &str) {
        self.log.record(Level::Error, Some(self.config), message);
    }
}

/// `[<timestamp>] [<LEVEL>] <message>` with a millisecond UTC timestamp.
pub fn format_line(at: DateTime<Utc>, level: Level, message: &str) -> String {
    format!(
        "[{}] [{level}] {message}",
        at.to_rfc3339_opts(SecondsFormat::Millis, true)
    )
}

fn append_line(path: &Path, line: &str) {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            if let Err(err) = fs::create_dir_all(parent) {
                tracing::warn!(path = %parent.display(), error = %err, "cannot create log directory");
                return;
            }
        }
    }

    let result = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .and_then(|mut file| writeln!(file, "{line}"));
    if let Err(err) = result {
        tracing::warn!(path = %path.display(), error = %err, "cannot append to log file");
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
