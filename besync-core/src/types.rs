//! Domain types for besync configurations.
//!
//! A [`SyncConfig`] is immutable once loaded and is rebuilt from disk on
//! every `sync`/`delete` invocation.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::paths;

/// Transfer options used when a config omits `rsyncOptions`.
pub const DEFAULT_RSYNC_OPTIONS: &[&str] = &["-avz"];

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// An ssh-reachable host alias from `sourceMachines`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MachineName(pub String);

impl fmt::Display for MachineName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for MachineName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for MachineName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl AsRef<str> for MachineName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// One logical sync target: a remote tree mirrored on every machine and
/// staged through a local cache directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncConfig {
    /// Remote path, identical on every machine.
    pub source: String,
    /// Machines visited in order during each stage.
    pub source_machines: Vec<MachineName>,
    /// Local cache directory as written in the file (may start with `~/`).
    pub cache_path: String,
    pub rsync_options: Vec<String>,
    pub exclude: Vec<String>,
}

impl SyncConfig {
    /// Build a config with default options and no excludes.
    pub fn new(
        source: impl Into<String>,
        machines: impl IntoIterator<Item = MachineName>,
        cache_path: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            source_machines: machines.into_iter().collect(),
            cache_path: cache_path.into(),
            rsync_options: DEFAULT_RSYNC_OPTIONS.iter().map(|s| s.to_string()).collect(),
            exclude: Vec::new(),
        }
    }

    pub fn machines(&self) -> &[MachineName] {
        &self.source_machines
    }

    /// Absolute cache directory, with `~/` expanded and relative paths
    /// anchored at `base_dir`.
    pub fn cache_dir(&self, base_dir: &Path) -> PathBuf {
        paths::resolve_cache_dir(&self.cache_path, base_dir)
    }
}

/// A validated config together with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedConfig {
    /// File stem of the config file; names the per-config log.
    pub name: String,
    pub path: PathBuf,
    pub config: SyncConfig,
}

impl NamedConfig {
    pub fn new(path: impl Into<PathBuf>, config: SyncConfig) -> Self {
        let path = path.into();
        Self {
            name: config_name(&path),
            path,
            config,
        }
    }
}

/// `configs/home.json` → `home`.
pub fn config_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_name_strips_directory_and_extension() {
        assert_eq!(config_name(Path::new("configs/ssh_keys.json")), "ssh_keys");
        assert_eq!(config_name(Path::new("plain")), "plain");
    }

    #[test]
    fn new_applies_default_rsync_options() {
        let cfg = SyncConfig::new("/d", [MachineName::from("h1")], "c1");
        assert_eq!(cfg.rsync_options, vec!["-avz".to_string()]);
        assert!(cfg.exclude.is_empty());
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let cfg = SyncConfig::new("/d", [MachineName::from("h1")], "c1");
        let json = serde_json::to_value(&cfg).unwrap();
        assert_eq!(json["sourceMachines"][0], "h1");
        assert_eq!(json["cachePath"], "c1");
        assert_eq!(json["rsyncOptions"][0], "-avz");
    }
}
