//! rsync/ssh invocation builders.
//!
//! ## Stage flags
//!
//! | stage | direction              | flags                              |
//! |-------|------------------------|------------------------------------|
//! | pull  | `machine:source/ → cache/` | `--update`                     |
//! | push  | `cache/ → machine:source/` | `--update`                     |
//!
//! `--update` on both sides: a receiver file is replaced only when the
//! sender's copy is strictly newer, and missing files are always copied.
//!
//! Configured `rsyncOptions` come first, then one `--exclude=<pattern>` per
//! exclude, then the stage flags and the remote shell.

use std::path::Path;
use std::time::Duration;

use besync_core::{paths, MachineName, SyncConfig};

use crate::command::Invocation;
use crate::report::Stage;

/// Connection establishment timeout for the remote shell.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// External programs and remote-shell settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transport {
    pub rsync: String,
    pub ssh: String,
    /// Bounds connection setup only, not transfer duration.
    pub connect_timeout: Duration,
}

impl Default for Transport {
    fn default() -> Self {
        Self {
            rsync: "rsync".to_string(),
            ssh: "ssh".to_string(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

impl Transport {
    /// The ssh program with its non-interactive options.
    fn ssh_words(&self) -> Vec<String> {
        vec![
            self.ssh.clone(),
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            "-o".to_string(),
            format!("ConnectTimeout={}", self.connect_timeout.as_secs()),
        ]
    }

    /// rsync command for one machine in one stage.
    pub fn transfer(
        &self,
        stage: Stage,
        config: &SyncConfig,
        machine: &MachineName,
        cache_dir: &Path,
    ) -> Invocation {
        let remote = format!("{machine}:{}/", config.source.trim_end_matches('/'));
        let local = format!("{}/", cache_dir.display().to_string().trim_end_matches('/'));

        let inv = Invocation::new(&self.rsync)
            .args(config.rsync_options.iter().flat_map(|opt| split_option(opt)))
            .args(config.exclude.iter().map(|pattern| format!("--exclude={pattern}")))
            .arg("--update")
            .arg("-e")
            .arg(shell_words::join(self.ssh_words()));

        match stage {
            Stage::Pull => inv.arg(remote).arg(local),
            Stage::Push => inv.arg(local).arg(remote),
        }
    }

    /// Forced recursive remove of `remote_path` on `machine`.
    pub fn remove(&self, machine: &MachineName, remote_path: &str) -> Invocation {
        let mut words = self.ssh_words();
        let program = words.remove(0);
        Invocation::new(program)
            .args(words)
            .arg("--")
            .arg(&machine.0)
            .arg(format!("rm -rf -- {}", quote_remote_path(remote_path)))
    }
}

/// One `rsyncOptions` entry may hold several words (`"-avz --checksum"`).
fn split_option(option: &str) -> Vec<String> {
    shell_words::split(option).unwrap_or_else(|_| vec![option.to_string()])
}

/// Quote a path for the remote shell while keeping a leading `~/` expandable.
pub fn quote_remote_path(path: &str) -> String {
    match path.strip_prefix("~/") {
        Some(rest) => format!("~/{}", shell_words::quote(rest)),
        None => shell_words::quote(path).into_owned(),
    }
}

/// Remote location of `relative` under the config's `source`.
pub fn remote_target(config: &SyncConfig, relative: &str) -> String {
    paths::remote_join(&config.source, relative)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn config() -> SyncConfig {
        let mut cfg = SyncConfig::new("/d", [MachineName::from("h1")], "c1");
        cfg.exclude = vec!["*.tmp".to_string(), ".git".to_string()];
        cfg
    }

    #[test]
    fn pull_replaces_only_older_cache_files() {
        let inv = Transport::default().transfer(
            Stage::Pull,
            &config(),
            &MachineName::from("h1"),
            &PathBuf::from("/work/c1"),
        );
        assert_eq!(inv.program, "rsync");
        assert_eq!(
            inv.args,
            vec![
                "-avz",
                "--exclude=*.tmp",
                "--exclude=.git",
                "--update",
                "-e",
                "ssh -o BatchMode=yes -o ConnectTimeout=30",
                "h1:/d/",
                "/work/c1/",
            ]
        );
    }

    #[test]
    fn push_only_updates_older_remote_files() {
        let inv = Transport::default().transfer(
            Stage::Push,
            &config(),
            &MachineName::from("h1"),
            &PathBuf::from("/work/c1/"),
        );
        assert!(inv.args.contains(&"--update".to_string()));
        assert_eq!(&inv.args[inv.args.len() - 2..], ["/work/c1/", "h1:/d/"]);
    }

    #[test]
    fn multi_word_options_are_split() {
        let mut cfg = config();
        cfg.rsync_options = vec!["-a --checksum".to_string(), "--chmod=F600".to_string()];
        let inv = Transport::default().transfer(
            Stage::Push,
            &cfg,
            &MachineName::from("h1"),
            &PathBuf::from("/c"),
        );
        assert_eq!(&inv.args[..3], ["-a", "--checksum", "--chmod=F600"]);
    }

    #[test]
    fn remove_quotes_path_but_keeps_home_expansion() {
        let transport = Transport {
            connect_timeout: Duration::from_secs(5),
            ..Transport::default()
        };
        let inv = transport.remove(&MachineName::from("h1"), "~/.ssh/old key");
        assert_eq!(inv.program, "ssh");
        assert_eq!(
            inv.args,
            vec![
                "-o",
                "BatchMode=yes",
                "-o",
                "ConnectTimeout=5",
                "--",
                "h1",
                "rm -rf -- ~/'.ssh/old key'",
            ]
        );
    }

    #[test]
    fn remote_target_joins_under_source() {
        assert_eq!(remote_target(&config(), "sub/file.txt"), "/d/sub/file.txt");
    }
}
