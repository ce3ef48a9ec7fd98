//! Shared sync pipeline entrypoint: one config file or a directory of them.

use std::path::{Path, PathBuf};

use besync_core::{config, types::config_name, ConfigError};

use crate::command::CommandRunner;
use crate::engine::Engine;
use crate::error::{io_err, SyncError};
use crate::log::Level;
use crate::report::SyncReport;

/// What a `sync` argument points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Every `*.json` file directly inside the directory.
    Directory(PathBuf),
    /// A single config file.
    File(PathBuf),
}

/// Outcome for one config file of a run.
#[derive(Debug)]
pub struct ConfigRun {
    pub name: String,
    pub path: PathBuf,
    pub result: Result<SyncReport, ConfigError>,
}

/// Classify `path` as a config directory or a single `.json` config.
pub fn resolve_scope(path: &Path) -> Result<Scope, SyncError> {
    if path.is_dir() {
        Ok(Scope::Directory(path.to_path_buf()))
    } else if is_json(path) {
        Ok(Scope::File(path.to_path_buf()))
    } else {
        Err(SyncError::NotAConfig {
            path: path.to_path_buf(),
        })
    }
}

/// `*.json` files directly inside `dir`, sorted by file name.
pub fn list_configs(dir: &Path) -> Result<Vec<PathBuf>, SyncError> {
    let mut configs: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(|e| io_err(dir, e))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| is_json(p) && p.is_file())
        .collect();
    configs.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    if configs.is_empty() {
        return Err(SyncError::NoConfigs {
            dir: dir.to_path_buf(),
        });
    }
    Ok(configs)
}

/// Sync every config in `scope`, one after another.
///
/// In directory mode a config that fails to load is logged and skipped; in
/// file mode the config error is returned.
pub fn run<R: CommandRunner>(
    engine: &mut Engine<R>,
    scope: &Scope,
) -> Result<Vec<ConfigRun>, SyncError> {
    match scope {
        Scope::File(path) => {
            let run = sync_file(engine, path);
            match run.result {
                Err(err) => Err(SyncError::Config(err)),
                Ok(_) => Ok(vec![run]),
            }
        }
        Scope::Directory(dir) => {
            let configs = list_configs(dir)?;
            Ok(configs.iter().map(|path| sync_file(engine, path)).collect())
        }
    }
}

fn sync_file<R: CommandRunner>(engine: &mut Engine<R>, path: &Path) -> ConfigRun {
    let name = config_name(path);
    let result = match config::load(path) {
        Ok(named) => Ok(engine.sync(&named)),
        Err(err) => {
            engine.log.record(Level::Error, Some(&name), &err.to_string());
            Err(err)
        }
    };
    ConfigRun {
        name,
        path: path.to_path_buf(),
        result,
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn directory_scope_is_detected() {
        let dir = TempDir::new().expect("dir");
        assert_eq!(
            resolve_scope(dir.path()).expect("scope"),
            Scope::Directory(dir.path().to_path_buf())
        );
    }

    #[test]
    fn json_path_is_a_file_scope_even_if_missing() {
        let dir = TempDir::new().expect("dir");
        let path = dir.path().join("later.json");
        assert_eq!(resolve_scope(&path).expect("scope"), Scope::File(path));
    }

    #[test]
    fn other_files_are_rejected() {
        let dir = TempDir::new().expect("dir");
        let path = dir.path().join("notes.txt");
        fs::write(&path, "").expect("write");
        assert!(matches!(
            resolve_scope(&path),
            Err(SyncError::NotAConfig { .. })
        ));
    }

    #[test]
    fn configs_are_listed_in_name_order() {
        let dir = TempDir::new().expect("dir");
        for name in ["b.json", "a.json", "c.txt", "A.JSON"] {
            fs::write(dir.path().join(name), "{}").expect("write");
        }
        fs::create_dir(dir.path().join("nested.json")).expect("mkdir");

        let names: Vec<_> = list_configs(dir.path())
            .expect("list")
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.json", "b.json"]);
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_configs_are_followed() {
        let dir = TempDir::new().expect("dir");
        let elsewhere = TempDir::new().expect("elsewhere");
        let real = elsewhere.path().join("shared.json");
        fs::write(&real, "{}").expect("write");
        std::os::unix::fs::symlink(&real, dir.path().join("linked.json")).expect("symlink");
        std::os::unix::fs::symlink(
            elsewhere.path().join("dangling.json"),
            dir.path().join("dangling.json"),
        )
        .expect("symlink");

        let configs = list_configs(dir.path()).expect("list");
        assert_eq!(configs, vec![dir.path().join("linked.json")]);
    }

    #[test]
    fn empty_directory_has_no_configs() {
        let dir = TempDir::new().expect("dir");
        assert!(matches!(
            list_configs(dir.path()),
            Err(SyncError::NoConfigs { .. })
        ));
    }

    #[test]
    fn unreadable_directory_is_an_io_error() {
        let dir = TempDir::new().expect("dir");
        assert!(matches!(
            list_configs(&dir.path().join("missing")),
            Err(SyncError::Io { .. })
        ));
    }
}
