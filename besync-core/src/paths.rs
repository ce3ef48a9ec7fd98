//! Path helpers shared by the sync and delete engines.
//!
//! Remote paths stay `String`s: they are interpreted by the remote shell,
//! never by the local filesystem.

use std::path::{Path, PathBuf};

/// Expand a leading `~/` (or a bare `~`) to the current user's home.
///
/// Paths are returned unchanged when no home directory can be determined.
pub fn expand_home(path: &str) -> PathBuf {
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Resolve the configured cache path: expand `~/`, then anchor relative
/// paths at `base_dir` (normally the working directory).
pub fn resolve_cache_dir(cache_path: &str, base_dir: &Path) -> PathBuf {
    let expanded = expand_home(cache_path.trim());
    if expanded.is_absolute() {
        expanded
    } else {
        base_dir.join(expanded)
    }
}

/// Compute `target` relative to `source`.
///
/// The `source` prefix is stripped only on a path-component boundary, so
/// `/home/u/data2/x` is not treated as living under `/home/u/data`. Leading
/// separators are always removed.
pub fn relative_to_source(source: &str, target: &str) -> String {
    let root = source.trim_end_matches('/');
    let rest = match target.strip_prefix(root) {
        Some(rest) if !root.is_empty() && (rest.is_empty() || rest.starts_with('/')) => rest,
        _ => target,
    };
    rest.trim_start_matches('/').to_string()
}

/// `source` joined with a relative path, as seen by the remote shell.
pub fn remote_join(source: &str, relative: &str) -> String {
    format!("{}/{}", source.trim_end_matches('/'), relative)
}

/// Drop `.` and empty components: `./a//b/.` → `a/b`, `.` → ``.
pub fn normalize_relative(relative: &str) -> String {
    relative
        .split('/')
        .filter(|part| !part.is_empty() && *part != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// `true` when the relative path would climb out of its root.
pub fn escapes_root(relative: &str) -> bool {
    relative.split('/').any(|part| part == "..")
}
