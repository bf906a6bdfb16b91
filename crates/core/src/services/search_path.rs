//! Executable lookup over a list of directories
//!
//! Provides `PATH`-based executable discovery.

use crate::interfaces::ExecutableLocator;
use std::path::{Path, PathBuf};

/// Default implementation of ExecutableLocator using the process's `PATH`
#[derive(Debug, Clone, Default)]
pub struct SearchPath {
    dirs: Vec<PathBuf>,
}

impl SearchPath {
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }

    /// Directories from the `PATH` environment variable
    pub fn from_env() -> Self {
        let dirs = std::env::var_os("PATH")
            .map(|paths| std::env::split_paths(&paths).collect())
            .unwrap_or_default();
        Self { dirs }
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }
}

impl ExecutableLocator for SearchPath {
    fn locate(&self, name: &str) -> Option<PathBuf> {
        if name.is_empty() {
            return None;
        }

        // Names with a directory part are not searched for
        let path = Path::new(name);
        if path.components().count() > 1 {
            return is_executable(path).then(|| path.to_path_buf());
        }

        self.dirs.iter().find_map(|dir| {
            candidate_names(name)
                .into_iter()
                .map(|candidate| dir.join(candidate))
                .find(|p| is_executable(p))
        })
    }
}

fn candidate_names(name: &str) -> Vec<String> {
    let suffix = std::env::consts::EXE_SUFFIX;
    if suffix.is_empty() || name.ends_with(suffix) {
        vec![name.to_string()]
    } else {
        vec![name.to_string(), format!("{name}{suffix}")]
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
