//! Executable discovery interface

use std::path::PathBuf;

/// Finds executables on the host's search path
pub trait ExecutableLocator: Send + Sync {
    /// Resolve `name` to a full path, or `None` when it is not installed.
    /// Never fails.
    fn locate(&self, name: &str) -> Option<PathBuf>;
}
