//! Read-only view of the loaded project

use std::collections::BTreeMap;
use std::path::PathBuf;

/// Default builder used for the "Build Main" step
pub const DEFAULT_BUILDER: &str = "gprbuild";

/// Trait for reading the project configuration
pub trait ProjectConfig: Send + Sync {
    /// Active cross target prefix (e.g. `arm-eabi`), if any
    fn target(&self) -> Option<String>;

    /// Project-scoped string attribute such as `emulator.debug_port`
    fn attribute(&self, package: &str, attribute: &str) -> Option<String>;

    /// List-valued project attribute such as `emulator.switches`
    fn list_attribute(&self, _package: &str, _attribute: &str) -> Vec<String> {
        Vec::new()
    }

    /// Scenario variables, name to value
    fn scenario_variables(&self) -> BTreeMap<String, String>;

    /// Path of the root project file
    fn root_project(&self) -> Option<PathBuf>;

    /// Where the builder puts the executable for `main`
    fn executable_path(&self, main: &str) -> PathBuf;

    /// Builder program for the build step
    fn builder_command(&self) -> String {
        DEFAULT_BUILDER.to_string()
    }

    /// Extra switches given to the builder before the main file
    fn builder_switches(&self) -> Vec<String> {
        Vec::new()
    }
}
