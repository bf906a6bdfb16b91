use crate::{
    error::{Error, Result},
    interfaces::ProjectConfig,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::attributes::declared_attribute;

/// File names searched for, in order, in each directory
pub const CONFIG_FILE_NAMES: [&str; 2] = [".emurunner.json", "emurunner.json"];

/// Settings for the "Build Main" step
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct BuildConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub switches: Vec<String>,
}

/// Project configuration as stored in `.emurunner.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Cross target prefix, e.g. `arm-eabi`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    /// Root project file (`.gpr`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub scenario_variables: BTreeMap<String, String>,

    /// Package name to attribute name to value
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, BTreeMap<String, serde_json::Value>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub build: Option<BuildConfig>,

    /// Directory holding the built executables
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exec_dir: Option<PathBuf>,

    // Directory relative paths are resolved against (not stored in JSON)
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl Config {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = serde_json::from_str(&contents)
            .map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        config.validate()?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn find_config_file(start_path: &Path) -> Option<PathBuf> {
        let mut current = start_path;

        loop {
            for name in CONFIG_FILE_NAMES {
                let config_path = current.join(name);
                if config_path.is_file() {
                    return Some(config_path);
                }
            }

            current = current.parent()?;
        }
    }

    /// Load the nearest config above `start_path`, or an empty config rooted
    /// at `start_path` when there is none.
    pub fn discover(start_path: &Path) -> Result<Self> {
        match Self::find_config_file(start_path) {
            Some(path) => Self::load_from_file(&path),
            None => {
                tracing::debug!("No config found from {}, using defaults", start_path.display());
                Ok(Config {
                    base_dir: Some(start_path.to_path_buf()),
                    ..Default::default()
                })
            }
        }
    }

    /// Check attribute values against their declared shapes
    pub fn validate(&self) -> Result<()> {
        for (package, attributes) in &self.attributes {
            for (name, value) in attributes {
                let Some(decl) = declared_attribute(package, name) else {
                    tracing::warn!("Unknown project attribute {package}.{name}");
                    continue;
                };
                let ok = if decl.list {
                    value
                        .as_array()
                        .is_some_and(|items| items.iter().all(|v| v.is_string()))
                } else {
                    value.is_string()
                };
                if !ok {
                    return Err(Error::ConfigError(format!(
                        "Attribute {package}.{name} must be {}",
                        if decl.list { "a list of strings" } else { "a string" }
                    )));
                }
            }
        }

        if let Some(target) = &self.target {
            if target.trim() != target || target.contains(char::is_whitespace) {
                return Err(Error::ConfigError(format!(
                    "Invalid target prefix '{target}'"
                )));
            }
        }

        Ok(())
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            return path.to_path_buf();
        }
        match &self.base_dir {
            Some(base) => base.join(path),
            None => path.to_path_buf(),
        }
    }

    fn find_attribute(&self, package: &str, attribute: &str) -> Option<&serde_json::Value> {
        self.attributes
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(package))
            .and_then(|(_, attributes)| {
                attributes
                    .iter()
                    .find(|(name, _)| name.eq_ignore_ascii_case(attribute))
                    .map(|(_, value)| value)
            })
    }

    /// List-valued attribute such as `emulator.switches`
    pub fn list_attribute(&self, package: &str, attribute: &str) -> Vec<String> {
        self.find_attribute(package, attribute)
            .and_then(|v| v.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl ProjectConfig for Config {
    fn target(&self) -> Option<String> {
        self.target.clone().filter(|t| !t.is_empty())
    }

    fn attribute(&self, package: &str, attribute: &str) -> Option<String> {
        self.find_attribute(package, attribute)
            .and_then(|v| v.as_str())
            .map(str::to_string)
    }

    fn list_attribute(&self, package: &str, attribute: &str) -> Vec<String> {
        Config::list_attribute(self, package, attribute)
    }

    fn scenario_variables(&self) -> BTreeMap<String, String> {
        self.scenario_variables.clone()
    }

    fn root_project(&self) -> Option<PathBuf> {
        self.project.as_deref().map(|p| self.resolve(p))
    }

    fn executable_path(&self, main: &str) -> PathBuf {
        let stem = Path::new(main)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| main.to_string());
        let file_name = format!("{stem}{}", std::env::consts::EXE_SUFFIX);

        let dir = if let Some(exec_dir) = &self.exec_dir {
            self.resolve(exec_dir)
        } else if let Some(project_dir) = self
            .root_project()
            .and_then(|p| p.parent().map(Path::to_path_buf))
        {
            project_dir
        } else {
            self.base_dir.clone().unwrap_or_else(|| PathBuf::from("."))
        };

        dir.join(file_name)
    }

    fn builder_command(&self) -> String {
        self.build
            .as_ref()
            .and_then(|b| b.command.clone())
            .unwrap_or_else(|| crate::interfaces::project::DEFAULT_BUILDER.to_string())
    }

    fn builder_switches(&self) -> Vec<String> {
        self.build
            .as_ref()
            .map(|b| b.switches.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> Config {
        serde_json::from_value(serde_json::json!({
            "target": "arm-eabi",
            "project": "demo.gpr",
            "scenario_variables": { "MODE": "debug" },
            "attributes": {
                "Emulator": {
                    "Debug_Port": "5555",
                    "switches": ["--serial=stdio"]
                }
            },
            "build": { "command": "gprbuild", "switches": ["-d"] },
            "exec_dir": "obj"
        }))
        .unwrap()
    }

    #[test]
    fn test_attribute_lookup_is_case_insensitive() {
        let config = sample();
        assert_eq!(
            config.attribute("emulator", "debug_port"),
            Some("5555".to_string())
        );
        assert_eq!(config.attribute("EMULATOR", "Board"), None);
        assert_eq!(config.list_attribute("emulator", "Switches"), vec!["--serial=stdio"]);
    }

    #[test]
    fn test_paths_resolve_against_base_dir() {
        let mut config = sample();
        config.base_dir = Some(PathBuf::from("/work"));

        assert_eq!(config.root_project(), Some(PathBuf::from("/work/demo.gpr")));
        assert_eq!(
            config.executable_path("src/prog.adb"),
            PathBuf::from(format!("/work/obj/prog{}", std::env::consts::EXE_SUFFIX))
        );
    }

    #[test]
    fn test_executable_defaults_to_project_dir() {
        let config = Config {
            project: Some(PathBuf::from("/work/demo.gpr")),
            ..Default::default()
        };
        assert_eq!(
            config.executable_path("prog.adb"),
            PathBuf::from(format!("/work/prog{}", std::env::consts::EXE_SUFFIX))
        );
    }

    #[test]
    fn test_builder_defaults() {
        let config = Config::default();
        assert_eq!(config.builder_command(), "gprbuild");
        assert!(config.builder_switches().is_empty());
        assert_eq!(config.target(), None);
    }

    #[test]
    fn test_wrong_attribute_shape_is_rejected() {
        let config: Config = serde_json::from_value(serde_json::json!({
            "attributes": { "emulator": { "debug_port": 1234 } }
        }))
        .unwrap();

        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }

    #[test]
    fn test_find_and_load_walks_up() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("src").join("deep");
        std::fs::create_dir_all(&nested).unwrap();

        let config = sample();
        config
            .save_to_file(&temp_dir.path().join(".emurunner.json"))
            .unwrap();

        let found = Config::find_config_file(&nested).unwrap();
        assert_eq!(found, temp_dir.path().join(".emurunner.json"));

        let loaded = Config::discover(&nested).unwrap();
        assert_eq!(loaded.target.as_deref(), Some("arm-eabi"));
        assert_eq!(loaded.base_dir.as_deref(), Some(temp_dir.path()));
    }

    #[test]
    fn test_discover_without_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::discover(temp_dir.path()).unwrap();
        assert_eq!(config.base_dir.as_deref(), Some(temp_dir.path()));
        assert!(config.project.is_none());
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".emurunner.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            Config::load_from_file(&path),
            Err(Error::ConfigError(_))
        ));
    }
}
