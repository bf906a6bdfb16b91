use anyhow::{Context, Result};
use emurunner_core::Config;
use emurunner_core::config::{CONFIG_FILE_NAMES, EMULATOR_PACKAGE, attributes};
use emurunner_core::workflow::DEFAULT_DEBUG_PORT;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::{env, fs};
use tracing::{debug, info};

pub fn init_command(cwd: Option<&str>, force: bool) -> Result<()> {
    // Determine the project root
    let project_root = if let Some(cwd) = cwd {
        PathBuf::from(cwd)
    } else {
        env::current_dir().context("Failed to get current directory")?
    };

    let project_root = project_root
        .canonicalize()
        .context("Failed to canonicalize project root")?;

    let config_path = project_root.join(CONFIG_FILE_NAMES[0]);
    if config_path.exists() && !force {
        println!("❌ Config already exists at: {}", config_path.display());
        println!("   Use --force to overwrite");
        return Ok(());
    }

    println!("🚀 Initializing emurunner in: {}", project_root.display());

    let config = default_config(&project_root)?;
    config
        .save_to_file(&config_path)
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;
    info!("Created config: {}", config_path.display());

    println!("✅ Created config: {}", config_path.display());
    match &config.project {
        Some(project) => println!("   • project: {}", project.display()),
        None => println!("   • no .gpr file found, set \"project\" by hand"),
    }
    println!("\n📌 Set \"target\" to your cross prefix (e.g. \"arm-eabi\") to use <target>-gnatemu");

    Ok(())
}

fn default_config(project_root: &Path) -> Result<Config> {
    let mut emulator = BTreeMap::new();
    emulator.insert(
        attributes::DEBUG_PORT.name.to_string(),
        serde_json::Value::String(DEFAULT_DEBUG_PORT.to_string()),
    );

    let mut attributes = BTreeMap::new();
    attributes.insert(EMULATOR_PACKAGE.to_string(), emulator);

    Ok(Config {
        project: find_project_file(project_root)?,
        attributes,
        ..Default::default()
    })
}

/// The only `.gpr` file at the root, if there is exactly one
fn find_project_file(project_root: &Path) -> Result<Option<PathBuf>> {
    let mut projects = Vec::new();
    for entry in fs::read_dir(project_root)
        .with_context(|| format!("Failed to read {}", project_root.display()))?
    {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "gpr") {
            projects.push(path);
        }
    }

    if projects.len() != 1 {
        debug!("Found {} project files, not picking one", projects.len());
        return Ok(None);
    }
    Ok(projects
        .pop()
        .and_then(|p| p.file_name().map(PathBuf::from)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_single_project_file_is_picked() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("demo.gpr"), "project Demo is end Demo;").unwrap();

        let config = default_config(temp_dir.path()).unwrap();
        assert_eq!(config.project, Some(PathBuf::from("demo.gpr")));
        assert_eq!(
            config.attributes["emulator"]["debug_port"],
            serde_json::json!("1234")
        );
    }

    #[test]
    fn test_ambiguous_project_files_are_left_unset() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.gpr"), "").unwrap();
        fs::write(temp_dir.path().join("b.gpr"), "").unwrap();

        assert_eq!(find_project_file(temp_dir.path()).unwrap(), None);
    }
}
