use anyhow::{Context, Result};
use emurunner_core::Config;
use emurunner_core::config::PROJECT_ATTRIBUTES;
use emurunner_core::interfaces::ProjectConfig;

use crate::session::Session;

pub fn check_command() -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let session = Session::open(&cwd, false)?;
    let name = session.plugin().emulator_name();

    match Config::find_config_file(&cwd) {
        Some(path) => println!("📄 Config: {}", path.display()),
        None => println!("📄 Config: none (using defaults)"),
    }
    print_attributes(session.config());

    match session.emulator_path() {
        Some(path) => {
            println!("✅ {name} found at {}", path.display());
            println!("   Emulator targets enabled");
            Ok(())
        }
        None => {
            println!(
                "❌ {name} not found on the search path ({} directories searched)",
                session.search_path().dirs().len()
            );
            println!("   Emulator targets disabled");
            std::process::exit(1);
        }
    }
}

fn print_attributes(config: &Config) {
    println!("⚙️  Project attributes:");
    for decl in &PROJECT_ATTRIBUTES {
        let value = if decl.list {
            let items = config.list_attribute(decl.package, decl.name);
            (!items.is_empty()).then(|| items.join(" "))
        } else {
            config.attribute(decl.package, decl.name)
        };
        println!(
            "   • {} ({}.{}): {}",
            decl.label,
            decl.package,
            decl.name,
            value.as_deref().unwrap_or("<unset>")
        );
        println!("     {}", decl.description);
    }
}
