use anyhow::{Context, Result};
use emurunner_core::TargetDescriptor;
use serde::Serialize;

use crate::session::Session;

#[derive(Serialize)]
struct TargetRow {
    #[serde(flatten)]
    descriptor: TargetDescriptor,
    visible: bool,
}

pub fn targets_command(json: bool) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let session = Session::open(&cwd, false)?;

    let rows: Vec<TargetRow> = session
        .plugin()
        .registry()
        .targets()
        .into_iter()
        .map(|(descriptor, visible)| TargetRow {
            descriptor,
            visible,
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!("🎯 Targets for {}:", session.plugin().emulator_name());
    for row in &rows {
        let status = if row.visible { "enabled" } else { "disabled" };
        println!("   • {} ({}) - {status}", row.descriptor.name, row.descriptor.id);
        println!("     menu: {}", row.descriptor.parent_menu);
    }
    Ok(())
}
