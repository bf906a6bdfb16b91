use std::path::Path;

use anyhow::{Context, Result};
use emurunner_core::docgen::{ModuleInventory, write_rest};

pub fn docgen_command(inventory_path: &Path, out_dir: &Path) -> Result<()> {
    let inventory = ModuleInventory::load_from_file(inventory_path)
        .with_context(|| format!("Failed to read inventory {}", inventory_path.display()))?;

    let path = write_rest(&inventory, out_dir)
        .with_context(|| format!("Failed to write into {}", out_dir.display()))?;

    println!("✅ Generated {}", path.display());
    Ok(())
}
