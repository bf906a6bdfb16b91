//! reStructuredText output for Sphinx autodoc

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use super::inventory::{ClassEntry, ModuleInventory};
use crate::error::Result;

/// Render the whole `.rst` page for `inventory`
pub fn render_rest(inventory: &ModuleInventory) -> String {
    let module = inventory.module.as_str();
    let symbols = inventory.categorize();
    let mut out = String::new();

    let _ = write!(
        out,
        ":mod:`{module}`\n===================================\n\n.. automodule:: {module}\n\n"
    );

    if !symbols.functions.is_empty() {
        out.push_str("\nFunctions\n---------\n\n");
        for name in &symbols.functions {
            let _ = writeln!(out, ".. autofunction:: {name}");
        }
    }

    if !symbols.classes.is_empty() {
        out.push_str("\nClasses\n-------\n\n");
        for class in &symbols.classes {
            let inheritance = if class.has_interesting_bases() {
                format!(".. inheritance-diagram:: {module}.{}", class.name)
            } else {
                String::new()
            };
            class_stub(&mut out, module, &class.name, &inheritance);
            members(&mut out, module, class);
        }
    }

    if !symbols.exceptions.is_empty() {
        out.push_str("\nExceptions\n----------\n\n");
        for name in &symbols.exceptions {
            let inheritance = format!(".. inheritance-diagram:: {module}.{name}");
            class_stub(&mut out, module, name, &inheritance);
        }
    }

    out
}

fn class_stub(out: &mut String, module: &str, name: &str, inheritance: &str) {
    // Underline covers ":class:`module.name`"
    let underline = "^".repeat(name.len() + module.len() + 10);
    let _ = write!(
        out,
        "\n:class:`{module}.{name}`\n{underline}\n\n.. autoclass:: {name}\n\n   {inheritance}\n"
    );
}

fn members(out: &mut String, module: &str, class: &ClassEntry) {
    for data in &class.data {
        let _ = write!(
            out,
            "\n\n   .. autoattribute:: {module}.{}.{data}\n\n",
            class.name
        );
    }
    for method in &class.methods {
        let _ = write!(out, "\n   .. automethod:: {module}.{}.{method}\n", class.name);
    }
}

/// Write `<out_dir>/<module>.rst`, creating the directory if needed
pub fn write_rest(inventory: &ModuleInventory, out_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(out_dir)?;
    let path = out_dir.join(format!("{}.rst", inventory.module));
    std::fs::write(&path, render_rest(inventory))?;
    tracing::info!("Generated {}", path.display());
    Ok(path)
}
