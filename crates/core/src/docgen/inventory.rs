//! Symbol inventory of a documented namespace

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Function,
    Class,
    Exception,
    Module,
    Data,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    /// Base classes, nearest first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bases: Vec<String>,
    /// Methods defined by the class itself
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<String>,
    /// Properties and data attributes defined by the class itself
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleInventory {
    pub module: String,
    #[serde(default)]
    pub symbols: Vec<Symbol>,
}

/// A documented class with its members sorted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassEntry {
    pub name: String,
    pub bases: Vec<String>,
    pub data: Vec<String>,
    pub methods: Vec<String>,
}

impl ClassEntry {
    /// Only classes deriving from something other than plain `object` get
    /// an inheritance diagram
    pub fn has_interesting_bases(&self) -> bool {
        match self.bases.as_slice() {
            [] => false,
            [only] => only != "object",
            _ => true,
        }
    }
}

/// Public symbols of a module, by category, each sorted by name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Categorized {
    pub functions: Vec<String>,
    pub classes: Vec<ClassEntry>,
    pub exceptions: Vec<String>,
}

/// Private names start with `__`; `__init__` is the one exception
pub fn is_documented(name: &str) -> bool {
    !name.starts_with("__") || name == "__init__"
}

fn public_sorted(names: &[String]) -> Vec<String> {
    let mut names: Vec<String> = names.iter().filter(|n| is_documented(n)).cloned().collect();
    names.sort();
    names
}

impl ModuleInventory {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let inventory: ModuleInventory = serde_json::from_str(&contents)?;
        if inventory.module.trim().is_empty() {
            return Err(Error::InvalidArgument(format!(
                "{}: inventory has no module name",
                path.display()
            )));
        }
        Ok(inventory)
    }

    pub fn categorize(&self) -> Categorized {
        let mut out = Categorized::default();

        for symbol in self.symbols.iter().filter(|s| is_documented(&s.name)) {
            match symbol.kind {
                SymbolKind::Function => out.functions.push(symbol.name.clone()),
                SymbolKind::Exception => out.exceptions.push(symbol.name.clone()),
                SymbolKind::Class => out.classes.push(ClassEntry {
                    name: symbol.name.clone(),
                    bases: symbol.bases.clone(),
                    data: public_sorted(&symbol.data),
                    methods: public_sorted(&symbol.methods),
                }),
                SymbolKind::Module | SymbolKind::Data => {
                    tracing::debug!("Skipping {} ({:?})", symbol.name, symbol.kind);
                }
            }
        }

        out.functions.sort();
        out.exceptions.sort();
        out.classes.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }
}
