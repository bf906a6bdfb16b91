//! Reference documentation pages from a symbol inventory

pub mod inventory;
pub mod rest;

pub use inventory::{Categorized, ClassEntry, ModuleInventory, Symbol, SymbolKind};
pub use rest::{render_rest, write_rest};

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn inventory() -> ModuleInventory {
        serde_json::from_value(serde_json::json!({
            "module": "GPS",
            "symbols": [
                { "name": "exit", "kind": "function" },
                { "name": "__private", "kind": "function" },
                { "name": "add_hook", "kind": "function" },
                { "name": "os", "kind": "module" },
                {
                    "name": "File",
                    "kind": "class",
                    "bases": ["object"],
                    "methods": ["path", "__init__", "__repr__", "directory"],
                    "data": ["name"]
                },
                { "name": "Console", "kind": "class", "bases": ["GUI", "object"] },
                { "name": "Missing_Arguments", "kind": "exception" },
                { "name": "Invalid_Argument", "kind": "exception" }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_categories_are_sorted_and_filtered() {
        let symbols = inventory().categorize();

        assert_eq!(symbols.functions, vec!["add_hook", "exit"]);
        assert_eq!(symbols.exceptions, vec!["Invalid_Argument", "Missing_Arguments"]);

        let names: Vec<_> = symbols.classes.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Console", "File"]);

        let file = &symbols.classes[1];
        assert_eq!(file.methods, vec!["__init__", "directory", "path"]);
        assert!(!file.has_interesting_bases());
        assert!(symbols.classes[0].has_interesting_bases());
    }

    #[test]
    fn test_render_rest() {
        let out = render_rest(&inventory());

        assert!(out.starts_with(":mod:`GPS`\n"));
        assert!(out.contains(".. automodule:: GPS\n"));

        let add_hook = out.find(".. autofunction:: add_hook").unwrap();
        let exit = out.find(".. autofunction:: exit").unwrap();
        assert!(add_hook < exit);
        assert!(!out.contains("__private"));

        assert!(out.contains(":class:`GPS.File`\n^^^^^^^^^^^^^^^^^^^^^^^\n"));
        assert!(out.contains(".. inheritance-diagram:: GPS.Console"));
        assert!(!out.contains(".. inheritance-diagram:: GPS.File"));
        assert!(out.contains("   .. autoattribute:: GPS.File.name"));
        assert!(out.contains("   .. automethod:: GPS.File.__init__"));
        assert!(!out.contains("__repr__"));
        assert!(out.contains(".. inheritance-diagram:: GPS.Invalid_Argument"));
    }

    #[test]
    fn test_empty_module_has_only_header() {
        let inventory = ModuleInventory {
            module: "Empty".to_string(),
            symbols: vec![],
        };
        let out = render_rest(&inventory);
        assert!(!out.contains("Functions"));
        assert!(!out.contains("Classes"));
        assert!(!out.contains("Exceptions"));
    }

    #[test]
    fn test_write_rest_creates_file() {
        let temp_dir = TempDir::new().unwrap();
        let out_dir = temp_dir.path().join("generated");

        let path = write_rest(&inventory(), &out_dir).unwrap();
        assert_eq!(path, out_dir.join("GPS.rst"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), render_rest(&inventory()));
    }
}
