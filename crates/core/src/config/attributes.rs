//! Project attributes understood by the emulator integration

/// Package holding the emulator attributes
pub const EMULATOR_PACKAGE: &str = "emulator";

/// Declaration of one project attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeDecl {
    pub package: &'static str,
    pub name: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    /// List of strings rather than a single string
    pub list: bool,
}

pub const DEBUG_PORT: AttributeDecl = AttributeDecl {
    package: EMULATOR_PACKAGE,
    name: "debug_port",
    label: "Debug port",
    description: "Port used by GNATemulator to debug.",
    list: false,
};

pub const BOARD: AttributeDecl = AttributeDecl {
    package: EMULATOR_PACKAGE,
    name: "board",
    label: "Board",
    description: "If GNATemulator provides multiple emulations for the target platform, \
                  use this option to select a specific board. Use `gnatemu --help` to get \
                  the list of boards.",
    list: false,
};

pub const SWITCHES: AttributeDecl = AttributeDecl {
    package: EMULATOR_PACKAGE,
    name: "switches",
    label: "Switches",
    description: "A list of switches processed before the command line switches",
    list: true,
};

pub static PROJECT_ATTRIBUTES: [AttributeDecl; 3] = [DEBUG_PORT, BOARD, SWITCHES];

/// Look up a declaration, ignoring case
pub fn declared_attribute(package: &str, name: &str) -> Option<&'static AttributeDecl> {
    PROJECT_ATTRIBUTES
        .iter()
        .find(|d| d.package.eq_ignore_ascii_case(package) && d.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_attribute_ignores_case() {
        assert_eq!(declared_attribute("Emulator", "Debug_Port"), Some(&DEBUG_PORT));
        assert!(declared_attribute("emulator", "switches").unwrap().list);
        assert!(declared_attribute("builder", "switches").is_none());
    }
}
