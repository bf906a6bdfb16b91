//! Configuration management for emurunner

pub mod attributes;
mod settings;

// Re-export main types
pub use attributes::{AttributeDecl, EMULATOR_PACKAGE, PROJECT_ATTRIBUTES, declared_attribute};
pub use settings::{BuildConfig, CONFIG_FILE_NAMES, Config};
