//! emurunner - build, run and debug cross-compiled programs in an emulator
//!
//! This crate provides:
//! - The build/run/debug workflows, driven against abstract host services
//! - Project configuration with the `emulator` attribute package
//! - The emulator targets and the search-path gate that exposes them
//! - tokio-backed process, search path and gdb services for standalone hosts
//! - reST page generation from a symbol inventory
pub mod command;
pub mod config;
pub mod docgen;
pub mod error;
pub mod interfaces;
pub mod plugin;
pub mod services;
pub mod targets;
pub mod testing;
pub mod workflow;

// Re-export commonly used types and traits
pub use error::{Error, Result};

pub use command::{CommandBuilder, CommandInvocation};
pub use config::Config;
pub use plugin::EmulatorPlugin;
pub use targets::{TargetDescriptor, TargetRegistry};
pub use workflow::{
    CancelSignal, Canceller, HostServices, WorkflowEngine, WorkflowKind, WorkflowReport,
    WorkflowState,
};
