//! Host service interfaces
//!
//! The workflow engine never reaches for ambient state: every service it
//! needs from the surrounding host (IDE, CLI, tests) is one of these traits
//! and is handed to it explicitly.

pub mod debugger;
pub mod host;
pub mod locator;
pub mod process;
pub mod project;

pub use debugger::{DebugSession, DebuggerService, RemoteTarget};
pub use host::{HostUi, MessageKind, MessageSink};
pub use locator::ExecutableLocator;
pub use process::{LaunchMode, LaunchOptions, ProcessCompletion, ProcessHandle, ProcessSink};
pub use project::ProjectConfig;
