//! Service implementations for running on a real system
//!
//! Concrete implementations of the host interface traits: `PATH` lookup,
//! tokio processes, gdb attachment and a terminal console.

pub mod console;
pub mod gdb;
pub mod process_runner;
pub mod search_path;

pub use console::{ConsoleMessages, LoggingUi};
pub use gdb::GdbDebugger;
pub use process_runner::{JobOutcome, TokioProcessSink};
pub use search_path::SearchPath;
