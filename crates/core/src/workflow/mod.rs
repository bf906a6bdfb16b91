//! Sequential build/run/debug workflows

pub mod cancel;
pub mod engine;
pub mod state;

pub use cancel::{CancelSignal, Canceller};
pub use engine::{DEFAULT_DEBUG_PORT, HostServices, WORKFLOW_STOPPED, WorkflowEngine};
pub use state::{StepResult, WorkflowKind, WorkflowReport, WorkflowState};
