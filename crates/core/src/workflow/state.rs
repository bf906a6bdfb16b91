//! Workflow states, kinds and per-step results

use std::fmt;

use serde::Serialize;

use crate::error::{Error, Result};

/// Which workflow a target runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum WorkflowKind {
    /// Build, then run in the emulator. `in_console` selects a live console
    /// over the wrapped "Run GNATemulator" target.
    Run { in_console: bool },
    /// Build, start the emulator frozen, then attach the debugger
    Debug,
}

impl WorkflowKind {
    pub fn name(&self) -> &'static str {
        match self {
            WorkflowKind::Run { .. } => "build-and-run",
            WorkflowKind::Debug => "build-and-debug",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    Idle,
    Building,
    Running,
    Debugging,
    Done,
    Failed,
}

impl WorkflowState {
    pub fn is_terminal(self) -> bool {
        matches!(self, WorkflowState::Done | WorkflowState::Failed)
    }

    pub fn can_transition_to(self, next: WorkflowState) -> bool {
        use WorkflowState::*;

        match (self, next) {
            (Idle, Building) => true,
            (Building, Running | Debugging) => true,
            (Running | Debugging, Done) => true,
            (from, Failed) => !from.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkflowState::Idle => "Idle",
            WorkflowState::Building => "Building",
            WorkflowState::Running => "Running",
            WorkflowState::Debugging => "Debugging",
            WorkflowState::Done => "Done",
            WorkflowState::Failed => "Failed",
        };
        f.write_str(name)
    }
}

/// Outcome of one process-backed step, consumed by the step that follows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepResult {
    /// The process ran to completion; the code may still be non-zero
    Success { exit_code: i32 },
    /// No exit status could be obtained
    Failure { reason: String },
}

impl StepResult {
    pub fn from_exit(result: Result<i32>) -> Self {
        match result {
            Ok(exit_code) => StepResult::Success { exit_code },
            Err(e) => StepResult::Failure {
                reason: e.to_string(),
            },
        }
    }
}

/// Bookkeeping for one workflow instance
#[derive(Debug)]
pub(crate) struct WorkflowRun {
    kind: WorkflowKind,
    state: WorkflowState,
    history: Vec<WorkflowState>,
    launches: usize,
}

impl WorkflowRun {
    pub(crate) fn new(kind: WorkflowKind) -> Self {
        Self {
            kind,
            state: WorkflowState::Idle,
            history: vec![WorkflowState::Idle],
            launches: 0,
        }
    }

    pub(crate) fn state(&self) -> WorkflowState {
        self.state
    }

    pub(crate) fn advance(&mut self, next: WorkflowState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(Error::InvalidTransition {
                from: self.state.to_string(),
                to: next.to_string(),
            });
        }
        tracing::debug!("{}: {} -> {}", self.kind.name(), self.state, next);
        self.state = next;
        self.history.push(next);
        Ok(())
    }

    pub(crate) fn record_launch(&mut self) {
        self.launches += 1;
    }

    pub(crate) fn finish(mut self, error: Option<Error>) -> WorkflowReport {
        if error.is_some() && !self.state.is_terminal() {
            self.state = WorkflowState::Failed;
            self.history.push(WorkflowState::Failed);
        }
        WorkflowReport {
            kind: self.kind,
            state: self.state,
            history: self.history,
            launches: self.launches,
            error,
        }
    }
}

/// Final account of a workflow instance
#[derive(Debug)]
pub struct WorkflowReport {
    pub kind: WorkflowKind,
    pub state: WorkflowState,
    /// Every state visited, starting with `Idle`
    pub history: Vec<WorkflowState>,
    /// Number of external processes started
    pub launches: usize,
    pub error: Option<Error>,
}

impl WorkflowReport {
    pub fn is_success(&self) -> bool {
        self.state == WorkflowState::Done
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions() {
        use WorkflowState::*;

        assert!(Idle.can_transition_to(Building));
        assert!(Idle.can_transition_to(Failed));
        assert!(Building.can_transition_to(Running));
        assert!(Building.can_transition_to(Debugging));
        assert!(Debugging.can_transition_to(Done));

        assert!(!Idle.can_transition_to(Running));
        assert!(!Building.can_transition_to(Done));
        assert!(!Done.can_transition_to(Failed));
        assert!(!Failed.can_transition_to(Building));
    }

    #[test]
    fn test_run_rejects_skipping_build() {
        let mut run = WorkflowRun::new(WorkflowKind::Debug);
        let err = run.advance(WorkflowState::Debugging).unwrap_err();
        assert!(matches!(err, Error::InvalidTransition { .. }));
        assert_eq!(run.state(), WorkflowState::Idle);
    }

    #[test]
    fn test_finish_with_error_marks_failed() {
        let mut run = WorkflowRun::new(WorkflowKind::Run { in_console: true });
        run.advance(WorkflowState::Building).unwrap();
        let report = run.finish(Some(Error::BuildFailed { exit_code: 2 }));

        assert_eq!(report.state, WorkflowState::Failed);
        assert_eq!(
            report.history,
            vec![WorkflowState::Idle, WorkflowState::Building, WorkflowState::Failed]
        );
        assert!(!report.is_success());
    }

    #[test]
    fn test_step_result_from_exit() {
        assert_eq!(
            StepResult::from_exit(Ok(1)),
            StepResult::Success { exit_code: 1 }
        );
        assert!(matches!(
            StepResult::from_exit(Err(Error::Other("gone".into()))),
            StepResult::Failure { .. }
        ));
    }
}
