//! The build/run/debug workflows
//!
//! Each public entry point creates a fresh workflow instance, walks it
//! through `Idle → Building → Running|Debugging → Done`, and turns any error
//! into `Failed` plus one message on the host's messages channel.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::cancel::CancelSignal;
use super::state::{StepResult, WorkflowKind, WorkflowReport, WorkflowRun, WorkflowState};
use crate::{
    command::{CommandBuilder, CommandInvocation},
    config::{EMULATOR_PACKAGE, attributes},
    error::{Error, Result},
    interfaces::{
        DebuggerService, HostUi, LaunchMode, LaunchOptions, MessageKind, MessageSink,
        ProcessHandle, ProcessSink, ProjectConfig, RemoteTarget,
    },
    targets::emulator_name,
};

/// Port used when the project does not set `emulator.debug_port`
pub const DEFAULT_DEBUG_PORT: &str = "1234";

/// Perspective loaded before debugging
pub const DEBUG_PERSPECTIVE: &str = "Debug";

/// Suffix appended to every workflow error message
pub const WORKFLOW_STOPPED: &str = " [workflow stopped]";

/// Everything the engine needs from its host
#[derive(Clone)]
pub struct HostServices {
    pub config: Arc<dyn ProjectConfig>,
    pub processes: Arc<dyn ProcessSink>,
    pub debugger: Arc<dyn DebuggerService>,
    pub messages: Arc<dyn MessageSink>,
    pub ui: Arc<dyn HostUi>,
}

#[derive(Clone)]
pub struct WorkflowEngine {
    host: HostServices,
}

impl WorkflowEngine {
    pub fn new(host: HostServices) -> Self {
        Self { host }
    }

    pub fn host(&self) -> &HostServices {
        &self.host
    }

    /// Swap in a reloaded project configuration. Running workflows keep the
    /// one they started with.
    pub fn set_config(&mut self, config: Arc<dyn ProjectConfig>) {
        self.host.config = config;
    }

    /// Run a workflow of the given kind
    pub async fn execute(
        &self,
        kind: WorkflowKind,
        main: Option<&str>,
        cancel: &CancelSignal,
    ) -> WorkflowReport {
        match kind {
            WorkflowKind::Run { in_console } => self.build_and_run(main, in_console, cancel).await,
            WorkflowKind::Debug => self.build_and_debug(main, cancel).await,
        }
    }

    /// Build `main`, then run it in the emulator
    pub async fn build_and_run(
        &self,
        main: Option<&str>,
        in_console: bool,
        cancel: &CancelSignal,
    ) -> WorkflowReport {
        let mut run = WorkflowRun::new(WorkflowKind::Run { in_console });
        let outcome = self.run_steps(&mut run, main, in_console, cancel).await;
        self.finish(run, outcome)
    }

    /// Build `main`, start it frozen in the emulator and attach the debugger
    pub async fn build_and_debug(&self, main: Option<&str>, cancel: &CancelSignal) -> WorkflowReport {
        let mut run = WorkflowRun::new(WorkflowKind::Debug);
        let outcome = self.debug_steps(&mut run, main, cancel).await;
        self.finish(run, outcome)
    }

    /// Command line for the "Build Main" step
    pub fn build_command(&self, main: &str) -> Result<CommandInvocation> {
        let config = &self.host.config;
        CommandBuilder::new(config.builder_command())
            .with_project(config.root_project())
            .with_scenario_variables(config.scenario_variables())
            .with_args(config.builder_switches())
            .with_arg(main)
            .build()
    }

    /// Command line for the emulator, with `args` after the project switches
    pub fn emulator_command(&self, args: Vec<String>) -> Result<CommandInvocation> {
        let config = &self.host.config;

        let mut switches = config.list_attribute(EMULATOR_PACKAGE, attributes::SWITCHES.name);
        if let Some(board) = config
            .attribute(EMULATOR_PACKAGE, attributes::BOARD.name)
            .filter(|b| !b.is_empty())
        {
            switches.push(format!("--board={board}"));
        }

        CommandBuilder::new(emulator_name(config.target().as_deref()))
            .with_project(config.root_project())
            .with_scenario_variables(config.scenario_variables())
            .with_args(switches)
            .with_args(args)
            .build()
    }

    /// The configured debug port, or [`DEFAULT_DEBUG_PORT`] when unset or empty
    pub fn debug_port(&self) -> String {
        self.host
            .config
            .attribute(EMULATOR_PACKAGE, attributes::DEBUG_PORT.name)
            .filter(|port| !port.is_empty())
            .unwrap_or_else(|| DEFAULT_DEBUG_PORT.to_string())
    }

    async fn run_steps(
        &self,
        run: &mut WorkflowRun,
        main: Option<&str>,
        in_console: bool,
        cancel: &CancelSignal,
    ) -> Result<()> {
        let main = require_main(main)?;

        run.advance(WorkflowState::Building)?;
        self.build(run, main, cancel).await?;

        let binary = self.host.config.executable_path(main);

        run.advance(WorkflowState::Running)?;
        let command = self.announce_emulator(vec![path_arg(&binary)])?;

        if in_console {
            let handle = self
                .launch(run, &command, LaunchMode::Interactive, LaunchOptions::console(), cancel)
                .await?;
            debug!("Emulator console started (pid {:?})", handle.pid());
            // The console stays with the host from here on.
            drop(handle);
        } else {
            self.run_wrapped(run, &command, cancel).await?;
        }

        run.advance(WorkflowState::Done)
    }

    async fn debug_steps(
        &self,
        run: &mut WorkflowRun,
        main: Option<&str>,
        cancel: &CancelSignal,
    ) -> Result<()> {
        let main = require_main(main)?;

        run.advance(WorkflowState::Building)?;
        self.build(run, main, cancel).await?;

        let binary = self.host.config.executable_path(main);

        run.advance(WorkflowState::Debugging)?;
        self.host.ui.load_perspective(DEBUG_PERSPECTIVE);

        let port = self.debug_port();
        let command = self.announce_emulator(vec![
            "--freeze-on-startup".to_string(),
            format!("--gdb={port}"),
            path_arg(&binary),
        ])?;
        // The debugger takes the terminal, so the emulator gets no stdin
        let options = LaunchOptions::console().without_stdin();
        let mut emulator = self
            .launch(run, &command, LaunchMode::Interactive, options, cancel)
            .await?;
        info!("... done.");

        match self.attach_debugger(&binary, port, cancel).await {
            Ok(()) => {
                info!("... done.");
                drop(emulator);
                run.advance(WorkflowState::Done)
            }
            Err(e) => {
                // Nobody will ever resume a frozen emulator
                info!("Stopping the emulator (pid {:?})", emulator.pid());
                emulator.cancel();
                Err(e)
            }
        }
    }

    /// Attach, then hand-shake unless cancelled. The session is released on
    /// every path.
    async fn attach_debugger(&self, binary: &Path, port: String, cancel: &CancelSignal) -> Result<()> {
        cancel.check()?;
        let remote = RemoteTarget::localhost(port);
        let mut session = self
            .host
            .debugger
            .attach(binary, &remote)
            .map_err(|e| Error::DebuggerInitFailed(e.to_string()))?;

        if cancel.is_cancelled() {
            session.release();
            return Err(Error::Cancelled);
        }

        let handshake = tokio::select! {
            result = session.handshake() => Some(result),
            _ = cancel.cancelled() => None,
        };
        session.release();

        match handshake.ok_or(Error::Cancelled)? {
            Ok(true) => Ok(()),
            Ok(false) => Err(Error::DebuggerInitFailed(format!(
                "debugger could not connect to {remote}"
            ))),
            Err(e) => Err(Error::DebuggerInitFailed(e.to_string())),
        }
    }

    async fn build(&self, run: &mut WorkflowRun, main: &str, cancel: &CancelSignal) -> Result<()> {
        info!("Building Main {main}...");

        let command = self.build_command(main)?;
        let mut handle = self
            .launch(run, &command, LaunchMode::Silent, LaunchOptions::tracked(), cancel)
            .await?;

        match await_step(&mut handle, cancel).await? {
            StepResult::Success { exit_code: 0 } => {
                info!("... done.");
                Ok(())
            }
            StepResult::Success { exit_code } => Err(Error::BuildFailed { exit_code }),
            StepResult::Failure { reason } => {
                warn!("Build of {main} ended without an exit status: {reason}");
                Err(Error::BuildFailed { exit_code: -1 })
            }
        }
    }

    /// Build the emulator command and show it on the messages channel
    fn announce_emulator(&self, args: Vec<String>) -> Result<CommandInvocation> {
        let command = self.emulator_command(args)?;
        self.host.messages.write(
            &format!("Running in emulator: {command}\n"),
            MessageKind::Text,
        );
        Ok(command)
    }

    /// "Run GNATemulator" mode: the step completes when the emulator exits
    async fn run_wrapped(
        &self,
        run: &mut WorkflowRun,
        command: &CommandInvocation,
        cancel: &CancelSignal,
    ) -> Result<()> {
        let mut handle = self
            .launch(run, command, LaunchMode::Silent, LaunchOptions::tracked(), cancel)
            .await?;
        match await_step(&mut handle, cancel).await? {
            StepResult::Success { exit_code: 0 } => Ok(()),
            StepResult::Success { exit_code } => {
                warn!("Emulator exited with status {exit_code}");
                Ok(())
            }
            StepResult::Failure { reason } => Err(Error::Other(reason)),
        }
    }

    async fn launch(
        &self,
        run: &mut WorkflowRun,
        command: &CommandInvocation,
        mode: LaunchMode,
        options: LaunchOptions,
        cancel: &CancelSignal,
    ) -> Result<ProcessHandle> {
        cancel.check()?;
        debug!("Launching ({mode:?}): {command}");
        let handle = self.host.processes.start(command, mode, options).await?;
        run.record_launch();
        Ok(handle)
    }

    fn finish(&self, run: WorkflowRun, outcome: Result<()>) -> WorkflowReport {
        match outcome {
            Ok(()) => run.finish(None),
            Err(e) => {
                match &e {
                    Error::DebuggerInitFailed(reason) => warn!("Debugger setup failed: {reason}"),
                    Error::BuildFailed { exit_code } => warn!("Build exited with status {exit_code}"),
                    other => warn!("Workflow failed in {}: {other}", run.state()),
                }
                self.host
                    .messages
                    .write(&format!("{e}{WORKFLOW_STOPPED}"), MessageKind::Error);
                run.finish(Some(e))
            }
        }
    }
}

/// Wait for a step's process, killing it if the workflow is cancelled first
async fn await_step(handle: &mut ProcessHandle, cancel: &CancelSignal) -> Result<StepResult> {
    let finished = tokio::select! {
        result = handle.wait() => Some(result),
        _ = cancel.cancelled() => None,
    };
    match finished {
        Some(result) => Ok(StepResult::from_exit(result)),
        None => {
            handle.cancel();
            Err(Error::Cancelled)
        }
    }
}

fn require_main(main: Option<&str>) -> Result<&str> {
    main.filter(|m| !m.trim().is_empty())
        .ok_or(Error::MissingTarget)
}

fn path_arg(path: &Path) -> String {
    path.display().to_string()
}
