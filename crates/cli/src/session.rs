//! Wiring of the core services for one terminal session
//!
//! A real session spawns processes with tokio and attaches `<target>-gdb`.
//! A dry-run session records the commands instead and pretends every step
//! succeeds.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use emurunner_core::{
    CancelSignal, Canceller, Config, EmulatorPlugin, HostServices, WorkflowKind, WorkflowReport,
    interfaces::{ExecutableLocator, ProjectConfig},
    services::{ConsoleMessages, GdbDebugger, JobOutcome, LoggingUi, SearchPath, TokioProcessSink},
    testing::{LaunchRecord, ScriptedDebugger, ScriptedHandshake, ScriptedProcessSink},
};
use tracing::{debug, warn};

enum Processes {
    System(Arc<TokioProcessSink>),
    DryRun(Arc<ScriptedProcessSink>),
}

pub struct Session {
    config: Arc<Config>,
    locator: Arc<SearchPath>,
    plugin: EmulatorPlugin,
    processes: Processes,
}

impl Session {
    /// Load the project configuration above `cwd` and register the targets
    pub fn open(cwd: &Path, dry_run: bool) -> Result<Self> {
        let config = Arc::new(
            Config::discover(cwd)
                .with_context(|| format!("Failed to load configuration from {}", cwd.display()))?,
        );
        let locator = Arc::new(SearchPath::from_env());
        let messages = Arc::new(ConsoleMessages);

        let (host, processes) = if dry_run {
            let processes = Arc::new(ScriptedProcessSink::new());
            let host = HostServices {
                config: config.clone(),
                processes: processes.clone(),
                debugger: Arc::new(ScriptedDebugger::new(ScriptedHandshake::Connected)),
                messages,
                ui: Arc::new(LoggingUi),
            };
            (host, Processes::DryRun(processes))
        } else {
            let processes = Arc::new(TokioProcessSink::new().with_build_log(messages.clone()));
            let debugger = GdbDebugger::for_target(config.target().as_deref(), processes.clone());
            debug!("Using debugger {}", debugger.program());
            let host = HostServices {
                config: config.clone(),
                processes: processes.clone(),
                debugger: Arc::new(debugger),
                messages,
                ui: Arc::new(LoggingUi),
            };
            (host, Processes::System(processes))
        };

        let plugin = EmulatorPlugin::new(host, locator.clone());
        plugin.setup();

        Ok(Self {
            config,
            locator,
            plugin,
            processes,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn plugin(&self) -> &EmulatorPlugin {
        &self.plugin
    }

    pub fn is_dry_run(&self) -> bool {
        matches!(self.processes, Processes::DryRun(_))
    }

    pub fn search_path(&self) -> &SearchPath {
        &self.locator
    }

    /// Where the emulator was found, if anywhere
    pub fn emulator_path(&self) -> Option<std::path::PathBuf> {
        self.locator.locate(&self.plugin.emulator_name())
    }

    /// Run one workflow. Ctrl-C cancels it.
    pub async fn execute(&self, kind: WorkflowKind, main: &str) -> Result<WorkflowReport> {
        let canceller = Canceller::new();
        let signal = canceller.signal();
        let interrupt = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, stopping the workflow");
                canceller.cancel();
            }
        });

        let report = self.dispatch(kind, main, &signal).await;
        interrupt.abort();
        report
    }

    async fn dispatch(
        &self,
        kind: WorkflowKind,
        main: &str,
        signal: &CancelSignal,
    ) -> Result<WorkflowReport> {
        if self.is_dry_run() {
            if !self.plugin.is_available() {
                warn!(
                    "{} is not on the search path; showing commands anyway",
                    self.plugin.emulator_name()
                );
            }
            return Ok(self.plugin.engine().execute(kind, Some(main), signal).await);
        }
        Ok(self.plugin.run(kind, Some(main), signal).await?)
    }

    /// Commands a dry run would have started
    pub fn recorded_launches(&self) -> Vec<LaunchRecord> {
        match &self.processes {
            Processes::DryRun(processes) => processes.launches(),
            Processes::System(_) => Vec::new(),
        }
    }

    /// Wait for the emulator consoles and debugger sessions still running
    pub async fn wait_for_jobs(&self) -> Vec<JobOutcome> {
        match &self.processes {
            Processes::System(processes) => processes.wait_for_jobs().await,
            Processes::DryRun(_) => Vec::new(),
        }
    }

    /// Kill whatever a failed workflow left running
    pub async fn cancel_jobs(&self) -> Vec<JobOutcome> {
        match &self.processes {
            Processes::System(processes) => processes.cancel_jobs().await,
            Processes::DryRun(_) => Vec::new(),
        }
    }
}
