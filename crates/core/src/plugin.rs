//! Activation scope of the emulator integration
//!
//! Owns the target registry, the availability gate and the workflow engine
//! for as long as the host keeps the integration loaded.

use std::sync::Arc;

use crate::{
    error::{Error, Result},
    interfaces::{ExecutableLocator, ProjectConfig},
    targets::{AvailabilityGate, TargetRegistry, emulator_name},
    workflow::{CancelSignal, HostServices, WorkflowEngine, WorkflowKind, WorkflowReport},
};

pub struct EmulatorPlugin {
    engine: WorkflowEngine,
    registry: TargetRegistry,
    gate: AvailabilityGate,
}

impl EmulatorPlugin {
    pub fn new(host: HostServices, locator: Arc<dyn ExecutableLocator>) -> Self {
        Self {
            engine: WorkflowEngine::new(host),
            registry: TargetRegistry::new(),
            gate: AvailabilityGate::new(locator),
        }
    }

    /// Register the targets and show them if the emulator is installed
    pub fn setup(&self) -> bool {
        self.registry.ensure_registered();
        self.refresh()
    }

    /// The project was reloaded; the target prefix may have changed
    pub fn project_view_changed(&mut self, config: Arc<dyn ProjectConfig>) -> bool {
        self.engine.set_config(config);
        self.setup()
    }

    fn refresh(&self) -> bool {
        let host = self.engine.host();
        self.gate
            .refresh(host.config.as_ref(), &self.registry, host.ui.as_ref())
    }

    pub fn is_available(&self) -> bool {
        self.gate.cached().unwrap_or(false)
    }

    /// Name of the emulator executable for the current project
    pub fn emulator_name(&self) -> String {
        emulator_name(self.engine.host().config.target().as_deref())
    }

    pub fn engine(&self) -> &WorkflowEngine {
        &self.engine
    }

    pub fn registry(&self) -> &TargetRegistry {
        &self.registry
    }

    pub fn gate(&self) -> &AvailabilityGate {
        &self.gate
    }

    /// Run a registered target by id
    pub async fn invoke(
        &self,
        target_id: &str,
        main: Option<&str>,
        cancel: &CancelSignal,
    ) -> Result<WorkflowReport> {
        let target = self
            .registry
            .get(target_id)
            .ok_or_else(|| Error::InvalidArgument(format!("Unknown target '{target_id}'")))?;
        self.run(target.workflow, main, cancel).await
    }

    /// "Run with Emulator": build, then run in an emulator console
    pub async fn build_and_run(&self, main: Option<&str>, cancel: &CancelSignal) -> Result<WorkflowReport> {
        self.run(WorkflowKind::Run { in_console: true }, main, cancel).await
    }

    /// "Debug with Emulator"
    pub async fn debug(&self, main: Option<&str>, cancel: &CancelSignal) -> Result<WorkflowReport> {
        self.run(WorkflowKind::Debug, main, cancel).await
    }

    /// Run a workflow, provided the emulator targets are exposed
    pub async fn run(
        &self,
        kind: WorkflowKind,
        main: Option<&str>,
        cancel: &CancelSignal,
    ) -> Result<WorkflowReport> {
        if !self.is_available() {
            return Err(Error::Other(format!(
                "{} was not found on the search path",
                self.emulator_name()
            )));
        }
        Ok(self.engine.execute(kind, main, cancel).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::targets::{DEBUG_TARGET_ID, RUN_TARGET_ID};
    use crate::testing::{
        RecordingMessages, RecordingUi, ScriptedDebugger, ScriptedHandshake, ScriptedProcessSink,
        StaticLocator,
    };

    fn plugin(config: Config, locator: StaticLocator) -> (EmulatorPlugin, Arc<ScriptedProcessSink>, Arc<RecordingUi>) {
        let processes = Arc::new(ScriptedProcessSink::new());
        let ui = Arc::new(RecordingUi::default());
        let host = HostServices {
            config: Arc::new(config),
            processes: processes.clone(),
            debugger: Arc::new(ScriptedDebugger::new(ScriptedHandshake::Connected)),
            messages: Arc::new(RecordingMessages::default()),
            ui: ui.clone(),
        };
        (EmulatorPlugin::new(host, Arc::new(locator)), processes, ui)
    }

    #[tokio::test]
    async fn test_hidden_targets_cannot_run() {
        let (plugin, processes, ui) = plugin(Config::default(), StaticLocator::default());
        assert!(!plugin.setup());
        assert!(ui.visibility_calls().is_empty());

        let err = plugin
            .invoke(RUN_TARGET_ID, Some("prog.adb"), &CancelSignal::never())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("gnatemu was not found"));
        assert!(processes.launches().is_empty());
    }

    #[tokio::test]
    async fn test_invoke_runs_registered_workflow() {
        let (plugin, processes, _) = plugin(Config::default(), StaticLocator::with(["gnatemu"]));
        assert!(plugin.setup());
        assert_eq!(plugin.registry().is_visible(DEBUG_TARGET_ID), Some(true));

        let report = plugin
            .invoke(RUN_TARGET_ID, Some("prog.adb"), &CancelSignal::never())
            .await
            .unwrap();
        assert!(report.is_success());
        assert_eq!(processes.launches().len(), 2);

        assert!(matches!(
            plugin.invoke("nope", None, &CancelSignal::never()).await,
            Err(Error::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn test_debug_shortcut() {
        let (plugin, processes, ui) = plugin(Config::default(), StaticLocator::with(["gnatemu"]));
        plugin.setup();

        let report = plugin.debug(Some("prog.adb"), &CancelSignal::never()).await.unwrap();
        assert_eq!(report.kind, WorkflowKind::Debug);
        assert!(report.is_success());
        assert_eq!(ui.perspectives(), vec!["Debug"]);
        assert!(processes.launches()[1].argv.contains(&"--gdb=1234".to_string()));
    }

    #[test]
    fn test_project_change_reevaluates_prefix() {
        let (mut plugin, _, ui) = plugin(Config::default(), StaticLocator::with(["gnatemu"]));
        assert!(plugin.setup());

        let cross = Config {
            target: Some("arm-eabi".to_string()),
            ..Default::default()
        };
        assert!(!plugin.project_view_changed(Arc::new(cross)));
        assert_eq!(plugin.emulator_name(), "arm-eabi-gnatemu");
        assert_eq!(ui.visibility_calls().len(), 4);
        assert_eq!(plugin.registry().targets().len(), 2);
    }
}
