//! Registry of the emulator targets exposed to the host

use parking_lot::Mutex;
use serde::Serialize;

use crate::interfaces::HostUi;
use crate::workflow::WorkflowKind;

pub const RUN_TARGET_ID: &str = "run-with-emulator";
pub const DEBUG_TARGET_ID: &str = "debug-with-emulator";

/// A named, invocable operation registered with the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetDescriptor {
    pub name: &'static str,
    pub id: &'static str,
    pub workflow: WorkflowKind,
    pub icon: &'static str,
    pub parent_menu: String,
}

impl TargetDescriptor {
    fn new(name: &'static str, id: &'static str, workflow: WorkflowKind, icon: &'static str) -> Self {
        Self {
            name,
            id,
            workflow,
            icon,
            parent_menu: format!("/Build/Emulator/{name}/"),
        }
    }
}

/// The two emulator targets, in menu order
pub fn default_targets() -> Vec<TargetDescriptor> {
    vec![
        TargetDescriptor::new(
            "Run with Emulator",
            RUN_TARGET_ID,
            WorkflowKind::Run { in_console: true },
            "gps-emulatorloading-run-symbolic",
        ),
        TargetDescriptor::new(
            "Debug with Emulator",
            DEBUG_TARGET_ID,
            WorkflowKind::Debug,
            "gps-emulatorloading-debug-symbolic",
        ),
    ]
}

#[derive(Debug, Clone)]
struct Entry {
    descriptor: TargetDescriptor,
    visible: bool,
}

/// Targets registered for one plugin activation, with their visibility.
///
/// Targets start hidden; only the availability gate shows them.
#[derive(Debug, Default)]
pub struct TargetRegistry {
    entries: Mutex<Vec<Entry>>,
}

impl TargetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the default targets unless already registered.
    /// Returns how many were added by this call.
    pub fn ensure_registered(&self) -> usize {
        let mut entries = self.entries.lock();
        let mut added = 0;
        for descriptor in default_targets() {
            if entries.iter().any(|e| e.descriptor.id == descriptor.id) {
                continue;
            }
            tracing::debug!("Registering target {}", descriptor.id);
            entries.push(Entry {
                descriptor,
                visible: false,
            });
            added += 1;
        }
        added
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn get(&self, id: &str) -> Option<TargetDescriptor> {
        self.entries
            .lock()
            .iter()
            .find(|e| e.descriptor.id == id)
            .map(|e| e.descriptor.clone())
    }

    pub fn is_visible(&self, id: &str) -> Option<bool> {
        self.entries
            .lock()
            .iter()
            .find(|e| e.descriptor.id == id)
            .map(|e| e.visible)
    }

    /// Snapshot of all targets and their visibility
    pub fn targets(&self) -> Vec<(TargetDescriptor, bool)> {
        self.entries
            .lock()
            .iter()
            .map(|e| (e.descriptor.clone(), e.visible))
            .collect()
    }

    /// Show or hide every target. The host is only told about targets whose
    /// visibility actually changes; returns how many did.
    pub fn set_all_visible(&self, visible: bool, ui: &dyn HostUi) -> usize {
        let mut entries = self.entries.lock();
        let mut changed = 0;
        for entry in entries.iter_mut().filter(|e| e.visible != visible) {
            entry.visible = visible;
            ui.set_target_visible(entry.descriptor.id, visible);
            changed += 1;
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingUi;

    #[test]
    fn test_ensure_registered_is_idempotent() {
        let registry = TargetRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.ensure_registered(), 2);
        assert_eq!(registry.ensure_registered(), 0);
        assert_eq!(registry.targets().len(), 2);

        let run = registry.get(RUN_TARGET_ID).unwrap();
        assert_eq!(run.name, "Run with Emulator");
        assert_eq!(run.parent_menu, "/Build/Emulator/Run with Emulator/");
        assert_eq!(run.icon, "gps-emulatorloading-run-symbolic");
        assert_eq!(
            registry.get(DEBUG_TARGET_ID).unwrap().icon,
            "gps-emulatorloading-debug-symbolic"
        );
        assert_eq!(registry.is_visible(DEBUG_TARGET_ID), Some(false));
    }

    #[test]
    fn test_visibility_changes_only_when_needed() {
        let registry = TargetRegistry::new();
        registry.ensure_registered();
        let ui = RecordingUi::default();

        assert_eq!(registry.set_all_visible(false, &ui), 0);
        assert_eq!(registry.set_all_visible(true, &ui), 2);
        assert_eq!(registry.set_all_visible(true, &ui), 0);

        assert_eq!(
            ui.visibility_calls(),
            vec![
                (RUN_TARGET_ID.to_string(), true),
                (DEBUG_TARGET_ID.to_string(), true),
            ]
        );
    }
}
