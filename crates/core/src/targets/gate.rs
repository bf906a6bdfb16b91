//! Availability gate: the targets only exist when the emulator is installed

use std::sync::Arc;

use parking_lot::Mutex;

use super::registry::TargetRegistry;
use crate::interfaces::{ExecutableLocator, HostUi, ProjectConfig};

/// Base name of the emulator executable
pub const EMULATOR_BASENAME: &str = "gnatemu";

/// `<target>-gnatemu`, or plain `gnatemu` without a target prefix
pub fn emulator_name(target: Option<&str>) -> String {
    match target.filter(|t| !t.is_empty()) {
        Some(prefix) => format!("{prefix}-{EMULATOR_BASENAME}"),
        None => EMULATOR_BASENAME.to_string(),
    }
}

pub struct AvailabilityGate {
    locator: Arc<dyn ExecutableLocator>,
    available: Mutex<Option<bool>>,
}

impl AvailabilityGate {
    pub fn new(locator: Arc<dyn ExecutableLocator>) -> Self {
        Self {
            locator,
            available: Mutex::new(None),
        }
    }

    /// Whether the emulator for the configured target is on the search path
    pub fn check(&self, config: &dyn ProjectConfig) -> bool {
        let name = emulator_name(config.target().as_deref());
        match self.locator.locate(&name) {
            Some(path) => {
                tracing::debug!("Found {name} at {}", path.display());
                true
            }
            None => {
                tracing::debug!("{name} not found on the search path");
                false
            }
        }
    }

    /// Recompute availability and bring target visibility in line with it.
    /// Safe to call on every project change: nothing is toggled unless the
    /// answer differs from the targets' current visibility.
    pub fn refresh(&self, config: &dyn ProjectConfig, registry: &TargetRegistry, ui: &dyn HostUi) -> bool {
        let mut cached = self.available.lock();
        let available = self.check(config);
        if *cached != Some(available) {
            tracing::info!(
                "Emulator targets {}",
                if available { "enabled" } else { "disabled" }
            );
        }
        *cached = Some(available);
        registry.set_all_visible(available, ui);
        available
    }

    /// Result of the last refresh, if any
    pub fn cached(&self) -> Option<bool> {
        *self.available.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::testing::{RecordingUi, StaticLocator};

    #[test]
    fn test_emulator_name() {
        assert_eq!(emulator_name(Some("arm-eabi")), "arm-eabi-gnatemu");
        assert_eq!(emulator_name(None), "gnatemu");
        assert_eq!(emulator_name(Some("")), "gnatemu");
    }

    #[test]
    fn test_check_uses_target_prefix() {
        let gate = AvailabilityGate::new(Arc::new(StaticLocator::with(["arm-eabi-gnatemu"])));
        let mut config = Config::default();
        assert!(!gate.check(&config));

        config.target = Some("arm-eabi".to_string());
        assert!(gate.check(&config));
    }

    #[test]
    fn test_refresh_toggles_visibility_once() {
        let locator = Arc::new(StaticLocator::with(["gnatemu"]));
        let gate = AvailabilityGate::new(locator.clone());
        let registry = TargetRegistry::new();
        registry.ensure_registered();
        let ui = RecordingUi::default();
        let config = Config::default();

        assert_eq!(gate.cached(), None);
        assert!(gate.refresh(&config, &registry, &ui));
        assert!(gate.refresh(&config, &registry, &ui));
        assert_eq!(ui.visibility_calls().len(), 2);

        locator.remove("gnatemu");
        assert!(!gate.refresh(&config, &registry, &ui));
        assert_eq!(gate.cached(), Some(false));
        assert_eq!(ui.visibility_calls().len(), 4);
        assert!(ui.visibility_calls()[2..].iter().all(|(_, v)| !v));
    }
}
