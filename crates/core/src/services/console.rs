//! Terminal implementations of the user-facing host surfaces

use std::io::Write;

use tracing::{debug, info};

use crate::interfaces::{HostUi, MessageKind, MessageSink};

/// Messages console on the process's stdout/stderr
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleMessages;

impl MessageSink for ConsoleMessages {
    fn write(&self, message: &str, kind: MessageKind) {
        // A closed pipe is not worth failing a workflow over
        match kind {
            MessageKind::Text => {
                let mut out = std::io::stdout().lock();
                let _ = out.write_all(message.as_bytes());
                let _ = out.flush();
            }
            MessageKind::Error => {
                let mut err = std::io::stderr().lock();
                let _ = err.write_all(message.as_bytes());
                if !message.ends_with('\n') {
                    let _ = err.write_all(b"\n");
                }
            }
        }
    }
}

/// A host without a graphical UI: requests are only logged
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingUi;

impl HostUi for LoggingUi {
    fn load_perspective(&self, name: &str) {
        info!("Switching to the {name} perspective");
    }

    fn set_target_visible(&self, target_id: &str, visible: bool) {
        debug!(
            "Target {target_id} is now {}",
            if visible { "visible" } else { "hidden" }
        );
    }
}
