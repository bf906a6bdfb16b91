//! User-facing host surfaces: the messages console and UI toggles

/// Kind of a message written to the host console
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Text,
    Error,
}

/// The user-visible "Messages" console. Fire and forget.
pub trait MessageSink: Send + Sync {
    fn write(&self, message: &str, kind: MessageKind);
}

/// Declarative UI operations the core may ask of the host
pub trait HostUi: Send + Sync {
    /// Switch to a named perspective (e.g. "Debug")
    fn load_perspective(&self, name: &str);

    /// Show or hide a registered target
    fn set_target_visible(&self, target_id: &str, visible: bool);
}
