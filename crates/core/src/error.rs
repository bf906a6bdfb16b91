use std::io;

/// Errors that can occur during emurunner operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Main not specified")]
    MissingTarget,

    #[error("Build error.")]
    BuildFailed { exit_code: i32 },

    #[error("Could not initialize the debugger.")]
    DebuggerInitFailed(String),

    #[error("Workflow cancelled.")]
    Cancelled,

    #[error("Invalid workflow transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Short, stable name of the error kind, used in reports and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidArgument(_) => "InvalidArgument",
            Error::MissingTarget => "MissingTarget",
            Error::BuildFailed { .. } => "BuildFailed",
            Error::DebuggerInitFailed(_) => "DebuggerInitFailed",
            Error::Cancelled => "Cancelled",
            Error::InvalidTransition { .. } => "InvalidTransition",
            Error::ConfigError(_) => "ConfigError",
            Error::IoError(_) => "IoError",
            Error::SerializationError(_) => "SerializationError",
            Error::Other(_) => "Other",
        }
    }
}

/// Result type alias for emurunner operations
pub type Result<T> = std::result::Result<T, Error>;
