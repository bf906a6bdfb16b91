//! Debugger attachment interface

use std::fmt;
use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;

/// Remote endpoint a debugger connects to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTarget {
    pub host: String,
    pub port: String,
    /// Remote protocol identifier, e.g. `remote` or `extended-remote`
    pub protocol: String,
}

impl RemoteTarget {
    pub fn localhost(port: impl Into<String>) -> Self {
        Self {
            host: "localhost".to_string(),
            port: port.into(),
            protocol: "remote".to_string(),
        }
    }

    /// `host:port`
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Display for RemoteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.protocol, self.endpoint())
    }
}

/// An attached (or attaching) debugger, exclusively owned by one workflow
#[async_trait]
pub trait DebugSession: Send {
    /// Wait until the debugger has connected to the remote target.
    /// `Ok(false)` means the debugger came up but could not connect.
    async fn handshake(&mut self) -> Result<bool>;

    /// Give the session back to the host. Called exactly once, whether or
    /// not the handshake ran.
    fn release(self: Box<Self>);
}

/// Trait for hosts that can attach a debugger to a remote target
pub trait DebuggerService: Send + Sync {
    /// Construct an attachment for `binary`. Errors here mean the debugger
    /// could not even be set up.
    fn attach(&self, binary: &Path, remote: &RemoteTarget) -> Result<Box<dyn DebugSession>>;
}
