//! gdb-based debugger attachment
//!
//! The handshake waits for the emulator's gdb stub to accept connections,
//! then starts `<target>-gdb` on the binary with a `target remote` command.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tracing::{debug, info};

use crate::{
    command::{CommandBuilder, CommandInvocation},
    error::{Error, Result},
    interfaces::{
        DebugSession, DebuggerService, LaunchMode, LaunchOptions, ProcessHandle, ProcessSink,
        RemoteTarget,
    },
};

const DEFAULT_CONNECT_ATTEMPTS: u32 = 50;
const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(100);

pub struct GdbDebugger {
    gdb: String,
    processes: Arc<dyn ProcessSink>,
    connect_attempts: u32,
    retry_delay: Duration,
}

impl GdbDebugger {
    pub fn new(gdb: impl Into<String>, processes: Arc<dyn ProcessSink>) -> Self {
        Self {
            gdb: gdb.into(),
            processes,
            connect_attempts: DEFAULT_CONNECT_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    /// `<target>-gdb`, or plain `gdb` for native projects
    pub fn for_target(target: Option<&str>, processes: Arc<dyn ProcessSink>) -> Self {
        let gdb = match target.filter(|t| !t.is_empty()) {
            Some(prefix) => format!("{prefix}-gdb"),
            None => "gdb".to_string(),
        };
        Self::new(gdb, processes)
    }

    pub fn with_retry(mut self, attempts: u32, delay: Duration) -> Self {
        self.connect_attempts = attempts.max(1);
        self.retry_delay = delay;
        self
    }

    pub fn program(&self) -> &str {
        &self.gdb
    }

    /// The gdb command line used for `binary` and `remote`
    pub fn command_for(&self, binary: &Path, remote: &RemoteTarget) -> Result<CommandInvocation> {
        CommandBuilder::new(self.gdb.as_str())
            .with_arg(binary.display().to_string())
            .with_args([
                "-ex".to_string(),
                format!("target {} {}", remote.protocol, remote.endpoint()),
            ])
            .build()
    }
}

impl DebuggerService for GdbDebugger {
    fn attach(&self, binary: &Path, remote: &RemoteTarget) -> Result<Box<dyn DebugSession>> {
        if binary.as_os_str().is_empty() {
            return Err(Error::InvalidArgument("no binary to debug".to_string()));
        }
        let port: u16 = remote.port.parse().map_err(|_| {
            Error::InvalidArgument(format!("invalid debug port '{}'", remote.port))
        })?;

        Ok(Box::new(GdbSession {
            command: self.command_for(binary, remote)?,
            host: remote.host.clone(),
            port,
            processes: self.processes.clone(),
            connect_attempts: self.connect_attempts,
            retry_delay: self.retry_delay,
            process: None,
        }))
    }
}

struct GdbSession {
    command: CommandInvocation,
    host: String,
    port: u16,
    processes: Arc<dyn ProcessSink>,
    connect_attempts: u32,
    retry_delay: Duration,
    process: Option<ProcessHandle>,
}

impl GdbSession {
    /// Polls the stub with plain TCP connects. This assumes the stub accepts
    /// a fresh client after one disconnects, as gnatemu's does; a stub that
    /// serves a single session would be used up by this check.
    async fn endpoint_ready(&self) -> bool {
        for attempt in 1..=self.connect_attempts {
            match TcpStream::connect((self.host.as_str(), self.port)).await {
                Ok(_) => {
                    debug!("gdb stub on {}:{} is up", self.host, self.port);
                    return true;
                }
                Err(e) => {
                    debug!(
                        "Waiting for {}:{} (attempt {attempt}): {e}",
                        self.host, self.port
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
            }
        }
        false
    }
}

#[async_trait]
impl DebugSession for GdbSession {
    async fn handshake(&mut self) -> Result<bool> {
        if !self.endpoint_ready().await {
            return Ok(false);
        }

        info!("Starting debugger: {}", self.command);
        let handle = self
            .processes
            .start(&self.command, LaunchMode::Interactive, LaunchOptions::console())
            .await?;
        self.process = Some(handle);
        Ok(true)
    }

    fn release(self: Box<Self>) {
        match self.process {
            // gdb keeps running under the job manager
            Some(handle) => debug!("Debugger session released (pid {:?})", handle.pid()),
            None => debug!("Debugger session released before connecting"),
        }
    }
}
