//! In-memory host services
//!
//! Scripted stand-ins for every host interface. They record what the engine
//! asked for instead of touching the system, which makes them suitable for
//! tests and for dry runs.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::{
    command::CommandInvocation,
    error::{Error, Result},
    interfaces::{
        DebugSession, DebuggerService, ExecutableLocator, HostUi, LaunchMode, LaunchOptions,
        MessageKind, MessageSink, ProcessHandle, ProcessSink, RemoteTarget,
    },
};

/// Locator backed by a fixed set of names
#[derive(Debug, Default)]
pub struct StaticLocator {
    names: Mutex<BTreeSet<String>>,
}

impl StaticLocator {
    pub fn with<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: Mutex::new(names.into_iter().map(Into::into).collect()),
        }
    }

    pub fn insert(&self, name: impl Into<String>) {
        self.names.lock().insert(name.into());
    }

    pub fn remove(&self, name: &str) {
        self.names.lock().remove(name);
    }
}

impl ExecutableLocator for StaticLocator {
    fn locate(&self, name: &str) -> Option<PathBuf> {
        self.names
            .lock()
            .contains(name)
            .then(|| PathBuf::from("/usr/bin").join(name))
    }
}

#[derive(Debug, Default)]
pub struct RecordingUi {
    perspectives: Mutex<Vec<String>>,
    visibility: Mutex<Vec<(String, bool)>>,
}

impl RecordingUi {
    pub fn perspectives(&self) -> Vec<String> {
        self.perspectives.lock().clone()
    }

    pub fn visibility_calls(&self) -> Vec<(String, bool)> {
        self.visibility.lock().clone()
    }
}

impl HostUi for RecordingUi {
    fn load_perspective(&self, name: &str) {
        self.perspectives.lock().push(name.to_string());
    }

    fn set_target_visible(&self, target_id: &str, visible: bool) {
        self.visibility.lock().push((target_id.to_string(), visible));
    }
}

#[derive(Debug, Default)]
pub struct RecordingMessages {
    messages: Mutex<Vec<(String, MessageKind)>>,
}

impl RecordingMessages {
    pub fn messages(&self) -> Vec<(String, MessageKind)> {
        self.messages.lock().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.messages
            .lock()
            .iter()
            .filter(|(_, kind)| *kind == MessageKind::Error)
            .map(|(m, _)| m.clone())
            .collect()
    }
}

impl MessageSink for RecordingMessages {
    fn write(&self, message: &str, kind: MessageKind) {
        self.messages.lock().push((message.to_string(), kind));
    }
}

/// How a scripted process ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptedExit {
    Code(i32),
    /// Runs until killed
    Pending,
}

/// One call to [`ProcessSink::start`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRecord {
    pub argv: Vec<String>,
    pub mode: LaunchMode,
    pub options: LaunchOptions,
}

impl LaunchRecord {
    pub fn program(&self) -> &str {
        &self.argv[0]
    }
}

/// Process sink that never spawns anything. Programs exit with 0 unless
/// scripted otherwise.
#[derive(Debug, Default)]
pub struct ScriptedProcessSink {
    exits: Mutex<HashMap<String, ScriptedExit>>,
    launches: Mutex<Vec<LaunchRecord>>,
    killed: Arc<Mutex<Vec<String>>>,
    refuse: Mutex<BTreeSet<String>>,
}

impl ScriptedProcessSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exit_with(self, program: impl Into<String>, exit: ScriptedExit) -> Self {
        self.exits.lock().insert(program.into(), exit);
        self
    }

    /// Make `start` fail for `program`, as if it could not be spawned
    pub fn refuse(self, program: impl Into<String>) -> Self {
        self.refuse.lock().insert(program.into());
        self
    }

    pub fn launches(&self) -> Vec<LaunchRecord> {
        self.launches.lock().clone()
    }

    /// Programs whose handle asked for a kill
    pub fn killed(&self) -> Vec<String> {
        self.killed.lock().clone()
    }
}

#[async_trait]
impl ProcessSink for ScriptedProcessSink {
    async fn start(
        &self,
        command: &CommandInvocation,
        mode: LaunchMode,
        options: LaunchOptions,
    ) -> Result<ProcessHandle> {
        let program = command.program().to_string();
        if self.refuse.lock().contains(&program) {
            return Err(Error::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{program}: not found"),
            )));
        }

        self.launches.lock().push(LaunchRecord {
            argv: command.argv().to_vec(),
            mode,
            options,
        });

        let exit = self
            .exits
            .lock()
            .get(&program)
            .copied()
            .unwrap_or(ScriptedExit::Code(0));

        match exit {
            ScriptedExit::Code(code) => Ok(ProcessHandle::exited(code)),
            ScriptedExit::Pending => {
                let (handle, mut completion) = ProcessHandle::channel(None);
                let killed = self.killed.clone();
                tokio::spawn(async move {
                    completion.cancelled().await;
                    killed.lock().push(program);
                    completion.complete(Ok(-9));
                });
                Ok(handle)
            }
        }
    }
}

/// How the scripted debugger behaves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptedHandshake {
    Connected,
    Refused,
    Error,
    /// Never completes
    Pending,
    /// `attach` itself fails
    AttachFails,
}

/// Counters shared between the debugger and its sessions
#[derive(Debug, Default, Clone)]
pub struct DebuggerLog {
    pub attaches: Vec<(PathBuf, RemoteTarget)>,
    pub handshakes: usize,
    pub releases: usize,
}

#[derive(Debug)]
pub struct ScriptedDebugger {
    behaviour: ScriptedHandshake,
    log: Arc<Mutex<DebuggerLog>>,
}

impl ScriptedDebugger {
    pub fn new(behaviour: ScriptedHandshake) -> Self {
        Self {
            behaviour,
            log: Arc::default(),
        }
    }

    pub fn log(&self) -> DebuggerLog {
        self.log.lock().clone()
    }
}

impl DebuggerService for ScriptedDebugger {
    fn attach(&self, binary: &Path, remote: &RemoteTarget) -> Result<Box<dyn DebugSession>> {
        self.log
            .lock()
            .attaches
            .push((binary.to_path_buf(), remote.clone()));

        if self.behaviour == ScriptedHandshake::AttachFails {
            return Err(Error::Other("debugger executable not found".to_string()));
        }

        Ok(Box::new(ScriptedSession {
            behaviour: self.behaviour,
            log: self.log.clone(),
        }))
    }
}

struct ScriptedSession {
    behaviour: ScriptedHandshake,
    log: Arc<Mutex<DebuggerLog>>,
}

#[async_trait]
impl DebugSession for ScriptedSession {
    async fn handshake(&mut self) -> Result<bool> {
        self.log.lock().handshakes += 1;
        match self.behaviour {
            ScriptedHandshake::Connected => Ok(true),
            ScriptedHandshake::Refused => Ok(false),
            ScriptedHandshake::Error | ScriptedHandshake::AttachFails => {
                Err(Error::Other("remote target closed the connection".to_string()))
            }
            ScriptedHandshake::Pending => {
                std::future::pending::<()>().await;
                Ok(false)
            }
        }
    }

    fn release(self: Box<Self>) {
        self.log.lock().releases += 1;
    }
}
