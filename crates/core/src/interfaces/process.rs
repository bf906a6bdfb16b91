//! Process execution interface
//!
//! A [`ProcessSink`] starts a [`CommandInvocation`] and hands back a
//! [`ProcessHandle`]. The sink keeps the matching [`ProcessCompletion`] and
//! reports the exit code through it once the process terminates.

use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::command::CommandInvocation;
use crate::error::{Error, Result};

/// How a process is presented to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchMode {
    /// Output streamed live to a console
    Interactive,
    /// Tracked like a build job, reported by exit code only
    Silent,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LaunchOptions {
    /// Leave the console open after the process exits
    pub keep_open_after_exit: bool,
    /// Record the process in the host's job manager
    pub track_in_job_manager: bool,
    /// Interactive processes only: read from the terminal. Without it stdin
    /// is closed, leaving the terminal to another process.
    pub attach_stdin: bool,
}

impl LaunchOptions {
    /// Options for an emulator console: kept open, tracked, owns the terminal
    pub fn console() -> Self {
        Self {
            keep_open_after_exit: true,
            track_in_job_manager: true,
            attach_stdin: true,
        }
    }

    /// A job tracked by the host that is not shown in a console
    pub fn tracked() -> Self {
        Self {
            track_in_job_manager: true,
            ..Default::default()
        }
    }

    pub fn without_stdin(mut self) -> Self {
        self.attach_stdin = false;
        self
    }
}

/// Trait for hosts that can start external processes
#[async_trait]
pub trait ProcessSink: Send + Sync {
    /// Start `command`. Resolves once the process is running; use
    /// [`ProcessHandle::wait`] for its exit code.
    async fn start(
        &self,
        command: &CommandInvocation,
        mode: LaunchMode,
        options: LaunchOptions,
    ) -> Result<ProcessHandle>;
}

/// The caller's side of a started process.
///
/// Dropping the handle detaches the process: it keeps running and the sink
/// still records its exit.
#[derive(Debug)]
pub struct ProcessHandle {
    pid: Option<u32>,
    exit: Option<oneshot::Receiver<Result<i32>>>,
    kill: Option<oneshot::Sender<()>>,
}

/// The sink's side of a started process
#[derive(Debug)]
pub struct ProcessCompletion {
    exit: oneshot::Sender<Result<i32>>,
    kill: Option<oneshot::Receiver<()>>,
}

impl ProcessHandle {
    /// Create a connected handle/completion pair
    pub fn channel(pid: Option<u32>) -> (ProcessHandle, ProcessCompletion) {
        let (exit_tx, exit_rx) = oneshot::channel();
        let (kill_tx, kill_rx) = oneshot::channel();
        (
            ProcessHandle {
                pid,
                exit: Some(exit_rx),
                kill: Some(kill_tx),
            },
            ProcessCompletion {
                exit: exit_tx,
                kill: Some(kill_rx),
            },
        )
    }

    /// A handle for a process that has already exited with `code`
    pub fn exited(code: i32) -> ProcessHandle {
        let (handle, completion) = Self::channel(None);
        completion.complete(Ok(code));
        handle
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Wait for the process to exit and return its exit code.
    pub async fn wait(&mut self) -> Result<i32> {
        let exit = self
            .exit
            .as_mut()
            .ok_or_else(|| Error::Other("process exit already observed".to_string()))?;

        let result = match exit.await {
            Ok(result) => result,
            Err(_) => Err(Error::Other(
                "process monitor ended without an exit status".to_string(),
            )),
        };
        self.exit = None;
        result
    }

    /// Ask the sink to kill the process. No-op if already requested.
    pub fn cancel(&mut self) {
        if let Some(kill) = self.kill.take() {
            let _ = kill.send(());
        }
    }
}

impl ProcessCompletion {
    /// Report the terminal result. Returns `false` if nobody is listening
    /// any more (the handle was dropped).
    pub fn complete(self, result: Result<i32>) -> bool {
        self.exit.send(result).is_ok()
    }

    /// Resolves when the handle asks for the process to be killed.
    /// Never resolves once the handle has been dropped.
    pub async fn cancelled(&mut self) {
        if let Some(kill) = self.kill.as_mut() {
            if kill.await.is_ok() {
                self.kill = None;
                return;
            }
            self.kill = None;
        }
        std::future::pending::<()>().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_exited_handle_reports_code_once() {
        let mut handle = ProcessHandle::exited(3);
        assert_eq!(handle.wait().await.unwrap(), 3);
        assert!(handle.wait().await.is_err());
    }

    #[tokio::test]
    async fn test_cancel_reaches_completion() {
        let (mut handle, mut completion) = ProcessHandle::channel(Some(42));
        assert_eq!(handle.pid(), Some(42));

        handle.cancel();
        completion.cancelled().await;
        assert!(completion.complete(Ok(-1)));
        assert_eq!(handle.wait().await.unwrap(), -1);
    }

    #[tokio::test]
    async fn test_dropped_handle_detaches() {
        let (handle, mut completion) = ProcessHandle::channel(None);
        drop(handle);

        let cancelled = tokio::time::timeout(
            std::time::Duration::from_millis(20),
            completion.cancelled(),
        )
        .await;
        assert!(cancelled.is_err(), "a detached process must not be killed");
        assert!(!completion.complete(Ok(0)));
    }
}
