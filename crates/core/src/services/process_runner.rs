//! tokio-backed process sink with a small job manager
//!
//! Interactive processes inherit the terminal. Silent processes have their
//! output forwarded line by line to the build log. Tracked processes are
//! kept in the job list so the host can wait for them before it exits.

use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::{
    command::CommandInvocation,
    error::Result,
    interfaces::{
        LaunchMode, LaunchOptions, MessageKind, MessageSink, ProcessCompletion, ProcessHandle,
        ProcessSink,
    },
};

/// A process recorded in the job manager
#[derive(Debug)]
struct Job {
    label: String,
    task: JoinHandle<Option<i32>>,
}

/// Final state of a tracked job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOutcome {
    pub label: String,
    /// `None` when no exit status could be read
    pub exit_code: Option<i32>,
}

pub struct TokioProcessSink {
    jobs: Mutex<Vec<Job>>,
    build_log: Option<Arc<dyn MessageSink>>,
    // Flipped by `cancel_jobs`; every tracked job watches it
    shutdown: watch::Sender<bool>,
}

impl Default for TokioProcessSink {
    fn default() -> Self {
        Self {
            jobs: Mutex::default(),
            build_log: None,
            shutdown: watch::channel(false).0,
        }
    }
}

impl TokioProcessSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Send silent-mode output to `sink` in addition to the trace log
    pub fn with_build_log(mut self, sink: Arc<dyn MessageSink>) -> Self {
        self.build_log = Some(sink);
        self
    }

    pub fn job_count(&self) -> usize {
        self.jobs.lock().len()
    }

    /// Wait for every tracked job to finish, oldest first
    pub async fn wait_for_jobs(&self) -> Vec<JobOutcome> {
        let mut outcomes = Vec::new();
        loop {
            // Jobs may be added while we wait (e.g. the debugger)
            let jobs = std::mem::take(&mut *self.jobs.lock());
            if jobs.is_empty() {
                break;
            }
            for job in jobs {
                let exit_code = match job.task.await {
                    Ok(code) => code,
                    Err(e) => {
                        warn!("Job monitor for {} failed: {e}", job.label);
                        None
                    }
                };
                outcomes.push(JobOutcome {
                    label: job.label,
                    exit_code,
                });
            }
        }
        outcomes
    }

    /// Kill every tracked job that is still running, detached ones
    /// included, and collect their outcomes
    pub async fn cancel_jobs(&self) -> Vec<JobOutcome> {
        if self.job_count() > 0 {
            info!("Stopping {} tracked job(s)", self.job_count());
        }
        self.shutdown.send_replace(true);
        self.wait_for_jobs().await
    }
}

#[async_trait]
impl ProcessSink for TokioProcessSink {
    async fn start(
        &self,
        command: &CommandInvocation,
        mode: LaunchMode,
        options: LaunchOptions,
    ) -> Result<ProcessHandle> {
        let mut cmd = Command::new(command.program());
        cmd.args(command.arguments());

        if let Some(dir) = command.working_dir() {
            cmd.current_dir(dir);
        }
        for (key, value) in command.env_vars() {
            debug!("Setting env: {}={}", key, value);
            cmd.env(key, value);
        }

        match mode {
            LaunchMode::Interactive => {
                let stdin = if options.attach_stdin {
                    Stdio::inherit()
                } else {
                    Stdio::null()
                };
                cmd.stdin(stdin)
                    .stdout(Stdio::inherit())
                    .stderr(Stdio::inherit());
            }
            LaunchMode::Silent => {
                cmd.stdin(Stdio::null())
                    .stdout(Stdio::piped())
                    .stderr(Stdio::piped());
            }
        }

        let mut child = cmd.spawn()?;
        let label = command.to_shell_command();
        let pid = child.id();
        debug!("Started {label} (pid {pid:?})");

        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(forward_lines(stdout, self.build_log.clone(), MessageKind::Text));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(forward_lines(stderr, self.build_log.clone(), MessageKind::Error));
        }

        let (handle, mut completion) = ProcessHandle::channel(pid);
        let task_label = label.clone();
        let keep_open = options.keep_open_after_exit;
        let mut shutdown = options
            .track_in_job_manager
            .then(|| self.shutdown.subscribe());

        let task = tokio::spawn(async move {
            let status = tokio::select! {
                status = child.wait() => status,
                _ = kill_requested(&mut completion, shutdown.as_mut()) => {
                    info!("Killing {task_label}");
                    if let Err(e) = child.kill().await {
                        warn!("Failed to kill {task_label}: {e}");
                    }
                    child.wait().await
                }
            };

            let result: Result<i32> = status.map(|s| s.code().unwrap_or(-1)).map_err(Into::into);
            let exit_code = result.as_ref().ok().copied();

            if keep_open {
                info!("{task_label} exited with status {exit_code:?}");
            }
            if !completion.complete(result) {
                debug!("Detached process {task_label} exited with status {exit_code:?}");
            }
            exit_code
        });

        if options.track_in_job_manager {
            self.jobs.lock().push(Job { label, task });
        }

        Ok(handle)
    }
}

/// Either the handle asked for a kill or the sink is shutting its jobs down
async fn kill_requested(
    completion: &mut ProcessCompletion,
    shutdown: Option<&mut watch::Receiver<bool>>,
) {
    let Some(shutdown) = shutdown else {
        return completion.cancelled().await;
    };
    tokio::select! {
        _ = completion.cancelled() => {}
        stopped = async { shutdown.wait_for(|stop| *stop).await.is_ok() } => {
            if !stopped {
                // Sink gone without shutting down
                completion.cancelled().await;
            }
        }
    }
}

async fn forward_lines<R>(reader: R, sink: Option<Arc<dyn MessageSink>>, kind: MessageKind)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        debug!(target: "emurunner::build_log", "{line}");
        if let Some(sink) = &sink {
            sink.write(&format!("{line}\n"), kind);
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::command::CommandBuilder;
    use crate::testing::RecordingMessages;
    use std::time::Duration;

    fn sh(script: &str) -> CommandInvocation {
        CommandBuilder::new("sh")
            .with_args(["-c", script])
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_silent_reports_exit_code_and_output() {
        let log = Arc::new(RecordingMessages::default());
        let sink = TokioProcessSink::new().with_build_log(log.clone());

        let mut handle = sink
            .start(&sh("echo compiling; exit 3"), LaunchMode::Silent, LaunchOptions::default())
            .await
            .unwrap();
        assert_eq!(handle.wait().await.unwrap(), 3);

        // output forwarding runs on its own task
        for _ in 0..50 {
            if !log.messages().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(log.messages()[0].0, "compiling\n");
        assert_eq!(sink.job_count(), 0);
    }

    #[tokio::test]
    async fn test_env_and_working_dir_are_applied() {
        let dir = tempfile::TempDir::new().unwrap();
        let log = Arc::new(RecordingMessages::default());
        let sink = TokioProcessSink::new().with_build_log(log.clone());

        let command = sh("echo \"$BOARD\" && pwd")
            .with_env("BOARD", "stm32f4")
            .with_working_dir(dir.path());
        let mut handle = sink
            .start(&command, LaunchMode::Silent, LaunchOptions::default())
            .await
            .unwrap();
        assert_eq!(handle.wait().await.unwrap(), 0);

        for _ in 0..50 {
            if log.messages().len() >= 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        let lines: Vec<String> = log.messages().into_iter().map(|(m, _)| m).collect();
        assert_eq!(lines[0], "stm32f4\n");
        assert!(lines[1].trim_end().ends_with(dir.path().file_name().unwrap().to_str().unwrap()));
    }

    #[tokio::test]
    async fn test_cancel_kills_process() {
        let sink = TokioProcessSink::new();
        let mut handle = sink
            .start(&sh("sleep 30"), LaunchMode::Silent, LaunchOptions::default())
            .await
            .unwrap();

        handle.cancel();
        let code = tokio::time::timeout(Duration::from_secs(5), handle.wait())
            .await
            .unwrap()
            .unwrap();
        assert_ne!(code, 0);
    }

    #[tokio::test]
    async fn test_tracked_jobs_are_awaited() {
        let sink = TokioProcessSink::new();
        let handle = sink
            .start(&sh("exit 0"), LaunchMode::Silent, LaunchOptions::console())
            .await
            .unwrap();
        drop(handle);

        assert_eq!(sink.job_count(), 1);
        let outcomes = sink.wait_for_jobs().await;
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].exit_code, Some(0));
        assert_eq!(sink.job_count(), 0);
    }

    #[tokio::test]
    async fn test_cancel_jobs_kills_detached_processes() {
        let sink = TokioProcessSink::new();
        let handle = sink
            .start(&sh("sleep 30"), LaunchMode::Interactive, LaunchOptions::console().without_stdin())
            .await
            .unwrap();
        drop(handle);
        // Untracked processes are left alone
        let mut untracked = sink
            .start(&sh("exit 5"), LaunchMode::Silent, LaunchOptions::default())
            .await
            .unwrap();

        let outcomes = tokio::time::timeout(Duration::from_secs(5), sink.cancel_jobs())
            .await
            .unwrap();
        assert_eq!(outcomes.len(), 1);
        assert_ne!(outcomes[0].exit_code, Some(0));
        assert_eq!(sink.job_count(), 0);
        assert_eq!(untracked.wait().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_spawn_failure_is_io_error() {
        let sink = TokioProcessSink::new();
        let command = CommandBuilder::new("/nonexistent/emurunner-tool").build().unwrap();
        let err = sink
            .start(&command, LaunchMode::Silent, LaunchOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, crate::Error::IoError(_)));
    }
}
