//! Promptforge Sandbox - supervised execution of generated scripts.
//!
//! Runs a script file as a separate OS process, captures both output streams
//! in full, and enforces a hard wall-clock deadline. This is an output/time
//! limit, not a containment boundary: the child runs with the privileges of
//! the host process.
//!
//! Every exit path (completion, launch failure, timeout) guarantees the child
//! is terminated and reaped before the report is returned.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio::sync::Semaphore;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_INTERPRETER: &str = "python3";
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// How a supervised run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunStatus {
    /// The process exited on its own. The exit code is informational only:
    /// callers decide success by stderr content, not by the status signal.
    Completed { exit_code: i32 },
    /// The wall-clock deadline fired; the child was killed and reaped.
    TimedOut,
    /// The file was missing or the OS refused to launch the process.
    LaunchFailed { error: String },
}

/// Captured result of one supervised run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub stdout: String,
    pub stderr: String,
    #[serde(flatten)]
    pub status: RunStatus,
}

impl RunReport {
    fn launch_failed(error: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: String::new(),
            status: RunStatus::LaunchFailed {
                error: error.into(),
            },
        }
    }
}

/// Runs script files under an interpreter with a per-run deadline.
#[derive(Debug, Clone)]
pub struct ScriptRunner {
    interpreter: String,
    timeout: Duration,
    max_concurrency: usize,
}

impl Default for ScriptRunner {
    fn default() -> Self {
        Self {
            interpreter: DEFAULT_INTERPRETER.to_string(),
            timeout: DEFAULT_TIMEOUT,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}

impl ScriptRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interpreter binary used to launch scripts (e.g. `python3`, `sh`).
    pub fn with_interpreter(mut self, interpreter: impl Into<String>) -> Self {
        self.interpreter = interpreter.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Cap on concurrently supervised processes in [`run_many`](Self::run_many).
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Runs one script file to completion under the configured deadline.
    ///
    /// Failures are data, not errors: a missing file yields a
    /// [`RunStatus::LaunchFailed`] report without spawning anything, and a
    /// deadline expiry yields [`RunStatus::TimedOut`] after the child has
    /// been killed and reaped. Output captured before a timeout is
    /// best-effort and may be empty.
    pub async fn run(&self, path: impl AsRef<Path>) -> RunReport {
        let path = path.as_ref();
        if !path.is_file() {
            tracing::error!("script not found: {}", path.display());
            return RunReport::launch_failed(format!("file not found: {}", path.display()));
        }

        tracing::debug!("executing {} under {}", path.display(), self.interpreter);

        let mut child = match Command::new(&self.interpreter)
            .arg(path)
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .kill_on_drop(true)
            .spawn()
        {
            Ok(child) => child,
            Err(e) => return RunReport::launch_failed(format!("failed to launch process: {e}")),
        };

        // Drain both pipes while waiting so a chatty child cannot deadlock
        // on a full pipe buffer.
        let mut stdout_pipe = child.stdout.take();
        let mut stderr_pipe = child.stderr.take();
        let supervised = async {
            let stdout_fut = async {
                let mut buf = Vec::new();
                if let Some(pipe) = stdout_pipe.as_mut() {
                    let _ = pipe.read_to_end(&mut buf).await;
                }
                buf
            };
            let stderr_fut = async {
                let mut buf = Vec::new();
                if let Some(pipe) = stderr_pipe.as_mut() {
                    let _ = pipe.read_to_end(&mut buf).await;
                }
                buf
            };
            let (stdout, stderr, status) = tokio::join!(stdout_fut, stderr_fut, child.wait());
            (stdout, stderr, status)
        };

        // Bind before matching so the supervising future (and its borrows of
        // `child`) is dropped before the timeout arm kills and reaps.
        let outcome = tokio::time::timeout(self.timeout, supervised).await;
        match outcome {
            Ok((stdout, stderr, Ok(status))) => RunReport {
                stdout: String::from_utf8_lossy(&stdout).to_string(),
                stderr: String::from_utf8_lossy(&stderr).to_string(),
                status: RunStatus::Completed {
                    exit_code: status.code().unwrap_or(-1),
                },
            },
            Ok((_, _, Err(e))) => {
                RunReport::launch_failed(format!("failed waiting for process: {e}"))
            }
            Err(_) => {
                // Deadline fired. Kill and reap before reporting so no
                // orphan outlives the call.
                tracing::error!(
                    "execution of {} timed out after {:?}",
                    path.display(),
                    self.timeout
                );
                if let Err(e) = child.kill().await {
                    tracing::warn!("failed to kill timed-out child: {e}");
                }
                RunReport {
                    stdout: String::new(),
                    stderr: String::new(),
                    status: RunStatus::TimedOut,
                }
            }
        }
    }

    /// Runs a batch of script files concurrently, each under its own
    /// deadline, bounded by the configured concurrency cap.
    ///
    /// One file's crash or timeout never affects the others: every path gets
    /// its own entry in the returned map, keyed by the path as given.
    pub async fn run_many(&self, paths: &[PathBuf]) -> HashMap<String, RunReport> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let runs = paths.iter().map(|path| {
            let semaphore = Arc::clone(&semaphore);
            async move {
                // The semaphore is never closed, so acquire only fails if it
                // were; proceed unbounded in that unreachable case.
                let _permit = semaphore.acquire().await.ok();
                (path.display().to_string(), self.run(path).await)
            }
        });
        futures::future::join_all(runs).await.into_iter().collect()
    }
}
