//! Ways of starting a worker unit.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use shm_matmul_types::{WORKER_COMMAND, WorkerArgs};
use tokio::process::Command;
use tracing::warn;

use crate::worker;

/// How a worker ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerStatus {
    Succeeded,
    Failed { code: Option<i32>, message: String },
    TimedOut,
    LaunchFailed(String),
}

impl WorkerStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, WorkerStatus::Succeeded)
    }
}

/// Starts one worker and resolves once it has terminated.
#[async_trait]
pub trait Launcher: Send + Sync {
    async fn launch(&self, args: WorkerArgs, timeout: Option<Duration>) -> WorkerStatus;
}

/// Runs each worker as a separate OS process:
/// `<program> child <start> <end> <buffer> <P> <A> <B>`.
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    program: PathBuf,
}

impl ProcessLauncher {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Re-executes the running binary in worker mode.
    pub fn current_exe() -> std::io::Result<Self> {
        Ok(Self::new(std::env::current_exe()?))
    }
}

#[async_trait]
impl Launcher for ProcessLauncher {
    async fn launch(&self, args: WorkerArgs, timeout: Option<Duration>) -> WorkerStatus {
        let spawned = Command::new(&self.program)
            .arg(WORKER_COMMAND)
            .args(args.to_args())
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .spawn();
        let mut child = match spawned {
            Ok(child) => child,
            Err(e) => return WorkerStatus::LaunchFailed(e.to_string()),
        };

        let waited = match timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
                Ok(waited) => waited,
                Err(_) => {
                    if let Err(e) = child.kill().await {
                        warn!(range = %args.range, error = %e, "failed to kill timed out worker");
                    }
                    return WorkerStatus::TimedOut;
                }
            },
            None => child.wait().await,
        };

        match waited {
            Ok(status) if status.success() => WorkerStatus::Succeeded,
            Ok(status) => WorkerStatus::Failed {
                code: status.code(),
                message: status.to_string(),
            },
            Err(e) => WorkerStatus::Failed {
                code: None,
                message: e.to_string(),
            },
        }
    }
}

/// Runs each worker on the blocking thread pool of the current process.
///
/// Workers still open the buffer by path and re-read their inputs, so the
/// protocol is the same as with [`ProcessLauncher`]. A timed out worker
/// cannot be stopped and keeps running in the background.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadLauncher;

#[async_trait]
impl Launcher for ThreadLauncher {
    async fn launch(&self, args: WorkerArgs, timeout: Option<Duration>) -> WorkerStatus {
        let task = tokio::task::spawn_blocking(move || worker::run(&args));

        let joined = match timeout {
            Some(limit) => match tokio::time::timeout(limit, task).await {
                Ok(joined) => joined,
                Err(_) => return WorkerStatus::TimedOut,
            },
            None => task.await,
        };

        match joined {
            Ok(Ok(_)) => WorkerStatus::Succeeded,
            Ok(Err(e)) => WorkerStatus::Failed {
                code: None,
                message: e.to_string(),
            },
            Err(e) => WorkerStatus::Failed {
                code: None,
                message: e.to_string(),
            },
        }
    }
}
