//! Parallel multiplication coordinator.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use result_buffer::{OwnershipMap, SharedBuffer};
use shm_matmul_types::{Dimensions, Layout, Matrix, RowRange, WorkerArgs};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::launcher::{Launcher, WorkerStatus};
use crate::partition::partition;
use crate::{Error, io, reference};

/// Coordinator progress. `Done` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Init,
    Validated,
    BufferReady,
    Dispatched,
    Joined,
    Assembled,
    Done,
    Failed,
}

/// Both input matrices, loaded and checked for compatibility.
///
/// The paths are kept because workers re-read the inputs themselves.
#[derive(Debug, Clone)]
pub struct Inputs {
    pub matrix_a: PathBuf,
    pub matrix_b: PathBuf,
    pub a: Matrix,
    pub b: Matrix,
    pub dims: Dimensions,
}

impl Inputs {
    pub fn load(matrix_a: impl AsRef<Path>, matrix_b: impl AsRef<Path>) -> Result<Self, Error> {
        let (matrix_a, matrix_b) = (matrix_a.as_ref(), matrix_b.as_ref());
        let a = io::read_matrix(matrix_a)?;
        let b = io::read_matrix(matrix_b)?;
        let dims = reference::dimensions(&a, &b)?;
        Ok(Self {
            matrix_a: matrix_a.to_path_buf(),
            matrix_b: matrix_b.to_path_buf(),
            a,
            b,
            dims,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerOutcome {
    pub worker: usize,
    pub range: RowRange,
    pub status: WorkerStatus,
}

/// Result of a successful parallel run.
#[derive(Debug)]
pub struct ParallelRun {
    pub result: Matrix,
    /// Time from the first launch until the last worker was joined.
    pub elapsed: Duration,
    pub ownership: OwnershipMap,
    pub outcomes: Vec<WorkerOutcome>,
}

/// Splits a product across workers that write into a shared buffer.
///
/// # Protocol
///
/// 1. Partition the `n` rows into `workers` contiguous ranges.
/// 2. Create the buffer at `buffer_path`, sized for the `n x p` result.
/// 3. Launch one worker per non-empty range, all at once.
/// 4. Wait for every worker, even after one has failed.
/// 5. If all succeeded, read the buffer back and remove it.
///
/// The buffer file is removed on every path out of [`run`](Self::run),
/// including failures.
pub struct Coordinator<L> {
    launcher: Arc<L>,
    workers: usize,
    buffer_path: PathBuf,
    worker_timeout: Option<Duration>,
    state: State,
}

impl<L: Launcher + 'static> Coordinator<L> {
    pub fn new(launcher: L, workers: usize, buffer_path: impl Into<PathBuf>) -> Self {
        Self {
            launcher: Arc::new(launcher),
            workers,
            buffer_path: buffer_path.into(),
            worker_timeout: None,
            state: State::Init,
        }
    }

    /// Kills (or abandons) any worker still running after `timeout`.
    pub fn with_worker_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.worker_timeout = timeout;
        self
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Loads both inputs, then runs the parallel product.
    pub async fn multiply(
        &mut self,
        matrix_a: impl AsRef<Path>,
        matrix_b: impl AsRef<Path>,
    ) -> Result<ParallelRun, Error> {
        match Inputs::load(matrix_a, matrix_b) {
            Ok(inputs) => self.run(&inputs).await,
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Runs the parallel product of already validated inputs.
    pub async fn run(&mut self, inputs: &Inputs) -> Result<ParallelRun, Error> {
        match self.execute(inputs).await {
            Ok(run) => {
                self.transition(State::Done);
                Ok(run)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    async fn execute(&mut self, inputs: &Inputs) -> Result<ParallelRun, Error> {
        let dims = inputs.dims;
        let ownership = OwnershipMap::new(
            Layout::new(dims.n, dims.p),
            partition(dims.n, self.workers)?,
        )?;
        self.transition(State::Validated);

        let buffer = SharedBuffer::create(&self.buffer_path, dims.n, dims.p)?;
        self.transition(State::BufferReady);

        let started = Instant::now();
        let mut tasks = JoinSet::new();
        let mut pending = BTreeMap::new();
        for (worker, range) in ownership.active() {
            let args = WorkerArgs {
                range,
                buffer: buffer.path().to_path_buf(),
                cols: dims.p,
                matrix_a: inputs.matrix_a.clone(),
                matrix_b: inputs.matrix_b.clone(),
            };
            debug!(worker, %range, "launching worker");

            let launcher = Arc::clone(&self.launcher);
            let timeout = self.worker_timeout;
            pending.insert(worker, range);
            tasks.spawn(async move { (worker, launcher.launch(args, timeout).await) });
        }
        self.transition(State::Dispatched);

        let mut outcomes = Vec::with_capacity(pending.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((worker, status)) => {
                    if let Some(range) = pending.remove(&worker) {
                        outcomes.push(WorkerOutcome {
                            worker,
                            range,
                            status,
                        });
                    }
                }
                Err(e) => warn!(error = %e, "worker task did not complete"),
            }
        }
        for (worker, range) in pending {
            outcomes.push(WorkerOutcome {
                worker,
                range,
                status: WorkerStatus::LaunchFailed("worker task did not complete".to_string()),
            });
        }
        let elapsed = started.elapsed();
        outcomes.sort_by_key(|o| o.worker);
        self.transition(State::Joined);

        let failed: Vec<WorkerOutcome> = outcomes
            .iter()
            .filter(|o| !o.status.is_success())
            .cloned()
            .collect();
        for outcome in &failed {
            warn!(
                worker = outcome.worker,
                range = %outcome.range,
                status = ?outcome.status,
                "worker failed"
            );
        }
        if !failed.is_empty() {
            return Err(Error::WorkerFailures {
                failed,
                launched: outcomes.len(),
            });
        }

        let result = buffer.to_matrix()?;
        self.transition(State::Assembled);
        buffer.destroy()?;

        Ok(ParallelRun {
            result,
            elapsed,
            ownership,
            outcomes,
        })
    }

    fn transition(&mut self, next: State) {
        info!(from = ?self.state, to = ?next, "coordinator state");
        self.state = next;
    }

    fn fail(&mut self, e: Error) -> Error {
        error!(from = ?self.state, error = %e, "parallel run failed");
        self.state = State::Failed;
        e
    }
}
