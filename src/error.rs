//! Errors surfaced by the `shm-matmul` binary.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("worker count must be at least 1, got {0}")]
    InvalidWorkerCount(i64),

    #[error("worker timeout must be at least one second")]
    ZeroTimeout,

    #[error("cannot locate the worker executable: {0}")]
    WorkerExe(#[source] std::io::Error),

    #[error(transparent)]
    Engine(#[from] matrix_mul::Error),

    #[error("results differ at ({row}, {col}): sequential {sequential}, parallel {parallel}")]
    ResultMismatch {
        row: usize,
        col: usize,
        sequential: f64,
        parallel: f64,
    },

    #[error("cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
