//! Error types for matrix-mul operations.

use std::path::PathBuf;

use shm_matmul_types::RowRange;
use thiserror::Error;

use crate::coordinator::WorkerOutcome;

#[derive(Debug, Error)]
pub enum Error {
    #[error("worker count must be at least 1, got {0}")]
    InvalidWorkerCount(i64),

    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}:{line}: invalid number {value:?}")]
    Parse {
        path: PathBuf,
        line: usize,
        value: String,
    },

    #[error("{path}:{line}: expected {expected} values, found {found}")]
    RaggedLine {
        path: PathBuf,
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("{path}: no matrix data")]
    EmptyInput { path: PathBuf },

    #[error("matrix dimension mismatch: A is {0}x{1}, B is {2}x{3}")]
    DimensionMismatch(usize, usize, usize, usize),

    #[error("B has {found} columns but P = {expected} was requested")]
    ColumnMismatch { expected: usize, found: usize },

    #[error("row range {range} exceeds the {rows} rows of the result")]
    OutOfRange { range: RowRange, rows: usize },

    #[error("result buffer has {found} rows, A has {expected}")]
    BufferRows { expected: usize, found: usize },

    #[error("buffer error: {0}")]
    Buffer(#[from] result_buffer::Error),

    #[error(transparent)]
    Contract(#[from] shm_matmul_types::Error),

    #[error("{} of {launched} workers failed", .failed.len())]
    WorkerFailures {
        failed: Vec<WorkerOutcome>,
        launched: usize,
    },
}
