//! Error types for result-buffer operations.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("result buffer would hold no elements")]
    ZeroSized,

    #[error("buffer of {len} bytes is not a whole number of {cols}-column rows")]
    SizeMismatch { len: usize, cols: usize },

    #[error("slot ({row}, {col}) is outside the {rows}x{cols} result")]
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("row {row} is not owned by this writer")]
    NotOwned { row: usize },

    #[error("row has {found} values, expected {expected}")]
    RowLength { expected: usize, found: usize },

    #[error("invalid ownership map: {0}")]
    Ownership(String),

    #[error(transparent)]
    Contract(#[from] shm_matmul_types::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
