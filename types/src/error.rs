//! Error types for the shared contract types.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum Error {
    #[error("matrix has no rows or no columns")]
    EmptyMatrix,

    #[error("row {row} has {found} values, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("matrix data has {found} values, expected {expected}")]
    DataLength { expected: usize, found: usize },

    #[error("expected {expected} worker arguments, got {found}")]
    ArgCount { expected: usize, found: usize },

    #[error("invalid {name} argument: {value:?}")]
    InvalidArg { name: &'static str, value: String },

    #[error("invalid row range [{start}, {end})")]
    InvalidRange { start: usize, end: usize },
}
