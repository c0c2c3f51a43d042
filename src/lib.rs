//! Compares a single-threaded matrix product with a row-partitioned,
//! multi-process one that shares its result through a memory-mapped file.

pub mod app;
pub mod config;
mod error;
pub mod report;

pub use error::Error;
