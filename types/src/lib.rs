//! Types shared by the coordinator and the worker processes.
//!
//! Everything a worker and the coordinator must agree on lives here: the
//! matrix representation, the row ranges handed out to workers, the byte
//! layout of the shared result buffer and the worker argument list.

mod args;
mod error;
mod layout;
mod matrix;
mod range;

pub use args::{WorkerArgs, WORKER_ARG_COUNT, WORKER_COMMAND};
pub use error::Error;
pub use layout::{decode, encode, Layout, ELEMENT_SIZE};
pub use matrix::{Dimensions, Matrix};
pub use range::RowRange;
