//! Row-partitioned matrix multiplication over a shared result buffer.
//!
//! `matrix-mul` computes C = A × B twice: once with the single-threaded
//! [`reference`] multiplier, and once by splitting the rows of C among
//! independent workers that write straight into a memory-mapped
//! [`SharedBuffer`](result_buffer::SharedBuffer).
//!
//! # Worker protocol
//!
//! - The [`Coordinator`] creates the buffer and splits `[0, N)` with
//!   [`partition`](partition::partition).
//! - Each non-empty range goes to one worker, started through a
//!   [`Launcher`]. Workers re-read A and B from disk and write rows
//!   `[start, end)` of C at offset `(row * P + col) * 8`, little-endian.
//! - Workers never coordinate with each other. The coordinator reads the
//!   buffer only after every worker has exited.
//!
//! # Example
//!
//! ```no_run
//! use matrix_mul::{Coordinator, ProcessLauncher};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let launcher = ProcessLauncher::new("./target/release/shm-matmul");
//!     let mut coordinator = Coordinator::new(launcher, 4, "/tmp/shm.dat");
//!
//!     let run = coordinator.multiply("a.txt", "b.txt").await?;
//!     println!("parallel product took {:?}", run.elapsed);
//!     Ok(())
//! }
//! ```

pub mod coordinator;
mod error;
pub mod io;
pub mod launcher;
pub mod partition;
pub mod reference;
pub mod worker;

pub use coordinator::{Coordinator, Inputs, ParallelRun, State, WorkerOutcome};
pub use error::Error;
pub use launcher::{Launcher, ProcessLauncher, ThreadLauncher, WorkerStatus};
