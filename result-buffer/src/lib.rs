//! A fixed-size result matrix shared between processes through a
//! memory-mapped file.
//!
//! The coordinator [`create`](SharedBuffer::create)s the buffer, every worker
//! [`open`](SharedBuffer::open)s it independently and writes only the rows it
//! owns, and the coordinator reads it back once all workers have exited.
//! Ownership of rows is fixed up front by an [`OwnershipMap`], so the buffer
//! needs no locking.
//!
//! # Example
//!
//! ```no_run
//! use result_buffer::SharedBuffer;
//! use shm_matmul_types::RowRange;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let buffer = SharedBuffer::create("/tmp/result.dat", 2, 2)?;
//!
//!     // in a worker process
//!     let mut worker = SharedBuffer::open("/tmp/result.dat", 2)?;
//!     let mut region = worker.region(RowRange::new(0, 2)?)?;
//!     region.write_row(0, &[19.0, 22.0])?;
//!     region.write_row(1, &[43.0, 50.0])?;
//!     worker.flush()?;
//!
//!     let result = buffer.to_matrix()?;
//!     assert_eq!(result.row(1), &[43.0, 50.0]);
//!     buffer.destroy()?;
//!     Ok(())
//! }
//! ```

mod buffer;
mod error;
mod ownership;

pub use buffer::{Region, SharedBuffer};
pub use error::Error;
pub use ownership::OwnershipMap;
