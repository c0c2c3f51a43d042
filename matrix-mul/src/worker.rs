//! Worker unit: computes one row range into the shared buffer.

use result_buffer::SharedBuffer;
use shm_matmul_types::{RowRange, WorkerArgs};
use tracing::debug;

use crate::{Error, io, reference};

/// What a worker did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerReport {
    pub range: RowRange,
    pub slots_written: usize,
}

/// Runs one worker.
///
/// Re-reads both inputs, computes rows `args.range` of the product and
/// writes them into the buffer at `args.buffer`, then flushes. Slots
/// outside the range are never touched. An empty range is a no-op.
pub fn run(args: &WorkerArgs) -> Result<WorkerReport, Error> {
    if args.range.is_empty() {
        debug!(range = %args.range, "empty range, nothing to do");
        return Ok(WorkerReport {
            range: args.range,
            slots_written: 0,
        });
    }

    let a = io::read_matrix(&args.matrix_a)?;
    let b = io::read_matrix(&args.matrix_b)?;
    let dims = reference::dimensions(&a, &b)?;
    if dims.p != args.cols {
        return Err(Error::ColumnMismatch {
            expected: args.cols,
            found: dims.p,
        });
    }
    if args.range.end() > dims.n {
        return Err(Error::OutOfRange {
            range: args.range,
            rows: dims.n,
        });
    }

    let mut buffer = SharedBuffer::open(&args.buffer, args.cols)?;
    if buffer.layout().rows() != dims.n {
        return Err(Error::BufferRows {
            expected: dims.n,
            found: buffer.layout().rows(),
        });
    }

    let mut region = buffer.region(args.range)?;
    debug!(range = %region.range(), buffer = %args.buffer.display(), "worker started");
    let mut row = vec![0.0; dims.p];
    for r in args.range.rows() {
        reference::multiply_row(&a, &b, r, &mut row);
        region.write_row(r, &row)?;
    }
    buffer.flush()?;

    let slots_written = args.range.len() * dims.p;
    debug!(range = %args.range, slots_written, "worker finished");
    Ok(WorkerReport {
        range: args.range,
        slots_written,
    })
}
