//! Splits output rows among workers.

use shm_matmul_types::RowRange;

use crate::Error;

/// Splits `[0, rows)` into `workers` contiguous ranges.
///
/// The first `rows % workers` ranges get one extra row. With more workers
/// than rows the trailing ranges are empty.
pub fn partition(rows: usize, workers: usize) -> Result<Vec<RowRange>, Error> {
    if workers == 0 {
        return Err(Error::InvalidWorkerCount(0));
    }

    let base = rows / workers;
    let extra = rows % workers;

    let mut ranges = Vec::with_capacity(workers);
    let mut start = 0;
    for i in 0..workers {
        let len = if i < extra { base + 1 } else { base };
        ranges.push(RowRange::new(start, start + len)?);
        start += len;
    }
    Ok(ranges)
}
