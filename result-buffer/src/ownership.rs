//! Static assignment of buffer rows to workers.

use std::ops::Range;

use shm_matmul_types::{Layout, RowRange};

use crate::error::Error;

/// Worker id → owned row range, fixed before any worker starts.
///
/// Ranges are contiguous, ascending, pairwise disjoint and cover exactly
/// `[0, rows)`. Worker ids are indices into the map. Empty ranges are
/// allowed and own no bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnershipMap {
    layout: Layout,
    ranges: Vec<RowRange>,
}

impl OwnershipMap {
    pub fn new(layout: Layout, ranges: Vec<RowRange>) -> Result<Self, Error> {
        if ranges.is_empty() {
            return Err(Error::Ownership("no workers".to_string()));
        }

        let mut next = 0;
        for (worker, range) in ranges.iter().enumerate() {
            if range.start() != next {
                return Err(Error::Ownership(format!(
                    "worker {worker} starts at row {} but row {next} is next",
                    range.start()
                )));
            }
            next = range.end();
        }
        if next != layout.rows() {
            return Err(Error::Ownership(format!(
                "ranges cover {next} rows of {}",
                layout.rows()
            )));
        }

        Ok(Self { layout, ranges })
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Number of workers, including those with empty ranges.
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn range(&self, worker: usize) -> Option<RowRange> {
        self.ranges.get(worker).copied()
    }

    /// The worker that owns `row`.
    pub fn owner_of(&self, row: usize) -> Option<usize> {
        if row >= self.layout.rows() {
            return None;
        }
        let idx = self.ranges.partition_point(|r| r.end() <= row);
        Some(idx)
    }

    /// Byte span of the buffer a worker may write.
    pub fn owned_bytes(&self, worker: usize) -> Option<Range<usize>> {
        self.range(worker).map(|r| self.layout.row_span(r))
    }

    pub fn assignments(&self) -> impl Iterator<Item = (usize, RowRange)> + '_ {
        self.ranges.iter().copied().enumerate()
    }

    /// Assignments with at least one row.
    pub fn active(&self) -> impl Iterator<Item = (usize, RowRange)> + '_ {
        self.assignments().filter(|(_, r)| !r.is_empty())
    }
}
