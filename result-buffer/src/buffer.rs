//! Memory-mapped result buffer.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use memmap2::{MmapMut, MmapOptions};
use shm_matmul_types::{ELEMENT_SIZE, Layout, Matrix, RowRange, decode, encode};
use tracing::{debug, warn};

use crate::error::Error;

/// A result matrix stored in a shared, memory-mapped file.
///
/// The file is exactly `rows * cols * ELEMENT_SIZE` bytes with no header.
/// Every handle maps it `MAP_SHARED`, so a write through one handle is
/// visible to every other handle once it has been flushed.
///
/// # Lifecycle
///
/// The handle returned by [`create`](Self::create) owns the backing file:
/// the file is removed by [`destroy`](Self::destroy), or on drop if the
/// handle is dropped early (for instance while unwinding from an error).
/// Handles returned by [`open`](Self::open) never remove the file.
pub struct SharedBuffer {
    path: PathBuf,
    layout: Layout,
    mmap: MmapMut,
    owned: bool,
}

impl SharedBuffer {
    /// Creates (or truncates) the backing file, sizes it for a `rows x cols`
    /// result and maps it.
    pub fn create(path: impl AsRef<Path>, rows: usize, cols: usize) -> Result<Self, Error> {
        let path = path.as_ref();
        let layout = Layout::new(rows, cols);
        if layout.byte_len() == 0 {
            return Err(Error::ZeroSized);
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(|e| Error::io(path, e))?;
        file.set_len(layout.byte_len() as u64).map_err(|e| Error::io(path, e))?;

        // SAFETY: the file was just created and sized by us. Other handles
        // only write disjoint slots, and nobody truncates it while mapped.
        let mmap = unsafe { MmapOptions::new().map_mut(&file) }.map_err(|e| Error::io(path, e))?;

        debug!(
            path = %path.display(),
            rows,
            cols,
            bytes = layout.byte_len(),
            "created result buffer"
        );
        Ok(Self {
            path: path.to_path_buf(),
            layout,
            mmap,
            owned: true,
        })
    }

    /// Maps an existing buffer for read-write access.
    ///
    /// The row count is recovered from the file length, which must be a
    /// whole number of `cols`-wide rows.
    pub fn open(path: impl AsRef<Path>, cols: usize) -> Result<Self, Error> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| Error::io(path, e))?;
        let len = file.metadata().map_err(|e| Error::io(path, e))?.len() as usize;

        let layout = Layout::from_byte_len(len, cols).ok_or(Error::SizeMismatch { len, cols })?;
        if layout.rows() == 0 {
            return Err(Error::ZeroSized);
        }

        // SAFETY: see `create`; the coordinator keeps the file sized until
        // every worker has exited.
        let mmap = unsafe { MmapOptions::new().map_mut(&file) }.map_err(|e| Error::io(path, e))?;

        debug!(path = %path.display(), rows = layout.rows(), cols, "opened result buffer");
        Ok(Self {
            path: path.to_path_buf(),
            layout,
            mmap,
            owned: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Writes one element.
    pub fn write(&mut self, row: usize, col: usize, value: f64) -> Result<(), Error> {
        let offset = self.offset(row, col)?;
        self.mmap[offset..offset + ELEMENT_SIZE].copy_from_slice(&encode(value));
        Ok(())
    }

    /// Reads one element.
    pub fn read(&self, row: usize, col: usize) -> Result<f64, Error> {
        let offset = self.offset(row, col)?;
        let mut bytes = [0u8; ELEMENT_SIZE];
        bytes.copy_from_slice(&self.mmap[offset..offset + ELEMENT_SIZE]);
        Ok(decode(bytes))
    }

    /// Returns a writer restricted to `range`.
    pub fn region(&mut self, range: RowRange) -> Result<Region<'_>, Error> {
        if range.end() > self.layout.rows() {
            return Err(Error::OutOfBounds {
                row: range.end().saturating_sub(1),
                col: 0,
                rows: self.layout.rows(),
                cols: self.layout.cols(),
            });
        }
        Ok(Region {
            buffer: self,
            range,
        })
    }

    /// Synchronously writes the mapped pages back to the file.
    pub fn flush(&self) -> Result<(), Error> {
        self.mmap.flush().map_err(|e| Error::io(&self.path, e))
    }

    /// Reads the whole buffer into a matrix.
    pub fn to_matrix(&self) -> Result<Matrix, Error> {
        let (rows, cols) = (self.layout.rows(), self.layout.cols());
        let mut data = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                data.push(self.read(row, col)?);
            }
        }
        Ok(Matrix::from_vec(rows, cols, data)?)
    }

    /// Unmaps the buffer and removes the backing file.
    pub fn destroy(mut self) -> Result<(), Error> {
        let path = std::mem::take(&mut self.path);
        let owned = std::mem::replace(&mut self.owned, false);
        drop(self);

        if owned {
            std::fs::remove_file(&path).map_err(|e| Error::io(&path, e))?;
            debug!(path = %path.display(), "removed result buffer");
        }
        Ok(())
    }

    fn offset(&self, row: usize, col: usize) -> Result<usize, Error> {
        self.layout.offset(row, col).ok_or(Error::OutOfBounds {
            row,
            col,
            rows: self.layout.rows(),
            cols: self.layout.cols(),
        })
    }
}

impl Drop for SharedBuffer {
    fn drop(&mut self) {
        if self.owned {
            if let Err(e) = std::fs::remove_file(&self.path) {
                warn!(path = %self.path.display(), error = %e, "failed to remove result buffer");
            }
        }
    }
}

/// Write access to the rows a single worker owns.
pub struct Region<'a> {
    buffer: &'a mut SharedBuffer,
    range: RowRange,
}

impl Region<'_> {
    pub fn range(&self) -> RowRange {
        self.range
    }

    /// Writes a full output row. `values` must be exactly one row wide.
    pub fn write_row(&mut self, row: usize, values: &[f64]) -> Result<(), Error> {
        if !self.range.contains(row) {
            return Err(Error::NotOwned { row });
        }
        let cols = self.buffer.layout.cols();
        if values.len() != cols {
            return Err(Error::RowLength {
                expected: cols,
                found: values.len(),
            });
        }
        for (col, &value) in values.iter().enumerate() {
            self.buffer.write(row, col, value)?;
        }
        Ok(())
    }
}
