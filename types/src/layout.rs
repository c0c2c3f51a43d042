//! Byte layout of the shared result buffer.
//!
//! Element `(row, col)` of an `rows x cols` result lives at byte offset
//! `(row * cols + col) * ELEMENT_SIZE`, encoded as a little-endian IEEE-754
//! double. Writers and the reader must both go through this module.

use std::ops::Range;

use crate::RowRange;

/// Width in bytes of one encoded element.
pub const ELEMENT_SIZE: usize = 8;

pub fn encode(value: f64) -> [u8; ELEMENT_SIZE] {
    value.to_le_bytes()
}

pub fn decode(bytes: [u8; ELEMENT_SIZE]) -> f64 {
    f64::from_le_bytes(bytes)
}

/// Row-major addressing for a result of `rows x cols` elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    rows: usize,
    cols: usize,
}

impl Layout {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Recovers the layout of an existing buffer from its byte length.
    ///
    /// Returns `None` when `cols` is zero or the length is not a whole
    /// number of rows.
    pub fn from_byte_len(len: usize, cols: usize) -> Option<Self> {
        let row_bytes = cols.checked_mul(ELEMENT_SIZE)?;
        if row_bytes == 0 || len % row_bytes != 0 {
            return None;
        }
        Some(Self::new(len / row_bytes, cols))
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn row_bytes(&self) -> usize {
        self.cols * ELEMENT_SIZE
    }

    pub fn byte_len(&self) -> usize {
        self.rows * self.row_bytes()
    }

    /// Byte offset of `(row, col)`, or `None` if it lies outside the grid.
    pub fn offset(&self, row: usize, col: usize) -> Option<usize> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        Some((row * self.cols + col) * ELEMENT_SIZE)
    }

    /// Byte span covered by a range of rows.
    pub fn row_span(&self, range: RowRange) -> Range<usize> {
        range.start() * self.row_bytes()..range.end() * self.row_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn corners_map_to_first_and_last_slot() {
        let layout = Layout::new(3, 4);
        assert_eq!(layout.offset(0, 0), Some(0));
        assert_eq!(layout.offset(2, 3), Some(layout.byte_len() - ELEMENT_SIZE));
        assert_eq!(layout.offset(3, 0), None);
        assert_eq!(layout.offset(0, 4), None);
    }

    #[test]
    fn encoding_is_little_endian() {
        assert_eq!(encode(1.0), [0, 0, 0, 0, 0, 0, 0xf0, 0x3f]);
        assert_eq!(decode([0, 0, 0, 0, 0, 0, 0xf0, 0x3f]), 1.0);
    }

    #[test]
    fn from_byte_len_rejects_partial_rows() {
        assert_eq!(Layout::from_byte_len(48, 3), Some(Layout::new(2, 3)));
        assert_eq!(Layout::from_byte_len(40, 3), None);
        assert_eq!(Layout::from_byte_len(48, 0), None);
    }

    #[test]
    fn row_span_covers_whole_rows() {
        let layout = Layout::new(5, 2);
        let span = layout.row_span(RowRange::new(1, 3).unwrap());
        assert_eq!(span, 16..48);
    }

    proptest! {
        #[test]
        fn offsets_are_distinct_and_in_bounds(rows in 1usize..40, cols in 1usize..40) {
            let layout = Layout::new(rows, cols);
            let mut expected = 0;
            for r in 0..rows {
                for c in 0..cols {
                    let offset = layout.offset(r, c).unwrap();
                    prop_assert_eq!(offset, expected);
                    prop_assert!(offset + ELEMENT_SIZE <= layout.byte_len());
                    expected += ELEMENT_SIZE;
                }
            }
        }

        #[test]
        fn encode_decode_preserves_bits(value in any::<f64>()) {
            prop_assert_eq!(decode(encode(value)).to_bits(), value.to_bits());
        }
    }
}
