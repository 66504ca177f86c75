//! Rectangular sub-regions of row-major 2D arrays.
//!
//! A [`Region`] plays the role of a subarray datatype: it names a
//! rectangle inside a larger array of known row stride, and can copy
//! that rectangle out to a contiguous buffer ([`Region::pack`]) or back
//! in ([`Region::unpack`]).

use std::ops::Range;

/// A `height × width` rectangle whose top-left corner is `(row, col)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Region {
    /// First row.
    pub row: usize,
    /// First column.
    pub col: usize,
    /// Number of rows.
    pub height: usize,
    /// Number of columns.
    pub width: usize,
}

impl Region {
    /// Create a region.
    pub const fn new(row: usize, col: usize, height: usize, width: usize) -> Self {
        Self {
            row,
            col,
            height,
            width,
        }
    }

    /// Region spanning the row and column ranges. Empty ranges give an
    /// empty region.
    pub fn from_ranges(rows: Range<usize>, cols: Range<usize>) -> Self {
        Self::new(rows.start, cols.start, rows.len(), cols.len())
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.height * self.width
    }

    /// Whether the region has no cells.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Row range covered.
    pub fn rows(&self) -> Range<usize> {
        self.row..self.row + self.height
    }

    /// Column range covered.
    pub fn cols(&self) -> Range<usize> {
        self.col..self.col + self.width
    }

    /// Whether `(i, j)` lies inside the region.
    pub fn contains(&self, i: usize, j: usize) -> bool {
        self.rows().contains(&i) && self.cols().contains(&j)
    }

    /// Whether the region fits inside an array of `rows × cols`.
    pub fn fits(&self, rows: usize, cols: usize) -> bool {
        self.row + self.height <= rows && self.col + self.width <= cols
    }

    /// The same rectangle moved by `(dr, dc)`.
    pub fn translate(&self, dr: usize, dc: usize) -> Self {
        Self::new(self.row + dr, self.col + dc, self.height, self.width)
    }

    /// Copy the region out of `src` (row stride `stride`) into a new
    /// contiguous row-major buffer.
    ///
    /// # Panics
    ///
    /// Panics if the region does not fit inside `src`.
    pub fn pack<T: Copy>(&self, src: &[T], stride: usize) -> Vec<T> {
        let mut out = Vec::with_capacity(self.len());
        for i in self.rows() {
            let start = i * stride + self.col;
            out.extend_from_slice(&src[start..start + self.width]);
        }
        out
    }

    /// Copy a contiguous row-major buffer into the region of `dst`
    /// (row stride `stride`).
    ///
    /// # Panics
    ///
    /// Panics if `data.len() != self.len()` or the region does not fit
    /// inside `dst`.
    pub fn unpack<T: Copy>(&self, data: &[T], dst: &mut [T], stride: usize) {
        assert_eq!(data.len(), self.len(), "region payload length mismatch");
        if self.width == 0 {
            return;
        }
        for (k, chunk) in data.chunks_exact(self.width).enumerate() {
            let start = (self.row + k) * stride + self.col;
            dst[start..start + self.width].copy_from_slice(chunk);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn pack_extracts_rectangle() {
        // 4x4 array with values = flat index.
        let src: Vec<u32> = (0..16).collect();
        let r = Region::new(1, 2, 2, 2);
        assert_eq!(r.pack(&src, 4), vec![6, 7, 10, 11]);
    }

    #[test]
    fn unpack_writes_rectangle() {
        let mut dst = vec![0u8; 12];
        Region::new(1, 1, 2, 2).unpack(&[1, 2, 3, 4], &mut dst, 4);
        assert_eq!(dst, vec![0, 0, 0, 0, 0, 1, 2, 0, 0, 3, 4, 0]);
    }

    #[test]
    fn from_ranges_empty() {
        let r = Region::from_ranges(4..4, 2..6);
        assert!(r.is_empty());
        assert!(r.pack(&[0f32; 64], 8).is_empty());
    }

    #[test]
    fn contains_and_fits() {
        let r = Region::new(2, 2, 3, 4);
        assert!(r.contains(2, 5));
        assert!(!r.contains(5, 2));
        assert!(r.fits(5, 6));
        assert!(!r.fits(4, 6));
        assert_eq!(r.translate(1, 1), Region::new(3, 3, 3, 4));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            max_global_rejects: 65536,
            ..ProptestConfig::default()
        })]
        #[test]
        fn pack_then_unpack_restores(
            rows in 1usize..10, cols in 1usize..10,
            r0 in 0usize..10, c0 in 0usize..10,
            h in 0usize..10, w in 0usize..10,
        ) {
            let region = Region::new(r0 % rows, c0 % cols, h, w);
            prop_assume!(region.fits(rows, cols));
            let src: Vec<i64> = (0..(rows * cols) as i64).collect();
            let packed = region.pack(&src, cols);
            let mut dst = vec![-1i64; rows * cols];
            region.unpack(&packed, &mut dst, cols);
            for i in 0..rows {
                for j in 0..cols {
                    let expect = if region.contains(i, j) { src[i * cols + j] } else { -1 };
                    prop_assert_eq!(dst[i * cols + j], expect);
                }
            }
        }
    }
}
