//! Direct writes of one tile into a reserved snapshot block.

use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::Path;

use calor_grid::Region;

use crate::error::SnapshotError;
use crate::writer::SnapshotSlot;

/// A rank's own write handle on a shared container.
///
/// Every rank opens the container independently and writes only the
/// rectangle it owns, so concurrent writers never overlap. The reserved
/// block must already exist on disk (see
/// [`SnapshotWriter::begin_snapshot`](crate::SnapshotWriter::begin_snapshot)).
#[derive(Debug)]
pub struct TileWriter {
    file: File,
}

impl TileWriter {
    /// Open an existing container for in-place writes.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let file = OpenOptions::new().write(true).open(path)?;
        Ok(Self { file })
    }

    /// Write the cells of `region` of `data` (row stride `stride`) into
    /// `slot`, placing the region's first cell at global column `x`,
    /// row `y`.
    pub fn write_tile(
        &mut self,
        slot: &SnapshotSlot,
        data: &[f32],
        stride: usize,
        region: Region,
        origin: (usize, usize),
    ) -> Result<(), SnapshotError> {
        let (x, y) = origin;
        if x + region.width > slot.cols || y + region.height > slot.rows {
            return Err(SnapshotError::OutOfBounds {
                origin,
                extent: (region.height, region.width),
                dataset: (slot.rows, slot.cols),
            });
        }
        let mut bytes = Vec::with_capacity(4 * region.width);
        for (r, i) in region.rows().enumerate() {
            let start = i * stride + region.col;
            bytes.clear();
            for v in &data[start..start + region.width] {
                bytes.extend_from_slice(&v.to_le_bytes());
            }
            let offset = slot.data_offset + 4 * ((y + r) * slot.cols + x) as u64;
            self.file.seek(SeekFrom::Start(offset))?;
            self.file.write_all(&bytes)?;
        }
        Ok(())
    }

    /// Flush the handle's writes to the file.
    pub fn sync(&mut self) -> Result<(), SnapshotError> {
        self.file.flush()?;
        Ok(())
    }
}
