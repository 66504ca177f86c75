//! Snapshot container writer.
//!
//! [`SnapshotWriter`] appends groups to any `Write` sink. The header is
//! written immediately on construction and the writer tracks its byte
//! position so that reserved data blocks can be addressed by offset.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use calor_core::SnapshotId;

use crate::codec::{encode_group_header, encode_header, write_f32_slice, GroupHeader, HEADER_LEN};
use crate::error::SnapshotError;

/// Location of a reserved, zero-filled data block inside a container.
///
/// Returned by [`SnapshotWriter::begin_snapshot`]; ranks fill their own
/// rectangles of the block through a [`TileWriter`](crate::TileWriter).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SnapshotSlot {
    /// Byte offset of element `(0, 0)` of the dataset.
    pub data_offset: u64,
    /// Dataset rows.
    pub rows: usize,
    /// Dataset columns.
    pub cols: usize,
}

/// Writes snapshot groups to a byte stream.
///
/// Generic over `W: Write` so tests can use `Vec<u8>` and production
/// code can use [`SnapshotFile`].
///
/// # Examples
///
/// ```
/// use calor_core::SnapshotId;
/// use calor_io::{SnapshotReader, SnapshotWriter};
///
/// let mut buf = Vec::new();
/// let mut writer = SnapshotWriter::new(&mut buf).unwrap();
/// writer.write_full(SnapshotId(0), 0, &[1.0, 2.0, 3.0, 4.0], 2).unwrap();
/// writer.write_full(SnapshotId(1), 5, &[5.0, 6.0, 7.0, 8.0], 2).unwrap();
/// assert_eq!(writer.snapshots_written(), 2);
/// writer.close().unwrap();
///
/// let mut reader = SnapshotReader::open(buf.as_slice()).unwrap();
/// let first = reader.next_snapshot().unwrap().unwrap();
/// assert_eq!(first.name, "Timestep_0");
/// let second = reader.next_snapshot().unwrap().unwrap();
/// assert_eq!(second.time, 5.0);
/// assert_eq!(second.data, vec![5.0, 6.0, 7.0, 8.0]);
/// assert!(reader.next_snapshot().unwrap().is_none());
/// ```
pub struct SnapshotWriter<W: Write> {
    writer: W,
    position: u64,
    snapshots_written: u64,
}

/// A snapshot container backed by a buffered file.
pub type SnapshotFile = SnapshotWriter<BufWriter<File>>;

impl SnapshotWriter<BufWriter<File>> {
    /// Create (or truncate) the container at `path` and write its header.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let path: PathBuf = path.as_ref().to_path_buf();
        let file = File::create(&path)?;
        log::debug!("created snapshot container {}", path.display());
        Self::new(BufWriter::new(file))
    }
}

impl<W: Write> SnapshotWriter<W> {
    /// Wrap a sink, immediately writing the container header.
    pub fn new(mut writer: W) -> Result<Self, SnapshotError> {
        encode_header(&mut writer)?;
        Ok(Self {
            writer,
            position: HEADER_LEN,
            snapshots_written: 0,
        })
    }

    fn group_header(
        id: SnapshotId,
        iteration: u64,
        rows: usize,
        cols: usize,
    ) -> Result<GroupHeader, SnapshotError> {
        let dim = |v: usize| {
            u32::try_from(v).map_err(|_| SnapshotError::Malformed {
                detail: format!("dimension {v} exceeds u32"),
            })
        };
        Ok(GroupHeader {
            name: id.group_name(),
            time: iteration as f64,
            rows: dim(rows)?,
            cols: dim(cols)?,
        })
    }

    /// Append a complete `edge × edge` field as snapshot `id`, stamped
    /// with `iteration`.
    pub fn write_full(
        &mut self,
        id: SnapshotId,
        iteration: u64,
        data: &[f32],
        edge: usize,
    ) -> Result<(), SnapshotError> {
        if data.len() != edge * edge {
            return Err(SnapshotError::ShapeMismatch {
                expected: edge * edge,
                got: data.len(),
            });
        }
        let header = Self::group_header(id, iteration, edge, edge)?;
        encode_group_header(&mut self.writer, &header)?;
        write_f32_slice(&mut self.writer, data)?;
        self.position += header.encoded_len() + 4 * data.len() as u64;
        self.snapshots_written += 1;
        log::debug!("wrote {} (time {iteration})", header.name);
        Ok(())
    }

    /// Append snapshot `id` with a zero-filled `edge × edge` data block and
    /// return where the block lives.
    ///
    /// The sink is flushed before returning, so the block is visible to
    /// other handles on the same file.
    pub fn begin_snapshot(
        &mut self,
        id: SnapshotId,
        iteration: u64,
        edge: usize,
    ) -> Result<SnapshotSlot, SnapshotError> {
        let header = Self::group_header(id, iteration, edge, edge)?;
        encode_group_header(&mut self.writer, &header)?;
        let data_offset = self.position + header.encoded_len();
        let zero_row = vec![0u8; 4 * edge];
        for _ in 0..edge {
            self.writer.write_all(&zero_row)?;
        }
        self.writer.flush()?;
        self.position = data_offset + 4 * (edge * edge) as u64;
        self.snapshots_written += 1;
        log::debug!("reserved {} at offset {data_offset}", header.name);
        Ok(SnapshotSlot {
            data_offset,
            rows: edge,
            cols: edge,
        })
    }

    /// Number of snapshot groups appended so far.
    pub fn snapshots_written(&self) -> u64 {
        self.snapshots_written
    }

    /// Bytes written so far, header included.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Flush and return the underlying sink.
    pub fn close(mut self) -> Result<W, SnapshotError> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}
