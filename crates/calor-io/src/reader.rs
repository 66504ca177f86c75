//! Snapshot container reader.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use calor_core::SnapshotId;
use indexmap::IndexMap;

use crate::codec::{decode_group_header, decode_header, read_f32_vec};
use crate::error::SnapshotError;

/// One decoded snapshot group.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    /// Group name, `Timestep_<id>`.
    pub name: String,
    /// Snapshot id parsed from the group name.
    pub id: SnapshotId,
    /// The `Time` attribute: the iteration that produced the snapshot.
    pub time: f64,
    /// Dataset rows.
    pub rows: usize,
    /// Dataset columns.
    pub cols: usize,
    /// Row-major temperatures.
    pub data: Vec<f32>,
}

/// Reads snapshot groups from a byte stream.
///
/// Generic over `R: Read` so tests can use `&[u8]` and production code
/// can use `BufReader<File>`.
pub struct SnapshotReader<R: Read> {
    reader: R,
    snapshots_read: u64,
}

impl<R: Read> SnapshotReader<R> {
    /// Open a container stream, validating the header.
    pub fn open(mut reader: R) -> Result<Self, SnapshotError> {
        decode_header(&mut reader)?;
        Ok(Self {
            reader,
            snapshots_read: 0,
        })
    }

    /// Read the next snapshot, or `None` if the stream is exhausted.
    pub fn next_snapshot(&mut self) -> Result<Option<Snapshot>, SnapshotError> {
        let Some(header) = decode_group_header(&mut self.reader)? else {
            return Ok(None);
        };
        let id = header
            .name
            .strip_prefix("Timestep_")
            .and_then(|n| n.parse().ok())
            .map(SnapshotId)
            .ok_or_else(|| SnapshotError::Malformed {
                detail: format!("unexpected group name {:?}", header.name),
            })?;
        let count = header.element_count().ok_or_else(|| SnapshotError::Malformed {
            detail: format!("dataset {}x{} is too large", header.rows, header.cols),
        })?;
        let data = read_f32_vec(&mut self.reader, count)?;
        self.snapshots_read += 1;
        Ok(Some(Snapshot {
            id,
            time: header.time,
            rows: header.rows as usize,
            cols: header.cols as usize,
            data,
            name: header.name,
        }))
    }

    /// Number of snapshots read so far.
    pub fn snapshots_read(&self) -> u64 {
        self.snapshots_read
    }
}

impl<R: Read> Iterator for SnapshotReader<R> {
    type Item = Result<Snapshot, SnapshotError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_snapshot().transpose()
    }
}

/// Read every snapshot in the container at `path`, keyed by group name
/// in file order.
pub fn read_snapshots(path: impl AsRef<Path>) -> Result<IndexMap<String, Snapshot>, SnapshotError> {
    let reader = SnapshotReader::open(BufReader::new(File::open(path)?))?;
    let mut out = IndexMap::new();
    for snapshot in reader {
        let snapshot = snapshot?;
        if out.contains_key(&snapshot.name) {
            return Err(SnapshotError::Malformed {
                detail: format!("duplicate group {}", snapshot.name),
            });
        }
        out.insert(snapshot.name.clone(), snapshot);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{encode_group_header, encode_header, GroupHeader};

    #[test]
    fn bad_group_name_is_malformed() {
        let mut buf = Vec::new();
        encode_header(&mut buf).unwrap();
        let header = GroupHeader {
            name: "Frame_1".into(),
            time: 1.0,
            rows: 0,
            cols: 0,
        };
        encode_group_header(&mut buf, &header).unwrap();
        let mut reader = SnapshotReader::open(buf.as_slice()).unwrap();
        match reader.next_snapshot() {
            Err(SnapshotError::Malformed { detail }) => assert!(detail.contains("Frame_1")),
            other => panic!("expected Malformed, got {other:?}"),
        }
    }

    #[test]
    fn truncated_data_is_malformed() {
        let mut buf = Vec::new();
        encode_header(&mut buf).unwrap();
        let header = GroupHeader {
            name: "Timestep_0".into(),
            time: 0.0,
            rows: 2,
            cols: 2,
        };
        encode_group_header(&mut buf, &header).unwrap();
        buf.extend_from_slice(&[0u8; 6]);
        let mut reader = SnapshotReader::open(buf.as_slice()).unwrap();
        match reader.next_snapshot() {
            Err(SnapshotError::Malformed { detail }) => assert!(detail.contains("6 of 16")),
            other => panic!("expected Malformed, got {other:?}"),
        }
    }

    #[test]
    fn iterator_yields_in_order() {
        let mut buf = Vec::new();
        let mut w = crate::SnapshotWriter::new(&mut buf).unwrap();
        for k in 0..3u64 {
            w.write_full(SnapshotId(k), k * 10, &[k as f32; 4], 2).unwrap();
        }
        w.close().unwrap();
        let reader = SnapshotReader::open(buf.as_slice()).unwrap();
        let ids: Vec<u64> = reader.map(|s| s.unwrap().id.0).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }
}
