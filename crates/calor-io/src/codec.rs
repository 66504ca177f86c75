//! Binary encode/decode for the snapshot container.
//!
//! All integers are little-endian. Strings are length-prefixed with a
//! `u32` byte length. There is no compression or alignment padding.

use std::io::{Read, Write};

use crate::error::SnapshotError;
use crate::{DATASET_NAME, DTYPE_F32, FORMAT_VERSION, MAGIC, TIME_ATTRIBUTE};

// ── Primitive writers ───────────────────────────────────────────

/// Write a single byte.
pub fn write_u8(w: &mut dyn Write, v: u8) -> Result<(), SnapshotError> {
    w.write_all(&[v])?;
    Ok(())
}

/// Write a little-endian u32.
pub fn write_u32_le(w: &mut dyn Write, v: u32) -> Result<(), SnapshotError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a little-endian f64.
pub fn write_f64_le(w: &mut dyn Write, v: f64) -> Result<(), SnapshotError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a length-prefixed UTF-8 string (u32 length + bytes).
pub fn write_length_prefixed_str(w: &mut dyn Write, s: &str) -> Result<(), SnapshotError> {
    write_u32_le(w, s.len() as u32)?;
    w.write_all(s.as_bytes())?;
    Ok(())
}

/// Write a run of little-endian f32 values.
pub fn write_f32_slice(w: &mut dyn Write, values: &[f32]) -> Result<(), SnapshotError> {
    let mut bytes = Vec::with_capacity(values.len() * 4);
    for v in values {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    w.write_all(&bytes)?;
    Ok(())
}

// ── Primitive readers ───────────────────────────────────────────

/// Read a single byte.
pub fn read_u8(r: &mut dyn Read) -> Result<u8, SnapshotError> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf)?;
    Ok(buf[0])
}

/// Read a little-endian u32.
pub fn read_u32_le(r: &mut dyn Read) -> Result<u32, SnapshotError> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

/// Read a little-endian f64.
pub fn read_f64_le(r: &mut dyn Read) -> Result<f64, SnapshotError> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(f64::from_le_bytes(buf))
}

/// Read exactly `len` bytes without trusting `len` for the allocation.
///
/// The buffer grows only as bytes actually arrive, so a corrupt length
/// fails as truncated input instead of reserving memory up front.
fn read_bytes(r: &mut dyn Read, len: u64, what: &str) -> Result<Vec<u8>, SnapshotError> {
    let mut buf = Vec::new();
    Read::take(&mut *r, len).read_to_end(&mut buf)?;
    if buf.len() as u64 != len {
        return Err(SnapshotError::Malformed {
            detail: format!("truncated {what}: got {} of {len} bytes", buf.len()),
        });
    }
    Ok(buf)
}

/// Read a length-prefixed UTF-8 string.
pub fn read_length_prefixed_str(r: &mut dyn Read) -> Result<String, SnapshotError> {
    let len = read_u32_le(r)?;
    let buf = read_bytes(r, u64::from(len), "string")?;
    String::from_utf8(buf).map_err(|e| SnapshotError::Malformed {
        detail: format!("invalid UTF-8 string: {e}"),
    })
}

/// Read `count` little-endian f32 values.
pub fn read_f32_vec(r: &mut dyn Read, count: usize) -> Result<Vec<f32>, SnapshotError> {
    let len = u64::try_from(count)
        .ok()
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(|| SnapshotError::Malformed {
            detail: format!("dataset of {count} elements is too large"),
        })?;
    let bytes = read_bytes(r, len, "dataset")?;
    Ok(bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

// ── Header ──────────────────────────────────────────────────────

/// Encode the container header (magic and version).
pub fn encode_header(w: &mut dyn Write) -> Result<(), SnapshotError> {
    w.write_all(&MAGIC)?;
    write_u8(w, FORMAT_VERSION)
}

/// Decode and validate the container header.
pub fn decode_header(r: &mut dyn Read) -> Result<(), SnapshotError> {
    let mut magic = [0u8; 4];
    r.read_exact(&mut magic)?;
    if magic != MAGIC {
        return Err(SnapshotError::InvalidMagic);
    }
    let version = read_u8(r)?;
    if version != FORMAT_VERSION {
        return Err(SnapshotError::UnsupportedVersion { found: version });
    }
    Ok(())
}

/// Encoded size of the container header in bytes.
pub const HEADER_LEN: u64 = MAGIC.len() as u64 + 1;

// ── Group header ────────────────────────────────────────────────

/// Everything in a group that precedes its data block.
#[derive(Clone, Debug, PartialEq)]
pub struct GroupHeader {
    /// Group name, `Timestep_<id>`.
    pub name: String,
    /// Value of the `Time` attribute.
    pub time: f64,
    /// Dataset rows.
    pub rows: u32,
    /// Dataset columns.
    pub cols: u32,
}

impl GroupHeader {
    /// Number of f32 elements in the group's data block, or `None` if it
    /// does not fit in `usize`.
    pub fn element_count(&self) -> Option<usize> {
        usize::try_from(u64::from(self.rows) * u64::from(self.cols)).ok()
    }

    /// Encoded size of this header in bytes.
    pub fn encoded_len(&self) -> u64 {
        let strings = [self.name.as_str(), TIME_ATTRIBUTE, DATASET_NAME];
        let string_bytes: u64 = strings.iter().map(|s| 4 + s.len() as u64).sum();
        // time f64 + dtype u8 + rows u32 + cols u32
        string_bytes + 8 + 1 + 4 + 4
    }
}

/// Encode a group header.
pub fn encode_group_header(w: &mut dyn Write, header: &GroupHeader) -> Result<(), SnapshotError> {
    write_length_prefixed_str(w, &header.name)?;
    write_length_prefixed_str(w, TIME_ATTRIBUTE)?;
    write_f64_le(w, header.time)?;
    write_length_prefixed_str(w, DATASET_NAME)?;
    write_u8(w, DTYPE_F32)?;
    write_u32_le(w, header.rows)?;
    write_u32_le(w, header.cols)
}

/// Decode the next group header, or `None` at a clean end of stream.
pub fn decode_group_header(r: &mut dyn Read) -> Result<Option<GroupHeader>, SnapshotError> {
    // Read the name length byte-by-byte to distinguish clean EOF
    // (zero bytes available) from truncation (1-3 bytes before EOF).
    let mut len_buf = [0u8; 4];
    let mut filled = 0;
    while filled < 4 {
        match r.read(&mut len_buf[filled..]) {
            Ok(0) => {
                if filled == 0 {
                    return Ok(None);
                }
                return Err(SnapshotError::Malformed {
                    detail: format!("truncated group header: got {filled} of 4 bytes"),
                });
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(SnapshotError::Io(e)),
        }
    }
    let name_len = u32::from_le_bytes(len_buf);
    let name = read_bytes(r, u64::from(name_len), "group name")?;
    let name = String::from_utf8(name).map_err(|e| SnapshotError::Malformed {
        detail: format!("invalid group name: {e}"),
    })?;

    expect_name(r, TIME_ATTRIBUTE)?;
    let time = read_f64_le(r)?;
    expect_name(r, DATASET_NAME)?;
    let dtype = read_u8(r)?;
    if dtype != DTYPE_F32 {
        return Err(SnapshotError::Malformed {
            detail: format!("unknown dataset dtype {dtype}"),
        });
    }
    let rows = read_u32_le(r)?;
    let cols = read_u32_le(r)?;
    Ok(Some(GroupHeader {
        name,
        time,
        rows,
        cols,
    }))
}

fn expect_name(r: &mut dyn Read, expected: &str) -> Result<(), SnapshotError> {
    let found = read_length_prefixed_str(r)?;
    if found != expected {
        return Err(SnapshotError::Malformed {
            detail: format!("expected {expected:?}, found {found:?}"),
        });
    }
    Ok(())
}
