//! Error types for snapshot containers.

use std::fmt;
use std::io;

/// Errors that can occur while writing or reading a snapshot container.
#[derive(Debug)]
pub enum SnapshotError {
    /// An I/O error occurred during read or write.
    Io(io::Error),
    /// The file does not start with the expected `b"CALR"` magic bytes.
    InvalidMagic,
    /// The format version is not supported by this build.
    UnsupportedVersion {
        /// The version found in the file.
        found: u8,
    },
    /// A group could not be decoded (truncated or corrupt data).
    Malformed {
        /// Human-readable description of what went wrong.
        detail: String,
    },
    /// A field buffer does not match the declared dimensions.
    ShapeMismatch {
        /// Number of elements the dimensions require.
        expected: usize,
        /// Number of elements supplied.
        got: usize,
    },
    /// A tile rectangle does not fit inside its snapshot's dataset.
    OutOfBounds {
        /// Tile origin `(x, y)` in global coordinates.
        origin: (usize, usize),
        /// Tile `(height, width)`.
        extent: (usize, usize),
        /// Dataset `(rows, cols)`.
        dataset: (usize, usize),
    },
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::InvalidMagic => write!(f, "invalid magic bytes (expected b\"CALR\")"),
            Self::UnsupportedVersion { found } => {
                write!(f, "unsupported format version {found}")
            }
            Self::Malformed { detail } => write!(f, "malformed snapshot: {detail}"),
            Self::ShapeMismatch { expected, got } => {
                write!(f, "field has {got} elements, dimensions require {expected}")
            }
            Self::OutOfBounds {
                origin,
                extent,
                dataset,
            } => write!(
                f,
                "tile {}x{} at (x={}, y={}) exceeds {}x{} dataset",
                extent.0, extent.1, origin.0, origin.1, dataset.0, dataset.1
            ),
        }
    }
}

impl std::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for SnapshotError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
