//! Snapshot container format for Calor heat-diffusion runs.
//!
//! A container is a single append-only file holding a sequence of named
//! groups, one per snapshot. Each group carries a `Time` attribute (the
//! iteration number) and a 2D `Temperature` dataset.
//!
//! # Writers
//!
//! - [`SnapshotWriter::write_full`] appends a complete field (serial mode).
//! - [`SnapshotWriter::begin_snapshot`] appends a group with a zero-filled
//!   data block and returns a [`SnapshotSlot`]; each rank then fills its own
//!   rectangle through a [`TileWriter`] (direct/parallel mode).
//!
//! Both paths produce byte-identical files for the same field.
//!
//! # Format
//!
//! ```text
//! [MAGIC "CALR"] [VERSION u8]
//! group*: [name str] ["Time" str] [time f64]
//!         ["Temperature" str] [dtype u8] [rows u32] [cols u32]
//!         [rows*cols f32]
//! ```
//!
//! All integers and floats are little-endian; strings are prefixed with a
//! `u32` byte length.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod error;
pub mod path;
pub mod reader;
pub mod tile;
pub mod writer;

pub use error::SnapshotError;
pub use path::derive_output_path;
pub use reader::{read_snapshots, Snapshot, SnapshotReader};
pub use tile::TileWriter;
pub use writer::{SnapshotFile, SnapshotSlot, SnapshotWriter};

/// Magic bytes at the start of every container.
pub const MAGIC: [u8; 4] = *b"CALR";

/// Current container format version.
pub const FORMAT_VERSION: u8 = 1;

/// Name of the per-group timestamp attribute.
pub const TIME_ATTRIBUTE: &str = "Time";

/// Name of the per-group field dataset.
pub const DATASET_NAME: &str = "Temperature";

/// Dataset element type tag for 32-bit floats.
pub const DTYPE_F32: u8 = 1;
