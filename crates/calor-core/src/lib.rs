//! Core types for the Calor distributed heat solver.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the identifiers, constants, and material description shared by every
//! other crate in the workspace.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod material;

pub use error::MaterialError;
pub use id::{Rank, SnapshotId};
pub use material::MaterialProperties;

/// Width of the halo border on every side of a tile.
///
/// The stencil reaches two cells along each axis, so two rows/columns
/// of neighbour data are needed on each side.
pub const HALO: usize = 2;

/// Rank of the coordinating process.
pub const ROOT: Rank = Rank(0);
