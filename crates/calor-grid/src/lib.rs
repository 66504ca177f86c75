//! Domain decomposition and tile geometry.
//!
//! A square grid of `edge × edge` cells is tiled into `rows × cols`
//! rectangles, one per rank. This crate answers every geometric question
//! the solver asks about that tiling:
//!
//! - [`Partition`] chooses and validates the tiling shape
//! - [`Tile`] describes one rank's tile: padded layout, compute ranges,
//!   global offset, and the [`Neighbour`] table for halo exchange
//! - [`Region`] is a rectangle inside a row-major array, with
//!   pack/unpack used for scatter, gather, and halo messages

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod direction;
pub mod error;
pub mod partition;
pub mod region;
pub mod tile;

pub use direction::{Direction, Neighbour};
pub use error::PartitionError;
pub use partition::{Partition, TilePosition};
pub use region::Region;
pub use tile::{Tile, TileLayout};
