//! Error types for domain decomposition.

use std::fmt;

/// Errors arising while choosing or validating a tiling.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PartitionError {
    /// The process count is zero.
    ZeroProcesses,
    /// The grid edge size is zero.
    EmptyGrid,
    /// No `rows × cols` factorisation of the process count divides the
    /// grid evenly into tiles of at least `HALO × HALO` cells.
    NoValidShape {
        /// Grid edge size.
        edge_size: usize,
        /// Requested process count.
        processes: usize,
    },
    /// The grid edge is not divisible by the tile count along an axis.
    IndivisibleEdge {
        /// Grid edge size.
        edge_size: usize,
        /// Tiles along the vertical axis.
        rows: usize,
        /// Tiles along the horizontal axis.
        cols: usize,
    },
    /// A tile is thinner than the halo, so the stencil would need data
    /// from a tile two positions away.
    TileTooSmall {
        /// Interior tile height.
        tile_height: usize,
        /// Interior tile width.
        tile_width: usize,
    },
}

impl fmt::Display for PartitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroProcesses => write!(f, "process count must be at least 1"),
            Self::EmptyGrid => write!(f, "grid edge size must be at least 1"),
            Self::NoValidShape {
                edge_size,
                processes,
            } => write!(
                f,
                "no tiling of {processes} processes divides a {edge_size}x{edge_size} grid"
            ),
            Self::IndivisibleEdge {
                edge_size,
                rows,
                cols,
            } => write!(
                f,
                "edge size {edge_size} is not divisible by a {rows}x{cols} tiling"
            ),
            Self::TileTooSmall {
                tile_height,
                tile_width,
            } => write!(
                f,
                "tile {tile_height}x{tile_width} is smaller than the halo width {}",
                calor_core::HALO
            ),
        }
    }
}

impl std::error::Error for PartitionError {}
