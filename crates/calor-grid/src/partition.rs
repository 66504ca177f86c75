//! Grid partitioner: chooses the `rows × cols` tiling of the global grid.

use calor_core::{Rank, HALO};

use crate::error::PartitionError;
use crate::region::Region;
use crate::tile::{Tile, TileLayout};

/// Row/column index of a tile in the decomposition grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TilePosition {
    /// Tile row (0 = top).
    pub row: usize,
    /// Tile column (0 = left).
    pub col: usize,
}

/// A validated tiling of an `edge × edge` grid into `rows × cols` tiles.
///
/// Ranks map to tiles row-major: rank `r` owns the tile at
/// `(r / cols, r % cols)`.
///
/// # Examples
///
/// ```
/// use calor_grid::Partition;
///
/// let p = Partition::new(8, 4).unwrap();
/// assert_eq!((p.rows(), p.cols()), (2, 2));
/// assert_eq!((p.tile_height(), p.tile_width()), (4, 4));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Partition {
    edge_size: usize,
    rows: usize,
    cols: usize,
}

impl Partition {
    /// Choose the most-square tiling of `edge_size` for `processes` ranks.
    ///
    /// Among all factor pairs `rows * cols == processes` that divide the
    /// edge evenly into tiles of at least `HALO × HALO` cells, picks the
    /// one whose tiles are closest to square. Ties go to the taller
    /// arrangement (`rows >= cols`). A perfect-square process count on a
    /// divisible grid therefore yields a `√P × √P` tiling.
    pub fn new(edge_size: usize, processes: usize) -> Result<Self, PartitionError> {
        if processes == 0 {
            return Err(PartitionError::ZeroProcesses);
        }
        if edge_size == 0 {
            return Err(PartitionError::EmptyGrid);
        }

        let mut best: Option<(usize, usize, usize)> = None;
        for rows in (1..=processes).filter(|r| processes % r == 0) {
            let cols = processes / rows;
            if Self::check(edge_size, rows, cols).is_err() {
                continue;
            }
            let score = (edge_size / rows).abs_diff(edge_size / cols);
            let better = match best {
                None => true,
                Some((_, _, best_score)) => {
                    score < best_score || (score == best_score && rows >= cols)
                }
            };
            if better {
                best = Some((rows, cols, score));
            }
        }

        best.map(|(rows, cols, _)| Self {
            edge_size,
            rows,
            cols,
        })
        .ok_or(PartitionError::NoValidShape {
            edge_size,
            processes,
        })
    }

    /// Use a caller-chosen `rows × cols` tiling, validating divisibility.
    pub fn with_shape(edge_size: usize, rows: usize, cols: usize) -> Result<Self, PartitionError> {
        if rows == 0 || cols == 0 {
            return Err(PartitionError::ZeroProcesses);
        }
        if edge_size == 0 {
            return Err(PartitionError::EmptyGrid);
        }
        Self::check(edge_size, rows, cols)?;
        Ok(Self {
            edge_size,
            rows,
            cols,
        })
    }

    fn check(edge_size: usize, rows: usize, cols: usize) -> Result<(), PartitionError> {
        if edge_size % rows != 0 || edge_size % cols != 0 {
            return Err(PartitionError::IndivisibleEdge {
                edge_size,
                rows,
                cols,
            });
        }
        let (tile_height, tile_width) = (edge_size / rows, edge_size / cols);
        if tile_height < HALO || tile_width < HALO {
            return Err(PartitionError::TileTooSmall {
                tile_height,
                tile_width,
            });
        }
        Ok(())
    }

    /// Global grid edge size.
    pub fn edge_size(&self) -> usize {
        self.edge_size
    }

    /// Number of tile rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of tile columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of ranks this tiling needs.
    pub fn process_count(&self) -> usize {
        self.rows * self.cols
    }

    /// Interior height of every tile.
    pub fn tile_height(&self) -> usize {
        self.edge_size / self.rows
    }

    /// Interior width of every tile.
    pub fn tile_width(&self) -> usize {
        self.edge_size / self.cols
    }

    /// Padded storage layout shared by every tile.
    pub fn layout(&self) -> TileLayout {
        TileLayout::new(self.tile_height(), self.tile_width())
    }

    /// Tile position owned by `rank`, or `None` if the rank is out of range.
    pub fn position(&self, rank: Rank) -> Option<TilePosition> {
        (rank.0 < self.process_count()).then(|| TilePosition {
            row: rank.0 / self.cols,
            col: rank.0 % self.cols,
        })
    }

    /// Rank owning the tile at `pos`.
    pub fn rank_of(&self, pos: TilePosition) -> Rank {
        Rank(pos.row * self.cols + pos.col)
    }

    /// Full tile description for `rank`.
    pub fn tile(&self, rank: Rank) -> Option<Tile> {
        self.position(rank).map(|pos| Tile::new(*self, pos))
    }

    /// The rectangle of the global `edge × edge` array owned by `pos`.
    pub fn global_region(&self, pos: TilePosition) -> Region {
        Region::new(
            pos.row * self.tile_height(),
            pos.col * self.tile_width(),
            self.tile_height(),
            self.tile_width(),
        )
    }

    /// Global regions of every rank, in rank order.
    pub fn global_regions(&self) -> Vec<Region> {
        (0..self.process_count())
            .filter_map(|r| self.position(Rank(r)))
            .map(|pos| self.global_region(pos))
            .collect()
    }

    /// Tile column containing the global middle column (`edge / 2`) and
    /// the interior column index of it within that tile.
    pub fn middle_column(&self) -> (usize, usize) {
        let mid = self.edge_size / 2;
        (mid / self.tile_width(), mid % self.tile_width())
    }
}
