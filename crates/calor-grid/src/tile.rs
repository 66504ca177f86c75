//! Per-rank tile geometry: padded layout, compute ranges, neighbours.

use std::ops::Range;

use calor_core::{Rank, HALO};
use smallvec::SmallVec;

use crate::direction::{Direction, Neighbour};
use crate::partition::{Partition, TilePosition};
use crate::region::Region;

/// Storage layout of a tile: `height × width` interior cells surrounded
/// by a [`HALO`]-wide border on every side.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileLayout {
    height: usize,
    width: usize,
}

impl TileLayout {
    /// Layout for an interior of `height × width` cells.
    pub fn new(height: usize, width: usize) -> Self {
        Self { height, width }
    }

    /// Interior height.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Interior width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Padded height (`height + 2 * HALO`).
    pub fn padded_height(&self) -> usize {
        self.height + 2 * HALO
    }

    /// Padded width, which is also the row stride of tile storage.
    pub fn stride(&self) -> usize {
        self.width + 2 * HALO
    }

    /// Number of stored cells including the halo.
    pub fn padded_len(&self) -> usize {
        self.padded_height() * self.stride()
    }

    /// Flat storage index of padded coordinate `(i, j)`.
    pub fn index(&self, i: usize, j: usize) -> usize {
        i * self.stride() + j
    }

    /// The interior (non-halo) region.
    pub fn interior(&self) -> Region {
        Region::new(HALO, HALO, self.height, self.width)
    }
}

/// One rank's tile within a [`Partition`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tile {
    partition: Partition,
    position: TilePosition,
    layout: TileLayout,
}

impl Tile {
    pub(crate) fn new(partition: Partition, position: TilePosition) -> Self {
        Self {
            partition,
            position,
            layout: partition.layout(),
        }
    }

    /// Position in the decomposition grid.
    pub fn position(&self) -> TilePosition {
        self.position
    }

    /// The decomposition this tile belongs to.
    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    /// Owning rank.
    pub fn rank(&self) -> Rank {
        self.partition.rank_of(self.position)
    }

    /// Padded storage layout.
    pub fn layout(&self) -> TileLayout {
        self.layout
    }

    /// Global `(x, y)` offset of the interior's top-left cell.
    pub fn global_origin(&self) -> (usize, usize) {
        let region = self.partition.global_region(self.position);
        (region.col, region.row)
    }

    /// Rank of the neighbour in `dir`, or `None` at the domain edge.
    pub fn neighbour_rank(&self, dir: Direction) -> Option<Rank> {
        let TilePosition { row, col } = self.position;
        let pos = match dir {
            Direction::Left => TilePosition {
                row,
                col: col.checked_sub(1)?,
            },
            Direction::Right if col + 1 < self.partition.cols() => TilePosition {
                row,
                col: col + 1,
            },
            Direction::Top => TilePosition {
                row: row.checked_sub(1)?,
                col,
            },
            Direction::Bottom if row + 1 < self.partition.rows() => TilePosition {
                row: row + 1,
                col,
            },
            Direction::Right | Direction::Bottom => return None,
        };
        Some(self.partition.rank_of(pos))
    }

    /// Padded rows updated by the stencil.
    ///
    /// Tiles on the global top/bottom edge skip the outermost `HALO`
    /// interior rows: those cells form the fixed boundary ring.
    pub fn compute_rows(&self) -> Range<usize> {
        let h = self.layout.height;
        let start = if self.position.row == 0 { 2 * HALO } else { HALO };
        let end = if self.position.row + 1 == self.partition.rows() {
            h
        } else {
            h + HALO
        };
        start..end.max(start)
    }

    /// Padded columns updated by the stencil (see [`compute_rows`](Self::compute_rows)).
    pub fn compute_cols(&self) -> Range<usize> {
        let w = self.layout.width;
        let start = if self.position.col == 0 { 2 * HALO } else { HALO };
        let end = if self.position.col + 1 == self.partition.cols() {
            w
        } else {
            w + HALO
        };
        start..end.max(start)
    }

    /// The part of the tile whose stencil never touches the halo, and
    /// so can be computed while halo messages are in flight.
    pub fn inner_region(&self) -> Region {
        let h = self.layout.height;
        let w = self.layout.width;
        Region::from_ranges(2 * HALO..h.max(2 * HALO), 2 * HALO..w.max(2 * HALO))
    }

    /// Exchange records for every existing neighbour, in
    /// [`Direction::ALL`] order.
    pub fn neighbours(&self) -> SmallVec<[Neighbour; 4]> {
        Direction::ALL
            .into_iter()
            .filter_map(|dir| {
                self.neighbour_rank(dir)
                    .map(|peer| self.neighbour_record(dir, peer))
            })
            .collect()
    }

    fn neighbour_record(&self, direction: Direction, peer: Rank) -> Neighbour {
        let h = self.layout.height;
        let w = self.layout.width;
        let rows = self.compute_rows();
        let cols = self.compute_cols();
        let (send, recv) = match direction {
            Direction::Left => (
                Region::new(HALO, HALO, h, HALO),
                Region::new(HALO, 0, h, HALO),
            ),
            Direction::Right => (
                Region::new(HALO, w, h, HALO),
                Region::new(HALO, w + HALO, h, HALO),
            ),
            Direction::Top => (
                Region::new(HALO, HALO, HALO, w),
                Region::new(0, HALO, HALO, w),
            ),
            Direction::Bottom => (
                Region::new(h, HALO, HALO, w),
                Region::new(h + HALO, HALO, HALO, w),
            ),
        };
        // Thin tiles on a domain edge may have part of a send strip in the
        // fixed boundary ring; those cells are sent but never computed.
        let compute = Region::from_ranges(clip(send.rows(), &rows), clip(send.cols(), &cols));
        Neighbour {
            direction,
            peer,
            compute,
            send,
            recv,
        }
    }
}

fn clip(range: Range<usize>, bound: &Range<usize>) -> Range<usize> {
    let start = range.start.max(bound.start);
    let end = range.end.min(bound.end);
    start..end.max(start)
}
