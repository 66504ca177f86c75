//! Neighbour directions and the per-direction halo exchange record.

use calor_core::Rank;

use crate::region::Region;

/// One of the four logical neighbours of a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Tile to the west (same row, column - 1).
    Left,
    /// Tile to the east (same row, column + 1).
    Right,
    /// Tile to the north (row - 1, same column).
    Top,
    /// Tile to the south (row + 1, same column).
    Bottom,
}

impl Direction {
    /// All directions in exchange order.
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Top,
        Direction::Bottom,
    ];

    /// The direction pointing back.
    pub fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::Top => Self::Bottom,
            Self::Bottom => Self::Top,
        }
    }

    /// Stable index in `0..4`.
    pub fn index(self) -> usize {
        match self {
            Self::Left => 0,
            Self::Right => 1,
            Self::Top => 2,
            Self::Bottom => 3,
        }
    }
}

/// Everything a tile needs to exchange halo data with one neighbour.
///
/// All regions are in padded tile coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Neighbour {
    /// Where the neighbour lies.
    pub direction: Direction,
    /// Rank owning the neighbouring tile.
    pub peer: Rank,
    /// Border strip to compute before sending (clipped to the compute range).
    pub compute: Region,
    /// Border strip sent to the neighbour.
    pub send: Region,
    /// Halo strip filled by the neighbour's message.
    pub recv: Region,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_is_involution() {
        for d in Direction::ALL {
            assert_eq!(d.opposite().opposite(), d);
            assert_ne!(d.opposite(), d);
        }
    }

    #[test]
    fn indices_are_distinct() {
        let mut seen = [false; 4];
        for d in Direction::ALL {
            assert!(!seen[d.index()]);
            seen[d.index()] = true;
        }
    }
}
