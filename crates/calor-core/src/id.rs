//! Strongly-typed identifiers.

use std::fmt;

/// Index of a participating process within a fixed-size group.
///
/// Rank 0 is the coordinating process (see [`ROOT`](crate::ROOT)).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rank(pub usize);

impl Rank {
    /// Whether this is the coordinating rank.
    pub fn is_root(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for Rank {
    fn from(v: usize) -> Self {
        Self(v)
    }
}

/// Identifies one stored snapshot of the temperature field.
///
/// Snapshot ids increase monotonically with the iteration that produced
/// them: `id = iteration / disk_write_intensity`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SnapshotId(pub u64);

impl SnapshotId {
    /// The snapshot id for `iteration`, or `None` if `iteration` is not a
    /// snapshot boundary. An `intensity` of zero never snapshots.
    pub fn for_iteration(iteration: usize, intensity: usize) -> Option<Self> {
        if intensity == 0 || iteration % intensity != 0 {
            return None;
        }
        Some(Self((iteration / intensity) as u64))
    }

    /// Name of the container group holding this snapshot.
    pub fn group_name(self) -> String {
        format!("Timestep_{}", self.0)
    }
}

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
