//! Error types for the message-passing runtime.

use calor_core::Rank;
use std::fmt;

/// Errors from point-to-point and collective communication.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommError {
    /// A rank outside `0..size` was addressed.
    InvalidRank {
        /// The offending rank.
        rank: Rank,
        /// Size of the group.
        size: usize,
    },
    /// The peer exited before the operation could complete.
    Disconnected {
        /// The rank that went away.
        peer: Rank,
    },
    /// A message carried a different element type than requested.
    PayloadType {
        /// Element type the receiver asked for.
        expected: &'static str,
        /// Element type actually received.
        got: &'static str,
    },
    /// A message or buffer had the wrong number of elements.
    LengthMismatch {
        /// Required number of elements.
        expected: usize,
        /// Number of elements supplied.
        got: usize,
    },
    /// The root of a scatter or gather was given no global buffer.
    MissingRootData,
    /// A rank's thread panicked.
    RankPanicked {
        /// The rank that panicked.
        rank: Rank,
    },
    /// A rank's thread could not be started.
    SpawnFailed {
        /// The rank that never started.
        rank: Rank,
        /// OS error description.
        reason: String,
    },
}

impl CommError {
    /// Whether this error only reports that some other rank went away.
    ///
    /// Such errors are consequences, not causes: when one rank fails,
    /// every rank waiting on it observes a disconnect.
    pub fn is_disconnect(&self) -> bool {
        matches!(self, Self::Disconnected { .. })
    }
}

impl fmt::Display for CommError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRank { rank, size } => {
                write!(f, "rank {rank} out of range for group of {size}")
            }
            Self::Disconnected { peer } => write!(f, "rank {peer} disconnected"),
            Self::PayloadType { expected, got } => {
                write!(f, "expected {expected} payload, received {got}")
            }
            Self::LengthMismatch { expected, got } => {
                write!(f, "expected {expected} elements, got {got}")
            }
            Self::MissingRootData => write!(f, "root rank has no global buffer"),
            Self::RankPanicked { rank } => write!(f, "rank {rank} panicked"),
            Self::SpawnFailed { rank, reason } => {
                write!(f, "failed to start rank {rank}: {reason}")
            }
        }
    }
}

impl std::error::Error for CommError {}
