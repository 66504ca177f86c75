//! Top-level error type for solver runs.

use std::error::Error;
use std::fmt;
use std::path::PathBuf;

use calor_comm::CommError;
use calor_core::MaterialError;
use calor_grid::PartitionError;
use calor_io::SnapshotError;

use crate::config::ConfigError;

/// Errors that end a solver run.
#[derive(Debug)]
pub enum RunError {
    /// The configuration was rejected before any work started.
    Config(ConfigError),
    /// Message passing between ranks failed.
    Comm(CommError),
    /// Writing a snapshot failed.
    Snapshot(SnapshotError),
    /// The coordinating rank could not create the snapshot container.
    /// Reported by every other rank so that all of them stop together.
    CreateFailed {
        /// Path of the container that could not be created.
        path: PathBuf,
    },
    /// A rank's worker thread pool could not be built.
    ThreadPool {
        /// Description from the pool builder.
        reason: String,
    },
    /// The background snapshot writer could not be started or died.
    Writer {
        /// Description of the failure.
        reason: String,
    },
}

impl RunError {
    /// Whether this error only reports that another rank went away.
    pub fn is_disconnect(&self) -> bool {
        matches!(self, Self::Comm(e) if e.is_disconnect())
    }
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "configuration: {e}"),
            Self::Comm(e) => write!(f, "communication: {e}"),
            Self::Snapshot(e) => write!(f, "snapshot: {e}"),
            Self::CreateFailed { path } => {
                write!(f, "could not create snapshot container {}", path.display())
            }
            Self::ThreadPool { reason } => write!(f, "thread pool: {reason}"),
            Self::Writer { reason } => write!(f, "snapshot writer: {reason}"),
        }
    }
}

impl Error for RunError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Comm(e) => Some(e),
            Self::Snapshot(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for RunError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<PartitionError> for RunError {
    fn from(e: PartitionError) -> Self {
        Self::Config(ConfigError::Partition(e))
    }
}

impl From<MaterialError> for RunError {
    fn from(e: MaterialError) -> Self {
        Self::Config(ConfigError::Material(e))
    }
}

impl From<CommError> for RunError {
    fn from(e: CommError) -> Self {
        Self::Comm(e)
    }
}

impl From<SnapshotError> for RunError {
    fn from(e: SnapshotError) -> Self {
        Self::Snapshot(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calor_core::Rank;

    #[test]
    fn disconnects_are_recognised() {
        let e: RunError = CommError::Disconnected { peer: Rank(2) }.into();
        assert!(e.is_disconnect());
        let e: RunError = CommError::RankPanicked { rank: Rank(2) }.into();
        assert!(!e.is_disconnect());
    }

    #[test]
    fn source_chain_reaches_partition() {
        let e: RunError = PartitionError::ZeroProcesses.into();
        let src = e.source().expect("config source");
        assert!(src.source().is_some());
    }
}
