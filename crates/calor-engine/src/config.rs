//! Run configuration, validation, and error types.
//!
//! [`SimulationParams`] describes one run of either solver.
//! [`validate()`](SimulationParams::validate) checks every scalar before
//! any rank is spawned, so a bad configuration aborts the whole run with
//! no partial progress.

use std::error::Error;
use std::fmt;
use std::path::{Path, PathBuf};

use calor_core::MaterialError;
use calor_grid::{Partition, PartitionError};

use crate::verify::DEFAULT_TOLERANCE;

// ── IoMode ─────────────────────────────────────────────────────────

/// How snapshots reach the container.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum IoMode {
    /// Gather to the coordinating rank, which writes each snapshot inline.
    #[default]
    Serial,
    /// Gather to the coordinating rank and hand the field to a background
    /// writer thread, overlapping the write with the next iterations.
    SerialOverlapped,
    /// Every rank writes its own tile into a block reserved by the
    /// coordinating rank. The sequential solver treats this as `Serial`.
    Parallel,
}

impl fmt::Display for IoMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Serial => write!(f, "serial"),
            Self::SerialOverlapped => write!(f, "serial-overlapped"),
            Self::Parallel => write!(f, "parallel"),
        }
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`SimulationParams::validate()`] and
/// decomposition.
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// A scalar parameter is out of range.
    InvalidParameter {
        /// Field name in [`SimulationParams`].
        name: &'static str,
        /// What is wrong with it.
        reason: String,
    },
    /// The grid cannot be tiled for the requested ranks.
    Partition(PartitionError),
    /// The material description is invalid.
    Material(MaterialError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameter { name, reason } => write!(f, "invalid {name}: {reason}"),
            Self::Partition(e) => write!(f, "partition: {e}"),
            Self::Material(e) => write!(f, "material: {e}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Partition(e) => Some(e),
            Self::Material(e) => Some(e),
            Self::InvalidParameter { .. } => None,
        }
    }
}

impl From<PartitionError> for ConfigError {
    fn from(e: PartitionError) -> Self {
        Self::Partition(e)
    }
}

impl From<MaterialError> for ConfigError {
    fn from(e: MaterialError) -> Self {
        Self::Material(e)
    }
}

// ── SimulationParams ───────────────────────────────────────────────

/// Parameters of one simulation run.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationParams {
    /// Number of stencil sweeps. Default: 100.
    pub iterations: usize,
    /// Fraction of an air cell's value replaced by the cooler temperature
    /// each sweep, in `[0, 1]`. Default: 0.05.
    pub air_flow_rate: f32,
    /// Iterations between snapshots; iteration 0 is always a snapshot.
    /// Default: 50.
    pub disk_write_intensity: usize,
    /// Produce only a [`RunSummary`](crate::RunSummary) line instead of
    /// progress logging. Default: false.
    ///
    /// The line is emitted through `log::info!`, so it is only visible when
    /// the installed logger lets info records through (`RUST_LOG=info` with
    /// env_logger). Callers that need it on stdout print the outcome's
    /// `summary(..)` themselves.
    pub batch_mode: bool,
    /// Number of ranks for the distributed solver. Default: 1.
    pub process_count: usize,
    /// Worker threads per rank for the interior sweep. Default: 1.
    pub threads_per_rank: usize,
    /// Explicit `(rows, cols)` tiling; `None` picks the most square one.
    pub decomposition: Option<(usize, usize)>,
    /// Snapshot output mode. Default: [`IoMode::Serial`].
    pub io_mode: IoMode,
    /// Base path for snapshot containers; `None` disables snapshots.
    pub output_path: Option<PathBuf>,
    /// Per-cell absolute tolerance for verification.
    /// Default: [`DEFAULT_TOLERANCE`].
    pub tolerance: f32,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            iterations: 100,
            air_flow_rate: 0.05,
            disk_write_intensity: 50,
            batch_mode: false,
            process_count: 1,
            threads_per_rank: 1,
            decomposition: None,
            io_mode: IoMode::Serial,
            output_path: None,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

fn invalid(name: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidParameter {
        name,
        reason: reason.into(),
    }
}

impl SimulationParams {
    /// Check scalar invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.air_flow_rate.is_finite() || !(0.0..=1.0).contains(&self.air_flow_rate) {
            return Err(invalid(
                "air_flow_rate",
                format!("must be in [0, 1], got {}", self.air_flow_rate),
            ));
        }
        if self.disk_write_intensity == 0 {
            return Err(invalid("disk_write_intensity", "must be at least 1"));
        }
        if self.process_count == 0 {
            return Err(invalid("process_count", "must be at least 1"));
        }
        if self.threads_per_rank == 0 {
            return Err(invalid("threads_per_rank", "must be at least 1"));
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(invalid(
                "tolerance",
                format!("must be finite and non-negative, got {}", self.tolerance),
            ));
        }
        if let Some((rows, cols)) = self.decomposition {
            if rows.checked_mul(cols) != Some(self.process_count) {
                return Err(invalid(
                    "decomposition",
                    format!(
                        "{rows}x{cols} tiles do not match {} processes",
                        self.process_count
                    ),
                ));
            }
        }
        Ok(())
    }

    /// Validate and tile an `edge × edge` grid for this run.
    pub fn partition(&self, edge: usize) -> Result<Partition, ConfigError> {
        self.validate()?;
        let partition = match self.decomposition {
            Some((rows, cols)) => Partition::with_shape(edge, rows, cols)?,
            None => Partition::new(edge, self.process_count)?,
        };
        Ok(partition)
    }

    /// Container path for one solver, or `None` if snapshots are off.
    pub fn output_for(&self, variant: &str) -> Option<PathBuf> {
        self.output_path
            .as_deref()
            .map(|base: &Path| calor_io::derive_output_path(base, variant))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(SimulationParams::default().validate().is_ok());
    }

    #[test]
    fn air_flow_rate_out_of_range() {
        for bad in [-0.1, 1.5, f32::NAN] {
            let p = SimulationParams {
                air_flow_rate: bad,
                ..Default::default()
            };
            match p.validate() {
                Err(ConfigError::InvalidParameter { name, .. }) => {
                    assert_eq!(name, "air_flow_rate")
                }
                other => panic!("expected InvalidParameter, got {other:?}"),
            }
        }
    }

    #[test]
    fn zero_counts_rejected() {
        let cases = [
            (
                SimulationParams {
                    disk_write_intensity: 0,
                    ..Default::default()
                },
                "disk_write_intensity",
            ),
            (
                SimulationParams {
                    process_count: 0,
                    ..Default::default()
                },
                "process_count",
            ),
            (
                SimulationParams {
                    threads_per_rank: 0,
                    ..Default::default()
                },
                "threads_per_rank",
            ),
        ];
        for (params, field) in cases {
            match params.validate() {
                Err(ConfigError::InvalidParameter { name, .. }) => assert_eq!(name, field),
                other => panic!("expected InvalidParameter({field}), got {other:?}"),
            }
        }
    }

    #[test]
    fn decomposition_must_match_process_count() {
        let p = SimulationParams {
            process_count: 4,
            decomposition: Some((2, 3)),
            ..Default::default()
        };
        match p.validate() {
            Err(ConfigError::InvalidParameter { name, .. }) => assert_eq!(name, "decomposition"),
            other => panic!("expected InvalidParameter, got {other:?}"),
        }
    }

    #[test]
    fn partition_uses_explicit_shape() {
        let p = SimulationParams {
            process_count: 4,
            decomposition: Some((1, 4)),
            ..Default::default()
        };
        let part = p.partition(16).unwrap();
        assert_eq!((part.rows(), part.cols()), (1, 4));
    }

    #[test]
    fn partition_error_wrapped() {
        let p = SimulationParams {
            process_count: 3,
            ..Default::default()
        };
        match p.partition(8) {
            Err(ConfigError::Partition(PartitionError::NoValidShape { .. })) => {}
            other => panic!("expected Partition(NoValidShape), got {other:?}"),
        }
    }

    #[test]
    fn output_paths_per_variant() {
        let p = SimulationParams {
            output_path: Some(PathBuf::from("out/run.snap")),
            ..Default::default()
        };
        assert_eq!(p.output_for("seq"), Some(PathBuf::from("out/run_seq.snap")));
        assert_eq!(SimulationParams::default().output_for("par"), None);
    }
}
