//! Results of solver runs.

use std::fmt;
use std::time::Duration;

use calor_grid::Partition;

/// Result of [`run_sequential`](crate::run_sequential).
#[derive(Clone, Debug, PartialEq)]
pub struct SequentialOutcome {
    /// Final `edge × edge` field.
    pub field: Vec<f32>,
    /// Middle-column average after the last iteration.
    pub middle_column_avg: f32,
    /// Wall time of the iteration loop.
    pub elapsed: Duration,
    /// Number of iterations run.
    pub iterations: usize,
}

/// Result of [`run_distributed`](crate::run_distributed), as seen by the
/// coordinating rank.
#[derive(Clone, Debug, PartialEq)]
pub struct DistributedOutcome {
    /// Final field gathered from every tile.
    pub field: Vec<f32>,
    /// Middle-column average after the last iteration.
    pub middle_column_avg: f32,
    /// Wall time of the iteration loop on the coordinating rank.
    pub elapsed: Duration,
    /// Number of iterations run.
    pub iterations: usize,
    /// The decomposition used.
    pub partition: Partition,
}

impl SequentialOutcome {
    /// Batch-mode summary line for this run.
    pub fn summary(&self, output: impl Into<String>) -> RunSummary {
        RunSummary {
            output: output.into(),
            variant: "seq",
            middle_column_avg: self.middle_column_avg,
            elapsed: self.elapsed,
            iterations: self.iterations,
        }
    }
}

impl DistributedOutcome {
    /// Batch-mode summary line for this run.
    pub fn summary(&self, output: impl Into<String>) -> RunSummary {
        RunSummary {
            output: output.into(),
            variant: "par",
            middle_column_avg: self.middle_column_avg,
            elapsed: self.elapsed,
            iterations: self.iterations,
        }
    }
}

/// One machine-readable line describing a finished run.
///
/// Displays as `output;variant;avg;total_secs;secs_per_iteration`, with
/// both times in scientific notation.
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    /// Output file name (empty when snapshots were off).
    pub output: String,
    /// `seq` or `par`.
    pub variant: &'static str,
    /// Final middle-column average.
    pub middle_column_avg: f32,
    /// Total loop time.
    pub elapsed: Duration,
    /// Iterations run.
    pub iterations: usize,
}

impl RunSummary {
    /// Seconds per iteration, or zero for an empty run.
    pub fn seconds_per_iteration(&self) -> f64 {
        if self.iterations == 0 {
            0.0
        } else {
            self.elapsed.as_secs_f64() / self.iterations as f64
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{};{};{:.6};{:e};{:e}",
            self.output,
            self.variant,
            self.middle_column_avg,
            self.elapsed.as_secs_f64(),
            self.seconds_per_iteration()
        )
    }
}
