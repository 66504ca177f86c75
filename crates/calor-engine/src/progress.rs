//! Middle-column statistic and progress reporting.
//!
//! The average temperature of the global middle column (`edge / 2`) is
//! monitoring output only; it never feeds back into the solvers.

use calor_core::HALO;
use calor_grid::Tile;

/// Sum of the global middle column over a whole `edge × edge` field.
pub fn middle_column_sum(field: &[f32], edge: usize) -> f32 {
    let mid = edge / 2;
    (0..edge).map(|i| field[i * edge + mid]).sum()
}

/// This tile's share of the middle-column sum, taken from the interior of
/// the padded buffer `padded`. Zero for tiles that miss the column.
pub fn tile_middle_column_sum(tile: &Tile, padded: &[f32]) -> f32 {
    let (owner_col, local_col) = tile.partition().middle_column();
    if tile.position().col != owner_col {
        return 0.0;
    }
    let layout = tile.layout();
    (HALO..HALO + layout.height())
        .map(|i| padded[layout.index(i, HALO + local_col)])
        .sum()
}

/// Logs progress at every tenth of the run.
#[derive(Debug)]
pub struct ProgressReporter {
    iterations: usize,
    next_mark: usize,
    enabled: bool,
}

impl ProgressReporter {
    /// Reporter for a run of `iterations`; `enabled = false` silences it
    /// (batch mode, or a non-coordinating rank).
    pub fn new(iterations: usize, enabled: bool) -> Self {
        Self {
            iterations,
            next_mark: 1,
            enabled,
        }
    }

    /// Whether `iteration` crosses the next tenth of the run.
    fn due(&self, iteration: usize) -> bool {
        let tenth = self.iterations.saturating_sub(1) as f32 / 10.0;
        iteration as f32 >= tenth * self.next_mark as f32
    }

    /// Record a finished iteration; logs when a tenth has been crossed.
    /// Returns whether a line was logged.
    pub fn observe(&mut self, iteration: usize, middle_column_avg: f32) -> bool {
        if !self.enabled || !self.due(iteration) {
            return false;
        }
        let percent = (iteration + 1) * 100 / self.iterations.max(1);
        log::info!("progress {percent}% (average temperature {middle_column_avg:.2} degrees)");
        self.next_mark += 1;
        true
    }
}
