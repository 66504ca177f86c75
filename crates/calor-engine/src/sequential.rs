//! Single-threaded reference solver.

use std::time::Instant;

use calor_core::{MaterialProperties, SnapshotId, HALO};
use calor_grid::Region;

use crate::config::SimulationParams;
use crate::error::RunError;
use crate::kernel::{worker_pool, Cooling, Stencil};
use crate::outcome::SequentialOutcome;
use crate::progress::{middle_column_sum, ProgressReporter};
use crate::snapshot::SnapshotSink;

/// Cells updated by the stencil on an `edge × edge` grid: everything but
/// the outer `HALO`-wide ring.
pub fn computed_region(edge: usize) -> Region {
    let end = edge.saturating_sub(HALO).max(HALO);
    Region::from_ranges(HALO..end, HALO..end)
}

/// Run `params.iterations` sweeps over the whole grid.
///
/// Snapshots, if enabled, go to `<output>_seq.<ext>`. With more than one
/// `threads_per_rank` the sweep is split across a worker pool. In batch
/// mode the summary line is logged at info level; see
/// [`SimulationParams::batch_mode`].
pub fn run_sequential(
    material: &MaterialProperties,
    params: &SimulationParams,
) -> Result<SequentialOutcome, RunError> {
    params.validate()?;
    let edge = material.edge_size();
    let region = computed_region(edge);
    let cooling = Cooling {
        air_flow_rate: params.air_flow_rate,
        cooler_temp: material.cooler_temp(),
    };
    let pool = worker_pool(params.threads_per_rank, "calor-seq").map_err(|e| {
        RunError::ThreadPool {
            reason: e.to_string(),
        }
    })?;

    let output = params.output_for("seq");
    let mut sink = SnapshotSink::create(output.as_deref(), params.io_mode)?;
    let mut progress = ProgressReporter::new(params.iterations, !params.batch_mode);
    if !params.batch_mode {
        log::info!(
            "starting sequential simulation ({edge}x{edge}, {} iterations)",
            params.iterations
        );
    }

    let mut current = material.init_temp().to_vec();
    let mut next = current.clone();
    let mut middle_column_avg = 0.0;

    let start = Instant::now();
    for iteration in 0..params.iterations {
        let stencil = Stencil {
            temp: &current,
            params: material.domain_params(),
            map: material.domain_map(),
            stride: edge,
            cooling,
        };
        stencil.sweep_parallel(region, &mut next, pool.as_ref());

        middle_column_avg = middle_column_sum(&next, edge) / edge as f32;

        if let Some(id) = SnapshotId::for_iteration(iteration, params.disk_write_intensity) {
            if sink.is_enabled() {
                sink.write(id, iteration as u64, &next, edge)?;
            }
        }

        std::mem::swap(&mut current, &mut next);
        progress.observe(iteration, middle_column_avg);
    }
    let elapsed = start.elapsed();
    let written = sink.finish()?;

    let outcome = SequentialOutcome {
        field: current,
        middle_column_avg,
        elapsed,
        iterations: params.iterations,
    };
    if params.batch_mode {
        let name = output_name(output.as_deref());
        log::info!("{}", outcome.summary(name));
    } else {
        log::info!(
            "sequential run finished in {:.5} s ({written} snapshots)",
            elapsed.as_secs_f64()
        );
    }
    Ok(outcome)
}

pub(crate) fn output_name(path: Option<&std::path::Path>) -> String {
    path.map(|p| p.display().to_string()).unwrap_or_default()
}
