//! Domain-decomposed solver.
//!
//! [`run_distributed`] validates the configuration, spawns one rank per
//! tile, and returns what the coordinating rank gathered. Each rank runs
//! [`SimulationContext::run_rank`]:
//!
//! 1. scatter the initial field and the material;
//! 2. exchange all three halos once, then copy `current` into `next`;
//! 3. iterate: post receives, compute and send border strips, compute the
//!    inner region, complete receives, reduce, snapshot, swap;
//! 4. gather the final field.

use std::path::{Path, PathBuf};
use std::time::Instant;

use calor_comm::{launch, Communicator, CommError};
use calor_core::{MaterialProperties, SnapshotId, ROOT};
use calor_grid::{Partition, Tile};
use calor_io::{SnapshotFile, SnapshotSlot, TileWriter};

use crate::config::{IoMode, SimulationParams};
use crate::distribute::{gather_field, scatter_tile, TileMaterial};
use crate::error::RunError;
use crate::exchange::{HaloExchange, HaloField};
use crate::kernel::{worker_pool, Cooling, Stencil};
use crate::outcome::DistributedOutcome;
use crate::progress::{tile_middle_column_sum, ProgressReporter};
use crate::sequential::output_name;
use crate::snapshot::SnapshotSink;

/// Everything a rank needs to run, shared read-only by all ranks.
#[derive(Debug)]
pub struct SimulationContext<'a> {
    params: &'a SimulationParams,
    partition: Partition,
    cooling: Cooling,
    output: Option<PathBuf>,
}

/// Snapshot output as seen by one rank.
enum RankOutput {
    /// No snapshots.
    Disabled,
    /// Gather to the coordinating rank, which holds the sink.
    Gathered(Option<SnapshotSink>),
    /// Every rank writes its own tile; the coordinating rank also owns
    /// the container and reserves each snapshot's block.
    Direct {
        container: Option<SnapshotFile>,
        tiles: TileWriter,
    },
}

/// What the coordinating rank opened before telling the others.
enum Created {
    Sink(SnapshotSink),
    Container(SnapshotFile),
}

impl<'a> SimulationContext<'a> {
    /// Validate `params` against `material` and fix the decomposition.
    pub fn new(
        material: &MaterialProperties,
        params: &'a SimulationParams,
    ) -> Result<Self, RunError> {
        let partition = params.partition(material.edge_size())?;
        Ok(Self {
            params,
            partition,
            cooling: Cooling {
                air_flow_rate: params.air_flow_rate,
                cooler_temp: material.cooler_temp(),
            },
            output: params.output_for("par"),
        })
    }

    /// The decomposition in use.
    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    /// Container path for this run, if snapshots are enabled.
    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }

    /// Body of one rank. `material` is only read on the coordinating rank.
    ///
    /// Returns the outcome on the coordinating rank and `None` elsewhere.
    pub fn run_rank(
        &self,
        mut comm: Communicator,
        material: Option<&MaterialProperties>,
    ) -> Result<Option<DistributedOutcome>, RunError> {
        let rank = comm.rank();
        let tile = self.partition.tile(rank).ok_or(CommError::InvalidRank {
            rank,
            size: self.partition.process_count(),
        })?;
        let layout = tile.layout();
        let stride = layout.stride();
        let edge = self.partition.edge_size();
        let is_root = rank.is_root();

        let (mut buffers, local) = scatter_tile(&mut comm, &self.partition, &tile, material)?;
        let TileMaterial {
            params: mut local_params,
            map: mut local_map,
        } = local;

        let mut exchange = HaloExchange::new(&tile);
        exchange.exchange_blocking(&mut comm, HaloField::Temperature, buffers.current_mut())?;
        exchange.exchange_blocking(&mut comm, HaloField::Conductance, &mut local_params)?;
        exchange.exchange_blocking(&mut comm, HaloField::Map, &mut local_map)?;
        buffers.sync_next();

        let label = format!("calor-rank-{rank}");
        let pool = worker_pool(self.params.threads_per_rank, &label).map_err(|e| {
            RunError::ThreadPool {
                reason: e.to_string(),
            }
        })?;
        let mut output = self.open_output(&mut comm)?;
        let mut progress =
            ProgressReporter::new(self.params.iterations, is_root && !self.params.batch_mode);
        let inner = tile.inner_region();
        let mut middle_column_avg = 0.0;

        comm.barrier()?;
        let start = Instant::now();
        for iteration in 0..self.params.iterations {
            exchange.post_receives(&comm)?;
            {
                let (current, next) = buffers.split();
                let stencil = Stencil {
                    temp: current,
                    params: &local_params,
                    map: &local_map,
                    stride,
                    cooling: self.cooling,
                };
                for n in exchange.neighbours() {
                    stencil.sweep(n.compute, next);
                }
                exchange.send_borders(&comm, next)?;
                stencil.sweep_parallel(inner, next, pool.as_ref());
                exchange.complete(&mut comm, next)?;
            }

            let local_sum = tile_middle_column_sum(&tile, buffers.next());
            if let Some(total) = comm.reduce_sum(ROOT, local_sum)? {
                middle_column_avg = total / edge as f32;
            }

            if let Some(id) = SnapshotId::for_iteration(iteration, self.params.disk_write_intensity)
            {
                self.write_snapshot(&mut comm, &tile, &mut output, id, iteration, buffers.next())?;
            }

            buffers.swap();
            progress.observe(iteration, middle_column_avg);
        }
        let elapsed = start.elapsed();

        self.close_output(output)?;
        let field = gather_field(&mut comm, &self.partition, &tile, buffers.current())?;
        Ok(field.map(|field| DistributedOutcome {
            field,
            middle_column_avg,
            elapsed,
            iterations: self.params.iterations,
            partition: self.partition,
        }))
    }

    /// Create the container on the coordinating rank and tell every rank
    /// whether that worked, so that a failure stops all of them.
    fn open_output(&self, comm: &mut Communicator) -> Result<RankOutput, RunError> {
        let Some(path) = self.output.as_deref() else {
            return Ok(RankOutput::Disabled);
        };
        let mode = self.params.io_mode;
        let created = comm.rank().is_root().then(|| -> Result<Created, RunError> {
            match mode {
                IoMode::Parallel => Ok(Created::Container(SnapshotFile::create(path)?)),
                IoMode::Serial | IoMode::SerialOverlapped => {
                    Ok(Created::Sink(SnapshotSink::create(Some(path), mode)?))
                }
            }
        });
        let ok = matches!(created, Some(Ok(_)));
        let status = comm.broadcast(ROOT, vec![u8::from(ok)])?;
        let created = created.transpose()?;
        if status.first() != Some(&1) {
            return Err(RunError::CreateFailed {
                path: path.to_path_buf(),
            });
        }
        Ok(match (mode, created) {
            (IoMode::Parallel, created) => RankOutput::Direct {
                container: match created {
                    Some(Created::Container(file)) => Some(file),
                    _ => None,
                },
                tiles: TileWriter::open(path)?,
            },
            (_, Some(Created::Sink(sink))) => RankOutput::Gathered(Some(sink)),
            (_, _) => RankOutput::Gathered(None),
        })
    }

    fn write_snapshot(
        &self,
        comm: &mut Communicator,
        tile: &Tile,
        output: &mut RankOutput,
        id: SnapshotId,
        iteration: usize,
        next: &[f32],
    ) -> Result<(), RunError> {
        let edge = self.partition.edge_size();
        match output {
            RankOutput::Disabled => Ok(()),
            RankOutput::Gathered(sink) => {
                let field = gather_field(comm, &self.partition, tile, next)?;
                if let (Some(sink), Some(field)) = (sink.as_mut(), field) {
                    sink.write(id, iteration as u64, &field, edge)?;
                }
                Ok(())
            }
            RankOutput::Direct { container, tiles } => {
                let reserved = match container.as_mut() {
                    Some(file) => {
                        let slot = file.begin_snapshot(id, iteration as u64, edge)?;
                        vec![slot.data_offset]
                    }
                    None => Vec::new(),
                };
                let offset = comm.broadcast(ROOT, reserved)?;
                let data_offset = offset.first().copied().ok_or(CommError::LengthMismatch {
                    expected: 1,
                    got: 0,
                })?;
                let slot = SnapshotSlot {
                    data_offset,
                    rows: edge,
                    cols: edge,
                };
                let layout = tile.layout();
                tiles.write_tile(
                    &slot,
                    next,
                    layout.stride(),
                    layout.interior(),
                    tile.global_origin(),
                )?;
                tiles.sync()?;
                comm.barrier()?;
                log::debug!("rank {} wrote its tile of snapshot {id}", comm.rank());
                Ok(())
            }
        }
    }

    fn close_output(&self, output: RankOutput) -> Result<(), RunError> {
        match output {
            RankOutput::Disabled | RankOutput::Gathered(None) => Ok(()),
            RankOutput::Gathered(Some(sink)) => sink.finish().map(|_| ()),
            RankOutput::Direct { container, .. } => {
                if let Some(file) = container {
                    file.close()?;
                }
                Ok(())
            }
        }
    }
}

/// Run the distributed solver with `params.process_count` ranks.
///
/// Configuration errors are reported before any rank starts. When a rank
/// fails, the first error that is not merely a disconnect is returned.
/// In batch mode the summary line is logged at info level; see
/// [`SimulationParams::batch_mode`].
pub fn run_distributed(
    material: &MaterialProperties,
    params: &SimulationParams,
) -> Result<DistributedOutcome, RunError> {
    let ctx = SimulationContext::new(material, params)?;
    let partition = ctx.partition;
    if !params.batch_mode {
        log::info!(
            "starting distributed simulation: {} ranks as {}x{} tiles of {}x{}, {} I/O",
            partition.process_count(),
            partition.rows(),
            partition.cols(),
            partition.tile_height(),
            partition.tile_width(),
            params.io_mode
        );
    }

    let results = launch(partition.process_count(), |comm| {
        let root_material = comm.rank().is_root().then_some(material);
        let result = ctx.run_rank(comm, root_material);
        if let Err(e) = &result {
            if !e.is_disconnect() {
                log::error!("rank failed: {e}");
            }
        }
        result
    });

    let mut outcome = None;
    let mut first_disconnect = None;
    let mut root_cause = None;
    for result in results {
        match result {
            Ok(Some(o)) => outcome = Some(o),
            Ok(None) => {}
            Err(e) if e.is_disconnect() => {
                first_disconnect.get_or_insert(e);
            }
            Err(e) => {
                root_cause.get_or_insert(e);
            }
        }
    }
    if let Some(e) = root_cause.or(first_disconnect) {
        return Err(e);
    }
    let outcome = outcome.ok_or(CommError::Disconnected { peer: ROOT })?;

    if params.batch_mode {
        log::info!("{}", outcome.summary(output_name(ctx.output())));
    } else {
        log::info!(
            "distributed run finished in {:.5} s",
            outcome.elapsed.as_secs_f64()
        );
    }
    Ok(outcome)
}
