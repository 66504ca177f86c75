//! Calor: a domain-decomposed 2D heat-diffusion stencil solver.
//!
//! This is the facade crate that re-exports the public API of every Calor
//! sub-crate. Most users only need `calor` as a dependency.
//!
//! # Quick start
//!
//! ```rust
//! use calor::prelude::*;
//! use calor::types::material::CONDUCTOR;
//!
//! let edge = 8;
//! let n = edge * edge;
//! let material =
//!     MaterialProperties::new(edge, vec![1.0; n], vec![CONDUCTOR; n], vec![50.0; n], 0.0)
//!         .unwrap();
//! let params = SimulationParams {
//!     iterations: 4,
//!     process_count: 4,
//!     ..Default::default()
//! };
//! let seq = run_sequential(&material, &params).unwrap();
//! let par = run_distributed(&material, &params).unwrap();
//! assert!(verify(&seq.field, &par.field, params.tolerance).passed());
//! ```
//!
//! # Modules
//!
//! | Module | Crate | Contents |
//! |--------|-------|----------|
//! | [`types`] | `calor-core` | Ranks, snapshot ids, material description |
//! | [`grid`] | `calor-grid` | Partitioning, tile layout, regions, neighbours |
//! | [`comm`] | `calor-comm` | Thread-backed ranks and message passing |
//! | [`io`] | `calor-io` | Snapshot container writer and reader |
//! | [`engine`] | `calor-engine` | Sequential and distributed solvers |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types (`calor-core`).
///
/// [`types::MaterialProperties`] describes the medium; [`types::Rank`]
/// and [`types::SnapshotId`] are shared identifiers.
pub use calor_core as types;

/// Grid decomposition (`calor-grid`).
///
/// [`grid::Partition`] tiles the grid; [`grid::Tile`] knows its
/// neighbours and the strips it exchanges with them.
pub use calor_grid as grid;

/// Message passing between ranks (`calor-comm`).
///
/// [`comm::launch`] runs one closure per rank, each holding a
/// [`comm::Communicator`].
pub use calor_comm as comm;

/// Snapshot containers (`calor-io`).
pub use calor_io as io;

/// Solvers (`calor-engine`).
pub use calor_engine as engine;

/// Common imports for typical Calor usage.
///
/// ```rust
/// use calor::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use calor_core::{MaterialError, MaterialProperties, Rank, SnapshotId};

    // Grid
    pub use calor_grid::{Partition, PartitionError};

    // Snapshots
    pub use calor_io::{read_snapshots, Snapshot, SnapshotError};

    // Engine
    pub use calor_engine::{
        compare_runs, run_distributed, run_sequential, verify, DistributedOutcome, IoMode,
        RunError, RunSummary, SequentialOutcome, SimulationParams, VerifyReport,
    };
}
