//! Sequential and domain-decomposed heat-diffusion solvers.
//!
//! Two solvers share one stencil kernel:
//!
//! - [`run_sequential`] sweeps the whole grid on the calling thread and is
//!   the reference result.
//! - [`run_distributed`] splits the grid into tiles, one per rank, and
//!   overlaps the halo exchange with the interior sweep.
//!
//! Every point is computed from the same neighbourhood in both solvers, so
//! the two produce identical fields for any valid decomposition.
//! [`compare_runs`] runs both and checks them with [`verify`].
//!
//! # Per-iteration protocol (distributed)
//!
//! 1. Post receives for the halo of the `next` buffer.
//! 2. Compute the border strips neighbours depend on.
//! 3. Send those strips.
//! 4. Compute the remaining interior while the strips are in flight.
//! 5. Complete the receives, reduce the middle-column statistic, write a
//!    snapshot if due, and swap buffers.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod distribute;
pub mod distributed;
pub mod error;
pub mod exchange;
pub mod halo;
pub mod kernel;
pub mod outcome;
pub mod progress;
pub mod sequential;
pub mod snapshot;
pub mod verify;

pub use config::{ConfigError, IoMode, SimulationParams};
pub use distributed::{run_distributed, SimulationContext};
pub use error::RunError;
pub use halo::TileBuffers;
pub use kernel::{Cooling, Stencil};
pub use outcome::{DistributedOutcome, RunSummary, SequentialOutcome};
pub use sequential::run_sequential;
pub use verify::{compare_runs, verify, VerifyReport, DEFAULT_TOLERANCE};
