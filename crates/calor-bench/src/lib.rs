//! Benchmark profiles for the Calor solvers.
//!
//! - [`reference_profile`]: 256x256 heterogeneous medium, 4 ranks
//! - [`stress_profile`]: 1024x1024 medium, 16 ranks
//!
//! Both profiles disable snapshots and progress logging so that only the
//! solver loop is measured.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use calor_core::MaterialProperties;
use calor_engine::SimulationParams;
use calor_test_utils::random_material;

/// Seed shared by every profile.
pub const PROFILE_SEED: u64 = 0x5EED;

/// 256x256 grid, 4 ranks, 20 iterations.
pub fn reference_profile() -> (MaterialProperties, SimulationParams) {
    profile(256, 4, 20)
}

/// 1024x1024 grid, 16 ranks, 10 iterations.
pub fn stress_profile() -> (MaterialProperties, SimulationParams) {
    profile(1024, 16, 10)
}

/// A random medium of `edge` cells per side with batch-mode parameters.
pub fn profile(
    edge: usize,
    process_count: usize,
    iterations: usize,
) -> (MaterialProperties, SimulationParams) {
    let params = SimulationParams {
        iterations,
        process_count,
        batch_mode: true,
        output_path: None,
        ..Default::default()
    };
    (random_material(edge, PROFILE_SEED), params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiles_partition_cleanly() {
        for (material, params) in [reference_profile(), profile(64, 8, 1)] {
            let partition = params.partition(material.edge_size()).unwrap();
            assert_eq!(partition.process_count(), params.process_count);
        }
    }
}
