//! Material fixtures for Calor tests and benchmarks.
//!
//! Every fixture is deterministic: the random ones are driven by a seeded
//! `ChaCha8Rng`, so a given `(edge, seed)` always yields the same medium.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use calor_core::material::{AIR, CONDUCTOR};
use calor_core::MaterialProperties;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// All-conductor medium with unit conductance and a uniform temperature.
pub fn uniform(edge: usize, temp: f32, cooler: f32) -> MaterialProperties {
    let n = edge * edge;
    MaterialProperties::new(edge, vec![1.0; n], vec![CONDUCTOR; n], vec![temp; n], cooler)
        .expect("uniform fixture is valid")
}

/// Like [`uniform`], with a single air cell at `(row, col)`.
pub fn single_air_cell(
    edge: usize,
    cell: (usize, usize),
    temp: f32,
    cooler: f32,
) -> MaterialProperties {
    let n = edge * edge;
    let mut map = vec![CONDUCTOR; n];
    map[cell.0 * edge + cell.1] = AIR;
    MaterialProperties::new(edge, vec![1.0; n], map, vec![temp; n], cooler)
        .expect("single-air-cell fixture is valid")
}

/// Heterogeneous medium: conductance in `[0.5, 2)`, roughly one cell in
/// five open to air, temperatures in `[20, 200)`, cooler at 10.
pub fn random_material(edge: usize, seed: u64) -> MaterialProperties {
    let n = edge * edge;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let params = (0..n).map(|_| rng.random_range(0.5f32..2.0)).collect();
    let map = (0..n)
        .map(|_| if rng.random_bool(0.2) { AIR } else { CONDUCTOR })
        .collect();
    let temp = (0..n).map(|_| rng.random_range(20.0f32..200.0)).collect();
    MaterialProperties::new(edge, params, map, temp, 10.0).expect("random fixture is valid")
}

/// A cold plate with a hot square in the middle and an air border ring.
pub fn hot_spot(edge: usize) -> MaterialProperties {
    let n = edge * edge;
    let (lo, hi) = (edge / 3, edge - edge / 3);
    let mut temp = vec![20.0; n];
    let mut map = vec![CONDUCTOR; n];
    for i in 0..edge {
        for j in 0..edge {
            if (lo..hi).contains(&i) && (lo..hi).contains(&j) {
                temp[i * edge + j] = 300.0;
            }
            if i == 2 || j == 2 || i + 3 == edge || j + 3 == edge {
                map[i * edge + j] = AIR;
            }
        }
    }
    MaterialProperties::new(edge, vec![1.0; n], map, temp, 15.0).expect("hot-spot fixture is valid")
}

/// A unique path under the system temp directory.
pub fn temp_output(tag: &str) -> PathBuf {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("calor-{tag}-{}-{n}.snap", std::process::id()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_is_reproducible() {
        assert_eq!(random_material(8, 7), random_material(8, 7));
        assert_ne!(random_material(8, 7), random_material(8, 8));
    }

    #[test]
    fn air_cell_placed() {
        let m = single_air_cell(8, (3, 4), 100.0, 0.0);
        assert_eq!(m.domain_map()[3 * 8 + 4], AIR);
        assert_eq!(m.domain_map().iter().filter(|&&v| v == AIR).count(), 1);
    }

    #[test]
    fn temp_outputs_are_unique() {
        assert_ne!(temp_output("x"), temp_output("x"));
    }
}
