//! The 9-point cross stencil.
//!
//! A point's new temperature is the conductance-weighted average of
//! itself and the cells one and two steps away along each axis. Air cells
//! are then blended toward the cooler temperature.
//!
//! The kernel is pure: it reads one buffer and writes another, so any
//! set of points can be computed in any order or in parallel.

use calor_core::material::AIR;
use calor_grid::Region;
use rayon::prelude::*;
use rayon::ThreadPool;

/// Cooling applied to air cells.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cooling {
    /// Fraction of the value replaced by `cooler_temp`, in `[0, 1]`.
    pub air_flow_rate: f32,
    /// Temperature of the cooling air.
    pub cooler_temp: f32,
}

impl Cooling {
    /// Blend `value` toward the cooler temperature.
    #[inline]
    pub fn apply(&self, value: f32) -> f32 {
        self.air_flow_rate * self.cooler_temp + (1.0 - self.air_flow_rate) * value
    }
}

/// Read-only inputs of one sweep: the old temperatures and the material,
/// all laid out row-major with the same `stride`.
#[derive(Clone, Copy, Debug)]
pub struct Stencil<'a> {
    /// Temperatures of the previous iteration.
    pub temp: &'a [f32],
    /// Conductance weights.
    pub params: &'a [f32],
    /// Material map (air or conductor).
    pub map: &'a [u8],
    /// Row stride shared by all three arrays.
    pub stride: usize,
    /// Air-cell cooling.
    pub cooling: Cooling,
}

impl Stencil<'_> {
    /// New temperature of the point at row `i`, column `j`.
    ///
    /// The caller guarantees that `(i ± 2, j ± 2)` are valid cells.
    #[inline]
    pub fn point(&self, i: usize, j: usize) -> f32 {
        let s = self.stride;
        let c = i * s + j;
        let taps = [c - s, c - 2 * s, c + s, c + 2 * s, c - 1, c - 2, c + 1, c + 2, c];

        let p = self.params;
        let (weighted, total) = taps.iter().fold((0.0f32, 0.0f32), |(w, t), &k| {
            (w + self.temp[k] * p[k], t + p[k])
        });
        // Dividing once keeps a uniform field exactly uniform.
        let value = weighted / total;

        if self.map[c] == AIR {
            self.cooling.apply(value)
        } else {
            value
        }
    }

    /// Compute every point of `region` into `out` (same layout as the
    /// inputs).
    pub fn sweep(&self, region: Region, out: &mut [f32]) {
        for i in region.rows() {
            let row = &mut out[i * self.stride..(i + 1) * self.stride];
            for j in region.cols() {
                row[j] = self.point(i, j);
            }
        }
    }

    /// Like [`sweep`](Self::sweep), with rows split across `pool`'s
    /// workers. Without a pool this is a plain sweep.
    pub fn sweep_parallel(&self, region: Region, out: &mut [f32], pool: Option<&ThreadPool>) {
        let Some(pool) = pool else {
            return self.sweep(region, out);
        };
        if region.is_empty() {
            return;
        }
        pool.install(|| {
            out.par_chunks_mut(self.stride)
                .enumerate()
                .skip(region.row)
                .take(region.height)
                .for_each(|(i, row)| {
                    for j in region.cols() {
                        row[j] = self.point(i, j);
                    }
                });
        });
    }
}

/// Build a worker pool for one rank, or `None` for a single thread.
pub fn worker_pool(
    threads: usize,
    label: &str,
) -> Result<Option<ThreadPool>, rayon::ThreadPoolBuildError> {
    if threads <= 1 {
        return Ok(None);
    }
    let label = label.to_owned();
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(move |k| format!("{label}-worker-{k}"))
        .build()
        .map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use calor_core::material::CONDUCTOR;
    use proptest::prelude::*;

    fn stencil<'a>(temp: &'a [f32], params: &'a [f32], map: &'a [u8], edge: usize) -> Stencil<'a> {
        Stencil {
            temp,
            params,
            map,
            stride: edge,
            cooling: Cooling {
                air_flow_rate: 0.05,
                cooler_temp: 0.0,
            },
        }
    }

    #[test]
    fn uniform_field_is_fixed_point() {
        let n = 8 * 8;
        let (temp, params, map) = (vec![100.0f32; n], vec![1.0f32; n], vec![CONDUCTOR; n]);
        let s = stencil(&temp, &params, &map, 8);
        for i in 2..6 {
            for j in 2..6 {
                assert_eq!(s.point(i, j), 100.0);
            }
        }
    }

    #[test]
    fn air_cell_blends_toward_cooler() {
        let n = 8 * 8;
        let (temp, params) = (vec![100.0f32; n], vec![1.0f32; n]);
        let mut map = vec![CONDUCTOR; n];
        map[3 * 8 + 3] = AIR;
        let s = stencil(&temp, &params, &map, 8);
        assert_eq!(s.point(3, 3), 95.0);
    }

    #[test]
    fn full_air_flow_gives_cooler_temp() {
        let n = 5 * 5;
        let temp: Vec<f32> = (0..n).map(|k| k as f32).collect();
        let params = vec![1.0f32; n];
        let map = vec![AIR; n];
        let mut s = stencil(&temp, &params, &map, 5);
        s.cooling = Cooling {
            air_flow_rate: 1.0,
            cooler_temp: -7.5,
        };
        assert_eq!(s.point(2, 2), -7.5);
    }

    #[test]
    fn weights_follow_conductance() {
        // Only the centre conducts strongly: result stays near its value.
        let n = 5 * 5;
        let mut temp = vec![0.0f32; n];
        let mut params = vec![1e-6f32; n];
        temp[12] = 50.0;
        params[12] = 1.0;
        let map = vec![CONDUCTOR; n];
        let v = stencil(&temp, &params, &map, 5).point(2, 2);
        assert!((v - 50.0).abs() < 1e-3, "got {v}");
    }

    #[test]
    fn parallel_sweep_matches_serial() {
        let edge = 16;
        let n = edge * edge;
        let temp: Vec<f32> = (0..n).map(|k| (k % 37) as f32 * 3.0).collect();
        let params: Vec<f32> = (0..n).map(|k| 0.5 + (k % 5) as f32 * 0.25).collect();
        let map: Vec<u8> = (0..n).map(|k| (k % 7 != 0) as u8).collect();
        let s = stencil(&temp, &params, &map, edge);
        let region = Region::from_ranges(2..edge - 2, 2..edge - 2);

        let mut serial = temp.clone();
        s.sweep(region, &mut serial);
        let pool = worker_pool(3, "test").unwrap();
        assert!(pool.is_some());
        let mut parallel = temp.clone();
        s.sweep_parallel(region, &mut parallel, pool.as_ref());
        assert_eq!(serial, parallel);
    }

    #[test]
    fn sweep_leaves_outside_untouched() {
        let n = 8 * 8;
        let temp: Vec<f32> = (0..n).map(|k| k as f32).collect();
        let (params, map) = (vec![1.0f32; n], vec![CONDUCTOR; n]);
        let mut out = vec![-1.0f32; n];
        stencil(&temp, &params, &map, 8).sweep(Region::new(3, 3, 2, 2), &mut out);
        let touched = out.iter().filter(|&&v| v != -1.0).count();
        assert_eq!(touched, 4);
    }

    #[test]
    fn single_thread_has_no_pool() {
        assert!(worker_pool(1, "x").unwrap().is_none());
    }

    proptest! {
        #[test]
        fn air_cell_lies_between_cooler_and_average(
            temp in prop::collection::vec(-500.0f32..500.0, 25),
            params in prop::collection::vec(0.1f32..10.0, 25),
            air_flow_rate in 0.0f32..=1.0,
            cooler_temp in -500.0f32..500.0,
        ) {
            let conductor = vec![CONDUCTOR; 25];
            let mut air = conductor.clone();
            air[12] = AIR;
            let mut s = stencil(&temp, &params, &conductor, 5);
            s.cooling = Cooling { air_flow_rate, cooler_temp };
            let average = s.point(2, 2);
            s.map = &air;
            let blended = s.point(2, 2);

            let (lo, hi) = (average.min(cooler_temp), average.max(cooler_temp));
            let eps = 1e-4 * hi.abs().max(lo.abs()).max(1.0);
            prop_assert!(blended >= lo - eps && blended <= hi + eps,
                "{blended} outside [{lo}, {hi}]");
            if air_flow_rate == 1.0 {
                prop_assert_eq!(blended, cooler_temp);
            }
        }
    }
}
