//! Distribution of the global field and material to tiles, and
//! collection of tiles back into a global field.
//!
//! Each array moves in one structured scatter (or gather): the
//! coordinating rank packs every rank's sub-rectangle and the receiving
//! rank unpacks it straight into the interior of its padded buffer.

use calor_comm::{CommError, Communicator};
use calor_core::{MaterialProperties, ROOT};
use calor_grid::{Partition, Tile};

use crate::halo::TileBuffers;

/// Padded per-tile copy of the material arrays.
#[derive(Clone, Debug, PartialEq)]
pub struct TileMaterial {
    /// Conductance weights.
    pub params: Vec<f32>,
    /// Material map.
    pub map: Vec<u8>,
}

/// Scatter the initial temperatures and the material to every rank.
///
/// `material` is only read on the coordinating rank, where it must be
/// `Some`. Halo cells are left at zero; the startup exchange fills them.
pub fn scatter_tile(
    comm: &mut Communicator,
    partition: &Partition,
    tile: &Tile,
    material: Option<&MaterialProperties>,
) -> Result<(TileBuffers, TileMaterial), CommError> {
    let layout = tile.layout();
    let (stride, interior) = (layout.stride(), layout.interior());
    let edge = partition.edge_size();
    let regions = partition.global_regions();

    let mut buffers = TileBuffers::new(layout);
    let mut local = TileMaterial {
        params: vec![0.0; layout.padded_len()],
        map: vec![0; layout.padded_len()],
    };

    comm.scatter_regions(
        ROOT,
        material.map(MaterialProperties::init_temp),
        edge,
        &regions,
        buffers.current_mut(),
        stride,
        interior,
    )?;
    comm.scatter_regions(
        ROOT,
        material.map(MaterialProperties::domain_params),
        edge,
        &regions,
        &mut local.params,
        stride,
        interior,
    )?;
    comm.scatter_regions(
        ROOT,
        material.map(MaterialProperties::domain_map),
        edge,
        &regions,
        &mut local.map,
        stride,
        interior,
    )?;
    Ok((buffers, local))
}

/// Gather the interiors of every rank's `padded` buffer into a global
/// `edge × edge` field on the coordinating rank.
///
/// Returns `Some(field)` on the coordinating rank and `None` elsewhere.
pub fn gather_field(
    comm: &mut Communicator,
    partition: &Partition,
    tile: &Tile,
    padded: &[f32],
) -> Result<Option<Vec<f32>>, CommError> {
    let layout = tile.layout();
    let edge = partition.edge_size();
    let mut global = comm.rank().is_root().then(|| vec![0.0f32; edge * edge]);
    comm.gather_regions(
        ROOT,
        padded,
        layout.stride(),
        layout.interior(),
        global.as_deref_mut(),
        edge,
        &partition.global_regions(),
    )?;
    Ok(global)
}

#[cfg(test)]
mod tests {
    use super::*;
    use calor_comm::launch;
    use calor_core::{Rank, HALO};
    use proptest::prelude::*;

    fn roundtrip(edge: usize, rows: usize, cols: usize, seed: u64) -> Vec<f32> {
        let partition = Partition::with_shape(edge, rows, cols).unwrap();
        let material = calor_test_utils::random_material(edge, seed);
        let results = launch(partition.process_count(), |mut comm| {
            let tile = partition.tile(comm.rank()).ok_or(CommError::InvalidRank {
                rank: comm.rank(),
                size: partition.process_count(),
            })?;
            let root_material = comm.rank().is_root().then_some(&material);
            let (buffers, local) = scatter_tile(&mut comm, &partition, &tile, root_material)?;
            let layout = tile.layout();
            // Material interiors land where the global arrays say.
            let (x, y) = tile.global_origin();
            for i in 0..layout.height() {
                for j in 0..layout.width() {
                    let g = (y + i) * edge + x + j;
                    let l = layout.index(i + HALO, j + HALO);
                    assert_eq!(local.params[l], material.domain_params()[g]);
                    assert_eq!(local.map[l], material.domain_map()[g]);
                }
            }
            gather_field(&mut comm, &partition, &tile, buffers.current())
        });
        let mut results = results.into_iter();
        let root = results.next().unwrap().unwrap().unwrap();
        for r in results {
            assert_eq!(r.unwrap(), None);
        }
        assert_eq!(root, material.init_temp());
        root
    }

    #[test]
    fn scatter_gather_four_tiles() {
        roundtrip(8, 2, 2, 1);
    }

    #[test]
    fn non_root_without_material_is_fine() {
        let partition = Partition::new(8, 2).unwrap();
        let material = calor_test_utils::uniform(8, 5.0, 0.0);
        let results = launch(2, |mut comm| {
            let tile = partition.tile(comm.rank()).unwrap();
            let m = (comm.rank() == Rank(0)).then_some(&material);
            scatter_tile(&mut comm, &partition, &tile, m).map(|(b, _)| b.current()[2 * 12 + 2])
        });
        for r in results {
            assert_eq!(r, Ok(5.0));
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn scatter_then_gather_is_identity(
            shape in prop::sample::select(vec![(1, 1), (1, 2), (2, 1), (2, 2), (1, 4), (4, 2)]),
            scale in 1usize..3,
            seed in 0u64..1000,
        ) {
            let (rows, cols) = shape;
            let edge = 4 * scale * rows.max(cols);
            roundtrip(edge, rows, cols, seed);
        }
    }
}
