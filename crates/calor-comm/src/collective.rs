//! Collective operations built on point-to-point messages.
//!
//! Every rank in the group must call the same collective in the same
//! order. Collectives use reserved tags, so they never match halo traffic.

use calor_core::Rank;
use calor_grid::Region;

use crate::communicator::{Communicator, Tag};
use crate::error::CommError;
use crate::payload::Element;

impl Communicator {
    /// Block until every rank has entered the barrier.
    pub fn barrier(&mut self) -> Result<(), CommError> {
        let root = calor_core::ROOT;
        if self.rank() == root {
            for r in (1..self.size()).map(Rank) {
                self.recv::<u8>(r, Tag::BARRIER)?;
            }
            for r in (1..self.size()).map(Rank) {
                self.send(r, Tag::BARRIER, Vec::<u8>::new())?;
            }
        } else {
            self.send(root, Tag::BARRIER, Vec::<u8>::new())?;
            self.recv::<u8>(root, Tag::BARRIER)?;
        }
        Ok(())
    }

    /// Distribute `data` from `root` to every rank.
    ///
    /// The root's `data` is returned to it unchanged; other ranks ignore
    /// their argument and return what the root sent.
    pub fn broadcast<T: Element>(&mut self, root: Rank, data: Vec<T>) -> Result<Vec<T>, CommError> {
        self.check_rank(root)?;
        if self.rank() == root {
            for r in (0..self.size()).map(Rank).filter(|&r| r != root) {
                self.send(r, Tag::BROADCAST, data.clone())?;
            }
            Ok(data)
        } else {
            self.recv(root, Tag::BROADCAST)
        }
    }

    /// Sum `value` over all ranks at `root`.
    ///
    /// The root adds contributions in rank order, so the result is the
    /// same for any message arrival order. Returns `Some(total)` on the
    /// root and `None` elsewhere.
    pub fn reduce_sum(&mut self, root: Rank, value: f32) -> Result<Option<f32>, CommError> {
        self.check_rank(root)?;
        if self.rank() != root {
            self.send(root, Tag::REDUCE, vec![value])?;
            return Ok(None);
        }
        let mut total = 0.0f32;
        for r in (0..self.size()).map(Rank) {
            total += if r == root {
                value
            } else {
                self.recv_exact::<f32>(r, Tag::REDUCE, 1)?[0]
            };
        }
        Ok(Some(total))
    }

    /// Split a global array held by `root` into per-rank regions.
    ///
    /// `regions[r]` names rank `r`'s rectangle of `global` (row stride
    /// `global_stride`). Each rank receives its rectangle into `local`
    /// region `dst` (row stride `local_stride`). `global` is only read on
    /// the root and must be `Some` there.
    #[allow(clippy::too_many_arguments)]
    pub fn scatter_regions<T: Element>(
        &mut self,
        root: Rank,
        global: Option<&[T]>,
        global_stride: usize,
        regions: &[Region],
        local: &mut [T],
        local_stride: usize,
        dst: Region,
    ) -> Result<(), CommError> {
        self.check_rank(root)?;
        if regions.len() != self.size() {
            return Err(CommError::LengthMismatch {
                expected: self.size(),
                got: regions.len(),
            });
        }
        if self.rank() != root {
            let data = self.recv_exact(root, Tag::SCATTER, dst.len())?;
            dst.unpack(&data, local, local_stride);
            return Ok(());
        }

        let global = global.ok_or(CommError::MissingRootData)?;
        for (r, region) in regions.iter().enumerate() {
            let piece = region.pack(global, global_stride);
            if Rank(r) == root {
                if piece.len() != dst.len() {
                    return Err(CommError::LengthMismatch {
                        expected: dst.len(),
                        got: piece.len(),
                    });
                }
                dst.unpack(&piece, local, local_stride);
            } else {
                self.send(Rank(r), Tag::SCATTER, piece)?;
            }
        }
        Ok(())
    }

    /// Collect per-rank regions into a global array on `root`.
    ///
    /// The inverse of [`Communicator::scatter_regions`]: every rank sends
    /// region `src` of `local`, and the root writes rank `r`'s data into
    /// `regions[r]` of `global`.
    #[allow(clippy::too_many_arguments)]
    pub fn gather_regions<T: Element>(
        &mut self,
        root: Rank,
        local: &[T],
        local_stride: usize,
        src: Region,
        global: Option<&mut [T]>,
        global_stride: usize,
        regions: &[Region],
    ) -> Result<(), CommError> {
        self.check_rank(root)?;
        if regions.len() != self.size() {
            return Err(CommError::LengthMismatch {
                expected: self.size(),
                got: regions.len(),
            });
        }
        if self.rank() != root {
            return self.send_region(root, Tag::GATHER, local, local_stride, src);
        }

        let global = global.ok_or(CommError::MissingRootData)?;
        for (r, region) in regions.iter().enumerate() {
            let data = if Rank(r) == root {
                src.pack(local, local_stride)
            } else {
                self.recv_exact(Rank(r), Tag::GATHER, region.len())?
            };
            if data.len() != region.len() {
                return Err(CommError::LengthMismatch {
                    expected: region.len(),
                    got: data.len(),
                });
            }
            region.unpack(&data, global, global_stride);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::launch;

    #[test]
    fn barrier_and_broadcast() {
        let results = launch(4, |mut comm| -> Result<Vec<u64>, CommError> {
            comm.barrier()?;
            let data = if comm.rank().is_root() {
                vec![7, 8, 9]
            } else {
                Vec::new()
            };
            let got = comm.broadcast(Rank(0), data)?;
            comm.barrier()?;
            Ok(got)
        });
        for r in results {
            assert_eq!(r.unwrap(), vec![7, 8, 9]);
        }
    }

    #[test]
    fn reduce_sums_on_root_only() {
        let results = launch(5, |mut comm| comm.reduce_sum(Rank(0), comm.rank().0 as f32));
        assert_eq!(results[0], Ok(Some(10.0)));
        assert!(results[1..].iter().all(|r| *r == Ok(None)));
    }

    #[test]
    fn scatter_then_gather_restores_global() {
        // 4x4 global split into four 2x2 quadrants, each stored in a 4x4
        // local buffer with a one-cell border.
        let regions = [
            Region::new(0, 0, 2, 2),
            Region::new(0, 2, 2, 2),
            Region::new(2, 0, 2, 2),
            Region::new(2, 2, 2, 2),
        ];
        let interior = Region::new(1, 1, 2, 2);
        let results = launch(4, |mut comm| -> Result<_, CommError> {
            let global: Vec<f32> = (0..16).map(|v| v as f32).collect();
            let is_root = comm.rank().is_root();
            let mut local = vec![-1f32; 16];
            comm.scatter_regions(
                Rank(0),
                is_root.then_some(global.as_slice()),
                4,
                &regions,
                &mut local,
                4,
                interior,
            )?;
            let mine = interior.pack(&local, 4);

            let mut out = vec![0f32; 16];
            comm.gather_regions(
                Rank(0),
                &local,
                4,
                interior,
                is_root.then_some(out.as_mut_slice()),
                4,
                &regions,
            )?;
            Ok((mine, is_root.then_some(out)))
        });

        let expected_pieces = [
            vec![0.0, 1.0, 4.0, 5.0],
            vec![2.0, 3.0, 6.0, 7.0],
            vec![8.0, 9.0, 12.0, 13.0],
            vec![10.0, 11.0, 14.0, 15.0],
        ];
        for (r, result) in results.into_iter().enumerate() {
            let (mine, out) = result.unwrap();
            assert_eq!(mine, expected_pieces[r], "rank {r}");
            if r == 0 {
                let global: Vec<f32> = (0..16).map(|v| v as f32).collect();
                assert_eq!(out, Some(global));
            } else {
                assert_eq!(out, None);
            }
        }
    }

    #[test]
    fn scatter_without_root_data_fails() {
        let results = launch(2, |mut comm| {
            let mut local = vec![0f32; 4];
            let regions = [Region::new(0, 0, 1, 2), Region::new(1, 0, 1, 2)];
            comm.scatter_regions::<f32>(
                Rank(0),
                None,
                2,
                &regions,
                &mut local,
                2,
                Region::new(0, 0, 1, 2),
            )
        });
        assert_eq!(results[0], Err(CommError::MissingRootData));
        assert_eq!(
            results[1],
            Err(CommError::Disconnected { peer: Rank(0) })
        );
    }
}
