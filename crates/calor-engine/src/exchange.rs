//! Halo exchange between neighbouring tiles.
//!
//! One loop over the tile's direction table replaces per-direction code:
//! every existing [`Neighbour`] contributes one posted receive, one border
//! strip to compute early, and one send.

use calor_comm::{CommError, Communicator, Element, RecvRequest, Tag};
use calor_grid::{Direction, Neighbour, Tile};
use smallvec::SmallVec;

/// The padded arrays that travel through the halo exchange.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HaloField {
    /// Temperatures; exchanged every iteration.
    Temperature = 0,
    /// Conductance weights; exchanged once at startup.
    Conductance = 1,
    /// Material map; exchanged once at startup.
    Map = 2,
}

impl HaloField {
    /// Tag of this field's strips travelling in `direction`.
    pub fn tag(self, direction: Direction) -> Tag {
        Tag::halo(self as u32, direction.index())
    }
}

/// Per-tile halo exchange state.
#[derive(Debug)]
pub struct HaloExchange {
    neighbours: SmallVec<[Neighbour; 4]>,
    stride: usize,
    pending: Vec<RecvRequest>,
}

impl HaloExchange {
    /// Build the exchange for `tile`.
    pub fn new(tile: &Tile) -> Self {
        let neighbours = tile.neighbours();
        Self {
            pending: Vec::with_capacity(neighbours.len()),
            stride: tile.layout().stride(),
            neighbours,
        }
    }

    /// Existing neighbours in direction-table order.
    pub fn neighbours(&self) -> &[Neighbour] {
        &self.neighbours
    }

    /// Receives posted but not yet completed.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    fn post(&mut self, comm: &Communicator, field: HaloField) -> Result<(), CommError> {
        for n in &self.neighbours {
            // The strip arriving from `n` travels away from it, toward us.
            let tag = field.tag(n.direction.opposite());
            self.pending.push(comm.irecv(n.peer, tag, n.recv)?);
        }
        Ok(())
    }

    fn send<T: Element>(
        &self,
        comm: &Communicator,
        field: HaloField,
        data: &[T],
    ) -> Result<(), CommError> {
        for n in &self.neighbours {
            comm.send_region(n.peer, field.tag(n.direction), data, self.stride, n.send)?;
        }
        Ok(())
    }

    /// Post temperature receives into the halo of the buffer being written.
    pub fn post_receives(&mut self, comm: &Communicator) -> Result<(), CommError> {
        self.post(comm, HaloField::Temperature)
    }

    /// Send the freshly computed border strips of `next` to every
    /// neighbour.
    pub fn send_borders(&self, comm: &Communicator, next: &[f32]) -> Result<(), CommError> {
        self.send(comm, HaloField::Temperature, next)
    }

    /// Block until every posted receive has landed in `next`.
    pub fn complete(&mut self, comm: &mut Communicator, next: &mut [f32]) -> Result<(), CommError> {
        comm.wait_all(&mut self.pending, next, self.stride)
    }

    /// One blocking exchange of `field`: send every border strip of
    /// `data`, then fill every halo strip of `data`.
    pub fn exchange_blocking<T: Element>(
        &mut self,
        comm: &mut Communicator,
        field: HaloField,
        data: &mut [T],
    ) -> Result<(), CommError> {
        self.post(comm, field)?;
        self.send(comm, field, data)?;
        comm.wait_all(&mut self.pending, data, self.stride)
    }
}
