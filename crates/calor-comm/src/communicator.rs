//! Point-to-point messaging with `(source, tag)` matching.

use std::collections::VecDeque;

use calor_core::Rank;
use calor_grid::Region;
use crossbeam_channel::{Receiver, Sender};

use crate::error::CommError;
use crate::payload::{Element, Payload};

/// Message tag. Receives match on `(source, tag)`.
///
/// Halo tags are built with [`Tag::halo`]; the top of the `u32` range is
/// reserved for collectives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Tag(pub u32);

impl Tag {
    pub(crate) const BARRIER: Tag = Tag(u32::MAX);
    pub(crate) const BROADCAST: Tag = Tag(u32::MAX - 1);
    pub(crate) const REDUCE: Tag = Tag(u32::MAX - 2);
    pub(crate) const SCATTER: Tag = Tag(u32::MAX - 3);
    pub(crate) const GATHER: Tag = Tag(u32::MAX - 4);

    /// Tag for halo traffic of one field travelling in one direction.
    ///
    /// `field` identifies the array (temperature, conductance, map) and
    /// `direction` is the index of the direction of travel, so a strip
    /// sent rightward is received on the peer's left side under the same
    /// tag.
    pub const fn halo(field: u32, direction: usize) -> Self {
        Tag(field * 4 + direction as u32)
    }
}

pub(crate) struct Envelope {
    pub(crate) tag: Tag,
    pub(crate) payload: Payload,
}

/// One rank's endpoint into the group.
///
/// Holds an outgoing channel to every rank (itself included) and an
/// incoming channel from every rank. Messages that arrive ahead of the
/// receive that wants them wait in a per-source stash.
pub struct Communicator {
    rank: Rank,
    outboxes: Vec<Sender<Envelope>>,
    inboxes: Vec<Receiver<Envelope>>,
    stash: Vec<VecDeque<Envelope>>,
}

/// A posted receive: where a message from `source` with `tag` will land.
///
/// Created by [`Communicator::irecv`] and completed by
/// [`Communicator::wait_all`]. Posting performs no I/O, so the sender may
/// run ahead freely.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecvRequest {
    /// Sending rank.
    pub source: Rank,
    /// Expected tag.
    pub tag: Tag,
    /// Destination rectangle in the caller's buffer.
    pub region: Region,
}

impl Communicator {
    pub(crate) fn new(
        rank: Rank,
        outboxes: Vec<Sender<Envelope>>,
        inboxes: Vec<Receiver<Envelope>>,
    ) -> Self {
        let stash = inboxes.iter().map(|_| VecDeque::new()).collect();
        Self {
            rank,
            outboxes,
            inboxes,
            stash,
        }
    }

    /// This endpoint's rank.
    pub fn rank(&self) -> Rank {
        self.rank
    }

    /// Number of ranks in the group.
    pub fn size(&self) -> usize {
        self.outboxes.len()
    }

    pub(crate) fn check_rank(&self, rank: Rank) -> Result<(), CommError> {
        if rank.0 < self.size() {
            Ok(())
        } else {
            Err(CommError::InvalidRank {
                rank,
                size: self.size(),
            })
        }
    }

    /// Send `data` to `dest`. Never blocks.
    pub fn send<T: Element>(&self, dest: Rank, tag: Tag, data: Vec<T>) -> Result<(), CommError> {
        self.check_rank(dest)?;
        let envelope = Envelope {
            tag,
            payload: T::into_payload(data),
        };
        self.outboxes[dest.0]
            .send(envelope)
            .map_err(|_| CommError::Disconnected { peer: dest })
    }

    /// Pack `region` of `src` (row stride `stride`) and send it to `dest`.
    pub fn send_region<T: Element>(
        &self,
        dest: Rank,
        tag: Tag,
        src: &[T],
        stride: usize,
        region: Region,
    ) -> Result<(), CommError> {
        self.send(dest, tag, region.pack(src, stride))
    }

    /// Block until a message from `source` with `tag` arrives and return
    /// its elements.
    pub fn recv<T: Element>(&mut self, source: Rank, tag: Tag) -> Result<Vec<T>, CommError> {
        self.check_rank(source)?;
        let payload = self.recv_payload(source, tag)?;
        T::from_payload(payload).map_err(|other| CommError::PayloadType {
            expected: T::KIND,
            got: other.kind(),
        })
    }

    fn recv_payload(&mut self, source: Rank, tag: Tag) -> Result<Payload, CommError> {
        let stash = &mut self.stash[source.0];
        if let Some(pos) = stash.iter().position(|e| e.tag == tag) {
            if let Some(envelope) = stash.remove(pos) {
                return Ok(envelope.payload);
            }
        }
        loop {
            let envelope = self.inboxes[source.0]
                .recv()
                .map_err(|_| CommError::Disconnected { peer: source })?;
            if envelope.tag == tag {
                return Ok(envelope.payload);
            }
            self.stash[source.0].push_back(envelope);
        }
    }

    /// Receive a message of exactly `expected` elements.
    pub(crate) fn recv_exact<T: Element>(
        &mut self,
        source: Rank,
        tag: Tag,
        expected: usize,
    ) -> Result<Vec<T>, CommError> {
        let data = self.recv(source, tag)?;
        if data.len() != expected {
            return Err(CommError::LengthMismatch {
                expected,
                got: data.len(),
            });
        }
        Ok(data)
    }

    /// Post a receive of `region` from `source`.
    pub fn irecv(&self, source: Rank, tag: Tag, region: Region) -> Result<RecvRequest, CommError> {
        self.check_rank(source)?;
        Ok(RecvRequest {
            source,
            tag,
            region,
        })
    }

    /// Complete every posted receive, unpacking each message into its
    /// region of `dst` (row stride `stride`).
    ///
    /// Requests are drained as they complete; on error the remaining
    /// requests stay in `requests`.
    pub fn wait_all<T: Element>(
        &mut self,
        requests: &mut Vec<RecvRequest>,
        dst: &mut [T],
        stride: usize,
    ) -> Result<(), CommError> {
        while let Some(request) = requests.first().copied() {
            let data = self.recv_exact(request.source, request.tag, request.region.len())?;
            request.region.unpack(&data, dst, stride);
            requests.remove(0);
        }
        Ok(())
    }
}

impl std::fmt::Debug for Communicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Communicator")
            .field("rank", &self.rank)
            .field("size", &self.size())
            .field("stashed", &self.stash.iter().map(VecDeque::len).sum::<usize>())
            .finish()
    }
}
