//! Group construction and rank launching.

use std::thread;

use calor_core::Rank;
use crossbeam_channel::unbounded;

use crate::communicator::{Communicator, Envelope};
use crate::error::CommError;

/// Build a fully connected group of `size` communicators, in rank order.
///
/// Every ordered pair of ranks (including a rank and itself) gets its own
/// unbounded channel.
pub fn communicators(size: usize) -> Vec<Communicator> {
    // links[src][dst] is the channel carrying src -> dst traffic.
    let mut senders: Vec<Vec<_>> = (0..size).map(|_| Vec::with_capacity(size)).collect();
    let mut receivers: Vec<Vec<_>> = (0..size).map(|_| Vec::with_capacity(size)).collect();
    for src in 0..size {
        for dst_inboxes in receivers.iter_mut() {
            let (tx, rx) = unbounded::<Envelope>();
            senders[src].push(tx);
            dst_inboxes.push(rx);
        }
    }
    senders
        .into_iter()
        .zip(receivers)
        .enumerate()
        .map(|(r, (outboxes, inboxes))| Communicator::new(Rank(r), outboxes, inboxes))
        .collect()
}

/// Run `f` once per rank on its own thread and collect the results in
/// rank order.
///
/// Threads are named `calor-rank-<r>`. A rank that panics is reported as
/// [`CommError::RankPanicked`]; its communicator is dropped during
/// unwinding, so peers waiting on it see a disconnect rather than hang.
pub fn launch<T, E, F>(size: usize, f: F) -> Vec<Result<T, E>>
where
    F: Fn(Communicator) -> Result<T, E> + Sync,
    T: Send,
    E: Send + From<CommError>,
{
    let f = &f;
    thread::scope(|scope| {
        let handles: Vec<_> = communicators(size)
            .into_iter()
            .enumerate()
            .map(|(r, comm)| {
                thread::Builder::new()
                    .name(format!("calor-rank-{r}"))
                    .spawn_scoped(scope, move || f(comm))
                    .map_err(|e| CommError::SpawnFailed {
                        rank: Rank(r),
                        reason: e.to_string(),
                    })
            })
            .collect();

        handles
            .into_iter()
            .enumerate()
            .map(|(r, handle)| match handle {
                Ok(handle) => handle.join().unwrap_or_else(|_| {
                    log::error!("rank {r} panicked");
                    Err(CommError::RankPanicked { rank: Rank(r) }.into())
                }),
                Err(e) => {
                    log::error!("{e}");
                    Err(e.into())
                }
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::communicator::Tag;

    #[test]
    fn group_is_fully_connected() {
        let mut comms = communicators(3);
        for (r, c) in comms.iter().enumerate() {
            assert_eq!(c.rank(), Rank(r));
            assert_eq!(c.size(), 3);
        }
        for src in 0..3 {
            for dst in 0..3 {
                comms[src]
                    .send(Rank(dst), Tag(0), vec![(src * 10 + dst) as u64])
                    .unwrap();
            }
        }
        for dst in 0..3 {
            for src in 0..3 {
                let got = comms[dst].recv::<u64>(Rank(src), Tag(0)).unwrap();
                assert_eq!(got, vec![(src * 10 + dst) as u64]);
            }
        }
    }

    #[test]
    fn launch_returns_rank_order() {
        let results = launch(4, |comm| Ok::<_, CommError>(comm.rank().0 * 2));
        let values: Vec<usize> = results.into_iter().map(Result::unwrap).collect();
        assert_eq!(values, vec![0, 2, 4, 6]);
    }

    #[test]
    fn panicking_rank_disconnects_peers() {
        let results = launch(2, |mut comm| -> Result<f32, CommError> {
            if comm.rank() == Rank(1) {
                panic!("rank 1 fails");
            }
            let v = comm.recv::<f32>(Rank(1), Tag(0))?;
            Ok(v[0])
        });
        assert_eq!(results[0], Err(CommError::Disconnected { peer: Rank(1) }));
        assert_eq!(results[1], Err(CommError::RankPanicked { rank: Rank(1) }));
    }

    #[test]
    fn empty_group_runs_nothing() {
        let results = launch(0, |_comm| Ok::<(), CommError>(()));
        assert!(results.is_empty());
    }
}
