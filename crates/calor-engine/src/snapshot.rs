//! Snapshot sinks used by the coordinating rank and the sequential solver.
//!
//! A [`SnapshotSink`] receives whole fields. In overlapped mode the field
//! is handed to a [`BackgroundWriter`] thread through a single-slot
//! channel, so the solver only waits when the previous snapshot is still
//! being written.
//!
//! ```text
//!   solver ──[job_tx: bounded(1)]──► writer thread ──► SnapshotFile
//!                                         │
//!   finish() ◄──────── join ──────────────┘ (first error, if any)
//! ```

use std::path::Path;
use std::thread::{self, JoinHandle};

use calor_core::SnapshotId;
use calor_io::{SnapshotError, SnapshotFile};
use crossbeam_channel::{bounded, Sender};

use crate::config::IoMode;
use crate::error::RunError;

struct Job {
    id: SnapshotId,
    iteration: u64,
    field: Vec<f32>,
    edge: usize,
}

// ── BackgroundWriter ───────────────────────────────────────────────

/// A thread that owns a container and writes fields handed to it.
///
/// The writer stops at its first error; the error is reported by the
/// next [`submit`](Self::submit) or by [`finish`](Self::finish).
pub struct BackgroundWriter {
    job_tx: Option<Sender<Job>>,
    handle: Option<JoinHandle<Result<u64, SnapshotError>>>,
}

impl BackgroundWriter {
    /// Start a writer thread that owns `file`.
    pub fn spawn(mut file: SnapshotFile) -> Result<Self, RunError> {
        let (job_tx, job_rx) = bounded::<Job>(1);
        let handle = thread::Builder::new()
            .name("calor-snapshot-writer".into())
            .spawn(move || {
                for job in job_rx {
                    file.write_full(job.id, job.iteration, &job.field, job.edge)?;
                }
                let written = file.snapshots_written();
                file.close()?;
                Ok(written)
            })
            .map_err(|e| RunError::Writer {
                reason: format!("failed to spawn writer thread: {e}"),
            })?;
        Ok(Self {
            job_tx: Some(job_tx),
            handle: Some(handle),
        })
    }

    /// Hand `field` to the writer. Blocks while the slot is occupied.
    pub fn submit(
        &mut self,
        id: SnapshotId,
        iteration: u64,
        field: Vec<f32>,
        edge: usize,
    ) -> Result<(), RunError> {
        let job = Job {
            id,
            iteration,
            field,
            edge,
        };
        let sent = match &self.job_tx {
            Some(tx) => tx.send(job).is_ok(),
            None => false,
        };
        if sent {
            return Ok(());
        }
        // The writer hung up, which only happens after an error.
        self.job_tx = None;
        self.join()?;
        Err(RunError::Writer {
            reason: "writer stopped unexpectedly".into(),
        })
    }

    fn join(&mut self) -> Result<u64, RunError> {
        let Some(handle) = self.handle.take() else {
            return Err(RunError::Writer {
                reason: "writer already finished".into(),
            });
        };
        match handle.join() {
            Ok(result) => Ok(result?),
            Err(_) => Err(RunError::Writer {
                reason: "writer thread panicked".into(),
            }),
        }
    }

    /// Wait for every submitted field to be written and close the
    /// container. Returns the number of snapshots written.
    pub fn finish(mut self) -> Result<u64, RunError> {
        self.job_tx = None;
        self.join()
    }
}

impl Drop for BackgroundWriter {
    fn drop(&mut self) {
        self.job_tx = None;
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

// ── SnapshotSink ───────────────────────────────────────────────────

/// Destination of whole-field snapshots.
pub enum SnapshotSink {
    /// Snapshots are disabled.
    Disabled,
    /// Written inline by the caller.
    Serial(SnapshotFile),
    /// Written by a background thread.
    Overlapped(BackgroundWriter),
}

impl SnapshotSink {
    /// Create the container at `path` for `mode`. `Parallel` falls back to
    /// inline writes; `None` disables snapshots.
    pub fn create(path: Option<&Path>, mode: IoMode) -> Result<Self, RunError> {
        let Some(path) = path else {
            return Ok(Self::Disabled);
        };
        let file = SnapshotFile::create(path)?;
        match mode {
            IoMode::SerialOverlapped => Ok(Self::Overlapped(BackgroundWriter::spawn(file)?)),
            IoMode::Serial | IoMode::Parallel => Ok(Self::Serial(file)),
        }
    }

    /// Whether snapshots are written at all.
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::Disabled)
    }

    /// Store `field` as snapshot `id` taken at `iteration`.
    pub fn write(
        &mut self,
        id: SnapshotId,
        iteration: u64,
        field: &[f32],
        edge: usize,
    ) -> Result<(), RunError> {
        match self {
            Self::Disabled => Ok(()),
            Self::Serial(file) => Ok(file.write_full(id, iteration, field, edge)?),
            Self::Overlapped(writer) => writer.submit(id, iteration, field.to_vec(), edge),
        }
    }

    /// Flush and close. Returns the number of snapshots written.
    pub fn finish(self) -> Result<u64, RunError> {
        match self {
            Self::Disabled => Ok(0),
            Self::Serial(file) => {
                let written = file.snapshots_written();
                file.close()?;
                Ok(written)
            }
            Self::Overlapped(writer) => writer.finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calor_io::read_snapshots;

    fn temp_path(tag: &str) -> std::path::PathBuf {
        calor_test_utils::temp_output(tag)
    }

    #[test]
    fn overlapped_matches_serial() {
        let (a, b) = (temp_path("sink-serial"), temp_path("sink-overlap"));
        let mut serial = SnapshotSink::create(Some(&a), IoMode::Serial).unwrap();
        let mut overlapped = SnapshotSink::create(Some(&b), IoMode::SerialOverlapped).unwrap();
        for k in 0..5u64 {
            let field = vec![k as f32; 16];
            serial.write(SnapshotId(k), k * 3, &field, 4).unwrap();
            overlapped.write(SnapshotId(k), k * 3, &field, 4).unwrap();
        }
        assert_eq!(serial.finish().unwrap(), 5);
        assert_eq!(overlapped.finish().unwrap(), 5);
        assert_eq!(std::fs::read(&a).unwrap(), std::fs::read(&b).unwrap());
        assert_eq!(read_snapshots(&b).unwrap().len(), 5);
        let _ = std::fs::remove_file(a);
        let _ = std::fs::remove_file(b);
    }

    #[test]
    fn writer_error_surfaces() {
        let path = temp_path("sink-error");
        let mut sink = SnapshotSink::create(Some(&path), IoMode::SerialOverlapped).unwrap();
        // Wrong length: the writer thread fails on this job.
        sink.write(SnapshotId(0), 0, &[0.0; 3], 4).unwrap_or(());
        let mut failed = false;
        for k in 1..4u64 {
            if sink.write(SnapshotId(k), k, &[0.0; 16], 4).is_err() {
                failed = true;
                break;
            }
        }
        let finished = sink.finish();
        assert!(failed || finished.is_err());
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn disabled_sink_writes_nothing() {
        let mut sink = SnapshotSink::create(None, IoMode::Parallel).unwrap();
        assert!(!sink.is_enabled());
        sink.write(SnapshotId(0), 0, &[1.0], 1).unwrap();
        assert_eq!(sink.finish().unwrap(), 0);
    }
}
