//! Fire-and-forget read stamping.
//!
//! Readers hand a `(asset, timeframe)` pair to the recorder and return
//! immediately. A single background worker stamps the clock's "now" into the
//! tracker. Stamps are best effort: there is no retry, no handle is returned,
//! and failures only reach the log. The queue is bounded; when a stalled
//! tracker lets it fill up, new stamps are dropped with a warning.

use std::sync::mpsc::{self, SyncSender, TrySendError};
use std::sync::{Arc, Mutex, RwLock};
use std::thread::{self, JoinHandle};

use crate::core::{Clock, Result, Timeframe};
use crate::lifecycle::ReadTracker;

/// Stamps queued ahead of the worker before new ones are dropped.
pub const DEFAULT_QUEUE_CAPACITY: usize = 4096;

#[derive(Debug)]
struct ReadStamp {
    asset: String,
    timeframe: Timeframe,
}

pub struct ReadRecorder {
    tx: RwLock<Option<SyncSender<ReadStamp>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl ReadRecorder {
    /// Start the background worker with `DEFAULT_QUEUE_CAPACITY`.
    pub fn spawn(tracker: Arc<dyn ReadTracker>, clock: Arc<dyn Clock>) -> Result<Self> {
        Self::spawn_with_capacity(tracker, clock, DEFAULT_QUEUE_CAPACITY)
    }

    pub fn spawn_with_capacity(
        tracker: Arc<dyn ReadTracker>,
        clock: Arc<dyn Clock>,
        capacity: usize,
    ) -> Result<Self> {
        let (tx, rx) = mpsc::sync_channel::<ReadStamp>(capacity.max(1));
        let worker = thread::Builder::new()
            .name("tfstore-read-recorder".to_string())
            .spawn(move || {
                while let Ok(stamp) = rx.recv() {
                    let at = clock.now();
                    if let Err(err) = tracker.record_read(&stamp.asset, stamp.timeframe, at) {
                        log::warn!(
                            "error setting last read: asset={} timeframe={} error={}",
                            stamp.asset,
                            stamp.timeframe,
                            err
                        );
                    }
                }
            })?;

        Ok(Self {
            tx: RwLock::new(Some(tx)),
            worker: Mutex::new(Some(worker)),
        })
    }

    /// Queue a stamp for `(asset, timeframe)`. Never blocks on the tracker.
    pub fn on_new_read(&self, asset: &str, timeframe: Timeframe) {
        let stamp = ReadStamp {
            asset: asset.to_string(),
            timeframe,
        };
        let error = match self.tx.read() {
            Ok(tx) => match tx.as_ref().map(|tx| tx.try_send(stamp)) {
                Some(Ok(())) => return,
                Some(Err(TrySendError::Full(_))) => "recorder queue is full",
                Some(Err(TrySendError::Disconnected(_))) | None => "recorder is shut down",
            },
            Err(_) => "recorder lock poisoned",
        };
        log::warn!(
            "error setting last read: asset={} timeframe={} error={}",
            asset,
            timeframe,
            error
        );
    }

    /// Drain queued stamps and stop the worker. Later stamps are dropped.
    pub fn shutdown(&self) {
        if let Ok(mut tx) = self.tx.write() {
            tx.take();
        }
        let worker = self.worker.lock().ok().and_then(|mut worker| worker.take());
        if let Some(worker) = worker {
            if worker.join().is_err() {
                log::warn!("read recorder worker panicked");
            }
        }
    }
}

impl Drop for ReadRecorder {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for ReadRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let running = self.tx.read().map(|tx| tx.is_some()).unwrap_or(false);
        f.debug_struct("ReadRecorder").field("running", &running).finish()
    }
}
