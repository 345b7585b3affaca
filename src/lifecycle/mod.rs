//! Read-side lifecycle bookkeeping.
//!
//! Successful reads can stamp a "last read" time per asset and timeframe so
//! an external monitor can tell which derived series are still consumed:
//!
//! - [`ReadTracker`]: where stamps land ([`AccessLog`] ships in-tree).
//! - [`ReadRecorder`]: detached background worker feeding a tracker.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tfstore::core::SystemClock;
//! use tfstore::lifecycle::{AccessLog, ReadRecorder};
//!
//! let log = Arc::new(AccessLog::open("./state")?);
//! let recorder = ReadRecorder::spawn(log.clone(), Arc::new(SystemClock))?;
//! recorder.on_new_read("btc", "5m".parse()?);
//! recorder.shutdown();
//! log.flush()?;
//! ```

mod access_tracker;
mod recorder;

pub use access_tracker::{AccessLog, ReadTracker};
pub use recorder::{ReadRecorder, DEFAULT_QUEUE_CAPACITY};
