//! Primitives shared by every reader: timestamps, timeframes, key layout,
//! clocks and the crate error type.

pub mod clock;
pub mod error;
pub mod key;
pub mod time;

pub use clock::{Clock, ManualClock, QuantaClock, SystemClock};
pub use error::{Error, Result};
pub use key::KeyCodec;
pub use time::{TimeUnit, Timeframe};
