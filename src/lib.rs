//! Multi-timeframe time-series access layer.
//!
//! Serves chronologically ordered, range- and limit-bounded reads of an
//! asset's series at several timeframe granularities over an ordered
//! key-value store, and decides which derived timeframes are stale.

pub mod asset;
pub mod core;
pub mod lifecycle;
pub mod record;
pub mod storage;

pub use crate::asset::{AssetConfig, AssetReader, AssetState, DataLimitSettings};
pub use crate::core::{Error, Result, TimeUnit, Timeframe};
pub use crate::record::{DataList, DataRecord, DataType, Value};
