//! Per-asset time-series access.
//!
//! An asset owns one series per timeframe, all under its key namespace. The
//! base timeframe is ingested directly; every other active timeframe is a
//! derived aggregate that may lag behind and need reindexing.
//!
//! ```no_run
//! use std::sync::Arc;
//! use tfstore::asset::{AssetConfig, AssetReader, AssetState, CheckpointRegistry, DataLimitSettings};
//! use tfstore::core::{TimeUnit, Timeframe};
//! use tfstore::record::DataType;
//! use tfstore::storage::MemoryStore;
//!
//! let state = AssetState::from_config(
//!     AssetConfig::new("btc", DataType::Candle).with_timeframes([Timeframe::from_mins(5)]),
//! )?;
//! let reader = AssetReader::new(state, Arc::new(MemoryStore::new()), Arc::new(CheckpointRegistry::new()));
//!
//! let bars = reader.get_in_data_range(
//!     TimeUnit::from_secs(0),
//!     TimeUnit::from_secs(3600),
//!     Timeframe::from_mins(1),
//!     None,
//!     None,
//!     false,
//! )?;
//! let page = reader.get_data_limit(
//!     &DataLimitSettings::forward(Timeframe::from_mins(5), 50, TimeUnit::from_secs(0)),
//!     true,
//! )?;
//! let stale = reader.get_timeframe_to_reindex()?;
//! # Ok::<(), tfstore::core::Error>(())
//! ```

mod config;
mod consistency;
mod reader;
mod state;

pub use config::{AssetConfig, ASSET_KEY_SEPARATOR};
pub use consistency::{Checkpoint, CheckpointRegistry, ConsistencySource};
pub use reader::{AssetReader, DataLimitSettings, KeyEntry};
pub use state::AssetState;
