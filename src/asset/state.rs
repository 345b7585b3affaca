use std::sync::Arc;

use crate::asset::config::{AssetConfig, ASSET_KEY_SEPARATOR};
use crate::core::{KeyCodec, Result, TimeUnit, Timeframe};
use crate::record::DataType;

/// Immutable per-asset context shared by every concurrent read.
///
/// Built once from a validated `AssetConfig`; cloning is cheap and all
/// clones observe the same settings.
#[derive(Debug, Clone)]
pub struct AssetState {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    id: String,
    data_type: DataType,
    codec: KeyCodec,
    base_timeframe: Timeframe,
    timeframes: Vec<Timeframe>,
    history_start: TimeUnit,
    track_reads: bool,
}

impl AssetState {
    pub fn from_config(config: AssetConfig) -> Result<Self> {
        config.validate()?;
        let codec = KeyCodec::new(format!("{}{}", config.id, ASSET_KEY_SEPARATOR));
        Ok(Self {
            inner: Arc::new(Inner {
                id: config.id,
                data_type: config.data_type,
                codec,
                base_timeframe: config.base_timeframe,
                timeframes: config.timeframes,
                history_start: config.history_start,
                track_reads: config.track_reads,
            }),
        })
    }

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn data_type(&self) -> DataType {
        self.inner.data_type
    }

    pub fn codec(&self) -> &KeyCodec {
        &self.inner.codec
    }

    pub fn base_timeframe(&self) -> Timeframe {
        self.inner.base_timeframe
    }

    /// Active derived timeframes in registration order.
    pub fn active_timeframes(&self) -> &[Timeframe] {
        &self.inner.timeframes
    }

    /// Earliest configured history time.
    pub fn history_start(&self) -> TimeUnit {
        self.inner.history_start
    }

    pub fn track_reads(&self) -> bool {
        self.inner.track_reads
    }

    /// The base timeframe is always served; others only while active.
    pub fn is_timeframe_supported(&self, timeframe: Timeframe) -> bool {
        timeframe == self.inner.base_timeframe || self.inner.timeframes.contains(&timeframe)
    }
}
