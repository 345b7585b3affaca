#![allow(dead_code)]

use std::sync::Arc;

use tfstore::asset::{AssetConfig, AssetReader, AssetState, CheckpointRegistry};
use tfstore::core::{ManualClock, TimeUnit, Timeframe};
use tfstore::record::{BinaryParser, DataList, DataType, Value};
use tfstore::storage::MemoryStore;

pub const ONE_MIN: Timeframe = Timeframe::from_mins(1);
pub const FIVE_MIN: Timeframe = Timeframe::from_mins(5);
pub const ONE_HOUR: Timeframe = Timeframe::from_hours(1);

/// Clock far enough ahead that every fixture row is in the past.
pub const NOW_SECS: u64 = 1_000_000;

pub struct Fixture {
    pub state: AssetState,
    pub store: Arc<MemoryStore>,
    pub registry: Arc<CheckpointRegistry>,
    pub clock: Arc<ManualClock>,
}

impl Fixture {
    pub fn new(config: AssetConfig) -> Self {
        Self {
            state: AssetState::from_config(config).expect("asset state"),
            store: Arc::new(MemoryStore::new()),
            registry: Arc::new(CheckpointRegistry::new()),
            clock: Arc::new(ManualClock::new(TimeUnit::from_secs(NOW_SECS))),
        }
    }

    /// `btc` point series with 5m and 1h derived timeframes.
    pub fn btc() -> Self {
        Self::new(AssetConfig::new("btc", DataType::Point).with_timeframes([FIVE_MIN, ONE_HOUR]))
    }

    pub fn put(&self, timeframe: Timeframe, secs: u64) {
        let key = self
            .state
            .codec()
            .encode_timeframe(timeframe, TimeUnit::from_secs(secs))
            .expect("key");
        self.store
            .put(key, BinaryParser::encode(&Value::Point(secs as f64)))
            .expect("put");
    }

    pub fn put_all(&self, timeframe: Timeframe, secs: impl IntoIterator<Item = u64>) {
        for s in secs {
            self.put(timeframe, s);
        }
    }

    pub fn reader(&self) -> AssetReader {
        AssetReader::new(self.state.clone(), self.store.clone(), self.registry.clone())
            .with_clock(self.clock.clone())
    }
}

pub fn secs(list: &DataList) -> Vec<u64> {
    list.times().iter().map(|t| t.as_millis() / 1000).collect()
}

pub fn t(secs: u64) -> TimeUnit {
    TimeUnit::from_secs(secs)
}
