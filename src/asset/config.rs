//! Asset configuration.
//!
//! Defines the per-asset settings the catalog hands over: namespace id,
//! payload schema, base and derived timeframes, and history start.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result, TimeUnit, Timeframe};
use crate::record::DataType;

/// Separator between the asset id and the timeframe label in data keys.
pub const ASSET_KEY_SEPARATOR: char = ':';

/// Configuration for one asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetConfig {
    /// Asset identifier; also the key namespace (`"<id>:"`).
    pub id: String,

    /// Payload schema of every series of this asset.
    pub data_type: DataType,

    /// Finest, directly ingested timeframe.
    /// Default: 1m
    #[serde(default = "default_base_timeframe")]
    pub base_timeframe: Timeframe,

    /// Active derived timeframes, in registration order.
    #[serde(default)]
    pub timeframes: Vec<Timeframe>,

    /// Earliest configured history time. Backward scans stop here.
    /// Default: epoch
    #[serde(default)]
    pub history_start: TimeUnit,

    /// Stamp last-read times when callers ask for it.
    /// Default: true
    #[serde(default = "default_track_reads")]
    pub track_reads: bool,
}

fn default_base_timeframe() -> Timeframe {
    Timeframe::from_mins(1)
}

fn default_track_reads() -> bool {
    true
}

impl AssetConfig {
    pub fn new(id: impl Into<String>, data_type: DataType) -> Self {
        Self {
            id: id.into(),
            data_type,
            base_timeframe: default_base_timeframe(),
            timeframes: Vec::new(),
            history_start: TimeUnit::EPOCH,
            track_reads: default_track_reads(),
        }
    }

    pub fn with_base_timeframe(mut self, timeframe: Timeframe) -> Self {
        self.base_timeframe = timeframe;
        self
    }

    pub fn with_timeframes(mut self, timeframes: impl IntoIterator<Item = Timeframe>) -> Self {
        self.timeframes = timeframes.into_iter().collect();
        self
    }

    pub fn with_history_start(mut self, start: TimeUnit) -> Self {
        self.history_start = start;
        self
    }

    /// Load and validate a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let config: AssetConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// - `Error::InvalidConfig`: empty id, id containing the key separator,
    ///   or a timeframe listed twice.
    /// - `Error::UnknownTimeframe`: a timeframe without a label.
    pub fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(Error::InvalidConfig("asset id is empty".into()));
        }
        if self.id.contains(ASSET_KEY_SEPARATOR) {
            return Err(Error::InvalidConfig(format!(
                "asset id {:?} contains {:?}",
                self.id, ASSET_KEY_SEPARATOR
            )));
        }
        self.base_timeframe.label()?;
        let mut seen = HashSet::new();
        for timeframe in &self.timeframes {
            timeframe.label()?;
            if !seen.insert(*timeframe) {
                return Err(Error::InvalidConfig(format!(
                    "timeframe {timeframe} registered twice for {}",
                    self.id
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_asset_config_defaults() {
        let config: AssetConfig =
            serde_json::from_str(r#"{"id":"btc","data_type":"candle"}"#).unwrap();
        assert_eq!(config.base_timeframe, Timeframe::from_mins(1));
        assert!(config.timeframes.is_empty());
        assert_eq!(config.history_start, TimeUnit::EPOCH);
        assert!(config.track_reads);
        config.validate().unwrap();
    }

    #[test]
    fn test_asset_config_labels_round_trip() {
        let config = AssetConfig::new("eth", DataType::Point)
            .with_timeframes([Timeframe::from_mins(5), Timeframe::from_hours(1)]);
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains(r#""timeframes":["5m","1h"]"#));
        let deserialized: AssetConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, config);
    }

    #[test]
    fn test_asset_config_rejects_bad_ids() {
        assert!(AssetConfig::new("", DataType::Point).validate().is_err());
        assert!(AssetConfig::new("btc:usd", DataType::Point).validate().is_err());
    }

    #[test]
    fn test_asset_config_rejects_duplicates_and_unlabelled() {
        let dup = AssetConfig::new("btc", DataType::Point)
            .with_timeframes([Timeframe::from_mins(5), Timeframe::from_mins(5)]);
        assert!(matches!(dup.validate(), Err(Error::InvalidConfig(_))));

        let zero = AssetConfig::new("btc", DataType::Point)
            .with_timeframes([Timeframe::new(Duration::ZERO)]);
        assert!(matches!(zero.validate(), Err(Error::UnknownTimeframe(_))));
    }

    #[test]
    fn test_asset_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("btc.json");
        fs::write(
            &path,
            r#"{"id":"btc","data_type":"quantity","timeframes":["5m","15m"],"history_start":60000}"#,
        )
        .unwrap();
        let config = AssetConfig::from_json_file(&path).unwrap();
        assert_eq!(config.data_type, DataType::Quantity);
        assert_eq!(config.history_start, TimeUnit::from_secs(60));
        assert_eq!(
            config.timeframes,
            vec![Timeframe::from_mins(5), Timeframe::from_mins(15)]
        );
    }
}
