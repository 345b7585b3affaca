//! Last-read bookkeeping per asset and timeframe.

use std::collections::HashMap;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::core::{Error, Result, TimeUnit, Timeframe};

const READ_LOG: &str = ".read_log";
const READ_LOG_TMP: &str = ".read_log.tmp";

/// Sink for "last successful read" stamps.
pub trait ReadTracker: Send + Sync {
    fn record_read(&self, asset: &str, timeframe: Timeframe, at: TimeUnit) -> Result<()>;
}

/// Tracks the last read time of every (asset, timeframe) series.
///
/// Optionally persists to a `.read_log` file so monitoring can tell hot
/// timeframes from idle ones across restarts.
#[derive(Debug)]
pub struct AccessLog {
    /// Directory holding `.read_log`, if persistent.
    dir: Option<PathBuf>,

    /// (asset, timeframe) → last read time.
    cache: RwLock<HashMap<(String, Timeframe), TimeUnit>>,
}

impl AccessLog {
    /// Memory-only log.
    pub fn in_memory() -> Self {
        Self {
            dir: None,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Persistent log in `dir`, preloaded from an existing `.read_log`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        let cache = Self::load_log(&dir)?;
        Ok(Self {
            dir: Some(dir),
            cache: RwLock::new(cache),
        })
    }

    pub fn last_read(&self, asset: &str, timeframe: Timeframe) -> Option<TimeUnit> {
        let cache = self.cache.read().ok()?;
        cache.get(&(asset.to_string(), timeframe)).copied()
    }

    pub fn len(&self) -> usize {
        self.cache.read().map(|cache| cache.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Persist to disk via tmp file + rename. No-op for memory-only logs.
    pub fn flush(&self) -> Result<()> {
        let Some(dir) = &self.dir else {
            return Ok(());
        };
        let cache = self.cache.read().map_err(|_| poisoned())?;
        if cache.is_empty() {
            return Ok(());
        }

        let log_path = dir.join(READ_LOG);
        let tmp_path = dir.join(READ_LOG_TMP);

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp_path)?;

        // Asset ids are free text; the writer quotes any that hold a comma,
        // quote or newline.
        let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        for ((asset, timeframe), at) in cache.iter() {
            let label = timeframe.label()?;
            let millis = at.as_millis().to_string();
            wtr.write_record([asset.as_str(), label.as_str(), millis.as_str()])?;
        }

        let file = wtr.into_inner().map_err(|err| Error::Io(err.into_error()))?;
        file.sync_all()?;
        std::fs::rename(tmp_path, log_path)?;

        Ok(())
    }

    fn load_log(dir: &Path) -> Result<HashMap<(String, Timeframe), TimeUnit>> {
        let log_path = dir.join(READ_LOG);

        if !log_path.exists() {
            return Ok(HashMap::new());
        }

        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&log_path)?;
        let mut cache = HashMap::new();

        for row in rdr.records() {
            let row = match row {
                Ok(row) => row,
                Err(err) => {
                    log::debug!("skipping read log row: {err}");
                    continue;
                }
            };
            if row.len() != 3 {
                log::debug!("skipping read log row {row:?}");
                continue;
            }

            if let (Ok(timeframe), Ok(ms)) = (row[1].parse::<Timeframe>(), row[2].parse::<u64>()) {
                cache.insert((row[0].to_string(), timeframe), TimeUnit::from_millis(ms));
            }
        }

        Ok(cache)
    }
}

impl ReadTracker for AccessLog {
    fn record_read(&self, asset: &str, timeframe: Timeframe, at: TimeUnit) -> Result<()> {
        let mut cache = self.cache.write().map_err(|_| poisoned())?;
        cache.insert((asset.to_string(), timeframe), at);
        Ok(())
    }
}

fn poisoned() -> Error {
    Error::Store("read log lock poisoned".into())
}
