//! Cross-timeframe consistency and reindex planning.
//!
//! The base timeframe advances a consistency frontier: the time up to which
//! its data is known to be gap-free. A derived timeframe is caught up when
//! its latest bucket, widened by its own duration, still reaches past that
//! frontier:
//!
//! ```text
//! frontier = max(checkpoint(base), latest(base))
//! up_to_date(tf) = latest(tf) + width(tf) > frontier
//! ```
//!
//! The strict inequality tolerates exactly one still-open bucket. When the
//! widened bucket lands exactly on the frontier the bucket is closed and must
//! be indexed, so the timeframe is reported stale.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::asset::AssetReader;
use crate::core::{Error, Result, TimeUnit, Timeframe};

/// External view of the ingestion pipeline's consistency state.
pub trait ConsistencySource: Send + Sync {
    /// Time up to which `timeframe` is verified gap-free, if ever checked.
    fn last_consistency_time(&self, asset: &str, timeframe: Timeframe) -> Result<Option<TimeUnit>>;

    /// Whether `timeframe` currently has no known gaps.
    fn is_consistent(&self, asset: &str, timeframe: Timeframe) -> Result<bool>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Checkpoint {
    pub time: Option<TimeUnit>,
    pub consistent: bool,
}

/// In-memory consistency table, written by ingestion and read here.
///
/// Unknown series report no checkpoint and are not consistent.
#[derive(Debug, Default)]
pub struct CheckpointRegistry {
    checkpoints: RwLock<HashMap<(String, Timeframe), Checkpoint>>,
}

impl CheckpointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, asset: &str, timeframe: Timeframe, checkpoint: Checkpoint) -> Result<()> {
        let mut checkpoints = self.checkpoints.write().map_err(|_| poisoned())?;
        checkpoints.insert((asset.to_string(), timeframe), checkpoint);
        Ok(())
    }

    pub fn get(&self, asset: &str, timeframe: Timeframe) -> Result<Checkpoint> {
        let checkpoints = self.checkpoints.read().map_err(|_| poisoned())?;
        Ok(checkpoints
            .get(&(asset.to_string(), timeframe))
            .copied()
            .unwrap_or_default())
    }
}

impl ConsistencySource for CheckpointRegistry {
    fn last_consistency_time(&self, asset: &str, timeframe: Timeframe) -> Result<Option<TimeUnit>> {
        Ok(self.get(asset, timeframe)?.time)
    }

    fn is_consistent(&self, asset: &str, timeframe: Timeframe) -> Result<bool> {
        Ok(self.get(asset, timeframe)?.consistent)
    }
}

fn poisoned() -> Error {
    Error::Store("checkpoint registry lock poisoned".into())
}

impl AssetReader {
    /// Whether `timeframe` is indexed up to the base frontier, allowing one
    /// open bucket. A timeframe with no data is never up to date.
    pub fn is_timeframe_index_up_to_date(&self, timeframe: Timeframe) -> Result<bool> {
        let base = self.state.base_timeframe();
        let checkpoint = self
            .consistency
            .last_consistency_time(self.state.id(), base)?;
        let base_latest = self.last_indexed_time(base)?;
        let frontier = checkpoint.max(base_latest);

        let Some(latest) = self.last_indexed_time(timeframe)? else {
            return Ok(false);
        };
        let reach = latest.add(timeframe.duration());
        Ok(frontier.map_or(true, |frontier| reach > frontier))
    }

    /// Active timeframes that need reindexing, in registration order.
    ///
    /// Empty while the base timeframe is inconsistent: derived series are not
    /// rebuilt from data with known gaps.
    pub fn get_timeframe_to_reindex(&self) -> Result<Vec<Timeframe>> {
        let base = self.state.base_timeframe();
        if !self.consistency.is_consistent(self.state.id(), base)? {
            log::debug!(
                "asset={} base timeframe {} inconsistent, skipping reindex plan",
                self.state.id(),
                base
            );
            return Ok(Vec::new());
        }

        let mut reindex = Vec::new();
        for &timeframe in self.state.active_timeframes() {
            if !self.is_timeframe_index_up_to_date(timeframe)? {
                reindex.push(timeframe);
            }
        }
        Ok(reindex)
    }
}
