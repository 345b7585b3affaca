//! Range, bounded and point reads over one asset.
//!
//! # Design
//!
//! - **Range**: half-open `[t0, t1)` forward scan, optionally on a snapshot
//!   and cursor the caller already holds.
//! - **Bounded**: directional, limit-capped scan that always skips the record
//!   at the offset, which makes it safe for cursor pagination.
//! - **Points**: earliest/latest lookups built on the bounded scan.
//!
//! Every result is chronological regardless of scan direction. Snapshots and
//! cursors opened here are dropped on every return path.

use std::sync::Arc;

use crate::asset::consistency::ConsistencySource;
use crate::asset::AssetState;
use crate::core::{Clock, Error, Result, SystemClock, TimeUnit, Timeframe};
use crate::lifecycle::ReadRecorder;
use crate::record::{BinaryParser, DataList, DataRecord, RecordParser};
use crate::storage::{Cursor, CursorOptions, OrderedStore, Snapshot};

/// Limits below this hint the cursor to prefetch exactly `limit` entries.
const PREFETCH_HINT_MAX: usize = 100;

/// Parameters of a bounded scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataLimitSettings {
    pub timeframe: Timeframe,
    /// Maximum records returned. Zero means no cap.
    pub limit: usize,
    /// Exclusive boundary; the record at this time is never returned.
    pub offset: TimeUnit,
    /// Scan backward from `offset` instead of forward.
    pub start_by_end: bool,
}

impl DataLimitSettings {
    /// Up to `limit` records strictly after `offset`.
    pub fn forward(timeframe: Timeframe, limit: usize, offset: TimeUnit) -> Self {
        Self {
            timeframe,
            limit,
            offset,
            start_by_end: false,
        }
    }

    /// Up to `limit` records strictly before `offset`.
    pub fn backward(timeframe: Timeframe, limit: usize, offset: TimeUnit) -> Self {
        Self {
            timeframe,
            limit,
            offset,
            start_by_end: true,
        }
    }
}

/// One raw entry of an asset dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEntry {
    pub timeframe: Timeframe,
    pub time: TimeUnit,
    pub value_len: usize,
}

/// Read access to one asset's series.
///
/// Cheap to clone; clones share the store, collaborators and recorder.
#[derive(Clone)]
pub struct AssetReader {
    pub(crate) state: AssetState,
    store: Arc<dyn OrderedStore>,
    parser: Arc<dyn RecordParser>,
    pub(crate) consistency: Arc<dyn ConsistencySource>,
    clock: Arc<dyn Clock>,
    recorder: Option<Arc<ReadRecorder>>,
}

impl AssetReader {
    pub fn new(
        state: AssetState,
        store: Arc<dyn OrderedStore>,
        consistency: Arc<dyn ConsistencySource>,
    ) -> Self {
        Self {
            state,
            store,
            parser: Arc::new(BinaryParser),
            consistency,
            clock: Arc::new(SystemClock),
            recorder: None,
        }
    }

    pub fn with_parser(mut self, parser: Arc<dyn RecordParser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_recorder(mut self, recorder: Arc<ReadRecorder>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    pub fn state(&self) -> &AssetState {
        &self.state
    }

    /// Active derived timeframes in registration order.
    pub fn active_timeframes(&self) -> &[Timeframe] {
        self.state.active_timeframes()
    }

    /// Open a read-only snapshot that several range reads can share.
    pub fn snapshot(&self) -> Result<Box<dyn Snapshot + '_>> {
        self.store.snapshot()
    }

    /// Records with `t0 <= time < t1`, oldest first.
    ///
    /// `txn` and `cursor` are reused as-is when supplied; otherwise a snapshot
    /// and a forward cursor are opened for this call only. A supplied cursor
    /// must belong to `txn` (or to a snapshot of the same store).
    ///
    /// # Errors
    ///
    /// - `Error::InvalidRange`: `t1 < t0`.
    /// - `Error::UnknownTimeframe`: the timeframe has no label.
    /// - `Error::InvalidCursor`: the supplied cursor scans backward.
    /// - `Error::MalformedKey` / `Error::Decode`: corrupt key or value.
    pub fn get_in_data_range(
        &self,
        t0: TimeUnit,
        t1: TimeUnit,
        timeframe: Timeframe,
        txn: Option<&dyn Snapshot>,
        cursor: Option<&mut dyn Cursor>,
        record_reading: bool,
    ) -> Result<DataList> {
        if t1 < t0 {
            return Err(Error::InvalidRange { t0, t1 });
        }
        let label = timeframe.label()?;

        let owned_txn;
        let txn: &dyn Snapshot = match txn {
            Some(txn) => txn,
            None => {
                owned_txn = self.store.snapshot()?;
                owned_txn.as_ref()
            }
        };

        let mut owned_cursor;
        let cursor: &mut dyn Cursor = match cursor {
            Some(cursor) => cursor,
            None => {
                owned_cursor = txn.cursor(CursorOptions::forward());
                owned_cursor.as_mut()
            }
        };
        if cursor.is_reverse() {
            return Err(Error::InvalidCursor("range reads need a forward cursor"));
        }

        let codec = self.state.codec();
        let start_key = codec.encode(&label, t0);
        let limit_key = codec.encode(&label, t1);

        let mut ret = DataList::new();
        cursor.seek(&start_key);
        while let Some(key) = cursor.key() {
            if key >= limit_key.as_slice() {
                break;
            }
            let (_, time) = codec.decode(key)?;
            let raw = cursor.value()?;
            ret.append(self.parser.decode(self.state.data_type(), &raw, time)?);
            cursor.next();
        }

        if record_reading {
            self.record_read(timeframe);
        }

        Ok(ret)
    }

    /// Bounded, offset-exclusive scan.
    ///
    /// Forward scans stop at the timeframe's latest record; backward scans
    /// stop at the asset's history start. With `limit > 1` an inactive
    /// timeframe yields an empty list rather than an error.
    pub fn get_data_limit(&self, settings: &DataLimitSettings, record_reading: bool) -> Result<DataList> {
        if settings.limit > 1 && !self.state.is_timeframe_supported(settings.timeframe) {
            log::debug!(
                "asset={} timeframe={} is not active, serving nothing",
                self.state.id(),
                settings.timeframe
            );
            return Ok(DataList::new());
        }
        let label = settings.timeframe.label()?;

        let txn = self.store.snapshot()?;
        let Some(terminal) = self.terminal_bound(txn.as_ref(), settings, &label)? else {
            return Ok(DataList::new());
        };
        let ret = self.scan_limit(txn.as_ref(), &label, settings, terminal, false)?;

        if record_reading {
            self.record_read(settings.timeframe);
        }

        Ok(ret)
    }

    /// Oldest record of the timeframe, if any. A record at the epoch counts.
    pub fn get_earliest_data(&self, timeframe: Timeframe) -> Result<Option<DataRecord>> {
        let label = timeframe.label()?;
        let txn = self.store.snapshot()?;
        let settings = DataLimitSettings::forward(timeframe, 1, TimeUnit::EPOCH);
        let Some(terminal) = self.terminal_bound(txn.as_ref(), &settings, &label)? else {
            return Ok(None);
        };
        let list = self.scan_limit(txn.as_ref(), &label, &settings, terminal, true)?;
        Ok(list.into_iter().next())
    }

    /// Newest record strictly before the clock's "now", if any.
    pub fn get_latest_data(&self, timeframe: Timeframe) -> Result<Option<DataRecord>> {
        let label = timeframe.label()?;
        let txn = self.store.snapshot()?;
        self.latest_in(txn.as_ref(), timeframe, &label)
    }

    /// Time of the latest record, or `None` when nothing is indexed yet.
    pub fn last_indexed_time(&self, timeframe: Timeframe) -> Result<Option<TimeUnit>> {
        Ok(self.get_latest_data(timeframe)?.map(|record| record.time))
    }

    /// Every key stored under the asset's prefix, in key order.
    pub fn scan_asset(&self) -> Result<Vec<KeyEntry>> {
        let codec = self.state.codec();
        let txn = self.store.snapshot()?;
        let mut cursor = txn.cursor(CursorOptions::forward().with_prefix(codec.prefix()));

        let mut entries = Vec::new();
        cursor.seek(codec.prefix());
        while let Some(key) = cursor.key() {
            let (timeframe, time) = codec.decode_timeframe(key)?;
            let value_len = cursor.value()?.len();
            log::debug!(
                "asset={} timeframe={} time={} value_len={}",
                self.state.id(),
                timeframe,
                time,
                value_len
            );
            entries.push(KeyEntry {
                timeframe,
                time,
                value_len,
            });
            cursor.next();
        }
        Ok(entries)
    }

    fn latest_in(&self, txn: &dyn Snapshot, timeframe: Timeframe, label: &str) -> Result<Option<DataRecord>> {
        let settings = DataLimitSettings::backward(timeframe, 1, self.clock.now());
        let list = self.scan_limit(txn, label, &settings, self.state.history_start(), false)?;
        Ok(list.into_iter().next())
    }

    /// Last key a bounded scan may visit: the history start going backward,
    /// the latest record going forward. `None` when there is no latest record.
    fn terminal_bound(
        &self,
        txn: &dyn Snapshot,
        settings: &DataLimitSettings,
        label: &str,
    ) -> Result<Option<TimeUnit>> {
        if settings.start_by_end {
            return Ok(Some(self.state.history_start()));
        }
        Ok(self
            .latest_in(txn, settings.timeframe, label)?
            .map(|latest| latest.time))
    }

    /// Core of every bounded read. `include_offset` is only set by the
    /// earliest lookup, which must see a record sitting at the epoch.
    fn scan_limit(
        &self,
        txn: &dyn Snapshot,
        label: &str,
        settings: &DataLimitSettings,
        terminal: TimeUnit,
        include_offset: bool,
    ) -> Result<DataList> {
        let backward = settings.start_by_end;

        let codec = self.state.codec();
        let start_key = codec.encode(label, settings.offset);
        let limit_key = codec.encode(label, terminal);

        let mut opts = if backward {
            CursorOptions::backward()
        } else {
            CursorOptions::forward()
        };
        if settings.limit > 0 && settings.limit < PREFETCH_HINT_MAX {
            opts = opts.with_prefetch_size(settings.limit);
        }
        let mut cursor = txn.cursor(opts);

        let mut ret = DataList::with_capacity(settings.limit.min(PREFETCH_HINT_MAX));
        cursor.seek(&start_key);
        while let Some(key) = cursor.key() {
            if !include_offset && key == start_key.as_slice() {
                cursor.next();
                continue;
            }
            let past_terminal = if backward {
                key < limit_key.as_slice()
            } else {
                key > limit_key.as_slice()
            };
            if past_terminal {
                break;
            }

            let (_, time) = codec.decode(key)?;
            let raw = cursor.value()?;
            let record = self.parser.decode(self.state.data_type(), &raw, time)?;
            if backward {
                ret.prepend(record);
            } else {
                ret.append(record);
            }

            if ret.len() == settings.limit {
                break;
            }
            cursor.next();
        }

        Ok(ret)
    }

    fn record_read(&self, timeframe: Timeframe) {
        if !self.state.track_reads() {
            return;
        }
        match &self.recorder {
            Some(recorder) => recorder.on_new_read(self.state.id(), timeframe),
            None => log::debug!(
                "asset={} timeframe={} read not recorded: no recorder",
                self.state.id(),
                timeframe
            ),
        }
    }
}

impl std::fmt::Debug for AssetReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetReader")
            .field("asset", &self.state.id())
            .field("recorder", &self.recorder.is_some())
            .finish()
    }
}
