//! Decoded records and the payload parser seam.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result, TimeUnit};

/// Payload schema of an asset's series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// Single value per bucket (index level, mark price).
    Point,
    /// Two-sided quantity (buy volume, sell volume).
    Quantity,
    /// OHLCV candle.
    Candle,
}

impl DataType {
    /// Number of `f64` fields in the binary layout.
    pub const fn field_count(self) -> usize {
        match self {
            DataType::Point => 1,
            DataType::Quantity => 2,
            DataType::Candle => 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Value {
    Point(f64),
    Quantity {
        plus: f64,
        minus: f64,
    },
    Candle {
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    },
}

impl Value {
    fn fields(&self) -> Vec<f64> {
        match *self {
            Value::Point(v) => vec![v],
            Value::Quantity { plus, minus } => vec![plus, minus],
            Value::Candle {
                open,
                high,
                low,
                close,
                volume,
            } => vec![open, high, low, close, volume],
        }
    }
}

/// A decoded value tied to one point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataRecord {
    pub time: TimeUnit,
    pub value: Value,
}

impl DataRecord {
    pub fn new(time: TimeUnit, value: Value) -> Self {
        Self { time, value }
    }
}

/// Chronologically ordered records of one asset and timeframe.
///
/// Forward scans `append`, backward scans `prepend`; either way the list
/// reads oldest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataList {
    records: VecDeque<DataRecord>,
}

impl DataList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(capacity),
        }
    }

    pub fn append(&mut self, record: DataRecord) {
        self.records.push_back(record);
    }

    pub fn prepend(&mut self, record: DataRecord) {
        self.records.push_front(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first(&self) -> Option<&DataRecord> {
        self.records.front()
    }

    pub fn last(&self) -> Option<&DataRecord> {
        self.records.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DataRecord> {
        self.records.iter()
    }

    pub fn times(&self) -> Vec<TimeUnit> {
        self.records.iter().map(|r| r.time).collect()
    }
}

impl IntoIterator for DataList {
    type Item = DataRecord;
    type IntoIter = std::collections::vec_deque::IntoIter<DataRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

/// Turns raw stored bytes into records.
pub trait RecordParser: Send + Sync {
    /// # Errors
    ///
    /// - `Error::Decode`: bytes do not match the schema.
    fn decode(&self, data_type: DataType, raw: &[u8], time: TimeUnit) -> Result<DataRecord>;
}

/// Fixed-width little-endian `f64` fields, `DataType::field_count` per record.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryParser;

impl BinaryParser {
    pub fn encode(value: &Value) -> Vec<u8> {
        value
            .fields()
            .into_iter()
            .flat_map(f64::to_le_bytes)
            .collect()
    }
}

impl RecordParser for BinaryParser {
    fn decode(&self, data_type: DataType, raw: &[u8], time: TimeUnit) -> Result<DataRecord> {
        let expected = data_type.field_count() * 8;
        if raw.len() != expected {
            return Err(Error::Decode(format!(
                "{data_type:?} at {time}: expected {expected} bytes, got {}",
                raw.len()
            )));
        }
        let mut fields = raw.chunks_exact(8).map(|chunk| {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(chunk);
            f64::from_le_bytes(buf)
        });
        let mut field = || fields.next().unwrap_or(f64::NAN);
        let value = match data_type {
            DataType::Point => Value::Point(field()),
            DataType::Quantity => Value::Quantity {
                plus: field(),
                minus: field(),
            },
            DataType::Candle => Value::Candle {
                open: field(),
                high: field(),
                low: field(),
                close: field(),
                volume: field(),
            },
        };
        Ok(DataRecord::new(time, value))
    }
}
