//! Timestamps and timeframe granularities.
//!
//! `TimeUnit` is a millisecond count since the UNIX epoch. Every value,
//! including zero, is a real point in time: absence is always expressed with
//! `Option<TimeUnit>`.
//!
//! `Timeframe` is a bucket width. Each timeframe maps to a stable label that
//! namespaces its keys in the store (`60s` is `"1m"`, `4h` is `"4h"`).

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};

/// Millisecond timestamp. Ordered, copyable, resolution fixed at 1ms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeUnit(u64);

impl TimeUnit {
    pub const EPOCH: TimeUnit = TimeUnit(0);
    pub const MAX: TimeUnit = TimeUnit(u64::MAX);

    pub const fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    pub const fn from_secs(secs: u64) -> Self {
        Self(secs.saturating_mul(1000))
    }

    pub const fn as_millis(self) -> u64 {
        self.0
    }

    /// Advance by a duration, saturating at `TimeUnit::MAX`.
    pub fn add(self, duration: Duration) -> Self {
        let ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        Self(self.0.saturating_add(ms))
    }

    /// Big-endian encoding; byte order matches numeric order.
    pub fn to_be_bytes(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }

    pub fn from_be_bytes(bytes: [u8; 8]) -> Self {
        Self(u64::from_be_bytes(bytes))
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TimeUnit {
    fn from(ms: u64) -> Self {
        Self(ms)
    }
}

const LABEL_UNITS: [(&str, u128); 6] = [
    ("w", 7 * 24 * 3_600_000),
    ("d", 24 * 3_600_000),
    ("h", 3_600_000),
    ("m", 60_000),
    ("s", 1_000),
    ("ms", 1),
];

/// Bucket width of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timeframe(Duration);

impl Timeframe {
    pub const fn new(duration: Duration) -> Self {
        Self(duration)
    }

    pub const fn from_secs(secs: u64) -> Self {
        Self(Duration::from_secs(secs))
    }

    pub const fn from_mins(mins: u64) -> Self {
        Self(Duration::from_secs(mins * 60))
    }

    pub const fn from_hours(hours: u64) -> Self {
        Self(Duration::from_secs(hours * 3600))
    }

    pub const fn duration(self) -> Duration {
        self.0
    }

    /// Namespacing label used in data keys.
    ///
    /// # Errors
    ///
    /// - `Error::UnknownTimeframe`: zero width, or not a whole number of
    ///   milliseconds.
    pub fn label(self) -> Result<String> {
        let nanos = self.0.as_nanos();
        if nanos == 0 || nanos % 1_000_000 != 0 {
            return Err(Error::UnknownTimeframe(self.0));
        }
        let ms = nanos / 1_000_000;
        for (suffix, unit) in LABEL_UNITS {
            if ms % unit == 0 {
                return Ok(format!("{}{}", ms / unit, suffix));
            }
        }
        Err(Error::UnknownTimeframe(self.0))
    }
}

impl From<Duration> for Timeframe {
    fn from(duration: Duration) -> Self {
        Self(duration)
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.label() {
            Ok(label) => f.write_str(&label),
            Err(_) => write!(f, "{:?}", self.0),
        }
    }
}

impl FromStr for Timeframe {
    type Err = Error;

    fn from_str(label: &str) -> Result<Self> {
        let invalid = || Error::InvalidConfig(format!("invalid timeframe label {label:?}"));
        let split = label
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(invalid)?;
        let (count, suffix) = label.split_at(split);
        let count: u64 = count.parse().map_err(|_| invalid())?;
        let unit = LABEL_UNITS
            .iter()
            .find(|(s, _)| *s == suffix)
            .map(|(_, unit)| *unit as u64)
            .ok_or_else(invalid)?;
        let ms = count.checked_mul(unit).ok_or_else(invalid)?;
        let timeframe = Self(Duration::from_millis(ms));
        // Reject non-canonical spellings such as "60s" for "1m".
        if timeframe.label()? != label {
            return Err(invalid());
        }
        Ok(timeframe)
    }
}

impl Serialize for Timeframe {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let label = self.label().map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&label)
    }
}

impl<'de> Deserialize<'de> for Timeframe {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        label.parse().map_err(serde::de::Error::custom)
    }
}
