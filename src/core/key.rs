//! Sortable data keys.
//!
//! Layout: `asset prefix ++ timeframe label ++ '@' ++ be_u64(time)`.
//!
//! For a fixed asset and timeframe the key space is contiguous and ordered by
//! time, so range scans reduce to byte comparisons. Labels never contain the
//! separator, which keeps `"1m"` keys from interleaving with `"15m"` keys.

use crate::core::time::{TimeUnit, Timeframe};
use crate::core::{Error, Result};

pub const LABEL_SEPARATOR: u8 = b'@';
pub const TIME_LEN: usize = 8;

/// Encodes and decodes the keys of a single asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCodec {
    prefix: Vec<u8>,
}

impl KeyCodec {
    pub fn new(prefix: impl Into<Vec<u8>>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Asset namespace shared by every key of the asset.
    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }

    /// Prefix of one timeframe's key space (`prefix ++ label ++ '@'`).
    pub fn timeframe_prefix(&self, label: &str) -> Vec<u8> {
        let mut key = Vec::with_capacity(self.prefix.len() + label.len() + 1);
        key.extend_from_slice(&self.prefix);
        key.extend_from_slice(label.as_bytes());
        key.push(LABEL_SEPARATOR);
        key
    }

    pub fn encode(&self, label: &str, time: TimeUnit) -> Vec<u8> {
        let mut key = self.timeframe_prefix(label);
        key.extend_from_slice(&time.to_be_bytes());
        key
    }

    /// Resolve the label and encode in one step.
    pub fn encode_timeframe(&self, timeframe: Timeframe, time: TimeUnit) -> Result<Vec<u8>> {
        Ok(self.encode(&timeframe.label()?, time))
    }

    /// Split a key back into its label and time.
    ///
    /// # Errors
    ///
    /// - `Error::MalformedKey`: foreign prefix, missing separator, non-UTF-8
    ///   label, or a time tail that is not exactly 8 bytes.
    pub fn decode<'k>(&self, key: &'k [u8]) -> Result<(&'k str, TimeUnit)> {
        let rest = key
            .strip_prefix(self.prefix.as_slice())
            .ok_or_else(|| malformed("foreign asset prefix", key))?;
        let sep = rest
            .iter()
            .position(|b| *b == LABEL_SEPARATOR)
            .ok_or_else(|| malformed("missing label separator", key))?;
        let label = std::str::from_utf8(&rest[..sep])
            .map_err(|_| malformed("label is not utf-8", key))?;
        if label.is_empty() {
            return Err(malformed("empty label", key));
        }
        let tail: [u8; TIME_LEN] = rest[sep + 1..]
            .try_into()
            .map_err(|_| malformed("time is not 8 bytes", key))?;
        Ok((label, TimeUnit::from_be_bytes(tail)))
    }

    /// Decode and resolve the label to a timeframe.
    pub fn decode_timeframe(&self, key: &[u8]) -> Result<(Timeframe, TimeUnit)> {
        let (label, time) = self.decode(key)?;
        let timeframe = label
            .parse()
            .map_err(|_| malformed("unknown timeframe label", key))?;
        Ok((timeframe, time))
    }
}

fn malformed(reason: &str, key: &[u8]) -> Error {
    Error::MalformedKey(format!("{reason}: {}", hex(key)))
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
