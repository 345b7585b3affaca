use std::time::Duration;

use thiserror::Error;

use crate::core::time::TimeUnit;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid range: t1 ({t1}) must not precede t0 ({t0})")]
    InvalidRange { t0: TimeUnit, t1: TimeUnit },
    #[error("unknown timeframe: {0:?} has no label")]
    UnknownTimeframe(Duration),
    #[error("malformed key: {0}")]
    MalformedKey(String),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("store error: {0}")]
    Store(String),
    #[error("invalid cursor: {0}")]
    InvalidCursor(&'static str),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
