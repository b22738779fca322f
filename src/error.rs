use std::fmt;

use chrono::NaiveDate;
use thiserror::Error;

pub use anyhow::Context;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Join(#[from] tokio::task::JoinError),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    pub fn config<T: Into<String>>(msg: T) -> Self {
        AppError::Config(msg.into())
    }
}

/// Why a single archive date could not be turned into a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    Network,
    BadStatus,
    Read,
    Parse,
}

impl fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FetchErrorKind::Network => "network error",
            FetchErrorKind::BadStatus => "bad status",
            FetchErrorKind::Read => "read error",
            FetchErrorKind::Parse => "parse error",
        };
        f.write_str(label)
    }
}

/// Per-date failure forwarded to the aggregator. Never fatal for the run.
#[derive(Debug, Clone, Error)]
#[error("{kind} for {}: {detail}", .date.format("%Y/%m/%d"))]
pub struct FetchError {
    pub date: NaiveDate,
    pub kind: FetchErrorKind,
    pub detail: String,
}

impl FetchError {
    pub fn new(date: NaiveDate, kind: FetchErrorKind, detail: impl Into<String>) -> Self {
        Self {
            date,
            kind,
            detail: detail.into(),
        }
    }
}
