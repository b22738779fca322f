use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::FetchError;

pub mod decode;
pub mod request;
pub mod snapshots;

pub use decode::decode_snapshot;
pub use request::archive_url;
pub use snapshots::{CbrClient, Currency, DailySnapshot};

pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Anything that can produce the rate snapshot published for a given date.
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch_snapshot(&self, date: NaiveDate) -> FetchResult<DailySnapshot>;
}

#[inline]
pub fn ensure_concurrency_limit(limit: usize) -> usize {
    limit.max(1)
}
