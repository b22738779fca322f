use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, StatusCode};

use crate::config::PipelineConfig;
use crate::error::{Context, FetchError, FetchErrorKind, Result};
use crate::fetch::{archive_url, decode_snapshot, FetchResult, RateSource};

/// One currency line of a daily snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Currency {
    pub display_name: String,
    pub rate: f64,
}

/// Every rate published for one day, keyed by currency code.
#[derive(Debug, Clone, PartialEq)]
pub struct DailySnapshot {
    /// Date label exactly as the remote document spells it.
    pub date: String,
    pub rates: HashMap<String, Currency>,
}

/// HTTP client for the daily archive of the Central Bank of Russia rates mirror.
#[derive(Debug, Clone)]
pub struct CbrClient {
    client: Client,
    base_url: String,
}

impl CbrClient {
    pub fn new(config: &PipelineConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("Failed to construct archive HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }
}

#[async_trait]
impl RateSource for CbrClient {
    async fn fetch_snapshot(&self, date: NaiveDate) -> FetchResult<DailySnapshot> {
        let url = archive_url(&self.base_url, date);

        let response = self.client.get(&url).send().await.map_err(|err| {
            FetchError::new(
                date,
                FetchErrorKind::Network,
                format!("GET {url} failed: {err}"),
            )
        })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::new(
                date,
                FetchErrorKind::BadStatus,
                format!("status {status} from {url}"),
            ));
        }

        // The request deadline also covers the body; running out of it is a network failure.
        let body = response.bytes().await.map_err(|err| {
            let kind = if err.is_timeout() {
                FetchErrorKind::Network
            } else {
                FetchErrorKind::Read
            };
            FetchError::new(date, kind, format!("failed to read response body: {err}"))
        })?;

        decode_snapshot(&body).map_err(|err| {
            FetchError::new(
                date,
                FetchErrorKind::Parse,
                format!("failed to decode response body: {err}"),
            )
        })
    }
}
