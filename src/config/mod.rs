use std::time::Duration;

use chrono::{Local, NaiveDate};

use crate::pipeline::window_start;

pub mod loader;
pub mod validator;

pub use loader::{load_config_file, ConfigOverrides};
pub use validator::validate_config;

pub const DEFAULT_WINDOW_DAYS: u32 = 90;
pub const DEFAULT_WORKER_COUNT: usize = 5;
pub const DEFAULT_DESIGNATED_CURRENCY: &str = "USD";
pub const DEFAULT_BASE_URL: &str = "https://www.cbr-xml-daily.ru";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Options injected into the fetch/aggregate pipeline at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Trailing window length; the range is `[now - window_days, now]` inclusive.
    pub window_days: u32,
    pub worker_count: usize,
    /// Currency code whose mean rate is reported.
    pub designated_currency: String,
    /// Reference date that closes the window.
    pub now: NaiveDate,
    pub base_url: String,
    pub request_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            window_days: DEFAULT_WINDOW_DAYS,
            worker_count: DEFAULT_WORKER_COUNT,
            designated_currency: DEFAULT_DESIGNATED_CURRENCY.to_string(),
            now: Local::now().date_naive(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl PipelineConfig {
    pub fn with_window_days(mut self, window_days: u32) -> Self {
        self.window_days = window_days;
        self
    }

    pub fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    pub fn with_designated_currency(mut self, code: impl Into<String>) -> Self {
        self.designated_currency = code.into();
        self
    }

    pub fn with_now(mut self, now: NaiveDate) -> Self {
        self.now = now;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Apply every override that is set, leaving the rest untouched.
    pub fn apply(mut self, overrides: &ConfigOverrides) -> Self {
        if let Some(days) = overrides.window_days {
            self.window_days = days;
        }
        if let Some(workers) = overrides.worker_count {
            self.worker_count = workers;
        }
        if let Some(code) = &overrides.designated_currency {
            self.designated_currency = code.clone();
        }
        if let Some(now) = overrides.now {
            self.now = now;
        }
        if let Some(url) = &overrides.base_url {
            self.base_url = url.clone();
        }
        if let Some(secs) = overrides.request_timeout_secs {
            self.request_timeout = Duration::from_secs(secs);
        }
        self
    }

    /// First day of the window, before weekend filtering. `None` when `window_days` reaches
    /// past the earliest representable date.
    pub fn window_start(&self) -> Option<NaiveDate> {
        window_start(self.now, self.window_days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_only_replace_present_fields() {
        let base = PipelineConfig::default()
            .with_now(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
            .with_designated_currency("EUR");
        let overrides = ConfigOverrides {
            window_days: Some(10),
            request_timeout_secs: Some(5),
            ..ConfigOverrides::default()
        };

        let merged = base.clone().apply(&overrides);

        assert_eq!(merged.window_days, 10);
        assert_eq!(merged.request_timeout, Duration::from_secs(5));
        assert_eq!(merged.designated_currency, "EUR");
        assert_eq!(merged.worker_count, base.worker_count);
        assert_eq!(merged.now, base.now);
    }

    #[test]
    fn window_start_counts_back_calendar_days() {
        let config = PipelineConfig::default()
            .with_now(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
            .with_window_days(2);

        assert_eq!(config.window_start(), NaiveDate::from_ymd_opt(2024, 2, 28));
    }

    #[test]
    fn window_start_is_none_past_calendar_range() {
        let config = PipelineConfig::default()
            .with_now(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
            .with_window_days(200_000_000);

        assert_eq!(config.window_start(), None);
    }
}
