use std::{fs, path::Path};

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::{Context, Result};

/// Partial configuration read from a JSON file or the command line. Unset keys keep defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigOverrides {
    pub window_days: Option<u32>,
    pub worker_count: Option<usize>,
    pub designated_currency: Option<String>,
    pub now: Option<NaiveDate>,
    pub base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

impl ConfigOverrides {
    /// Layer `other` on top of `self`; values present in `other` win.
    pub fn merge(self, other: ConfigOverrides) -> ConfigOverrides {
        ConfigOverrides {
            window_days: other.window_days.or(self.window_days),
            worker_count: other.worker_count.or(self.worker_count),
            designated_currency: other.designated_currency.or(self.designated_currency),
            now: other.now.or(self.now),
            base_url: other.base_url.or(self.base_url),
            request_timeout_secs: other.request_timeout_secs.or(self.request_timeout_secs),
        }
    }
}

/// Read pipeline overrides from a JSON document such as
/// `{"window_days": 30, "designated_currency": "EUR"}`.
pub fn load_config_file(path: &Path) -> Result<ConfigOverrides> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;

    let overrides: ConfigOverrides = serde_json::from_str(&json)
        .with_context(|| format!("failed to parse config file at {}", path.display()))?;

    Ok(overrides)
}
