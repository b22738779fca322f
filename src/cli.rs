use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;

use crate::config::ConfigOverrides;

#[derive(Debug, Parser)]
#[command(name = "rates-cli")]
#[command(about = "Summarise daily Central Bank of Russia exchange rates over a trailing window")]
#[command(version)]
pub struct Cli {
    /// JSON file with pipeline options; flags given here take precedence
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Length of the trailing window in calendar days
    #[arg(short, long)]
    pub days: Option<u32>,

    /// Number of concurrent fetch workers
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Currency code whose mean rate is reported (e.g. USD)
    #[arg(long)]
    pub currency: Option<String>,

    /// Last day of the window, YYYY-MM-DD (defaults to today)
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Root URL of the daily archive
    #[arg(long)]
    pub base_url: Option<String>,

    /// Per-request deadline in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            window_days: self.days,
            worker_count: self.workers,
            designated_currency: self.currency.clone(),
            now: self.date,
            base_url: self.base_url.clone(),
            request_timeout_secs: self.timeout_secs,
        }
    }
}
