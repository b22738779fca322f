use reqwest::Url;

use crate::error::{AppError, Result};

use super::PipelineConfig;

/// Validate the pipeline options and surface every problem at once.
pub fn validate_config(config: &PipelineConfig) -> Result<()> {
    let mut issues = Vec::new();

    validate_workers(config, &mut issues);
    validate_window(config, &mut issues);
    validate_currency(config, &mut issues);
    validate_endpoint(config, &mut issues);

    if issues.is_empty() {
        Ok(())
    } else {
        Err(AppError::config(format!("\n  - {}", issues.join("\n  - "))))
    }
}

fn validate_workers(config: &PipelineConfig, issues: &mut Vec<String>) {
    if config.worker_count == 0 {
        issues.push("worker_count must be at least 1".to_string());
    }
}

fn validate_window(config: &PipelineConfig, issues: &mut Vec<String>) {
    if config.window_start().is_none() {
        issues.push(format!(
            "window_days {} reaches before the earliest supported date from {}",
            config.window_days, config.now
        ));
    }
}

fn validate_currency(config: &PipelineConfig, issues: &mut Vec<String>) {
    if config.designated_currency.trim().is_empty() {
        issues.push("designated_currency must not be empty".to_string());
    }
}

fn validate_endpoint(config: &PipelineConfig, issues: &mut Vec<String>) {
    match Url::parse(&config.base_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => issues.push(format!(
            "base_url must use http or https, got `{}`",
            url.scheme()
        )),
        Err(err) => issues.push(format!("base_url `{}` is invalid: {err}", config.base_url)),
    }

    if config.request_timeout.is_zero() {
        issues.push("request_timeout must be greater than zero".to_string());
    }
}
