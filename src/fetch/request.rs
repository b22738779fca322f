use chrono::NaiveDate;

/// Archive document published for `date`, e.g. `{base}/archive/2024/05/17/daily_json.js`.
pub fn archive_url(base_url: &str, date: NaiveDate) -> String {
    format!(
        "{}/archive/{}/daily_json.js",
        base_url.trim_end_matches('/'),
        date.format("%Y/%m/%d")
    )
}
