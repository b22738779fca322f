use std::collections::HashMap;

use serde::Deserialize;

use super::{Currency, DailySnapshot};

#[derive(Debug, Deserialize)]
struct RawDailyRate {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Valute")]
    valute: HashMap<String, RawCurrency>,
}

#[derive(Debug, Deserialize)]
struct RawCurrency {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Value")]
    value: f64,
}

/// Decode one archive document. Fields other than the date label, names and values are ignored.
pub fn decode_snapshot(body: &[u8]) -> serde_json::Result<DailySnapshot> {
    let raw: RawDailyRate = serde_json::from_slice(body)?;

    let rates = raw
        .valute
        .into_iter()
        .map(|(code, currency)| {
            (
                code,
                Currency {
                    display_name: currency.name,
                    rate: currency.value,
                },
            )
        })
        .collect();

    Ok(DailySnapshot {
        date: raw.date,
        rates,
    })
}
