use std::collections::HashMap;

use log::warn;
use tokio::sync::mpsc;

use crate::error::FetchError;
use crate::fetch::{Currency, DailySnapshot};

/// Lowest or highest rate seen for one currency code, with the day it was published.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtremeRecord {
    pub display_name: String,
    pub date: String,
    pub value: f64,
}

impl ExtremeRecord {
    fn observed(currency: &Currency, date: &str) -> Self {
        Self {
            display_name: currency.display_name.clone(),
            date: date.to_string(),
            value: currency.rate,
        }
    }
}

/// Running statistics over every drained snapshot and error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateState {
    pub max_by_code: HashMap<String, ExtremeRecord>,
    pub min_by_code: HashMap<String, ExtremeRecord>,
    pub sum: f64,
    pub sum_count: usize,
    pub success_days: usize,
    pub error_count: usize,
}

impl AggregateState {
    /// Mean rate of the designated currency, `None` when it was never observed.
    pub fn mean(&self) -> Option<f64> {
        (self.sum_count > 0).then(|| self.sum / self.sum_count as f64)
    }

    pub fn processed(&self) -> usize {
        self.success_days + self.error_count
    }
}

/// Single consumer folding snapshots and errors into an exclusively owned [`AggregateState`].
#[derive(Debug)]
pub struct Aggregator {
    designated_currency: String,
    state: AggregateState,
}

impl Aggregator {
    pub fn new(designated_currency: impl Into<String>) -> Self {
        Self {
            designated_currency: designated_currency.into(),
            state: AggregateState::default(),
        }
    }

    pub fn state(&self) -> &AggregateState {
        &self.state
    }

    pub fn into_state(self) -> AggregateState {
        self.state
    }

    pub fn apply_snapshot(&mut self, snapshot: &DailySnapshot) {
        let state = &mut self.state;
        state.success_days += 1;

        for (code, currency) in &snapshot.rates {
            match (
                state.max_by_code.get_mut(code),
                state.min_by_code.get_mut(code),
            ) {
                (Some(max), Some(min)) => {
                    // Strict comparisons: the first record keeps ties.
                    if currency.rate > max.value {
                        *max = ExtremeRecord::observed(currency, &snapshot.date);
                    }
                    if currency.rate < min.value {
                        *min = ExtremeRecord::observed(currency, &snapshot.date);
                    }
                }
                _ => {
                    let record = ExtremeRecord::observed(currency, &snapshot.date);
                    state.max_by_code.insert(code.clone(), record.clone());
                    state.min_by_code.insert(code.clone(), record);
                }
            }
        }

        if let Some(currency) = snapshot.rates.get(&self.designated_currency) {
            state.sum += currency.rate;
            state.sum_count += 1;
        }
    }

    pub fn record_error(&mut self, error: &FetchError) {
        warn!("{error}");
        self.state.error_count += 1;
    }

    /// Drain both streams until each has been closed, then hand back the final state.
    pub async fn drain(
        mut self,
        mut snapshots: mpsc::Receiver<DailySnapshot>,
        mut errors: mpsc::Receiver<FetchError>,
    ) -> AggregateState {
        let mut snapshots_open = true;
        let mut errors_open = true;

        while snapshots_open || errors_open {
            tokio::select! {
                item = snapshots.recv(), if snapshots_open => match item {
                    Some(snapshot) => self.apply_snapshot(&snapshot),
                    None => snapshots_open = false,
                },
                item = errors.recv(), if errors_open => match item {
                    Some(error) => self.record_error(&error),
                    None => errors_open = false,
                },
            }
        }

        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchErrorKind;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn snapshot(date: &str, rates: &[(&str, f64)]) -> DailySnapshot {
        DailySnapshot {
            date: date.to_string(),
            rates: rates
                .iter()
                .map(|(code, rate)| {
                    (
                        code.to_string(),
                        Currency {
                            display_name: format!("{code} name"),
                            rate: *rate,
                        },
                    )
                })
                .collect(),
        }
    }

    fn fetch_error(kind: FetchErrorKind) -> FetchError {
        FetchError::new(
            NaiveDate::from_ymd_opt(2024, 5, 14).unwrap(),
            kind,
            "status 404 Not Found",
        )
    }

    #[test]
    fn tracks_extremes_and_mean_over_two_days() {
        let mut aggregator = Aggregator::new("USD");
        aggregator.apply_snapshot(&snapshot("A", &[("USD", 90.0)]));
        aggregator.apply_snapshot(&snapshot("B", &[("USD", 95.0)]));

        let state = aggregator.into_state();
        assert_eq!(state.max_by_code["USD"].value, 95.0);
        assert_eq!(state.max_by_code["USD"].date, "B");
        assert_eq!(state.min_by_code["USD"].value, 90.0);
        assert_eq!(state.min_by_code["USD"].date, "A");
        assert_eq!(state.mean(), Some(92.5));
        assert_eq!(state.success_days, 2);
        assert_eq!(state.error_count, 0);
    }

    #[test]
    fn errors_are_counted_alongside_snapshots() {
        let mut aggregator = Aggregator::new("USD");
        aggregator.apply_snapshot(&snapshot("A", &[("USD", 90.0)]));
        aggregator.record_error(&fetch_error(FetchErrorKind::BadStatus));

        let state = aggregator.state();
        assert_eq!(state.success_days, 1);
        assert_eq!(state.error_count, 1);
        assert_eq!(state.min_by_code["USD"].value, 90.0);
        assert_eq!(state.max_by_code["USD"].value, 90.0);
    }

    #[test]
    fn ties_keep_first_observed_record() {
        let mut aggregator = Aggregator::new("USD");
        aggregator.apply_snapshot(&snapshot("A", &[("EUR", 99.0)]));
        aggregator.apply_snapshot(&snapshot("B", &[("EUR", 99.0)]));

        let state = aggregator.into_state();
        assert_eq!(state.max_by_code["EUR"].date, "A");
        assert_eq!(state.min_by_code["EUR"].date, "A");
    }

    #[test]
    fn mean_skips_days_without_designated_currency() {
        let mut aggregator = Aggregator::new("USD");
        aggregator.apply_snapshot(&snapshot("A", &[("USD", 90.0), ("EUR", 98.0)]));
        aggregator.apply_snapshot(&snapshot("B", &[("EUR", 99.0)]));

        let state = aggregator.into_state();
        assert_eq!(state.sum_count, 1);
        assert_eq!(state.mean(), Some(90.0));
        assert_eq!(state.success_days, 2);
    }

    #[test]
    fn mean_is_undefined_without_samples() {
        let mut aggregator = Aggregator::new("USD");
        aggregator.record_error(&fetch_error(FetchErrorKind::Network));
        aggregator.record_error(&fetch_error(FetchErrorKind::Network));

        let state = aggregator.into_state();
        assert_eq!(state.mean(), None);
        assert!(state.max_by_code.is_empty());
        assert!(state.min_by_code.is_empty());
        assert_eq!(state.success_days, 0);
        assert_eq!(state.error_count, 2);
    }

    #[test]
    fn new_codes_initialize_both_trackers() {
        let mut aggregator = Aggregator::new("USD");
        aggregator.apply_snapshot(&snapshot("A", &[("USD", 90.0)]));
        aggregator.apply_snapshot(&snapshot("B", &[("USD", 91.0), ("CNY", 12.5)]));

        let state = aggregator.into_state();
        assert_eq!(state.max_by_code["CNY"], state.min_by_code["CNY"]);
        assert_eq!(state.max_by_code["CNY"].date, "B");
    }

    #[tokio::test]
    async fn drain_waits_for_both_streams_to_close() {
        let (snapshot_tx, snapshot_rx) = mpsc::channel(4);
        let (error_tx, error_rx) = mpsc::channel(4);

        let drain = tokio::spawn(Aggregator::new("USD").drain(snapshot_rx, error_rx));

        snapshot_tx
            .send(snapshot("A", &[("USD", 90.0)]))
            .await
            .unwrap();
        drop(snapshot_tx);

        // The error stream is still open; the drain must keep waiting for it.
        tokio::task::yield_now().await;
        error_tx
            .send(fetch_error(FetchErrorKind::Parse))
            .await
            .unwrap();
        error_tx
            .send(fetch_error(FetchErrorKind::Read))
            .await
            .unwrap();
        drop(error_tx);

        let state = drain.await.expect("aggregator task");
        assert_eq!(state.success_days, 1);
        assert_eq!(state.error_count, 2);
    }

    fn snapshots_strategy() -> impl Strategy<Value = Vec<DailySnapshot>> {
        let day = prop::collection::hash_map(
            prop::sample::select(vec!["USD", "EUR", "CNY", "GBP"]),
            1.0f64..150.0,
            0..4,
        );
        prop::collection::vec(day, 1..12).prop_map(|days| {
            days.into_iter()
                .enumerate()
                .map(|(index, rates)| {
                    let rates: Vec<(&str, f64)> = rates.into_iter().collect();
                    snapshot(&format!("day-{index}"), &rates)
                })
                .collect()
        })
    }

    fn fold(designated: &str, snapshots: &[DailySnapshot]) -> AggregateState {
        let mut aggregator = Aggregator::new(designated);
        for snapshot in snapshots {
            aggregator.apply_snapshot(snapshot);
        }
        aggregator.into_state()
    }

    fn extreme_values(records: &HashMap<String, ExtremeRecord>) -> HashMap<String, f64> {
        records
            .iter()
            .map(|(code, record)| (code.clone(), record.value))
            .collect()
    }

    proptest! {
        #[test]
        fn extremes_do_not_depend_on_arrival_order(
            (ordered, shuffled) in snapshots_strategy()
                .prop_flat_map(|days| (Just(days.clone()), Just(days).prop_shuffle()))
        ) {
            let expected = fold("USD", &ordered);
            let actual = fold("USD", &shuffled);

            prop_assert_eq!(
                extreme_values(&expected.max_by_code),
                extreme_values(&actual.max_by_code)
            );
            prop_assert_eq!(
                extreme_values(&expected.min_by_code),
                extreme_values(&actual.min_by_code)
            );
            prop_assert_eq!(expected.sum_count, actual.sum_count);
            prop_assert_eq!(expected.success_days, actual.success_days);
        }

        #[test]
        fn minimum_never_exceeds_maximum(days in snapshots_strategy()) {
            let state = fold("USD", &days);

            prop_assert_eq!(state.max_by_code.len(), state.min_by_code.len());
            for (code, max) in &state.max_by_code {
                let min = &state.min_by_code[code];
                prop_assert!(min.value <= max.value, "{code}: {} > {}", min.value, max.value);
            }
        }
    }
}
