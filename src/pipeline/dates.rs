use chrono::{Datelike, NaiveDate, Weekday};
use log::debug;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Lazily walks `[start, end]` one calendar day at a time, skipping Saturdays and Sundays.
#[derive(Debug, Clone)]
pub struct BusinessDays {
    next: Option<NaiveDate>,
    end: NaiveDate,
}

impl BusinessDays {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            next: (start <= end).then_some(start),
            end,
        }
    }

    /// Business days in the trailing window `[now - window_days, now]`. A window reaching
    /// past the earliest representable date starts there instead.
    pub fn trailing(now: NaiveDate, window_days: u32) -> Self {
        let start = window_start(now, window_days).unwrap_or(NaiveDate::MIN);
        Self::new(start, now)
    }
}

/// First calendar day of `[now - window_days, now]`, `None` if it is not representable.
pub fn window_start(now: NaiveDate, window_days: u32) -> Option<NaiveDate> {
    now.checked_sub_signed(chrono::Duration::days(i64::from(window_days)))
}

impl Iterator for BusinessDays {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        while let Some(date) = self.next {
            self.next = date.succ_opt().filter(|next| *next <= self.end);
            if is_business_day(date) {
                return Some(date);
            }
        }
        None
    }
}

pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Push every date into `tx` in order, then drop the sender so consumers see the end.
pub fn spawn_date_producer(
    dates: BusinessDays,
    tx: mpsc::Sender<NaiveDate>,
    cancel: CancellationToken,
) -> JoinHandle<usize> {
    tokio::spawn(async move {
        let mut sent = 0;
        for date in dates {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("date producer stopped after {sent} dates");
                    break;
                }
                result = tx.send(date) => {
                    if result.is_err() {
                        break;
                    }
                    sent += 1;
                }
            }
        }
        sent
    })
}
