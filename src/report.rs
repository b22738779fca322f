use std::collections::HashMap;
use std::fmt::Write;

use crate::pipeline::{AggregateState, ExtremeRecord, PipelineOutcome};

/// Render the four report sections: maxima, minima, designated-currency mean, and counts.
/// Codes are sorted so the same state always renders to the same text.
pub fn render_report(state: &AggregateState, designated_currency: &str) -> String {
    let mut out = String::new();

    out.push_str("Maximum exchange rates:\n");
    write_extremes(&mut out, &state.max_by_code);

    out.push_str("\nMinimum exchange rates:\n");
    write_extremes(&mut out, &state.min_by_code);

    match state.mean() {
        Some(mean) => {
            let _ = writeln!(
                out,
                "\nMean {designated_currency} rate over the period: {mean:.4}"
            );
        }
        None => {
            let _ = writeln!(
                out,
                "\nMean {designated_currency} rate over the period: undefined (no samples)"
            );
        }
    }

    let _ = write!(
        out,
        "\nProcessed days: {}\nErrors: {}\n",
        state.success_days, state.error_count
    );

    out
}

/// Report for a whole run, flagging runs that were interrupted.
pub fn render_outcome(outcome: &PipelineOutcome, designated_currency: &str) -> String {
    let mut out = render_report(&outcome.state, designated_currency);
    if outcome.cancelled {
        let _ = writeln!(
            out,
            "Run cancelled: {} of {} business days processed",
            outcome.state.processed(),
            outcome.scheduled_days
        );
    }
    out
}

fn write_extremes(out: &mut String, records: &HashMap<String, ExtremeRecord>) {
    let mut codes: Vec<&String> = records.keys().collect();
    codes.sort();

    for code in codes {
        let record = &records[code];
        let _ = writeln!(
            out,
            "{code} ({}): {:.4} RUB (date: {})",
            record.display_name, record.value, record.date
        );
    }
}
