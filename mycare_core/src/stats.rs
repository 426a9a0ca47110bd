//! Cycle statistics calculator.
//!
//! Reduces raw cycle records into average cycle and period lengths:
//! - Records are sorted by start date
//! - Gaps between consecutive starts feed the cycle-length average
//! - Inclusive bleeding spans feed the period-length average
//! - Implausible values stay in the history but never reach an average

use crate::types::parse_date;
use crate::{CycleRecord, CycleStats, HistoryEntry};
use std::ops::RangeInclusive;

/// Cycle length assumed when no plausible gap was observed
pub const DEFAULT_CYCLE_LENGTH: i64 = 28;

/// Period length assumed when no plausible duration was observed
pub const DEFAULT_PERIOD_LENGTH: i64 = 5;

/// Gaps outside this window are duplicates, typos or missed cycles
pub const PLAUSIBLE_CYCLE_LENGTH: RangeInclusive<i64> = 15..=60;

/// Durations outside this window are data-entry errors
pub const PLAUSIBLE_PERIOD_LENGTH: RangeInclusive<i64> = 1..=14;

/// Running state of the single pass over sorted records
#[derive(Default)]
struct Accumulator<'a> {
    history: Vec<HistoryEntry>,
    cycle_lengths: Vec<i64>,
    period_lengths: Vec<i64>,
    previous: Option<&'a CycleRecord>,
}

/// Calculate cycle statistics from a set of records in any order
///
/// Empty input yields the bare defaults without `cycle_count` or `history`.
pub fn calculate_cycle_stats(records: &[CycleRecord]) -> CycleStats {
    if records.is_empty() {
        return CycleStats {
            average_cycle_length: DEFAULT_CYCLE_LENGTH,
            average_period_length: DEFAULT_PERIOD_LENGTH,
            cycle_count: None,
            history: None,
            accepted_cycle_samples: 0,
            accepted_period_samples: 0,
        };
    }

    let mut sorted: Vec<&CycleRecord> = records.iter().collect();
    sorted.sort_by(|a, b| a.start_date.cmp(&b.start_date));

    let acc = sorted
        .into_iter()
        .fold(Accumulator::default(), |mut acc, record| {
            let duration = period_duration(record);
            if let Some(d) = duration.filter(|d| PLAUSIBLE_PERIOD_LENGTH.contains(d)) {
                acc.period_lengths.push(d);
            }

            let gap = acc.previous.and_then(|prev| gap_between(prev, record));
            if let Some(g) = gap.filter(|g| PLAUSIBLE_CYCLE_LENGTH.contains(g)) {
                acc.cycle_lengths.push(g);
            }

            acc.history.push(HistoryEntry {
                date: record.start_date.clone(),
                length: gap,
                duration,
            });
            acc.previous = Some(record);
            acc
        });

    tracing::debug!(
        "Accepted {} of {} gaps and {} durations",
        acc.cycle_lengths.len(),
        records.len().saturating_sub(1),
        acc.period_lengths.len()
    );

    CycleStats {
        average_cycle_length: rounded_mean(&acc.cycle_lengths).unwrap_or(DEFAULT_CYCLE_LENGTH),
        average_period_length: rounded_mean(&acc.period_lengths).unwrap_or(DEFAULT_PERIOD_LENGTH),
        cycle_count: Some(records.len()),
        accepted_cycle_samples: acc.cycle_lengths.len(),
        accepted_period_samples: acc.period_lengths.len(),
        history: Some(acc.history),
    }
}

fn period_duration(record: &CycleRecord) -> Option<i64> {
    if record.end_date.is_none() {
        return None;
    }
    let duration = record.duration();
    if duration.is_none() {
        tracing::debug!(
            "Ignoring duration of cycle starting {:?}: unparseable date",
            record.start_date
        );
    }
    duration
}

fn gap_between(previous: &CycleRecord, current: &CycleRecord) -> Option<i64> {
    match (parse_date(&previous.start_date), parse_date(&current.start_date)) {
        (Ok(prev), Ok(curr)) => Some((curr - prev).num_days()),
        (Err(e), _) | (_, Err(e)) => {
            tracing::debug!("Ignoring gap before cycle {:?}: {}", current.start_date, e);
            None
        }
    }
}

/// Mean of integer samples rounded half-to-even, `None` for an empty pool
fn rounded_mean(values: &[i64]) -> Option<i64> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as i64;
    let sum: i64 = values.iter().sum();
    let quotient = sum.div_euclid(n);
    let twice_remainder = 2 * sum.rem_euclid(n);

    let rounded = if twice_remainder > n || (twice_remainder == n && quotient % 2 != 0) {
        quotient + 1
    } else {
        quotient
    };
    Some(rounded)
}
