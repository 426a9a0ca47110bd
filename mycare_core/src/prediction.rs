//! Period prediction engine.
//!
//! Projects forward from the most recent cycle start:
//! - Next period, ovulation, fertile window and luteal phase start
//! - Current cycle day and phase, with hormone picture and tips
//! - A rolling forecast of the next six cycles

use crate::stats::{
    calculate_cycle_stats, DEFAULT_CYCLE_LENGTH, DEFAULT_PERIOD_LENGTH, PLAUSIBLE_CYCLE_LENGTH,
    PLAUSIBLE_PERIOD_LENGTH,
};
use crate::types::parse_date;
use crate::{
    phase, CycleRecord, CycleStats, Error, NoHistory, Prediction, PredictionResult,
    ProjectedCycle, Result,
};
use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Number of future cycles in every forecast
pub const FORECAST_CYCLES: usize = 6;

/// Ovulation is placed this many days before the next period
pub const LUTEAL_LENGTH_DAYS: i64 = 14;

/// Averages a caller would like used when the history has nothing to say
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fallbacks {
    cycle_length: i64,
    period_length: i64,
}

impl Fallbacks {
    /// Validate caller-supplied averages against the same windows applied to observed data
    pub fn new(cycle_length: i64, period_length: i64) -> Result<Self> {
        if !PLAUSIBLE_CYCLE_LENGTH.contains(&cycle_length) {
            return Err(Error::InvalidFallback(format!(
                "cycle length {} outside {}..={} days",
                cycle_length,
                PLAUSIBLE_CYCLE_LENGTH.start(),
                PLAUSIBLE_CYCLE_LENGTH.end()
            )));
        }
        if !PLAUSIBLE_PERIOD_LENGTH.contains(&period_length) {
            return Err(Error::InvalidFallback(format!(
                "period length {} outside {}..={} days",
                period_length,
                PLAUSIBLE_PERIOD_LENGTH.start(),
                PLAUSIBLE_PERIOD_LENGTH.end()
            )));
        }
        Ok(Self {
            cycle_length,
            period_length,
        })
    }

    pub fn cycle_length(&self) -> i64 {
        self.cycle_length
    }

    pub fn period_length(&self) -> i64 {
        self.period_length
    }
}

impl Default for Fallbacks {
    fn default() -> Self {
        Self {
            cycle_length: DEFAULT_CYCLE_LENGTH,
            period_length: DEFAULT_PERIOD_LENGTH,
        }
    }
}

/// Which averages win when the history produced no plausible samples
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// The calculator's 28/5 defaults; caller fallbacks are ignored
    #[default]
    StatsDefaults,
    /// Caller fallbacks replace any average whose sample pool was empty
    UserAverages,
}

/// Predict the next period using today's UTC date
pub fn predict_next_period(
    records: &[CycleRecord],
    fallbacks: Fallbacks,
) -> Result<PredictionResult> {
    let today = Utc::now().date_naive();
    predict_next_period_with(records, fallbacks, FallbackPolicy::default(), today)
}

/// Predict the next period relative to an explicit `today`
pub fn predict_next_period_with(
    records: &[CycleRecord],
    fallbacks: Fallbacks,
    policy: FallbackPolicy,
    today: NaiveDate,
) -> Result<PredictionResult> {
    let stats = calculate_cycle_stats(records);
    let (avg_cycle, avg_period) = effective_averages(&stats, fallbacks, policy);

    if records.is_empty() {
        tracing::info!("No cycle history, returning empty prediction");
        return Ok(PredictionResult::NoHistory(NoHistory::default()));
    }

    let last_start = anchor(records)?;

    let next_period = shift(last_start, avg_cycle)?;
    let ovulation = shift(next_period, -LUTEAL_LENGTH_DAYS)?;
    let fertile_start = shift(ovulation, -5)?;
    let fertile_end = shift(ovulation, 1)?;
    let luteal_start = shift(ovulation, 2)?;

    let days_until_next_period = (next_period - today).num_days();
    let current_cycle_day = (today - last_start).num_days() + 1;

    let current_phase = phase::classify(current_cycle_day, avg_cycle, avg_period);
    let guidance = phase::guidance(current_phase)
        .ok_or_else(|| Error::Other(format!("No guidance for phase {}", current_phase)))?;

    tracing::info!(
        "Cycle day {} ({}), next period {} in {} days",
        current_cycle_day,
        current_phase,
        next_period,
        days_until_next_period
    );

    Ok(PredictionResult::Populated(Box::new(Prediction {
        next_period_date: next_period,
        ovulation_date: ovulation,
        fertile_window_start: fertile_start,
        fertile_window_end: fertile_end,
        luteal_phase_start: luteal_start,
        days_until_next_period,
        current_cycle_day,
        current_phase,
        hormone_levels: guidance.hormone_levels,
        phase_tips: guidance.tips.iter().map(|t| t.to_string()).collect(),
        average_cycle_length: avg_cycle,
        average_period_length: avg_period,
        future_predictions: forecast(next_period, avg_cycle, avg_period)?,
    })))
}

/// Resolve the averages the projection runs on
fn effective_averages(
    stats: &CycleStats,
    fallbacks: Fallbacks,
    policy: FallbackPolicy,
) -> (i64, i64) {
    match policy {
        FallbackPolicy::StatsDefaults => (stats.average_cycle_length, stats.average_period_length),
        FallbackPolicy::UserAverages => {
            let cycle = if stats.accepted_cycle_samples == 0 {
                fallbacks.cycle_length
            } else {
                stats.average_cycle_length
            };
            let period = if stats.accepted_period_samples == 0 {
                fallbacks.period_length
            } else {
                stats.average_period_length
            };
            (cycle, period)
        }
    }
}

/// Parse the latest start date; without it nothing can be projected
fn anchor(records: &[CycleRecord]) -> Result<NaiveDate> {
    let latest = records
        .iter()
        .map(|r| r.start_date.as_str())
        .max()
        .ok_or_else(|| Error::Anchor("no cycle records".into()))?;

    parse_date(latest).map_err(|e| Error::Anchor(e.to_string()))
}

/// Project the next cycles, each `avg_cycle` days after the previous one
fn forecast(
    next_period: NaiveDate,
    avg_cycle: i64,
    avg_period: i64,
) -> Result<Vec<ProjectedCycle>> {
    (0..FORECAST_CYCLES as i64)
        .map(|i| {
            let start = shift(next_period, i * avg_cycle)?;
            Ok(ProjectedCycle {
                start_date: start,
                end_date: shift(start, avg_period - 1)?,
                ovulation_date: shift(start, avg_cycle / 2)?,
            })
        })
        .collect()
}

/// Move a date by whole days, failing instead of wrapping past the calendar's range
fn shift(date: NaiveDate, days: i64) -> Result<NaiveDate> {
    date.checked_add_signed(Duration::days(days)).ok_or_else(|| {
        Error::Anchor(format!("{} shifted by {} days is out of range", date, days))
    })
}
