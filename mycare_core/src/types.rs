//! Core domain types for the MyCare cycle tracker.
//!
//! This module defines the fundamental types used throughout the system:
//! - Raw cycle records as handed over by a calling layer
//! - Logged cycles kept in the local store
//! - Derived statistics and history traces
//! - Prediction results and the phase vocabulary

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Date format used on every boundary (`YYYY-MM-DD`)
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse an ISO-8601 calendar date.
///
/// The year must be exactly four digits and no surrounding whitespace is
/// allowed, so text order and date order agree.
pub fn parse_date(s: &str) -> crate::Result<NaiveDate> {
    let year = s.split('-').next().unwrap_or_default();
    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return Err(crate::Error::InvalidDate(format!(
            "'{}': expected a four-digit year",
            s
        )));
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|e| crate::Error::InvalidDate(format!("'{}': {}", s, e)))
}

// ============================================================================
// Input Records
// ============================================================================

/// A single cycle as supplied by the caller.
///
/// Dates are kept as text so that one malformed record cannot prevent the
/// rest of the history from being analysed.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CycleRecord {
    pub start_date: String,
    #[serde(default)]
    pub end_date: Option<String>,
}

impl CycleRecord {
    pub fn new(start_date: impl Into<String>, end_date: Option<&str>) -> Self {
        Self {
            start_date: start_date.into(),
            end_date: end_date.map(str::to_string),
        }
    }

    pub fn from_dates(start_date: NaiveDate, end_date: Option<NaiveDate>) -> Self {
        Self {
            start_date: start_date.format(DATE_FORMAT).to_string(),
            end_date: end_date.map(|d| d.format(DATE_FORMAT).to_string()),
        }
    }

    /// Inclusive bleeding span in days, if both dates parse
    pub fn duration(&self) -> Option<i64> {
        let end = self.end_date.as_deref()?;
        let start = parse_date(&self.start_date).ok()?;
        let end = parse_date(end).ok()?;
        Some((end - start).num_days() + 1)
    }
}

// ============================================================================
// Logged Cycles
// ============================================================================

/// Reported flow intensity for a logged cycle
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FlowLevel {
    Light,
    #[default]
    Medium,
    Heavy,
    Spotting,
}

impl FlowLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowLevel::Light => "light",
            FlowLevel::Medium => "medium",
            FlowLevel::Heavy => "heavy",
            FlowLevel::Spotting => "spotting",
        }
    }
}

impl std::str::FromStr for FlowLevel {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(FlowLevel::Light),
            "medium" => Ok(FlowLevel::Medium),
            "heavy" => Ok(FlowLevel::Heavy),
            "spotting" => Ok(FlowLevel::Spotting),
            other => Err(crate::Error::Other(format!("Unknown flow level: {}", other))),
        }
    }
}

/// A cycle kept in the local store
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LoggedCycle {
    pub id: Uuid,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub flow_level: FlowLevel,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl LoggedCycle {
    pub fn new(start_date: NaiveDate, end_date: Option<NaiveDate>) -> Self {
        Self {
            id: Uuid::new_v4(),
            start_date,
            end_date,
            flow_level: FlowLevel::default(),
            notes: None,
            created_at: Utc::now(),
        }
    }

    /// Inclusive bleeding span in days
    pub fn duration(&self) -> Option<i64> {
        self.end_date
            .map(|end| (end - self.start_date).num_days() + 1)
    }

    pub fn to_record(&self) -> CycleRecord {
        CycleRecord::from_dates(self.start_date, self.end_date)
    }
}

/// All cycles logged by the user
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct CycleLog {
    #[serde(default)]
    pub cycles: Vec<LoggedCycle>,
}

// ============================================================================
// Statistics
// ============================================================================

/// One row of the per-cycle audit trail
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Start date of the cycle, as recorded
    pub date: String,
    /// Days since the previous cycle started
    pub length: Option<i64>,
    /// Inclusive bleeding span
    pub duration: Option<i64>,
}

/// Averages derived from the cycle history.
///
/// `cycle_count` and `history` are absent only when there was no history at all.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CycleStats {
    pub average_cycle_length: i64,
    pub average_period_length: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<HistoryEntry>>,
    /// Gaps that made it into the cycle-length average
    #[serde(skip)]
    pub accepted_cycle_samples: usize,
    /// Durations that made it into the period-length average
    #[serde(skip)]
    pub accepted_period_samples: usize,
}

// ============================================================================
// Phases
// ============================================================================

/// Position within the cycle
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Menstruation,
    Follicular,
    Ovulation,
    Luteal,
    LateLuteal,
    Unknown,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Menstruation => "menstruation",
            Phase::Follicular => "follicular",
            Phase::Ovulation => "ovulation",
            Phase::Luteal => "luteal",
            Phase::LateLuteal => "late_luteal",
            Phase::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Qualitative hormone state
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HormoneLevel {
    Low,
    Rising,
    Steady,
    High,
    Peak,
    Falling,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HormoneLevels {
    pub estrogen: HormoneLevel,
    pub progesterone: HormoneLevel,
    pub testosterone: HormoneLevel,
}

// ============================================================================
// Predictions
// ============================================================================

/// One projected future cycle
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectedCycle {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub ovulation_date: NaiveDate,
}

/// Prediction anchored on the most recent cycle
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Prediction {
    pub next_period_date: NaiveDate,
    pub ovulation_date: NaiveDate,
    pub fertile_window_start: NaiveDate,
    pub fertile_window_end: NaiveDate,
    pub luteal_phase_start: NaiveDate,
    pub days_until_next_period: i64,
    pub current_cycle_day: i64,
    pub current_phase: Phase,
    pub hormone_levels: HormoneLevels,
    pub phase_tips: Vec<String>,
    pub average_cycle_length: i64,
    pub average_period_length: i64,
    pub future_predictions: Vec<ProjectedCycle>,
}

/// Placeholder returned when there is no history to project from
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct NoHistory {
    pub next_period_date: Option<NaiveDate>,
    pub ovulation_date: Option<NaiveDate>,
    pub fertile_window_start: Option<NaiveDate>,
    pub fertile_window_end: Option<NaiveDate>,
    pub luteal_phase_start: Option<NaiveDate>,
    pub days_until_next_period: Option<i64>,
    pub current_cycle_day: Option<i64>,
    pub current_phase: Phase,
}

impl Default for NoHistory {
    fn default() -> Self {
        Self {
            next_period_date: None,
            ovulation_date: None,
            fertile_window_start: None,
            fertile_window_end: None,
            luteal_phase_start: None,
            days_until_next_period: None,
            current_cycle_day: None,
            current_phase: Phase::Unknown,
        }
    }
}

/// Either a full prediction or the no-history placeholder
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum PredictionResult {
    NoHistory(NoHistory),
    Populated(Box<Prediction>),
}

impl PredictionResult {
    pub fn current_phase(&self) -> Phase {
        match self {
            PredictionResult::NoHistory(n) => n.current_phase,
            PredictionResult::Populated(p) => p.current_phase,
        }
    }

    pub fn as_prediction(&self) -> Option<&Prediction> {
        match self {
            PredictionResult::NoHistory(_) => None,
            PredictionResult::Populated(p) => Some(p),
        }
    }
}
