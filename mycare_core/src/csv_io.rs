//! CSV import and export of logged cycles.
//!
//! Export writes every cycle with a header row. Import reads the same
//! layout and skips rows that fail to parse instead of aborting.

use crate::types::parse_date;
use crate::{Error, FlowLevel, LoggedCycle, Result};
use chrono::{DateTime, Utc};
use csv::{ReaderBuilder, Trim};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

/// A row in the CSV file
#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    id: Option<String>,
    start_date: String,
    end_date: Option<String>,
    flow_level: Option<String>,
    notes: Option<String>,
    created_at: Option<String>,
}

impl From<&LoggedCycle> for CsvRow {
    fn from(cycle: &LoggedCycle) -> Self {
        CsvRow {
            id: Some(cycle.id.to_string()),
            start_date: cycle.start_date.to_string(),
            end_date: cycle.end_date.map(|d| d.to_string()),
            flow_level: Some(cycle.flow_level.as_str().to_string()),
            notes: cycle.notes.clone(),
            created_at: Some(cycle.created_at.to_rfc3339()),
        }
    }
}

impl TryFrom<CsvRow> for LoggedCycle {
    type Error = Error;

    fn try_from(row: CsvRow) -> Result<Self> {
        // Blank id means the row came from another tool; mint a new one
        let id = match row.id.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) => Uuid::parse_str(s)
                .map_err(|e| Error::Other(format!("Invalid UUID: {}", e)))?,
            None => Uuid::new_v4(),
        };

        let start_date = parse_date(&row.start_date)?;
        let end_date = row
            .end_date
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(parse_date)
            .transpose()?;

        let flow_level = match row.flow_level.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(s) => s.parse()?,
            None => FlowLevel::default(),
        };

        let created_at = row
            .created_at
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(Utc::now);

        if let Some(end) = end_date {
            if end < start_date {
                return Err(Error::InvalidDate(format!(
                    "end date {} is before start date {}",
                    end, start_date
                )));
            }
        }

        Ok(LoggedCycle {
            id,
            start_date,
            end_date,
            flow_level,
            notes: row.notes.filter(|n| !n.is_empty()),
            created_at,
        })
    }
}

/// Write all cycles to a CSV file, replacing it
pub fn export_cycles(cycles: &[LoggedCycle], csv_path: &Path) -> Result<usize> {
    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_path(csv_path)?;

    for cycle in cycles {
        writer.serialize(CsvRow::from(cycle))?;
    }

    writer.flush()?;
    tracing::info!("Exported {} cycles to {:?}", cycles.len(), csv_path);
    Ok(cycles.len())
}

/// Read cycles from a CSV file
///
/// Malformed rows are logged and skipped.
pub fn import_cycles(csv_path: &Path) -> Result<Vec<LoggedCycle>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_path(csv_path)?;

    let mut cycles = Vec::new();
    for (line, result) in reader.deserialize::<CsvRow>().enumerate() {
        match result {
            Ok(row) => match LoggedCycle::try_from(row) {
                Ok(cycle) => cycles.push(cycle),
                Err(e) => {
                    tracing::warn!("Skipping CSV row {}: {}", line + 2, e);
                }
            },
            Err(e) => {
                tracing::warn!("Failed to deserialize CSV row {}: {}", line + 2, e);
            }
        }
    }

    tracing::info!("Read {} cycles from {:?}", cycles.len(), csv_path);
    Ok(cycles)
}
