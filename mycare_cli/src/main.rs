use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use mycare_core::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "mycare")]
#[command(about = "Menstrual cycle statistics and period prediction", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Use a specific config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log a new cycle
    Log {
        /// First day of bleeding (YYYY-MM-DD)
        #[arg(long)]
        start: String,

        /// Last day of bleeding, inclusive (YYYY-MM-DD)
        #[arg(long)]
        end: Option<String>,

        /// Flow level (light, medium, heavy, spotting)
        #[arg(long, default_value = "medium")]
        flow: String,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Set the end date of a logged cycle
    End {
        id: Uuid,

        /// Last day of bleeding, inclusive (YYYY-MM-DD)
        #[arg(long)]
        end: String,
    },

    /// Delete a logged cycle
    Delete { id: Uuid },

    /// List logged cycles, newest first
    List,

    /// Show cycle statistics as JSON
    Stats {
        /// Read raw cycle records from a JSON file instead of the store
        #[arg(long)]
        records: Option<PathBuf>,
    },

    /// Predict the next period as JSON
    Predict {
        /// Read raw cycle records from a JSON file instead of the store
        #[arg(long)]
        records: Option<PathBuf>,

        /// Pretend today is this date (YYYY-MM-DD)
        #[arg(long)]
        today: Option<String>,
    },

    /// Show prediction and statistics together as JSON
    Dashboard {
        /// Pretend today is this date (YYYY-MM-DD)
        #[arg(long)]
        today: Option<String>,
    },

    /// Import cycles from a CSV file into the store
    Import { csv: PathBuf },

    /// Export the store to a CSV file
    Export { csv: PathBuf },
}

#[derive(Serialize)]
struct Dashboard {
    prediction: PredictionResult,
    stats: CycleStats,
}

fn main() -> Result<()> {
    mycare_core::logging::init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let store_path = data_dir.join(STORE_FILE);

    match cli.command {
        Commands::Log {
            start,
            end,
            flow,
            notes,
        } => cmd_log(&store_path, &start, end.as_deref(), &flow, notes),
        Commands::End { id, end } => cmd_end(&store_path, id, &end),
        Commands::Delete { id } => cmd_delete(&store_path, id),
        Commands::List => cmd_list(&store_path),
        Commands::Stats { records } => cmd_stats(&store_path, records.as_deref()),
        Commands::Predict { records, today } => {
            let records = load_records(&store_path, records.as_deref())?;
            let prediction = predict(&records, &config, today.as_deref())?;
            print_json(&prediction)
        }
        Commands::Dashboard { today } => {
            let records = load_records(&store_path, None)?;
            let dashboard = Dashboard {
                prediction: predict(&records, &config, today.as_deref())?,
                stats: calculate_cycle_stats(&records),
            };
            print_json(&dashboard)
        }
        Commands::Import { csv } => cmd_import(&store_path, &csv),
        Commands::Export { csv } => cmd_export(&store_path, &csv),
    }
}

fn cmd_log(
    store_path: &Path,
    start: &str,
    end: Option<&str>,
    flow: &str,
    notes: Option<String>,
) -> Result<()> {
    let start_date = types::parse_date(start)?;
    let end_date = end.map(types::parse_date).transpose()?;

    let mut cycle = LoggedCycle::new(start_date, end_date);
    cycle.flow_level = flow.parse()?;
    cycle.notes = notes;

    let id = CycleLog::update(store_path, |log| log.add(cycle))?;

    println!("✓ Cycle logged: {}", id);
    Ok(())
}

fn cmd_end(store_path: &Path, id: Uuid, end: &str) -> Result<()> {
    let end_date = types::parse_date(end)?;
    let duration = CycleLog::update(store_path, |log| {
        log.set_end_date(id, end_date).map(|c| c.duration())
    })?;

    match duration {
        Some(days) => println!("✓ Cycle {} ends {} ({} days)", id, end_date, days),
        None => println!("✓ Cycle {} ends {}", id, end_date),
    }
    Ok(())
}

fn cmd_delete(store_path: &Path, id: Uuid) -> Result<()> {
    let removed = CycleLog::update(store_path, |log| log.remove(id))?;
    println!("✓ Deleted cycle starting {}", removed.start_date);
    Ok(())
}

fn cmd_list(store_path: &Path) -> Result<()> {
    let log = CycleLog::load(store_path)?;
    if log.cycles.is_empty() {
        println!("No cycles logged yet.");
        return Ok(());
    }

    for cycle in log.newest_first() {
        let end = cycle
            .end_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "ongoing".into());
        let duration = cycle
            .duration()
            .map(|d| format!("{} days", d))
            .unwrap_or_else(|| "-".into());

        println!(
            "{}  {} → {:<10}  {:>8}  {}",
            cycle.id,
            cycle.start_date,
            end,
            duration,
            cycle.flow_level.as_str()
        );
        if let Some(ref notes) = cycle.notes {
            println!("    {}", notes);
        }
    }
    Ok(())
}

fn cmd_stats(store_path: &Path, records: Option<&Path>) -> Result<()> {
    let records = load_records(store_path, records)?;
    print_json(&calculate_cycle_stats(&records))
}

fn cmd_import(store_path: &Path, csv_path: &Path) -> Result<()> {
    let imported = import_cycles(csv_path)?;

    let added = CycleLog::update(store_path, |log| {
        let mut added = 0;
        for cycle in imported {
            if log.cycles.iter().any(|c| c.id == cycle.id) {
                tracing::debug!("Cycle {} already in store, skipping", cycle.id);
                continue;
            }
            log.add(cycle)?;
            added += 1;
        }
        Ok(added)
    })?;

    println!("✓ Imported {} cycles", added);
    Ok(())
}

fn cmd_export(store_path: &Path, csv_path: &Path) -> Result<()> {
    let log = CycleLog::load(store_path)?;
    let count = export_cycles(&log.cycles, csv_path)?;

    println!("✓ Exported {} cycles to {}", count, csv_path.display());
    Ok(())
}

/// Records from a raw JSON file if given, otherwise from the store
fn load_records(store_path: &Path, records_path: Option<&Path>) -> Result<Vec<CycleRecord>> {
    match records_path {
        Some(path) => {
            let contents = std::fs::read_to_string(path)?;
            let records: Vec<CycleRecord> = serde_json::from_str(&contents)?;
            tracing::info!("Read {} records from {:?}", records.len(), path);
            Ok(records)
        }
        None => Ok(CycleLog::load(store_path)?.records()),
    }
}

fn predict(
    records: &[CycleRecord],
    config: &Config,
    today: Option<&str>,
) -> Result<PredictionResult> {
    let today: NaiveDate = match today {
        Some(s) => types::parse_date(s)?,
        None => Utc::now().date_naive(),
    };
    predict_next_period_with(
        records,
        config.fallbacks()?,
        config.profile.fallback_policy,
        today,
    )
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
