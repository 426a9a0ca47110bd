#![forbid(unsafe_code)]

//! Core domain model and business logic for the MyCare cycle tracker.
//!
//! This crate provides:
//! - Domain types (cycle records, statistics, predictions, phases)
//! - Cycle statistics calculator
//! - Period prediction engine and phase classification
//! - Persistence (cycle store, CSV import/export)
//! - Configuration and logging

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod stats;
pub mod phase;
pub mod prediction;
pub mod store;
pub mod csv_io;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use stats::calculate_cycle_stats;
pub use prediction::{
    predict_next_period, predict_next_period_with, FallbackPolicy, Fallbacks,
};
pub use store::STORE_FILE;
pub use csv_io::{export_cycles, import_cycles};
