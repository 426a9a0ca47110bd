//! The on-disk cycle store.
//!
//! All logged cycles live in one pretty-printed JSON document,
//! `<data_dir>/cycles.json`. Every write replaces the whole document
//! atomically. A sidecar `cycles.json.lock` is held exclusively for the
//! full load, modify and save sequence of [`CycleLog::update`], so
//! concurrent `mycare log` runs queue up instead of overwriting each other.

use crate::{CycleLog, CycleRecord, Error, LoggedCycle, Result};
use chrono::NaiveDate;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use uuid::Uuid;

/// File name of the store inside the data directory
pub const STORE_FILE: &str = "cycles.json";

impl CycleLog {
    /// Read the store at `path`.
    ///
    /// A missing, empty or unparseable store reads as no cycles at all; the
    /// next successful write replaces it.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = match read_shared(path) {
            Ok(Some(contents)) => contents,
            Ok(None) => {
                tracing::info!("No cycles logged yet at {:?}", path);
                return Ok(Self::default());
            }
            Err(e) => {
                tracing::warn!("Cycle store {:?} could not be read ({}), using no cycles", path, e);
                return Ok(Self::default());
            }
        };

        if contents.trim().is_empty() {
            tracing::warn!("Cycle store {:?} is empty, using no cycles", path);
            return Ok(Self::default());
        }

        match serde_json::from_str::<CycleLog>(&contents) {
            Ok(log) => {
                tracing::info!("{} cycles in {:?}", log.cycles.len(), path);
                Ok(log)
            }
            Err(e) => {
                tracing::warn!("Cycle store {:?} is corrupt ({}), using no cycles", path, e);
                Ok(Self::default())
            }
        }
    }

    /// Replace the store at `path` with this log.
    ///
    /// The document is written to a temp file beside the store, synced, then
    /// renamed over it, so readers see either the old or the new log.
    pub fn save(&self, path: &Path) -> Result<()> {
        let dir = path
            .parent()
            .ok_or_else(|| Error::Store(format!("store path {:?} has no parent directory", path)))?;
        std::fs::create_dir_all(dir)?;

        let mut temp = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut temp, self)?;
        temp.write_all(b"\n")?;
        temp.as_file().sync_all()?;
        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Wrote {} cycles to {:?}", self.cycles.len(), path);
        Ok(())
    }

    /// Load the log, apply `f`, and save the result.
    ///
    /// Runs under the store's exclusive lock. Nothing is written when `f`
    /// fails.
    pub fn update<F, T>(path: &Path, f: F) -> Result<T>
    where
        F: FnOnce(&mut CycleLog) -> Result<T>,
    {
        let lock = acquire_write_lock(path)?;

        let outcome = Self::load(path).and_then(|mut log| {
            let out = f(&mut log)?;
            log.save(path)?;
            Ok(out)
        });

        lock.unlock()?;
        outcome
    }

    /// Add a cycle, rejecting an end date before the start
    pub fn add(&mut self, cycle: LoggedCycle) -> Result<Uuid> {
        validate_span(cycle.start_date, cycle.end_date)?;
        let id = cycle.id;
        self.cycles.push(cycle);
        tracing::info!("Logged cycle {}", id);
        Ok(id)
    }

    /// Set or replace the end date of a logged cycle
    pub fn set_end_date(&mut self, id: Uuid, end_date: NaiveDate) -> Result<&LoggedCycle> {
        let cycle = self
            .cycles
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(Error::NotFound(id))?;

        validate_span(cycle.start_date, Some(end_date))?;
        cycle.end_date = Some(end_date);
        tracing::info!("Cycle {} now ends {}", id, end_date);
        Ok(cycle)
    }

    /// Remove a logged cycle
    pub fn remove(&mut self, id: Uuid) -> Result<LoggedCycle> {
        let idx = self
            .cycles
            .iter()
            .position(|c| c.id == id)
            .ok_or(Error::NotFound(id))?;
        tracing::info!("Removed cycle {}", id);
        Ok(self.cycles.remove(idx))
    }

    /// Cycles sorted by start date, newest first
    pub fn newest_first(&self) -> Vec<&LoggedCycle> {
        let mut cycles: Vec<_> = self.cycles.iter().collect();
        cycles.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        cycles
    }

    /// Raw records for the statistics calculator and prediction engine
    pub fn records(&self) -> Vec<CycleRecord> {
        self.cycles.iter().map(LoggedCycle::to_record).collect()
    }
}

/// Path of the sidecar lock file guarding writes to `path`
pub fn lock_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| STORE_FILE.into());
    name.push(".lock");
    path.with_file_name(name)
}

fn acquire_write_lock(path: &Path) -> Result<File> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }

    let lock = OpenOptions::new()
        .create(true)
        .truncate(false)
        .read(true)
        .write(true)
        .open(lock_path(path))?;
    lock.lock_exclusive()?;
    tracing::debug!("Holding store lock for {:?}", path);
    Ok(lock)
}

/// Read the whole store under a shared lock; `None` when it does not exist
fn read_shared(path: &Path) -> io::Result<Option<String>> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };

    file.lock_shared()?;
    let mut contents = String::new();
    let read = file.read_to_string(&mut contents);
    file.unlock()?;

    read.map(|_| Some(contents))
}

fn validate_span(start: NaiveDate, end: Option<NaiveDate>) -> Result<()> {
    match end {
        Some(end) if end < start => Err(Error::InvalidDate(format!(
            "end date {} is before start date {}",
            end, start
        ))),
        _ => Ok(()),
    }
}
