//! Durable habit store.
//!
//! The whole collection lives in memory and the whole collection is written
//! on every mutation. A failed write is logged and remembered, but the caller
//! keeps working against the in-memory state for the rest of the session.

mod file;
pub mod schema;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::*;
pub use schema::LoadReport;

/// Persistence failures. Absorbed by [`HabitStore`]; exposed for diagnostics
/// and for [`HabitStore::flush`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed habit document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported habit document version {0}")]
    UnsupportedVersion(u32),

    #[error("Refusing to overwrite {0}: it could not be read at startup")]
    ReadOnly(PathBuf),
}

/// Whether a mutation reached disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Durability {
    Persisted,
    /// The write failed, the store has no backing file, or the backing file
    /// could not be read at startup and is left alone.
    MemoryOnly,
}

/// Period state of one habit as held by the store.
///
/// The default value is the "no history" answer for unknown identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressState {
    pub last_reset_date: Option<NaiveDate>,
    pub history: Vec<DailyProgress>,
}

impl ProgressState {
    pub fn is_unset(&self) -> bool {
        self.last_reset_date.is_none() && self.history.is_empty()
    }
}

struct StoreState {
    path: Option<PathBuf>,
    habits: Vec<Habit>,
    report: LoadReport,
    last_error: Option<String>,
    /// Cleared when an existing document could not be read; nothing is
    /// written over it for the rest of the session.
    writable: bool,
}

/// Habit records keyed by identifier, backed by a single JSON document.
///
/// Cloning yields another handle to the same collection. Every
/// read-modify-write sequence runs under one lock so a whole-file rewrite
/// always reflects a consistent collection.
pub struct HabitStore {
    state: Arc<Mutex<StoreState>>,
}

impl HabitStore {
    /// Opens the store at `path`, loading whatever can be trusted.
    ///
    /// Never fails: an undecodable document is moved aside and the store starts
    /// empty, with the reason recorded in [`HabitStore::load_report`]. A
    /// document that exists but cannot be read at all is left in place and the
    /// store runs memory-only.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let loaded = load_from(&path);
        Self {
            state: Arc::new(Mutex::new(StoreState {
                path: Some(path),
                habits: loaded.habits,
                report: loaded.report,
                last_error: None,
                writable: loaded.writable,
            })),
        }
    }

    /// A store with no backing file. Every mutation reports
    /// [`Durability::MemoryOnly`].
    pub fn open_memory() -> Self {
        Self {
            state: Arc::new(Mutex::new(StoreState {
                path: None,
                habits: Vec::new(),
                report: LoadReport::default(),
                last_error: None,
                writable: true,
            })),
        }
    }

    pub fn path(&self) -> Option<PathBuf> {
        self.lock().path.clone()
    }

    pub fn load_report(&self) -> LoadReport {
        self.lock().report
    }

    /// Message of the most recent failed write, cleared by the next success.
    pub fn last_save_error(&self) -> Option<String> {
        self.lock().last_error.clone()
    }

    /// `false` when mutations can never reach disk this session.
    pub fn is_writable(&self) -> bool {
        let state = self.lock();
        state.path.is_some() && state.writable
    }

    // ============================================================
    // Reads
    // ============================================================

    /// Every stored habit in insertion order.
    pub fn load_all(&self) -> Vec<Habit> {
        self.lock().habits.clone()
    }

    pub fn get(&self, id: HabitId) -> Option<Habit> {
        self.lock().habits.iter().find(|h| h.id == id).cloned()
    }

    pub fn contains(&self, id: HabitId) -> bool {
        self.lock().habits.iter().any(|h| h.id == id)
    }

    pub fn len(&self) -> usize {
        self.lock().habits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().habits.is_empty()
    }

    /// Reset date and history for `id`, or the unset state when unknown.
    pub fn load(&self, id: HabitId) -> ProgressState {
        self.lock()
            .habits
            .iter()
            .find(|h| h.id == id)
            .map(|h| ProgressState {
                last_reset_date: h.last_reset_date,
                history: h.history.clone(),
            })
            .unwrap_or_default()
    }

    // ============================================================
    // Writes
    // ============================================================

    /// Inserts `habit`, or replaces the record with the same identifier in
    /// place.
    pub fn upsert(&self, habit: &Habit) -> Durability {
        let mut state = self.lock();
        match state.habits.iter().position(|h| h.id == habit.id) {
            Some(index) => state.habits[index] = habit.clone(),
            None => state.habits.push(habit.clone()),
        }
        save_locked(&mut state)
    }

    /// Stores a new reset date and history for an existing habit.
    pub fn save_progress(&self, id: HabitId, progress: ProgressState) -> Option<Durability> {
        let mut state = self.lock();
        let habit = state.habits.iter_mut().find(|h| h.id == id)?;
        habit.last_reset_date = progress.last_reset_date;
        habit.history = progress.history;
        Some(save_locked(&mut state))
    }

    /// Removes the record and its history. `None` when `id` is unknown.
    pub fn delete(&self, id: HabitId) -> Option<Durability> {
        let mut state = self.lock();
        let index = state.habits.iter().position(|h| h.id == id)?;
        state.habits.remove(index);
        Some(save_locked(&mut state))
    }

    /// Runs `f` on the stored habit under the store lock and persists when the
    /// habit changed. `None` when `id` is unknown.
    pub fn modify<T>(&self, id: HabitId, f: impl FnOnce(&mut Habit) -> T) -> Option<T> {
        let mut state = self.lock();
        let habit = state.habits.iter_mut().find(|h| h.id == id)?;
        let before = habit.clone();
        let value = f(habit);
        if *habit != before {
            save_locked(&mut state);
        }
        Some(value)
    }

    /// Runs `f` on every habit under one lock, with at most one write.
    pub fn modify_each<T>(&self, mut f: impl FnMut(&mut Habit) -> T) -> Vec<(Habit, T)> {
        let mut state = self.lock();
        let mut changed = false;
        let mut results = Vec::with_capacity(state.habits.len());
        for habit in state.habits.iter_mut() {
            let before = habit.clone();
            let value = f(habit);
            changed |= *habit != before;
            results.push((habit.clone(), value));
        }
        if changed {
            save_locked(&mut state);
        }
        results
    }

    /// Writes the collection now, returning the error instead of absorbing it.
    pub fn flush(&self) -> Result<(), StoreError> {
        let mut state = self.lock();
        let Some(path) = state.path.clone() else {
            return Ok(());
        };
        let result = if state.writable {
            write_collection(&path, &state.habits)
        } else {
            Err(StoreError::ReadOnly(path))
        };
        state.last_error = result.as_ref().err().map(|e| e.to_string());
        result
    }

    /// Serialized form of the current collection.
    pub fn to_document(&self) -> Result<String, StoreError> {
        schema::encode(&self.lock().habits)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoreState> {
        self.state.lock().expect("habit store lock poisoned")
    }
}

impl Clone for HabitStore {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

struct Loaded {
    habits: Vec<Habit>,
    report: LoadReport,
    writable: bool,
}

impl Loaded {
    fn usable(habits: Vec<Habit>, report: LoadReport) -> Self {
        Self {
            habits,
            report,
            writable: true,
        }
    }
}

fn load_from(path: &Path) -> Loaded {
    let bytes = match file::read_document(path) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => {
            tracing::debug!("No habit document at {}, starting empty", path.display());
            return Loaded::usable(Vec::new(), LoadReport::default());
        }
        Err(e) => {
            tracing::error!(
                "Failed to read habit document {}: {}; changes will not be saved",
                path.display(),
                e
            );
            return Loaded {
                habits: Vec::new(),
                report: empty_report(),
                writable: false,
            };
        }
    };

    let decoded = String::from_utf8(bytes)
        .map_err(|e| StoreError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
        .and_then(|content| schema::decode(&content));

    match decoded {
        Ok((habits, report)) => {
            tracing::debug!(
                "Loaded {} habits from {} ({} dropped, {} repaired)",
                report.loaded,
                path.display(),
                report.dropped,
                report.repaired
            );
            Loaded::usable(habits, report)
        }
        Err(e) => {
            tracing::error!("Failed to parse habit document {}: {}", path.display(), e);
            match file::quarantine(path) {
                Ok(moved) => {
                    tracing::warn!("Moved unreadable document to {}", moved.display());
                    Loaded::usable(Vec::new(), empty_report())
                }
                Err(e) => {
                    tracing::error!(
                        "Failed to move unreadable document aside: {}; changes will not be saved",
                        e
                    );
                    Loaded {
                        habits: Vec::new(),
                        report: empty_report(),
                        writable: false,
                    }
                }
            }
        }
    }
}

fn empty_report() -> LoadReport {
    LoadReport {
        reset_to_empty: true,
        ..LoadReport::default()
    }
}

fn save_locked(state: &mut StoreState) -> Durability {
    let Some(path) = state.path.as_deref() else {
        return Durability::MemoryOnly;
    };
    if !state.writable {
        state.last_error = Some(StoreError::ReadOnly(path.to_path_buf()).to_string());
        return Durability::MemoryOnly;
    }

    match write_collection(path, &state.habits) {
        Ok(()) => {
            state.last_error = None;
            Durability::Persisted
        }
        Err(e) => {
            tracing::error!("Failed to save habits to {}: {}", path.display(), e);
            state.last_error = Some(e.to_string());
            Durability::MemoryOnly
        }
    }
}

fn write_collection(path: &Path, habits: &[Habit]) -> Result<(), StoreError> {
    let document = schema::encode(habits)?;
    file::write_atomic(path, &document)?;
    tracing::debug!("Saved {} habits to {}", habits.len(), path.display());
    Ok(())
}
