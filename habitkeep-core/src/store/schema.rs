//! On-disk document format.
//!
//! Writing is strict: the current version, every field present. Reading is
//! lenient: a record that cannot be trusted is dropped or repaired on its own
//! so one bad entry never costs the rest of the store.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::StoreError;
use crate::models::*;

pub const CURRENT_VERSION: u32 = 1;

/// Summary of what a load kept, dropped and fixed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: usize,
    pub dropped: usize,
    pub repaired: usize,
    /// The document as a whole was unreadable and the store started empty.
    pub reset_to_empty: bool,
}

// ============================================================
// Writing
// ============================================================

#[derive(Serialize)]
struct DocumentOut<'a> {
    version: u32,
    habits: Vec<RecordOut<'a>>,
}

#[derive(Serialize)]
struct RecordOut<'a> {
    habit: HabitOut<'a>,
    last_reset_date: Option<NaiveDate>,
    history: &'a [DailyProgress],
}

#[derive(Serialize)]
struct HabitOut<'a> {
    id: HabitId,
    name: &'a str,
    target: u32,
    frequency: Frequency,
    icon: IconTag,
    note: &'a str,
    progress: u32,
}

/// Serializes the whole collection as a pretty-printed document.
pub fn encode(habits: &[Habit]) -> Result<String, StoreError> {
    let doc = DocumentOut {
        version: CURRENT_VERSION,
        habits: habits
            .iter()
            .map(|h| RecordOut {
                habit: HabitOut {
                    id: h.id,
                    name: &h.name,
                    target: h.target,
                    frequency: h.frequency,
                    icon: h.icon,
                    note: &h.note,
                    progress: h.progress,
                },
                last_reset_date: h.last_reset_date,
                history: &h.history,
            })
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&doc)?)
}

// ============================================================
// Reading
// ============================================================

#[derive(Deserialize)]
struct DocumentIn {
    #[serde(default)]
    version: Option<u32>,
    habits: Vec<Value>,
}

#[derive(Deserialize)]
struct RecordIn {
    habit: Option<HabitIn>,
    #[serde(default)]
    last_reset_date: Option<Value>,
    #[serde(default)]
    history: Vec<Value>,
}

#[derive(Deserialize)]
struct HabitIn {
    id: Option<String>,
    name: Option<String>,
    target: Option<i64>,
    frequency: Option<String>,
    #[serde(default)]
    icon: Option<String>,
    #[serde(default)]
    note: Option<String>,
    #[serde(default)]
    progress: Option<i64>,
}

#[derive(Deserialize)]
struct ProgressIn {
    date: Option<Value>,
    progress: Option<i64>,
    target: Option<i64>,
}

/// Parses a document, dropping or repairing individual records.
///
/// Fails only when the document itself is not a readable habit document.
pub fn decode(content: &str) -> Result<(Vec<Habit>, LoadReport), StoreError> {
    let doc: DocumentIn = serde_json::from_str(content)?;
    let version = doc.version.unwrap_or(CURRENT_VERSION);
    if version > CURRENT_VERSION {
        return Err(StoreError::UnsupportedVersion(version));
    }

    let mut report = LoadReport::default();
    let mut habits: Vec<Habit> = Vec::with_capacity(doc.habits.len());

    for (index, raw) in doc.habits.into_iter().enumerate() {
        match decode_record(raw) {
            Ok((habit, repaired)) => {
                if habits.iter().any(|h| h.id == habit.id) {
                    tracing::warn!("Dropping habit record {}: duplicate id {}", index, habit.id);
                    report.dropped += 1;
                    continue;
                }
                if repaired {
                    tracing::warn!("Repaired habit record {} ({})", index, habit.id);
                    report.repaired += 1;
                }
                habits.push(habit);
            }
            Err(reason) => {
                tracing::warn!("Dropping habit record {}: {}", index, reason);
                report.dropped += 1;
            }
        }
    }

    report.loaded = habits.len();
    Ok((habits, report))
}

fn decode_record(raw: Value) -> Result<(Habit, bool), String> {
    let record: RecordIn =
        serde_json::from_value(raw).map_err(|e| format!("malformed record: {e}"))?;
    let habit = record.habit.ok_or("missing habit definition")?;

    let id = habit
        .id
        .as_deref()
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or("missing or invalid id")?;
    let name = habit
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or("missing or empty name")?;
    let target = habit
        .target
        .filter(|t| *t >= 1)
        .and_then(|t| u32::try_from(t).ok())
        .ok_or("missing or non-positive target")?;
    let frequency = habit
        .frequency
        .as_deref()
        .and_then(Frequency::from_str)
        .ok_or("missing or unknown frequency")?;

    let mut repaired = false;

    let icon = match habit.icon.as_deref() {
        None => IconTag::default(),
        Some(tag) => IconTag::from_str(tag).unwrap_or_else(|| {
            repaired = true;
            IconTag::default()
        }),
    };

    let raw_progress = habit.progress.unwrap_or(0);
    let progress = if raw_progress < 0 {
        repaired = true;
        0
    } else if raw_progress > i64::from(target) {
        repaired = true;
        target
    } else {
        raw_progress as u32
    };

    let last_reset_date = match record.last_reset_date {
        None | Some(Value::Null) => None,
        Some(value) => {
            let parsed = parse_date_value(&value);
            if parsed.is_none() && !is_sentinel(&value) {
                repaired = true;
            }
            parsed
        }
    };

    let mut history: Vec<DailyProgress> = Vec::with_capacity(record.history.len());
    for entry in record.history {
        match decode_progress(entry) {
            Some(snapshot) => history.push(snapshot),
            None => repaired = true,
        }
    }

    Ok((
        Habit {
            id,
            name,
            target,
            frequency,
            icon,
            note: habit.note.unwrap_or_default(),
            progress,
            last_reset_date,
            history,
        },
        repaired,
    ))
}

fn decode_progress(raw: Value) -> Option<DailyProgress> {
    let entry: ProgressIn = serde_json::from_value(raw).ok()?;
    let date = entry.date.as_ref().and_then(parse_date_value)?;
    let target = entry
        .target
        .filter(|t| *t >= 1)
        .and_then(|t| u32::try_from(t).ok())?;
    let progress = u32::try_from(entry.progress.unwrap_or(0).max(0)).ok()?;
    Some(DailyProgress {
        date,
        progress,
        target,
    })
}

fn parse_date_value(value: &Value) -> Option<NaiveDate> {
    value.as_str().and_then(parse_date)
}

/// Accepts `YYYY-MM-DD` and date-time strings. Year 1 is the "never" sentinel.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))?;

    if date.year() <= 1 {
        return None;
    }
    Some(date)
}

fn is_sentinel(value: &Value) -> bool {
    value.as_str().is_some_and(|s| s.trim().starts_with("0001-01-01"))
}
