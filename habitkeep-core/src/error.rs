use thiserror::Error;

use crate::models::HabitId;

pub type HabitResult<T> = Result<T, HabitError>;

/// Errors surfaced to callers of the habit operations.
///
/// Persistence problems are deliberately absent: the store absorbs them and
/// keeps serving the in-memory state (see [`crate::store::StoreError`]).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HabitError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Habit not found: {0}")]
    NotFound(HabitId),

    /// No habit identifier starts with the given prefix.
    #[error("Habit not found: no id starts with `{0}`")]
    PrefixNotFound(String),

    #[error("No free habit slot (capacity {capacity})")]
    NoFreeSlot { capacity: usize },

    #[error("Ambiguous habit id prefix: {0}")]
    AmbiguousId(String),
}
