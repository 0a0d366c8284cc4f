//! Domain models for habitkeep.
//!
//! # Core Concepts
//!
//! - [`Habit`]: A recurring goal with a target repetition count per period.
//!   It carries its current progress, the date its period last reset, and the
//!   dated history of what was reached on each day.
//! - [`Frequency`]: How many elapsed calendar days close a period
//!   (daily, every two days, weekly).
//! - [`DailyProgress`]: A dated snapshot of progress against the target that
//!   was valid on that day. Targets change over time; snapshots do not.
//!
//! Inputs ([`CreateHabitInput`], [`UpdateHabitInput`]) are validated before
//! any mutation happens, so a rejected call never leaves partial state behind.

mod habit;
mod progress;

pub use habit::*;
pub use progress::*;
