//! Core of habitkeep: habit models, period rollover, and the durable store.
//!
//! Layers, leaf first:
//! - [`store::HabitStore`] owns the JSON document on disk.
//! - [`models::Habit`] owns progress and the rollover decision.
//! - [`tracker::HabitTracker`] is the operation surface for front ends.
//! - [`registry::HabitRegistry`] bounds how many habits are active at once.

pub mod clock;
pub mod error;
pub mod events;
pub mod models;
pub mod registry;
mod rollover;
pub mod store;
pub mod tracker;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{HabitError, HabitResult};
pub use events::{EventBus, HabitEvent, Subscription, SubscriptionId, EVENT_BUFFER};
pub use registry::{HabitRegistry, DEFAULT_SLOT_CAPACITY};
pub use store::{Durability, HabitStore, LoadReport, ProgressState, StoreError};
pub use tracker::HabitTracker;
