//! Habit operations as seen by a user interface.
//!
//! Every read goes through a rollover evaluation against the clock, so the
//! caller always sees the habit as of today. Mutations are persisted by the
//! store; persistence failures never turn into errors here.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::clock::{Clock, SystemClock};
use crate::error::{HabitError, HabitResult};
use crate::events::{EventBus, HabitEvent};
use crate::models::*;
use crate::store::HabitStore;

pub struct HabitTracker {
    store: HabitStore,
    clock: Arc<dyn Clock>,
    events: EventBus,
}

impl HabitTracker {
    pub fn new(store: HabitStore, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            events: EventBus::new(),
        }
    }

    pub fn with_system_clock(store: HabitStore) -> Self {
        Self::new(store, Arc::new(SystemClock))
    }

    pub fn store(&self) -> &HabitStore {
        &self.store
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    // ============================================================
    // Mutations
    // ============================================================

    pub fn create_habit(&self, input: CreateHabitInput) -> HabitResult<Habit> {
        let habit = Habit::new(input, self.today())?;
        self.store.upsert(&habit);
        tracing::info!("Created habit {} ({})", habit.name, habit.id);
        self.events.publish(HabitEvent::Created {
            id: habit.id,
            name: habit.name.clone(),
        });
        Ok(habit)
    }

    /// Applies the edit, then re-evaluates rollover since the target or the
    /// frequency may have changed under the current period.
    pub fn edit_habit(&self, id: HabitId, input: UpdateHabitInput) -> HabitResult<Habit> {
        let today = self.today();
        let (habit, rollover) = self
            .store
            .modify(id, |habit| -> HabitResult<_> {
                habit.apply_update(input)?;
                let rollover = habit.roll_over(today);
                Ok((habit.clone(), rollover))
            })
            .ok_or(HabitError::NotFound(id))??;

        self.events.publish(HabitEvent::Edited { id });
        self.publish_rollover(id, rollover);
        Ok(habit)
    }

    /// Adds one repetition for today. Reconciles the period first so an
    /// increment on a new day counts toward the new period.
    pub fn increment_habit(&self, id: HabitId) -> HabitResult<Increment> {
        let today = self.today();
        let (increment, rollover) = self
            .store
            .modify(id, |habit| {
                let rollover = habit.roll_over(today);
                (habit.increment(today), rollover)
            })
            .ok_or(HabitError::NotFound(id))?;

        self.publish_rollover(id, rollover);
        if increment.incremented {
            self.events.publish(HabitEvent::Progressed {
                id,
                progress: increment.progress,
                target: increment.target,
            });
        }
        Ok(increment)
    }

    /// Removes the habit and its history. The identifier is never reused.
    pub fn delete_habit(&self, id: HabitId) -> HabitResult<()> {
        self.store.delete(id).ok_or(HabitError::NotFound(id))?;
        tracing::info!("Deleted habit {}", id);
        self.events.publish(HabitEvent::Deleted { id });
        Ok(())
    }

    // ============================================================
    // Reads
    // ============================================================

    /// Every habit, reconciled with today.
    pub fn list_habits(&self) -> Vec<Habit> {
        let today = self.today();
        self.store
            .modify_each(|habit| habit.roll_over(today))
            .into_iter()
            .map(|(habit, rollover)| {
                self.publish_rollover(habit.id, rollover);
                habit
            })
            .collect()
    }

    pub fn get_habit(&self, id: HabitId) -> HabitResult<Habit> {
        let today = self.today();
        let (habit, rollover) = self
            .store
            .modify(id, |habit| {
                let rollover = habit.roll_over(today);
                (habit.clone(), rollover)
            })
            .ok_or(HabitError::NotFound(id))?;
        self.publish_rollover(id, rollover);
        Ok(habit)
    }

    /// Completion ratios for the seven days starting at `week_start`.
    pub fn weekly_history(&self, id: HabitId, week_start: NaiveDate) -> HabitResult<[f32; 7]> {
        Ok(self.get_habit(id)?.weekly_fractions(week_start))
    }

    /// Completion ratio recorded for today.
    pub fn today_fraction(&self, id: HabitId) -> HabitResult<f32> {
        let today = self.today();
        Ok(self.get_habit(id)?.fraction_on(today))
    }

    /// Resolves a full identifier or a unique prefix of one.
    pub fn resolve_id(&self, needle: &str) -> HabitResult<HabitId> {
        let needle = needle.trim().to_ascii_lowercase();
        if needle.is_empty() {
            return Err(HabitError::InvalidArgument(
                "habit id cannot be empty".to_string(),
            ));
        }

        let matches: Vec<HabitId> = self
            .store
            .load_all()
            .into_iter()
            .map(|h| h.id)
            .filter(|id| id.to_string().starts_with(&needle))
            .collect();

        match matches.as_slice() {
            [id] => Ok(*id),
            [] => match HabitId::parse_str(&needle) {
                Ok(id) => Err(HabitError::NotFound(id)),
                Err(_) => Err(HabitError::PrefixNotFound(needle)),
            },
            _ => Err(HabitError::AmbiguousId(needle)),
        }
    }

    fn publish_rollover(&self, id: HabitId, rollover: Rollover) {
        if rollover.reset || rollover.archived.is_some() {
            tracing::debug!(
                "Rolled over habit {} (reset: {}, archived: {:?})",
                id,
                rollover.reset,
                rollover.archived
            );
            self.events.publish(HabitEvent::RolledOver {
                id,
                archived: rollover.archived,
                reset: rollover.reset,
            });
        }
    }
}
