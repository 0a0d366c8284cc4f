//! Bounded pool of active habit slots.
//!
//! A front end shows a fixed number of habits at once. The registry decides
//! which habits occupy those slots and routes user actions to the tracker.

use crate::error::{HabitError, HabitResult};
use crate::models::*;
use crate::tracker::HabitTracker;

pub const DEFAULT_SLOT_CAPACITY: usize = 8;

pub struct HabitRegistry {
    tracker: HabitTracker,
    slots: Vec<Option<HabitId>>,
}

impl HabitRegistry {
    /// Loads every stored habit into slots in store order. Habits beyond
    /// `capacity` stay persisted but inactive.
    pub fn start(tracker: HabitTracker, capacity: usize) -> Self {
        let mut registry = Self {
            tracker,
            slots: vec![None; capacity],
        };

        for habit in registry.tracker.list_habits() {
            if let Err(e) = registry.activate_slot(&habit) {
                tracing::warn!("Habit {} ({}) left inactive: {}", habit.name, habit.id, e);
            }
        }
        registry
    }

    pub fn tracker(&self) -> &HabitTracker {
        &self.tracker
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Drives the "no habits yet" indicator.
    pub fn is_empty(&self) -> bool {
        self.active_count() == 0
    }

    pub fn has_free_slot(&self) -> bool {
        self.slots.iter().any(Option::is_none)
    }

    /// Active identifiers in slot order.
    pub fn active_ids(&self) -> Vec<HabitId> {
        self.slots.iter().flatten().copied().collect()
    }

    pub fn slot_of(&self, id: HabitId) -> Option<usize> {
        self.slots.iter().position(|slot| *slot == Some(id))
    }

    /// Places `habit` in the first free slot. Already active habits keep
    /// their slot.
    pub fn activate_slot(&mut self, habit: &Habit) -> HabitResult<usize> {
        if let Some(index) = self.slot_of(habit.id) {
            return Ok(index);
        }
        let capacity = self.capacity();
        let index = self
            .slots
            .iter()
            .position(Option::is_none)
            .ok_or(HabitError::NoFreeSlot { capacity })?;
        self.slots[index] = Some(habit.id);
        Ok(index)
    }

    /// Frees the slot held by `id`. Returns `false` when it held none.
    pub fn release_slot(&mut self, id: HabitId) -> bool {
        match self.slot_of(id) {
            Some(index) => {
                self.slots[index] = None;
                true
            }
            None => false,
        }
    }

    // ============================================================
    // User actions
    // ============================================================

    /// Creates and activates a habit. Fails before touching the store when
    /// every slot is taken.
    pub fn create_habit(&mut self, input: CreateHabitInput) -> HabitResult<Habit> {
        if !self.has_free_slot() {
            tracing::warn!("No free habit slot for {:?}", input.name);
            return Err(HabitError::NoFreeSlot {
                capacity: self.capacity(),
            });
        }
        let habit = self.tracker.create_habit(input)?;
        self.activate_slot(&habit)?;
        Ok(habit)
    }

    pub fn edit_habit(&self, id: HabitId, input: UpdateHabitInput) -> HabitResult<Habit> {
        self.tracker.edit_habit(id, input)
    }

    pub fn increment_habit(&self, id: HabitId) -> HabitResult<Increment> {
        self.tracker.increment_habit(id)
    }

    pub fn delete_habit(&mut self, id: HabitId) -> HabitResult<()> {
        self.tracker.delete_habit(id)?;
        self.release_slot(id);
        Ok(())
    }

    /// Active habits in slot order, reconciled with today.
    pub fn list_active(&self) -> Vec<Habit> {
        let habits = self.tracker.list_habits();
        self.active_ids()
            .into_iter()
            .filter_map(|id| habits.iter().find(|h| h.id == id).cloned())
            .collect()
    }
}
