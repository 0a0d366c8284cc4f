//! Change notifications for habit state.
//!
//! Subscribers register explicitly and receive events over their own channel.
//! The publisher knows nothing about who listens; receivers that have been
//! dropped are pruned on the next publish. Each channel holds at most
//! [`EVENT_BUFFER`] undelivered events; a subscriber that falls further behind
//! misses the overflow.

use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::sync::{Arc, Mutex};

use crate::models::{DailyProgress, HabitId};

/// Something that happened to a habit.
#[derive(Debug, Clone, PartialEq)]
pub enum HabitEvent {
    Created { id: HabitId, name: String },
    Edited { id: HabitId },
    Progressed { id: HabitId, progress: u32, target: u32 },
    RolledOver {
        id: HabitId,
        archived: Option<DailyProgress>,
        reset: bool,
    },
    Deleted { id: HabitId },
}

pub type SubscriptionId = u64;

/// Undelivered events kept per subscriber.
pub const EVENT_BUFFER: usize = 256;

/// A registered listener: its id (for [`EventBus::unsubscribe`]) and the
/// receiving end of its channel.
pub struct Subscription {
    pub id: SubscriptionId,
    pub receiver: Receiver<HabitEvent>,
}

#[derive(Default)]
struct Subscribers {
    next_id: SubscriptionId,
    senders: Vec<(SubscriptionId, SyncSender<HabitEvent>)>,
}

/// Fan-out of [`HabitEvent`]s to registered subscribers.
#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: Arc<Mutex<Subscribers>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::sync_channel(EVENT_BUFFER);
        let mut subs = self.lock();
        subs.next_id += 1;
        let id = subs.next_id;
        subs.senders.push((id, tx));
        tracing::debug!("Subscriber {} registered for habit events", id);
        Subscription { id, receiver: rx }
    }

    /// Returns `false` when `id` was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subs = self.lock();
        let before = subs.senders.len();
        subs.senders.retain(|(sub_id, _)| *sub_id != id);
        subs.senders.len() != before
    }

    pub fn publish(&self, event: HabitEvent) {
        self.lock()
            .senders
            .retain(|(id, tx)| match tx.try_send(event.clone()) {
                Ok(()) => true,
                Err(TrySendError::Full(_)) => {
                    tracing::warn!("Subscriber {} is not keeping up, dropping event", id);
                    true
                }
                Err(TrySendError::Disconnected(_)) => false,
            });
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().senders.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Subscribers> {
        self.subscribers.lock().expect("event bus lock poisoned")
    }
}
