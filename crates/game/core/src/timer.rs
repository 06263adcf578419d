//! Timer queue and the [`Countdown`] primitive.
//!
//! Countdowns are the only suspension points of the engine: the cast-time
//! gate, the projectile impact gate, and aura ticks/expiry all schedule an
//! entry in the world's [`TimerQueue`]. The queue never runs callbacks itself;
//! the owner pops due entries and dispatches their payload, which keeps all
//! mutation on the single world thread.

use std::collections::{BTreeMap, HashMap};

/// World clock in milliseconds.
pub type GameTime = u64;

/// Handle to one scheduled queue entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimerId(pub u64);

/// Ordered one-shot timers carrying a payload of type `E`.
///
/// Entries due at the same time fire in scheduling order.
#[derive(Debug)]
pub struct TimerQueue<E> {
    next_id: u64,
    entries: BTreeMap<(GameTime, TimerId), E>,
    deadlines: HashMap<TimerId, GameTime>,
}

impl<E> Default for TimerQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> TimerQueue<E> {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            entries: BTreeMap::new(),
            deadlines: HashMap::new(),
        }
    }

    /// Schedules `event` to fire at `end`.
    pub fn schedule(&mut self, end: GameTime, event: E) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.insert((end, id), event);
        self.deadlines.insert(id, end);
        id
    }

    /// Cancels a pending entry. Returns the payload if it was still pending.
    pub fn cancel(&mut self, id: TimerId) -> Option<E> {
        let end = self.deadlines.remove(&id)?;
        self.entries.remove(&(end, id))
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.deadlines.contains_key(&id)
    }

    pub fn deadline(&self, id: TimerId) -> Option<GameTime> {
        self.deadlines.get(&id).copied()
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<GameTime> {
        self.entries.keys().next().map(|(end, _)| *end)
    }

    /// Removes and returns the earliest entry if it is due at `now`.
    pub fn pop_due(&mut self, now: GameTime) -> Option<(GameTime, TimerId, E)> {
        let (&(end, id), _) = self.entries.iter().next()?;
        if end > now {
            return None;
        }
        let event = self.entries.remove(&(end, id))?;
        self.deadlines.remove(&id);
        Some((end, id, event))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Cancelable, one-shot delayed completion.
///
/// A countdown owns at most one queue entry. Setting a new end time replaces
/// the previous entry, so a countdown can be rescheduled while running (used
/// by projectile tracking).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Countdown {
    timer: Option<TimerId>,
}

impl Countdown {
    pub const fn new() -> Self {
        Self { timer: None }
    }

    /// Schedules completion at `end`, replacing any pending completion.
    pub fn set_end<E>(&mut self, queue: &mut TimerQueue<E>, end: GameTime, event: E) {
        self.cancel(queue);
        self.timer = Some(queue.schedule(end, event));
    }

    /// Cancels the pending completion, if any.
    pub fn cancel<E>(&mut self, queue: &mut TimerQueue<E>) {
        if let Some(id) = self.timer.take() {
            queue.cancel(id);
        }
    }

    /// True while the completion is still pending in `queue`.
    pub fn is_running<E>(&self, queue: &TimerQueue<E>) -> bool {
        self.timer.is_some_and(|id| queue.is_pending(id))
    }

    /// True if `id` is the entry this countdown is waiting on.
    pub fn is_timer(&self, id: TimerId) -> bool {
        self.timer == Some(id)
    }

    pub fn end<E>(&self, queue: &TimerQueue<E>) -> Option<GameTime> {
        self.timer.and_then(|id| queue.deadline(id))
    }
}
