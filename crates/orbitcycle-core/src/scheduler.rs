//! Virtual-time timer queue.
//!
//! Every delayed effect on the page (processing transitions, particle
//! lifetimes, staggered spawns, debounces) is a task armed here. The host
//! drives time forward explicitly, so runs are deterministic and testable
//! without a real event loop.
//!
//! # Ordering
//!
//! Timers fire in due-time order. Timers due at the same instant fire in
//! the order they were armed (FIFO), matching a browser timer queue.
//!
//! # Cancellation
//!
//! [`Scheduler::schedule`] returns a [`TimerId`]. Cancelling it removes the
//! task before it fires; cancelling an already-fired or unknown id is a
//! harmless no-op.

use std::collections::BTreeMap;

use slotmap::SlotMap;

use crate::fixed::Millis;
use crate::id::TimerId;

/// An armed task waiting for its due time.
#[derive(Debug)]
struct TimerEntry<T> {
    due: Millis,
    seq: u64,
    task: T,
}

/// A task whose due time has been reached, handed back to the owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fired<T> {
    pub id: TimerId,
    pub due: Millis,
    pub task: T,
}

/// A queue of cancellable timers over a virtual millisecond clock.
#[derive(Debug)]
pub struct Scheduler<T> {
    now: Millis,
    timers: SlotMap<TimerId, TimerEntry<T>>,
    /// (due, arm order) -> timer. First key is the next timer to fire.
    queue: BTreeMap<(Millis, u64), TimerId>,
    next_seq: u64,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    /// Create an empty scheduler with the clock at zero.
    pub fn new() -> Self {
        Self {
            now: 0,
            timers: SlotMap::with_key(),
            queue: BTreeMap::new(),
            next_seq: 0,
        }
    }

    /// Current virtual time.
    pub fn now(&self) -> Millis {
        self.now
    }

    /// Move the clock forward to `at`. The clock never runs backwards.
    pub fn set_now(&mut self, at: Millis) {
        self.now = self.now.max(at);
    }

    /// Arm `task` to fire `delay` milliseconds from now.
    pub fn schedule(&mut self, delay: Millis, task: T) -> TimerId {
        let due = self.now.saturating_add(delay);
        let seq = self.next_seq;
        self.next_seq += 1;
        let id = self.timers.insert(TimerEntry { due, seq, task });
        self.queue.insert((due, seq), id);
        id
    }

    /// Cancel an armed timer. Returns `true` if it was still pending.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.timers.remove(id) {
            Some(entry) => {
                self.queue.remove(&(entry.due, entry.seq));
                true
            }
            None => false,
        }
    }

    /// Whether a timer is still waiting to fire.
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.timers.contains_key(id)
    }

    /// Due time of a pending timer.
    pub fn due_at(&self, id: TimerId) -> Option<Millis> {
        self.timers.get(id).map(|e| e.due)
    }

    /// Number of armed timers.
    pub fn pending_count(&self) -> usize {
        self.timers.len()
    }

    /// Whether no timers are armed.
    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Due time of the next timer to fire.
    pub fn next_due(&self) -> Option<Millis> {
        self.queue.first_key_value().map(|(&(due, _), _)| due)
    }

    /// Pop the next timer if it is due at or before `until`, advancing the
    /// clock to its due time.
    pub fn pop_due(&mut self, until: Millis) -> Option<Fired<T>> {
        let (&(due, seq), &id) = self.queue.first_key_value()?;
        if due > until {
            return None;
        }
        self.queue.remove(&(due, seq));
        let entry = self.timers.remove(id)?;
        self.set_now(due);
        Some(Fired {
            id,
            due,
            task: entry.task,
        })
    }

    /// Drop every armed timer without firing it.
    pub fn clear(&mut self) {
        self.timers.clear();
        self.queue.clear();
    }
}

// ===========================================================================
// Tests
// ===========================================================================
