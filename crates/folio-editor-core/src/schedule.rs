//! Clock and debounce scheduling.
//!
//! Debounced work is keyed by task: scheduling a task that is already pending
//! supersedes it instead of queueing a second run. The host drives execution by
//! calling into the editor whenever [`Scheduler::next_deadline`] elapses.

use std::cell::Cell;
use std::fmt::Debug;
use std::rc::Rc;
use std::time::Duration;

use web_time::Instant;

/// Source of the current time.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Manually advanced clock. Clones share the same time.
#[derive(Clone, Debug)]
pub struct ManualClock {
    base: Instant,
    elapsed: Rc<Cell<Duration>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            elapsed: Rc::new(Cell::new(Duration::ZERO)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.elapsed.set(self.elapsed.get() + by);
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + self.elapsed.get()
    }
}

impl<C: Clock + ?Sized> Clock for Rc<C> {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

/// Pending debounced tasks with supersede-on-reschedule semantics.
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    pending: Vec<(T, Instant)>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
        }
    }
}

impl<T: Copy + Eq + Debug> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `task` at `at`, replacing any pending run of the same task.
    pub fn schedule(&mut self, task: T, at: Instant) {
        if self.cancel(task) {
            tracing::trace!(target: "folio::schedule", ?task, "superseded pending task");
        }
        self.pending.push((task, at));
    }

    /// Drop a pending run. Returns true if one was pending.
    pub fn cancel(&mut self, task: T) -> bool {
        let before = self.pending.len();
        self.pending.retain(|(t, _)| *t != task);
        before != self.pending.len()
    }

    pub fn is_pending(&self, task: T) -> bool {
        self.pending.iter().any(|(t, _)| *t == task)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.iter().map(|(_, at)| *at).min()
    }

    /// Remove and return the earliest task due at `now`.
    ///
    /// Ties resolve in scheduling order.
    pub fn pop_due(&mut self, now: Instant) -> Option<T> {
        let (idx, _) = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, (_, at))| *at <= now)
            .min_by_key(|(_, (_, at))| *at)?;
        Some(self.pending.remove(idx).0)
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
