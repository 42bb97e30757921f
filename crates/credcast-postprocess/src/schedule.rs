//! One-shot deferred tasks.
//!
//! The deferred diagram retry is handed to a [`Scheduler`]. Tasks are
//! fire-and-forget: there is no handle to cancel them.

use std::cell::RefCell;
use std::time::Duration;

/// Work to run once after a delay, on the scheduling thread.
pub type DeferredTask = Box<dyn FnOnce() + 'static>;

/// Runs tasks after a delay on the current thread.
pub trait Scheduler {
    /// Run `task` once, `delay` from now.
    fn schedule(&self, delay: Duration, task: DeferredTask);
}

struct PendingTask {
    due: Duration,
    seq: u64,
    task: DeferredTask,
}

#[derive(Default)]
struct ManualState {
    now: Duration,
    next_seq: u64,
    pending: Vec<PendingTask>,
}

/// Scheduler driven by an explicit virtual clock.
///
/// Time only moves when [`advance`](Self::advance) is called. Due tasks run in
/// due-time order, ties in scheduling order. Tasks may schedule further tasks.
#[derive(Default)]
pub struct ManualScheduler {
    state: RefCell<ManualState>,
}

impl ManualScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time elapsed since creation.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.state.borrow().now
    }

    /// Number of tasks waiting to run.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.state.borrow().pending.len()
    }

    /// Move the clock forward by `by`, running every task that becomes due.
    ///
    /// Returns the number of tasks run.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.now() + by;
        let mut ran = 0;
        while let Some(task) = self.take_due(target) {
            task();
            ran += 1;
        }
        self.state.borrow_mut().now = target;
        ran
    }

    /// Pop the earliest task due at or before `target`, moving the clock to it.
    fn take_due(&self, target: Duration) -> Option<DeferredTask> {
        let mut state = self.state.borrow_mut();
        let index = state
            .pending
            .iter()
            .enumerate()
            .filter(|(_, pending)| pending.due <= target)
            .min_by_key(|(_, pending)| (pending.due, pending.seq))
            .map(|(index, _)| index)?;
        let pending = state.pending.remove(index);
        state.now = pending.due;
        Some(pending.task)
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: DeferredTask) {
        let mut state = self.state.borrow_mut();
        let due = state.now + delay;
        let seq = state.next_seq;
        state.next_seq += 1;
        state.pending.push(PendingTask { due, seq, task });
    }
}

/// Scheduler backed by the tokio timer.
///
/// Tasks are spawned with [`tokio::task::spawn_local`], so scheduling must
/// happen inside a [`tokio::task::LocalSet`].
///
/// # Panics
///
/// [`schedule`](Scheduler::schedule) panics when called outside a `LocalSet`.
/// Use [`ManualScheduler`] when no local task set is available.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioScheduler;

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, task: DeferredTask) {
        tokio::task::spawn_local(async move {
            tokio::time::sleep(delay).await;
            task();
        });
    }
}
