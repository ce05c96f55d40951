//! Delay-based task scheduling driven by the frame loop
//!
//! A task never fires during the tick that scheduled it, so a zero-delay
//! task runs on the next tick at the earliest.

use std::time::{Duration, Instant};

/// Deferred work understood by the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Task {
    /// Persist the note text once the debounce window has elapsed
    SaveNotes,
    /// Clear the scroll synchronizer's reentrancy guard
    ReleaseSyncLock,
}

#[derive(Debug, Clone)]
struct Pending {
    task: Task,
    deadline: Instant,
    scheduled_at_tick: u64,
}

/// Single-threaded timer queue
#[derive(Debug, Default)]
pub struct Scheduler {
    pending: Vec<Pending>,
    tick: u64,
}

impl Scheduler {
    /// Create an empty scheduler
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `task` to run after `delay`, replacing any pending instance of it
    pub fn schedule(&mut self, task: Task, delay: Duration, now: Instant) {
        self.cancel(task);
        self.pending.push(Pending {
            task,
            deadline: now + delay,
            scheduled_at_tick: self.tick,
        });
        tracing::trace!("Scheduled {:?} in {:?}", task, delay);
    }

    /// Cancel a pending task. Returns whether one was pending.
    pub fn cancel(&mut self, task: Task) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.task != task);
        before != self.pending.len()
    }

    /// Check whether a task is waiting to fire
    #[cfg(test)]
    pub fn is_pending(&self, task: Task) -> bool {
        self.pending.iter().any(|p| p.task == task)
    }

    /// Advance one tick and return the tasks that are due, earliest first
    pub fn tick(&mut self, now: Instant) -> Vec<Task> {
        let current = self.tick;
        self.tick += 1;

        let mut due: Vec<Pending> = Vec::new();
        self.pending.retain(|p| {
            if p.scheduled_at_tick < current && p.deadline <= now {
                due.push(p.clone());
                false
            } else {
                true
            }
        });

        due.sort_by_key(|p| p.deadline);
        due.into_iter().map(|p| p.task).collect()
    }

    /// How long the caller may wait before the next tick has work to do
    pub fn time_until_next(&self, now: Instant) -> Option<Duration> {
        self.pending
            .iter()
            .map(|p| p.deadline.saturating_duration_since(now))
            .min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_delay_waits_for_next_tick() {
        let mut scheduler = Scheduler::new();
        let now = Instant::now();

        scheduler.schedule(Task::ReleaseSyncLock, Duration::ZERO, now);
        assert!(scheduler.tick(now).is_empty());
        assert_eq!(scheduler.tick(now), vec![Task::ReleaseSyncLock]);
        assert!(!scheduler.is_pending(Task::ReleaseSyncLock));
    }

    #[test]
    fn test_delay_is_respected() {
        let mut scheduler = Scheduler::new();
        let start = Instant::now();

        scheduler.schedule(Task::SaveNotes, Duration::from_millis(350), start);
        scheduler.tick(start);
        assert!(scheduler.tick(start + Duration::from_millis(349)).is_empty());
        assert_eq!(
            scheduler.tick(start + Duration::from_millis(350)),
            vec![Task::SaveNotes]
        );
    }

    #[test]
    fn test_reschedule_replaces_pending_instance() {
        let mut scheduler = Scheduler::new();
        let start = Instant::now();

        scheduler.schedule(Task::SaveNotes, Duration::from_millis(350), start);
        scheduler.tick(start);
        let later = start + Duration::from_millis(300);
        scheduler.schedule(Task::SaveNotes, Duration::from_millis(350), later);

        assert!(scheduler.tick(start + Duration::from_millis(400)).is_empty());
        assert_eq!(
            scheduler.tick(later + Duration::from_millis(350)),
            vec![Task::SaveNotes]
        );
    }

    #[test]
    fn test_cancel_and_time_until_next() {
        let mut scheduler = Scheduler::new();
        let now = Instant::now();
        assert_eq!(scheduler.time_until_next(now), None);

        scheduler.schedule(Task::SaveNotes, Duration::from_millis(350), now);
        scheduler.schedule(Task::ReleaseSyncLock, Duration::ZERO, now);
        assert_eq!(scheduler.time_until_next(now), Some(Duration::ZERO));

        assert!(scheduler.cancel(Task::ReleaseSyncLock));
        assert!(!scheduler.cancel(Task::ReleaseSyncLock));
        assert_eq!(
            scheduler.time_until_next(now),
            Some(Duration::from_millis(350))
        );
    }
}
