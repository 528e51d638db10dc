//! Virtual-time task scheduler.
//!
//! Delayed UI steps (button release, delayed scroll, highlight removal) are
//! queued here instead of on wall-clock timers. The owner advances the clock
//! explicitly, so every interleaving is reproducible, and pending steps can
//! be cancelled as a group.

/// Identifies one scheduled task for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

struct Scheduled<T> {
    due_ms: u64,
    seq: u64,
    task: T,
}

pub struct Timeline<T> {
    now_ms: u64,
    next_seq: u64,
    pending: Vec<Scheduled<T>>,
}

impl<T> Timeline<T> {
    pub fn new() -> Self {
        Self {
            now_ms: 0,
            next_seq: 0,
            pending: Vec::new(),
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    /// Queue `task` to fire `delay_ms` after the current time.
    pub fn schedule(&mut self, delay_ms: u64, task: T) -> TaskHandle {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(Scheduled {
            due_ms: self.now_ms.saturating_add(delay_ms),
            seq,
            task,
        });
        TaskHandle(seq)
    }

    /// Returns false when the task already fired or was cancelled.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|s| s.seq != handle.0);
        self.pending.len() != before
    }

    /// Drop every pending task, returning how many were dropped.
    pub fn cancel_all(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        dropped
    }

    /// Remove and return the earliest task due at or before `until_ms`,
    /// moving the clock to its due time. Ties fire in scheduling order.
    ///
    /// Callers loop on this, so tasks scheduled by a fired task that are due
    /// inside the window fire in the same pass.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<T> {
        let idx = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, s)| s.due_ms <= until_ms)
            .min_by_key(|(_, s)| (s.due_ms, s.seq))
            .map(|(i, _)| i)?;
        let scheduled = self.pending.swap_remove(idx);
        self.now_ms = self.now_ms.max(scheduled.due_ms);
        Some(scheduled.task)
    }

    /// Move the clock forward to `until_ms` once every due task was popped.
    pub fn settle(&mut self, until_ms: u64) {
        self.now_ms = self.now_ms.max(until_ms);
    }
}

impl<T> Default for Timeline<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(timeline: &mut Timeline<&'static str>, advance: u64) -> Vec<&'static str> {
        let until = timeline.now_ms() + advance;
        let mut fired = Vec::new();
        while let Some(task) = timeline.pop_due(until) {
            fired.push(task);
        }
        timeline.settle(until);
        fired
    }

    #[test]
    fn fires_in_due_order_then_scheduling_order() {
        let mut timeline = Timeline::new();
        timeline.schedule(200, "late");
        timeline.schedule(100, "first");
        timeline.schedule(100, "second");
        assert_eq!(drain(&mut timeline, 99), Vec::<&str>::new());
        assert_eq!(drain(&mut timeline, 1), vec!["first", "second"]);
        assert_eq!(timeline.now_ms(), 100);
        assert_eq!(drain(&mut timeline, 500), vec!["late"]);
        assert!(timeline.is_idle());
    }

    #[test]
    fn chained_tasks_fire_in_one_pass() {
        let mut timeline = Timeline::new();
        timeline.schedule(300, "press");
        let until = 3000;
        let mut fired = Vec::new();
        while let Some(task) = timeline.pop_due(until) {
            fired.push(task);
            if task == "press" {
                timeline.schedule(100, "reveal");
            }
        }
        assert_eq!(fired, vec!["press", "reveal"]);
        assert_eq!(timeline.now_ms(), 400);
    }

    #[test]
    fn cancel_single_and_all() {
        let mut timeline = Timeline::new();
        let a = timeline.schedule(10, "a");
        timeline.schedule(20, "b");
        assert!(timeline.cancel(a));
        assert!(!timeline.cancel(a));
        assert_eq!(timeline.pending_len(), 1);
        assert_eq!(timeline.cancel_all(), 1);
        assert_eq!(drain(&mut timeline, 100), Vec::<&str>::new());
    }
}
