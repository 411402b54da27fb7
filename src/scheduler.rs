use std::time::Duration;

/// Reference to an armed task. Cancelling a handle that already fired or was
/// cancelled is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone)]
struct Task<E> {
    id: u64,
    due: Duration,
    period: Option<Duration>,
    event: E,
}

/// Single-threaded task queue on a virtual clock.
///
/// Nothing fires on its own: the owner calls [`Scheduler::pop_due`] with the
/// current time and dispatches what comes back. Tasks fire in due order, ties
/// broken by arming order. The clock is moved to each task's due time as it
/// fires so that work armed from a callback is relative to that instant.
#[derive(Debug, Clone)]
pub struct Scheduler<E> {
    now: Duration,
    next_id: u64,
    tasks: Vec<Task<E>>,
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Scheduler<E> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            tasks: Vec::new(),
        }
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    /// Arm a single-shot task firing `delay` from now
    pub fn once(&mut self, delay: Duration, event: E) -> TimerHandle {
        self.arm(delay, None, event)
    }

    /// Arm a repeating task firing every `period`, first after one period
    pub fn every(&mut self, period: Duration, event: E) -> TimerHandle {
        debug_assert!(!period.is_zero(), "repeating task needs a non-zero period");
        self.arm(period, Some(period.max(Duration::from_millis(1))), event)
    }

    fn arm(&mut self, delay: Duration, period: Option<Duration>, event: E) -> TimerHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.tasks.push(Task {
            id,
            due: self.now + delay,
            period,
            event,
        });
        TimerHandle(id)
    }

    /// Returns true when the task was still pending
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != handle.0);
        self.tasks.len() != before
    }

    /// Cancel and forget whatever handle `slot` holds
    pub fn cancel_slot(&mut self, slot: &mut Option<TimerHandle>) {
        if let Some(handle) = slot.take() {
            self.cancel(handle);
        }
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.tasks.iter().any(|t| t.id == handle.0)
    }

    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.tasks.iter().map(|t| t.due).min()
    }

    /// Move the clock forward without firing anything. Never moves backwards.
    pub fn settle(&mut self, until: Duration) {
        if until > self.now {
            self.now = until;
        }
    }
}

impl<E: Clone> Scheduler<E> {
    /// Take the earliest task due at or before `until`, re-arming it if it repeats
    pub fn pop_due(&mut self, until: Duration) -> Option<(TimerHandle, E)> {
        let idx = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= until)
            .min_by_key(|(_, t)| (t.due, t.id))
            .map(|(i, _)| i)?;

        let due = self.tasks[idx].due;
        if due > self.now {
            self.now = due;
        }

        let handle = TimerHandle(self.tasks[idx].id);
        match self.tasks[idx].period {
            Some(period) => {
                let task = &mut self.tasks[idx];
                task.due += period;
                Some((handle, task.event.clone()))
            }
            None => {
                let task = self.tasks.swap_remove(idx);
                Some((handle, task.event))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn drain(s: &mut Scheduler<&'static str>, until: Duration) -> Vec<(Duration, &'static str)> {
        let mut fired = Vec::new();
        while let Some((_, ev)) = s.pop_due(until) {
            fired.push((s.now(), ev));
        }
        s.settle(until);
        fired
    }

    #[test]
    fn once_fires_exactly_once() {
        let mut s = Scheduler::new();
        s.once(ms(100), "a");

        assert!(drain(&mut s, ms(99)).is_empty());
        assert_eq!(drain(&mut s, ms(100)), vec![(ms(100), "a")]);
        assert!(drain(&mut s, ms(1_000)).is_empty());
        assert_eq!(s.pending(), 0);
    }

    #[test]
    fn every_rearms_from_due_time() {
        let mut s = Scheduler::new();
        s.every(ms(30), "tick");

        let fired = drain(&mut s, ms(100));
        assert_eq!(
            fired,
            vec![(ms(30), "tick"), (ms(60), "tick"), (ms(90), "tick")]
        );
        assert_eq!(s.now(), ms(100));
        assert_eq!(s.next_due(), Some(ms(120)));
    }

    #[test]
    fn tasks_fire_in_due_then_arming_order() {
        let mut s = Scheduler::new();
        s.once(ms(50), "late");
        s.once(ms(10), "first");
        s.once(ms(50), "late-second");

        let fired: Vec<_> = drain(&mut s, ms(50)).into_iter().map(|(_, e)| e).collect();
        assert_eq!(fired, vec!["first", "late", "late-second"]);
    }

    #[test]
    fn cancel_prevents_firing() {
        let mut s = Scheduler::new();
        let h = s.once(ms(10), "x");
        assert!(s.is_pending(h));
        assert!(s.cancel(h));
        assert!(!s.is_pending(h));
        assert!(drain(&mut s, ms(20)).is_empty());
    }

    #[test]
    fn cancel_is_idempotent() {
        let mut s = Scheduler::new();
        let h = s.every(ms(10), "x");
        assert!(s.cancel(h));
        assert!(!s.cancel(h));
        assert!(!s.cancel(h));

        let fired = s.once(ms(1), "y");
        drain(&mut s, ms(5));
        assert!(!s.cancel(fired));
    }

    #[test]
    fn cancel_slot_clears_handle() {
        let mut s = Scheduler::new();
        let mut slot = Some(s.once(ms(10), "x"));
        s.cancel_slot(&mut slot);
        assert!(slot.is_none());
        s.cancel_slot(&mut slot);
        assert_eq!(s.pending(), 0);
    }

    #[test]
    fn settle_never_rewinds() {
        let mut s: Scheduler<()> = Scheduler::new();
        s.settle(ms(500));
        s.settle(ms(100));
        assert_eq!(s.now(), ms(500));
    }

    #[test]
    fn tasks_armed_later_are_relative_to_now() {
        let mut s = Scheduler::new();
        s.settle(ms(1_000));
        s.once(ms(250), "x");
        assert_eq!(s.next_due(), Some(ms(1_250)));
    }
}
