use crate::scheduler::{Scheduler, TimerHandle};
use std::time::Duration;

/// Progress updates run at roughly 60Hz
pub const PROGRESS_TICK: Duration = Duration::from_millis(16);

/// The two timing facilities of one round: a single-shot expiry and a
/// repeating progress ticker. Both must be cancelled whenever the round ends.
#[derive(Debug, Clone)]
pub struct RoundTimer {
    duration: Duration,
    started_at: Duration,
    expiry: Option<TimerHandle>,
    progress: Option<TimerHandle>,
}

impl RoundTimer {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            started_at: Duration::ZERO,
            expiry: None,
            progress: None,
        }
    }

    /// Arm both facilities. Any previous arming is cancelled first.
    pub fn arm<E>(&mut self, scheduler: &mut Scheduler<E>, on_progress: E, on_expiry: E) {
        self.cancel(scheduler);
        self.started_at = scheduler.now();
        self.progress = Some(scheduler.every(PROGRESS_TICK, on_progress));
        self.expiry = Some(scheduler.once(self.duration, on_expiry));
    }

    pub fn cancel<E>(&mut self, scheduler: &mut Scheduler<E>) {
        scheduler.cancel_slot(&mut self.expiry);
        scheduler.cancel_slot(&mut self.progress);
    }

    /// Stop only the progress ticker, leaving expiry armed
    pub fn stop_progress<E>(&mut self, scheduler: &mut Scheduler<E>) {
        scheduler.cancel_slot(&mut self.progress);
    }

    pub fn is_armed<E>(&self, scheduler: &Scheduler<E>) -> bool {
        self.expiry.is_some_and(|h| scheduler.is_pending(h))
    }

    pub fn progress_running<E>(&self, scheduler: &Scheduler<E>) -> bool {
        self.progress.is_some_and(|h| scheduler.is_pending(h))
    }

    pub fn remaining(&self, now: Duration) -> Duration {
        self.duration
            .saturating_sub(now.saturating_sub(self.started_at))
    }

    /// Fraction of the round still left, in [0.0, 1.0]
    pub fn remaining_fraction(&self, now: Duration) -> f64 {
        if self.duration.is_zero() {
            return 0.0;
        }
        (self.remaining(now).as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }
}
