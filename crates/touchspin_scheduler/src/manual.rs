//! Virtual clock scheduler
//!
//! Time only moves when [`ManualScheduler::advance`] is called, which makes
//! spin sessions fully deterministic in tests.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use slotmap::SlotMap;

use crate::scheduler::{Scheduler, TimerCallback, TimerId};

struct PendingTimer {
    due: Duration,
    /// Insertion order, breaks ties between timers due at the same instant
    seq: u64,
    callback: TimerCallback,
}

#[derive(Default)]
struct ManualInner {
    now: Duration,
    next_seq: u64,
    timers: SlotMap<TimerId, PendingTimer>,
}

/// Scheduler driven by an explicit virtual clock
///
/// Cloning yields another handle to the same clock.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    inner: Arc<Mutex<ManualInner>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ManualInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current virtual time since creation
    pub fn now(&self) -> Duration {
        self.lock().now
    }

    /// Number of timers waiting to fire
    pub fn pending(&self) -> usize {
        self.lock().timers.len()
    }

    /// Move the clock forward by `by`, firing every timer that comes due
    ///
    /// Timers fire in due order, ties in scheduling order. The clock is set
    /// to each timer's due time before its callback runs, and callbacks run
    /// without the scheduler lock held, so they may schedule or cancel
    /// timers. Timers scheduled during the advance that fall inside the
    /// window fire too.
    ///
    /// Returns the number of timers fired.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.lock().now + by;
        let mut fired = 0;

        loop {
            let callback = {
                let mut inner = self.lock();
                let next = inner
                    .timers
                    .iter()
                    .filter(|(_, timer)| timer.due <= target)
                    .min_by_key(|(_, timer)| (timer.due, timer.seq))
                    .map(|(id, _)| id);

                let Some(id) = next else {
                    inner.now = target;
                    break;
                };
                let Some(timer) = inner.timers.remove(id) else {
                    break;
                };
                inner.now = timer.due;
                timer.callback
            };

            tracing::trace!(now = ?self.now(), "manual timer fired");
            callback();
            fired += 1;
        }

        fired
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerId {
        let mut inner = self.lock();
        let due = inner.now + delay;
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.timers.insert(PendingTimer { due, seq, callback })
    }

    fn cancel(&self, id: TimerId) -> bool {
        self.lock().timers.remove(id).is_some()
    }
}

impl std::fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("ManualScheduler")
            .field("now", &inner.now)
            .field("pending", &inner.timers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::SchedulerExt;

    fn ms(ms: u64) -> Duration {
        Duration::from_millis(ms)
    }

    #[test]
    fn test_fires_in_due_order() {
        let scheduler = ManualScheduler::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        for (delay, name) in [(30, "c"), (10, "a"), (20, "b"), (10, "a2")] {
            let log = log.clone();
            scheduler.schedule_fn(ms(delay), move || log.lock().unwrap().push(name));
        }

        assert_eq!(scheduler.advance(ms(15)), 2);
        assert_eq!(*log.lock().unwrap(), vec!["a", "a2"]);
        assert_eq!(scheduler.now(), ms(15));

        assert_eq!(scheduler.advance(ms(100)), 2);
        assert_eq!(*log.lock().unwrap(), vec!["a", "a2", "b", "c"]);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_cancel() {
        let scheduler = ManualScheduler::new();
        let fired = Arc::new(Mutex::new(false));
        let flag = fired.clone();
        let id = scheduler.schedule_fn(ms(10), move || *flag.lock().unwrap() = true);

        assert!(scheduler.cancel(id));
        assert!(!scheduler.cancel(id));
        assert_eq!(scheduler.advance(ms(50)), 0);
        assert!(!*fired.lock().unwrap());
    }

    #[test]
    fn test_rearming_callback_fires_within_window() {
        fn arm(scheduler: ManualScheduler, count: Arc<Mutex<u32>>) {
            let next = scheduler.clone();
            scheduler.schedule_fn(ms(10), move || {
                *count.lock().unwrap() += 1;
                arm(next, count);
            });
        }

        let scheduler = ManualScheduler::new();
        let count = Arc::new(Mutex::new(0));
        arm(scheduler.clone(), count.clone());

        assert_eq!(scheduler.advance(ms(35)), 3);
        assert_eq!(*count.lock().unwrap(), 3);
        assert_eq!(scheduler.pending(), 1);
    }

    #[test]
    fn test_clock_observed_inside_callback() {
        let scheduler = ManualScheduler::new();
        let seen = Arc::new(Mutex::new(None));
        let probe = scheduler.clone();
        let sink = seen.clone();
        scheduler.schedule_fn(ms(25), move || *sink.lock().unwrap() = Some(probe.now()));

        scheduler.advance(ms(40));
        assert_eq!(*seen.lock().unwrap(), Some(ms(25)));
        assert_eq!(scheduler.now(), ms(40));
    }
}
