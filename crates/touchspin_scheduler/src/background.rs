//! Real-time scheduler
//!
//! Runs timers on a dedicated background thread for hosts that have no event
//! loop of their own. Timers are checked at a fixed resolution, so a timer
//! fires at most one resolution period late.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use slotmap::SlotMap;

use crate::scheduler::{Scheduler, SharedScheduler, TimerCallback, TimerId};

/// Default polling resolution of the background thread
pub const DEFAULT_RESOLUTION: Duration = Duration::from_millis(5);

/// Process-wide scheduler for engines built without one
static SHARED_BACKGROUND: OnceLock<SharedScheduler> = OnceLock::new();

/// The process-wide background scheduler, started on first use
pub fn shared_background() -> SharedScheduler {
    SHARED_BACKGROUND
        .get_or_init(|| {
            let mut scheduler = BackgroundScheduler::new();
            scheduler.start_background();
            Arc::new(scheduler)
        })
        .clone()
}

struct PendingTimer {
    due: Instant,
    seq: u64,
    callback: TimerCallback,
}

#[derive(Default)]
struct BackgroundInner {
    next_seq: u64,
    timers: SlotMap<TimerId, PendingTimer>,
}

fn lock(inner: &Mutex<BackgroundInner>) -> MutexGuard<'_, BackgroundInner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Take the earliest timer that is due at `now`
fn take_due(inner: &Mutex<BackgroundInner>, now: Instant) -> Option<TimerCallback> {
    let mut inner = lock(inner);
    let id = inner
        .timers
        .iter()
        .filter(|(_, timer)| timer.due <= now)
        .min_by_key(|(_, timer)| (timer.due, timer.seq))
        .map(|(id, _)| id)?;
    inner.timers.remove(id).map(|timer| timer.callback)
}

/// Scheduler backed by a background timer thread
///
/// Timers can be scheduled before the thread is started; they fire once
/// [`start_background`](Self::start_background) has been called.
///
/// ```ignore
/// let mut scheduler = BackgroundScheduler::new();
/// scheduler.start_background();
/// let scheduler: SharedScheduler = Arc::new(scheduler);
/// ```
pub struct BackgroundScheduler {
    inner: Arc<Mutex<BackgroundInner>>,
    /// Stop signal for the background thread
    stop_flag: Arc<AtomicBool>,
    thread_handle: Option<JoinHandle<()>>,
    resolution: Duration,
}

impl BackgroundScheduler {
    pub fn new() -> Self {
        Self::with_resolution(DEFAULT_RESOLUTION)
    }

    /// Create a scheduler polling at `resolution`
    pub fn with_resolution(resolution: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(BackgroundInner::default())),
            stop_flag: Arc::new(AtomicBool::new(false)),
            thread_handle: None,
            resolution: resolution.max(Duration::from_millis(1)),
        }
    }

    /// Start firing timers on a background thread
    pub fn start_background(&mut self) {
        if self.thread_handle.is_some() {
            return; // Already running
        }

        let inner = Arc::clone(&self.inner);
        let stop_flag = Arc::clone(&self.stop_flag);
        let resolution = self.resolution;

        tracing::debug!(?resolution, "starting timer thread");
        self.thread_handle = Some(thread::spawn(move || {
            while !stop_flag.load(Ordering::Relaxed) {
                let start = Instant::now();

                // Callbacks run without the lock so they can re-arm
                while let Some(callback) = take_due(&inner, Instant::now()) {
                    tracing::trace!("background timer fired");
                    callback();
                    if stop_flag.load(Ordering::Relaxed) {
                        return;
                    }
                }

                let elapsed = start.elapsed();
                if elapsed < resolution {
                    thread::sleep(resolution - elapsed);
                }
            }
        }));
    }

    /// Stop the background thread; pending timers are kept
    pub fn stop_background(&mut self) {
        self.stop_flag.store(true, Ordering::Relaxed);
        let Some(handle) = self.thread_handle.take() else {
            self.stop_flag.store(false, Ordering::Relaxed);
            return;
        };
        // Dropped from inside a timer callback: the thread exits on its own
        if handle.thread().id() == thread::current().id() {
            return;
        }
        let _ = handle.join();
        tracing::debug!("timer thread stopped");
        self.stop_flag.store(false, Ordering::Relaxed);
    }

    /// Check if the background thread is running
    pub fn is_background_running(&self) -> bool {
        self.thread_handle.is_some()
    }

    /// Number of timers waiting to fire
    pub fn pending(&self) -> usize {
        lock(&self.inner).timers.len()
    }
}

impl Default for BackgroundScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for BackgroundScheduler {
    fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerId {
        let mut inner = lock(&self.inner);
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.timers.insert(PendingTimer {
            due: Instant::now() + delay,
            seq,
            callback,
        })
    }

    fn cancel(&self, id: TimerId) -> bool {
        lock(&self.inner).timers.remove(id).is_some()
    }
}

impl Drop for BackgroundScheduler {
    fn drop(&mut self) {
        self.stop_background();
    }
}
