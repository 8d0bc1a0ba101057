//! Scheduler port
//!
//! A scheduler runs a callback once after a delay and lets the caller cancel
//! it before it fires. Repeating timers are built by re-arming from inside
//! the callback.

use std::sync::Arc;
use std::time::Duration;

use slotmap::new_key_type;

new_key_type! {
    /// Handle to a scheduled timer
    pub struct TimerId;
}

/// Callback run when a timer fires
pub type TimerCallback = Box<dyn FnOnce() + Send + 'static>;

/// Cancelable one-shot timers
pub trait Scheduler: Send + Sync {
    /// Run `callback` once after `delay`
    fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerId;

    /// Cancel a pending timer
    ///
    /// Returns `false` when the timer already fired or was cancelled.
    /// Cancelling twice is a no-op.
    fn cancel(&self, id: TimerId) -> bool;
}

/// Shared scheduler handle
pub type SharedScheduler = Arc<dyn Scheduler>;

/// Convenience methods for boxing closures
pub trait SchedulerExt: Scheduler {
    /// Schedule a closure without boxing it first
    fn schedule_fn<F>(&self, delay: Duration, callback: F) -> TimerId
    where
        F: FnOnce() + Send + 'static,
    {
        self.schedule(delay, Box::new(callback))
    }
}

impl<S: Scheduler + ?Sized> SchedulerExt for S {}
