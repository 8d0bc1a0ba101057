//! TouchSpin Scheduler
//!
//! The clock abstraction behind continuous spinning. The engine only ever
//! asks for "run this once after a delay" and "cancel that", so the same
//! spin logic runs against:
//!
//! - [`ManualScheduler`]: a virtual clock advanced explicitly (tests, hosts
//!   that drive time themselves)
//! - [`BackgroundScheduler`]: real timers on a background thread

pub mod background;
pub mod manual;
pub mod scheduler;

pub use background::{shared_background, BackgroundScheduler, DEFAULT_RESOLUTION};
pub use manual::ManualScheduler;
pub use scheduler::{Scheduler, SchedulerExt, SharedScheduler, TimerCallback, TimerId};
