//! TouchSpin Core
//!
//! Pure building blocks of the numeric spinner input:
//!
//! - **Settings**: complete and sparse configuration records
//! - **Sanitization**: per-field validation with default fallback, bound
//!   swapping and step alignment of bounds
//! - **Step Arithmetic**: float-safe alignment and step divisibility
//! - **Formatting**: value/text conversion with decimals, decoration and
//!   user transform callbacks
//! - **Events**: the framework-agnostic event contract and listener registry
//! - **Configuration Input**: lenient JSON options and `data-bts-*` attributes
//!
//! # Example
//!
//! ```rust
//! use touchspin_core::{sanitize, PartialSettings, Settings, ValueFormatter};
//!
//! let settings = sanitize(
//!     &PartialSettings::new().min(7.0).max(23.0).step(5.0).decimals(1),
//!     &Settings::default(),
//! );
//! assert_eq!(settings.min, Some(10.0));
//! assert_eq!(settings.max, Some(20.0));
//!
//! let formatter = ValueFormatter::new(&settings);
//! assert_eq!(formatter.format(15.0), "15.0");
//! ```

pub mod config;
pub mod data_attributes;
pub mod error;
pub mod events;
pub mod format;
pub mod sanitize;
pub mod settings;
pub mod step;

pub use config::RawSetting;
pub use data_attributes::parse_data_attributes;
pub use error::{Result, SettingsError};
pub use events::{EventCallback, EventDispatcher, ListenerId, SpinEvent, SpinEventData};
pub use format::{parse_float, ValueFormatter};
pub use sanitize::sanitize;
pub use settings::{
    PartialSettings, SettingKey, Settings, StepDivisibility, ValueCallback, DEFAULT_BOOST_AT,
    DEFAULT_DECIMALS, DEFAULT_MAX, DEFAULT_MIN, DEFAULT_STEP, DEFAULT_STEP_INTERVAL,
    DEFAULT_STEP_INTERVAL_DELAY, MAX_DECIMALS,
};
pub use step::{
    align_to_step, decimal_places, force_step_divisibility, round_to_decimals, to_fixed,
    Direction,
};
