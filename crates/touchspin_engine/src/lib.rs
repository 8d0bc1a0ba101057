//! TouchSpin Engine
//!
//! The stateful half of the spinner input:
//!
//! - **SpinEngine**: owns settings and keeps the host text consistent,
//!   exposes step/set/spin/update/destroy operations, emits events
//! - **Spin State Machine**: press-and-hold sessions with booster
//!   acceleration, driven by an injectable scheduler
//! - **Attribute Bridge**: two-way sync with native `min`/`max`/`step`
//!   and reaction to `disabled`/`readonly`
//! - **Ports**: host input, renderer, defaults provider
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use touchspin_engine::prelude::*;
//!
//! let input = MemoryInput::number().with_value("50").shared();
//! let engine = SpinEngine::builder(input.clone())
//!     .settings(PartialSettings::new().min(0.0).max(100.0))
//!     .scheduler(Arc::new(ManualScheduler::new()))
//!     .build()
//!     .unwrap();
//!
//! engine.up_once();
//! assert_eq!(engine.value(), Some(51.0));
//! assert_eq!(input.value(), "51");
//! ```

pub mod bridge;
pub mod defaults;
pub mod engine;
pub mod error;
pub mod host;
pub mod interaction;
pub mod renderer;
pub mod spin;

pub use bridge::{
    AttributeBridge, AttributeCallback, AttributeObserver, AttributeWriter, NativeAttribute,
    SubscriptionId,
};
pub use defaults::{DefaultsProvider, SharedDefaults, StaticDefaults};
pub use engine::{ObserverId, SettingsCallback, SpinEngine, SpinEngineBuilder, WeakSpinEngine};
pub use error::{EngineError, RenderError, Result};
pub use host::{HostInput, MemoryInput};
pub use interaction::Key;
pub use renderer::{RenderContext, Renderer, SharedRenderer};
pub use spin::{boosted_step, BoostedStep, SpinInput, SpinSession, SpinState};

/// Everything needed to build and drive an engine
pub mod prelude {
    pub use crate::bridge::{AttributeObserver, AttributeWriter, NativeAttribute};
    pub use crate::defaults::{DefaultsProvider, StaticDefaults};
    pub use crate::engine::{SpinEngine, WeakSpinEngine};
    pub use crate::error::{EngineError, RenderError};
    pub use crate::host::{HostInput, MemoryInput};
    pub use crate::interaction::Key;
    pub use crate::renderer::{RenderContext, Renderer};
    pub use crate::spin::SpinState;
    pub use touchspin_core::{
        Direction, PartialSettings, Settings, SpinEvent, SpinEventData, StepDivisibility,
    };
    pub use touchspin_scheduler::{BackgroundScheduler, ManualScheduler, SharedScheduler};
}
