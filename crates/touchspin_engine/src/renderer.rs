//! Renderer contract
//!
//! A renderer owns the markup around the host input (button group, prefix
//! and postfix addons, vertical buttons). The engine calls its hooks at
//! build time and whenever decoration or disabled state changes; the
//! renderer calls back into the engine through the [`WeakSpinEngine`] it is
//! given, usually via the interaction methods (`press`, `release`, ...).

use std::sync::Arc;

use touchspin_core::{PartialSettings, Settings};

use crate::engine::WeakSpinEngine;
use crate::error::RenderError;
use crate::host::HostInput;

/// What a renderer gets to build with
pub struct RenderContext<'a> {
    pub settings: &'a Settings,
    pub host: &'a dyn HostInput,
    /// Handle for wiring user interaction back to the engine
    pub engine: WeakSpinEngine,
}

/// Markup builder for one CSS framework
pub trait Renderer: Send + Sync {
    /// Renderer name used in error messages
    fn name(&self) -> &str;

    /// Framework defaults, applied below every user-supplied source
    fn default_settings(&self) -> PartialSettings {
        PartialSettings::new()
    }

    /// Build the horizontal input group
    fn build_input_group(&self, ctx: &RenderContext<'_>) -> Result<(), RenderError>;

    /// Build the vertical button layout
    ///
    /// Required when `verticalbuttons` is enabled.
    fn build_vertical_buttons(&self, _ctx: &RenderContext<'_>) -> Result<(), RenderError> {
        Err(RenderError::MissingHook("build_vertical_buttons"))
    }

    /// Refresh the prefix/postfix addons
    fn update_prefix_postfix(&self, settings: &Settings);

    /// Reflect the host's disabled/readonly state on the buttons
    fn set_disabled(&self, _disabled: bool) {}

    /// Remove all generated markup
    fn teardown(&self);
}

/// Shared renderer handle
pub type SharedRenderer = Arc<dyn Renderer>;
