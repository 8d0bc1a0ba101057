//! Shared default settings
//!
//! Hosts that configure many spinners the same way inject a
//! [`DefaultsProvider`] at construction instead of mutating global state.
//! Provider defaults sit above renderer defaults and below anything the
//! page or the caller supplies.

use std::sync::Arc;

use touchspin_core::PartialSettings;

/// Source of shared default settings
pub trait DefaultsProvider: Send + Sync {
    fn default_settings(&self) -> PartialSettings;
}

/// Shared provider handle
pub type SharedDefaults = Arc<dyn DefaultsProvider>;

/// Fixed set of defaults
#[derive(Clone, Debug, Default)]
pub struct StaticDefaults {
    defaults: PartialSettings,
}

impl StaticDefaults {
    pub fn new(defaults: PartialSettings) -> Self {
        Self { defaults }
    }

    pub fn shared(self) -> SharedDefaults {
        Arc::new(self)
    }
}

impl DefaultsProvider for StaticDefaults {
    fn default_settings(&self) -> PartialSettings {
        self.defaults.clone()
    }
}

impl<F> DefaultsProvider for F
where
    F: Fn() -> PartialSettings + Send + Sync,
{
    fn default_settings(&self) -> PartialSettings {
        self()
    }
}
