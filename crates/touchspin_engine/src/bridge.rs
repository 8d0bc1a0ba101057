//! Native attribute synchronization
//!
//! Two ports decouple the engine from DOM observation:
//!
//! - [`AttributeObserver`]: reports mutations of the host's native
//!   `min`/`max`/`step`/`disabled`/`readonly` attributes
//! - [`AttributeWriter`]: mirrors effective settings back onto the host
//!
//! [`AttributeBridge`] is the standard writer and also reads native
//! attributes into a settings overlay. It only ever writes to
//! `<input type="number">` elements and only writes attributes whose value
//! differs, so a write that is observed and fed back settles immediately.

use std::fmt;
use std::sync::Arc;

use slotmap::new_key_type;
use touchspin_core::{PartialSettings, RawSetting, SettingKey, Settings};

use crate::host::HostInput;

/// Native attributes the engine reacts to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NativeAttribute {
    Min,
    Max,
    Step,
    Disabled,
    Readonly,
}

impl NativeAttribute {
    pub const ALL: [NativeAttribute; 5] = [
        NativeAttribute::Min,
        NativeAttribute::Max,
        NativeAttribute::Step,
        NativeAttribute::Disabled,
        NativeAttribute::Readonly,
    ];

    /// HTML attribute name
    pub fn name(&self) -> &'static str {
        match self {
            NativeAttribute::Min => "min",
            NativeAttribute::Max => "max",
            NativeAttribute::Step => "step",
            NativeAttribute::Disabled => "disabled",
            NativeAttribute::Readonly => "readonly",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|attr| attr.name().eq_ignore_ascii_case(name))
    }

    /// Setting mirrored by this attribute; `None` for state attributes
    pub fn setting_key(&self) -> Option<SettingKey> {
        match self {
            NativeAttribute::Min => Some(SettingKey::Min),
            NativeAttribute::Max => Some(SettingKey::Max),
            NativeAttribute::Step => Some(SettingKey::Step),
            NativeAttribute::Disabled | NativeAttribute::Readonly => None,
        }
    }
}

impl fmt::Display for NativeAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

new_key_type! {
    /// Handle to an attribute subscription
    pub struct SubscriptionId;
}

/// Called with the attribute that changed
pub type AttributeCallback = Arc<dyn Fn(NativeAttribute) + Send + Sync>;

/// Source of native attribute mutations
pub trait AttributeObserver: Send + Sync {
    fn subscribe(&self, callback: AttributeCallback) -> SubscriptionId;

    fn unsubscribe(&self, id: SubscriptionId);
}

/// Sink for effective settings
pub trait AttributeWriter: Send + Sync {
    /// Mirror `settings` onto native attributes
    fn apply(&self, settings: &Settings);
}

/// Reads and writes native `min`/`max`/`step` on a host input
pub struct AttributeBridge {
    host: Arc<dyn HostInput>,
}

impl AttributeBridge {
    pub fn new(host: Arc<dyn HostInput>) -> Self {
        Self { host }
    }

    /// Overlay with every present native bound attribute
    ///
    /// Native attributes are read on any input type; absent attributes are
    /// not supplied.
    pub fn read_native(&self) -> PartialSettings {
        let mut partial = PartialSettings::new();
        for attribute in [NativeAttribute::Min, NativeAttribute::Max, NativeAttribute::Step] {
            let Some(key) = attribute.setting_key() else {
                continue;
            };
            if let Some(value) = self.host.attribute(attribute.name()) {
                partial.apply_raw(key, RawSetting::Text(&value));
            }
        }
        partial
    }

    /// Overlay for a single mutated attribute
    ///
    /// A removed `min`/`max` means unbounded; a removed `step` reverts to the
    /// default step. State attributes yield an empty overlay.
    pub fn read_attribute(&self, attribute: NativeAttribute) -> PartialSettings {
        let mut partial = PartialSettings::new();
        let Some(key) = attribute.setting_key() else {
            return partial;
        };
        match self.host.attribute(attribute.name()) {
            Some(value) => partial.apply_raw(key, RawSetting::Text(&value)),
            None => partial.apply_raw(key, RawSetting::Null),
        }
        partial
    }

    fn sync(&self, attribute: NativeAttribute, desired: Option<f64>) -> bool {
        let desired = desired.map(|value| value.to_string());
        let current = self.host.attribute(attribute.name());
        if current == desired {
            return false;
        }
        match desired {
            Some(value) => self.host.set_attribute(attribute.name(), &value),
            None => self.host.remove_attribute(attribute.name()),
        }
        true
    }
}

impl AttributeWriter for AttributeBridge {
    fn apply(&self, settings: &Settings) {
        if !self.host.is_number_input() {
            return;
        }
        let mut written = 0;
        written += usize::from(self.sync(NativeAttribute::Min, settings.min));
        written += usize::from(self.sync(NativeAttribute::Max, settings.max));
        written += usize::from(self.sync(NativeAttribute::Step, Some(settings.step)));
        if written > 0 {
            tracing::debug!(written, "mirrored settings to native attributes");
        }
    }
}

impl fmt::Debug for AttributeBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeBridge")
            .field("number_input", &self.host.is_number_input())
            .finish()
    }
}
