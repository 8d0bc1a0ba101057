//! `data-bts-*` markup configuration
//!
//! Markup can configure a spinner without script:
//!
//! ```html
//! <input data-bts-min="-10" data-bts-step="0.5" data-bts-decimals="1">
//! ```
//!
//! Attribute values are always text and go through the same lenient
//! coercion as JSON options.

use crate::config::RawSetting;
use crate::settings::{PartialSettings, SettingKey};

/// Read every `data-bts-*` attribute through `lookup`
///
/// `lookup` returns the attribute value, or `None` when the attribute is
/// absent. Absent attributes leave the corresponding setting unsupplied.
pub fn parse_data_attributes<F>(lookup: F) -> PartialSettings
where
    F: Fn(&str) -> Option<String>,
{
    let mut partial = PartialSettings::new();
    for key in SettingKey::ALL {
        let Some(attribute) = key.data_attribute() else {
            continue;
        };
        if let Some(value) = lookup(attribute) {
            tracing::debug!(attribute, value = %value, "data attribute setting");
            partial.apply_raw(key, RawSetting::Text(&value));
        }
    }
    partial
}
