//! Lenient configuration input
//!
//! Settings arrive as loosely typed values: JSON option objects, `data-bts-*`
//! attribute strings, native attribute strings. This module coerces them into
//! a [`PartialSettings`] without ever rejecting a value. Anything that cannot
//! be interpreted becomes an invalid number (NaN) or an unset bound, which the
//! sanitizer then resolves to a default.

use serde_json::Value;

use crate::error::Result;
use crate::format::parse_float;
use crate::settings::{PartialSettings, SettingKey, StepDivisibility};

/// A loosely typed setting value
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RawSetting<'a> {
    Null,
    Bool(bool),
    Number(f64),
    Text(&'a str),
}

impl<'a> RawSetting<'a> {
    /// Coerce to a number; unparseable input becomes NaN
    fn number(&self) -> f64 {
        match self {
            RawSetting::Number(n) => *n,
            RawSetting::Text(text) => parse_float(text).unwrap_or(f64::NAN),
            RawSetting::Null | RawSetting::Bool(_) => f64::NAN,
        }
    }

    /// Coerce to a nullable number; `null`, `false` and empty text unset it
    fn nullable_number(&self) -> Option<f64> {
        match self {
            RawSetting::Null | RawSetting::Bool(false) => None,
            RawSetting::Text(text) if text.trim().is_empty() => None,
            other => Some(other.number()),
        }
    }

    /// Coerce to a flag; `None` when the value is not recognizably boolean
    fn flag(&self) -> Option<bool> {
        match self {
            RawSetting::Bool(b) => Some(*b),
            RawSetting::Number(n) => Some(*n != 0.0),
            RawSetting::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
                // A bare attribute (`data-bts-booster`) reads as an empty string
                "" | "true" | "1" | "yes" | "on" => Some(true),
                "false" | "0" | "no" | "off" => Some(false),
                _ => None,
            },
            RawSetting::Null => None,
        }
    }

    /// Coerce to text; `None` for `null`
    fn text(&self) -> Option<String> {
        match self {
            RawSetting::Text(text) => Some((*text).to_string()),
            RawSetting::Number(n) => Some(n.to_string()),
            RawSetting::Bool(b) => Some(b.to_string()),
            RawSetting::Null => None,
        }
    }
}

impl PartialSettings {
    /// Set `key` from a loosely typed value
    ///
    /// Callback keys cannot be expressed as raw values and are ignored.
    pub fn apply_raw(&mut self, key: SettingKey, raw: RawSetting<'_>) {
        match key {
            SettingKey::Min => self.min = Some(raw.nullable_number()),
            SettingKey::Max => self.max = Some(raw.nullable_number()),
            SettingKey::MaxBoostedStep => self.max_boosted_step = Some(raw.nullable_number()),
            SettingKey::FirstClickValueIfEmpty => {
                self.first_click_value_if_empty = Some(raw.nullable_number())
            }
            SettingKey::Step => self.step = Some(raw.number()),
            SettingKey::Decimals => self.decimals = Some(raw.number()),
            SettingKey::StepInterval => self.step_interval = Some(raw.number()),
            SettingKey::StepIntervalDelay => self.step_interval_delay = Some(raw.number()),
            SettingKey::BoostAt => self.boost_at = Some(raw.number()),
            SettingKey::ForceStepDivisibility => {
                let policy = match raw {
                    RawSetting::Text(text) => text.parse().unwrap_or_else(|_| {
                        tracing::debug!(value = text, "unknown forcestepdivisibility, using default");
                        StepDivisibility::default()
                    }),
                    _ => StepDivisibility::default(),
                };
                self.force_step_divisibility = Some(policy);
            }
            SettingKey::Booster
            | SettingKey::Mousewheel
            | SettingKey::VerticalButtons
            | SettingKey::FocusableButtons => {
                let Some(flag) = raw.flag() else {
                    tracing::debug!(key = key.name(), ?raw, "ignoring non-boolean flag");
                    return;
                };
                match key {
                    SettingKey::Booster => self.booster = Some(flag),
                    SettingKey::Mousewheel => self.mousewheel = Some(flag),
                    SettingKey::VerticalButtons => self.vertical_buttons = Some(flag),
                    _ => self.focusable_buttons = Some(flag),
                }
            }
            SettingKey::CallbackBeforeCalculation | SettingKey::CallbackAfterCalculation => {
                tracing::debug!(key = key.name(), "callbacks cannot be set from raw values");
            }
            _ => {
                let Some(text) = raw.text() else {
                    return;
                };
                let slot = match key {
                    SettingKey::Prefix => &mut self.prefix,
                    SettingKey::Postfix => &mut self.postfix,
                    SettingKey::InitVal => &mut self.init_val,
                    SettingKey::ReplacementVal => &mut self.replacement_val,
                    SettingKey::VerticalUp => &mut self.vertical_up,
                    SettingKey::VerticalDown => &mut self.vertical_down,
                    SettingKey::VerticalUpClass => &mut self.vertical_up_class,
                    SettingKey::VerticalDownClass => &mut self.vertical_down_class,
                    SettingKey::ButtonUpClass => &mut self.button_up_class,
                    SettingKey::ButtonDownClass => &mut self.button_down_class,
                    SettingKey::ButtonUpTxt => &mut self.button_up_txt,
                    SettingKey::ButtonDownTxt => &mut self.button_down_txt,
                    SettingKey::PrefixExtraClass => &mut self.prefix_extra_class,
                    _ => &mut self.postfix_extra_class,
                };
                *slot = Some(text);
            }
        }
    }

    /// Build an overlay from a JSON option object
    ///
    /// `null`, `{}` and non-object documents produce an empty overlay.
    /// Unknown keys and nested values are ignored.
    pub fn from_json(value: &Value) -> Self {
        let mut partial = PartialSettings::default();
        let Value::Object(map) = value else {
            return partial;
        };

        for (name, value) in map {
            let Ok(key) = name.parse::<SettingKey>() else {
                tracing::debug!(option = %name, "ignoring unknown option");
                continue;
            };
            let raw = match value {
                Value::Null => RawSetting::Null,
                Value::Bool(b) => RawSetting::Bool(*b),
                Value::Number(n) => RawSetting::Number(n.as_f64().unwrap_or(f64::NAN)),
                Value::String(s) => RawSetting::Text(s),
                Value::Array(_) | Value::Object(_) => {
                    tracing::debug!(option = %name, "ignoring structured option value");
                    continue;
                }
            };
            partial.apply_raw(key, raw);
        }
        partial
    }

    /// Parse a JSON option document
    ///
    /// Fails only when `json` is not valid JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Ok(Self::from_json(&value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sanitize::sanitize;
    use crate::settings::Settings;
    use serde_json::json;

    #[test]
    fn test_from_json_coerces_values() {
        let partial = PartialSettings::from_json(&json!({
            "min": "-10",
            "max": null,
            "step": "0.5",
            "decimals": 1,
            "forcestepdivisibility": "floor",
            "booster": "false",
            "prefix": "$",
            "boostat": 5,
        }));

        assert_eq!(partial.min, Some(Some(-10.0)));
        assert_eq!(partial.max, Some(None));
        assert_eq!(partial.step, Some(0.5));
        assert_eq!(partial.decimals, Some(1.0));
        assert_eq!(partial.force_step_divisibility, Some(StepDivisibility::Floor));
        assert_eq!(partial.booster, Some(false));
        assert_eq!(partial.prefix.as_deref(), Some("$"));
        assert_eq!(partial.boost_at, Some(5.0));
    }

    #[test]
    fn test_from_json_invalid_values_resolved_by_sanitizer() {
        let partial = PartialSettings::from_json(&json!({
            "step": "abc",
            "min": "abc",
            "stepinterval": -1,
            "forcestepdivisibility": "sideways",
        }));
        let settings = sanitize(&partial, &Settings::default());

        assert_eq!(settings.step, 1.0);
        assert_eq!(settings.min, None);
        assert_eq!(settings.step_interval, 100);
        assert_eq!(settings.force_step_divisibility, StepDivisibility::Round);
    }

    #[test]
    fn test_from_json_noop_documents() {
        assert!(PartialSettings::from_json(&Value::Null).is_empty());
        assert!(PartialSettings::from_json(&json!({})).is_empty());
        assert!(PartialSettings::from_json(&json!([1, 2])).is_empty());
        assert!(PartialSettings::from_json(&json!({ "colour": "red" })).is_empty());
    }

    #[test]
    fn test_from_json_str() {
        let partial = PartialSettings::from_json_str(r#"{ "maxboostedstep": false }"#).unwrap();
        assert_eq!(partial.max_boosted_step, Some(None));
        assert!(PartialSettings::from_json_str("{ nope").is_err());
    }

    #[test]
    fn test_apply_raw_flags() {
        let mut partial = PartialSettings::new();
        partial.apply_raw(SettingKey::VerticalButtons, RawSetting::Text(""));
        partial.apply_raw(SettingKey::Mousewheel, RawSetting::Text("maybe"));
        assert_eq!(partial.vertical_buttons, Some(true));
        assert_eq!(partial.mousewheel, None);
    }
}
