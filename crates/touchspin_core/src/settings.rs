//! Settings model
//!
//! Two shapes of configuration exist:
//!
//! - [`Settings`]: the complete, sanitized configuration owned by an engine.
//!   Every numeric field is finite and inside its valid domain.
//! - [`PartialSettings`]: a sparse overlay where every field is optional.
//!   This is what callers, data attributes, native attributes, renderers and
//!   default providers produce. It may contain invalid values (NaN, negative
//!   steps, ...) which [`crate::sanitize`] resolves field by field.
//!
//! Fields that accept `null` in the option object (`min`, `max`,
//! `maxboostedstep`, `firstclickvalueifempty`) are `Option<Option<f64>>` in the
//! partial form: `None` means "not supplied", `Some(None)` means "explicitly
//! unbounded/unset".

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::error::SettingsError;

/// Default step size
pub const DEFAULT_STEP: f64 = 1.0;
/// Default number of decimals
pub const DEFAULT_DECIMALS: u32 = 0;
/// Default repeat interval of a spin session (ms)
pub const DEFAULT_STEP_INTERVAL: u64 = 100;
/// Default delay before a spin session starts repeating (ms)
pub const DEFAULT_STEP_INTERVAL_DELAY: u64 = 500;
/// Default number of ticks per booster doubling
pub const DEFAULT_BOOST_AT: u32 = 10;
/// Default lower bound
pub const DEFAULT_MIN: f64 = 0.0;
/// Default upper bound
pub const DEFAULT_MAX: f64 = 100.0;
/// Largest number of decimals the formatter will produce
pub const MAX_DECIMALS: u32 = 20;

/// Policy for snapping a committed value onto a multiple of the step
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepDivisibility {
    /// Leave the value as typed
    None,
    /// Snap to the nearest multiple
    #[default]
    Round,
    /// Snap down to the previous multiple
    Floor,
    /// Snap up to the next multiple
    Ceil,
}

impl StepDivisibility {
    /// The option literal for this policy
    pub fn as_str(&self) -> &'static str {
        match self {
            StepDivisibility::None => "none",
            StepDivisibility::Round => "round",
            StepDivisibility::Floor => "floor",
            StepDivisibility::Ceil => "ceil",
        }
    }
}

impl FromStr for StepDivisibility {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(StepDivisibility::None),
            "round" => Ok(StepDivisibility::Round),
            "floor" => Ok(StepDivisibility::Floor),
            "ceil" => Ok(StepDivisibility::Ceil),
            _ => Err(SettingsError::UnknownDivisibility(s.to_string())),
        }
    }
}

impl fmt::Display for StepDivisibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User-supplied text transform
///
/// Used for `callback_before_calculation` (raw text -> parseable text) and
/// `callback_after_calculation` (fixed-point text -> display text).
/// Equality is identity: two callbacks are equal only if they share the same
/// allocation.
#[derive(Clone)]
pub struct ValueCallback(Arc<dyn Fn(&str) -> String + Send + Sync>);

impl ValueCallback {
    /// Wrap a text transform
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Apply the transform
    pub fn call(&self, text: &str) -> String {
        (self.0)(text)
    }
}

impl fmt::Debug for ValueCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ValueCallback(..)")
    }
}

impl PartialEq for ValueCallback {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Identifies one setting, by its option name and `data-bts-*` attribute
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SettingKey {
    Min,
    Max,
    Step,
    Decimals,
    ForceStepDivisibility,
    StepInterval,
    StepIntervalDelay,
    Booster,
    BoostAt,
    MaxBoostedStep,
    Mousewheel,
    FirstClickValueIfEmpty,
    Prefix,
    Postfix,
    InitVal,
    ReplacementVal,
    CallbackBeforeCalculation,
    CallbackAfterCalculation,
    VerticalButtons,
    VerticalUp,
    VerticalDown,
    VerticalUpClass,
    VerticalDownClass,
    ButtonUpClass,
    ButtonDownClass,
    ButtonUpTxt,
    ButtonDownTxt,
    PrefixExtraClass,
    PostfixExtraClass,
    FocusableButtons,
}

impl SettingKey {
    /// Every setting key, in declaration order
    pub const ALL: [SettingKey; 30] = [
        SettingKey::Min,
        SettingKey::Max,
        SettingKey::Step,
        SettingKey::Decimals,
        SettingKey::ForceStepDivisibility,
        SettingKey::StepInterval,
        SettingKey::StepIntervalDelay,
        SettingKey::Booster,
        SettingKey::BoostAt,
        SettingKey::MaxBoostedStep,
        SettingKey::Mousewheel,
        SettingKey::FirstClickValueIfEmpty,
        SettingKey::Prefix,
        SettingKey::Postfix,
        SettingKey::InitVal,
        SettingKey::ReplacementVal,
        SettingKey::CallbackBeforeCalculation,
        SettingKey::CallbackAfterCalculation,
        SettingKey::VerticalButtons,
        SettingKey::VerticalUp,
        SettingKey::VerticalDown,
        SettingKey::VerticalUpClass,
        SettingKey::VerticalDownClass,
        SettingKey::ButtonUpClass,
        SettingKey::ButtonDownClass,
        SettingKey::ButtonUpTxt,
        SettingKey::ButtonDownTxt,
        SettingKey::PrefixExtraClass,
        SettingKey::PostfixExtraClass,
        SettingKey::FocusableButtons,
    ];

    /// Option name, as used in the JS-style option object
    pub fn name(&self) -> &'static str {
        match self {
            SettingKey::Min => "min",
            SettingKey::Max => "max",
            SettingKey::Step => "step",
            SettingKey::Decimals => "decimals",
            SettingKey::ForceStepDivisibility => "forcestepdivisibility",
            SettingKey::StepInterval => "stepinterval",
            SettingKey::StepIntervalDelay => "stepintervaldelay",
            SettingKey::Booster => "booster",
            SettingKey::BoostAt => "boostat",
            SettingKey::MaxBoostedStep => "maxboostedstep",
            SettingKey::Mousewheel => "mousewheel",
            SettingKey::FirstClickValueIfEmpty => "firstclickvalueifempty",
            SettingKey::Prefix => "prefix",
            SettingKey::Postfix => "postfix",
            SettingKey::InitVal => "initval",
            SettingKey::ReplacementVal => "replacementval",
            SettingKey::CallbackBeforeCalculation => "callback_before_calculation",
            SettingKey::CallbackAfterCalculation => "callback_after_calculation",
            SettingKey::VerticalButtons => "verticalbuttons",
            SettingKey::VerticalUp => "verticalup",
            SettingKey::VerticalDown => "verticaldown",
            SettingKey::VerticalUpClass => "verticalupclass",
            SettingKey::VerticalDownClass => "verticaldownclass",
            SettingKey::ButtonUpClass => "buttonup_class",
            SettingKey::ButtonDownClass => "buttondown_class",
            SettingKey::ButtonUpTxt => "buttonup_txt",
            SettingKey::ButtonDownTxt => "buttondown_txt",
            SettingKey::PrefixExtraClass => "prefix_extraclass",
            SettingKey::PostfixExtraClass => "postfix_extraclass",
            SettingKey::FocusableButtons => "focusablebuttons",
        }
    }

    /// The `data-bts-*` attribute carrying this setting, if any
    ///
    /// Callbacks cannot be expressed as markup and have no attribute.
    pub fn data_attribute(&self) -> Option<&'static str> {
        Some(match self {
            SettingKey::Min => "data-bts-min",
            SettingKey::Max => "data-bts-max",
            SettingKey::Step => "data-bts-step",
            SettingKey::Decimals => "data-bts-decimals",
            SettingKey::ForceStepDivisibility => "data-bts-force-step-divisibility",
            SettingKey::StepInterval => "data-bts-step-interval",
            SettingKey::StepIntervalDelay => "data-bts-step-interval-delay",
            SettingKey::Booster => "data-bts-booster",
            SettingKey::BoostAt => "data-bts-boostat",
            SettingKey::MaxBoostedStep => "data-bts-max-boosted-step",
            SettingKey::Mousewheel => "data-bts-mousewheel",
            SettingKey::FirstClickValueIfEmpty => "data-bts-first-click-value-if-empty",
            SettingKey::Prefix => "data-bts-prefix",
            SettingKey::Postfix => "data-bts-postfix",
            SettingKey::InitVal => "data-bts-init-val",
            SettingKey::ReplacementVal => "data-bts-replacement-val",
            SettingKey::CallbackBeforeCalculation | SettingKey::CallbackAfterCalculation => {
                return None
            }
            SettingKey::VerticalButtons => "data-bts-vertical-buttons",
            SettingKey::VerticalUp => "data-bts-vertical-up",
            SettingKey::VerticalDown => "data-bts-vertical-down",
            SettingKey::VerticalUpClass => "data-bts-vertical-up-class",
            SettingKey::VerticalDownClass => "data-bts-vertical-down-class",
            SettingKey::ButtonUpClass => "data-bts-button-up-class",
            SettingKey::ButtonDownClass => "data-bts-button-down-class",
            SettingKey::ButtonUpTxt => "data-bts-button-up-txt",
            SettingKey::ButtonDownTxt => "data-bts-button-down-txt",
            SettingKey::PrefixExtraClass => "data-bts-prefix-extra-class",
            SettingKey::PostfixExtraClass => "data-bts-postfix-extra-class",
            SettingKey::FocusableButtons => "data-bts-focusable-buttons",
        })
    }
}

impl FromStr for SettingKey {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SettingKey::ALL
            .iter()
            .copied()
            .find(|key| key.name() == s)
            .ok_or_else(|| SettingsError::UnknownKey(s.to_string()))
    }
}

/// Complete, sanitized engine configuration
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Settings {
    /// Lower bound (inclusive), `None` for unbounded
    pub min: Option<f64>,
    /// Upper bound (inclusive), `None` for unbounded
    pub max: Option<f64>,
    /// Increment applied per step, always > 0
    pub step: f64,
    /// Number of decimals shown
    pub decimals: u32,
    #[serde(rename = "forcestepdivisibility")]
    pub force_step_divisibility: StepDivisibility,
    /// Repeat interval while spinning (ms)
    #[serde(rename = "stepinterval")]
    pub step_interval: u64,
    /// Delay before the first repeat (ms)
    #[serde(rename = "stepintervaldelay")]
    pub step_interval_delay: u64,
    /// Whether long spins accelerate
    pub booster: bool,
    /// Number of ticks per booster doubling, always >= 1
    #[serde(rename = "boostat")]
    pub boost_at: u32,
    /// Cap for the boosted step
    #[serde(rename = "maxboostedstep")]
    pub max_boosted_step: Option<f64>,
    pub mousewheel: bool,
    /// Value used when stepping from an empty input
    #[serde(rename = "firstclickvalueifempty")]
    pub first_click_value_if_empty: Option<f64>,
    pub prefix: String,
    pub postfix: String,
    /// Text written into an empty input at construction
    #[serde(rename = "initval")]
    pub init_val: String,
    /// Text written when a committed input is empty or not a number
    #[serde(rename = "replacementval")]
    pub replacement_val: String,
    #[serde(skip)]
    pub callback_before_calculation: Option<ValueCallback>,
    #[serde(skip)]
    pub callback_after_calculation: Option<ValueCallback>,
    #[serde(rename = "verticalbuttons")]
    pub vertical_buttons: bool,
    #[serde(rename = "verticalup")]
    pub vertical_up: String,
    #[serde(rename = "verticaldown")]
    pub vertical_down: String,
    #[serde(rename = "verticalupclass")]
    pub vertical_up_class: String,
    #[serde(rename = "verticaldownclass")]
    pub vertical_down_class: String,
    #[serde(rename = "buttonup_class")]
    pub button_up_class: String,
    #[serde(rename = "buttondown_class")]
    pub button_down_class: String,
    #[serde(rename = "buttonup_txt")]
    pub button_up_txt: String,
    #[serde(rename = "buttondown_txt")]
    pub button_down_txt: String,
    #[serde(rename = "prefix_extraclass")]
    pub prefix_extra_class: String,
    #[serde(rename = "postfix_extraclass")]
    pub postfix_extra_class: String,
    #[serde(rename = "focusablebuttons")]
    pub focusable_buttons: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            min: Some(DEFAULT_MIN),
            max: Some(DEFAULT_MAX),
            step: DEFAULT_STEP,
            decimals: DEFAULT_DECIMALS,
            force_step_divisibility: StepDivisibility::Round,
            step_interval: DEFAULT_STEP_INTERVAL,
            step_interval_delay: DEFAULT_STEP_INTERVAL_DELAY,
            booster: true,
            boost_at: DEFAULT_BOOST_AT,
            max_boosted_step: None,
            mousewheel: true,
            first_click_value_if_empty: None,
            prefix: String::new(),
            postfix: String::new(),
            init_val: String::new(),
            replacement_val: String::new(),
            callback_before_calculation: None,
            callback_after_calculation: None,
            vertical_buttons: false,
            vertical_up: "+".to_string(),
            vertical_down: "\u{2212}".to_string(),
            vertical_up_class: String::new(),
            vertical_down_class: String::new(),
            button_up_class: String::new(),
            button_down_class: String::new(),
            button_up_txt: "+".to_string(),
            button_down_txt: "\u{2212}".to_string(),
            prefix_extra_class: String::new(),
            postfix_extra_class: String::new(),
            focusable_buttons: false,
        }
    }
}

impl Settings {
    /// Spin repeat interval
    pub fn step_interval_duration(&self) -> Duration {
        Duration::from_millis(self.step_interval)
    }

    /// Delay before a spin session starts repeating
    pub fn step_interval_delay_duration(&self) -> Duration {
        Duration::from_millis(self.step_interval_delay)
    }

    /// Clamp a value into `[min, max]`, honoring unbounded sides
    pub fn clamp(&self, value: f64) -> f64 {
        let mut result = value;
        if let Some(min) = self.min {
            result = result.max(min);
        }
        if let Some(max) = self.max {
            result = result.min(max);
        }
        result
    }

    /// Midpoint of the bounds, or the single bound when only one is set
    pub fn midpoint(&self) -> f64 {
        match (self.min, self.max) {
            (Some(min), Some(max)) => (min + max) / 2.0,
            (Some(min), None) => min,
            (None, Some(max)) => max,
            (None, None) => 0.0,
        }
    }

    /// Keys whose values differ between `self` and `other`
    pub fn changed_keys(&self, other: &Settings) -> Vec<SettingKey> {
        let mut keys = Vec::new();
        let mut check = |differs: bool, key: SettingKey| {
            if differs {
                keys.push(key);
            }
        };
        check(self.min != other.min, SettingKey::Min);
        check(self.max != other.max, SettingKey::Max);
        check(self.step != other.step, SettingKey::Step);
        check(self.decimals != other.decimals, SettingKey::Decimals);
        check(
            self.force_step_divisibility != other.force_step_divisibility,
            SettingKey::ForceStepDivisibility,
        );
        check(self.step_interval != other.step_interval, SettingKey::StepInterval);
        check(
            self.step_interval_delay != other.step_interval_delay,
            SettingKey::StepIntervalDelay,
        );
        check(self.booster != other.booster, SettingKey::Booster);
        check(self.boost_at != other.boost_at, SettingKey::BoostAt);
        check(self.max_boosted_step != other.max_boosted_step, SettingKey::MaxBoostedStep);
        check(self.mousewheel != other.mousewheel, SettingKey::Mousewheel);
        check(
            self.first_click_value_if_empty != other.first_click_value_if_empty,
            SettingKey::FirstClickValueIfEmpty,
        );
        check(self.prefix != other.prefix, SettingKey::Prefix);
        check(self.postfix != other.postfix, SettingKey::Postfix);
        check(self.init_val != other.init_val, SettingKey::InitVal);
        check(self.replacement_val != other.replacement_val, SettingKey::ReplacementVal);
        check(
            self.callback_before_calculation != other.callback_before_calculation,
            SettingKey::CallbackBeforeCalculation,
        );
        check(
            self.callback_after_calculation != other.callback_after_calculation,
            SettingKey::CallbackAfterCalculation,
        );
        check(self.vertical_buttons != other.vertical_buttons, SettingKey::VerticalButtons);
        check(self.vertical_up != other.vertical_up, SettingKey::VerticalUp);
        check(self.vertical_down != other.vertical_down, SettingKey::VerticalDown);
        check(self.vertical_up_class != other.vertical_up_class, SettingKey::VerticalUpClass);
        check(
            self.vertical_down_class != other.vertical_down_class,
            SettingKey::VerticalDownClass,
        );
        check(self.button_up_class != other.button_up_class, SettingKey::ButtonUpClass);
        check(self.button_down_class != other.button_down_class, SettingKey::ButtonDownClass);
        check(self.button_up_txt != other.button_up_txt, SettingKey::ButtonUpTxt);
        check(self.button_down_txt != other.button_down_txt, SettingKey::ButtonDownTxt);
        check(self.prefix_extra_class != other.prefix_extra_class, SettingKey::PrefixExtraClass);
        check(
            self.postfix_extra_class != other.postfix_extra_class,
            SettingKey::PostfixExtraClass,
        );
        check(self.focusable_buttons != other.focusable_buttons, SettingKey::FocusableButtons);
        keys
    }
}

/// Sparse settings overlay
///
/// Every field is optional; `None` means "not supplied". Values are not
/// validated here, see [`crate::sanitize::sanitize`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PartialSettings {
    pub min: Option<Option<f64>>,
    pub max: Option<Option<f64>>,
    pub step: Option<f64>,
    pub decimals: Option<f64>,
    pub force_step_divisibility: Option<StepDivisibility>,
    pub step_interval: Option<f64>,
    pub step_interval_delay: Option<f64>,
    pub booster: Option<bool>,
    pub boost_at: Option<f64>,
    pub max_boosted_step: Option<Option<f64>>,
    pub mousewheel: Option<bool>,
    pub first_click_value_if_empty: Option<Option<f64>>,
    pub prefix: Option<String>,
    pub postfix: Option<String>,
    pub init_val: Option<String>,
    pub replacement_val: Option<String>,
    pub callback_before_calculation: Option<ValueCallback>,
    pub callback_after_calculation: Option<ValueCallback>,
    pub vertical_buttons: Option<bool>,
    pub vertical_up: Option<String>,
    pub vertical_down: Option<String>,
    pub vertical_up_class: Option<String>,
    pub vertical_down_class: Option<String>,
    pub button_up_class: Option<String>,
    pub button_down_class: Option<String>,
    pub button_up_txt: Option<String>,
    pub button_down_txt: Option<String>,
    pub prefix_extra_class: Option<String>,
    pub postfix_extra_class: Option<String>,
    pub focusable_buttons: Option<bool>,
}

impl PartialSettings {
    /// Create an empty overlay
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the lower bound
    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(Some(min));
        self
    }

    /// Remove the lower bound
    pub fn unbounded_min(mut self) -> Self {
        self.min = Some(None);
        self
    }

    /// Set the upper bound
    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(Some(max));
        self
    }

    /// Remove the upper bound
    pub fn unbounded_max(mut self) -> Self {
        self.max = Some(None);
        self
    }

    /// Set the step
    pub fn step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }

    /// Set the number of decimals
    pub fn decimals(mut self, decimals: u32) -> Self {
        self.decimals = Some(f64::from(decimals));
        self
    }

    /// Set the step divisibility policy
    pub fn force_step_divisibility(mut self, policy: StepDivisibility) -> Self {
        self.force_step_divisibility = Some(policy);
        self
    }

    /// Set the spin repeat interval (ms)
    pub fn step_interval(mut self, ms: u64) -> Self {
        self.step_interval = Some(ms as f64);
        self
    }

    /// Set the delay before spinning repeats (ms)
    pub fn step_interval_delay(mut self, ms: u64) -> Self {
        self.step_interval_delay = Some(ms as f64);
        self
    }

    /// Enable or disable the booster
    pub fn booster(mut self, enabled: bool) -> Self {
        self.booster = Some(enabled);
        self
    }

    /// Set ticks per booster doubling
    pub fn boost_at(mut self, ticks: u32) -> Self {
        self.boost_at = Some(f64::from(ticks));
        self
    }

    /// Cap the boosted step
    pub fn max_boosted_step(mut self, step: f64) -> Self {
        self.max_boosted_step = Some(Some(step));
        self
    }

    /// Enable or disable mouse wheel stepping
    pub fn mousewheel(mut self, enabled: bool) -> Self {
        self.mousewheel = Some(enabled);
        self
    }

    /// Set the value used when stepping from an empty input
    pub fn first_click_value_if_empty(mut self, value: f64) -> Self {
        self.first_click_value_if_empty = Some(Some(value));
        self
    }

    /// Set the prefix decoration
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Set the postfix decoration
    pub fn postfix(mut self, postfix: impl Into<String>) -> Self {
        self.postfix = Some(postfix.into());
        self
    }

    /// Set the text seeded into an empty input
    pub fn init_val(mut self, text: impl Into<String>) -> Self {
        self.init_val = Some(text.into());
        self
    }

    /// Set the text used when a committed input is empty or invalid
    pub fn replacement_val(mut self, text: impl Into<String>) -> Self {
        self.replacement_val = Some(text.into());
        self
    }

    /// Transform raw text before it is parsed
    pub fn callback_before_calculation<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.callback_before_calculation = Some(ValueCallback::new(f));
        self
    }

    /// Transform fixed-point text before it is displayed
    pub fn callback_after_calculation<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.callback_after_calculation = Some(ValueCallback::new(f));
        self
    }

    /// Request stacked up/down buttons from the renderer
    pub fn vertical_buttons(mut self, vertical: bool) -> Self {
        self.vertical_buttons = Some(vertical);
        self
    }

    /// Whether no field is supplied
    pub fn is_empty(&self) -> bool {
        self.keys().is_empty()
    }

    /// Whether `key` is supplied
    pub fn contains(&self, key: SettingKey) -> bool {
        self.keys().contains(&key)
    }

    /// Keys supplied by this overlay
    pub fn keys(&self) -> Vec<SettingKey> {
        let mut keys = Vec::new();
        let mut supplied = |present: bool, key: SettingKey| {
            if present {
                keys.push(key);
            }
        };
        supplied(self.min.is_some(), SettingKey::Min);
        supplied(self.max.is_some(), SettingKey::Max);
        supplied(self.step.is_some(), SettingKey::Step);
        supplied(self.decimals.is_some(), SettingKey::Decimals);
        supplied(
            self.force_step_divisibility.is_some(),
            SettingKey::ForceStepDivisibility,
        );
        supplied(self.step_interval.is_some(), SettingKey::StepInterval);
        supplied(self.step_interval_delay.is_some(), SettingKey::StepIntervalDelay);
        supplied(self.booster.is_some(), SettingKey::Booster);
        supplied(self.boost_at.is_some(), SettingKey::BoostAt);
        supplied(self.max_boosted_step.is_some(), SettingKey::MaxBoostedStep);
        supplied(self.mousewheel.is_some(), SettingKey::Mousewheel);
        supplied(
            self.first_click_value_if_empty.is_some(),
            SettingKey::FirstClickValueIfEmpty,
        );
        supplied(self.prefix.is_some(), SettingKey::Prefix);
        supplied(self.postfix.is_some(), SettingKey::Postfix);
        supplied(self.init_val.is_some(), SettingKey::InitVal);
        supplied(self.replacement_val.is_some(), SettingKey::ReplacementVal);
        supplied(
            self.callback_before_calculation.is_some(),
            SettingKey::CallbackBeforeCalculation,
        );
        supplied(
            self.callback_after_calculation.is_some(),
            SettingKey::CallbackAfterCalculation,
        );
        supplied(self.vertical_buttons.is_some(), SettingKey::VerticalButtons);
        supplied(self.vertical_up.is_some(), SettingKey::VerticalUp);
        supplied(self.vertical_down.is_some(), SettingKey::VerticalDown);
        supplied(self.vertical_up_class.is_some(), SettingKey::VerticalUpClass);
        supplied(self.vertical_down_class.is_some(), SettingKey::VerticalDownClass);
        supplied(self.button_up_class.is_some(), SettingKey::ButtonUpClass);
        supplied(self.button_down_class.is_some(), SettingKey::ButtonDownClass);
        supplied(self.button_up_txt.is_some(), SettingKey::ButtonUpTxt);
        supplied(self.button_down_txt.is_some(), SettingKey::ButtonDownTxt);
        supplied(self.prefix_extra_class.is_some(), SettingKey::PrefixExtraClass);
        supplied(self.postfix_extra_class.is_some(), SettingKey::PostfixExtraClass);
        supplied(self.focusable_buttons.is_some(), SettingKey::FocusableButtons);
        keys
    }

    /// Copy every field supplied by `other` over `self`
    pub fn overlay(&mut self, other: &PartialSettings) {
        fn take<T: Clone>(dst: &mut Option<T>, src: &Option<T>) {
            if src.is_some() {
                dst.clone_from(src);
            }
        }
        take(&mut self.min, &other.min);
        take(&mut self.max, &other.max);
        take(&mut self.step, &other.step);
        take(&mut self.decimals, &other.decimals);
        take(&mut self.force_step_divisibility, &other.force_step_divisibility);
        take(&mut self.step_interval, &other.step_interval);
        take(&mut self.step_interval_delay, &other.step_interval_delay);
        take(&mut self.booster, &other.booster);
        take(&mut self.boost_at, &other.boost_at);
        take(&mut self.max_boosted_step, &other.max_boosted_step);
        take(&mut self.mousewheel, &other.mousewheel);
        take(&mut self.first_click_value_if_empty, &other.first_click_value_if_empty);
        take(&mut self.prefix, &other.prefix);
        take(&mut self.postfix, &other.postfix);
        take(&mut self.init_val, &other.init_val);
        take(&mut self.replacement_val, &other.replacement_val);
        take(&mut self.callback_before_calculation, &other.callback_before_calculation);
        take(&mut self.callback_after_calculation, &other.callback_after_calculation);
        take(&mut self.vertical_buttons, &other.vertical_buttons);
        take(&mut self.vertical_up, &other.vertical_up);
        take(&mut self.vertical_down, &other.vertical_down);
        take(&mut self.vertical_up_class, &other.vertical_up_class);
        take(&mut self.vertical_down_class, &other.vertical_down_class);
        take(&mut self.button_up_class, &other.button_up_class);
        take(&mut self.button_down_class, &other.button_down_class);
        take(&mut self.button_up_txt, &other.button_up_txt);
        take(&mut self.button_down_txt, &other.button_down_txt);
        take(&mut self.prefix_extra_class, &other.prefix_extra_class);
        take(&mut self.postfix_extra_class, &other.postfix_extra_class);
        take(&mut self.focusable_buttons, &other.focusable_buttons);
    }

    /// `self` with `other` layered on top
    pub fn merged(mut self, other: &PartialSettings) -> Self {
        self.overlay(other);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_divisibility_parse() {
        assert_eq!("round".parse::<StepDivisibility>(), Ok(StepDivisibility::Round));
        assert_eq!(" Floor ".parse::<StepDivisibility>(), Ok(StepDivisibility::Floor));
        assert_eq!("ceil".parse::<StepDivisibility>(), Ok(StepDivisibility::Ceil));
        assert_eq!("none".parse::<StepDivisibility>(), Ok(StepDivisibility::None));
        assert!("sideways".parse::<StepDivisibility>().is_err());
    }

    #[test]
    fn test_setting_key_names_round_trip() {
        for key in SettingKey::ALL {
            assert_eq!(key.name().parse::<SettingKey>(), Ok(key));
        }
        assert!("colour".parse::<SettingKey>().is_err());
    }

    #[test]
    fn test_callbacks_have_no_data_attribute() {
        assert_eq!(SettingKey::CallbackBeforeCalculation.data_attribute(), None);
        assert_eq!(
            SettingKey::StepIntervalDelay.data_attribute(),
            Some("data-bts-step-interval-delay")
        );
    }

    #[test]
    fn test_partial_keys_and_overlay() {
        let mut base = PartialSettings::new().min(1.0).step(2.0);
        let top = PartialSettings::new().step(5.0).unbounded_max();

        base.overlay(&top);
        assert_eq!(base.min, Some(Some(1.0)));
        assert_eq!(base.max, Some(None));
        assert_eq!(base.step, Some(5.0));
        assert_eq!(
            base.keys(),
            vec![SettingKey::Min, SettingKey::Max, SettingKey::Step]
        );
        assert!(PartialSettings::new().is_empty());
    }

    #[test]
    fn test_changed_keys() {
        let a = Settings::default();
        let mut b = a.clone();
        assert!(a.changed_keys(&b).is_empty());

        b.max = Some(50.0);
        b.prefix = "$".into();
        assert_eq!(a.changed_keys(&b), vec![SettingKey::Max, SettingKey::Prefix]);
    }

    #[test]
    fn test_callback_identity_equality() {
        let cb = ValueCallback::new(|s| s.to_uppercase());
        let same = cb.clone();
        let other = ValueCallback::new(|s| s.to_uppercase());
        assert_eq!(cb, same);
        assert_ne!(cb, other);
        assert_eq!(cb.call("ab"), "AB");
    }

    #[test]
    fn test_clamp_and_midpoint() {
        let mut s = Settings::default();
        assert_eq!(s.clamp(-5.0), 0.0);
        assert_eq!(s.clamp(500.0), 100.0);
        assert_eq!(s.midpoint(), 50.0);

        s.min = None;
        s.max = None;
        assert_eq!(s.clamp(-5.0), -5.0);
        assert_eq!(s.midpoint(), 0.0);
    }
}
