//! Settings sanitization
//!
//! [`sanitize`] layers a [`PartialSettings`] over a base [`Settings`] and
//! validates every supplied field independently. An invalid field falls back
//! to its built-in default (or to "unbounded" for nullable bounds); the rest
//! of the overlay is still applied. Nothing here fails or panics.

use crate::settings::{
    PartialSettings, Settings, DEFAULT_BOOST_AT, DEFAULT_DECIMALS, DEFAULT_STEP,
    DEFAULT_STEP_INTERVAL, DEFAULT_STEP_INTERVAL_DELAY, MAX_DECIMALS,
};
use crate::step::{align_to_step, Direction};

/// Positive finite step, else the default
fn sanitize_step(step: f64) -> f64 {
    if step.is_finite() && step > 0.0 {
        step
    } else {
        tracing::debug!(step, "invalid step, falling back to {}", DEFAULT_STEP);
        DEFAULT_STEP
    }
}

/// Non-negative finite decimals, floored, else the default
fn sanitize_decimals(decimals: f64) -> u32 {
    if decimals.is_finite() && decimals >= 0.0 {
        (decimals.floor() as u32).min(MAX_DECIMALS)
    } else {
        tracing::debug!(decimals, "invalid decimals, falling back to {}", DEFAULT_DECIMALS);
        DEFAULT_DECIMALS
    }
}

/// Non-negative finite milliseconds; zero is a legal "no delay"
fn sanitize_interval(ms: f64, default: u64, field: &'static str) -> u64 {
    if ms.is_finite() && ms >= 0.0 {
        ms.floor() as u64
    } else {
        tracing::debug!(field, ms, "invalid interval, falling back to {}", default);
        default
    }
}

/// Positive integer tick count
fn sanitize_boost_at(ticks: f64) -> u32 {
    if ticks.is_finite() && ticks >= 1.0 {
        ticks.floor().min(f64::from(u32::MAX)) as u32
    } else {
        tracing::debug!(ticks, "invalid boostat, falling back to {}", DEFAULT_BOOST_AT);
        DEFAULT_BOOST_AT
    }
}

/// Finite number or unbounded
fn sanitize_bound(bound: Option<f64>, field: &'static str) -> Option<f64> {
    match bound {
        Some(value) if value.is_finite() => Some(value),
        Some(value) => {
            tracing::debug!(field, value, "non-finite bound treated as unbounded");
            None
        }
        None => None,
    }
}

/// Positive finite cap or none
fn sanitize_max_boosted_step(step: Option<f64>) -> Option<f64> {
    match step {
        Some(value) if value.is_finite() && value > 0.0 => Some(value),
        Some(value) => {
            tracing::debug!(value, "invalid maxboostedstep ignored");
            None
        }
        None => None,
    }
}

/// Apply `partial` over `base`, validating each supplied field
///
/// After the per-field pass:
/// - inverted bounds (`min > max`) are swapped;
/// - when the step is not exactly 1, `min` is aligned up and `max` down to
///   the nearest step multiples. An alignment that would invert the range is
///   skipped and the bounds are kept as supplied.
///
/// `base` is assumed to already be sanitized.
pub fn sanitize(partial: &PartialSettings, base: &Settings) -> Settings {
    let mut settings = base.clone();

    if let Some(min) = partial.min {
        settings.min = sanitize_bound(min, "min");
    }
    if let Some(max) = partial.max {
        settings.max = sanitize_bound(max, "max");
    }
    if let Some(step) = partial.step {
        settings.step = sanitize_step(step);
    }
    if let Some(decimals) = partial.decimals {
        settings.decimals = sanitize_decimals(decimals);
    }
    if let Some(policy) = partial.force_step_divisibility {
        settings.force_step_divisibility = policy;
    }
    if let Some(ms) = partial.step_interval {
        settings.step_interval = sanitize_interval(ms, DEFAULT_STEP_INTERVAL, "stepinterval");
    }
    if let Some(ms) = partial.step_interval_delay {
        settings.step_interval_delay =
            sanitize_interval(ms, DEFAULT_STEP_INTERVAL_DELAY, "stepintervaldelay");
    }
    if let Some(booster) = partial.booster {
        settings.booster = booster;
    }
    if let Some(ticks) = partial.boost_at {
        settings.boost_at = sanitize_boost_at(ticks);
    }
    if let Some(cap) = partial.max_boosted_step {
        settings.max_boosted_step = sanitize_max_boosted_step(cap);
    }
    if let Some(mousewheel) = partial.mousewheel {
        settings.mousewheel = mousewheel;
    }
    if let Some(value) = partial.first_click_value_if_empty {
        settings.first_click_value_if_empty = sanitize_bound(value, "firstclickvalueifempty");
    }

    fn text(dst: &mut String, src: &Option<String>) {
        if let Some(src) = src {
            dst.clone_from(src);
        }
    }
    text(&mut settings.prefix, &partial.prefix);
    text(&mut settings.postfix, &partial.postfix);
    text(&mut settings.init_val, &partial.init_val);
    text(&mut settings.replacement_val, &partial.replacement_val);
    text(&mut settings.vertical_up, &partial.vertical_up);
    text(&mut settings.vertical_down, &partial.vertical_down);
    text(&mut settings.vertical_up_class, &partial.vertical_up_class);
    text(&mut settings.vertical_down_class, &partial.vertical_down_class);
    text(&mut settings.button_up_class, &partial.button_up_class);
    text(&mut settings.button_down_class, &partial.button_down_class);
    text(&mut settings.button_up_txt, &partial.button_up_txt);
    text(&mut settings.button_down_txt, &partial.button_down_txt);
    text(&mut settings.prefix_extra_class, &partial.prefix_extra_class);
    text(&mut settings.postfix_extra_class, &partial.postfix_extra_class);

    if let Some(callback) = &partial.callback_before_calculation {
        settings.callback_before_calculation = Some(callback.clone());
    }
    if let Some(callback) = &partial.callback_after_calculation {
        settings.callback_after_calculation = Some(callback.clone());
    }
    if let Some(vertical) = partial.vertical_buttons {
        settings.vertical_buttons = vertical;
    }
    if let Some(focusable) = partial.focusable_buttons {
        settings.focusable_buttons = focusable;
    }

    reconcile_bounds(&mut settings);
    settings
}

/// Swap inverted bounds, then align them to the step
fn reconcile_bounds(settings: &mut Settings) {
    if let (Some(min), Some(max)) = (settings.min, settings.max) {
        if min > max {
            tracing::warn!(min, max, "min is greater than max, swapping bounds");
            settings.min = Some(max);
            settings.max = Some(min);
        }
    }

    if settings.step == 1.0 {
        return;
    }

    let aligned_min = settings
        .min
        .map(|min| align_to_step(min, settings.step, Direction::Up));
    let aligned_max = settings
        .max
        .map(|max| align_to_step(max, settings.step, Direction::Down));

    if let (Some(min), Some(max)) = (aligned_min, aligned_max) {
        if min > max {
            tracing::warn!(
                step = settings.step,
                min,
                max,
                "no step multiple fits between the bounds, leaving them unaligned"
            );
            return;
        }
    }

    settings.min = aligned_min;
    settings.max = aligned_max;
}
