//! Settings resolution and native attribute synchronization

mod common;

use std::sync::Arc;

use common::{Fixture, RecordingRenderer};
use serde_json::json;
use touchspin_engine::prelude::*;

fn attr(input: &MemoryInput, name: &str) -> Option<String> {
    input.attribute(name)
}

#[test]
fn test_settings_mirrored_to_number_input() {
    let fx = Fixture::new("5", PartialSettings::new().min(1.0).max(9.0));
    assert_eq!(attr(&fx.input, "min").as_deref(), Some("1"));
    assert_eq!(attr(&fx.input, "max").as_deref(), Some("9"));
    assert_eq!(attr(&fx.input, "step").as_deref(), Some("1"));

    fx.engine.update_settings(PartialSettings::new().max(20.0).step(0.5).decimals(1));
    assert_eq!(attr(&fx.input, "max").as_deref(), Some("20"));
    assert_eq!(attr(&fx.input, "step").as_deref(), Some("0.5"));

    fx.engine.update_settings(PartialSettings::new().unbounded_max());
    assert_eq!(attr(&fx.input, "max"), None);
}

#[test]
fn test_text_input_never_written() {
    let fx = Fixture::with_input(
        MemoryInput::text().with_value("5"),
        PartialSettings::new().min(1.0).max(9.0),
    );
    assert_eq!(attr(&fx.input, "min"), None);
    assert_eq!(attr(&fx.input, "max"), None);

    fx.engine.update_settings(PartialSettings::new().step(2.0));
    assert_eq!(attr(&fx.input, "step"), None);
    assert_eq!(fx.engine.settings().step, 2.0);
}

#[test]
fn test_text_input_native_attributes_still_read() {
    let fx = Fixture::with_input(
        MemoryInput::text().with_value("5").with_attribute("max", "8"),
        PartialSettings::new(),
    );
    assert_eq!(fx.engine.settings().max, Some(8.0));
}

#[test]
fn test_settings_precedence() {
    let input = MemoryInput::number()
        .with_value("20")
        .with_attribute("min", "2")
        .with_attribute("max", "50")
        .with_attribute("step", "1")
        .with_attribute("data-bts-max", "40")
        .with_attribute("data-bts-step", "2")
        .shared();
    let renderer = Arc::new(RecordingRenderer {
        defaults: PartialSettings::new()
            .min(-100.0)
            .decimals(1)
            .prefix("R")
            .postfix("R"),
        ..Default::default()
    });
    let provider = StaticDefaults::new(PartialSettings::new().min(-50.0).prefix("D"));

    let engine = SpinEngine::builder(input.clone())
        .renderer(renderer)
        .defaults(provider.shared())
        .settings(PartialSettings::new().step(5.0))
        .scheduler(Arc::new(ManualScheduler::new()))
        .build()
        .unwrap();

    let settings = engine.settings();
    // explicit > data > native > provider > renderer > built-in
    assert_eq!(settings.step, 5.0);
    assert_eq!(settings.max, Some(40.0));
    assert_eq!(settings.min, Some(5.0));
    assert_eq!(settings.prefix, "D");
    assert_eq!(settings.postfix, "R");
    assert_eq!(settings.decimals, 1);
    assert_eq!(settings.step_interval, 100);
    assert_eq!(input.value(), "20.0");
}

#[test]
fn test_closure_defaults_provider() {
    let input = MemoryInput::number().with_value("1").shared();
    let engine = SpinEngine::builder(input)
        .defaults(Arc::new(|| PartialSettings::new().postfix("%")))
        .scheduler(Arc::new(ManualScheduler::new()))
        .build()
        .unwrap();
    assert_eq!(engine.settings().postfix, "%");
}

#[test]
fn test_data_attributes_can_be_disabled() {
    let input = MemoryInput::number()
        .with_value("1")
        .with_attribute("data-bts-postfix", "kg")
        .shared();
    let engine = SpinEngine::builder(input)
        .data_attributes(false)
        .scheduler(Arc::new(ManualScheduler::new()))
        .build()
        .unwrap();
    assert_eq!(engine.settings().postfix, "");
}

#[test]
fn test_settings_from_json() {
    let input = MemoryInput::number().with_value("3").shared();
    let engine = SpinEngine::builder(input.clone())
        .settings_json(&json!({
            "min": 0,
            "max": "10",
            "booster": "false",
            "forcestepdivisibility": "floor",
            "verticalbuttons": true,
        }))
        .scheduler(Arc::new(ManualScheduler::new()))
        .build()
        .unwrap();

    let settings = engine.settings();
    assert_eq!(settings.max, Some(10.0));
    assert!(!settings.booster);
    assert_eq!(settings.force_step_divisibility, StepDivisibility::Floor);
    assert!(settings.vertical_buttons);
}

#[test]
fn test_native_mutation_updates_settings() {
    let fx = Fixture::new("50", PartialSettings::new());

    fx.input.set_attribute("max", "40");
    assert_eq!(fx.engine.settings().max, Some(40.0));
    assert_eq!(fx.engine.value(), Some(40.0));
    assert!(fx.events.events().is_empty());

    fx.input.remove_attribute("max");
    assert_eq!(fx.engine.settings().max, None);
    fx.engine.set_value(1_000.0);
    assert_eq!(fx.engine.value(), Some(1_000.0));

    fx.input.set_attribute("step", "5");
    assert_eq!(fx.engine.settings().step, 5.0);
    fx.engine.up_once();
    assert_eq!(fx.engine.value(), Some(1_005.0));

    fx.input.remove_attribute("step");
    assert_eq!(fx.engine.settings().step, 1.0);
    assert_eq!(attr(&fx.input, "step").as_deref(), Some("1"));
}

#[test]
fn test_native_mutation_of_explicit_setting_reverted() {
    let fx = Fixture::new("50", PartialSettings::new().max(80.0));

    fx.input.set_attribute("max", "10");
    assert_eq!(fx.engine.settings().max, Some(80.0));
    assert_eq!(attr(&fx.input, "max").as_deref(), Some("80"));
    assert_eq!(fx.engine.value(), Some(50.0));

    fx.input.remove_attribute("max");
    assert_eq!(attr(&fx.input, "max").as_deref(), Some("80"));
}

#[test]
fn test_native_mutation_of_data_setting_reverted() {
    let fx = Fixture::with_input(
        MemoryInput::number()
            .with_value("6")
            .with_attribute("data-bts-min", "5"),
        PartialSettings::new(),
    );
    assert_eq!(fx.engine.settings().min, Some(5.0));

    fx.input.set_attribute("min", "0");
    assert_eq!(fx.engine.settings().min, Some(5.0));
    assert_eq!(attr(&fx.input, "min").as_deref(), Some("5"));
}

#[test]
fn test_updated_key_becomes_user_owned() {
    let fx = Fixture::new("50", PartialSettings::new());

    fx.input.set_attribute("min", "10");
    assert_eq!(fx.engine.settings().min, Some(10.0));

    fx.engine.update_settings(PartialSettings::new().min(20.0));
    fx.input.set_attribute("min", "0");
    assert_eq!(fx.engine.settings().min, Some(20.0));
    assert_eq!(attr(&fx.input, "min").as_deref(), Some("20"));
}

#[test]
fn test_unrelated_attributes_ignored() {
    let fx = Fixture::new("50", PartialSettings::new());
    let before = fx.engine.settings();
    fx.input.set_attribute("data-bts-max", "3");
    fx.input.set_attribute("placeholder", "qty");
    assert_eq!(fx.engine.settings().max, before.max);
}

#[test]
fn test_detached_after_destroy() {
    let fx = Fixture::new("50", PartialSettings::new());
    assert_eq!(fx.input.subscriber_count(), 1);
    fx.engine.destroy();
    assert_eq!(fx.input.subscriber_count(), 0);

    fx.input.set_attribute("max", "10");
    assert_eq!(fx.text(), "50");
}
