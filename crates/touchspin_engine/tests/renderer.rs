//! Renderer hooks and forwarded user interaction

mod common;

use std::sync::Arc;

use common::{EventLog, RecordingRenderer};
use touchspin_engine::prelude::*;

fn build(
    renderer: &Arc<RecordingRenderer>,
    input: &Arc<MemoryInput>,
    settings: PartialSettings,
) -> Result<SpinEngine, EngineError> {
    SpinEngine::builder(input.clone())
        .renderer(renderer.clone())
        .settings(settings)
        .scheduler(Arc::new(ManualScheduler::new()))
        .attribute_observer(input.clone())
        .build()
}

fn renderer(vertical_supported: bool) -> Arc<RecordingRenderer> {
    Arc::new(RecordingRenderer {
        vertical_supported,
        ..Default::default()
    })
}

/// Engine handle the way a renderer would obtain it
fn wired(renderer: &RecordingRenderer) -> SpinEngine {
    renderer
        .engine
        .lock()
        .unwrap()
        .as_ref()
        .and_then(WeakSpinEngine::upgrade)
        .expect("renderer holds a live engine")
}

struct FailingRenderer;

impl Renderer for FailingRenderer {
    fn name(&self) -> &str {
        "failing"
    }

    fn build_input_group(&self, _ctx: &RenderContext<'_>) -> Result<(), RenderError> {
        Err(RenderError::Failed("no container".to_string()))
    }

    fn update_prefix_postfix(&self, _settings: &Settings) {}

    fn teardown(&self) {}
}

#[test]
fn test_build_calls() {
    let r = renderer(false);
    let input = MemoryInput::number().with_value("1").shared();
    let _engine = build(&r, &input, PartialSettings::new().prefix("$")).unwrap();
    assert_eq!(
        r.calls(),
        vec!["build_input_group", "update_prefix_postfix($|)"]
    );
}

#[test]
fn test_vertical_buttons_built() {
    let r = renderer(true);
    let input = MemoryInput::number().with_value("1").shared();
    let _engine = build(&r, &input, PartialSettings::new().vertical_buttons(true)).unwrap();
    assert_eq!(
        r.calls(),
        vec!["build_vertical_buttons(+)", "update_prefix_postfix(|)"]
    );
}

#[test]
fn test_missing_vertical_hook() {
    let r = renderer(false);
    let input = MemoryInput::number().with_value("1").shared();
    let err = build(&r, &input, PartialSettings::new().vertical_buttons(true)).unwrap_err();
    assert_eq!(
        err,
        EngineError::MissingRendererHook {
            renderer: "recording".to_string(),
            hook: "build_vertical_buttons",
        }
    );
    assert!(err.to_string().contains("build_vertical_buttons"));
    // Nothing is left subscribed to the host
    assert_eq!(input.subscriber_count(), 0);
}

#[test]
fn test_renderer_failure_reported() {
    let input = MemoryInput::number().with_value("1").shared();
    let err = SpinEngine::builder(input)
        .renderer(Arc::new(FailingRenderer))
        .scheduler(Arc::new(ManualScheduler::new()))
        .build()
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Renderer 'failing' failed in 'build_input_group': no container"
    );
}

#[test]
fn test_disabled_host_at_build() {
    let r = renderer(false);
    let input = MemoryInput::number()
        .with_value("1")
        .with_attribute("disabled", "")
        .shared();
    let _engine = build(&r, &input, PartialSettings::new()).unwrap();
    assert_eq!(r.calls().last().map(String::as_str), Some("set_disabled(true)"));
}

#[test]
fn test_disabled_toggle_forwarded() {
    let r = renderer(false);
    let input = MemoryInput::number().with_value("1").shared();
    let _engine = build(&r, &input, PartialSettings::new()).unwrap();

    input.set_attribute("readonly", "");
    input.remove_attribute("readonly");
    let calls = r.calls();
    assert_eq!(calls[calls.len() - 2..], ["set_disabled(true)", "set_disabled(false)"]);
}

#[test]
fn test_decoration_refresh_only_on_decoration_change() {
    let r = renderer(false);
    let input = MemoryInput::number().with_value("4").shared();
    let engine = build(&r, &input, PartialSettings::new()).unwrap();
    let built = r.calls().len();

    engine.update_settings(PartialSettings::new().step(2.0).max(50.0));
    assert_eq!(r.calls().len(), built);

    engine.update_settings(PartialSettings::new().postfix("%"));
    assert_eq!(r.calls().last().map(String::as_str), Some("update_prefix_postfix(|%)"));
    // Host text stays bare
    assert_eq!(input.value(), "4");
}

#[test]
fn test_teardown_once_on_destroy() {
    let r = renderer(false);
    let input = MemoryInput::number().with_value("1").shared();
    let engine = build(&r, &input, PartialSettings::new()).unwrap();

    engine.destroy();
    engine.destroy();
    let teardowns = r.calls().iter().filter(|c| *c == "teardown").count();
    assert_eq!(teardowns, 1);
    assert_eq!(input.value(), "1");
}

#[test]
fn test_weak_handle_does_not_keep_engine_alive() {
    let r = renderer(false);
    let input = MemoryInput::number().with_value("1").shared();
    let engine = build(&r, &input, PartialSettings::new()).unwrap();

    assert!(wired(&r).ptr_eq(&engine));
    drop(engine);
    let weak = r.engine.lock().unwrap().clone().unwrap();
    assert!(weak.upgrade().is_none());
}

#[test]
fn test_button_press_and_release() {
    let r = renderer(false);
    let input = MemoryInput::number().with_value("10").shared();
    let _engine = build(&r, &input, PartialSettings::new()).unwrap();
    let engine = wired(&r);
    let events = EventLog::attach(&engine);

    engine.press(Direction::Down);
    assert_eq!(engine.value(), Some(9.0));
    assert_eq!(engine.spin_state(), SpinState::SpinningDown);
    engine.release();
    assert_eq!(engine.spin_state(), SpinState::Idle);

    assert_eq!(
        events.events(),
        vec![
            SpinEvent::Change,
            SpinEvent::StartSpin,
            SpinEvent::StartDownSpin,
            SpinEvent::StopDownSpin,
            SpinEvent::StopSpin,
        ]
    );
}

#[test]
fn test_keyboard() {
    let r = renderer(false);
    let input = MemoryInput::number().with_value("10").shared();
    let _engine = build(&r, &input, PartialSettings::new()).unwrap();
    let engine = wired(&r);

    assert!(engine.key_down("ArrowUp".parse().unwrap()));
    // Auto-repeat while held does not step again
    assert!(engine.key_down(Key::ArrowUp));
    assert!(engine.key_down(Key::ArrowUp));
    assert_eq!(engine.value(), Some(11.0));
    assert!(engine.key_up(Key::ArrowUp));
    assert!(!engine.spin_state().is_spinning());

    assert!(!engine.key_down(Key::Other));
    assert!(!engine.key_up(Key::Enter));

    input.set_value("12.7");
    assert!(engine.key_down("Enter".parse().unwrap()));
    assert_eq!(input.value(), "13");
}

#[test]
fn test_wheel() {
    let r = renderer(false);
    let input = MemoryInput::number().with_value("10").shared();
    let _engine = build(&r, &input, PartialSettings::new()).unwrap();
    let engine = wired(&r);

    assert!(!engine.wheel(-1.0, false));
    assert_eq!(engine.value(), Some(10.0));

    assert!(engine.wheel(-1.0, true));
    assert_eq!(engine.value(), Some(11.0));
    assert!(engine.wheel(3.0, true));
    assert_eq!(engine.value(), Some(10.0));
    assert!(!engine.wheel(0.0, true));

    engine.update_settings(PartialSettings::new().mousewheel(false));
    assert!(!engine.wheel(-1.0, true));
    assert_eq!(engine.value(), Some(10.0));
}

#[test]
fn test_blur_commits() {
    let r = renderer(false);
    let input = MemoryInput::number().with_value("10").shared();
    let _engine = build(&r, &input, PartialSettings::new().max(20.0)).unwrap();
    let engine = wired(&r);

    input.set_value("99");
    engine.blur();
    assert_eq!(input.value(), "20");
}
