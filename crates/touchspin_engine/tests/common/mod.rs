//! Shared fixtures for engine integration tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use touchspin_engine::prelude::*;

/// Engine on an in-memory number input driven by a virtual clock
pub struct Fixture {
    pub engine: SpinEngine,
    pub input: Arc<MemoryInput>,
    pub clock: ManualScheduler,
    pub events: EventLog,
}

impl Fixture {
    pub fn new(value: &str, settings: PartialSettings) -> Self {
        Self::with_input(MemoryInput::number().with_value(value), settings)
    }

    pub fn with_input(input: MemoryInput, settings: PartialSettings) -> Self {
        let input = input.shared();
        let clock = ManualScheduler::new();
        let engine = SpinEngine::builder(input.clone())
            .settings(settings)
            .scheduler(Arc::new(clock.clone()))
            .attribute_observer(input.clone())
            .build()
            .expect("engine builds");
        let events = EventLog::attach(&engine);
        Self {
            engine,
            input,
            clock,
            events,
        }
    }

    pub fn advance_ms(&self, ms: u64) -> usize {
        self.clock.advance(Duration::from_millis(ms))
    }

    pub fn text(&self) -> String {
        self.input.value()
    }
}

/// Records every emitted event with its payload
#[derive(Clone, Default)]
pub struct EventLog {
    entries: Arc<Mutex<Vec<SpinEventData>>>,
}

impl EventLog {
    pub fn attach(engine: &SpinEngine) -> Self {
        let log = Self::default();
        let sink = log.entries.clone();
        engine.on_any(move |data| sink.lock().unwrap().push(*data));
        log
    }

    pub fn events(&self) -> Vec<SpinEvent> {
        self.entries.lock().unwrap().iter().map(|d| d.event).collect()
    }

    pub fn entries(&self) -> Vec<SpinEventData> {
        self.entries.lock().unwrap().clone()
    }

    pub fn count(&self, event: SpinEvent) -> usize {
        self.events().into_iter().filter(|e| *e == event).count()
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }
}

/// Renderer that records hook calls
#[derive(Default)]
pub struct RecordingRenderer {
    pub vertical_supported: bool,
    pub defaults: PartialSettings,
    pub calls: Mutex<Vec<String>>,
    pub engine: Mutex<Option<WeakSpinEngine>>,
}

impl RecordingRenderer {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

impl Renderer for RecordingRenderer {
    fn name(&self) -> &str {
        "recording"
    }

    fn default_settings(&self) -> PartialSettings {
        self.defaults.clone()
    }

    fn build_input_group(&self, ctx: &RenderContext<'_>) -> Result<(), RenderError> {
        *self.engine.lock().unwrap() = Some(ctx.engine.clone());
        self.record("build_input_group");
        Ok(())
    }

    fn build_vertical_buttons(&self, ctx: &RenderContext<'_>) -> Result<(), RenderError> {
        if !self.vertical_supported {
            return Err(RenderError::MissingHook("build_vertical_buttons"));
        }
        *self.engine.lock().unwrap() = Some(ctx.engine.clone());
        self.record(format!("build_vertical_buttons({})", ctx.settings.vertical_up));
        Ok(())
    }

    fn update_prefix_postfix(&self, settings: &Settings) {
        self.record(format!(
            "update_prefix_postfix({}|{})",
            settings.prefix, settings.postfix
        ));
    }

    fn set_disabled(&self, disabled: bool) {
        self.record(format!("set_disabled({disabled})"));
    }

    fn teardown(&self) {
        self.record("teardown");
    }
}
