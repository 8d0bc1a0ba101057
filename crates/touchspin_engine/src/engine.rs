//! Spin engine
//!
//! [`SpinEngine`] owns the settings of one spinner and keeps the host
//! input's text consistent with them. It is a cheap, cloneable handle to
//! shared state; every clone drives the same engine.
//!
//! # Delivery
//!
//! Operations mutate state under the engine lock and collect their side
//! effects (events, attribute mirroring, renderer refreshes, settings
//! observers) in an outbox. The outbox is delivered after the lock is
//! released, in the order the effects were produced, so listeners may call
//! back into the engine freely.
//!
//! # Lifecycle
//!
//! ```ignore
//! let input = MemoryInput::number().with_value("50").shared();
//! let engine = SpinEngine::builder(input.clone())
//!     .settings(PartialSettings::new().min(0.0).max(100.0))
//!     .scheduler(Arc::new(ManualScheduler::new()))
//!     .build()?;
//!
//! engine.up_once();
//! assert_eq!(engine.value(), Some(51.0));
//!
//! engine.destroy();
//! engine.up_once(); // ignored
//! ```

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use rustc_hash::FxHashSet;
use serde_json::Value;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use touchspin_core::{
    decimal_places, force_step_divisibility, parse_data_attributes, parse_float,
    round_to_decimals, sanitize, Direction, EventCallback, EventDispatcher, ListenerId,
    PartialSettings, SettingKey, Settings, SpinEvent, SpinEventData, StepDivisibility,
    ValueFormatter,
};
use touchspin_scheduler::{shared_background, SchedulerExt, SharedScheduler, TimerId};

use crate::bridge::{
    AttributeBridge, AttributeObserver, AttributeWriter, NativeAttribute, SubscriptionId,
};
use crate::defaults::SharedDefaults;
use crate::error::{EngineError, Result};
use crate::host::HostInput;
use crate::renderer::{RenderContext, SharedRenderer};
use crate::spin::{boosted_step, SpinInput, SpinSession, SpinState};

new_key_type! {
    /// Handle to a settings observer
    pub struct ObserverId;
}

/// Called with the new settings and the keys that changed
pub type SettingsCallback = Arc<dyn Fn(&Settings, &[SettingKey]) + Send + Sync>;

/// Keys whose change requires the renderer to refresh its addons
const DECORATION_KEYS: [SettingKey; 4] = [
    SettingKey::Prefix,
    SettingKey::Postfix,
    SettingKey::PrefixExtraClass,
    SettingKey::PostfixExtraClass,
];

// ============================================================================
// Outbox
// ============================================================================

/// Side effect produced under the lock, delivered after it is released
enum Effect {
    Emit {
        data: SpinEventData,
        listeners: SmallVec<[EventCallback; 4]>,
    },
    Mirror {
        writer: Arc<dyn AttributeWriter>,
        settings: Settings,
    },
    Decorate {
        renderer: SharedRenderer,
        settings: Settings,
    },
    Observe {
        observers: SmallVec<[SettingsCallback; 2]>,
        settings: Settings,
        changed: Vec<SettingKey>,
    },
    Disable {
        renderer: SharedRenderer,
        disabled: bool,
    },
    Detach {
        renderer: Option<SharedRenderer>,
        subscription: Option<(Arc<dyn AttributeObserver>, SubscriptionId)>,
    },
}

#[derive(Default)]
struct Outbox {
    effects: SmallVec<[Effect; 4]>,
}

impl Outbox {
    fn push(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    fn deliver(self) {
        for effect in self.effects {
            match effect {
                Effect::Emit { data, listeners } => {
                    for listener in listeners {
                        listener(&data);
                    }
                }
                Effect::Mirror { writer, settings } => writer.apply(&settings),
                Effect::Decorate { renderer, settings } => {
                    renderer.update_prefix_postfix(&settings)
                }
                Effect::Observe {
                    observers,
                    settings,
                    changed,
                } => {
                    for observer in observers {
                        observer(&settings, &changed);
                    }
                }
                Effect::Disable { renderer, disabled } => renderer.set_disabled(disabled),
                Effect::Detach {
                    renderer,
                    subscription,
                } => {
                    if let Some((observer, id)) = subscription {
                        observer.unsubscribe(id);
                    }
                    if let Some(renderer) = renderer {
                        renderer.teardown();
                    }
                }
            }
        }
    }
}

// ============================================================================
// Engine State
// ============================================================================

struct EngineInner {
    host: Arc<dyn HostInput>,
    settings: Settings,
    /// Keys supplied explicitly or through data attributes; native attribute
    /// mutations never override these
    user_keys: FxHashSet<SettingKey>,
    spin: SpinState,
    session: Option<SpinSession>,
    next_generation: u64,
    dispatcher: EventDispatcher,
    observers: SlotMap<ObserverId, SettingsCallback>,
    scheduler: SharedScheduler,
    renderer: Option<SharedRenderer>,
    bridge: AttributeBridge,
    writer: Arc<dyn AttributeWriter>,
    subscription: Option<(Arc<dyn AttributeObserver>, SubscriptionId)>,
    destroyed: bool,
    self_ref: Weak<Mutex<EngineInner>>,
}

impl EngineInner {
    fn formatter(&self) -> ValueFormatter<'_> {
        ValueFormatter::new(&self.settings)
    }

    /// Numeric value of the host text, `None` when empty or non-numeric
    fn current_value(&self) -> Option<f64> {
        self.formatter().parse(&self.host.value())
    }

    fn is_disabled(&self) -> bool {
        self.host.is_disabled() || self.host.is_readonly()
    }

    fn emit(&self, outbox: &mut Outbox, event: SpinEvent) {
        let data = SpinEventData::new(event, self.current_value());
        let listeners = self.dispatcher.listeners_for(event);
        if !listeners.is_empty() {
            outbox.push(Effect::Emit { data, listeners });
        }
    }

    /// Write `text` to the host; returns whether it changed
    fn write_text(&self, text: &str) -> bool {
        if self.host.value() == text {
            return false;
        }
        self.host.set_value(text);
        true
    }

    /// Format and write `value`; returns whether the text changed
    fn write_value(&self, value: f64) -> bool {
        let value = round_to_decimals(value, self.settings.decimals);
        let text = self.formatter().format_bare(value);
        self.write_text(&text)
    }

    /// Starting point for a step taken from an empty input
    fn seed_value(&self) -> f64 {
        let seed = self
            .settings
            .first_click_value_if_empty
            .unwrap_or_else(|| self.settings.midpoint());
        force_step_divisibility(
            seed,
            self.settings.step,
            self.settings.decimals,
            self.settings.force_step_divisibility,
        )
    }

    /// Re-read the host text and normalize it
    ///
    /// Empty text becomes `replacementval` when set. A lone `"."` is left
    /// alone while decimals are allowed. Non-numeric text becomes
    /// `replacementval` (or 0). Everything else is forced onto the step,
    /// clamped and written back formatted.
    fn commit(&self, outbox: &mut Outbox, notify: bool) {
        let prepared = self.formatter().prepare(&self.host.value());
        let prepared = prepared.trim();

        if prepared.is_empty() {
            let replacement = self.settings.replacement_val.trim();
            if !replacement.is_empty() && self.write_text(replacement) && notify {
                self.emit(outbox, SpinEvent::Change);
            }
            return;
        }
        if self.settings.decimals > 0 && prepared == "." {
            return;
        }

        let value = parse_float(prepared)
            .unwrap_or_else(|| parse_float(&self.settings.replacement_val).unwrap_or(0.0));
        let forced = force_step_divisibility(
            value,
            self.settings.step,
            self.settings.decimals,
            self.settings.force_step_divisibility,
        );
        let changed = self.write_value(self.settings.clamp(forced));
        if changed && notify {
            self.emit(outbox, SpinEvent::Change);
        }
    }

    /// Take one step in `direction`
    ///
    /// Reaching or passing the bound in the stepping direction pins the
    /// value to it, emits the boundary event and ends any spin session.
    fn step_once(&mut self, outbox: &mut Outbox, direction: Direction) {
        self.commit(outbox, true);

        let next = match self.current_value() {
            None => self.seed_value(),
            Some(mut value) => {
                let ticks = self.session.map_or(0, |session| session.ticks);
                let boosted = boosted_step(&self.settings, ticks);
                if boosted.capped {
                    value = force_step_divisibility(
                        value,
                        boosted.step,
                        self.settings.decimals,
                        StepDivisibility::Round,
                    );
                }
                // Settle float artifacts (0.7 + 0.1) before comparing to the bounds
                let precision = decimal_places(boosted.step)
                    .max(decimal_places(value))
                    .max(self.settings.decimals);
                round_to_decimals(value + direction.sign() * boosted.step, precision)
            }
        };

        let (bound, reached) = match direction {
            Direction::Up => (self.settings.max, self.settings.max.is_some_and(|max| next >= max)),
            Direction::Down => (self.settings.min, self.settings.min.is_some_and(|min| next <= min)),
        };
        let next = match (reached, bound) {
            (true, Some(bound)) => bound,
            _ => self.settings.clamp(next),
        };

        let changed = self.write_value(next);
        if reached {
            self.emit(outbox, SpinEvent::boundary_for(direction));
            self.end_session(outbox, SpinInput::BoundaryReached);
        }
        if changed {
            self.emit(outbox, SpinEvent::Change);
        }
    }

    fn set_value(&mut self, outbox: &mut Outbox, value: f64) {
        if !value.is_finite() {
            let replacement = self.settings.replacement_val.clone();
            if self.write_text(replacement.trim()) {
                self.emit(outbox, SpinEvent::Change);
            }
            return;
        }

        let forced = force_step_divisibility(
            value,
            self.settings.step,
            self.settings.decimals,
            self.settings.force_step_divisibility,
        );
        let value = round_to_decimals(self.settings.clamp(forced), self.settings.decimals);
        let changed = self.write_value(value);

        if self.settings.min == Some(value) {
            self.emit(outbox, SpinEvent::Min);
        }
        if self.settings.max == Some(value) {
            self.emit(outbox, SpinEvent::Max);
        }
        if changed {
            self.emit(outbox, SpinEvent::Change);
        }
    }

    fn start_spin(&mut self, outbox: &mut Outbox, direction: Direction) {
        let Some(next) = self.spin.on_input(SpinInput::Start(direction)) else {
            return;
        };
        self.commit(outbox, true);
        if self.spin.is_spinning() {
            self.end_session(outbox, SpinInput::Stop);
        }

        let generation = self.next_generation;
        self.next_generation += 1;
        let mut session = SpinSession::new(direction, generation);
        session.timer = Some(self.arm(generation, self.settings.step_interval_delay_duration()));
        self.session = Some(session);
        self.spin = next;
        tracing::debug!(?direction, generation, "spin started");

        self.emit(outbox, SpinEvent::StartSpin);
        self.emit(outbox, SpinEvent::start_for(direction));
    }

    /// Schedule the next tick of session `generation`
    fn arm(&self, generation: u64, delay: Duration) -> TimerId {
        let engine = WeakSpinEngine {
            inner: self.self_ref.clone(),
        };
        self.scheduler.schedule_fn(delay, move || {
            if let Some(engine) = engine.upgrade() {
                engine.tick(generation);
            }
        })
    }

    fn tick(&mut self, outbox: &mut Outbox, generation: u64) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.generation != generation {
            tracing::trace!(generation, "stale spin tick ignored");
            return;
        }
        session.timer = None;
        session.ticks = session.ticks.saturating_add(1);
        let (direction, ticks) = (session.direction, session.ticks);

        if self.is_disabled() {
            self.end_session(outbox, SpinInput::Stop);
            return;
        }

        tracing::trace!(?direction, ticks, "spin tick");
        self.step_once(outbox, direction);

        if let Some(session) = self.session {
            if session.generation == generation {
                let timer = self.arm(generation, self.settings.step_interval_duration());
                if let Some(session) = self.session.as_mut() {
                    session.timer = Some(timer);
                }
            }
        }
    }

    /// End the active session, if any, emitting the stop events
    fn end_session(&mut self, outbox: &mut Outbox, input: SpinInput) {
        let Some(session) = self.session.take() else {
            return;
        };
        if let Some(timer) = session.timer {
            self.scheduler.cancel(timer);
        }
        self.spin = self.spin.on_input(input).unwrap_or_default();
        tracing::debug!(
            direction = ?session.direction,
            ticks = session.ticks,
            elapsed = ?session.elapsed(&self.settings),
            ?input,
            "spin stopped"
        );

        self.emit(outbox, SpinEvent::stop_for(session.direction));
        self.emit(outbox, SpinEvent::StopSpin);
    }

    /// Sanitize `partial` over the current settings and propagate changes
    fn apply_settings(&mut self, outbox: &mut Outbox, partial: &PartialSettings) {
        let settings = sanitize(partial, &self.settings);
        let changed = self.settings.changed_keys(&settings);
        if changed.is_empty() {
            return;
        }
        tracing::debug!(?changed, "settings updated");

        let value = self.current_value();
        self.settings = settings;
        if let Some(value) = value {
            let forced = force_step_divisibility(
                value,
                self.settings.step,
                self.settings.decimals,
                self.settings.force_step_divisibility,
            );
            self.write_value(self.settings.clamp(forced));
        }

        outbox.push(Effect::Mirror {
            writer: Arc::clone(&self.writer),
            settings: self.settings.clone(),
        });
        if let Some(renderer) = &self.renderer {
            if changed.iter().any(|key| DECORATION_KEYS.contains(key)) {
                outbox.push(Effect::Decorate {
                    renderer: Arc::clone(renderer),
                    settings: self.settings.clone(),
                });
            }
        }
        if !self.observers.is_empty() {
            outbox.push(Effect::Observe {
                observers: self.observers.values().cloned().collect(),
                settings: self.settings.clone(),
                changed,
            });
        }
    }

    fn attribute_changed(&mut self, outbox: &mut Outbox, attribute: NativeAttribute) {
        match attribute.setting_key() {
            Some(key) if self.user_keys.contains(&key) => {
                tracing::debug!(%attribute, "native attribute overridden by explicit settings");
            }
            Some(_) => {
                let partial = self.bridge.read_attribute(attribute);
                self.apply_settings(outbox, &partial);
            }
            None => {
                let disabled = self.is_disabled();
                tracing::debug!(%attribute, disabled, "host state changed");
                if disabled {
                    self.end_session(outbox, SpinInput::Stop);
                }
                if let Some(renderer) = &self.renderer {
                    outbox.push(Effect::Disable {
                        renderer: Arc::clone(renderer),
                        disabled,
                    });
                }
                return;
            }
        }

        // Settings always win; put back anything the mutation diverged on
        outbox.push(Effect::Mirror {
            writer: Arc::clone(&self.writer),
            settings: self.settings.clone(),
        });
    }

    fn destroy(&mut self, outbox: &mut Outbox) {
        self.end_session(outbox, SpinInput::Destroy);
        self.destroyed = true;
        self.dispatcher.clear();
        self.observers.clear();
        outbox.push(Effect::Detach {
            renderer: self.renderer.take(),
            subscription: self.subscription.take(),
        });
        tracing::debug!("engine destroyed");
    }
}

impl Drop for EngineInner {
    fn drop(&mut self) {
        if let Some(timer) = self.session.and_then(|session| session.timer) {
            self.scheduler.cancel(timer);
        }
        if let Some((observer, id)) = self.subscription.take() {
            observer.unsubscribe(id);
        }
    }
}

// ============================================================================
// Public Handles
// ============================================================================

/// Handle to a spin engine
#[derive(Clone)]
pub struct SpinEngine {
    inner: Arc<Mutex<EngineInner>>,
}

/// Non-owning handle to a spin engine
///
/// Renderers and timers hold this so that they never keep an engine alive.
#[derive(Clone, Default)]
pub struct WeakSpinEngine {
    inner: Weak<Mutex<EngineInner>>,
}

impl WeakSpinEngine {
    pub fn upgrade(&self) -> Option<SpinEngine> {
        self.inner.upgrade().map(|inner| SpinEngine { inner })
    }
}

impl fmt::Debug for WeakSpinEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakSpinEngine")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

impl SpinEngine {
    /// Start building an engine attached to `host`
    pub fn builder(host: Arc<dyn HostInput>) -> SpinEngineBuilder {
        SpinEngineBuilder::new(host)
    }

    fn lock(&self) -> MutexGuard<'_, EngineInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `op` on a live engine, then deliver its effects unlocked
    ///
    /// Returns `None` without running `op` once the engine is destroyed.
    fn with_live<R>(
        &self,
        operation: &'static str,
        op: impl FnOnce(&mut EngineInner, &mut Outbox) -> R,
    ) -> Option<R> {
        let mut outbox = Outbox::default();
        let result = {
            let mut inner = self.lock();
            if inner.destroyed {
                tracing::debug!(operation, "ignored on destroyed engine");
                return None;
            }
            op(&mut inner, &mut outbox)
        };
        outbox.deliver();
        Some(result)
    }

    /// Like [`with_live`](Self::with_live), but also ignored while the host
    /// is disabled or readonly
    fn with_enabled(&self, operation: &'static str, op: impl FnOnce(&mut EngineInner, &mut Outbox)) {
        self.with_live(operation, |inner, outbox| {
            if inner.is_disabled() {
                tracing::debug!(operation, "ignored on disabled input");
                return;
            }
            op(inner, outbox);
        });
    }

    pub fn downgrade(&self) -> WeakSpinEngine {
        WeakSpinEngine {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Whether both handles drive the same engine
    pub fn ptr_eq(&self, other: &SpinEngine) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Current numeric value, `None` when the input is empty or the engine
    /// is destroyed
    pub fn value(&self) -> Option<f64> {
        let inner = self.lock();
        if inner.destroyed {
            return None;
        }
        inner.current_value()
    }

    /// Snapshot of the effective settings
    pub fn settings(&self) -> Settings {
        self.lock().settings.clone()
    }

    pub fn spin_state(&self) -> SpinState {
        self.lock().spin
    }

    /// Active spin session, if any
    pub fn spin_session(&self) -> Option<SpinSession> {
        self.lock().session
    }

    /// Whether the host is disabled or readonly
    pub fn is_disabled(&self) -> bool {
        self.lock().is_disabled()
    }

    pub fn is_destroyed(&self) -> bool {
        self.lock().destroyed
    }

    /// The host input this engine is attached to
    pub fn host(&self) -> Arc<dyn HostInput> {
        Arc::clone(&self.lock().host)
    }

    // ------------------------------------------------------------------------
    // Value Operations
    // ------------------------------------------------------------------------

    /// Set the value, forced onto the step and clamped to the bounds
    ///
    /// A non-finite value empties the input (or writes `replacementval`).
    /// Allowed while the host is disabled.
    pub fn set_value(&self, value: f64) {
        self.with_live("set_value", |inner, outbox| inner.set_value(outbox, value));
    }

    /// Step up once, by the boosted step while a spin session is active
    pub fn up_once(&self) {
        self.with_enabled("up_once", |inner, outbox| {
            inner.step_once(outbox, Direction::Up)
        });
    }

    /// Step down once, by the boosted step while a spin session is active
    pub fn down_once(&self) {
        self.with_enabled("down_once", |inner, outbox| {
            inner.step_once(outbox, Direction::Down)
        });
    }

    /// Normalize whatever text the user typed into the host
    pub fn commit(&self) {
        self.with_live("commit", |inner, outbox| inner.commit(outbox, true));
    }

    // ------------------------------------------------------------------------
    // Spinning
    // ------------------------------------------------------------------------

    /// Start a spin session
    ///
    /// The first step is taken after `stepintervaldelay`, then one every
    /// `stepinterval`. An opposite session is stopped first; a session in
    /// the same direction keeps running.
    pub fn start_spin(&self, direction: Direction) {
        self.with_enabled("start_spin", |inner, outbox| {
            inner.start_spin(outbox, direction)
        });
    }

    /// Stop the active spin session; no-op when idle
    pub fn stop_spin(&self) {
        self.with_live("stop_spin", |inner, outbox| {
            inner.end_session(outbox, SpinInput::Stop)
        });
    }

    fn tick(&self, generation: u64) {
        self.with_live("tick", |inner, outbox| inner.tick(outbox, generation));
    }

    // ------------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------------

    /// Layer `partial` over the current settings
    ///
    /// Supplied keys become user-owned: later native attribute mutations
    /// will not override them. An empty overlay is a no-op.
    pub fn update_settings(&self, partial: PartialSettings) {
        if partial.is_empty() {
            return;
        }
        self.with_live("update_settings", |inner, outbox| {
            inner.user_keys.extend(partial.keys());
            inner.apply_settings(outbox, &partial);
        });
    }

    /// [`update_settings`](Self::update_settings) from a JSON option object
    ///
    /// `null` and `{}` are no-ops.
    pub fn update_settings_json(&self, options: &Value) {
        self.update_settings(PartialSettings::from_json(options));
    }

    /// Register a settings observer
    pub fn observe_settings<F>(&self, callback: F) -> ObserverId
    where
        F: Fn(&Settings, &[SettingKey]) + Send + Sync + 'static,
    {
        self.with_live("observe_settings", |inner, _| {
            inner.observers.insert(Arc::new(callback))
        })
        .unwrap_or_default()
    }

    /// Remove a settings observer; returns whether it was registered
    pub fn unobserve_settings(&self, id: ObserverId) -> bool {
        self.lock().observers.remove(id).is_some()
    }

    fn handle_attribute(&self, attribute: NativeAttribute) {
        self.with_live("attribute_changed", |inner, outbox| {
            inner.attribute_changed(outbox, attribute)
        });
    }

    // ------------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------------

    /// Listen to one event
    pub fn on<F>(&self, event: SpinEvent, callback: F) -> ListenerId
    where
        F: Fn(&SpinEventData) + Send + Sync + 'static,
    {
        self.with_live("on", |inner, _| inner.dispatcher.on(event, callback))
            .unwrap_or_default()
    }

    /// Listen to every event
    pub fn on_any<F>(&self, callback: F) -> ListenerId
    where
        F: Fn(&SpinEventData) + Send + Sync + 'static,
    {
        self.with_live("on_any", |inner, _| inner.dispatcher.on_any(callback))
            .unwrap_or_default()
    }

    /// Remove a listener; returns whether it was registered
    pub fn off(&self, id: ListenerId) -> bool {
        self.lock().dispatcher.off(id)
    }

    // ------------------------------------------------------------------------
    // Teardown
    // ------------------------------------------------------------------------

    /// Stop spinning, detach from the host and tear down the renderer
    ///
    /// Every later operation is silently ignored. Idempotent.
    pub fn destroy(&self) {
        self.with_live("destroy", |inner, outbox| inner.destroy(outbox));
    }
}

impl fmt::Debug for SpinEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock();
        f.debug_struct("SpinEngine")
            .field("text", &inner.host.value())
            .field("spin", &inner.spin)
            .field("destroyed", &inner.destroyed)
            .finish()
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`SpinEngine`]
///
/// Settings are resolved from, highest precedence first: explicit
/// settings, `data-bts-*` attributes, native `min`/`max`/`step`, the
/// defaults provider, the renderer's defaults, built-in defaults.
pub struct SpinEngineBuilder {
    host: Arc<dyn HostInput>,
    settings: PartialSettings,
    data_attributes: bool,
    defaults: Option<SharedDefaults>,
    renderer: Option<SharedRenderer>,
    scheduler: Option<SharedScheduler>,
    observer: Option<Arc<dyn AttributeObserver>>,
    writer: Option<Arc<dyn AttributeWriter>>,
}

impl SpinEngineBuilder {
    pub fn new(host: Arc<dyn HostInput>) -> Self {
        Self {
            host,
            settings: PartialSettings::new(),
            data_attributes: true,
            defaults: None,
            renderer: None,
            scheduler: None,
            observer: None,
            writer: None,
        }
    }

    /// Explicit settings
    pub fn settings(mut self, settings: PartialSettings) -> Self {
        self.settings.overlay(&settings);
        self
    }

    /// Explicit settings from a JSON option object
    pub fn settings_json(self, options: &Value) -> Self {
        self.settings(PartialSettings::from_json(options))
    }

    /// Whether to read `data-bts-*` attributes from the host (default on)
    pub fn data_attributes(mut self, enabled: bool) -> Self {
        self.data_attributes = enabled;
        self
    }

    /// Shared defaults below every page or caller source
    pub fn defaults(mut self, defaults: SharedDefaults) -> Self {
        self.defaults = Some(defaults);
        self
    }

    pub fn renderer(mut self, renderer: SharedRenderer) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Timer source for spinning (default: the process-wide background
    /// scheduler)
    pub fn scheduler(mut self, scheduler: SharedScheduler) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Source of native attribute mutations to follow
    pub fn attribute_observer(mut self, observer: Arc<dyn AttributeObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Replace the standard attribute mirroring
    pub fn attribute_writer(mut self, writer: Arc<dyn AttributeWriter>) -> Self {
        self.writer = Some(writer);
        self
    }

    /// Resolve settings, initialize the host text and build the markup
    ///
    /// Fails only when the renderer cannot build what the settings ask for.
    pub fn build(self) -> Result<SpinEngine> {
        let host = self.host;
        let bridge = AttributeBridge::new(Arc::clone(&host));

        let data = if self.data_attributes {
            parse_data_attributes(|name| host.attribute(name))
        } else {
            PartialSettings::new()
        };
        let resolved = self
            .renderer
            .as_ref()
            .map(|renderer| renderer.default_settings())
            .unwrap_or_default()
            .merged(
                &self
                    .defaults
                    .as_ref()
                    .map(|defaults| defaults.default_settings())
                    .unwrap_or_default(),
            )
            .merged(&bridge.read_native())
            .merged(&data)
            .merged(&self.settings);
        let settings = sanitize(&resolved, &Settings::default());

        let mut user_keys = FxHashSet::default();
        user_keys.extend(data.keys());
        user_keys.extend(self.settings.keys());

        let writer = self
            .writer
            .unwrap_or_else(|| Arc::new(AttributeBridge::new(Arc::clone(&host))));
        let scheduler = self.scheduler.unwrap_or_else(shared_background);
        let renderer = self.renderer;

        let inner = Arc::new_cyclic(|self_ref| {
            Mutex::new(EngineInner {
                host: Arc::clone(&host),
                settings: settings.clone(),
                user_keys,
                spin: SpinState::Idle,
                session: None,
                next_generation: 0,
                dispatcher: EventDispatcher::new(),
                observers: SlotMap::with_key(),
                scheduler,
                renderer: renderer.clone(),
                bridge,
                writer: Arc::clone(&writer),
                subscription: None,
                destroyed: false,
                self_ref: self_ref.clone(),
            })
        });
        let engine = SpinEngine { inner };

        {
            let inner = engine.lock();
            if inner.host.value().trim().is_empty() && !settings.init_val.is_empty() {
                inner.host.set_value(&settings.init_val);
            }
            // Initial normalization is not a user-visible change
            inner.commit(&mut Outbox::default(), false);
        }

        if let Some(renderer) = &renderer {
            let ctx = RenderContext {
                settings: &settings,
                host: host.as_ref(),
                engine: engine.downgrade(),
            };
            let (hook, built) = if settings.vertical_buttons {
                ("build_vertical_buttons", renderer.build_vertical_buttons(&ctx))
            } else {
                ("build_input_group", renderer.build_input_group(&ctx))
            };
            built.map_err(|err| EngineError::from_render(renderer.name(), hook, err))?;
            renderer.update_prefix_postfix(&settings);
            if host.is_disabled() || host.is_readonly() {
                renderer.set_disabled(true);
            }
        }

        writer.apply(&settings);

        if let Some(observer) = self.observer {
            let weak = engine.downgrade();
            let id = observer.subscribe(Arc::new(move |attribute| {
                if let Some(engine) = weak.upgrade() {
                    engine.handle_attribute(attribute);
                }
            }));
            engine.lock().subscription = Some((observer, id));
        }

        tracing::debug!(
            renderer = ?renderer.as_ref().map(|r| r.name().to_string()),
            number_input = host.is_number_input(),
            "engine built"
        );
        Ok(engine)
    }
}

impl fmt::Debug for SpinEngineBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpinEngineBuilder")
            .field("settings", &self.settings)
            .field("data_attributes", &self.data_attributes)
            .field("renderer", &self.renderer.as_ref().map(|r| r.name().to_string()))
            .finish()
    }
}
