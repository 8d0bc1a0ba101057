//! Spin event contract
//!
//! Framework-agnostic event names emitted by the engine. Adapters map them
//! onto their own event systems (`touchspin.on.min`, DOM `change`, ...).
//!
//! Listeners are stored behind `Arc` so that a dispatcher can hand out a
//! snapshot of the callbacks for an event and release its lock before
//! invoking them; a listener is then free to call back into the engine.

use std::fmt;
use std::sync::Arc;

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

use crate::step::Direction;

/// Events emitted by a spin engine
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpinEvent {
    /// Value arrived at the lower bound
    Min,
    /// Value arrived at the upper bound
    Max,
    /// A spin session started (either direction)
    StartSpin,
    StartUpSpin,
    StartDownSpin,
    /// A spin session ended (either direction)
    StopSpin,
    StopUpSpin,
    StopDownSpin,
    /// Displayed text changed
    Change,
}

impl SpinEvent {
    /// Every event, in declaration order
    pub const ALL: [SpinEvent; 9] = [
        SpinEvent::Min,
        SpinEvent::Max,
        SpinEvent::StartSpin,
        SpinEvent::StartUpSpin,
        SpinEvent::StartDownSpin,
        SpinEvent::StopSpin,
        SpinEvent::StopUpSpin,
        SpinEvent::StopDownSpin,
        SpinEvent::Change,
    ];

    /// Framework-agnostic event name
    pub fn name(&self) -> &'static str {
        match self {
            SpinEvent::Min => "min",
            SpinEvent::Max => "max",
            SpinEvent::StartSpin => "startspin",
            SpinEvent::StartUpSpin => "startupspin",
            SpinEvent::StartDownSpin => "startdownspin",
            SpinEvent::StopSpin => "stopspin",
            SpinEvent::StopUpSpin => "stopupspin",
            SpinEvent::StopDownSpin => "stopdownspin",
            SpinEvent::Change => "change",
        }
    }

    /// Direction-specific start event
    pub fn start_for(direction: Direction) -> Self {
        match direction {
            Direction::Up => SpinEvent::StartUpSpin,
            Direction::Down => SpinEvent::StartDownSpin,
        }
    }

    /// Direction-specific stop event
    pub fn stop_for(direction: Direction) -> Self {
        match direction {
            Direction::Up => SpinEvent::StopUpSpin,
            Direction::Down => SpinEvent::StopDownSpin,
        }
    }

    /// Boundary event reached when stepping in `direction`
    pub fn boundary_for(direction: Direction) -> Self {
        match direction {
            Direction::Up => SpinEvent::Max,
            Direction::Down => SpinEvent::Min,
        }
    }
}

impl fmt::Display for SpinEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An emitted event with the engine value at emission time
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpinEventData {
    pub event: SpinEvent,
    /// Current numeric value, `None` when the input is empty
    pub value: Option<f64>,
}

impl SpinEventData {
    pub fn new(event: SpinEvent, value: Option<f64>) -> Self {
        Self { event, value }
    }
}

/// Listener callback
pub type EventCallback = Arc<dyn Fn(&SpinEventData) + Send + Sync>;

new_key_type! {
    /// Handle to a registered listener
    pub struct ListenerId;
}

struct Listener {
    /// `None` listens to every event
    filter: Option<SpinEvent>,
    callback: EventCallback,
}

/// Registry of event listeners
#[derive(Default)]
pub struct EventDispatcher {
    listeners: SlotMap<ListenerId, Listener>,
}

impl EventDispatcher {
    /// Create an empty dispatcher
    pub fn new() -> Self {
        Self::default()
    }

    /// Listen to a single event
    pub fn on<F>(&mut self, event: SpinEvent, callback: F) -> ListenerId
    where
        F: Fn(&SpinEventData) + Send + Sync + 'static,
    {
        self.listeners.insert(Listener {
            filter: Some(event),
            callback: Arc::new(callback),
        })
    }

    /// Listen to every event
    pub fn on_any<F>(&mut self, callback: F) -> ListenerId
    where
        F: Fn(&SpinEventData) + Send + Sync + 'static,
    {
        self.listeners.insert(Listener {
            filter: None,
            callback: Arc::new(callback),
        })
    }

    /// Remove a listener; returns whether it was registered
    pub fn off(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id).is_some()
    }

    /// Remove every listener
    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    /// Number of registered listeners
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Callbacks interested in `event`
    pub fn listeners_for(&self, event: SpinEvent) -> SmallVec<[EventCallback; 4]> {
        self.listeners
            .values()
            .filter(|listener| listener.filter.map_or(true, |filter| filter == event))
            .map(|listener| Arc::clone(&listener.callback))
            .collect()
    }
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
