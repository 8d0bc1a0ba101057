//! Host input port
//!
//! The engine never touches a DOM directly. It reads and writes the host
//! `<input>` element through [`HostInput`], and adapters implement it over
//! whatever element type their platform has.
//!
//! [`MemoryInput`] is a complete in-memory element used by headless hosts
//! and by tests.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use smallvec::SmallVec;

use crate::bridge::{AttributeCallback, AttributeObserver, NativeAttribute, SubscriptionId};

/// The `<input>` element an engine is attached to
///
/// Methods take `&self`; implementations use interior mutability because the
/// element is shared between the engine, its renderer and the adapter.
pub trait HostInput: Send + Sync {
    /// The `type` of the input (`"number"`, `"text"`, ...)
    fn input_type(&self) -> String;

    /// Current text content
    fn value(&self) -> String;

    /// Replace the text content
    fn set_value(&self, text: &str);

    /// Attribute value, `None` when absent
    fn attribute(&self, name: &str) -> Option<String>;

    fn set_attribute(&self, name: &str, value: &str);

    fn remove_attribute(&self, name: &str);

    /// Whether this is an `<input type="number">`
    fn is_number_input(&self) -> bool {
        self.input_type().eq_ignore_ascii_case("number")
    }

    fn is_disabled(&self) -> bool {
        self.attribute(NativeAttribute::Disabled.name()).is_some()
    }

    fn is_readonly(&self) -> bool {
        self.attribute(NativeAttribute::Readonly.name()).is_some()
    }
}

#[derive(Default)]
struct MemoryState {
    input_type: String,
    value: String,
    attributes: FxHashMap<String, String>,
    subscribers: SlotMap<SubscriptionId, AttributeCallback>,
}

/// In-memory `<input>` element
///
/// Attribute changes on `min`, `max`, `step`, `disabled` and `readonly` are
/// reported to subscribers after the element's own lock is released, so a
/// subscriber may read or write the element again. Writing an attribute
/// with its current value is not a change and is not reported.
#[derive(Default)]
pub struct MemoryInput {
    state: Mutex<MemoryState>,
}

impl MemoryInput {
    /// Create an input of the given `type`
    pub fn new(input_type: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                input_type: input_type.into(),
                ..MemoryState::default()
            }),
        }
    }

    /// `<input type="number">`
    pub fn number() -> Self {
        Self::new("number")
    }

    /// `<input type="text">`
    pub fn text() -> Self {
        Self::new("text")
    }

    /// Set the initial text content
    pub fn with_value(self, value: impl Into<String>) -> Self {
        self.lock().value = value.into();
        self
    }

    /// Set an initial attribute without notifying anyone
    pub fn with_attribute(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.lock().attributes.insert(name.into(), value.into());
        self
    }

    /// Wrap in an `Arc` for sharing with an engine
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Number of active attribute subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self, name: &str) {
        let Some(attribute) = NativeAttribute::from_name(name) else {
            return;
        };
        let callbacks: SmallVec<[AttributeCallback; 2]> =
            self.lock().subscribers.values().cloned().collect();
        for callback in callbacks {
            callback(attribute);
        }
    }
}

impl HostInput for MemoryInput {
    fn input_type(&self) -> String {
        self.lock().input_type.clone()
    }

    fn value(&self) -> String {
        self.lock().value.clone()
    }

    fn set_value(&self, text: &str) {
        self.lock().value = text.to_string();
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.lock().attributes.get(name).cloned()
    }

    fn set_attribute(&self, name: &str, value: &str) {
        let previous = self
            .lock()
            .attributes
            .insert(name.to_string(), value.to_string());
        if previous.as_deref() != Some(value) {
            self.notify(name);
        }
    }

    fn remove_attribute(&self, name: &str) {
        let removed = self.lock().attributes.remove(name);
        if removed.is_some() {
            self.notify(name);
        }
    }
}

impl AttributeObserver for MemoryInput {
    fn subscribe(&self, callback: AttributeCallback) -> SubscriptionId {
        self.lock().subscribers.insert(callback)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.lock().subscribers.remove(id);
    }
}

impl std::fmt::Debug for MemoryInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("MemoryInput")
            .field("type", &state.input_type)
            .field("value", &state.value)
            .field("attributes", &state.attributes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_input_attributes() {
        let input = MemoryInput::number()
            .with_value("5")
            .with_attribute("min", "0");

        assert!(input.is_number_input());
        assert_eq!(input.value(), "5");
        assert_eq!(input.attribute("min").as_deref(), Some("0"));
        assert!(!input.is_disabled());

        input.set_attribute("readonly", "");
        assert!(input.is_readonly());
        input.remove_attribute("readonly");
        assert!(!input.is_readonly());
    }

    #[test]
    fn test_memory_input_notifies_on_change_only() {
        let input = MemoryInput::text().with_attribute("max", "10");
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let id = input.subscribe(Arc::new(move |attr| sink.lock().unwrap().push(attr)));

        input.set_attribute("max", "10");
        input.set_attribute("max", "20");
        input.set_attribute("placeholder", "n");
        input.remove_attribute("max");
        input.remove_attribute("max");
        input.set_attribute("disabled", "");

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                NativeAttribute::Max,
                NativeAttribute::Max,
                NativeAttribute::Disabled
            ]
        );

        input.unsubscribe(id);
        assert_eq!(input.subscriber_count(), 0);
    }

    #[test]
    fn test_subscriber_may_reenter_input() {
        let input = Arc::new(MemoryInput::number());
        let weak = Arc::downgrade(&input);
        input.subscribe(Arc::new(move |_| {
            if let Some(input) = weak.upgrade() {
                let _ = input.attribute("step");
                input.set_value("reentered");
            }
        }));

        input.set_attribute("step", "2");
        assert_eq!(input.value(), "reentered");
    }
}
