//! User interaction mapping
//!
//! Renderers forward raw pointer, keyboard and wheel input here instead of
//! re-implementing the press-and-hold rules for every framework.

use std::str::FromStr;

use touchspin_core::Direction;

use crate::engine::SpinEngine;

/// Keys the spinner reacts to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    Enter,
    Other,
}

impl Key {
    /// Stepping direction bound to this key
    pub fn direction(&self) -> Option<Direction> {
        match self {
            Key::ArrowUp => Some(Direction::Up),
            Key::ArrowDown => Some(Direction::Down),
            Key::Enter | Key::Other => None,
        }
    }
}

impl FromStr for Key {
    type Err = std::convert::Infallible;

    /// Parse a DOM `KeyboardEvent.key` value
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "ArrowUp" | "Up" => Key::ArrowUp,
            "ArrowDown" | "Down" => Key::ArrowDown,
            "Enter" => Key::Enter,
            _ => Key::Other,
        })
    }
}

impl SpinEngine {
    /// Button pressed: step once, then keep spinning while held
    pub fn press(&self, direction: Direction) {
        if self.is_disabled() {
            return;
        }
        match direction {
            Direction::Up => self.up_once(),
            Direction::Down => self.down_once(),
        }
        self.start_spin(direction);
    }

    /// Button released or pointer left the button
    pub fn release(&self) {
        self.stop_spin();
    }

    /// Key pressed; returns whether the key was handled
    ///
    /// Auto-repeated key downs while already spinning in the key's direction
    /// are swallowed.
    pub fn key_down(&self, key: Key) -> bool {
        match key {
            Key::Enter => {
                self.commit();
                true
            }
            Key::ArrowUp | Key::ArrowDown => {
                let Some(direction) = key.direction() else {
                    return false;
                };
                if self.spin_state().direction() != Some(direction) {
                    self.press(direction);
                }
                true
            }
            Key::Other => false,
        }
    }

    /// Key released; returns whether the key was handled
    pub fn key_up(&self, key: Key) -> bool {
        if key.direction().is_some() {
            self.stop_spin();
            return true;
        }
        false
    }

    /// Mouse wheel over the input; returns whether the wheel was consumed
    ///
    /// Only acts when `mousewheel` is enabled and the input has focus.
    /// Scrolling up (negative `delta_y`) steps up.
    pub fn wheel(&self, delta_y: f64, focused: bool) -> bool {
        if !focused || !self.settings().mousewheel || self.is_destroyed() {
            return false;
        }
        if delta_y < 0.0 {
            self.up_once();
        } else if delta_y > 0.0 {
            self.down_once();
        } else {
            return false;
        }
        true
    }

    /// Input lost focus: normalize the typed text
    pub fn blur(&self) {
        self.commit();
    }
}
