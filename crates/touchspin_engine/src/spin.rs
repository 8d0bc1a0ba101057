//! Continuous spin state machine
//!
//! ```text
//!            Start(Up)                Start(Down)
//!   Idle ─────────────► SpinningUp ◄──────────────► SpinningDown
//!    ▲                      │        Start(Up)            │
//!    └──── Stop / Boundary / Destroy ─────────────────────┘
//! ```
//!
//! Starting the direction that is already spinning is not a transition.

use std::time::Duration;

use touchspin_core::{Direction, Settings};
use touchspin_scheduler::TimerId;

/// Largest booster exponent; `2^60` steps is far past any useful range
const MAX_BOOST_EXPONENT: u32 = 60;

/// Spin state of an engine
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SpinState {
    #[default]
    Idle,
    SpinningUp,
    SpinningDown,
}

/// Inputs driving [`SpinState`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpinInput {
    Start(Direction),
    Stop,
    BoundaryReached,
    Destroy,
}

impl SpinState {
    fn spinning(direction: Direction) -> Self {
        match direction {
            Direction::Up => SpinState::SpinningUp,
            Direction::Down => SpinState::SpinningDown,
        }
    }

    /// Direction of the active session, `None` when idle
    pub fn direction(&self) -> Option<Direction> {
        match self {
            SpinState::Idle => None,
            SpinState::SpinningUp => Some(Direction::Up),
            SpinState::SpinningDown => Some(Direction::Down),
        }
    }

    pub fn is_spinning(&self) -> bool {
        !matches!(self, SpinState::Idle)
    }

    /// Handle an input and return the new state, or `None` if no transition
    pub fn on_input(&self, input: SpinInput) -> Option<Self> {
        match (self, input) {
            (SpinState::Idle, SpinInput::Start(direction)) => Some(Self::spinning(direction)),
            (SpinState::Idle, _) => None,

            (SpinState::SpinningUp, SpinInput::Start(Direction::Up))
            | (SpinState::SpinningDown, SpinInput::Start(Direction::Down)) => None,
            // Direction switch; the caller emits stop-then-start
            (_, SpinInput::Start(direction)) => Some(Self::spinning(direction)),

            (_, SpinInput::Stop | SpinInput::BoundaryReached | SpinInput::Destroy) => {
                Some(SpinState::Idle)
            }
        }
    }
}

/// One press-and-hold session
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpinSession {
    pub direction: Direction,
    /// Steps taken so far
    pub ticks: u32,
    /// Pending timer for the next step
    pub(crate) timer: Option<TimerId>,
    /// Distinguishes this session's timers from those of earlier sessions
    pub(crate) generation: u64,
}

impl SpinSession {
    pub(crate) fn new(direction: Direction, generation: u64) -> Self {
        Self {
            direction,
            ticks: 0,
            timer: None,
            generation,
        }
    }

    /// Time the button has been held when the current tick fired
    pub fn elapsed(&self, settings: &Settings) -> Duration {
        match self.ticks {
            0 => Duration::ZERO,
            ticks => {
                settings.step_interval_delay_duration()
                    + settings.step_interval_duration() * (ticks - 1)
            }
        }
    }
}

/// Effective step for a tick
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoostedStep {
    pub step: f64,
    /// The step was limited by `maxboostedstep`
    pub capped: bool,
}

/// Step to apply on tick number `ticks` of a session
///
/// With the booster enabled the step doubles every `boostat` ticks. A
/// `maxboostedstep` caps the result, but never below the plain step.
pub fn boosted_step(settings: &Settings, ticks: u32) -> BoostedStep {
    if !settings.booster {
        return BoostedStep {
            step: settings.step,
            capped: false,
        };
    }

    let exponent = (ticks / settings.boost_at.max(1)).min(MAX_BOOST_EXPONENT);
    let boosted = settings.step * 2f64.powi(exponent as i32);

    match settings.max_boosted_step {
        Some(cap) if boosted > cap => BoostedStep {
            step: cap.max(settings.step),
            capped: true,
        },
        _ => BoostedStep {
            step: boosted,
            capped: false,
        },
    }
}
