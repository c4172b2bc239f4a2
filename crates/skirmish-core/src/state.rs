//! The encounter state machine.
//!
//! ```text
//! Uninitialised -> FadingIn -> Preparing -> AwaitingInput | Thinking
//!     -> SelectingTarget -> ConfirmingSelectedTarget -> Executing
//!     -> AwaitingInput | Thinking -> ... -> Preparing (end turn)
//! any turn phase or Preparing -> Celebration -> FadingOut
//! ```
//!
//! Every accepted transition is broadcast as `StateTransition`. Requests
//! the table forbids are logged and refused with
//! [`CombatError::IllegalTransition`]; the state is left untouched.

use skirmish_events::{Event, EventBus};
use skirmish_types::CombatState;
use tracing::{debug, warn};

use crate::error::CombatError;

/// Whether the transition `from -> to` is permitted.
pub const fn can_transition(from: CombatState, to: CombatState) -> bool {
    use CombatState::{
        AwaitingInput, Celebration, ConfirmingSelectedTarget, Executing, FadingIn, FadingOut,
        Preparing, SelectingTarget, Thinking, Uninitialised,
    };
    matches!(
        (from, to),
        (Uninitialised, FadingIn)
            | (FadingIn, Preparing)
            | (Preparing, AwaitingInput | Thinking | Celebration)
            | (AwaitingInput | Thinking, SelectingTarget | Preparing | Celebration)
            | (
                SelectingTarget,
                ConfirmingSelectedTarget | AwaitingInput | Thinking | Preparing | Celebration
            )
            | (
                ConfirmingSelectedTarget,
                Executing | SelectingTarget | Preparing | Celebration
            )
            | (Executing, AwaitingInput | Thinking | Preparing | Celebration)
            | (Celebration, FadingOut)
    )
}

/// Holds the current [`CombatState`] and enforces the transition table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateMachine {
    state: CombatState,
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StateMachine {
    /// A machine in `Uninitialised`.
    pub const fn new() -> Self {
        Self {
            state: CombatState::Uninitialised,
        }
    }

    /// The current state.
    pub const fn state(&self) -> CombatState {
        self.state
    }

    /// Move to `to` and publish the transition.
    ///
    /// # Errors
    ///
    /// Returns [`CombatError::IllegalTransition`] when the table forbids
    /// the move.
    pub fn transition(&mut self, to: CombatState, bus: &EventBus) -> Result<(), CombatError> {
        let from = self.state;
        if !can_transition(from, to) {
            warn!(%from, %to, "Illegal state transition refused");
            return Err(CombatError::IllegalTransition { from, to });
        }
        self.state = to;
        debug!(%from, %to, "State transition");
        bus.publish(&Event::StateTransition { old: from, new: to });
        Ok(())
    }
}
