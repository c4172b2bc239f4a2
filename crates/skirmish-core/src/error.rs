//! Error types for the `skirmish-core` crate.
//!
//! Per-entity problems during a tick never surface here; they become
//! domain events. [`CombatError`] covers setup mistakes and broken
//! invariants of the state machine itself.

use skirmish_ecs::EcsError;
use skirmish_grid::GridError;
use skirmish_types::{CombatState, Key, SizeClass, SkillId};

use crate::clock::ClockError;

/// Errors raised by the combat manager and its systems.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CombatError {
    /// The state machine was asked to make a move its table forbids.
    #[error("illegal transition from {from} to {to}")]
    IllegalTransition {
        /// Current state.
        from: CombatState,
        /// Requested state.
        to: CombatState,
    },

    /// An occupant does not fit, or overlaps an impassable obstacle.
    #[error("cannot place {size:?} occupant at {anchor}")]
    InvalidPlacement {
        /// Requested anchor.
        anchor: Key,
        /// Requested size class.
        size: SizeClass,
    },

    /// A skillbook names a skill the catalog does not define.
    #[error("unknown skill: {0}")]
    UnknownSkill(SkillId),

    /// Two catalog entries share an id.
    #[error("duplicate skill id: {0}")]
    DuplicateSkill(SkillId),

    /// A configuration value is out of range.
    #[error("invalid encounter configuration: {reason}")]
    InvalidConfig {
        /// What is wrong.
        reason: String,
    },

    /// World store failure.
    #[error("world error: {source}")]
    Ecs {
        /// The underlying store error.
        #[from]
        source: EcsError,
    },

    /// Field construction failure.
    #[error("grid error: {source}")]
    Grid {
        /// The underlying grid error.
        #[from]
        source: GridError,
    },

    /// Clock failure.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },
}
