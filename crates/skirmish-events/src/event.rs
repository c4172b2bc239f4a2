//! Domain events announced by the combat core.
//!
//! Every state change external layers care about (renderer, HUD, audio) is
//! expressed as one [`Event`] variant. Subscribers register per
//! [`EventKind`], the fieldless mirror of the variants.

use serde::Serialize;
use skirmish_types::{CombatState, Entity, Faction, Key, RejectionReason, SkillId, Stat};

/// Why damage could not be delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageFailure {
    /// The target entity no longer exists.
    TargetMissing,
    /// The target has no health to reduce.
    NoHealth,
}

/// A change notification published on the [`EventBus`].
///
/// [`EventBus`]: crate::EventBus
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Event {
    /// The encounter state machine moved.
    StateTransition {
        /// State before the transition.
        old: CombatState,
        /// State after the transition.
        new: CombatState,
    },

    /// An actor received the turn token.
    TurnGranted {
        /// The new token holder.
        entity: Entity,
    },

    /// An actor gave up the turn token.
    TurnEnded {
        /// The former token holder.
        entity: Entity,
    },

    /// An actor started walking a resolved path.
    MovementCommenced {
        /// The mover.
        entity: Entity,
        /// Anchor before moving.
        from: Key,
        /// Final anchor of the path.
        destination: Key,
        /// Number of waypoints.
        steps: usize,
        /// Cumulative cost of the whole path.
        cost: f64,
    },

    /// An actor reached one waypoint.
    MovementProgressed {
        /// The mover.
        entity: Entity,
        /// Anchor just reached.
        at: Key,
        /// Cumulative path cost up to this waypoint.
        cumulative_cost: f64,
    },

    /// An actor stopped moving, either at its destination or without moving
    /// at all when no route could be resolved.
    MovementConcluded {
        /// The mover.
        entity: Entity,
        /// Anchor where the actor stands now.
        at: Key,
        /// Whether the actor left its starting hex.
        moved: bool,
    },

    /// A numeric statistic changed.
    StatModified {
        /// The actor whose stat changed.
        entity: Entity,
        /// Which stat.
        stat: Stat,
        /// Signed change.
        delta: f64,
        /// Value after the change.
        current: f64,
    },

    /// A skill produced damage aimed at a target.
    DamageApplied {
        /// The attacker.
        source: Entity,
        /// The defender.
        target: Entity,
        /// Damage before it is taken.
        amount: u32,
    },

    /// The target absorbed damage.
    DamageAccepted {
        /// The defender.
        target: Entity,
        /// Damage taken.
        amount: u32,
        /// Health left afterwards.
        remaining: i32,
    },

    /// Damage could not be delivered.
    DamageFailed {
        /// The attacker.
        source: Entity,
        /// The intended defender.
        target: Entity,
        /// What went wrong.
        reason: DamageFailure,
    },

    /// The token holder picked a skill and is choosing a target.
    SkillSelected {
        /// The token holder.
        entity: Entity,
        /// The chosen skill.
        skill: SkillId,
    },

    /// The token holder picked a target and awaits confirmation.
    TargetSelected {
        /// The token holder.
        entity: Entity,
        /// The chosen skill.
        skill: SkillId,
        /// The chosen hex.
        target: Key,
    },

    /// A request was refused.
    SkillRejected {
        /// The requesting actor, if anyone held the turn.
        entity: Option<Entity>,
        /// The skill involved, if any.
        skill: Option<SkillId>,
        /// Why it was refused.
        reason: RejectionReason,
    },

    /// A confirmed skill finished resolving.
    SkillConcluded {
        /// The user.
        entity: Entity,
        /// The skill that resolved.
        skill: SkillId,
        /// Action points spent.
        action_points_spent: u32,
    },

    /// The hex under the pointer changed.
    HoverChanged {
        /// The hovered hex, if the pointer is over the field.
        key: Option<Key>,
        /// Cost of moving there, while a move target is being chosen and a
        /// route exists.
        preview_cost: Option<f64>,
    },

    /// An actor was removed from the encounter.
    ActorDefeated {
        /// The fallen actor.
        entity: Entity,
    },

    /// One side has no actors left.
    EncounterConcluded {
        /// The surviving side.
        winner: Faction,
    },
}

/// Fieldless tag naming an [`Event`] variant; the subscription key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// [`Event::StateTransition`].
    StateTransition,
    /// [`Event::TurnGranted`].
    TurnGranted,
    /// [`Event::TurnEnded`].
    TurnEnded,
    /// [`Event::MovementCommenced`].
    MovementCommenced,
    /// [`Event::MovementProgressed`].
    MovementProgressed,
    /// [`Event::MovementConcluded`].
    MovementConcluded,
    /// [`Event::StatModified`].
    StatModified,
    /// [`Event::DamageApplied`].
    DamageApplied,
    /// [`Event::DamageAccepted`].
    DamageAccepted,
    /// [`Event::DamageFailed`].
    DamageFailed,
    /// [`Event::SkillSelected`].
    SkillSelected,
    /// [`Event::TargetSelected`].
    TargetSelected,
    /// [`Event::SkillRejected`].
    SkillRejected,
    /// [`Event::SkillConcluded`].
    SkillConcluded,
    /// [`Event::HoverChanged`].
    HoverChanged,
    /// [`Event::ActorDefeated`].
    ActorDefeated,
    /// [`Event::EncounterConcluded`].
    EncounterConcluded,
}

impl Event {
    /// The subscription key of this event.
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::StateTransition { .. } => EventKind::StateTransition,
            Self::TurnGranted { .. } => EventKind::TurnGranted,
            Self::TurnEnded { .. } => EventKind::TurnEnded,
            Self::MovementCommenced { .. } => EventKind::MovementCommenced,
            Self::MovementProgressed { .. } => EventKind::MovementProgressed,
            Self::MovementConcluded { .. } => EventKind::MovementConcluded,
            Self::StatModified { .. } => EventKind::StatModified,
            Self::DamageApplied { .. } => EventKind::DamageApplied,
            Self::DamageAccepted { .. } => EventKind::DamageAccepted,
            Self::DamageFailed { .. } => EventKind::DamageFailed,
            Self::SkillSelected { .. } => EventKind::SkillSelected,
            Self::TargetSelected { .. } => EventKind::TargetSelected,
            Self::SkillRejected { .. } => EventKind::SkillRejected,
            Self::SkillConcluded { .. } => EventKind::SkillConcluded,
            Self::HoverChanged { .. } => EventKind::HoverChanged,
            Self::ActorDefeated { .. } => EventKind::ActorDefeated,
            Self::EncounterConcluded { .. } => EventKind::EncounterConcluded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        let event = Event::TurnGranted {
            entity: Entity::from_raw(1),
        };
        assert_eq!(event.kind(), EventKind::TurnGranted);
        let event = Event::EncounterConcluded {
            winner: Faction::Party,
        };
        assert_eq!(event.kind(), EventKind::EncounterConcluded);
    }

    #[test]
    fn serializes_with_kind_tag() {
        let event = Event::StateTransition {
            old: CombatState::Preparing,
            new: CombatState::AwaitingInput,
        };
        let json = serde_json::to_value(&event).ok();
        let kind = json
            .as_ref()
            .and_then(|v| v.get("kind"))
            .and_then(|v| v.as_str());
        assert_eq!(kind, Some("state_transition"));
        let new = json
            .as_ref()
            .and_then(|v| v.get("new"))
            .and_then(|v| v.as_str());
        assert_eq!(new, Some("awaiting_input"));
    }
}
