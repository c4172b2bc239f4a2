//! Component types stored in the encounter [`World`].
//!
//! Participants carry [`Actor`], [`Name`], [`Preparation`],
//! [`ActionPoints`], [`Health`], [`Position`], [`Size`], [`Allegiance`],
//! [`Control`], [`Skillbook`] and an [`Obstacle`] so that other movers path
//! around them. Scenery is just [`Position`], [`Size`] and [`Obstacle`].
//!
//! [`World`]: skirmish_ecs::World

use std::collections::VecDeque;

use skirmish_ecs::Tag;
use skirmish_grid::NavigateStep;
use skirmish_types::{Controller, Faction, Key, SizeClass, SkillId};

/// Marks the one actor allowed to act.
pub const TURN_TOKEN: Tag = Tag::new("turn_token");

/// Marks an entity as a turn-taking participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Actor;

/// Display name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Name(pub String);

/// Accrued readiness towards the next turn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Preparation {
    /// Current value, `0 ..= threshold`.
    pub current: f64,
    /// Value at which the actor is ready.
    pub threshold: f64,
}

impl Preparation {
    /// Preparation still missing before the actor is ready.
    pub fn remaining(&self) -> f64 {
        (self.threshold - self.current).max(0.0)
    }

    /// Whether the threshold has been reached.
    pub fn is_ready(&self) -> bool {
        self.current >= self.threshold
    }
}

/// Points spent by skills during a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionPoints {
    /// Points left this turn.
    pub current: u32,
    /// Points restored when the turn ends.
    pub maximum: u32,
}

impl ActionPoints {
    /// Full action points.
    pub const fn full(maximum: u32) -> Self {
        Self {
            current: maximum,
            maximum,
        }
    }

    /// Whether `cost` can be paid.
    pub const fn can_afford(&self, cost: u32) -> bool {
        self.current >= cost
    }
}

/// Hit points. The actor is defeated at zero or below.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Health {
    /// Current hit points.
    pub current: i32,
    /// Upper bound for healing.
    pub maximum: i32,
}

/// Anchor hex of an occupant's footprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position(pub Key);

/// Footprint size class of an occupant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size(pub SizeClass);

/// Which side an actor fights for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allegiance(pub Faction);

/// Who decides for an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Control(pub Controller);

/// Skills an actor knows, in preference order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Skillbook(pub Vec<SkillId>);

impl Skillbook {
    /// Whether the actor knows `skill`.
    pub fn knows(&self, skill: &SkillId) -> bool {
        self.0.contains(skill)
    }
}

/// Traversal cost this entity imposes on the hexes it covers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    /// Cost multiplier; `f64::INFINITY` is impassable.
    pub cost: f64,
}

impl Obstacle {
    /// An obstacle nothing can pass.
    pub const IMPASSABLE: Self = Self {
        cost: f64::INFINITY,
    };
}

/// A move in flight.
#[derive(Debug, Clone, PartialEq)]
pub struct MovementPlan {
    /// The move skill that started it.
    pub skill: SkillId,
    /// Waypoints still ahead.
    pub remaining: VecDeque<NavigateStep>,
    /// Anchor before moving.
    pub origin: Key,
    /// Seconds accumulated towards the next waypoint.
    pub progress: f64,
    /// Waypoints reached so far.
    pub travelled: u32,
}

impl MovementPlan {
    /// A plan that walks `steps` starting from `origin`.
    pub fn new(skill: SkillId, origin: Key, steps: Vec<NavigateStep>) -> Self {
        Self {
            skill,
            remaining: steps.into(),
            origin,
            progress: 0.0,
            travelled: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preparation_remaining_never_negative() {
        let p = Preparation {
            current: 120.0,
            threshold: 100.0,
        };
        assert!(p.remaining().abs() < f64::EPSILON);
        assert!(p.is_ready());
    }

    #[test]
    fn action_points_affordability() {
        let ap = ActionPoints::full(4);
        assert!(ap.can_afford(4));
        assert!(!ap.can_afford(5));
    }

    #[test]
    fn skillbook_membership() {
        let book = Skillbook(vec![SkillId::new("move")]);
        assert!(book.knows(&SkillId::new("move")));
        assert!(!book.knows(&SkillId::new("strike")));
    }
}
