//! Target validation for skills.
//!
//! [`TargetingContext::validate`] turns "actor uses skill on hex" into a
//! concrete [`TargetPlan`] or a [`RejectionReason`]. The same checks serve
//! human input, AI decisions and hover previews.

use skirmish_ecs::{ComponentType, World};
use skirmish_grid::{Field, Footprint, NavigateError, NavigateStep, Navigator, ObstacleOverlay};
use skirmish_types::{Entity, Faction, Key, RejectionReason, SizeClass, SkillId};

use crate::components::{ActionPoints, Actor, Allegiance, Position, Size, Skillbook};
use crate::skills::{Skill, SkillCatalog, SkillKind};

/// What a validated skill use will do.
#[derive(Debug, Clone, PartialEq)]
pub enum TargetPlan {
    /// Walk `path`, paying `action_points` if every step is taken.
    Move {
        /// Waypoints, excluding the current anchor.
        path: Vec<NavigateStep>,
        /// Cost of the whole path in action points.
        action_points: u32,
    },
    /// Apply an instant effect to `targets`.
    Affect {
        /// Actors affected.
        targets: Vec<Entity>,
        /// Cost in action points.
        action_points: u32,
    },
}

impl TargetPlan {
    /// Action points the plan costs.
    pub const fn action_points(&self) -> u32 {
        match self {
            Self::Move { action_points, .. } | Self::Affect { action_points, .. } => {
                *action_points
            }
        }
    }

    /// Cumulative navigation cost of a move, for previews.
    pub fn path_cost(&self) -> Option<f64> {
        match self {
            Self::Move { path, .. } => path.last().map(|s| s.cost),
            Self::Affect { .. } => None,
        }
    }
}

/// Read-only view of an encounter used to check skill targets.
#[derive(Debug, Clone)]
pub struct TargetingContext<'a> {
    /// The encounter's entities.
    pub world: &'a World,
    /// The playing field.
    pub field: &'a Field,
    /// Current obstacle costs.
    pub overlay: &'a ObstacleOverlay,
    /// Skill content.
    pub catalog: &'a SkillCatalog,
    /// Path finder configured for the encounter.
    pub navigator: Navigator<'a>,
}

impl<'a> TargetingContext<'a> {
    /// Check that `actor` may use `skill` on the hex `key`.
    pub fn validate(
        &self,
        actor: Entity,
        skill: &SkillId,
        key: Key,
    ) -> Result<TargetPlan, RejectionReason> {
        let skill = self.known_skill(actor, skill)?;
        if !self.field.contains(key) {
            return Err(RejectionReason::NoSuchHex);
        }
        match skill.kind {
            SkillKind::Move => self.validate_move(actor, skill, key),
            SkillKind::Strike => self.validate_affect(actor, skill, key, false),
            SkillKind::Mend => self.validate_affect(actor, skill, key, true),
        }
    }

    /// The catalog entry for `skill`, if `actor` knows it.
    pub fn known_skill(&self, actor: Entity, skill: &SkillId) -> Result<&'a Skill, RejectionReason> {
        let known = self
            .world
            .component::<Skillbook>(actor)
            .is_some_and(|book| book.knows(skill));
        if !known {
            return Err(RejectionReason::UnknownSkill);
        }
        self.catalog.get(skill).ok_or(RejectionReason::UnknownSkill)
    }

    /// The first skill of `kind` in the actor's skillbook.
    pub fn first_skill_of(&self, actor: Entity, kind: SkillKind) -> Option<&'a Skill> {
        self.world
            .component::<Skillbook>(actor)?
            .0
            .iter()
            .filter_map(|id| self.catalog.get(id))
            .find(|s| s.kind == kind)
    }

    /// Anchor and size of an occupant.
    pub fn footprint_of(&self, entity: Entity) -> Option<(Key, SizeClass)> {
        footprint_of(self.world, entity)
    }

    /// Living actors of `faction`, in entity order.
    pub fn members_of(&self, faction: Faction) -> Vec<Entity> {
        members_of(self.world, faction)
    }

    /// Hexes between the footprints of two occupants.
    pub fn distance(&self, a: Entity, b: Entity) -> Option<u32> {
        let (a_anchor, a_size) = self.footprint_of(a)?;
        let (b_anchor, b_size) = self.footprint_of(b)?;
        Some(Footprint::of(a_size).hexes_between(a_anchor, Footprint::of(b_size), b_anchor))
    }

    fn validate_move(
        &self,
        actor: Entity,
        skill: &Skill,
        key: Key,
    ) -> Result<TargetPlan, RejectionReason> {
        let (origin, size) = self.footprint_of(actor).ok_or(RejectionReason::NoValidTarget)?;
        let path = self
            .navigator
            .navigate_occupant(self.field, self.overlay, size, Some(actor), origin, key)
            .map_err(|err| match err {
                NavigateError::MissingEndpoint { .. } => RejectionReason::NoValidTarget,
                NavigateError::Unreachable { .. } | NavigateError::SearchExhausted { .. } => {
                    RejectionReason::Unreachable
                }
            })?;
        if path.is_empty() {
            return Err(RejectionReason::NoValidTarget);
        }
        let action_points = u32::try_from(path.len())
            .ok()
            .and_then(|steps| steps.checked_mul(skill.action_cost))
            .ok_or(RejectionReason::InsufficientActionPoints)?;
        self.check_budget(actor, action_points)?;
        Ok(TargetPlan::Move {
            path,
            action_points,
        })
    }

    fn validate_affect(
        &self,
        actor: Entity,
        skill: &Skill,
        key: Key,
        allied: bool,
    ) -> Result<TargetPlan, RejectionReason> {
        let faction = self
            .world
            .component::<Allegiance>(actor)
            .map(|a| a.0)
            .ok_or(RejectionReason::NoValidTarget)?;
        let wanted = if allied { faction } else { faction.opposing() };

        let candidates: Vec<Entity> = self
            .members_of(wanted)
            .into_iter()
            .filter(|&e| {
                self.footprint_of(e)
                    .is_some_and(|(anchor, size)| Footprint::of(size).covers(anchor, key))
            })
            .collect();
        if candidates.is_empty() {
            return Err(RejectionReason::NoValidTarget);
        }

        let targets: Vec<Entity> = candidates
            .into_iter()
            .filter(|&e| self.distance(actor, e).is_some_and(|d| d <= skill.range))
            .collect();
        if targets.is_empty() {
            return Err(RejectionReason::OutOfRange);
        }

        self.check_budget(actor, skill.action_cost)?;
        Ok(TargetPlan::Affect {
            targets,
            action_points: skill.action_cost,
        })
    }

    fn check_budget(&self, actor: Entity, cost: u32) -> Result<(), RejectionReason> {
        let affordable = self
            .world
            .component::<ActionPoints>(actor)
            .is_some_and(|ap| ap.can_afford(cost));
        if affordable {
            Ok(())
        } else {
            Err(RejectionReason::InsufficientActionPoints)
        }
    }
}

/// Anchor and size of an occupant. Entities without a [`Size`] are small.
pub fn footprint_of(world: &World, entity: Entity) -> Option<(Key, SizeClass)> {
    let anchor = world.component::<Position>(entity)?.0;
    let size = world.component::<Size>(entity).copied().unwrap_or_default().0;
    Some((anchor, size))
}

/// Living actors of `faction`, in entity order.
pub fn members_of(world: &World, faction: Faction) -> Vec<Entity> {
    world
        .get(&[
            ComponentType::of::<Actor>(),
            ComponentType::of::<Allegiance>(),
        ])
        .into_iter()
        .filter(|&e| world.component::<Allegiance>(e).is_some_and(|a| a.0 == faction))
        .collect()
}
