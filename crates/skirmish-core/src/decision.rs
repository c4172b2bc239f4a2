//! Decision sources for AI-controlled actors.
//!
//! While the encounter is `Thinking`, the combat manager asks a [`Brain`]
//! what the token holder should do next. Each answer is validated exactly
//! like human input; a refused answer ends the actor's turn.
//!
//! [`SeededBrain`] is the stock implementation: deterministic for a given
//! seed, it strikes when it can, mends wounded allies, and otherwise walks
//! towards the nearest enemy.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use skirmish_grid::{Footprint, NavigateStep};
use skirmish_types::{Entity, Key, SkillId};
use tracing::{debug, trace};

use crate::components::{ActionPoints, Allegiance, Health};
use crate::skills::SkillKind;
use crate::targeting::TargetingContext;

/// Destinations tried when walking towards an enemy.
const MOVE_CANDIDATES: usize = 6;

/// What the token holder does next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Use `skill` on the hex `target`.
    Use {
        /// The skill to use.
        skill: SkillId,
        /// The hex aimed at.
        target: Key,
    },
    /// Give up the rest of the turn.
    EndTurn,
}

/// A source of decisions for AI-controlled actors.
pub trait Brain {
    /// Choose the next action for `actor`, the current token holder.
    fn decide(&mut self, ctx: &TargetingContext<'_>, actor: Entity) -> Decision;
}

/// Deterministic rule-based brain driven by a seeded RNG.
#[derive(Debug, Clone)]
pub struct SeededBrain {
    rng: StdRng,
}

impl SeededBrain {
    /// A brain whose random choices are fixed by `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn strike(&mut self, ctx: &TargetingContext<'_>, actor: Entity) -> Option<Decision> {
        let faction = ctx.world.component::<Allegiance>(actor)?.0;
        let skill = ctx.first_skill_of(actor, SkillKind::Strike)?;
        let targets: Vec<Key> = ctx
            .members_of(faction.opposing())
            .into_iter()
            .filter_map(|e| ctx.footprint_of(e).map(|(anchor, _)| anchor))
            .filter(|&anchor| ctx.validate(actor, &skill.id, anchor).is_ok())
            .collect();
        let target = *targets.choose(&mut self.rng)?;
        Some(Decision::Use {
            skill: skill.id.clone(),
            target,
        })
    }

    fn mend(ctx: &TargetingContext<'_>, actor: Entity) -> Option<Decision> {
        let faction = ctx.world.component::<Allegiance>(actor)?.0;
        let skill = ctx.first_skill_of(actor, SkillKind::Mend)?;
        let (_, anchor) = ctx
            .members_of(faction)
            .into_iter()
            .filter_map(|e| {
                let health = ctx.world.component::<Health>(e)?;
                let (anchor, _) = ctx.footprint_of(e)?;
                (health.current < health.maximum).then_some((health.current, anchor))
            })
            .filter(|&(_, anchor)| ctx.validate(actor, &skill.id, anchor).is_ok())
            .min_by_key(|&(current, anchor)| (current, anchor))?;
        Some(Decision::Use {
            skill: skill.id.clone(),
            target: anchor,
        })
    }

    fn approach(ctx: &TargetingContext<'_>, actor: Entity) -> Option<Decision> {
        let faction = ctx.world.component::<Allegiance>(actor)?.0;
        let skill = ctx.first_skill_of(actor, SkillKind::Move)?;
        let budget = ctx.world.component::<ActionPoints>(actor)?.current;
        let affordable = budget.checked_div(skill.action_cost).unwrap_or(u32::MAX);
        if affordable == 0 {
            return None;
        }
        let reach = ctx
            .first_skill_of(actor, SkillKind::Strike)
            .map_or(1, |s| s.range.max(1));
        let (origin, size) = ctx.footprint_of(actor)?;

        let enemy = ctx
            .members_of(faction.opposing())
            .into_iter()
            .filter_map(|e| ctx.distance(actor, e).map(|d| (d, e)))
            .min()?;
        if enemy.0 <= reach {
            return None;
        }
        let (enemy_anchor, enemy_size) = ctx.footprint_of(enemy.1)?;

        let geometry = ctx.field.geometry();
        let footprint = Footprint::of(size);
        let mut destinations: Vec<Key> = ctx
            .field
            .footprint_anchors(size)
            .into_iter()
            .filter(|&d| {
                footprint.hexes_between(d, Footprint::of(enemy_size), enemy_anchor) <= reach
                    && ctx.overlay.footprint_cost(d, size, Some(actor)).is_finite()
            })
            .collect();
        destinations.sort_by(|a, b| {
            geometry
                .pixel_distance(origin, *a)
                .total_cmp(&geometry.pixel_distance(origin, *b))
                .then_with(|| a.cmp(b))
        });

        let path = destinations
            .into_iter()
            .take(MOVE_CANDIDATES)
            .filter_map(|d| {
                ctx.navigator
                    .navigate_occupant(ctx.field, ctx.overlay, size, Some(actor), origin, d)
                    .ok()
                    .filter(|p| !p.is_empty())
            })
            .min_by(|a, b| {
                path_cost(a)
                    .total_cmp(&path_cost(b))
                    .then_with(|| a.len().cmp(&b.len()))
            })?;

        let steps = usize::try_from(affordable).unwrap_or(usize::MAX).min(path.len());
        let target = path.get(steps.checked_sub(1)?)?.key;
        trace!(%actor, %target, steps, "Approaching enemy");
        Some(Decision::Use {
            skill: skill.id.clone(),
            target,
        })
    }
}

impl Brain for SeededBrain {
    fn decide(&mut self, ctx: &TargetingContext<'_>, actor: Entity) -> Decision {
        let decision = self
            .strike(ctx, actor)
            .or_else(|| Self::mend(ctx, actor))
            .or_else(|| Self::approach(ctx, actor))
            .unwrap_or(Decision::EndTurn);
        debug!(%actor, ?decision, "Brain decided");
        decision
    }
}

fn path_cost(path: &[NavigateStep]) -> f64 {
    path.last().map_or(0.0, |s| s.cost)
}
