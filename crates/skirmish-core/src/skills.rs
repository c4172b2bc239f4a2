//! Skill content and effect resolution.
//!
//! A [`SkillCatalog`] is content supplied by the host (normally through the
//! `skills` section of the encounter configuration). Resolution of instant
//! skills goes through the [`SkillEffect`] trait so external effect systems
//! can replace the built-in [`StrikeEffect`] and [`MendEffect`]. Movement is
//! not an effect: a confirmed move becomes a `MovementPlan` walked by the
//! movement system.

use std::collections::BTreeMap;

use serde::Deserialize;
use skirmish_ecs::World;
use skirmish_events::{Event, EventBus};
use skirmish_types::{Entity, SkillId, Stat};
use tracing::debug;

use crate::components::Health;
use crate::damage;
use crate::error::CombatError;

/// What a skill does when it resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillKind {
    /// Walk the user's footprint to the target hex.
    Move,
    /// Damage an opposing actor.
    Strike,
    /// Restore health to an allied actor (the user included).
    Mend,
}

/// One entry of the skill catalog.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Skill {
    /// Identifier referenced by skillbooks.
    pub id: SkillId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Resolution behaviour.
    pub kind: SkillKind,
    /// Action points per use; for moves, per hex stepped.
    #[serde(default = "default_action_cost")]
    pub action_cost: u32,
    /// Reach in hexes between footprints. Ignored by moves.
    #[serde(default = "default_range")]
    pub range: u32,
    /// Damage dealt or health restored.
    #[serde(default)]
    pub power: u32,
}

const fn default_action_cost() -> u32 {
    1
}

const fn default_range() -> u32 {
    1
}

/// The skills available in an encounter, keyed by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillCatalog {
    skills: BTreeMap<SkillId, Skill>,
}

impl Default for SkillCatalog {
    fn default() -> Self {
        let skills = default_skills()
            .into_iter()
            .map(|s| (s.id.clone(), s))
            .collect();
        Self { skills }
    }
}

impl SkillCatalog {
    /// Build a catalog, rejecting duplicate ids.
    pub fn from_skills<I>(skills: I) -> Result<Self, CombatError>
    where
        I: IntoIterator<Item = Skill>,
    {
        let mut map = BTreeMap::new();
        for skill in skills {
            let id = skill.id.clone();
            if map.insert(id.clone(), skill).is_some() {
                return Err(CombatError::DuplicateSkill(id));
            }
        }
        Ok(Self { skills: map })
    }

    /// Look up a skill.
    pub fn get(&self, id: &SkillId) -> Option<&Skill> {
        self.skills.get(id)
    }

    /// Whether the catalog defines `id`.
    pub fn contains(&self, id: &SkillId) -> bool {
        self.skills.contains_key(id)
    }

    /// All skills in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Skill> + '_ {
        self.skills.values()
    }

    /// Number of skills.
    pub fn len(&self) -> usize {
        self.skills.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}

/// The stock skills: `move`, `strike` and `mend`.
pub fn default_skills() -> Vec<Skill> {
    vec![
        Skill {
            id: SkillId::new("move"),
            name: "Move".to_owned(),
            kind: SkillKind::Move,
            action_cost: 1,
            range: 0,
            power: 0,
        },
        Skill {
            id: SkillId::new("strike"),
            name: "Strike".to_owned(),
            kind: SkillKind::Strike,
            action_cost: 3,
            range: 1,
            power: 25,
        },
        Skill {
            id: SkillId::new("mend"),
            name: "Mend".to_owned(),
            kind: SkillKind::Mend,
            action_cost: 2,
            range: 2,
            power: 15,
        },
    ]
}

/// Mutable access handed to a [`SkillEffect`] while it resolves.
#[derive(Debug)]
pub struct EffectContext<'a> {
    /// The encounter's entities.
    pub world: &'a mut World,
    /// Where outcome events go.
    pub bus: &'a EventBus,
}

/// Resolution of an instant (non-movement) skill.
pub trait SkillEffect {
    /// Apply `skill`, used by `user`, to every entity in `targets`.
    fn apply(&self, ctx: &mut EffectContext<'_>, skill: &Skill, user: Entity, targets: &[Entity]);
}

/// Built-in damage effect: runs each target through the damage pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrikeEffect;

impl SkillEffect for StrikeEffect {
    fn apply(&self, ctx: &mut EffectContext<'_>, skill: &Skill, user: Entity, targets: &[Entity]) {
        for &target in targets {
            let outcome = damage::apply_damage(ctx.world, ctx.bus, user, target, skill.power);
            debug!(source = %user, %target, skill = %skill.id, ?outcome, "Strike resolved");
        }
    }
}

/// Built-in healing effect: restores health up to each target's maximum.
#[derive(Debug, Clone, Copy, Default)]
pub struct MendEffect;

impl SkillEffect for MendEffect {
    fn apply(&self, ctx: &mut EffectContext<'_>, skill: &Skill, user: Entity, targets: &[Entity]) {
        let amount = i32::try_from(skill.power).unwrap_or(i32::MAX);
        for &target in targets {
            let Some(health) = ctx.world.component_mut::<Health>(target) else {
                continue;
            };
            let before = health.current;
            health.current = before.saturating_add(amount).min(health.maximum);
            let current = health.current;
            let delta = current.saturating_sub(before);
            if delta > 0 {
                ctx.bus.publish(&Event::StatModified {
                    entity: target,
                    stat: Stat::Health,
                    delta: f64::from(delta),
                    current: f64::from(current),
                });
            }
            debug!(source = %user, %target, restored = delta, "Mend resolved");
        }
    }
}
