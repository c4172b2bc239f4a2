//! Participant descriptions used to populate an encounter.

use serde::Deserialize;
use skirmish_types::{Controller, Faction, Key, SizeClass, SkillId};

/// Everything needed to spawn one actor.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ParticipantSpec {
    /// Display name.
    pub name: String,
    /// Side the actor fights for.
    pub faction: Faction,
    /// Who supplies its decisions.
    #[serde(default)]
    pub controller: Controller,
    /// Footprint size class.
    #[serde(default)]
    pub size: SizeClass,
    /// Anchor hex, written as `{ m: 0, n: 0 }`.
    pub position: Key,
    /// Starting and maximum health.
    #[serde(default = "default_health")]
    pub health: i32,
    /// Action points per turn.
    #[serde(default = "default_action_points")]
    pub action_points: u32,
    /// Preparation needed for a turn.
    #[serde(default = "default_preparation_threshold")]
    pub preparation_threshold: f64,
    /// Preparation already accrued at spawn.
    #[serde(default)]
    pub initial_preparation: f64,
    /// Known skills, in preference order.
    #[serde(default = "default_skillbook")]
    pub skills: Vec<SkillId>,
}

impl ParticipantSpec {
    /// A participant with default stats and the stock skills.
    pub fn new(name: impl Into<String>, faction: Faction, position: Key) -> Self {
        Self {
            name: name.into(),
            faction,
            controller: Controller::default(),
            size: SizeClass::default(),
            position,
            health: default_health(),
            action_points: default_action_points(),
            preparation_threshold: default_preparation_threshold(),
            initial_preparation: 0.0,
            skills: default_skillbook(),
        }
    }

    /// Set the controller.
    #[must_use]
    pub const fn controlled_by(mut self, controller: Controller) -> Self {
        self.controller = controller;
        self
    }

    /// Set the size class.
    #[must_use]
    pub const fn sized(mut self, size: SizeClass) -> Self {
        self.size = size;
        self
    }

    /// Set the preparation threshold.
    #[must_use]
    pub const fn with_threshold(mut self, threshold: f64) -> Self {
        self.preparation_threshold = threshold;
        self
    }

    /// Set the per-turn action points.
    #[must_use]
    pub const fn with_action_points(mut self, action_points: u32) -> Self {
        self.action_points = action_points;
        self
    }

    /// Set starting health.
    #[must_use]
    pub const fn with_health(mut self, health: i32) -> Self {
        self.health = health;
        self
    }
}

const fn default_health() -> i32 {
    100
}

const fn default_action_points() -> u32 {
    6
}

const fn default_preparation_threshold() -> f64 {
    100.0
}

fn default_skillbook() -> Vec<SkillId> {
    vec![
        SkillId::new("move"),
        SkillId::new("strike"),
        SkillId::new("mend"),
    ]
}
