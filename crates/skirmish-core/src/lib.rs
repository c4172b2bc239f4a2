//! Turn scheduling, skills and encounter orchestration for the Skirmish
//! tactics core.
//!
//! [`CombatManager`] owns one encounter: the entity [`World`], the hex
//! [`Field`], the [`EventBus`] and the state machine. The host feeds it
//! elapsed time and pointer input; everything it does is announced as
//! events.
//!
//! # Modules
//!
//! - [`clock`] -- Tick counter and phase timers.
//! - [`components`] -- Component types stored on participants and scenery.
//! - [`config`] -- `skirmish-config.yaml` loading into typed structs.
//! - [`damage`] -- The damage pipeline.
//! - [`decision`] -- [`Brain`] trait and the stock [`SeededBrain`].
//! - [`error`] -- [`CombatError`].
//! - [`manager`] -- [`CombatManager`] and its fixed tick order.
//! - [`movement`] -- Walks in-flight movement plans.
//! - [`obstacles`] -- Rebuilds the cost overlay from obstacle components.
//! - [`participant`] -- [`ParticipantSpec`] roster entries.
//! - [`scheduler`] -- Preparation accrual and the turn token.
//! - [`skills`] -- Skill catalog and effect resolution.
//! - [`state`] -- The encounter state machine.
//! - [`targeting`] -- Skill target validation.
//!
//! [`World`]: skirmish_ecs::World
//! [`Field`]: skirmish_grid::Field
//! [`EventBus`]: skirmish_events::EventBus

pub mod clock;
pub mod components;
pub mod config;
pub mod damage;
pub mod decision;
pub mod error;
pub mod manager;
pub mod movement;
pub mod obstacles;
pub mod participant;
pub mod scheduler;
pub mod skills;
pub mod state;
pub mod targeting;

pub use clock::{ClockError, EncounterClock};
pub use config::{ConfigError, EncounterConfig};
pub use decision::{Brain, Decision, SeededBrain};
pub use error::CombatError;
pub use manager::{CombatManager, TickSummary};
pub use participant::ParticipantSpec;
pub use skills::{Skill, SkillCatalog, SkillEffect, SkillKind};
pub use state::StateMachine;
pub use targeting::{TargetPlan, TargetingContext};
