//! The combat manager: one encounter, driven one tick at a time.
//!
//! [`CombatManager::update`] runs a fixed sequence every tick:
//!
//! 1. **Clock** -- advance tick counter and timers.
//! 2. **Obstacles** -- rebuild the cost overlay from `Obstacle` components.
//! 3. **Movement** -- walk in-flight moves; a finished move is charged and
//!    concluded, and the token holder gets control back.
//! 4. **Phase work** -- fades, preparation accrual and turn arbitration,
//!    AI thinking, celebration.
//! 5. **Intents** -- host input queued since the last tick, in arrival
//!    order.
//!
//! Host input (`interaction`, `mouse_position`, `select_skill`, `confirm`,
//! `cancel`, `end_turn`) never acts immediately; it is queued and resolved
//! in step 5. Refused requests are published as `SkillRejected` rather than
//! returned as errors. Only a broken state machine makes `update` fail.

use std::collections::{BTreeMap, VecDeque};

use skirmish_ecs::World;
use skirmish_events::{Event, EventBus};
use skirmish_grid::{Field, Navigator, ObstacleOverlay};
use skirmish_types::{
    CombatState, Controller, Entity, Faction, Key, RejectionReason, SizeClass, SkillId, Stat,
};
use tracing::{debug, info, warn};

use crate::clock::EncounterClock;
use crate::components::{
    ActionPoints, Actor, Allegiance, Control, Health, MovementPlan, Name, Obstacle, Position,
    Preparation, Size, Skillbook,
};
use crate::config::{EncounterConfig, NavigationConfig, TimingConfig};
use crate::decision::{Brain, Decision, SeededBrain};
use crate::error::CombatError;
use crate::movement;
use crate::obstacles::rebuild_overlay;
use crate::participant::ParticipantSpec;
use crate::scheduler::PreparationScheduler;
use crate::skills::{
    EffectContext, MendEffect, SkillCatalog, SkillEffect, SkillKind, StrikeEffect,
};
use crate::state::StateMachine;
use crate::targeting::{self, TargetPlan, TargetingContext};

/// Host input waiting for the intent phase.
#[derive(Debug, Clone, PartialEq)]
enum Intent {
    Interaction { x: i32, y: i32 },
    Hover { x: i32, y: i32 },
    SelectSkill(SkillId),
    Confirm,
    Cancel,
    EndTurn,
}

/// The token holder's current choice.
#[derive(Debug, Clone, PartialEq)]
struct Selection {
    skill: SkillId,
    target: Option<Key>,
}

/// Result of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSummary {
    /// The tick number just executed.
    pub tick: u64,
    /// State at the end of the tick.
    pub state: CombatState,
    /// Events published during the tick.
    pub events_published: u64,
    /// Queued intents resolved during the tick.
    pub intents_processed: usize,
}

/// Owns the world, field, bus and state machine of one encounter.
pub struct CombatManager {
    world: World,
    bus: EventBus,
    field: Field,
    overlay: ObstacleOverlay,
    machine: StateMachine,
    clock: EncounterClock,
    scheduler: PreparationScheduler,
    catalog: SkillCatalog,
    effects: BTreeMap<SkillKind, Box<dyn SkillEffect>>,
    brain: Box<dyn Brain>,
    pending: VecDeque<Intent>,
    selection: Option<Selection>,
    timing: TimingConfig,
    navigation: NavigationConfig,
    /// Last published hover: the hex and its preview cost.
    hover: (Option<Key>, Option<f64>),
    actions_this_turn: u32,
    winner: Option<Faction>,
}

impl core::fmt::Debug for CombatManager {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CombatManager")
            .field("state", &self.machine.state())
            .field("tick", &self.clock.tick())
            .field("world", &self.world)
            .field("pending", &self.pending.len())
            .field("winner", &self.winner)
            .finish_non_exhaustive()
    }
}

impl CombatManager {
    /// Build an encounter from configuration and spawn its participants.
    ///
    /// # Errors
    ///
    /// Returns [`CombatError`] if the geometry, timing or skill catalog is
    /// invalid, or a participant cannot be placed.
    pub fn new(config: &EncounterConfig) -> Result<Self, CombatError> {
        validate_timing(&config.timing)?;
        let geometry = config.grid.geometry()?;
        let field = Field::rectangle(geometry, config.grid.width, config.grid.height)?;
        let catalog = SkillCatalog::from_skills(config.skills.iter().cloned())?;

        let mut effects: BTreeMap<SkillKind, Box<dyn SkillEffect>> = BTreeMap::new();
        effects.insert(SkillKind::Strike, Box::new(StrikeEffect));
        effects.insert(SkillKind::Mend, Box::new(MendEffect));

        let mut manager = Self {
            world: World::new(),
            bus: EventBus::new(),
            field,
            overlay: ObstacleOverlay::new(),
            machine: StateMachine::new(),
            clock: EncounterClock::new(),
            scheduler: PreparationScheduler::new(config.timing.preparation_rate),
            catalog,
            effects,
            brain: Box::new(SeededBrain::new(config.encounter.seed)),
            pending: VecDeque::new(),
            selection: None,
            timing: config.timing.clone(),
            navigation: config.navigation.clone(),
            hover: (None, None),
            actions_this_turn: 0,
            winner: None,
        };
        for spec in &config.participants {
            manager.spawn_participant(spec)?;
        }
        info!(
            name = %config.encounter.name,
            seed = config.encounter.seed,
            hexes = manager.field.len(),
            participants = config.participants.len(),
            "Encounter created"
        );
        Ok(manager)
    }

    /// Replace the decision source for AI actors.
    #[must_use]
    pub fn with_brain(mut self, brain: Box<dyn Brain>) -> Self {
        self.brain = brain;
        self
    }

    /// Replace the resolution of one kind of instant skill.
    #[must_use]
    pub fn with_effect(mut self, kind: SkillKind, effect: Box<dyn SkillEffect>) -> Self {
        self.effects.insert(kind, effect);
        self
    }

    // -------------------------------------------------------------------
    // Population
    // -------------------------------------------------------------------

    /// Add an actor described by `spec`.
    ///
    /// The actor also becomes an impassable obstacle on its footprint.
    ///
    /// # Errors
    ///
    /// Returns [`CombatError::InvalidPlacement`] if the footprint leaves the
    /// field or overlaps something impassable, [`CombatError::UnknownSkill`]
    /// for a skill missing from the catalog and
    /// [`CombatError::InvalidConfig`] for nonsensical stats.
    pub fn spawn_participant(&mut self, spec: &ParticipantSpec) -> Result<Entity, CombatError> {
        self.check_placement(spec.position, spec.size, true)?;
        if let Some(unknown) = spec.skills.iter().find(|s| !self.catalog.contains(s)) {
            return Err(CombatError::UnknownSkill(unknown.clone()));
        }
        if spec.health <= 0 {
            return Err(CombatError::InvalidConfig {
                reason: format!("{} must start with positive health", spec.name),
            });
        }
        if !spec.preparation_threshold.is_finite() || spec.preparation_threshold < 0.0 {
            return Err(CombatError::InvalidConfig {
                reason: format!("{} has an invalid preparation threshold", spec.name),
            });
        }
        if !spec.initial_preparation.is_finite() {
            return Err(CombatError::InvalidConfig {
                reason: format!("{} has an invalid initial preparation", spec.name),
            });
        }

        let entity = self.world.new_entity()?;
        self.world.add_component(entity, Actor)?;
        self.world.add_component(entity, Name(spec.name.clone()))?;
        self.world.add_component(entity, Allegiance(spec.faction))?;
        self.world.add_component(entity, Control(spec.controller))?;
        self.world.add_component(entity, Size(spec.size))?;
        self.world.add_component(entity, Position(spec.position))?;
        self.world.add_component(
            entity,
            Health {
                current: spec.health,
                maximum: spec.health,
            },
        )?;
        self.world
            .add_component(entity, ActionPoints::full(spec.action_points))?;
        self.world.add_component(
            entity,
            Preparation {
                current: spec
                    .initial_preparation
                    .clamp(0.0, spec.preparation_threshold),
                threshold: spec.preparation_threshold,
            },
        )?;
        self.world
            .add_component(entity, Skillbook(spec.skills.clone()))?;
        self.world.add_component(entity, Obstacle::IMPASSABLE)?;
        rebuild_overlay(&self.world, &mut self.overlay);

        info!(
            %entity,
            name = %spec.name,
            faction = ?spec.faction,
            position = %spec.position,
            "Participant spawned"
        );
        Ok(entity)
    }

    /// Add scenery covering the footprint of `size` at `anchor`, with
    /// traversal multiplier `cost` (`f64::INFINITY` for walls).
    ///
    /// # Errors
    ///
    /// Returns [`CombatError::InvalidPlacement`] if the footprint leaves the
    /// field, or a wall would overlap an actor or another wall.
    pub fn spawn_obstacle(
        &mut self,
        anchor: Key,
        size: SizeClass,
        cost: f64,
    ) -> Result<Entity, CombatError> {
        self.check_placement(anchor, size, cost.is_infinite() || cost.is_nan())?;
        let entity = self.world.new_entity()?;
        self.world.add_component(entity, Position(anchor))?;
        self.world.add_component(entity, Size(size))?;
        self.world.add_component(entity, Obstacle { cost })?;
        rebuild_overlay(&self.world, &mut self.overlay);
        debug!(%entity, %anchor, ?size, cost, "Obstacle spawned");
        Ok(entity)
    }

    /// Occupants must fit on the field; impassable ones may not overlap
    /// anything else impassable, actors included.
    fn check_placement(
        &mut self,
        anchor: Key,
        size: SizeClass,
        impassable: bool,
    ) -> Result<(), CombatError> {
        if !self.field.footprint_valid(anchor, size) {
            return Err(CombatError::InvalidPlacement { anchor, size });
        }
        rebuild_overlay(&self.world, &mut self.overlay);
        if impassable && self.overlay.footprint_cost(anchor, size, None).is_infinite() {
            return Err(CombatError::InvalidPlacement { anchor, size });
        }
        Ok(())
    }

    // -------------------------------------------------------------------
    // Host input
    // -------------------------------------------------------------------

    /// A click at world coordinates `(x, y)`.
    ///
    /// With no skill selected this is a move order using the actor's first
    /// move skill; while selecting it picks the target; while confirming,
    /// clicking the same hex confirms and another hex re-targets.
    pub fn interaction(&mut self, x: i32, y: i32) {
        self.pending.push_back(Intent::Interaction { x, y });
    }

    /// The pointer moved to world coordinates `(x, y)`.
    pub fn mouse_position(&mut self, x: i32, y: i32) {
        self.pending.push_back(Intent::Hover { x, y });
    }

    /// Choose the skill to target next.
    pub fn select_skill(&mut self, skill: SkillId) {
        self.pending.push_back(Intent::SelectSkill(skill));
    }

    /// Confirm the selected target.
    pub fn confirm(&mut self) {
        self.pending.push_back(Intent::Confirm);
    }

    /// Step back: drop the target, or the skill if no target is chosen.
    pub fn cancel(&mut self) {
        self.pending.push_back(Intent::Cancel);
    }

    /// Give up the rest of the human token holder's turn.
    pub fn end_turn(&mut self) {
        self.pending.push_back(Intent::EndTurn);
    }

    // -------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------

    /// The actor waiting for host input, if any.
    pub fn awaiting_input(&self) -> Option<Entity> {
        matches!(
            self.machine.state(),
            CombatState::AwaitingInput
                | CombatState::SelectingTarget
                | CombatState::ConfirmingSelectedTarget
        )
        .then(|| self.scheduler.token_holder(&self.world))
        .flatten()
    }

    /// The actor holding the turn token.
    pub fn token_holder(&self) -> Option<Entity> {
        self.scheduler.token_holder(&self.world)
    }

    /// Current encounter state.
    pub const fn state(&self) -> CombatState {
        self.machine.state()
    }

    /// Whether the outro has finished playing.
    pub fn is_finished(&self) -> bool {
        self.machine.state() == CombatState::FadingOut
            && self.clock.state_elapsed() >= self.timing.fade_out_seconds
    }

    /// The side that won, once the encounter is decided.
    pub const fn winner(&self) -> Option<Faction> {
        self.winner
    }

    /// The encounter's entities.
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Mutable access to the encounter's entities.
    pub const fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// The event bus external layers subscribe to.
    pub const fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// The playing field.
    pub const fn field(&self) -> &Field {
        &self.field
    }

    /// Encounter timers.
    pub const fn clock(&self) -> &EncounterClock {
        &self.clock
    }

    /// Skill content.
    pub const fn catalog(&self) -> &SkillCatalog {
        &self.catalog
    }

    // -------------------------------------------------------------------
    // Tick
    // -------------------------------------------------------------------

    /// Advance the encounter by `elapsed` seconds.
    ///
    /// # Errors
    ///
    /// Returns [`CombatError::Clock`] for a negative or non-finite
    /// `elapsed`, and [`CombatError::IllegalTransition`] if the state
    /// machine is driven off its table.
    pub fn update(&mut self, elapsed: f64) -> Result<TickSummary, CombatError> {
        let published_before = self.bus.published_count();
        let tick = self.clock.advance(elapsed)?;

        rebuild_overlay(&self.world, &mut self.overlay);
        self.advance_movement(elapsed)?;
        self.phase_work(elapsed)?;
        let intents_processed = self.drain_intents()?;

        let summary = TickSummary {
            tick,
            state: self.machine.state(),
            events_published: self
                .bus
                .published_count()
                .saturating_sub(published_before),
            intents_processed,
        };
        debug!(
            tick,
            state = %summary.state,
            events = summary.events_published,
            intents = intents_processed,
            "Tick complete"
        );
        Ok(summary)
    }

    fn advance_movement(&mut self, elapsed: f64) -> Result<(), CombatError> {
        let outcomes = movement::advance(
            &mut self.world,
            &self.bus,
            elapsed,
            self.timing.seconds_per_hex,
        );
        if outcomes.is_empty() {
            return Ok(());
        }
        rebuild_overlay(&self.world, &mut self.overlay);
        for outcome in outcomes {
            let per_hex = self.catalog.get(&outcome.skill).map_or(0, |s| s.action_cost);
            let spent = per_hex.saturating_mul(outcome.travelled);
            self.spend(outcome.entity, spent);
            self.bus.publish(&Event::SkillConcluded {
                entity: outcome.entity,
                skill: outcome.skill,
                action_points_spent: spent,
            });
            let resumes = self.machine.state() == CombatState::Executing
                && self.token_holder() == Some(outcome.entity);
            if resumes {
                self.after_action(outcome.entity)?;
            }
        }
        Ok(())
    }

    fn phase_work(&mut self, elapsed: f64) -> Result<(), CombatError> {
        match self.machine.state() {
            CombatState::Uninitialised => self.transition(CombatState::FadingIn),
            CombatState::FadingIn => {
                if self.clock.state_elapsed() >= self.timing.fade_in_seconds {
                    self.transition(CombatState::Preparing)?;
                }
                Ok(())
            }
            CombatState::Preparing => self.prepare(elapsed),
            CombatState::Thinking => self.think(),
            CombatState::Celebration => {
                if self.clock.state_elapsed() >= self.timing.celebration_seconds {
                    self.transition(CombatState::FadingOut)?;
                }
                Ok(())
            }
            CombatState::AwaitingInput
            | CombatState::SelectingTarget
            | CombatState::ConfirmingSelectedTarget
            | CombatState::Executing
            | CombatState::FadingOut => Ok(()),
        }
    }

    fn prepare(&mut self, elapsed: f64) -> Result<(), CombatError> {
        if self.check_victory()? {
            return Ok(());
        }
        self.scheduler.accrue(&mut self.world, &self.bus, elapsed);
        let Some(next) = self.scheduler.next_ready(&self.world) else {
            return Ok(());
        };
        self.scheduler.grant_turn(&mut self.world, &self.bus, next)?;
        self.actions_this_turn = 0;
        self.selection = None;
        let to = self.decision_state(next);
        self.transition(to)
    }

    fn think(&mut self) -> Result<(), CombatError> {
        let Some(actor) = self.token_holder() else {
            warn!("Thinking without a token holder");
            return self.transition(CombatState::Preparing);
        };
        if self.clock.state_elapsed() < self.timing.think_seconds {
            return Ok(());
        }
        if self.actions_this_turn >= self.timing.max_ai_actions {
            info!(%actor, actions = self.actions_this_turn, "AI action limit reached");
            return self.finish_turn(actor);
        }
        self.actions_this_turn = self.actions_this_turn.saturating_add(1);

        let decision = {
            let ctx = targeting_context(
                &self.world,
                &self.field,
                &self.overlay,
                &self.catalog,
                &self.navigation,
            );
            self.brain.decide(&ctx, actor)
        };
        let (skill, target) = match decision {
            Decision::EndTurn => return self.finish_turn(actor),
            Decision::Use { skill, target } => (skill, target),
        };
        match self.validate(actor, &skill, target) {
            Ok(plan) => {
                self.bus.publish(&Event::SkillSelected {
                    entity: actor,
                    skill: skill.clone(),
                });
                self.transition(CombatState::SelectingTarget)?;
                self.bus.publish(&Event::TargetSelected {
                    entity: actor,
                    skill: skill.clone(),
                    target,
                });
                self.transition(CombatState::ConfirmingSelectedTarget)?;
                self.execute(actor, skill, plan)
            }
            Err(reason) => {
                self.reject(Some(actor), Some(skill), reason);
                self.finish_turn(actor)
            }
        }
    }

    // -------------------------------------------------------------------
    // Intents
    // -------------------------------------------------------------------

    fn drain_intents(&mut self) -> Result<usize, CombatError> {
        let mut processed: usize = 0;
        while let Some(intent) = self.pending.pop_front() {
            processed = processed.saturating_add(1);
            match intent {
                Intent::Interaction { x, y } => self.on_interaction(x, y)?,
                Intent::Hover { x, y } => self.on_hover(x, y),
                Intent::SelectSkill(skill) => self.on_select_skill(skill)?,
                Intent::Confirm => self.on_confirm()?,
                Intent::Cancel => self.on_cancel()?,
                Intent::EndTurn => self.on_end_turn()?,
            }
        }
        Ok(processed)
    }

    fn on_interaction(&mut self, x: i32, y: i32) -> Result<(), CombatError> {
        let Some(actor) = self.awaiting_input() else {
            self.reject_out_of_turn(None);
            return Ok(());
        };
        let selected = self.selection.as_ref().map(|s| s.skill.clone());
        let Some(key) = self.field.at(x, y) else {
            self.reject(Some(actor), selected, RejectionReason::NoSuchHex);
            return Ok(());
        };

        match self.machine.state() {
            CombatState::AwaitingInput => {
                let ctx = self.targeting();
                let Some(skill) = ctx.first_skill_of(actor, SkillKind::Move).map(|s| s.id.clone())
                else {
                    self.reject(Some(actor), None, RejectionReason::UnknownSkill);
                    return Ok(());
                };
                self.begin_selection(actor, skill)?;
                self.choose_target(actor, key)
            }
            CombatState::SelectingTarget => self.choose_target(actor, key),
            CombatState::ConfirmingSelectedTarget => {
                let current = self.selection.as_ref().and_then(|s| s.target);
                if current == Some(key) {
                    self.on_confirm()
                } else {
                    self.choose_target(actor, key)
                }
            }
            _ => {
                self.reject_out_of_turn(selected);
                Ok(())
            }
        }
    }

    fn on_hover(&mut self, x: i32, y: i32) {
        let key = self.field.at(x, y);
        let preview_cost = key.and_then(|key| {
            let actor = self.awaiting_input()?;
            let skill = self.selection.as_ref()?.skill.clone();
            let ctx = self.targeting();
            let is_move = ctx
                .known_skill(actor, &skill)
                .is_ok_and(|s| s.kind == SkillKind::Move);
            if !is_move {
                return None;
            }
            ctx.validate(actor, &skill, key).ok()?.path_cost()
        });
        // Same hex and same preview: nothing changed for the HUD.
        if (key, preview_cost) == self.hover {
            return;
        }
        self.hover = (key, preview_cost);
        self.bus.publish(&Event::HoverChanged { key, preview_cost });
    }

    fn on_select_skill(&mut self, skill: SkillId) -> Result<(), CombatError> {
        let Some(actor) = self.awaiting_input() else {
            self.reject_out_of_turn(Some(skill));
            return Ok(());
        };
        if let Err(reason) = self.targeting().known_skill(actor, &skill) {
            self.reject(Some(actor), Some(skill), reason);
            return Ok(());
        }
        self.begin_selection(actor, skill)
    }

    fn on_confirm(&mut self) -> Result<(), CombatError> {
        let selection = self.selection.clone();
        let (Some(actor), CombatState::ConfirmingSelectedTarget, Some(selection)) =
            (self.awaiting_input(), self.machine.state(), selection)
        else {
            self.reject_out_of_turn(None);
            return Ok(());
        };
        let Some(target) = selection.target else {
            self.reject(Some(actor), Some(selection.skill), RejectionReason::NoValidTarget);
            return Ok(());
        };

        match self.validate(actor, &selection.skill, target) {
            Ok(plan) => self.execute(actor, selection.skill, plan),
            Err(reason) => {
                let is_move = self
                    .catalog
                    .get(&selection.skill)
                    .is_some_and(|s| s.kind == SkillKind::Move);
                if is_move && reason == RejectionReason::Unreachable {
                    let at = self
                        .world
                        .component::<Position>(actor)
                        .map_or(target, |p| p.0);
                    self.bus.publish(&Event::MovementConcluded {
                        entity: actor,
                        at,
                        moved: false,
                    });
                }
                self.reject(Some(actor), Some(selection.skill.clone()), reason);
                self.selection = Some(Selection {
                    skill: selection.skill,
                    target: None,
                });
                self.transition(CombatState::SelectingTarget)
            }
        }
    }

    fn on_cancel(&mut self) -> Result<(), CombatError> {
        match (self.awaiting_input(), self.machine.state()) {
            (Some(_), CombatState::SelectingTarget) => {
                self.selection = None;
                self.transition(CombatState::AwaitingInput)
            }
            (Some(_), CombatState::ConfirmingSelectedTarget) => {
                if let Some(selection) = self.selection.as_mut() {
                    selection.target = None;
                }
                self.transition(CombatState::SelectingTarget)
            }
            _ => {
                self.reject_out_of_turn(None);
                Ok(())
            }
        }
    }

    fn on_end_turn(&mut self) -> Result<(), CombatError> {
        let Some(actor) = self.awaiting_input() else {
            self.reject_out_of_turn(None);
            return Ok(());
        };
        self.finish_turn(actor)
    }

    // -------------------------------------------------------------------
    // Turn flow
    // -------------------------------------------------------------------

    fn begin_selection(&mut self, actor: Entity, skill: SkillId) -> Result<(), CombatError> {
        self.bus.publish(&Event::SkillSelected {
            entity: actor,
            skill: skill.clone(),
        });
        self.selection = Some(Selection {
            skill,
            target: None,
        });
        if self.machine.state() == CombatState::SelectingTarget {
            Ok(())
        } else {
            self.transition(CombatState::SelectingTarget)
        }
    }

    fn choose_target(&mut self, actor: Entity, key: Key) -> Result<(), CombatError> {
        let Some(skill) = self.selection.as_ref().map(|s| s.skill.clone()) else {
            self.reject(Some(actor), None, RejectionReason::UnknownSkill);
            return Ok(());
        };
        if let Err(reason) = self.validate(actor, &skill, key) {
            self.reject(Some(actor), Some(skill), reason);
            return Ok(());
        }
        self.selection = Some(Selection {
            skill: skill.clone(),
            target: Some(key),
        });
        self.bus.publish(&Event::TargetSelected {
            entity: actor,
            skill,
            target: key,
        });
        if self.machine.state() == CombatState::ConfirmingSelectedTarget {
            Ok(())
        } else {
            self.transition(CombatState::ConfirmingSelectedTarget)
        }
    }

    fn execute(
        &mut self,
        actor: Entity,
        skill_id: SkillId,
        plan: TargetPlan,
    ) -> Result<(), CombatError> {
        self.transition(CombatState::Executing)?;
        self.selection = None;
        let Some(skill) = self.catalog.get(&skill_id).cloned() else {
            self.reject(Some(actor), Some(skill_id), RejectionReason::UnknownSkill);
            return self.after_action(actor);
        };

        match plan {
            TargetPlan::Move { path, .. } => {
                let from = self.world.require::<Position>(actor)?.0;
                let destination = path.last().map_or(from, |s| s.key);
                let cost = path.last().map_or(0.0, |s| s.cost);
                info!(%actor, %from, %destination, steps = path.len(), cost, "Movement commenced");
                self.bus.publish(&Event::MovementCommenced {
                    entity: actor,
                    from,
                    destination,
                    steps: path.len(),
                    cost,
                });
                self.world
                    .add_component(actor, MovementPlan::new(skill_id, from, path))?;
                Ok(())
            }
            TargetPlan::Affect {
                targets,
                action_points,
            } => {
                self.spend(actor, action_points);
                match self.effects.get(&skill.kind) {
                    Some(effect) => {
                        let mut ctx = EffectContext {
                            world: &mut self.world,
                            bus: &self.bus,
                        };
                        effect.apply(&mut ctx, &skill, actor, &targets);
                    }
                    None => warn!(skill = %skill.id, kind = ?skill.kind, "No effect registered"),
                }
                rebuild_overlay(&self.world, &mut self.overlay);
                info!(%actor, skill = %skill.id, targets = targets.len(), "Skill resolved");
                self.bus.publish(&Event::SkillConcluded {
                    entity: actor,
                    skill: skill_id,
                    action_points_spent: action_points,
                });
                self.after_action(actor)
            }
        }
    }

    /// Back to the token holder after a skill resolved, unless the
    /// encounter was decided by it.
    fn after_action(&mut self, actor: Entity) -> Result<(), CombatError> {
        if self.check_victory()? {
            return Ok(());
        }
        if !self.world.contains(actor) {
            return self.transition(CombatState::Preparing);
        }
        let to = self.decision_state(actor);
        self.transition(to)
    }

    fn finish_turn(&mut self, actor: Entity) -> Result<(), CombatError> {
        self.scheduler.end_turn(&mut self.world, &self.bus, actor);
        self.selection = None;
        self.actions_this_turn = 0;
        self.transition(CombatState::Preparing)
    }

    /// Conclude the encounter if one side has been wiped out.
    fn check_victory(&mut self) -> Result<bool, CombatError> {
        let party = targeting::members_of(&self.world, Faction::Party).is_empty();
        let hostile = targeting::members_of(&self.world, Faction::Hostile).is_empty();
        let winner = match (party, hostile) {
            (false, true) => Faction::Party,
            (true, false) => Faction::Hostile,
            _ => return Ok(false),
        };
        info!(?winner, tick = self.clock.tick(), "Encounter concluded");
        self.winner = Some(winner);
        self.bus.publish(&Event::EncounterConcluded { winner });
        if let Some(holder) = self.token_holder() {
            self.scheduler.end_turn(&mut self.world, &self.bus, holder);
        }
        self.selection = None;
        self.transition(CombatState::Celebration)?;
        Ok(true)
    }

    // -------------------------------------------------------------------
    // Helpers
    // -------------------------------------------------------------------

    fn transition(&mut self, to: CombatState) -> Result<(), CombatError> {
        self.machine.transition(to, &self.bus)?;
        self.clock.reset_state_timer();
        Ok(())
    }

    fn decision_state(&self, actor: Entity) -> CombatState {
        match self.world.component::<Control>(actor).map(|c| c.0) {
            Some(Controller::Ai) => CombatState::Thinking,
            Some(Controller::Human) | None => CombatState::AwaitingInput,
        }
    }

    fn targeting(&self) -> TargetingContext<'_> {
        targeting_context(
            &self.world,
            &self.field,
            &self.overlay,
            &self.catalog,
            &self.navigation,
        )
    }

    fn validate(
        &self,
        actor: Entity,
        skill: &SkillId,
        key: Key,
    ) -> Result<TargetPlan, RejectionReason> {
        self.targeting().validate(actor, skill, key)
    }

    fn spend(&mut self, actor: Entity, cost: u32) {
        if cost == 0 {
            return;
        }
        let Some(ap) = self.world.component_mut::<ActionPoints>(actor) else {
            warn!(%actor, "Spending action points of an actor without any");
            return;
        };
        ap.current = ap.current.saturating_sub(cost);
        let current = ap.current;
        self.bus.publish(&Event::StatModified {
            entity: actor,
            stat: Stat::ActionPoints,
            delta: -f64::from(cost),
            current: f64::from(current),
        });
    }

    fn reject(&self, entity: Option<Entity>, skill: Option<SkillId>, reason: RejectionReason) {
        debug!(entity = ?entity, skill = ?skill, %reason, "Request rejected");
        self.bus.publish(&Event::SkillRejected {
            entity,
            skill,
            reason,
        });
    }

    fn reject_out_of_turn(&self, skill: Option<SkillId>) {
        match self.token_holder() {
            Some(holder) => self.reject(Some(holder), skill, RejectionReason::InvalidState),
            None => self.reject(None, skill, RejectionReason::NoActiveActor),
        }
    }
}

fn targeting_context<'a>(
    world: &'a World,
    field: &'a Field,
    overlay: &'a ObstacleOverlay,
    catalog: &'a SkillCatalog,
    navigation: &NavigationConfig,
) -> TargetingContext<'a> {
    TargetingContext {
        world,
        field,
        overlay,
        catalog,
        navigator: Navigator::new(field.geometry())
            .with_step_cost(navigation.step_cost)
            .with_search_limit(navigation.search_limit),
    }
}

fn validate_timing(timing: &TimingConfig) -> Result<(), CombatError> {
    let durations = [
        ("fade_in_seconds", timing.fade_in_seconds),
        ("celebration_seconds", timing.celebration_seconds),
        ("fade_out_seconds", timing.fade_out_seconds),
        ("preparation_rate", timing.preparation_rate),
        ("seconds_per_hex", timing.seconds_per_hex),
        ("think_seconds", timing.think_seconds),
    ];
    match durations
        .iter()
        .find(|(_, value)| !value.is_finite() || *value < 0.0)
    {
        Some((name, value)) => Err(CombatError::InvalidConfig {
            reason: format!("timing.{name} must be finite and non-negative, got {value}"),
        }),
        None => Ok(()),
    }
}
