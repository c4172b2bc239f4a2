//! Continuous preparation accrual and turn-token arbitration.
//!
//! While the encounter is `Preparing`, every actor gains preparation at the
//! same rate. The increment of one tick is clamped to the smallest
//! remaining gap across actors, so nobody ever overshoots a threshold and
//! whoever is closest lands on it exactly. When several actors are ready at
//! once the lowest entity id (creation order) goes first; the others have a
//! zero gap and so receive a zero increment until their own turn comes.

use skirmish_ecs::{ComponentType, World};
use skirmish_events::{Event, EventBus};
use skirmish_types::{Entity, Stat};
use tracing::{debug, info, warn};

use crate::components::{ActionPoints, Actor, Preparation, TURN_TOKEN};
use crate::error::CombatError;

/// Accrues preparation and grants or revokes the turn token.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreparationScheduler {
    rate: f64,
}

impl PreparationScheduler {
    /// A scheduler adding `rate` preparation per second. Negative or
    /// non-finite rates are treated as zero.
    pub fn new(rate: f64) -> Self {
        let rate = if rate.is_finite() { rate.max(0.0) } else { 0.0 };
        Self { rate }
    }

    /// Preparation gained per second.
    pub const fn rate(&self) -> f64 {
        self.rate
    }

    /// Add `elapsed * rate` preparation to every actor, clamped to the
    /// smallest remaining gap. Returns the increment applied.
    pub fn accrue(&self, world: &mut World, bus: &EventBus, elapsed: f64) -> f64 {
        let actors = participants(world);
        let Some(gap) = actors
            .iter()
            .filter_map(|e| world.component::<Preparation>(*e))
            .map(Preparation::remaining)
            .reduce(f64::min)
        else {
            return 0.0;
        };
        let increment = (elapsed.max(0.0) * self.rate).min(gap);
        if increment <= 0.0 {
            return 0.0;
        }

        for entity in actors {
            let Some(prep) = world.component_mut::<Preparation>(entity) else {
                continue;
            };
            let before = prep.current;
            if increment >= prep.remaining() {
                prep.current = prep.threshold;
            } else {
                prep.current += increment;
            }
            let current = prep.current;
            let delta = current - before;
            if delta > 0.0 {
                bus.publish(&Event::StatModified {
                    entity,
                    stat: Stat::Preparation,
                    delta,
                    current,
                });
            }
        }
        debug!(increment, "Preparation accrued");
        increment
    }

    /// The ready actor with the lowest entity id, if any.
    pub fn next_ready(&self, world: &World) -> Option<Entity> {
        participants(world)
            .into_iter()
            .find(|e| world.component::<Preparation>(*e).is_some_and(Preparation::is_ready))
    }

    /// The current token holder.
    pub fn token_holder(&self, world: &World) -> Option<Entity> {
        world.any_tagged(TURN_TOKEN)
    }

    /// Give `entity` the turn: zero its preparation, tag it with the turn
    /// token and announce it.
    ///
    /// # Errors
    ///
    /// Returns [`CombatError::Ecs`] if `entity` is gone or has no
    /// preparation.
    pub fn grant_turn(
        &self,
        world: &mut World,
        bus: &EventBus,
        entity: Entity,
    ) -> Result<(), CombatError> {
        if let Some(holder) = self.token_holder(world) {
            warn!(%holder, %entity, "Token still held; revoking before grant");
            world.remove_tag(holder, TURN_TOKEN);
        }
        let prep = world.require_mut::<Preparation>(entity)?;
        let before = prep.current;
        prep.current = 0.0;
        world.tag(entity, TURN_TOKEN)?;
        if before > 0.0 {
            bus.publish(&Event::StatModified {
                entity,
                stat: Stat::Preparation,
                delta: -before,
                current: 0.0,
            });
        }
        info!(%entity, "Turn granted");
        bus.publish(&Event::TurnGranted { entity });
        Ok(())
    }

    /// Take the token from `entity` and restore its action points.
    pub fn end_turn(&self, world: &mut World, bus: &EventBus, entity: Entity) {
        world.remove_tag(entity, TURN_TOKEN);
        if let Some(ap) = world.component_mut::<ActionPoints>(entity) {
            let before = ap.current;
            ap.current = ap.maximum;
            let current = ap.current;
            if current != before {
                bus.publish(&Event::StatModified {
                    entity,
                    stat: Stat::ActionPoints,
                    delta: f64::from(current) - f64::from(before),
                    current: f64::from(current),
                });
            }
        }
        info!(%entity, "Turn ended");
        bus.publish(&Event::TurnEnded { entity });
    }
}

/// Live actors in entity order.
fn participants(world: &World) -> Vec<Entity> {
    world.get(&[
        ComponentType::of::<Actor>(),
        ComponentType::of::<Preparation>(),
    ])
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use skirmish_events::{EventKind, EventRecorder};

    use super::*;

    fn spawn(world: &mut World, current: f64, threshold: f64) -> Entity {
        let e = world.new_entity().unwrap();
        world.add_component(e, Actor).unwrap();
        world
            .add_component(e, Preparation { current, threshold })
            .unwrap();
        world.add_component(e, ActionPoints::full(5)).unwrap();
        e
    }

    fn prep(world: &World, e: Entity) -> f64 {
        world.component::<Preparation>(e).map_or(-1.0, |p| p.current)
    }

    #[test]
    fn increment_is_clamped_to_smallest_gap() {
        let mut world = World::new();
        let bus = EventBus::new();
        let slow = spawn(&mut world, 0.0, 100.0);
        let fast = spawn(&mut world, 0.0, 50.0);
        let scheduler = PreparationScheduler::new(10.0);

        let applied = scheduler.accrue(&mut world, &bus, 10.0);
        assert!((applied - 50.0).abs() < 1e-9);
        assert!((prep(&world, fast) - 50.0).abs() < f64::EPSILON);
        assert!((prep(&world, slow) - 50.0).abs() < f64::EPSILON);
        assert_eq!(scheduler.next_ready(&world), Some(fast));
    }

    #[test]
    fn never_exceeds_threshold_over_many_ticks() {
        let mut world = World::new();
        let bus = EventBus::new();
        let a = spawn(&mut world, 0.0, 100.0);
        let b = spawn(&mut world, 0.0, 50.0);
        let scheduler = PreparationScheduler::new(7.0);

        for _ in 0..200 {
            scheduler.accrue(&mut world, &bus, 0.3);
            for (e, limit) in [(a, 100.0), (b, 50.0)] {
                assert!(prep(&world, e) <= limit);
            }
            if let Some(ready) = scheduler.next_ready(&world) {
                scheduler.grant_turn(&mut world, &bus, ready).unwrap();
                scheduler.end_turn(&mut world, &bus, ready);
            }
        }
    }

    #[test]
    fn ties_go_to_lowest_entity_id() {
        let mut world = World::new();
        let bus = EventBus::new();
        let first = spawn(&mut world, 90.0, 100.0);
        let second = spawn(&mut world, 90.0, 100.0);
        let scheduler = PreparationScheduler::new(100.0);

        scheduler.accrue(&mut world, &bus, 1.0);
        assert_eq!(scheduler.next_ready(&world), Some(first));
        scheduler.grant_turn(&mut world, &bus, first).unwrap();
        scheduler.end_turn(&mut world, &bus, first);

        // The other ready actor gets a zero increment and goes next.
        let applied = scheduler.accrue(&mut world, &bus, 1.0);
        assert!(applied.abs() < f64::EPSILON);
        assert_eq!(scheduler.next_ready(&world), Some(second));
    }

    #[test]
    fn grant_zeroes_preparation_and_tags() {
        let mut world = World::new();
        let bus = EventBus::new();
        let recorder = EventRecorder::attach(&bus);
        let e = spawn(&mut world, 100.0, 100.0);
        let scheduler = PreparationScheduler::new(1.0);

        scheduler.grant_turn(&mut world, &bus, e).unwrap();
        assert!(prep(&world, e).abs() < f64::EPSILON);
        assert_eq!(scheduler.token_holder(&world), Some(e));
        assert_eq!(recorder.of_kind(EventKind::TurnGranted).len(), 1);
    }

    #[test]
    fn only_one_token_holder() {
        let mut world = World::new();
        let bus = EventBus::new();
        let a = spawn(&mut world, 100.0, 100.0);
        let b = spawn(&mut world, 100.0, 100.0);
        let scheduler = PreparationScheduler::new(1.0);

        scheduler.grant_turn(&mut world, &bus, a).unwrap();
        scheduler.grant_turn(&mut world, &bus, b).unwrap();
        assert_eq!(world.tagged(TURN_TOKEN), vec![b]);
    }

    #[test]
    fn end_turn_restores_action_points() {
        let mut world = World::new();
        let bus = EventBus::new();
        let e = spawn(&mut world, 100.0, 100.0);
        let scheduler = PreparationScheduler::new(1.0);
        scheduler.grant_turn(&mut world, &bus, e).unwrap();
        if let Some(ap) = world.component_mut::<ActionPoints>(e) {
            ap.current = 1;
        }

        scheduler.end_turn(&mut world, &bus, e);
        assert_eq!(scheduler.token_holder(&world), None);
        assert_eq!(world.component::<ActionPoints>(e).map(|a| a.current), Some(5));
    }

    #[test]
    fn no_actors_no_accrual() {
        let mut world = World::new();
        let bus = EventBus::new();
        let scheduler = PreparationScheduler::new(10.0);
        assert!(scheduler.accrue(&mut world, &bus, 1.0).abs() < f64::EPSILON);
        assert_eq!(scheduler.next_ready(&world), None);
    }
}
