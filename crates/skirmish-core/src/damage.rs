//! The damage pipeline.
//!
//! `DamageApplied` is always announced first. The target then either
//! absorbs it (`StatModified`, `DamageAccepted`) or the attempt fails
//! (`DamageFailed`). A target left at zero health or below is announced as
//! `ActorDefeated` and destroyed.

use skirmish_ecs::World;
use skirmish_events::{DamageFailure, Event, EventBus};
use skirmish_types::{Entity, Stat};
use tracing::info;

use crate::components::Health;

/// What happened to one damage attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// The target took the damage and survived.
    Accepted {
        /// Health left.
        remaining: i32,
    },
    /// The target took the damage and was destroyed.
    Defeated,
    /// Nothing was changed.
    Failed(DamageFailure),
}

/// Run `amount` damage from `source` into `target`.
pub fn apply_damage(
    world: &mut World,
    bus: &EventBus,
    source: Entity,
    target: Entity,
    amount: u32,
) -> DamageOutcome {
    bus.publish(&Event::DamageApplied {
        source,
        target,
        amount,
    });

    let failure = if world.contains(target) {
        DamageFailure::NoHealth
    } else {
        DamageFailure::TargetMissing
    };
    let Some(health) = world.component_mut::<Health>(target) else {
        bus.publish(&Event::DamageFailed {
            source,
            target,
            reason: failure,
        });
        return DamageOutcome::Failed(failure);
    };

    let loss = i32::try_from(amount).unwrap_or(i32::MAX);
    health.current = health.current.saturating_sub(loss);
    let remaining = health.current;

    bus.publish(&Event::StatModified {
        entity: target,
        stat: Stat::Health,
        delta: -f64::from(loss),
        current: f64::from(remaining),
    });
    bus.publish(&Event::DamageAccepted {
        target,
        amount,
        remaining,
    });

    if remaining > 0 {
        return DamageOutcome::Accepted { remaining };
    }

    info!(%target, %source, "Actor defeated");
    bus.publish(&Event::ActorDefeated { entity: target });
    world.destroy_entity(target);
    DamageOutcome::Defeated
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use skirmish_events::{EventKind, EventRecorder};

    use super::*;

    fn setup(health: i32) -> (World, EventBus, Entity, Entity) {
        let mut world = World::new();
        let attacker = world.new_entity().unwrap();
        let target = world.new_entity().unwrap();
        world
            .add_component(
                target,
                Health {
                    current: health,
                    maximum: health,
                },
            )
            .unwrap();
        (world, EventBus::new(), attacker, target)
    }

    #[test]
    fn damage_is_accepted() {
        let (mut world, bus, attacker, target) = setup(50);
        let recorder = EventRecorder::attach(&bus);
        let outcome = apply_damage(&mut world, &bus, attacker, target, 20);
        assert_eq!(outcome, DamageOutcome::Accepted { remaining: 30 });
        let kinds: Vec<EventKind> = recorder.events().iter().map(Event::kind).collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::DamageApplied,
                EventKind::StatModified,
                EventKind::DamageAccepted,
            ]
        );
    }

    #[test]
    fn lethal_damage_destroys_target() {
        let (mut world, bus, attacker, target) = setup(10);
        let recorder = EventRecorder::attach(&bus);
        let outcome = apply_damage(&mut world, &bus, attacker, target, 10);
        assert_eq!(outcome, DamageOutcome::Defeated);
        assert!(!world.contains(target));
        assert_eq!(recorder.of_kind(EventKind::ActorDefeated).len(), 1);
    }

    #[test]
    fn missing_target_fails() {
        let (mut world, bus, attacker, target) = setup(10);
        world.destroy_entity(target);
        let outcome = apply_damage(&mut world, &bus, attacker, target, 5);
        assert_eq!(outcome, DamageOutcome::Failed(DamageFailure::TargetMissing));
    }

    #[test]
    fn target_without_health_fails() {
        let (mut world, bus, attacker, _) = setup(10);
        let recorder = EventRecorder::attach(&bus);
        let outcome = apply_damage(&mut world, &bus, attacker, attacker, 5);
        assert_eq!(outcome, DamageOutcome::Failed(DamageFailure::NoHealth));
        assert_eq!(recorder.of_kind(EventKind::DamageFailed).len(), 1);
    }
}
