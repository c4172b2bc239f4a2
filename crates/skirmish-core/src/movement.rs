//! Walks actors along their `MovementPlan`s.
//!
//! A waypoint is reached every `seconds_per_hex` seconds. Reaching one
//! moves the actor's [`Position`] and publishes `MovementProgressed`; the
//! last one removes the plan and publishes `MovementConcluded`. Action
//! points are charged by the caller from the returned
//! [`MovementOutcome`], for the waypoints actually reached.

use skirmish_ecs::World;
use skirmish_events::{Event, EventBus};
use skirmish_types::{Entity, Key, SkillId};
use tracing::{debug, warn};

use crate::components::{MovementPlan, Position};

/// A move that finished this tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovementOutcome {
    /// The mover.
    pub entity: Entity,
    /// The move skill that was used.
    pub skill: SkillId,
    /// Final anchor.
    pub at: Key,
    /// Waypoints reached.
    pub travelled: u32,
}

/// Advance every in-flight move by `elapsed` seconds.
///
/// A non-positive `seconds_per_hex` completes moves in a single tick.
pub fn advance(
    world: &mut World,
    bus: &EventBus,
    elapsed: f64,
    seconds_per_hex: f64,
) -> Vec<MovementOutcome> {
    let mut finished = Vec::new();
    for entity in world.with::<MovementPlan>() {
        if !world.has::<Position>(entity) {
            warn!(%entity, "Moving entity has no position; dropping its plan");
            world.remove_component::<MovementPlan>(entity);
            continue;
        }
        let Some(mut plan) = world.remove_component::<MovementPlan>(entity) else {
            continue;
        };
        plan.progress += elapsed.max(0.0);

        let mut at = world.component::<Position>(entity).map_or(plan.origin, |p| p.0);
        while let Some(step) = plan.remaining.front().copied() {
            if seconds_per_hex > 0.0 && plan.progress < seconds_per_hex {
                break;
            }
            if seconds_per_hex > 0.0 {
                plan.progress -= seconds_per_hex;
            }
            plan.remaining.pop_front();
            plan.travelled = plan.travelled.saturating_add(1);
            at = step.key;
            if let Some(position) = world.component_mut::<Position>(entity) {
                position.0 = step.key;
            }
            bus.publish(&Event::MovementProgressed {
                entity,
                at: step.key,
                cumulative_cost: step.cost,
            });
        }

        if plan.remaining.is_empty() {
            let moved = at != plan.origin;
            debug!(%entity, %at, travelled = plan.travelled, "Movement concluded");
            bus.publish(&Event::MovementConcluded { entity, at, moved });
            finished.push(MovementOutcome {
                entity,
                skill: plan.skill,
                at,
                travelled: plan.travelled,
            });
        } else if let Err(err) = world.add_component(entity, plan) {
            warn!(%entity, %err, "Could not store movement plan");
        }
    }
    finished
}
