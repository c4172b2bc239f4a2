//! Rebuilds the navigation cost overlay from `Obstacle` components.

use skirmish_ecs::{ComponentType, World};
use skirmish_grid::ObstacleOverlay;
use tracing::trace;

use crate::components::{Obstacle, Position, Size};

/// Replace the contents of `overlay` with every positioned obstacle in
/// `world`, expanded to the base hexes of its footprint. Entities without a
/// [`Size`] count as small.
pub fn rebuild_overlay(world: &World, overlay: &mut ObstacleOverlay) {
    overlay.clear();
    let entities = world.get(&[
        ComponentType::of::<Obstacle>(),
        ComponentType::of::<Position>(),
    ]);
    for entity in entities {
        let (Some(obstacle), Some(position)) = (
            world.component::<Obstacle>(entity),
            world.component::<Position>(entity),
        ) else {
            continue;
        };
        let size = world.component::<Size>(entity).copied().unwrap_or_default();
        overlay.insert(entity, position.0, size.0, obstacle.cost);
    }
    trace!(covered = overlay.len(), "Obstacle overlay rebuilt");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use skirmish_types::{Key, SizeClass};

    use super::*;

    #[test]
    fn positioned_obstacles_only() {
        let mut world = World::new();
        let rock = world.new_entity().unwrap();
        world.add_component(rock, Obstacle::IMPASSABLE).unwrap();
        world.add_component(rock, Position(Key::new(2, 2))).unwrap();
        world.add_component(rock, Size(SizeClass::Large)).unwrap();

        let floating = world.new_entity().unwrap();
        world.add_component(floating, Obstacle { cost: 3.0 }).unwrap();

        let mut overlay = ObstacleOverlay::new();
        overlay.insert(floating, Key::new(0, 0), SizeClass::Small, 9.0);
        rebuild_overlay(&world, &mut overlay);

        assert_eq!(overlay.len(), 7);
        assert!(overlay.is_blocked(Key::new(2, 0), None));
        assert!(!overlay.is_blocked(Key::new(2, 0), Some(rock)));
        assert!((overlay.base_cost(Key::new(0, 0), None) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn moved_obstacle_follows_position() {
        let mut world = World::new();
        let crate_box = world.new_entity().unwrap();
        world.add_component(crate_box, Obstacle { cost: 2.0 }).unwrap();
        world.add_component(crate_box, Position(Key::new(1, 1))).unwrap();
        let mut overlay = ObstacleOverlay::new();
        rebuild_overlay(&world, &mut overlay);
        assert!((overlay.base_cost(Key::new(1, 1), None) - 2.0).abs() < f64::EPSILON);

        world.add_component(crate_box, Position(Key::new(3, 3))).unwrap();
        rebuild_overlay(&world, &mut overlay);
        assert!((overlay.base_cost(Key::new(1, 1), None) - 1.0).abs() < f64::EPSILON);
        assert!((overlay.base_cost(Key::new(3, 3), None) - 2.0).abs() < f64::EPSILON);
    }
}
