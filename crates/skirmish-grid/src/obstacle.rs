//! Per-hex traversal costs derived from obstacles.
//!
//! Obstacles may be anchored at any footprint size. The overlay expands each
//! one to the base hexes it covers and remembers which entity put it there,
//! so a mover is never blocked by its own body.

use std::collections::BTreeMap;

use skirmish_types::{Entity, Key, SizeClass};
use tracing::warn;

use crate::footprint::Footprint;

/// Cost multiplier of a hex no obstacle covers.
pub const OPEN_COST: f64 = 1.0;

/// Base-hex cost contributions, rebuilt every tick.
#[derive(Debug, Clone, Default)]
pub struct ObstacleOverlay {
    cells: BTreeMap<Key, Vec<(Entity, f64)>>,
}

impl ObstacleOverlay {
    /// An overlay with no obstacles.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget every obstacle.
    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Number of base hexes covered by at least one obstacle.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether no obstacle has been inserted.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Record `owner`'s obstacle of `size` anchored at `anchor`.
    ///
    /// `cost` is clamped to `[0, ∞]`; NaN is treated as impassable.
    pub fn insert(&mut self, owner: Entity, anchor: Key, size: SizeClass, cost: f64) {
        let cost = if cost.is_nan() {
            warn!(entity = %owner, "NaN obstacle cost treated as impassable");
            f64::INFINITY
        } else {
            cost.max(0.0)
        };
        for key in Footprint::of(size).hexes(anchor) {
            self.cells.entry(key).or_default().push((owner, cost));
        }
    }

    /// Cost of entering `key` for a mover, ignoring obstacles owned by
    /// `ignore`. The highest obstacle cost wins; uncovered hexes cost
    /// [`OPEN_COST`].
    pub fn base_cost(&self, key: Key, ignore: Option<Entity>) -> f64 {
        self.cells
            .get(&key)
            .into_iter()
            .flatten()
            .filter(|(owner, _)| Some(*owner) != ignore)
            .map(|(_, cost)| *cost)
            .reduce(f64::max)
            .unwrap_or(OPEN_COST)
    }

    /// Cost of placing a footprint of `size` at `anchor`: the highest base
    /// cost across every hex it would cover.
    pub fn footprint_cost(&self, anchor: Key, size: SizeClass, ignore: Option<Entity>) -> f64 {
        Footprint::of(size)
            .hexes(anchor)
            .into_iter()
            .map(|k| self.base_cost(k, ignore))
            .fold(0.0, f64::max)
    }

    /// Whether `key` is impassable for a mover other than `ignore`.
    pub fn is_blocked(&self, key: Key, ignore: Option<Entity>) -> bool {
        self.base_cost(key, ignore).is_infinite()
    }

    /// Entities with an obstacle on `key`, in insertion order.
    pub fn owners_at(&self, key: Key) -> Vec<Entity> {
        self.cells
            .get(&key)
            .map(|v| v.iter().map(|(e, _)| *e).collect())
            .unwrap_or_default()
    }

    /// The cheapest multiplier any hex can have, never above
    /// [`OPEN_COST`]. Suitable as an admissible heuristic scale.
    pub fn min_cost(&self) -> f64 {
        self.cells
            .values()
            .flatten()
            .map(|(_, cost)| *cost)
            .fold(OPEN_COST, f64::min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: Entity = Entity::from_raw(1);
    const B: Entity = Entity::from_raw(2);

    #[test]
    fn uncovered_hex_is_open() {
        let overlay = ObstacleOverlay::new();
        assert!((overlay.base_cost(Key::new(0, 0), None) - OPEN_COST).abs() < f64::EPSILON);
        assert!(overlay.is_empty());
    }

    #[test]
    fn large_obstacle_covers_seven_hexes() {
        let mut overlay = ObstacleOverlay::new();
        overlay.insert(A, Key::new(2, 2), SizeClass::Large, f64::INFINITY);
        assert_eq!(overlay.len(), 7);
        assert!(overlay.is_blocked(Key::new(2, 4), None));
        assert!(!overlay.is_blocked(Key::new(2, 4), Some(A)));
        assert!(!overlay.is_blocked(Key::new(2, 6), None));
    }

    #[test]
    fn highest_cost_wins() {
        let mut overlay = ObstacleOverlay::new();
        overlay.insert(A, Key::new(1, 1), SizeClass::Small, 2.0);
        overlay.insert(B, Key::new(1, 1), SizeClass::Small, 3.0);
        assert!((overlay.base_cost(Key::new(1, 1), None) - 3.0).abs() < f64::EPSILON);
        assert!((overlay.base_cost(Key::new(1, 1), Some(B)) - 2.0).abs() < f64::EPSILON);
        assert_eq!(overlay.owners_at(Key::new(1, 1)), vec![A, B]);
    }

    #[test]
    fn footprint_cost_is_max_over_hexes() {
        let mut overlay = ObstacleOverlay::new();
        overlay.insert(A, Key::new(1, 2), SizeClass::Small, 4.0);
        // Medium anchored at (0,2) covers (1,2).
        let cost = overlay.footprint_cost(Key::new(0, 2), SizeClass::Medium, None);
        assert!((cost - 4.0).abs() < f64::EPSILON);
        let clear = overlay.footprint_cost(Key::new(0, 6), SizeClass::Medium, None);
        assert!((clear - OPEN_COST).abs() < f64::EPSILON);
    }

    #[test]
    fn nan_blocks_and_negative_clamps() {
        let mut overlay = ObstacleOverlay::new();
        overlay.insert(A, Key::new(0, 0), SizeClass::Small, f64::NAN);
        overlay.insert(B, Key::new(3, 0), SizeClass::Small, -2.0);
        assert!(overlay.is_blocked(Key::new(0, 0), None));
        assert!(overlay.base_cost(Key::new(3, 0), None).abs() < f64::EPSILON);
        assert!(overlay.min_cost().abs() < f64::EPSILON);
    }
}
