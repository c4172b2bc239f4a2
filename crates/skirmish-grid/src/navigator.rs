//! A* search over hex adjacency.
//!
//! The search is independent of any particular field: callers describe the
//! graph through an `exists` predicate (which anchors the mover may occupy)
//! and a `cost` function (the multiplier for entering an anchor, `+∞` for
//! impassable). [`Navigator::navigate_occupant`] wires both to a [`Field`]
//! and an [`ObstacleOverlay`] for a given footprint size.
//!
//! The heuristic is the straight-line pixel distance between hex centres,
//! divided by the longest single-step pixel distance, times the step cost
//! and a heuristic scale. With the scale at or below the cheapest
//! multiplier in use it never overestimates, so returned paths are optimal.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap};

use serde::Serialize;
use skirmish_types::{Direction, Entity, Key, SizeClass};
use tracing::{debug, trace};

use crate::error::NavigateError;
use crate::field::Field;
use crate::geometry::Geometry;
use crate::obstacle::ObstacleOverlay;

/// Cost of one step into a hex with multiplier 1.
pub const DEFAULT_STEP_COST: f64 = 1.0;

/// Expansions allowed before a search gives up.
pub const DEFAULT_SEARCH_LIMIT: usize = 10_000;

/// One waypoint of a resolved path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NavigateStep {
    /// The anchor reached.
    pub key: Key,
    /// Cumulative cost from the start to this waypoint.
    pub cost: f64,
}

/// Open-set entry. Ordered so the max-heap pops the lowest `f`, then the
/// lowest `h`, then the lowest key.
#[derive(Debug, Clone, Copy)]
struct Frontier {
    f: f64,
    h: f64,
    key: Key,
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.h.total_cmp(&self.h))
            .then_with(|| other.key.cmp(&self.key))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

/// Configured A* path finder.
#[derive(Debug, Clone)]
pub struct Navigator<'g> {
    geometry: &'g Geometry,
    step_cost: f64,
    heuristic_scale: f64,
    search_limit: usize,
}

impl<'g> Navigator<'g> {
    /// A navigator with the default step cost, heuristic scale 1 and the
    /// default search limit.
    pub const fn new(geometry: &'g Geometry) -> Self {
        Self {
            geometry,
            step_cost: DEFAULT_STEP_COST,
            heuristic_scale: 1.0,
            search_limit: DEFAULT_SEARCH_LIMIT,
        }
    }

    /// Set the cost of a step into a hex with multiplier 1. Negative or NaN
    /// values fall back to the default.
    #[must_use]
    pub fn with_step_cost(mut self, step_cost: f64) -> Self {
        self.step_cost = if step_cost.is_finite() && step_cost >= 0.0 {
            step_cost
        } else {
            DEFAULT_STEP_COST
        };
        self
    }

    /// Set the heuristic scale. Lower it to the smallest cost multiplier in
    /// use to keep the heuristic admissible; zero degrades to Dijkstra.
    #[must_use]
    pub fn with_heuristic_scale(mut self, scale: f64) -> Self {
        self.heuristic_scale = if scale.is_finite() { scale.max(0.0) } else { 1.0 };
        self
    }

    /// Set how many nodes may be expanded before giving up.
    #[must_use]
    pub const fn with_search_limit(mut self, limit: usize) -> Self {
        self.search_limit = limit;
        self
    }

    /// The configured step cost.
    pub const fn step_cost(&self) -> f64 {
        self.step_cost
    }

    /// The configured expansion limit.
    pub const fn search_limit(&self) -> usize {
        self.search_limit
    }

    /// Cheapest path from `start` to `goal`.
    ///
    /// `exists` decides graph membership and `cost` the multiplier for
    /// entering a node. The returned steps exclude `start`; when
    /// `start == goal` the path is empty.
    pub fn navigate<E, C>(
        &self,
        start: Key,
        goal: Key,
        exists: E,
        cost: C,
    ) -> Result<Vec<NavigateStep>, NavigateError>
    where
        E: Fn(Key) -> bool,
        C: Fn(Key) -> f64,
    {
        self.search(start, goal, &exists, &cost, self.heuristic_scale)
    }

    /// Cheapest path for an occupant of `size` across `field`, with costs
    /// taken from `overlay`. Obstacles owned by `mover` are ignored.
    pub fn navigate_occupant(
        &self,
        field: &Field,
        overlay: &ObstacleOverlay,
        size: SizeClass,
        mover: Option<Entity>,
        start: Key,
        goal: Key,
    ) -> Result<Vec<NavigateStep>, NavigateError> {
        let scale = self.heuristic_scale.min(overlay.min_cost());
        self.search(
            start,
            goal,
            &|k: Key| field.footprint_valid(k, size),
            &|k: Key| overlay.footprint_cost(k, size, mover),
            scale,
        )
    }

    fn heuristic(&self, from: Key, goal: Key, scale: f64) -> f64 {
        let step = self.geometry.step_distance();
        if step <= 0.0 {
            return 0.0;
        }
        self.geometry.pixel_distance(from, goal) / step * self.step_cost * scale
    }

    fn search(
        &self,
        start: Key,
        goal: Key,
        exists: &dyn Fn(Key) -> bool,
        cost: &dyn Fn(Key) -> f64,
        scale: f64,
    ) -> Result<Vec<NavigateStep>, NavigateError> {
        if !exists(start) {
            return Err(NavigateError::MissingEndpoint { key: start });
        }
        if !exists(goal) {
            return Err(NavigateError::MissingEndpoint { key: goal });
        }
        if start == goal {
            return Ok(Vec::new());
        }

        let mut open = BinaryHeap::new();
        let mut best: BTreeMap<Key, f64> = BTreeMap::new();
        let mut came_from: BTreeMap<Key, Key> = BTreeMap::new();
        let mut closed: BTreeSet<Key> = BTreeSet::new();
        let mut expanded: usize = 0;

        let h = self.heuristic(start, goal, scale);
        best.insert(start, 0.0);
        open.push(Frontier { f: h, h, key: start });

        while let Some(Frontier { key: current, .. }) = open.pop() {
            if !closed.insert(current) {
                continue;
            }
            if current == goal {
                debug!(%start, %goal, expanded, "Route found");
                return Ok(reconstruct(&came_from, &best, start, goal));
            }
            if expanded >= self.search_limit {
                debug!(%start, %goal, limit = self.search_limit, "Search limit reached");
                return Err(NavigateError::SearchExhausted {
                    start,
                    goal,
                    limit: self.search_limit,
                });
            }
            expanded = expanded.saturating_add(1);

            let g = best.get(&current).copied().unwrap_or(f64::INFINITY);
            for d in Direction::ALL {
                let Some(next) = current.neighbor(d) else {
                    continue;
                };
                if closed.contains(&next) || !exists(next) {
                    continue;
                }
                let multiplier = cost(next);
                if multiplier.is_nan() || multiplier.is_infinite() {
                    continue;
                }
                let tentative = g + self.step_cost * multiplier.max(0.0);
                let improves = best.get(&next).is_none_or(|&known| tentative < known);
                if improves {
                    best.insert(next, tentative);
                    came_from.insert(next, current);
                    let h = self.heuristic(next, goal, scale);
                    trace!(key = %next, g = tentative, h, "Frontier push");
                    open.push(Frontier {
                        f: tentative + h,
                        h,
                        key: next,
                    });
                }
            }
        }

        debug!(%start, %goal, expanded, "No route");
        Err(NavigateError::Unreachable { start, goal })
    }
}

fn reconstruct(
    came_from: &BTreeMap<Key, Key>,
    best: &BTreeMap<Key, f64>,
    start: Key,
    goal: Key,
) -> Vec<NavigateStep> {
    let mut steps = Vec::new();
    let mut current = goal;
    while current != start {
        steps.push(NavigateStep {
            key: current,
            cost: best.get(&current).copied().unwrap_or(f64::INFINITY),
        });
        match came_from.get(&current) {
            Some(&previous) => current = previous,
            None => break,
        }
    }
    steps.reverse();
    steps
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn field(w: u32, h: u32) -> Field {
        Field::rectangle(Geometry::default(), w, h).unwrap()
    }

    fn uniform(f: &Field, start: Key, goal: Key) -> Result<Vec<NavigateStep>, NavigateError> {
        Navigator::new(f.geometry()).navigate(start, goal, |k| f.contains(k), |_| 1.0)
    }

    #[test]
    fn start_equals_goal_is_empty() {
        let f = field(4, 4);
        assert_eq!(uniform(&f, Key::new(1, 1), Key::new(1, 1)).unwrap(), Vec::new());
    }

    #[test]
    fn missing_endpoints() {
        let f = field(4, 4);
        assert_eq!(
            uniform(&f, Key::new(9, 9), Key::new(1, 1)),
            Err(NavigateError::MissingEndpoint { key: Key::new(9, 9) })
        );
        assert_eq!(
            uniform(&f, Key::new(1, 1), Key::new(-1, 0)),
            Err(NavigateError::MissingEndpoint { key: Key::new(-1, 0) })
        );
    }

    #[test]
    fn uniform_paths_are_optimal() {
        let f = field(8, 24);
        let keys: Vec<Key> = f.keys().collect();
        let start = Key::new(0, 0);
        for goal in keys.iter().step_by(5) {
            let path = uniform(&f, start, *goal).unwrap();
            assert_eq!(path.len(), usize::try_from(start.hexes_from(*goal)).unwrap());
            let mut previous = start;
            let mut previous_cost = 0.0;
            for step in &path {
                assert!(previous.direction_to(step.key).is_some());
                assert!(step.cost > previous_cost);
                previous = step.key;
                previous_cost = step.cost;
            }
            assert_eq!(path.last().map_or(start, |s| s.key), *goal);
        }
    }

    #[test]
    fn wall_makes_goal_unreachable() {
        let f = field(6, 12);
        let start = Key::new(0, 0);
        let goal = Key::new(0, 10);
        // Every hex on half-rows 4 and 5 is impassable.
        let result = Navigator::new(f.geometry()).navigate(
            start,
            goal,
            |k| f.contains(k),
            |k| if k.n == 4 || k.n == 5 { f64::INFINITY } else { 1.0 },
        );
        assert_eq!(result, Err(NavigateError::Unreachable { start, goal }));
    }

    #[test]
    fn detours_around_expensive_hexes() {
        let f = field(6, 12);
        let mut overlay = ObstacleOverlay::new();
        overlay.insert(Entity::from_raw(9), Key::new(0, 4), SizeClass::Small, f64::INFINITY);
        let nav = Navigator::new(f.geometry());
        let path = nav
            .navigate_occupant(&f, &overlay, SizeClass::Small, None, Key::new(0, 2), Key::new(0, 6))
            .unwrap();
        assert!(path.iter().all(|s| s.key != Key::new(0, 4)));
        assert_eq!(path.last().map(|s| s.key), Some(Key::new(0, 6)));
        assert_eq!(path.len(), 3);
    }

    #[test]
    fn mover_is_not_blocked_by_itself() {
        let f = field(6, 12);
        let me = Entity::from_raw(1);
        let mut overlay = ObstacleOverlay::new();
        overlay.insert(me, Key::new(2, 4), SizeClass::Large, f64::INFINITY);
        let nav = Navigator::new(f.geometry());
        let path = nav
            .navigate_occupant(&f, &overlay, SizeClass::Large, Some(me), Key::new(2, 4), Key::new(2, 6))
            .unwrap();
        assert_eq!(path.len(), 1);
        let blocked =
            nav.navigate_occupant(&f, &overlay, SizeClass::Large, None, Key::new(2, 4), Key::new(2, 6));
        assert!(blocked.is_err());
    }

    #[test]
    fn cheap_terrain_is_preferred() {
        let f = field(6, 12);
        let mut overlay = ObstacleOverlay::new();
        // A road of cheap hexes down column 1.
        for n in 0..12 {
            overlay.insert(Entity::from_raw(50), Key::new(1, n), SizeClass::Small, 0.25);
        }
        let nav = Navigator::new(f.geometry());
        let path = nav
            .navigate_occupant(&f, &overlay, SizeClass::Small, None, Key::new(1, 0), Key::new(1, 10))
            .unwrap();
        let total = path.last().map_or(f64::INFINITY, |s| s.cost);
        assert!(total <= 5.0 * 0.25 + 1e-9);
    }

    #[test]
    fn search_limit_reports_exhaustion() {
        let f = field(8, 24);
        let nav = Navigator::new(f.geometry()).with_search_limit(2);
        let result = nav.navigate(Key::new(0, 0), Key::new(7, 23), |k| f.contains(k), |_| 1.0);
        assert!(matches!(result, Err(NavigateError::SearchExhausted { limit: 2, .. })));
    }

    #[test]
    fn step_cost_scales_cumulative_cost() {
        let f = field(4, 8);
        let nav = Navigator::new(f.geometry()).with_step_cost(2.5);
        let path = nav
            .navigate(Key::new(0, 0), Key::new(0, 4), |k| f.contains(k), |_| 1.0)
            .unwrap();
        let costs: Vec<f64> = path.iter().map(|s| s.cost).collect();
        assert_eq!(costs.len(), 2);
        assert!((costs.last().copied().unwrap() - 5.0).abs() < 1e-9);
    }
}
