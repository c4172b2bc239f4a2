//! The set of hexes an encounter is played on.
//!
//! A [`Field`] is built once per encounter and never changes shape. Each
//! hex's neighbours are resolved at construction by testing the six
//! parity-dependent candidates against the hexes that exist, so boundary
//! hexes simply have fewer of them.

use std::collections::{BTreeMap, BTreeSet};

use skirmish_types::{Direction, Key, SizeClass};
use tracing::debug;

use crate::error::GridError;
use crate::footprint::Footprint;
use crate::geometry::Geometry;

/// Immutable hex topology plus the geometry used to draw it.
#[derive(Debug, Clone)]
pub struct Field {
    geometry: Geometry,
    /// Every hex with its existing neighbours, in [`Direction::ALL`] order.
    hexes: BTreeMap<Key, Vec<(Direction, Key)>>,
}

impl Field {
    /// A field with columns `0..width` and half-rows `0..height`.
    pub fn rectangle(geometry: Geometry, width: u32, height: u32) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::EmptyField);
        }
        let (Ok(w), Ok(h)) = (i32::try_from(width), i32::try_from(height)) else {
            return Err(GridError::DimensionsTooLarge { width, height });
        };
        let keys = (0..h).flat_map(|n| (0..w).map(move |m| Key::new(m, n)));
        Self::from_keys(geometry, keys)
    }

    /// A field of arbitrary shape.
    pub fn from_keys<I>(geometry: Geometry, keys: I) -> Result<Self, GridError>
    where
        I: IntoIterator<Item = Key>,
    {
        let mut set = BTreeSet::new();
        for key in keys {
            if !set.insert(key) {
                return Err(GridError::DuplicateHex(key));
            }
        }
        if set.is_empty() {
            return Err(GridError::EmptyField);
        }

        let hexes: BTreeMap<Key, Vec<(Direction, Key)>> = set
            .iter()
            .map(|&key| {
                let neighbours = Direction::ALL
                    .into_iter()
                    .filter_map(|d| key.neighbor(d).map(|n| (d, n)))
                    .filter(|(_, n)| set.contains(n))
                    .collect();
                (key, neighbours)
            })
            .collect();

        debug!(hexes = hexes.len(), "Field built");
        Ok(Self { geometry, hexes })
    }

    /// The pixel geometry of this field.
    pub const fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Number of hexes.
    pub fn len(&self) -> usize {
        self.hexes.len()
    }

    /// Always `false`: construction rejects empty fields.
    pub fn is_empty(&self) -> bool {
        self.hexes.is_empty()
    }

    /// Whether `key` names a hex of this field.
    pub fn contains(&self, key: Key) -> bool {
        self.hexes.contains_key(&key)
    }

    /// All keys in ascending order.
    pub fn keys(&self) -> impl Iterator<Item = Key> + '_ {
        self.hexes.keys().copied()
    }

    /// Existing neighbours of `key`; empty when `key` is not on the field.
    pub fn neighbors(&self, key: Key) -> &[(Direction, Key)] {
        self.hexes.get(&key).map_or(&[][..], Vec::as_slice)
    }

    /// The neighbour of `key` in direction `d`, if both exist.
    pub fn neighbor(&self, key: Key, d: Direction) -> Option<Key> {
        self.neighbors(key)
            .iter()
            .find(|(dir, _)| *dir == d)
            .map(|(_, k)| *k)
    }

    /// The hex containing world pixel `(x, y)`, if it is on the field.
    pub fn at(&self, x: i32, y: i32) -> Option<Key> {
        self.geometry.key_at(x, y).filter(|k| self.contains(*k))
    }

    /// Pixel centre of `key`, if it is on the field.
    pub fn center(&self, key: Key) -> Option<(i32, i32)> {
        self.contains(key).then(|| self.geometry.center(key))
    }

    /// Whether an occupant of `size` fits when anchored at `anchor`.
    pub fn footprint_valid(&self, anchor: Key, size: SizeClass) -> bool {
        let footprint = Footprint::of(size);
        footprint.offsets().iter().all(|&(dc, dr)| {
            anchor
                .offset(dc, dr)
                .is_some_and(|k| self.contains(k))
        })
    }

    /// Anchors reachable by shifting a whole footprint of `size` one step.
    pub fn footprint_neighbors(&self, anchor: Key, size: SizeClass) -> Vec<(Direction, Key)> {
        if !self.footprint_valid(anchor, size) {
            return Vec::new();
        }
        Direction::ALL
            .into_iter()
            .filter_map(|d| anchor.neighbor(d).map(|n| (d, n)))
            .filter(|(_, n)| self.footprint_valid(*n, size))
            .collect()
    }

    /// Every anchor at which a footprint of `size` fits.
    pub fn footprint_anchors(&self, size: SizeClass) -> Vec<Key> {
        self.keys()
            .filter(|k| self.footprint_valid(*k, size))
            .collect()
    }
}
