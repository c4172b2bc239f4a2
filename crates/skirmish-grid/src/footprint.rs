//! Composite footprints for medium and large occupants.
//!
//! A [`Footprint`] is a fixed list of doubled-coordinate offsets relative to
//! an anchor hex. Every size class uses the same type; a small occupant's
//! footprint is just the anchor.

use skirmish_types::{Key, SizeClass};

use crate::geometry::Geometry;

const SMALL: [(i32, i32); 1] = [(0, 0)];
const MEDIUM: [(i32, i32); 4] = [(0, 0), (1, -1), (1, 1), (2, 0)];
const LARGE: [(i32, i32); 7] = [
    (0, 0),
    (0, -2),
    (1, -1),
    (1, 1),
    (0, 2),
    (-1, 1),
    (-1, -1),
];

/// Anchor-relative shape of an occupant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Footprint {
    size: SizeClass,
    offsets: &'static [(i32, i32)],
}

impl Footprint {
    /// The footprint of a size class.
    pub const fn of(size: SizeClass) -> Self {
        let offsets: &'static [(i32, i32)] = match size {
            SizeClass::Small => &SMALL,
            SizeClass::Medium => &MEDIUM,
            SizeClass::Large => &LARGE,
        };
        Self { size, offsets }
    }

    /// The size class this footprint describes.
    pub const fn size(self) -> SizeClass {
        self.size
    }

    /// Doubled-coordinate offsets from the anchor, anchor first.
    pub const fn offsets(self) -> &'static [(i32, i32)] {
        self.offsets
    }

    /// Base hexes covered when anchored at `anchor`.
    pub fn hexes(self, anchor: Key) -> Vec<Key> {
        self.offsets
            .iter()
            .filter_map(|&(dc, dr)| anchor.offset(dc, dr))
            .collect()
    }

    /// Whether the footprint anchored at `anchor` covers `key`.
    pub fn covers(self, anchor: Key, key: Key) -> bool {
        self.offsets
            .iter()
            .any(|&(dc, dr)| anchor.offset(dc, dr) == Some(key))
    }

    /// Mean pixel centre of the covered hexes.
    pub fn center(self, geometry: &Geometry, anchor: Key) -> (f64, f64) {
        let hexes = self.hexes(anchor);
        let (sx, sy) = hexes.iter().fold((0.0_f64, 0.0_f64), |(sx, sy), &k| {
            (sx + f64::from(geometry.x(k)), sy + f64::from(geometry.y(k)))
        });
        let count = f64::from(u32::try_from(hexes.len()).unwrap_or(1).max(1));
        (sx / count, sy / count)
    }

    /// Fewest single-hex steps between any hex of this footprint at
    /// `anchor` and any hex of `other` at `other_anchor`. Zero when they
    /// overlap.
    pub fn hexes_between(self, anchor: Key, other: Self, other_anchor: Key) -> u32 {
        let theirs = other.hexes(other_anchor);
        self.hexes(anchor)
            .iter()
            .flat_map(|mine| theirs.iter().map(move |t| mine.hexes_from(*t)))
            .min()
            .unwrap_or(u32::MAX)
    }
}
