//! Hex addressing: [`Key`] offset coordinates and the six [`Direction`]s.
//!
//! Hexes are flat-topped. A key `(m, n)` names column pair `m` and half-row
//! `n`; odd half-rows sit half a stride to the right. Adjacency is simplest
//! in *doubled* coordinates, `c = 2m + (n mod 2)` and `r = n`, where every
//! neighbour is a fixed offset regardless of parity:
//!
//! | Direction | (dc, dr) |
//! |-----------|----------|
//! | North     | (0, -2)  |
//! | NorthEast | (1, -1)  |
//! | SouthEast | (1, 1)   |
//! | South     | (0, 2)   |
//! | SouthWest | (-1, 1)  |
//! | NorthWest | (-1, -1) |
//!
//! Pixel geometry lives in the grid crate; this module only knows topology.

use serde::{Deserialize, Serialize};

/// One of the six neighbour directions of a flat-topped hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Straight up.
    North,
    /// Up and to the right.
    NorthEast,
    /// Down and to the right.
    SouthEast,
    /// Straight down.
    South,
    /// Down and to the left.
    SouthWest,
    /// Up and to the left.
    NorthWest,
}

impl Direction {
    /// All directions, clockwise from North.
    pub const ALL: [Self; 6] = [
        Self::North,
        Self::NorthEast,
        Self::SouthEast,
        Self::South,
        Self::SouthWest,
        Self::NorthWest,
    ];

    /// The direction pointing back the way this one came.
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::NorthEast => Self::SouthWest,
            Self::SouthEast => Self::NorthWest,
            Self::South => Self::North,
            Self::SouthWest => Self::NorthEast,
            Self::NorthWest => Self::SouthEast,
        }
    }

    /// Offset of the neighbour in doubled coordinates.
    pub const fn doubled_offset(self) -> (i32, i32) {
        match self {
            Self::North => (0, -2),
            Self::NorthEast => (1, -1),
            Self::SouthEast => (1, 1),
            Self::South => (0, 2),
            Self::SouthWest => (-1, 1),
            Self::NorthWest => (-1, -1),
        }
    }
}

/// Offset coordinate of one hexagon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Key {
    /// Column pair index.
    pub m: i32,
    /// Half-row index.
    pub n: i32,
}

impl Key {
    /// Create a key from offset coordinates.
    pub const fn new(m: i32, n: i32) -> Self {
        Self { m, n }
    }

    /// Whether this hex sits on a shifted (odd) half-row.
    pub const fn is_odd_row(self) -> bool {
        self.n.rem_euclid(2) == 1
    }

    /// Convert to doubled coordinates `(c, r)`.
    pub const fn doubled(self) -> (i32, i32) {
        let c = self.m.saturating_mul(2).saturating_add(self.n.rem_euclid(2));
        (c, self.n)
    }

    /// Convert back from doubled coordinates.
    ///
    /// Returns `None` when `c` and `r` have different parity, which names
    /// no hex.
    pub const fn from_doubled(c: i32, r: i32) -> Option<Self> {
        let parity = r.rem_euclid(2);
        if c.rem_euclid(2) != parity {
            return None;
        }
        let m = c.saturating_sub(parity).div_euclid(2);
        Some(Self { m, n: r })
    }

    /// The key displaced by a doubled-coordinate offset.
    pub const fn offset(self, dc: i32, dr: i32) -> Option<Self> {
        let (c, r) = self.doubled();
        let Some(c) = c.checked_add(dc) else {
            return None;
        };
        let Some(r) = r.checked_add(dr) else {
            return None;
        };
        Self::from_doubled(c, r)
    }

    /// The adjacent key in direction `d`, whether or not it exists on any
    /// particular field.
    pub const fn neighbor(self, d: Direction) -> Option<Self> {
        let (dc, dr) = d.doubled_offset();
        self.offset(dc, dr)
    }

    /// Number of single-hex steps between two keys on an unobstructed grid.
    pub const fn hexes_from(self, other: Self) -> u32 {
        let (c1, r1) = self.doubled();
        let (c2, r2) = other.doubled();
        let dc = c1.abs_diff(c2);
        let dr = r1.abs_diff(r2);
        // dc and dr always share parity, so the halving is exact.
        dc.saturating_add(dr.saturating_sub(dc) / 2)
    }

    /// The direction leading to `other` if it is adjacent.
    pub fn direction_to(self, other: Self) -> Option<Direction> {
        Direction::ALL
            .into_iter()
            .find(|d| self.neighbor(*d) == Some(other))
    }
}

impl core::fmt::Display for Key {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({},{})", self.m, self.n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doubled_round_trip() {
        for m in -3..4 {
            for n in -5..6 {
                let key = Key::new(m, n);
                let (c, r) = key.doubled();
                assert_eq!(Key::from_doubled(c, r), Some(key));
            }
        }
    }

    #[test]
    fn mismatched_parity_names_no_hex() {
        assert_eq!(Key::from_doubled(1, 0), None);
        assert_eq!(Key::from_doubled(0, 1), None);
    }

    #[test]
    fn neighbours_follow_row_parity() {
        let even = Key::new(2, 4);
        assert_eq!(even.neighbor(Direction::NorthEast), Some(Key::new(2, 3)));
        assert_eq!(even.neighbor(Direction::NorthWest), Some(Key::new(1, 3)));
        assert_eq!(even.neighbor(Direction::North), Some(Key::new(2, 2)));

        let odd = Key::new(2, 5);
        assert_eq!(odd.neighbor(Direction::NorthEast), Some(Key::new(3, 4)));
        assert_eq!(odd.neighbor(Direction::SouthWest), Some(Key::new(2, 6)));
        assert_eq!(odd.neighbor(Direction::South), Some(Key::new(2, 7)));
    }

    #[test]
    fn opposite_leads_back() {
        let origin = Key::new(0, 3);
        for d in Direction::ALL {
            let there = origin.neighbor(d);
            assert!(there.is_some());
            let back = there.and_then(|k| k.neighbor(d.opposite()));
            assert_eq!(back, Some(origin));
            assert_eq!(d.opposite().opposite(), d);
        }
    }

    #[test]
    fn distance_counts_steps() {
        let origin = Key::new(0, 0);
        assert_eq!(origin.hexes_from(origin), 0);
        for d in Direction::ALL {
            let n = origin.neighbor(d);
            assert_eq!(n.map(|k| origin.hexes_from(k)), Some(1));
        }
        // Straight down two hexes.
        assert_eq!(origin.hexes_from(Key::new(0, 4)), 2);
        // Three diagonal steps to the south-east.
        assert_eq!(origin.hexes_from(Key::new(1, 3)), 3);
        assert_eq!(origin.hexes_from(Key::new(3, 2)), 6);
        assert_eq!(Key::new(3, 2).hexes_from(origin), 6);
    }

    #[test]
    fn direction_to_neighbour_only() {
        let a = Key::new(1, 1);
        assert_eq!(a.direction_to(Key::new(1, 3)), Some(Direction::South));
        assert_eq!(a.direction_to(Key::new(1, 5)), None);
        assert_eq!(a.direction_to(a), None);
    }

    #[test]
    fn key_display() {
        assert_eq!(Key::new(-1, 7).to_string(), "(-1,7)");
    }
}
