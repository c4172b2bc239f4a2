//! Pixel geometry of flat-topped hexagons.
//!
//! A hexagon is `wing + body + wing` pixels wide and `height` pixels tall:
//!
//! ```text
//!        body
//!      ________
//!     /        \      height
//!    /          \
//!    \          /
//!     \________/
//!  wing        wing
//! ```
//!
//! Hexes of one half-row sit `2 * (wing + body)` pixels apart; odd half-rows
//! are shifted right by `wing + body` and down by `height / 2`.
//!
//! Pixel lookup splits the plane into cells `(wing + body)` wide and
//! `height / 2` tall. The right `body` columns of a cell belong to exactly
//! one hex. The left `wing` columns are split along a wing edge between two
//! hexes, decided by a precomputed table per cell orientation.

use skirmish_types::Key;

use crate::error::GridError;

/// Default wing width in pixels.
pub const DEFAULT_WING: i32 = 7;
/// Default body width in pixels.
pub const DEFAULT_BODY: i32 = 10;
/// Default hex height in pixels.
pub const DEFAULT_HEIGHT: i32 = 16;

const MAX_DIMENSION: i32 = 512;

/// Stride constants and wing lookup tables for one hex size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Geometry {
    wing: i32,
    body: i32,
    height: i32,
    /// Wing cell in the upper half of the right-hand hex: `true` where the
    /// pixel belongs to that hex. Row-major, `wing` columns per row.
    upper: Vec<bool>,
    /// Wing cell in the lower half of the right-hand hex.
    lower: Vec<bool>,
}

impl Default for Geometry {
    fn default() -> Self {
        // The defaults are inside the validated range.
        Self::build(DEFAULT_WING, DEFAULT_BODY, DEFAULT_HEIGHT)
    }
}

impl Geometry {
    /// Create a geometry for the given hex dimensions.
    ///
    /// `wing` and `body` must be positive; `height` must be positive and
    /// even. Each is capped at 512 pixels.
    pub fn new(wing: i32, body: i32, height: i32) -> Result<Self, GridError> {
        let in_range = |v: i32| v > 0 && v <= MAX_DIMENSION;
        if !in_range(wing) || !in_range(body) || !in_range(height) || height % 2 != 0 {
            return Err(GridError::InvalidGeometry { wing, body, height });
        }
        Ok(Self::build(wing, body, height))
    }

    // SAFETY: callers guarantee every dimension lies in 1..=512, so all
    // products below stay far inside i32.
    #[allow(clippy::arithmetic_side_effects)]
    fn build(wing: i32, body: i32, height: i32) -> Self {
        let half = height / 2;
        let mut upper = Vec::new();
        let mut lower = Vec::new();
        for ly in 0..half {
            for lx in 0..wing {
                // Edge from the left tip (0, half) up to the top-left vertex.
                upper.push(half * lx + wing * ly >= wing * half);
                // Edge from the left tip (0, 0) down to the bottom-left vertex.
                lower.push(wing * ly <= half * lx);
            }
        }
        Self {
            wing,
            body,
            height,
            upper,
            lower,
        }
    }

    /// Wing width in pixels.
    pub const fn wing(&self) -> i32 {
        self.wing
    }

    /// Body width in pixels.
    pub const fn body(&self) -> i32 {
        self.body
    }

    /// Hex height in pixels.
    pub const fn height(&self) -> i32 {
        self.height
    }

    /// Horizontal offset between a hex and its odd-row neighbour.
    pub const fn half_stride(&self) -> i32 {
        self.wing.saturating_add(self.body)
    }

    /// Horizontal distance between hexes of the same half-row.
    pub const fn horizontal_stride(&self) -> i32 {
        self.half_stride().saturating_mul(2)
    }

    /// Vertical distance between consecutive half-rows.
    pub const fn vertical_stride(&self) -> i32 {
        self.height / 2
    }

    /// Pixel x of the centre of `key`.
    pub const fn x(&self, key: Key) -> i32 {
        let (c, _) = key.doubled();
        c.saturating_mul(self.half_stride())
            .saturating_add(self.wing)
            .saturating_add(self.body / 2)
    }

    /// Pixel y of the centre of `key`.
    pub const fn y(&self, key: Key) -> i32 {
        key.n
            .saturating_mul(self.vertical_stride())
            .saturating_add(self.vertical_stride())
    }

    /// Pixel centre of `key`.
    pub const fn center(&self, key: Key) -> (i32, i32) {
        (self.x(key), self.y(key))
    }

    /// Euclidean distance between two hex centres in pixels.
    pub fn pixel_distance(&self, a: Key, b: Key) -> f64 {
        let dx = f64::from(self.x(a)) - f64::from(self.x(b));
        let dy = f64::from(self.y(a)) - f64::from(self.y(b));
        dx.hypot(dy)
    }

    /// The longest centre-to-centre distance of a single step.
    pub fn step_distance(&self) -> f64 {
        let diagonal = f64::from(self.half_stride()).hypot(f64::from(self.vertical_stride()));
        let vertical = f64::from(self.height);
        diagonal.max(vertical)
    }

    /// The key of the hexagon containing pixel `(x, y)` on an unbounded
    /// grid. Exact for every pixel including negative coordinates.
    pub fn key_at(&self, x: i32, y: i32) -> Option<Key> {
        let cell_width = self.half_stride();
        let cell_height = self.vertical_stride();
        let i = x.div_euclid(cell_width);
        let lx = x.rem_euclid(cell_width);
        let j = y.div_euclid(cell_height);
        let ly = y.rem_euclid(cell_height);

        // The hex of doubled column `i` whose row parity matches it.
        let parity = i.rem_euclid(2);
        let upper_half = j.rem_euclid(2) == parity;
        let n_right = if upper_half { j } else { j.checked_sub(1)? };

        if lx >= self.wing {
            return Key::from_doubled(i, n_right);
        }

        let table = if upper_half { &self.upper } else { &self.lower };
        let index = usize::try_from(ly.checked_mul(self.wing)?.checked_add(lx)?).ok()?;
        if table.get(index).copied().unwrap_or(false) {
            Key::from_doubled(i, n_right)
        } else {
            let n_left = if upper_half { j.checked_sub(1)? } else { j };
            Key::from_doubled(i.checked_sub(1)?, n_left)
        }
    }

    /// Whether pixel `(x, y)` lies inside the polygon of `key`.
    ///
    /// Boundary pixels on a wing edge belong to the right-hand hex of the
    /// cell, matching [`Geometry::key_at`].
    pub fn contains_pixel(&self, key: Key, x: i32, y: i32) -> bool {
        let (c, _) = key.doubled();
        let wing = i64::from(self.wing);
        let half = i64::from(self.vertical_stride());
        let cell = i64::from(self.half_stride());
        let width = cell.saturating_add(wing);
        let left = i64::from(c).saturating_mul(cell);
        let top = i64::from(key.n).saturating_mul(half);
        let lx = i64::from(x).saturating_sub(left);
        let ly = i64::from(y).saturating_sub(top);
        if lx < 0 || lx >= width || ly < 0 || ly >= half.saturating_mul(2) {
            return false;
        }
        let upper = ly < half;
        let ly = if upper { ly } else { ly.saturating_sub(half) };
        if lx < wing {
            if upper {
                half.saturating_mul(lx).saturating_add(wing.saturating_mul(ly))
                    >= wing.saturating_mul(half)
            } else {
                wing.saturating_mul(ly) <= half.saturating_mul(lx)
            }
        } else if lx < cell {
            true
        } else {
            let rx = lx.saturating_sub(cell);
            if upper {
                wing.saturating_mul(ly) > half.saturating_mul(rx)
            } else {
                half.saturating_mul(rx).saturating_add(wing.saturating_mul(ly))
                    < wing.saturating_mul(half)
            }
        }
    }
}
