//! Hex geometry and navigation for the Skirmish tactics core.
//!
//! The grid is a field of flat-topped hexagons addressed by offset
//! [`Key`]s. This crate converts between pixels and keys, builds the
//! immutable neighbour table of a field, expands medium and large
//! occupants to their base hexes, folds obstacles into traversal costs,
//! and runs A* over the result.
//!
//! # Modules
//!
//! - [`error`] -- [`GridError`] for construction, [`NavigateError`] for
//!   searches.
//! - [`geometry`] -- Stride constants, pixel centres and exact pixel lookup.
//! - [`field`] -- The [`Field`] of existing hexes and its neighbour table.
//! - [`footprint`] -- [`Footprint`] offsets for every size class.
//! - [`obstacle`] -- [`ObstacleOverlay`] of per-hex costs.
//! - [`navigator`] -- The A* [`Navigator`].
//!
//! [`Key`]: skirmish_types::Key

pub mod error;
pub mod field;
pub mod footprint;
pub mod geometry;
pub mod navigator;
pub mod obstacle;

pub use error::{GridError, NavigateError};
pub use field::Field;
pub use footprint::Footprint;
pub use geometry::Geometry;
pub use navigator::{NavigateStep, Navigator};
pub use obstacle::ObstacleOverlay;
