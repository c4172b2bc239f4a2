//! Error types for the `skirmish-grid` crate.
//!
//! Field construction fails with [`GridError`]; path searches fail with
//! [`NavigateError`]. Queries about hexes that do not exist return `None`
//! rather than an error.

use skirmish_types::Key;

/// Errors raised while building geometry or fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    /// Geometry constants outside the supported range.
    #[error("invalid hex geometry: wing {wing}, body {body}, height {height}")]
    InvalidGeometry {
        /// Requested wing width.
        wing: i32,
        /// Requested body width.
        body: i32,
        /// Requested hex height.
        height: i32,
    },

    /// A field must contain at least one hex.
    #[error("field has no hexes")]
    EmptyField,

    /// The same key was supplied twice.
    #[error("duplicate hex key: {0}")]
    DuplicateHex(Key),

    /// Rectangle dimensions do not fit the key space.
    #[error("field dimensions {width}x{height} exceed the key range")]
    DimensionsTooLarge {
        /// Requested width in columns.
        width: u32,
        /// Requested height in half-rows.
        height: u32,
    },
}

/// Why a path search produced no route. All variants are ordinary outcomes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavigateError {
    /// The start or goal is not part of the searchable graph.
    #[error("endpoint {key} does not exist")]
    MissingEndpoint {
        /// The offending endpoint.
        key: Key,
    },

    /// Every route to the goal is impassable.
    #[error("no route from {start} to {goal}")]
    Unreachable {
        /// Search origin.
        start: Key,
        /// Search target.
        goal: Key,
    },

    /// The expansion limit was hit before the goal was reached.
    #[error("search from {start} to {goal} exhausted after {limit} expansions")]
    SearchExhausted {
        /// Search origin.
        start: Key,
        /// Search target.
        goal: Key,
        /// The configured expansion limit.
        limit: usize,
    },
}
