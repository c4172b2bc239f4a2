//! Shared type definitions for the Skirmish tactics core.
//!
//! This crate is the vocabulary every other crate in the workspace speaks:
//! entity identifiers, hex keys and directions, and the small enumerations
//! describing encounter state and occupants.
//!
//! # Modules
//!
//! - [`ids`] -- Counter-backed identifier newtypes and their allocator
//! - [`hex`] -- Hex offset keys, doubled coordinates, and directions
//! - [`enums`] -- Combat state, size class, faction, controller, stats,
//!   rejection reasons
//! - [`skill`] -- Skill content identifiers

pub mod enums;
pub mod hex;
pub mod ids;
pub mod skill;

// Re-export all public types at crate root for convenience.
pub use enums::{CombatState, Controller, Faction, RejectionReason, SizeClass, Stat};
pub use hex::{Direction, Key};
pub use ids::{Entity, IdAllocator, SubscriptionId};
pub use skill::SkillId;
