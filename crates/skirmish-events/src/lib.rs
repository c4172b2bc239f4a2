//! Domain events and the synchronous event bus for the Skirmish tactics core.
//!
//! The combat core never calls into the renderer, HUD or audio layers.
//! It announces every state change as an [`Event`] on an [`EventBus`], and
//! the outer layers subscribe to the [`EventKind`]s they care about.
//!
//! # Modules
//!
//! - [`event`] -- The [`Event`] enum and its [`EventKind`] subscription keys
//! - [`bus`] -- [`EventBus`], [`Subscription`] handles and [`EventRecorder`]

pub mod bus;
pub mod event;

pub use bus::{EventBus, EventRecorder, Subscription};
pub use event::{DamageFailure, Event, EventKind};
