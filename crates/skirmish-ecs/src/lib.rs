//! Entity/component store for the Skirmish tactics core.
//!
//! The [`World`] owns every entity and its typed components. It offers
//! creation and destruction, typed get/set, multi-type set-intersection
//! queries, and a tag layer for membership markers.
//!
//! # Modules
//!
//! - [`error`] -- [`EcsError`] for absent entities and components.
//! - [`world`] -- The [`World`] store and [`ComponentType`] query handles.
//! - [`tags`] -- [`Tag`] membership helpers built on a reserved component.

pub mod error;
pub mod tags;
pub mod world;

pub use error::EcsError;
pub use tags::{Tag, Tags};
pub use world::{Component, ComponentType, World};
