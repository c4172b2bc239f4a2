//! Error types for the `skirmish-ecs` crate.

use skirmish_types::Entity;

/// Errors that can occur during world-store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EcsError {
    /// The entity is not (or no longer) registered.
    #[error("unknown entity: {0}")]
    UnknownEntity(Entity),

    /// An entity expected to carry a component does not.
    #[error("entity {entity} has no {component} component")]
    MissingComponent {
        /// The entity that was queried.
        entity: Entity,
        /// Type name of the missing component.
        component: &'static str,
    },

    /// The entity id counter ran out.
    #[error("entity id space exhausted")]
    IdSpaceExhausted,
}
