//! The entity/component store.
//!
//! Components are plain Rust values. Each component type gets its own
//! bucket, a `BTreeMap<Entity, T>` behind a type-erased [`Storage`] handle,
//! indexed by [`TypeId`]. Buckets exist only while they hold at least one
//! component; removing the last component of a type drops the bucket.
//!
//! Queries return owned, entity-ordered snapshots. Callers may freely
//! mutate components while walking a query result: the result does not
//! borrow any bucket, so no bucket can be resized underneath an iteration.

use std::any::{Any, TypeId, type_name};
use std::collections::{BTreeMap, BTreeSet};

use skirmish_types::{Entity, IdAllocator};
use tracing::trace;

use crate::error::EcsError;

/// Marker for values that can be stored as components.
///
/// Blanket-implemented for every `'static` type.
pub trait Component: Any {}

impl<T: Any> Component for T {}

/// Runtime handle naming a component type, used for multi-type queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComponentType {
    id: TypeId,
    name: &'static str,
}

impl ComponentType {
    /// The handle for component type `T`.
    pub fn of<T: Component>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// Fully qualified type name, for diagnostics.
    pub const fn name(self) -> &'static str {
        self.name
    }
}

/// Type-erased view of one component bucket.
trait Storage {
    fn remove(&mut self, entity: Entity) -> bool;
    fn contains(&self, entity: Entity) -> bool;
    fn len(&self) -> usize;
    fn entities(&self) -> Vec<Entity>;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Concrete bucket for component type `T`.
struct Bucket<T> {
    items: BTreeMap<Entity, T>,
}

impl<T: Component> Storage for Bucket<T> {
    fn remove(&mut self, entity: Entity) -> bool {
        self.items.remove(&entity).is_some()
    }

    fn contains(&self, entity: Entity) -> bool {
        self.items.contains_key(&entity)
    }

    fn len(&self) -> usize {
        self.items.len()
    }

    fn entities(&self) -> Vec<Entity> {
        self.items.keys().copied().collect()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Owner of all entities and their components.
#[derive(Default)]
pub struct World {
    /// Monotonic id source; ids are never reused.
    ids: IdAllocator,
    /// Registered entities.
    entities: BTreeSet<Entity>,
    /// One bucket per component type currently in use.
    buckets: BTreeMap<TypeId, Box<dyn Storage>>,
}

impl core::fmt::Debug for World {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("World")
            .field("entities", &self.entities.len())
            .field("component_types", &self.buckets.len())
            .finish()
    }
}

impl World {
    /// Create an empty world.
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------------------------------------------------
    // Entities
    // -------------------------------------------------------------------

    /// Register a fresh entity.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::IdSpaceExhausted`] once `u64::MAX` ids have been
    /// handed out.
    pub fn new_entity(&mut self) -> Result<Entity, EcsError> {
        let raw = self.ids.allocate().ok_or(EcsError::IdSpaceExhausted)?;
        let entity = Entity::from_raw(raw);
        self.entities.insert(entity);
        trace!(%entity, "Entity created");
        Ok(entity)
    }

    /// Whether the entity is currently registered.
    pub fn contains(&self, entity: Entity) -> bool {
        self.entities.contains(&entity)
    }

    /// Number of registered entities.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// All registered entities in allocation order.
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities.iter().copied()
    }

    /// Remove an entity and every component attached to it.
    ///
    /// Returns `false` if the entity was not registered.
    pub fn destroy_entity(&mut self, entity: Entity) -> bool {
        if !self.entities.remove(&entity) {
            return false;
        }
        for bucket in self.buckets.values_mut() {
            bucket.remove(entity);
        }
        self.buckets.retain(|_, bucket| bucket.len() > 0);
        trace!(%entity, "Entity destroyed");
        true
    }

    // -------------------------------------------------------------------
    // Components
    // -------------------------------------------------------------------

    /// Attach `component` to `entity`, replacing any existing component of
    /// the same type. Returns the replaced value.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::UnknownEntity`] if the entity is not registered.
    pub fn add_component<T: Component>(
        &mut self,
        entity: Entity,
        component: T,
    ) -> Result<Option<T>, EcsError> {
        if !self.contains(entity) {
            return Err(EcsError::UnknownEntity(entity));
        }
        let bucket = self
            .buckets
            .entry(TypeId::of::<T>())
            .or_insert_with(|| -> Box<dyn Storage> {
                Box::new(Bucket::<T> {
                    items: BTreeMap::new(),
                })
            })
            .as_any_mut()
            .downcast_mut::<Bucket<T>>()
            .ok_or(EcsError::MissingComponent {
                entity,
                component: type_name::<T>(),
            })?;
        Ok(bucket.items.insert(entity, component))
    }

    /// The component of type `T` on `entity`, if present.
    pub fn component<T: Component>(&self, entity: Entity) -> Option<&T> {
        self.bucket::<T>()?.items.get(&entity)
    }

    /// Mutable access to the component of type `T` on `entity`, if present.
    pub fn component_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        self.bucket_mut::<T>()?.items.get_mut(&entity)
    }

    /// Whether `entity` carries a component of type `T`.
    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        self.component::<T>(entity).is_some()
    }

    /// Like [`component`](Self::component), but absence is an error value
    /// that names the missing type.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::MissingComponent`] if the component is absent.
    pub fn require<T: Component>(&self, entity: Entity) -> Result<&T, EcsError> {
        self.component::<T>(entity)
            .ok_or(EcsError::MissingComponent {
                entity,
                component: type_name::<T>(),
            })
    }

    /// Mutable counterpart of [`require`](Self::require).
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::MissingComponent`] if the component is absent.
    pub fn require_mut<T: Component>(&mut self, entity: Entity) -> Result<&mut T, EcsError> {
        self.component_mut::<T>(entity)
            .ok_or(EcsError::MissingComponent {
                entity,
                component: type_name::<T>(),
            })
    }

    /// Detach and return the component of type `T` from `entity`.
    pub fn remove_component<T: Component>(&mut self, entity: Entity) -> Option<T> {
        let removed = self.bucket_mut::<T>()?.items.remove(&entity);
        self.collect_empty::<T>();
        removed
    }

    /// Remove every component of type `T` from every entity. Returns how
    /// many were removed.
    pub fn remove_type<T: Component>(&mut self) -> usize {
        self.buckets
            .remove(&TypeId::of::<T>())
            .map_or(0, |bucket| bucket.len())
    }

    /// Number of entities carrying a component of type `T`.
    pub fn count<T: Component>(&self) -> usize {
        self.bucket::<T>().map_or(0, |b| b.items.len())
    }

    /// Iterate over `(entity, component)` pairs of type `T` in entity order.
    pub fn iter<T: Component>(&self) -> impl Iterator<Item = (Entity, &T)> + '_ {
        self.bucket::<T>()
            .into_iter()
            .flat_map(|b| b.items.iter().map(|(e, c)| (*e, c)))
    }

    // -------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------

    /// Entities that carry **every** listed component type, in entity order.
    ///
    /// Empty when `types` is empty or when any listed type has no bucket.
    pub fn get(&self, types: &[ComponentType]) -> Vec<Entity> {
        let mut buckets = Vec::with_capacity(types.len());
        for t in types {
            let Some(bucket) = self.buckets.get(&t.id) else {
                return Vec::new();
            };
            buckets.push(bucket.as_ref());
        }
        // Walk the smallest bucket, probe the rest.
        buckets.sort_by_key(|b| b.len());
        let Some((smallest, rest)) = buckets.split_first() else {
            return Vec::new();
        };
        smallest
            .entities()
            .into_iter()
            .filter(|e| rest.iter().all(|b| b.contains(*e)))
            .collect()
    }

    /// Entities carrying component type `T`, in entity order.
    pub fn with<T: Component>(&self) -> Vec<Entity> {
        self.bucket::<T>()
            .map(|b| b.items.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Number of component types that currently have a bucket.
    pub fn component_type_count(&self) -> usize {
        self.buckets.len()
    }

    // -------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------

    fn bucket<T: Component>(&self) -> Option<&Bucket<T>> {
        self.buckets
            .get(&TypeId::of::<T>())?
            .as_any()
            .downcast_ref::<Bucket<T>>()
    }

    fn bucket_mut<T: Component>(&mut self) -> Option<&mut Bucket<T>> {
        self.buckets
            .get_mut(&TypeId::of::<T>())?
            .as_any_mut()
            .downcast_mut::<Bucket<T>>()
    }

    fn collect_empty<T: Component>(&mut self) {
        let id = TypeId::of::<T>();
        if self.buckets.get(&id).is_some_and(|b| b.len() == 0) {
            self.buckets.remove(&id);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Health(i32);

    #[derive(Debug, Clone, PartialEq)]
    struct Speed(u32);

    #[derive(Debug, Clone, PartialEq)]
    struct Name(&'static str);

    fn world_with(n: usize) -> (World, Vec<Entity>) {
        let mut world = World::new();
        let entities = (0..n).map(|_| world.new_entity().unwrap()).collect();
        (world, entities)
    }

    #[test]
    fn entity_ids_are_unique_and_not_reused() {
        let (mut world, entities) = world_with(3);
        let first = entities.first().copied().unwrap();
        assert!(world.destroy_entity(first));
        let fresh = world.new_entity().unwrap();
        assert!(!entities.contains(&fresh));
        assert_eq!(world.entity_count(), 3);
    }

    #[test]
    fn add_component_overwrites() {
        let (mut world, entities) = world_with(1);
        let e = entities.first().copied().unwrap();
        assert_eq!(world.add_component(e, Health(10)).unwrap(), None);
        assert_eq!(world.add_component(e, Health(7)).unwrap(), Some(Health(10)));
        assert_eq!(world.component::<Health>(e), Some(&Health(7)));
        assert_eq!(world.count::<Health>(), 1);
    }

    #[test]
    fn add_to_unknown_entity_fails() {
        let mut world = World::new();
        let ghost = Entity::from_raw(99);
        assert_eq!(
            world.add_component(ghost, Health(1)),
            Err(EcsError::UnknownEntity(ghost))
        );
    }

    #[test]
    fn absent_component_is_explicit() {
        let (world, entities) = world_with(1);
        let e = entities.first().copied().unwrap();
        assert!(world.component::<Health>(e).is_none());
        let err = world.require::<Health>(e).unwrap_err();
        assert!(matches!(err, EcsError::MissingComponent { entity, .. } if entity == e));
    }

    #[test]
    fn component_types_are_isolated() {
        let (mut world, entities) = world_with(1);
        let e = entities.first().copied().unwrap();
        world.add_component(e, Health(5)).unwrap();
        world.add_component(e, Speed(3)).unwrap();

        assert_eq!(world.remove_component::<Speed>(e), Some(Speed(3)));
        assert_eq!(world.component::<Health>(e), Some(&Health(5)));
        assert!(world.component::<Speed>(e).is_none());

        world.add_component(e, Speed(9)).unwrap();
        if let Some(h) = world.component_mut::<Health>(e) {
            h.0 = 1;
        }
        assert_eq!(world.component::<Speed>(e), Some(&Speed(9)));
    }

    #[test]
    fn empty_buckets_are_collected() {
        let (mut world, entities) = world_with(1);
        let e = entities.first().copied().unwrap();
        world.add_component(e, Health(5)).unwrap();
        assert_eq!(world.component_type_count(), 1);
        world.remove_component::<Health>(e);
        assert_eq!(world.component_type_count(), 0);
    }

    #[test]
    fn get_intersects_types() {
        let (mut world, entities) = world_with(4);
        for (i, e) in entities.iter().enumerate() {
            world.add_component(*e, Health(1)).unwrap();
            if i % 2 == 0 {
                world.add_component(*e, Speed(2)).unwrap();
            }
        }
        let both = world.get(&[ComponentType::of::<Health>(), ComponentType::of::<Speed>()]);
        let expected: Vec<Entity> = entities.iter().copied().step_by(2).collect();
        assert_eq!(both, expected);
    }

    #[test]
    fn get_with_missing_type_is_empty() {
        let (mut world, entities) = world_with(2);
        for e in &entities {
            world.add_component(*e, Health(1)).unwrap();
        }
        assert!(
            world
                .get(&[ComponentType::of::<Health>(), ComponentType::of::<Name>()])
                .is_empty()
        );
        assert!(world.get(&[]).is_empty());
    }

    #[test]
    fn remove_type_clears_every_entity() {
        let (mut world, entities) = world_with(3);
        for e in &entities {
            world.add_component(*e, Speed(1)).unwrap();
            world.add_component(*e, Health(1)).unwrap();
        }
        assert_eq!(world.remove_type::<Speed>(), 3);
        assert_eq!(world.remove_type::<Speed>(), 0);
        assert_eq!(world.count::<Health>(), 3);
    }

    #[test]
    fn destroy_removes_every_component() {
        let (mut world, entities) = world_with(2);
        let doomed = entities.first().copied().unwrap();
        let survivor = entities.get(1).copied().unwrap();
        world.add_component(doomed, Health(1)).unwrap();
        world.add_component(doomed, Name("doomed")).unwrap();
        world.add_component(survivor, Health(2)).unwrap();

        assert!(world.destroy_entity(doomed));
        assert!(!world.destroy_entity(doomed));
        assert!(world.component::<Health>(doomed).is_none());
        assert!(world.component::<Name>(doomed).is_none());
        assert_eq!(world.count::<Name>(), 0);
        assert_eq!(world.with::<Health>(), vec![survivor]);
    }

    #[test]
    fn mutation_while_walking_a_query() {
        let (mut world, entities) = world_with(3);
        for e in &entities {
            world.add_component(*e, Health(10)).unwrap();
        }
        for e in world.with::<Health>() {
            if let Some(h) = world.component_mut::<Health>(e) {
                h.0 -= 4;
            }
            world.add_component(e, Speed(1)).unwrap();
        }
        assert!(world.iter::<Health>().all(|(_, h)| h.0 == 6));
        assert_eq!(world.count::<Speed>(), 3);
    }
}
