//! Tag membership layered on top of the component store.
//!
//! Tags live in one reserved component, [`Tags`], holding a set of
//! [`Tag`] names. Membership is existence-based: tagging an entity twice
//! leaves it tagged once. When the last tag is removed the component goes
//! with it, so `Tags` never lingers empty.

use std::collections::BTreeSet;

use skirmish_types::Entity;

use crate::error::EcsError;
use crate::world::World;

/// A named membership marker, e.g. "holds the turn".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tag(&'static str);

impl Tag {
    /// Declare a tag.
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// The tag's name.
    pub const fn name(self) -> &'static str {
        self.0
    }
}

impl core::fmt::Display for Tag {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.0)
    }
}

/// Reserved component holding an entity's tag set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tags(BTreeSet<Tag>);

impl Tags {
    /// Whether the set contains `tag`.
    pub fn contains(&self, tag: Tag) -> bool {
        self.0.contains(&tag)
    }

    /// Iterate the tags in name order.
    pub fn iter(&self) -> impl Iterator<Item = Tag> + '_ {
        self.0.iter().copied()
    }
}

impl World {
    /// Tag `entity`. Returns `false` if it already carried the tag.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::UnknownEntity`] if the entity is not registered.
    pub fn tag(&mut self, entity: Entity, tag: Tag) -> Result<bool, EcsError> {
        if let Some(tags) = self.component_mut::<Tags>(entity) {
            return Ok(tags.0.insert(tag));
        }
        let mut tags = Tags::default();
        tags.0.insert(tag);
        self.add_component(entity, tags)?;
        Ok(true)
    }

    /// Whether `entity` carries `tag`.
    pub fn has_tag(&self, entity: Entity, tag: Tag) -> bool {
        self.component::<Tags>(entity)
            .is_some_and(|tags| tags.contains(tag))
    }

    /// Remove `tag` from `entity`. Returns whether it was present.
    pub fn remove_tag(&mut self, entity: Entity, tag: Tag) -> bool {
        let Some(tags) = self.component_mut::<Tags>(entity) else {
            return false;
        };
        let removed = tags.0.remove(&tag);
        if tags.0.is_empty() {
            self.remove_component::<Tags>(entity);
        }
        removed
    }

    /// Every entity carrying `tag`, in entity order.
    pub fn tagged(&self, tag: Tag) -> Vec<Entity> {
        self.iter::<Tags>()
            .filter(|(_, tags)| tags.contains(tag))
            .map(|(e, _)| e)
            .collect()
    }

    /// The first entity (lowest id) carrying `tag`, if any.
    pub fn any_tagged(&self, tag: Tag) -> Option<Entity> {
        self.iter::<Tags>()
            .find(|(_, tags)| tags.contains(tag))
            .map(|(e, _)| e)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const HERO: Tag = Tag::new("hero");
    const STUNNED: Tag = Tag::new("stunned");

    #[test]
    fn tagging_is_idempotent() {
        let mut world = World::new();
        let e = world.new_entity().unwrap();
        assert!(world.tag(e, HERO).unwrap());
        assert!(!world.tag(e, HERO).unwrap());
        assert_eq!(world.tagged(HERO), vec![e]);
        assert_eq!(world.component::<Tags>(e).map(|t| t.iter().count()), Some(1));
    }

    #[test]
    fn removing_last_tag_drops_component() {
        let mut world = World::new();
        let e = world.new_entity().unwrap();
        world.tag(e, HERO).unwrap();
        world.tag(e, STUNNED).unwrap();

        assert!(world.remove_tag(e, HERO));
        assert!(!world.has_tag(e, HERO));
        assert!(world.has_tag(e, STUNNED));

        assert!(world.remove_tag(e, STUNNED));
        assert!(world.component::<Tags>(e).is_none());
        assert!(!world.remove_tag(e, STUNNED));
    }

    #[test]
    fn any_tagged_prefers_lowest_id() {
        let mut world = World::new();
        let a = world.new_entity().unwrap();
        let b = world.new_entity().unwrap();
        world.tag(b, HERO).unwrap();
        world.tag(a, HERO).unwrap();
        assert_eq!(world.any_tagged(HERO), Some(a));
        assert_eq!(world.any_tagged(STUNNED), None);
    }

    #[test]
    fn tag_unknown_entity_fails() {
        let mut world = World::new();
        assert!(world.tag(Entity::from_raw(42), HERO).is_err());
    }
}
