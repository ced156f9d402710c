use glam::Vec2;

use crate::api::types::{EntityId, PartitionId};
use crate::components::entity::Entity;

/// Position lookup used to move fixture bounds into world space.
pub trait TransformLookup {
    /// World position and rotation of an entity.
    fn world_transform(&self, id: EntityId) -> Option<(Vec2, f32)>;

    /// Partition the entity lives in.
    fn partition(&self, id: EntityId) -> Option<PartitionId>;
}

/// Containment nesting deeper than this is treated as a cycle.
const MAX_CONTAINER_DEPTH: usize = 32;

/// Flat entity storage.
/// Sized for hundreds of entities, not millions.
#[derive(Debug, Default)]
pub struct Scene {
    entities: Vec<Entity>,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            entities: Vec::with_capacity(256),
        }
    }

    /// Add an entity. An existing entity with the same id is replaced.
    pub fn spawn(&mut self, entity: Entity) {
        match self.get_mut(entity.id) {
            Some(existing) => *existing = entity,
            None => self.entities.push(entity),
        }
    }

    /// Remove an entity. Anything it contained is dropped out at its position.
    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        let idx = self.entities.iter().position(|e| e.id == id)?;
        let removed = self.entities.swap_remove(idx);
        for e in self.entities.iter_mut().filter(|e| e.container == Some(id)) {
            e.container = None;
            e.pos = removed.pos;
            e.partition = removed.partition;
        }
        Some(removed)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    /// Put `child` inside `container`. Returns false if either is missing.
    pub fn insert_into(&mut self, child: EntityId, container: EntityId) -> bool {
        if child == container || self.get(container).is_none() {
            return false;
        }
        match self.get_mut(child) {
            Some(e) => {
                e.container = Some(container);
                true
            }
            None => false,
        }
    }

    /// Outermost entity holding `id` (itself if uncontained).
    pub fn outermost(&self, id: EntityId) -> Option<&Entity> {
        let mut current = self.get(id)?;
        for _ in 0..MAX_CONTAINER_DEPTH {
            match current.container.and_then(|c| self.get(c)) {
                Some(parent) => current = parent,
                None => return Some(current),
            }
        }
        log::warn!("container chain of {} is too deep or cyclic", id);
        None
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl TransformLookup for Scene {
    /// Contained entities report their outermost container's transform.
    fn world_transform(&self, id: EntityId) -> Option<(Vec2, f32)> {
        self.outermost(id).map(|e| (e.pos, e.rotation))
    }

    fn partition(&self, id: EntityId) -> Option<PartitionId> {
        self.outermost(id).and_then(|e| e.partition)
    }
}
