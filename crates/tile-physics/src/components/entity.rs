use glam::Vec2;

use crate::api::types::{EntityId, PartitionId};

/// The transform side of a simulated entity.
/// The physics body lives in the world, keyed by `id`; the entity only
/// answers "where is it and what holds it".
#[derive(Debug, Clone)]
pub struct Entity {
    /// Unique identifier.
    pub id: EntityId,
    /// Position in partition space.
    pub pos: Vec2,
    /// Rotation in radians.
    pub rotation: f32,
    /// The map or grid this entity is placed on, if any.
    pub partition: Option<PartitionId>,
    /// Entity holding this one (locker, backpack, vehicle...).
    pub container: Option<EntityId>,
}

impl Entity {
    /// Create a new entity with the given ID at the origin.
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            pos: Vec2::ZERO,
            rotation: 0.0,
            partition: None,
            container: None,
        }
    }

    pub fn with_pos(mut self, pos: Vec2) -> Self {
        self.pos = pos;
        self
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_partition(mut self, partition: PartitionId) -> Self {
        self.partition = Some(partition);
        self
    }

    pub fn inside(mut self, container: EntityId) -> Self {
        self.container = Some(container);
        self
    }

    pub fn is_contained(&self) -> bool {
        self.container.is_some()
    }
}
