use std::collections::HashMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::types::{EntityId, PartitionId};
use crate::geometry::{Box2, Shape};

/// A broad-phase proxy cached on a fixture.
/// Filled in by the broad-phase collaborator when the fixture is indexed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixtureProxy {
    /// Broad-phase tree handle.
    pub proxy_id: u32,
    /// Child shape index (always 0 for single-child shapes).
    pub child_index: usize,
    /// World-space bounds at insertion time.
    pub aabb: Box2,
}

/// A named collision surface: one shape attached to one body.
///
/// Equality is structural (shape, filter masks and hardness); the id, the
/// owning body and the proxy cache do not take part.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fixture {
    /// Name of the fixture, unique within its body.
    pub id: String,
    pub shape: Shape,
    /// Layers this fixture occupies.
    #[serde(default)]
    pub collision_layer: u32,
    /// Layers this fixture collides with.
    #[serde(default)]
    pub collision_mask: u32,
    /// Hard fixtures block; soft ones only report overlap.
    #[serde(default = "default_hard")]
    pub hard: bool,
    /// Back-reference to the owning body.
    #[serde(skip)]
    pub(crate) body: Option<EntityId>,
    /// Broad-phase proxies per partition. Rebuilt on every (re)insertion.
    #[serde(skip)]
    pub proxies: HashMap<PartitionId, Vec<FixtureProxy>>,
}

fn default_hard() -> bool {
    true
}

impl Fixture {
    pub fn new(id: impl Into<String>, shape: impl Into<Shape>) -> Self {
        Self {
            id: id.into(),
            shape: shape.into(),
            collision_layer: 0,
            collision_mask: 0,
            hard: true,
            body: None,
            proxies: HashMap::new(),
        }
    }

    pub fn with_layer(mut self, layer: u32) -> Self {
        self.collision_layer = layer;
        self
    }

    pub fn with_mask(mut self, mask: u32) -> Self {
        self.collision_mask = mask;
        self
    }

    pub fn with_hard(mut self, hard: bool) -> Self {
        self.hard = hard;
        self
    }

    /// The body this fixture is attached to, if any.
    pub fn body(&self) -> Option<EntityId> {
        self.body
    }

    /// Detach from any body and forget cached proxies.
    /// Used before a fixture is (re)inserted.
    pub(crate) fn reset_for(&mut self, body: EntityId) {
        self.body = Some(body);
        self.proxies.clear();
    }

    pub fn local_bounds(&self, rotation: f32) -> Box2 {
        self.shape.compute_local_bounds(rotation)
    }

    pub fn world_bounds(&self, position: Vec2, rotation: f32) -> Box2 {
        self.local_bounds(rotation).translated(position)
    }

    /// Total proxies across every partition.
    pub fn proxy_count(&self) -> usize {
        self.proxies.values().map(Vec::len).sum()
    }
}

impl PartialEq for Fixture {
    fn eq(&self, other: &Self) -> bool {
        self.shape == other.shape
            && self.collision_layer == other.collision_layer
            && self.collision_mask == other.collision_mask
            && self.hard == other.hard
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::config::PhysicsConfig;
    use crate::geometry::{CircleShape, PolygonShape};

    fn square(half: f32) -> PolygonShape {
        PolygonShape::new_box(half, half, &PhysicsConfig::default()).unwrap()
    }

    #[test]
    fn equality_ignores_identity_and_proxies() {
        let mut a = Fixture::new("feet", square(0.5)).with_layer(1).with_mask(2);
        let b = Fixture::new("other-name", square(0.5)).with_layer(1).with_mask(2);
        a.reset_for(EntityId(4));
        a.proxies.insert(
            PartitionId(1),
            vec![FixtureProxy { proxy_id: 9, child_index: 0, aabb: Box2::EMPTY }],
        );
        assert_eq!(a, b);
        assert_ne!(a, b.clone().with_hard(false));
        assert_ne!(a, b.clone().with_mask(3));
        assert_ne!(a, Fixture::new("feet", square(0.6)).with_layer(1).with_mask(2));
    }

    #[test]
    fn reset_clears_proxy_cache() {
        let mut f = Fixture::new("f", CircleShape::new(1.0));
        f.proxies.insert(
            PartitionId(2),
            vec![FixtureProxy { proxy_id: 1, child_index: 0, aabb: Box2::EMPTY }],
        );
        assert_eq!(f.proxy_count(), 1);
        f.reset_for(EntityId(1));
        assert_eq!(f.proxy_count(), 0);
        assert_eq!(f.body(), Some(EntityId(1)));
    }

    #[test]
    fn world_bounds_are_translated() {
        let f = Fixture::new("c", CircleShape::new(0.5));
        let b = f.world_bounds(Vec2::new(10.0, 5.0), 0.0);
        assert!(b.approx_eq(&Box2::new(Vec2::new(9.5, 4.5), Vec2::new(10.5, 5.5)), 1e-6));
    }

    #[test]
    fn serde_defaults_and_skips() {
        let json = r#"{ "id": "hull", "shape": { "type": "Circle", "radius": 2.0 } }"#;
        let f: Fixture = serde_json::from_str(json).unwrap();
        assert!(f.hard);
        assert_eq!(f.collision_layer, 0);
        assert_eq!(f.body(), None);

        let out = serde_json::to_string(&f).unwrap();
        assert!(!out.contains("proxies"));
    }
}
