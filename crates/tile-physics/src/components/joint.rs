use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::types::EntityId;

slotmap::new_key_type! {
    /// Stable handle to a joint in the [`JointGraph`](crate::core::graph::JointGraph).
    pub struct JointId;
}

/// What a joint does to its two bodies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum JointKind {
    /// Rigidly locks two bodies together at the given local anchors.
    Weld { anchor_a: Vec2, anchor_b: Vec2 },
    /// Spring that pulls the anchors towards the rest length.
    Distance {
        anchor_a: Vec2,
        anchor_b: Vec2,
        length: f32,
        stiffness: f32,
        damping: f32,
    },
    /// Free rotation around the shared anchor (hinge).
    Revolute { anchor_a: Vec2, anchor_b: Vec2 },
}

/// A constraint linking exactly two bodies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Joint {
    pub id: String,
    pub body_a: EntityId,
    pub body_b: EntityId,
    pub kind: JointKind,
    /// Whether the two connected bodies may still generate contacts.
    #[serde(default)]
    pub collide_connected: bool,
}

impl Joint {
    pub fn new(id: impl Into<String>, body_a: EntityId, body_b: EntityId, kind: JointKind) -> Self {
        Self {
            id: id.into(),
            body_a,
            body_b,
            kind,
            collide_connected: false,
        }
    }

    /// Weld with both anchors at the body origins.
    pub fn weld(id: impl Into<String>, body_a: EntityId, body_b: EntityId) -> Self {
        Self::new(
            id,
            body_a,
            body_b,
            JointKind::Weld {
                anchor_a: Vec2::ZERO,
                anchor_b: Vec2::ZERO,
            },
        )
    }

    pub fn with_collide_connected(mut self, collide: bool) -> Self {
        self.collide_connected = collide;
        self
    }

    /// Whether both ends name the same body.
    pub fn is_self_joint(&self) -> bool {
        self.body_a == self.body_b
    }

    /// The endpoint opposite `body`, or `None` if `body` is not an endpoint.
    pub fn other(&self, body: EntityId) -> Option<EntityId> {
        if body == self.body_a {
            Some(self.body_b)
        } else if body == self.body_b {
            Some(self.body_a)
        } else {
            None
        }
    }

    pub fn connects(&self, a: EntityId, b: EntityId) -> bool {
        (self.body_a == a && self.body_b == b) || (self.body_a == b && self.body_b == a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn other_endpoint() {
        let j = Joint::weld("w", EntityId(1), EntityId(2));
        assert_eq!(j.other(EntityId(1)), Some(EntityId(2)));
        assert_eq!(j.other(EntityId(2)), Some(EntityId(1)));
        assert_eq!(j.other(EntityId(3)), None);
        assert!(j.connects(EntityId(2), EntityId(1)));
    }

    #[test]
    fn structural_equality_covers_kind_and_flag() {
        let a = Joint::weld("w", EntityId(1), EntityId(2));
        let b = a.clone().with_collide_connected(true);
        assert_ne!(a, b);
        let c = Joint::new(
            "w",
            EntityId(1),
            EntityId(2),
            JointKind::Revolute { anchor_a: Vec2::ZERO, anchor_b: Vec2::ZERO },
        );
        assert_ne!(a, c);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn serde_round_trip() {
        let j = Joint::new(
            "spring",
            EntityId(5),
            EntityId(6),
            JointKind::Distance {
                anchor_a: Vec2::new(0.5, 0.0),
                anchor_b: Vec2::ZERO,
                length: 2.0,
                stiffness: 40.0,
                damping: 1.5,
            },
        );
        let json = serde_json::to_string(&j).unwrap();
        let back: Joint = serde_json::from_str(&json).unwrap();
        assert_eq!(back, j);
    }
}
