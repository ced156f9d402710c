use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::components::body::{BodyStatus, BodyType};
use crate::components::fixture::Fixture;
use crate::components::joint::Joint;

/// Authoritative snapshot of one body, as sent between peers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicsComponentState {
    pub can_collide: bool,
    pub fixed_rotation: bool,
    pub status: BodyStatus,
    /// Ordered fixture list. Position matters: fixtures are diffed by index.
    pub fixtures: Vec<Fixture>,
    /// Ordered joint list. Reordering forces a rebuild.
    pub joints: Vec<Joint>,
    /// Mass in grams.
    pub mass_grams: f32,
    pub linear_velocity: Vec2,
    pub angular_velocity: f32,
    pub body_type: BodyType,
}

/// A replicated component snapshot. The physics engine only understands
/// the `Physics` kind; anything else is carried through as `Unknown`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ComponentState {
    Physics(PhysicsComponentState),
    #[serde(other)]
    Unknown,
}

impl ComponentState {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn as_physics(&self) -> Option<&PhysicsComponentState> {
        match self {
            ComponentState::Physics(state) => Some(state),
            ComponentState::Unknown => None,
        }
    }
}

impl From<PhysicsComponentState> for ComponentState {
    fn from(state: PhysicsComponentState) -> Self {
        ComponentState::Physics(state)
    }
}
