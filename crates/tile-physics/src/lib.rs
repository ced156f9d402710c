pub mod api;
pub mod core;
pub mod components;
pub mod geometry;
pub mod net;
pub mod error;

// Re-export key types at crate root for convenience
pub use api::config::PhysicsConfig;
pub use api::events::{EventBus, EventCallback, PhysicsEvent};
pub use api::types::{EntityId, PartitionId};
pub use components::body::{BodyDesc, BodyStatus, BodyType, PhysicsComponent};
pub use components::entity::Entity;
pub use components::fixture::{Fixture, FixtureProxy};
pub use components::joint::{Joint, JointId, JointKind};
pub use crate::core::broad_phase::{BroadPhase, NullBroadPhase};
pub use crate::core::graph::{Contact, ContactId, JointGraph};
pub use crate::core::physics::PhysicsWorld;
pub use crate::core::scene::{Scene, TransformLookup};
pub use error::PhysicsError;
pub use geometry::{Box2, CircleShape, PolygonShape, Shape};
pub use net::reconcile::ReconcileReport;
pub use net::state::{ComponentState, PhysicsComponentState};
