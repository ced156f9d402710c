pub mod broad_phase;
pub mod edges;
pub mod graph;
pub mod physics;
pub mod scene;

pub use broad_phase::{BroadPhase, NullBroadPhase};
pub use graph::{Contact, ContactId, JointGraph};
pub use physics::PhysicsWorld;
pub use scene::{Scene, TransformLookup};
