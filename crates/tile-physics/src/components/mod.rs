pub mod body;
pub mod entity;
pub mod fixture;
pub mod joint;

pub use body::{BodyDesc, BodyStatus, BodyType, PhysicsComponent};
pub use entity::Entity;
pub use fixture::{Fixture, FixtureProxy};
pub use joint::{Joint, JointId, JointKind};
