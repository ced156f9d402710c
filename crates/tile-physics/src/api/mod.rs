pub mod config;
pub mod events;
pub mod types;

pub use config::PhysicsConfig;
pub use events::{EventBus, EventCallback, PhysicsEvent};
pub use types::{EntityId, PartitionId};
