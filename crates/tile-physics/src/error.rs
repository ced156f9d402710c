//! Error types for the physics core.

use thiserror::Error;

use crate::api::types::EntityId;

/// Errors raised by shape construction, body mutation and world bookkeeping.
#[derive(Error, Debug)]
pub enum PhysicsError {
    /// Polygon vertex count outside `3..=max`.
    #[error("polygon needs between 3 and {max} vertices, got {count}")]
    InvalidVertexCount {
        /// Number of points supplied.
        count: usize,
        /// Configured maximum.
        max: usize,
    },

    /// Two consecutive polygon vertices coincide.
    #[error("polygon edge {index} has zero length")]
    DegenerateEdge {
        /// Index of the edge's first vertex.
        index: usize,
    },

    /// The trusted rectangle path was handed something other than 4 corners.
    #[error("rectangle fast path needs exactly 4 points, got {0}")]
    NotARectangle(usize),

    /// No fixture with this id on the body.
    #[error("fixture '{fixture}' not found on {body}")]
    FixtureNotFound {
        /// Body that was searched.
        body: EntityId,
        /// Requested fixture id.
        fixture: String,
    },

    /// No physics body registered for this entity.
    #[error("no physics body for {0}")]
    MissingBody(EntityId),

    /// Both ends of a joint name the same body.
    #[error("joint cannot connect {0} to itself")]
    SelfJoint(EntityId),

    /// Joint handle does not refer to a live joint.
    #[error("joint not found")]
    MissingJoint,

    /// Joints cannot be reconstructed from a load-time body description.
    #[error("loading {count} joint(s) from a body description is not supported")]
    UnsupportedJointLoad {
        /// Number of joints in the description.
        count: usize,
    },

    /// Configuration or descriptor could not be parsed.
    #[error("invalid physics data: {0}")]
    Config(#[from] serde_json::Error),
}
