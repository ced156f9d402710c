//! Shape math: bounding boxes, convex hulls and collision shapes.
//! Implemented directly; no physics library primitives.

pub mod aabb;
pub mod hull;
pub mod shape;

pub use aabb::Box2;
pub use hull::{convex_hull, ensure_ccw};
pub use shape::{CircleShape, PolygonShape, Shape};
