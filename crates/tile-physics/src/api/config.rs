use serde::{Deserialize, Serialize};

use crate::error::PhysicsError;

/// Read-only physics configuration, injected by reference wherever a
/// shape or body needs a tunable.
/// Loaded from a JSON document; every missing field takes its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Upper bound on polygon vertex count (default: 8).
    pub max_polygon_vertices: usize,
    /// Reduce polygon vertex sets to their convex hull (default: true).
    pub convex_hulls: bool,
    /// Core radius added around every polygon (default: 0.01).
    pub polygon_radius: f32,
    /// Linear speed below which a body counts as resting (default: 0.01).
    pub linear_sleep_tolerance: f32,
    /// Angular speed below which a body counts as resting (default: 2°/s).
    pub angular_sleep_tolerance: f32,
    /// Seconds a body must rest before it is put to sleep (default: 0.5).
    pub time_to_sleep: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            max_polygon_vertices: 8,
            convex_hulls: true,
            polygon_radius: 0.01,
            linear_sleep_tolerance: 0.01,
            angular_sleep_tolerance: 2.0_f32.to_radians(),
            time_to_sleep: 0.5,
        }
    }
}

impl PhysicsConfig {
    /// Parse a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, PhysicsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_max_polygon_vertices(mut self, max: usize) -> Self {
        self.max_polygon_vertices = max;
        self
    }

    pub fn with_convex_hulls(mut self, enabled: bool) -> Self {
        self.convex_hulls = enabled;
        self
    }

    pub fn with_polygon_radius(mut self, radius: f32) -> Self {
        self.polygon_radius = radius;
        self
    }
}
