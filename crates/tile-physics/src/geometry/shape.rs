//! Collision shapes.
//!
//! Shapes are values: changing a polygon's vertices recomputes every derived
//! field, and a fixture swaps its whole shape rather than editing one in place.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::aabb::Box2;
use super::hull::{convex_hull, ensure_ccw};
use crate::api::config::PhysicsConfig;
use crate::error::PhysicsError;

/// Tolerance for structural shape comparison.
pub const SHAPE_EPSILON: f32 = 1e-5;

// ---------------------------------------------------------------------------
// Polygon
// ---------------------------------------------------------------------------

/// Convex polygon with a rounded core radius.
///
/// Only the vertex list and an explicit radius override are serialized.
/// Normals and the effective radius are derived by [`PolygonShape::rebuild`]
/// after loading.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolygonShape {
    vertices: Vec<Vec2>,
    /// Set by [`PolygonShape::with_radius`]; `None` takes the configured radius.
    #[serde(default, rename = "radius", skip_serializing_if = "Option::is_none")]
    radius_override: Option<f32>,
    #[serde(skip)]
    normals: Vec<Vec2>,
    #[serde(skip)]
    radius: f32,
}

impl PolygonShape {
    /// Build a polygon from an arbitrary point set.
    pub fn new(points: &[Vec2], config: &PhysicsConfig) -> Result<Self, PhysicsError> {
        let mut shape = Self {
            radius: config.polygon_radius,
            ..Self::default()
        };
        shape.set_vertices(points, config)?;
        Ok(shape)
    }

    /// Axis-aligned box centred on the origin.
    pub fn new_box(half_width: f32, half_height: f32, config: &PhysicsConfig) -> Result<Self, PhysicsError> {
        let mut shape = Self {
            radius: config.polygon_radius,
            ..Self::default()
        };
        shape.set_as_box(half_width, half_height)?;
        Ok(shape)
    }

    /// Override the configured core radius. Survives [`PolygonShape::rebuild`]
    /// and is carried in snapshots.
    pub fn with_radius(mut self, radius: f32) -> Self {
        let radius = radius.max(0.0);
        self.radius = radius;
        self.radius_override = Some(radius);
        self
    }

    /// Replace the vertex set. With convex hulls enabled, triangles are
    /// normalised to counter-clockwise order and larger sets are hulled.
    /// Nothing changes unless the new set is valid.
    pub fn set_vertices(&mut self, points: &[Vec2], config: &PhysicsConfig) -> Result<(), PhysicsError> {
        let count = points.len();
        if !(3..=config.max_polygon_vertices).contains(&count) {
            return Err(PhysicsError::InvalidVertexCount {
                count,
                max: config.max_polygon_vertices,
            });
        }

        let mut vertices = points.to_vec();
        if config.convex_hulls {
            // Gift wrapping degenerates on collinear triples; winding is enough.
            if count == 3 {
                ensure_ccw(&mut vertices);
            } else {
                vertices = convex_hull(&vertices);
                if vertices.len() < 3 {
                    return Err(PhysicsError::InvalidVertexCount {
                        count: vertices.len(),
                        max: config.max_polygon_vertices,
                    });
                }
            }
        }

        let normals = compute_normals(&vertices)?;
        self.vertices = vertices;
        self.normals = normals;
        Ok(())
    }

    /// Trusted fast path for exactly four rectangle corners.
    ///
    /// Skips hulling: the caller guarantees the points are an axis-aligned
    /// rectangle in counter-clockwise order.
    pub fn set_vertices_rect(&mut self, points: &[Vec2]) -> Result<(), PhysicsError> {
        if points.len() != 4 {
            return Err(PhysicsError::NotARectangle(points.len()));
        }
        let normals = compute_normals(points)?;
        self.vertices = points.to_vec();
        self.normals = normals;
        Ok(())
    }

    pub fn set_as_box(&mut self, half_width: f32, half_height: f32) -> Result<(), PhysicsError> {
        self.set_vertices_rect(&[
            Vec2::new(-half_width, -half_height),
            Vec2::new(half_width, -half_height),
            Vec2::new(half_width, half_height),
            Vec2::new(-half_width, half_height),
        ])
    }

    /// Box rotated by `angle` around its own centre, then moved to `center`.
    pub fn set_as_box_rotated(
        &mut self,
        half_width: f32,
        half_height: f32,
        center: Vec2,
        angle: f32,
    ) -> Result<(), PhysicsError> {
        let rot = Vec2::from_angle(angle);
        let corners = [
            Vec2::new(-half_width, -half_height),
            Vec2::new(half_width, -half_height),
            Vec2::new(half_width, half_height),
            Vec2::new(-half_width, half_height),
        ]
        .map(|c| center + rot.rotate(c));
        let normals = compute_normals(&corners)?;
        self.vertices = corners.to_vec();
        self.normals = normals;
        Ok(())
    }

    /// Re-derive normals and radius after deserialization. The configured
    /// radius applies only when no override is set.
    pub fn rebuild(&mut self, config: &PhysicsConfig) -> Result<(), PhysicsError> {
        let points = std::mem::take(&mut self.vertices);
        match self.set_vertices(&points, config) {
            Ok(()) => {
                self.radius = self.radius_override.unwrap_or(config.polygon_radius);
                Ok(())
            }
            Err(e) => {
                self.vertices = points;
                Err(e)
            }
        }
    }

    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    pub fn normals(&self) -> &[Vec2] {
        &self.normals
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Bounds of the polygon rotated by `rotation` radians, grown by the
    /// core radius. A polygon without vertices yields `Box2::EMPTY`.
    pub fn compute_local_bounds(&self, rotation: f32) -> Box2 {
        if self.vertices.is_empty() {
            return Box2::EMPTY;
        }
        let rot = Vec2::from_angle(rotation);
        Box2::from_points(self.vertices.iter().map(|&v| rot.rotate(v))).enlarged(self.radius)
    }

    pub fn area(&self) -> f32 {
        super::hull::signed_area2(&self.vertices).abs() * 0.5
    }

    pub fn centroid(&self) -> Vec2 {
        let n = self.vertices.len();
        if n == 0 {
            return Vec2::ZERO;
        }
        let mut weighted = Vec2::ZERO;
        let mut area2 = 0.0;
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            let c = super::hull::cross(a, b);
            area2 += c;
            weighted += (a + b) * c;
        }
        if area2.abs() <= f32::EPSILON {
            return self.vertices.iter().copied().sum::<Vec2>() / n as f32;
        }
        weighted / (3.0 * area2)
    }

    /// Same radius override, same vertex count and every vertex pair within
    /// [`SHAPE_EPSILON`].
    pub fn approx_eq(&self, other: &PolygonShape) -> bool {
        let same_radius = match (self.radius_override, other.radius_override) {
            (None, None) => true,
            (Some(a), Some(b)) => (a - b).abs() <= SHAPE_EPSILON,
            _ => false,
        };
        same_radius
            && self.vertices.len() == other.vertices.len()
            && self
                .vertices
                .iter()
                .zip(&other.vertices)
                .all(|(a, b)| a.abs_diff_eq(*b, SHAPE_EPSILON))
    }
}

impl PartialEq for PolygonShape {
    fn eq(&self, other: &Self) -> bool {
        self.approx_eq(other)
    }
}

/// One unit outward normal per edge `i -> i+1`.
fn compute_normals(vertices: &[Vec2]) -> Result<Vec<Vec2>, PhysicsError> {
    let n = vertices.len();
    let mut normals = Vec::with_capacity(n);
    for i in 0..n {
        let edge = vertices[(i + 1) % n] - vertices[i];
        if edge.length_squared() <= f32::EPSILON * f32::EPSILON {
            return Err(PhysicsError::DegenerateEdge { index: i });
        }
        normals.push(Vec2::new(edge.y, -edge.x).normalize());
    }
    Ok(normals)
}

// ---------------------------------------------------------------------------
// Circle
// ---------------------------------------------------------------------------

/// Circle with a local centre offset.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CircleShape {
    #[serde(default)]
    pub position: Vec2,
    pub radius: f32,
}

impl CircleShape {
    pub fn new(radius: f32) -> Self {
        Self {
            position: Vec2::ZERO,
            radius,
        }
    }

    pub fn with_position(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    pub fn compute_local_bounds(&self, rotation: f32) -> Box2 {
        let center = Vec2::from_angle(rotation).rotate(self.position);
        Box2::from_center_half_extents(center, Vec2::splat(self.radius))
    }
}

impl PartialEq for CircleShape {
    fn eq(&self, other: &Self) -> bool {
        self.position.abs_diff_eq(other.position, SHAPE_EPSILON)
            && (self.radius - other.radius).abs() <= SHAPE_EPSILON
    }
}

// ---------------------------------------------------------------------------
// Shape
// ---------------------------------------------------------------------------

/// Any shape a fixture can carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Shape {
    Polygon(PolygonShape),
    Circle(CircleShape),
}

impl Shape {
    pub fn compute_local_bounds(&self, rotation: f32) -> Box2 {
        match self {
            Shape::Polygon(p) => p.compute_local_bounds(rotation),
            Shape::Circle(c) => c.compute_local_bounds(rotation),
        }
    }

    /// Refresh derived state (polygon normals and radius) for the current
    /// vertices.
    pub fn rebuild(&mut self, config: &PhysicsConfig) -> Result<(), PhysicsError> {
        match self {
            Shape::Polygon(p) => p.rebuild(config),
            Shape::Circle(_) => Ok(()),
        }
    }

    pub fn as_polygon(&self) -> Option<&PolygonShape> {
        match self {
            Shape::Polygon(p) => Some(p),
            _ => None,
        }
    }
}

impl From<PolygonShape> for Shape {
    fn from(p: PolygonShape) -> Self {
        Shape::Polygon(p)
    }
}

impl From<CircleShape> for Shape {
    fn from(c: CircleShape) -> Self {
        Shape::Circle(c)
    }
}
