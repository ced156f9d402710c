//! Convex hull reduction and winding helpers for polygon shapes.

use glam::Vec2;

/// 2D cross product (z component of the 3D cross).
#[inline]
pub fn cross(a: Vec2, b: Vec2) -> f32 {
    a.x * b.y - a.y * b.x
}

/// Twice the signed area of a polygon. Positive for counter-clockwise winding.
pub fn signed_area2(points: &[Vec2]) -> f32 {
    let n = points.len();
    (0..n).map(|i| cross(points[i], points[(i + 1) % n])).sum()
}

/// Reverse the point order in place if the polygon winds clockwise.
pub fn ensure_ccw(points: &mut [Vec2]) {
    if signed_area2(points) < 0.0 {
        points.reverse();
    }
}

/// Convex hull by gift wrapping, counter-clockwise, starting from the
/// lowest-x (then lowest-y) point. Collinear boundary points are dropped.
///
/// O(n·h) where h is the hull size.
pub fn convex_hull(points: &[Vec2]) -> Vec<Vec2> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let mut start = 0;
    for (i, p) in points.iter().enumerate().skip(1) {
        let s = points[start];
        if p.x < s.x || (p.x == s.x && p.y < s.y) {
            start = i;
        }
    }

    let mut hull = Vec::with_capacity(points.len());
    let mut current = start;

    // A hull can never have more vertices than the input.
    for _ in 0..points.len() {
        hull.push(points[current]);
        let origin = points[current];

        let Some(mut next) = points.iter().position(|&p| p != origin) else {
            break;
        };

        for (i, &p) in points.iter().enumerate() {
            if p == origin {
                continue;
            }
            let edge = points[next] - origin;
            let c = cross(edge, p - origin);
            // `p` right of the candidate edge: it is further clockwise, so the
            // candidate can't be a hull edge. Collinear: keep the farther point.
            if c < 0.0 || (c == 0.0 && origin.distance_squared(p) > edge.length_squared()) {
                next = i;
            }
        }

        if points[next] == points[start] {
            break;
        }
        current = next;
    }

    hull
}
