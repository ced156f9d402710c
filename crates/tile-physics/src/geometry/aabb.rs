use glam::Vec2;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Box2 {
    pub bottom_left: Vec2,
    pub top_right: Vec2,
}

impl Box2 {
    /// The zero-sized box at the origin.
    pub const EMPTY: Box2 = Box2 {
        bottom_left: Vec2::ZERO,
        top_right: Vec2::ZERO,
    };

    #[inline]
    pub fn new(bottom_left: Vec2, top_right: Vec2) -> Self {
        Self { bottom_left, top_right }
    }

    #[inline]
    pub fn from_center_half_extents(center: Vec2, half: Vec2) -> Self {
        Self::new(center - half, center + half)
    }

    /// Smallest box containing every point. Empty input yields `Box2::EMPTY`.
    pub fn from_points(points: impl IntoIterator<Item = Vec2>) -> Self {
        let mut iter = points.into_iter();
        let Some(first) = iter.next() else {
            return Self::EMPTY;
        };
        let (min, max) = iter.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Self::new(min, max)
    }

    #[inline]
    pub fn union(&self, other: &Box2) -> Box2 {
        Box2::new(
            self.bottom_left.min(other.bottom_left),
            self.top_right.max(other.top_right),
        )
    }

    /// Grow by `r` in every direction.
    #[inline]
    pub fn enlarged(&self, r: f32) -> Box2 {
        let e = Vec2::splat(r);
        Box2::new(self.bottom_left - e, self.top_right + e)
    }

    #[inline]
    pub fn translated(&self, offset: Vec2) -> Box2 {
        Box2::new(self.bottom_left + offset, self.top_right + offset)
    }

    #[inline]
    pub fn intersects(&self, other: &Box2) -> bool {
        !(self.top_right.x < other.bottom_left.x
            || self.bottom_left.x > other.top_right.x
            || self.top_right.y < other.bottom_left.y
            || self.bottom_left.y > other.top_right.y)
    }

    #[inline]
    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.bottom_left.x
            && p.x <= self.top_right.x
            && p.y >= self.bottom_left.y
            && p.y <= self.top_right.y
    }

    pub fn width(&self) -> f32 {
        self.top_right.x - self.bottom_left.x
    }

    pub fn height(&self) -> f32 {
        self.top_right.y - self.bottom_left.y
    }

    pub fn center(&self) -> Vec2 {
        (self.bottom_left + self.top_right) * 0.5
    }

    pub fn approx_eq(&self, other: &Box2, eps: f32) -> bool {
        self.bottom_left.abs_diff_eq(other.bottom_left, eps)
            && self.top_right.abs_diff_eq(other.top_right, eps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_points_covers_all() {
        let b = Box2::from_points([Vec2::new(1.0, -2.0), Vec2::new(-3.0, 4.0), Vec2::new(0.0, 0.0)]);
        assert_eq!(b.bottom_left, Vec2::new(-3.0, -2.0));
        assert_eq!(b.top_right, Vec2::new(1.0, 4.0));
    }

    #[test]
    fn from_no_points_is_empty() {
        assert_eq!(Box2::from_points(std::iter::empty()), Box2::EMPTY);
    }

    #[test]
    fn enlarge_translate_union() {
        let a = Box2::new(Vec2::ZERO, Vec2::ONE).enlarged(0.5);
        assert_eq!(a.bottom_left, Vec2::splat(-0.5));
        assert!((a.width() - 2.0).abs() < 1e-6);

        let b = a.translated(Vec2::new(10.0, 0.0));
        assert!(!a.intersects(&b));
        let u = a.union(&b);
        assert!(u.contains_point(Vec2::new(5.0, 0.0)));
        assert_eq!(u.center(), Vec2::new(5.5, 0.5));
    }
}
