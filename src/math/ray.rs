//! Ray utilities for spotlight picking.
//!
//! A cursor position is unprojected through the inverse view-projection into a
//! world-space [`Ray`], which is then tested against a bounding sphere around
//! each fixture.

use glam::{Mat4, Vec2, Vec3, Vec4};

/// A ray in 3D space defined by an origin and a unit direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Creates a ray; `direction` is normalized (zero stays zero).
    #[must_use]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Point along the ray at parameter `t`.
    #[inline]
    #[must_use]
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Intersects the ray with a sphere.
    ///
    /// Returns both roots `(t0, t1)` with `t0 <= t1` when the ray's supporting
    /// line touches the sphere, or `None` on a miss. Roots may be negative when
    /// the sphere lies behind the origin.
    #[must_use]
    pub fn intersect_sphere(&self, center: Vec3, radius: f32) -> Option<(f32, f32)> {
        let to_center = center - self.origin;
        let tca = to_center.dot(self.direction);
        let d2 = to_center.length_squared() - tca * tca;
        let r2 = radius * radius;
        if d2 > r2 {
            return None;
        }
        let thc = (r2 - d2).sqrt();
        Some((tca - thc, tca + thc))
    }

    /// Unprojects a pixel position into a world-space ray.
    ///
    /// `cursor` is in pixels with the origin at the top-left corner; the
    /// projection is assumed to map depth to `[0, 1]`.
    #[must_use]
    pub fn from_screen(cursor: Vec2, viewport: Vec2, inv_view_proj: Mat4) -> Self {
        let ndc_x = 2.0 * cursor.x / viewport.x.max(1.0) - 1.0;
        let ndc_y = 1.0 - 2.0 * cursor.y / viewport.y.max(1.0);

        let near = inv_view_proj * Vec4::new(ndc_x, ndc_y, 0.0, 1.0);
        let far = inv_view_proj * Vec4::new(ndc_x, ndc_y, 1.0, 1.0);
        let near = near.truncate() / near.w;
        let far = far.truncate() / far.w;

        Self::new(near, far - near)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tangent_ray_returns_double_root() {
        let ray = Ray::new(Vec3::new(-10.0, 5.0, 0.0), Vec3::X);
        let (t0, t1) = ray.intersect_sphere(Vec3::ZERO, 5.0).unwrap();
        assert!((t0 - 10.0).abs() < 1e-4);
        assert!((t1 - 10.0).abs() < 1e-4);
    }

    #[test]
    fn point_at_walks_along_direction() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 2.0));
        assert_eq!(ray.point_at(3.0), Vec3::new(0.0, 0.0, 3.0));
    }
}
