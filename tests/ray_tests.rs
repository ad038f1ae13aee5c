//! Ray math tests
//!
//! Tests for:
//! - Sphere intersection roots and misses
//! - Screen-space unprojection through an orbit camera

use glam::{Vec2, Vec3};
use stagelight::math::Ray;
use stagelight::scene::camera::OrbitCamera;

// ============================================================================
// Helper
// ============================================================================

const EPSILON: f32 = 1e-3;

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y) && approx_eq(a.z, b.z)
}

// ============================================================================
// Sphere intersection
// ============================================================================

#[test]
fn ray_through_center_returns_both_roots() {
    let ray = Ray::new(Vec3::new(0.0, 0.0, -10.0), Vec3::Z);
    let (t0, t1) = ray.intersect_sphere(Vec3::ZERO, 5.0).unwrap();
    assert!(approx_eq(t0, 5.0));
    assert!(approx_eq(t1, 15.0));
}

#[test]
fn unnormalized_direction_gives_distance_roots() {
    let ray = Ray::new(Vec3::new(0.0, 0.0, -10.0), Vec3::new(0.0, 0.0, 7.0));
    let (t0, t1) = ray.intersect_sphere(Vec3::ZERO, 5.0).unwrap();
    assert!(approx_eq(t0, 5.0));
    assert!(approx_eq(t1, 15.0));
}

#[test]
fn parallel_offset_ray_misses() {
    let ray = Ray::new(Vec3::new(0.0, 6.0, -10.0), Vec3::Z);
    assert!(ray.intersect_sphere(Vec3::ZERO, 5.0).is_none());
}

#[test]
fn origin_inside_sphere_has_negative_first_root() {
    let ray = Ray::new(Vec3::ZERO, Vec3::X);
    let (t0, t1) = ray.intersect_sphere(Vec3::ZERO, 2.0).unwrap();
    assert!(approx_eq(t0, -2.0));
    assert!(approx_eq(t1, 2.0));
}

// ============================================================================
// Unprojection
// ============================================================================

#[test]
fn screen_center_ray_points_at_camera_target() {
    let camera = OrbitCamera::new(16.0 / 9.0);
    let inv = camera.inverse_view_projection();

    let ray = Ray::from_screen(Vec2::new(960.0, 540.0), Vec2::new(1920.0, 1080.0), inv);

    let to_target = (camera.target - camera.position()).normalize();
    assert!(vec3_approx(ray.direction, to_target), "got {:?}", ray.direction);
    assert!(ray.origin.distance(camera.position()) < 1.0);
}
