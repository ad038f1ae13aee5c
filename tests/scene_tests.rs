//! Scene construction and update tests
//!
//! Tests for:
//! - Anchor discovery from the stage mesh
//! - One linked spotlight per anchor
//! - Fallbacks for a missing stage, fixture and gobo media
//! - Demo-mode effects and frame update order
//! - Spotlight management and picking

use glam::Vec3;
use stagelight::config::{effects as fx_cfg, fixture as fixture_cfg, room, spotlight as spot_cfg};
use stagelight::math::Ray;
use stagelight::resources::mesh::{MaterialData, MeshData};
use stagelight::resources::primitives::{create_box, create_demo_stage};
use stagelight::scene::effects::{hue_to_rgb, pan_at, tilt_at};
use stagelight::scene::scene::{Scene, SceneSources, find_anchors};
use stagelight::scene::spotlight::Spotlight;

// ============================================================================
// Helper
// ============================================================================

const EPSILON: f32 = 1e-4;

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y) && approx_eq(a.z, b.z)
}

fn demo_scene() -> Scene {
    Scene::initialize(SceneSources::demo())
}

// ============================================================================
// Anchors
// ============================================================================

#[test]
fn anchors_come_from_named_shapes() {
    let stage = create_demo_stage();
    let anchors = find_anchors(&stage, 0.0);

    assert_eq!(anchors.len(), 4);
    assert!(vec3_approx(anchors[0], Vec3::new(-12.0, 14.0, -4.0)));
    assert!(vec3_approx(anchors[3], Vec3::new(12.0, 14.0, -4.0)));
}

#[test]
fn anchors_are_lifted_by_stage_offset() {
    let stage = create_demo_stage();
    let anchors = find_anchors(&stage, 2.0);
    assert!(approx_eq(anchors[0].y, 16.0));
}

#[test]
fn fallback_shape_is_used_without_anchors() {
    let mut stage = MeshData::new("Bare");
    let (v, i) = create_box(Vec3::new(3.0, 8.0, 0.0), Vec3::ONE);
    stage.push_shape(fixture_cfg::FALLBACK_ANCHOR_SHAPE, &v, &i, MaterialData::default());

    let anchors = find_anchors(&stage, 0.0);
    assert_eq!(anchors.len(), 1);
    assert!(vec3_approx(anchors[0], Vec3::new(3.0, 8.0, 0.0)));
}

#[test]
fn default_anchor_without_any_marker() {
    let mut stage = MeshData::new("Bare");
    let (v, i) = create_box(Vec3::ZERO, Vec3::ONE);
    stage.push_shape("Deck", &v, &i, MaterialData::default());

    let anchors = find_anchors(&stage, 0.0);
    assert_eq!(anchors, vec![Vec3::new(0.0, spot_cfg::DEFAULT_HEIGHT, 0.0)]);
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn one_spotlight_per_anchor() {
    let scene = demo_scene();
    assert_eq!(scene.anchors().len(), 4);
    assert_eq!(scene.spotlights.len(), 4);
    assert_eq!(scene.fixtures().len(), 4);
    assert!(scene.spotlights.iter().all(|l| l.links().is_some()));
}

#[test]
fn stage_rests_on_room_floor() {
    let scene = demo_scene();
    let stage = create_demo_stage();
    assert!(approx_eq(scene.stage_offset(), room::FLOOR_Y - stage.min_y()));
}

#[test]
fn fixture_roots_sit_at_anchors() {
    let scene = demo_scene();
    for (fixture, anchor) in scene.fixtures().iter().zip(scene.anchors()) {
        let root = scene.nodes.get(fixture.root).unwrap();
        assert!(vec3_approx(root.world_position(), *anchor));
    }
}

#[test]
fn built_in_fixture_links_pan_tilt_and_beam() {
    let scene = demo_scene();
    let fixture = scene.fixtures()[0];

    let name = |h| scene.nodes.get(h).unwrap().name.clone();
    assert_eq!(name(fixture.pan.unwrap()), "Yoke");
    assert_eq!(name(fixture.tilt.unwrap()), "Head");
    assert_eq!(name(fixture.beam.unwrap()), "Beam");
}

#[test]
fn lights_hang_near_their_anchor_with_unit_direction() {
    let scene = demo_scene();
    for (light, anchor) in scene.spotlights.iter().zip(scene.anchors()) {
        assert!(light.position().distance(*anchor) < 3.0);
        assert!(approx_eq(light.direction().length(), 1.0));
        assert!(light.direction().y < 0.0, "got {:?}", light.direction());
    }
}

#[test]
fn lights_start_aimed_at_the_stage() {
    let scene = demo_scene();
    for light in &scene.spotlights {
        let wanted = (spot_cfg::AIM_TARGET - light.position()).normalize();
        assert!(light.direction().dot(wanted) > 0.99, "got {:?}", light.direction());
    }
}

#[test]
fn aim_spotlight_turns_the_fixture() {
    let mut scene = demo_scene();
    let target = Vec3::new(10.0, 0.0, 10.0);
    scene.aim_spotlight(0, target);

    let light = &scene.spotlights[0];
    let wanted = (target - light.position()).normalize();
    assert!(light.direction().dot(wanted) > 0.99, "got {:?}", light.direction());

    // Pose came from the nodes, so it survives the next frame.
    let direction = light.direction();
    scene.update(0.5);
    assert!(vec3_approx(scene.spotlights[0].direction(), direction));
}

#[test]
fn fixtures_hang_below_the_truss() {
    let scene = demo_scene();
    for (light, anchor) in scene.spotlights.iter().zip(scene.anchors()) {
        assert!(light.position().y < anchor.y);
    }
}

#[test]
fn missing_stage_uses_single_default_anchor() {
    let scene = Scene::initialize(SceneSources::default());
    assert!(scene.stage_mesh().is_none());
    assert_eq!(scene.spotlights.len(), 1);
    assert_eq!(scene.anchors(), &[Vec3::new(0.0, spot_cfg::DEFAULT_HEIGHT, 0.0)]);
}

#[test]
fn missing_gobo_media_gives_single_fallback_layer() {
    let scene = demo_scene();
    assert_eq!(scene.gobos().len(), 1);
}

#[test]
fn wheel_images_follow_open_layer() {
    let sources = SceneSources {
        gobo_images: vec![image::RgbaImage::new(64, 64), image::RgbaImage::new(512, 512)],
        ..SceneSources::demo()
    };
    let scene = Scene::initialize(sources);
    assert_eq!(scene.gobos().len(), 3);
}

#[test]
fn built_in_fixture_meshes_are_instanced_per_anchor() {
    let scene = demo_scene();
    let mut instances = Vec::new();
    scene.fixture_mesh_instances(&mut instances);

    // Base, Yoke and Head per fixture, sharing three meshes.
    assert_eq!(instances.len(), 3 * scene.fixtures().len());
    let mut unique: Vec<_> = instances.iter().map(|i| i.mesh).collect();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), 3);
}

// ============================================================================
// Update
// ============================================================================

#[test]
fn update_advances_time() {
    let mut scene = demo_scene();
    scene.update(0.25);
    scene.update(0.5);
    assert!(approx_eq(scene.time(), 0.75));
}

#[test]
fn static_scene_keeps_light_pose() {
    let mut scene = demo_scene();
    let before: Vec<Vec3> = scene.spotlights.iter().map(Spotlight::direction).collect();

    scene.update(1.0);

    for (light, dir) in scene.spotlights.iter().zip(before) {
        assert!(vec3_approx(light.direction(), dir));
    }
}

#[test]
fn demo_mode_drives_pan_tilt_and_color() {
    let mut scene = demo_scene();
    scene.set_demo_mode(true);
    scene.update(2.0);

    for (i, light) in scene.spotlights.iter().enumerate() {
        let phase = i as f32 * fx_cfg::PHASE_STEP;
        assert!(approx_eq(light.pan(), pan_at(2.0, phase)));
        assert!(approx_eq(light.tilt(), tilt_at(2.0, phase)));

        let hue = (2.0 * fx_cfg::RAINBOW_SPEED + i as f32 * fx_cfg::HUE_STEP).rem_euclid(1.0);
        assert!(vec3_approx(light.color(), hue_to_rgb(hue)));
        assert!(approx_eq(light.gobo_rotation(), 2.0 * fx_cfg::GOBO_SPEED + phase));
    }
}

#[test]
fn demo_motion_reaches_light_direction_in_same_frame() {
    let mut scene = demo_scene();
    let before = scene.spotlights[0].direction();

    scene.set_demo_mode(true);
    scene.update(1.0);

    assert!(!vec3_approx(scene.spotlights[0].direction(), before));
}

#[test]
fn disabled_effect_groups_are_skipped() {
    let mut scene = demo_scene();
    scene.set_demo_mode(true);
    scene.effects.rainbow = false;
    scene.update(1.0);

    assert!(scene.spotlights.iter().all(|l| l.color() == Vec3::ONE));
}

#[test]
fn effects_speed_scales_time() {
    let mut scene = demo_scene();
    scene.set_demo_mode(true);
    scene.effects.speed = 2.0;
    scene.update(1.5);

    assert!(approx_eq(scene.spotlights[0].pan(), pan_at(3.0, 0.0)));
}

// ============================================================================
// Management
// ============================================================================

#[test]
fn last_spotlight_cannot_be_removed() {
    let mut scene = Scene::initialize(SceneSources::default());
    scene.remove_spotlight(0);
    assert_eq!(scene.spotlights.len(), 1);

    scene.add_spotlight(Spotlight::new());
    scene.remove_spotlight(0);
    assert_eq!(scene.spotlights.len(), 1);
    assert!(scene.spotlights[0].links().is_none());
}

#[test]
fn removing_a_linked_light_removes_its_fixture() {
    let mut scene = demo_scene();
    let nodes_before = scene.nodes.len();
    let removed_root = scene.fixtures()[1].root;
    let kept_root = scene.fixtures()[2].root;

    scene.remove_spotlight(1);

    assert_eq!(scene.spotlights.len(), 3);
    assert_eq!(scene.fixtures().len(), 3);
    assert!(scene.nodes.get(removed_root).is_none());
    assert_eq!(scene.fixtures()[1].root, kept_root);
    assert!(scene.nodes.len() < nodes_before);

    let mut instances = Vec::new();
    scene.fixture_mesh_instances(&mut instances);
    assert_eq!(instances.len(), 3 * scene.fixtures().len());
}

#[test]
fn removing_an_added_light_keeps_fixtures() {
    let mut scene = demo_scene();
    scene.add_spotlight(Spotlight::new());
    scene.remove_spotlight(4);

    assert_eq!(scene.spotlights.len(), 4);
    assert_eq!(scene.fixtures().len(), 4);
}

#[test]
fn selection_is_bounds_checked() {
    let mut scene = demo_scene();
    scene.select(Some(2));
    assert_eq!(scene.selected(), Some(2));
    scene.select(Some(99));
    assert_eq!(scene.selected(), None);
}

#[test]
fn pick_hits_nearest_light_on_ray() {
    let scene = demo_scene();
    let target = scene.spotlights[1].position();
    let ray = Ray::new(target + Vec3::new(0.0, 0.0, 30.0), Vec3::NEG_Z);

    assert_eq!(scene.pick_spotlight(&ray), Some(1));
}

#[test]
fn pick_misses_when_ray_points_away() {
    let scene = demo_scene();
    let target = scene.spotlights[1].position();
    let ray = Ray::new(target + Vec3::new(0.0, 0.0, 30.0), Vec3::Z);

    assert_eq!(scene.pick_spotlight(&ray), None);
}
