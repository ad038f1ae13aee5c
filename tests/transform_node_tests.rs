//! Transform node tests
//!
//! Tests for:
//! - Component-mode and base-matrix local transforms
//! - Parent/child world-matrix propagation
//! - Re-parenting and subtree removal
//! - Name lookup

use glam::{Affine3A, Vec3};
use stagelight::scene::node::{NodeTree, TransformNode};
use stagelight::scene::transform::{LocalTransform, Transform};
use std::f32::consts::FRAC_PI_2;

// ============================================================================
// Helper
// ============================================================================

const EPSILON: f32 = 1e-5;

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y) && approx_eq(a.z, b.z)
}

// ============================================================================
// Local transform
// ============================================================================

#[test]
fn transform_default_is_identity_components() {
    let t = Transform::new();
    assert_eq!(*t.local(), LocalTransform::IDENTITY_COMPONENTS);
    assert!(t.is_component_mode());
}

#[test]
fn set_rotation_leaves_base_matrix_mode() {
    let mut t = Transform::from_matrix(Affine3A::from_translation(Vec3::new(1.0, 2.0, 3.0)));
    assert!(!t.is_component_mode());

    t.set_rotation(Vec3::new(0.0, FRAC_PI_2, 0.0));
    assert!(t.is_component_mode());

    // Authored translation is dropped on the switch.
    t.update_local_matrix();
    assert!(vec3_approx(Vec3::from(t.local_matrix().translation), Vec3::ZERO));
}

#[test]
fn yaw_quarter_turn_maps_forward_to_right() {
    let local = LocalTransform::Components {
        translation: Vec3::ZERO,
        rotation: Vec3::new(0.0, FRAC_PI_2, 0.0),
        scale: Vec3::ONE,
    };
    let v = local.to_affine().transform_vector3(Vec3::Z);
    assert!(vec3_approx(v, Vec3::X), "got {v:?}");
}

#[test]
fn pitch_applies_before_yaw() {
    // Pitch -90° turns +Z into +Y, which yaw then leaves alone.
    let local = LocalTransform::Components {
        translation: Vec3::ZERO,
        rotation: Vec3::new(-FRAC_PI_2, FRAC_PI_2, 0.0),
        scale: Vec3::ONE,
    };
    let v = local.to_affine().transform_vector3(Vec3::Z);
    assert!(vec3_approx(v, Vec3::Y), "got {v:?}");
}

// ============================================================================
// Propagation
// ============================================================================

#[test]
fn child_translation_composes_with_parent() {
    let mut tree = NodeTree::new();
    let parent = tree.create("parent");
    let child = tree.create("child");
    tree.add_child(parent, child);

    tree.set_translation(parent, Vec3::new(10.0, 0.0, 0.0));
    tree.set_translation(child, Vec3::new(5.0, 0.0, 0.0));
    tree.update_world_matrices();

    let world = tree.get(child).unwrap().world_position();
    assert!(vec3_approx(world, Vec3::new(15.0, 0.0, 0.0)), "got {world:?}");
}

#[test]
fn parent_rotation_moves_child_position() {
    let mut tree = NodeTree::new();
    let parent = tree.create("parent");
    let child = tree.create("child");
    tree.add_child(parent, child);

    tree.set_rotation(parent, Vec3::new(0.0, FRAC_PI_2, 0.0));
    tree.set_translation(child, Vec3::new(0.0, 0.0, 2.0));
    tree.update_world_matrices();

    let world = tree.get(child).unwrap().world_position();
    assert!(vec3_approx(world, Vec3::new(2.0, 0.0, 0.0)), "got {world:?}");
}

#[test]
fn changes_after_first_update_propagate() {
    let mut tree = NodeTree::new();
    let parent = tree.create("parent");
    let child = tree.create("child");
    tree.add_child(parent, child);
    tree.update_world_matrices();

    tree.set_translation(parent, Vec3::new(0.0, 3.0, 0.0));
    tree.update_world_matrices();

    let world = tree.get(child).unwrap().world_position();
    assert!(vec3_approx(world, Vec3::new(0.0, 3.0, 0.0)));
}

#[test]
fn base_matrix_node_keeps_authored_placement() {
    let mut tree = NodeTree::new();
    let placed = tree.insert(
        TransformNode::new("placed")
            .with_matrix(Affine3A::from_translation(Vec3::new(0.0, 1.0, 0.0))),
    );
    let motion = tree.create("motion");
    tree.add_child(placed, motion);

    tree.set_rotation(motion, Vec3::new(0.0, FRAC_PI_2, 0.0));
    tree.update_world_matrices();

    let world = tree.world_matrix(motion).unwrap();
    assert!(vec3_approx(Vec3::from(world.translation), Vec3::new(0.0, 1.0, 0.0)));
    assert!(vec3_approx(world.transform_vector3(Vec3::Z), Vec3::X));
}

#[test]
fn explicit_parent_world_is_used() {
    let mut tree = NodeTree::new();
    let node = tree.create("node");
    tree.set_translation(node, Vec3::new(1.0, 0.0, 0.0));

    tree.update_world_matrix(node, Affine3A::from_translation(Vec3::new(0.0, 0.0, 4.0)));

    let world = tree.get(node).unwrap().world_position();
    assert!(vec3_approx(world, Vec3::new(1.0, 0.0, 4.0)));
}

// ============================================================================
// Hierarchy edits
// ============================================================================

#[test]
fn reparenting_moves_node_between_parents() {
    let mut tree = NodeTree::new();
    let a = tree.create("a");
    let b = tree.create("b");
    let child = tree.create("child");

    tree.add_child(a, child);
    tree.add_child(b, child);

    assert!(tree.get(a).unwrap().children().is_empty());
    assert_eq!(tree.get(b).unwrap().children(), &[child]);
    assert_eq!(tree.get(child).unwrap().parent(), Some(b));
    assert_eq!(tree.roots(), &[a, b]);
}

#[test]
fn cycles_are_rejected() {
    let mut tree = NodeTree::new();
    let parent = tree.create("parent");
    let child = tree.create("child");
    tree.add_child(parent, child);

    tree.add_child(child, parent);

    assert_eq!(tree.get(parent).unwrap().parent(), None);
    assert_eq!(tree.get(child).unwrap().parent(), Some(parent));
}

#[test]
fn remove_drops_whole_subtree() {
    let mut tree = NodeTree::new();
    let root = tree.create("root");
    let mid = tree.create("mid");
    let leaf = tree.create("leaf");
    tree.add_child(root, mid);
    tree.add_child(mid, leaf);

    tree.remove(mid);

    assert_eq!(tree.len(), 1);
    assert!(tree.get(leaf).is_none());
    assert!(tree.get(root).unwrap().children().is_empty());
}

// ============================================================================
// Lookup
// ============================================================================

#[test]
fn find_child_searches_depth_first() {
    let mut tree = NodeTree::new();
    let root = tree.create("Base");
    let yoke = tree.create("Yoke");
    let head = tree.create("Head");
    tree.add_child(root, yoke);
    tree.add_child(yoke, head);

    assert_eq!(tree.find_child(root, "Head"), Some(head));
    assert_eq!(tree.find_child(root, "Base"), Some(root));
    assert_eq!(tree.find_child(yoke, "Base"), None);
}

#[test]
fn find_any_respects_alias_order() {
    let mut tree = NodeTree::new();
    let root = tree.create("Base");
    let arm = tree.create("Arm");
    let pan = tree.create("Pan");
    tree.add_child(root, arm);
    tree.add_child(root, pan);

    assert_eq!(tree.find_any(root, &["Yoke", "Pan", "Arm"]), Some(pan));
    assert_eq!(tree.find_any(root, &["Yoke"]), None);
}
