//! Transform System
//!
//! Hierarchical world-matrix propagation over the node arena. Kept apart from
//! [`NodeTree`](super::node::NodeTree) so the traversal only borrows the
//! `SlotMap` and the root list.
//!
//! `world = parent_world * local`. A node's world matrix is recomputed when
//! its own local matrix changed or any ancestor's world matrix did.

use glam::Affine3A;
use slotmap::SlotMap;

use crate::scene::NodeHandle;
use crate::scene::node::TransformNode;

/// Updates every tree reachable from `roots`, identity as the root parent.
///
/// Uses an explicit stack so deep fixture chains cannot overflow the call
/// stack.
pub fn update_hierarchy(nodes: &mut SlotMap<NodeHandle, TransformNode>, roots: &[NodeHandle]) {
    let mut stack: Vec<(NodeHandle, Affine3A, bool)> = Vec::with_capacity(64);
    for &root in roots.iter().rev() {
        stack.push((root, Affine3A::IDENTITY, false));
    }
    propagate(nodes, &mut stack);
}

/// Updates the subtree starting at `root` from an explicit parent world
/// matrix. The subtree root is always recomputed.
pub fn update_subtree(
    nodes: &mut SlotMap<NodeHandle, TransformNode>,
    root: NodeHandle,
    parent_world: Affine3A,
) {
    let mut stack = vec![(root, parent_world, true)];
    propagate(nodes, &mut stack);
}

fn propagate(
    nodes: &mut SlotMap<NodeHandle, TransformNode>,
    stack: &mut Vec<(NodeHandle, Affine3A, bool)>,
) {
    while let Some((handle, parent_world, parent_changed)) = stack.pop() {
        let Some(node) = nodes.get_mut(handle) else {
            continue;
        };

        let local_changed = node.transform.update_local_matrix();
        let world_changed = local_changed || parent_changed;
        if world_changed {
            let world = parent_world * *node.transform.local_matrix();
            node.transform.set_world_matrix(world);
        }

        let world = *node.transform.world_matrix();
        for &child in node.children.iter().rev() {
            stack.push((child, world, world_changed));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn unchanged_subtree_keeps_world_matrix() {
        let mut nodes: SlotMap<NodeHandle, TransformNode> = SlotMap::with_key();
        let root = nodes.insert(TransformNode::new("root"));
        let child = nodes.insert(TransformNode::new("child"));
        nodes[root].children.push(child);
        nodes[child].parent = Some(root);
        nodes[child].transform.set_translation(Vec3::new(0.0, 2.0, 0.0));

        update_hierarchy(&mut nodes, &[root]);
        assert_eq!(nodes[child].world_position(), Vec3::new(0.0, 2.0, 0.0));

        nodes[root].transform.set_translation(Vec3::new(1.0, 0.0, 0.0));
        update_hierarchy(&mut nodes, &[root]);
        assert_eq!(nodes[child].world_position(), Vec3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn subtree_update_uses_supplied_parent() {
        let mut nodes: SlotMap<NodeHandle, TransformNode> = SlotMap::with_key();
        let node = nodes.insert(TransformNode::new("n"));
        nodes[node].transform.set_translation(Vec3::X);

        update_subtree(
            &mut nodes,
            node,
            Affine3A::from_translation(Vec3::new(0.0, 0.0, 5.0)),
        );
        assert_eq!(nodes[node].world_position(), Vec3::new(1.0, 0.0, 5.0));
    }
}
