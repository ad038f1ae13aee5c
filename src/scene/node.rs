use glam::{Affine3A, Vec3};
use slotmap::SlotMap;
use smallvec::SmallVec;

use crate::resources::mesh::MeshHandle;
use crate::scene::NodeHandle;
use crate::scene::transform::Transform;
use crate::scene::transform_system;

/// What a node draws, resolved during traversal without downcasting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodePayload {
    /// Pure grouping / transform node.
    #[default]
    Empty,
    /// Draws the referenced mesh with the node's world matrix.
    MeshRef(MeshHandle),
}

/// A node of a fixture hierarchy.
///
/// # Hierarchy
///
/// - `children`: the owning edge; removing a node removes its subtree
/// - `parent`: back-reference for upward queries only, never used for
///   ownership or traversal order
#[derive(Debug, Clone)]
pub struct TransformNode {
    /// Diagnostic name, also the key for [`NodeTree::find_child`].
    pub name: String,
    pub(crate) parent: Option<NodeHandle>,
    pub(crate) children: SmallVec<[NodeHandle; 4]>,
    pub transform: Transform,
    pub payload: NodePayload,
}

impl TransformNode {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            children: SmallVec::new(),
            transform: Transform::new(),
            payload: NodePayload::Empty,
        }
    }

    #[must_use]
    pub fn with_matrix(mut self, matrix: Affine3A) -> Self {
        self.transform.set_local_matrix(matrix);
        self
    }

    #[must_use]
    pub fn with_payload(mut self, payload: NodePayload) -> Self {
        self.payload = payload;
        self
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    #[inline]
    #[must_use]
    pub fn world_matrix(&self) -> &Affine3A {
        self.transform.world_matrix()
    }

    /// Translation part of the world matrix.
    #[inline]
    #[must_use]
    pub fn world_position(&self) -> Vec3 {
        Vec3::from(self.transform.world_matrix().translation)
    }
}

/// One drawable found while walking a subtree.
#[derive(Debug, Clone, Copy)]
pub struct MeshInstance {
    pub mesh: MeshHandle,
    pub world: Affine3A,
}

/// Arena owning every transform node of a scene, plus its root list.
#[derive(Debug, Default)]
pub struct NodeTree {
    nodes: SlotMap<NodeHandle, TransformNode>,
    roots: Vec<NodeHandle>,
}

impl NodeTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a detached node; it starts out as a root.
    pub fn insert(&mut self, node: TransformNode) -> NodeHandle {
        let handle = self.nodes.insert(node);
        self.roots.push(handle);
        handle
    }

    /// Shorthand for inserting an empty component-mode node.
    pub fn create(&mut self, name: impl Into<String>) -> NodeHandle {
        self.insert(TransformNode::new(name))
    }

    /// Moves `child` (with its subtree) under `parent`.
    ///
    /// The child is detached from its previous parent or from the root list.
    /// Attaching a node to itself or to one of its descendants is ignored.
    pub fn add_child(&mut self, parent: NodeHandle, child: NodeHandle) {
        if parent == child
            || !self.nodes.contains_key(parent)
            || !self.nodes.contains_key(child)
            || self.is_ancestor(child, parent)
        {
            log::warn!("Rejected attach of {child:?} under {parent:?}");
            return;
        }

        self.detach(child);

        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = Some(parent);
            node.transform.mark_dirty();
        }
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.push(child);
        }
    }

    /// `true` when `ancestor` is `node` or lies on its parent chain.
    fn is_ancestor(&self, ancestor: NodeHandle, node: NodeHandle) -> bool {
        let mut current = Some(node);
        while let Some(handle) = current {
            if handle == ancestor {
                return true;
            }
            current = self.nodes.get(handle).and_then(|n| n.parent);
        }
        false
    }

    fn detach(&mut self, handle: NodeHandle) {
        let parent = self.nodes.get(handle).and_then(|n| n.parent);
        match parent {
            Some(parent) => {
                if let Some(p) = self.nodes.get_mut(parent) {
                    p.children.retain(|c| *c != handle);
                }
                if let Some(node) = self.nodes.get_mut(handle) {
                    node.parent = None;
                }
            }
            None => self.roots.retain(|r| *r != handle),
        }
    }

    /// Removes a node and its whole subtree.
    pub fn remove(&mut self, handle: NodeHandle) {
        if !self.nodes.contains_key(handle) {
            return;
        }
        self.detach(handle);

        let mut stack = vec![handle];
        while let Some(h) = stack.pop() {
            if let Some(node) = self.nodes.remove(h) {
                stack.extend(node.children.iter().copied());
            }
        }
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.roots.clear();
    }

    // ========================================================================
    // Transform setters
    // ========================================================================

    pub fn set_translation(&mut self, handle: NodeHandle, value: Vec3) {
        if let Some(node) = self.nodes.get_mut(handle) {
            node.transform.set_translation(value);
        }
    }

    /// Euler rotation in radians: x = pitch, y = yaw, z = roll.
    pub fn set_rotation(&mut self, handle: NodeHandle, value: Vec3) {
        if let Some(node) = self.nodes.get_mut(handle) {
            node.transform.set_rotation(value);
        }
    }

    pub fn set_scale(&mut self, handle: NodeHandle, value: Vec3) {
        if let Some(node) = self.nodes.get_mut(handle) {
            node.transform.set_scale(value);
        }
    }

    pub fn set_local_matrix(&mut self, handle: NodeHandle, matrix: Affine3A) {
        if let Some(node) = self.nodes.get_mut(handle) {
            node.transform.set_local_matrix(matrix);
        }
    }

    // ========================================================================
    // Propagation
    // ========================================================================

    /// Recomputes world matrices for every root, identity as parent world.
    pub fn update_world_matrices(&mut self) {
        transform_system::update_hierarchy(&mut self.nodes, &self.roots);
    }

    /// Recomputes `handle`'s world matrix from an explicit parent world matrix
    /// and propagates into its children.
    pub fn update_world_matrix(&mut self, handle: NodeHandle, parent_world: Affine3A) {
        transform_system::update_subtree(&mut self.nodes, handle, parent_world);
    }

    // ========================================================================
    // Queries
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn get(&self, handle: NodeHandle) -> Option<&TransformNode> {
        self.nodes.get(handle)
    }

    #[inline]
    pub fn get_mut(&mut self, handle: NodeHandle) -> Option<&mut TransformNode> {
        self.nodes.get_mut(handle)
    }

    #[inline]
    #[must_use]
    pub fn world_matrix(&self, handle: NodeHandle) -> Option<Affine3A> {
        self.nodes.get(handle).map(|n| *n.world_matrix())
    }

    #[inline]
    #[must_use]
    pub fn roots(&self) -> &[NodeHandle] {
        &self.roots
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Depth-first, pre-order search for the first node named exactly `name`,
    /// starting with `start` itself.
    #[must_use]
    pub fn find_child(&self, start: NodeHandle, name: &str) -> Option<NodeHandle> {
        let mut stack = vec![start];
        while let Some(handle) = stack.pop() {
            let Some(node) = self.nodes.get(handle) else {
                continue;
            };
            if node.name == name {
                return Some(handle);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        None
    }

    /// Tries each name in order and returns the first match under `start`.
    #[must_use]
    pub fn find_any(&self, start: NodeHandle, names: &[&str]) -> Option<NodeHandle> {
        names.iter().find_map(|name| self.find_child(start, name))
    }

    /// Collects every mesh-bearing node under `root` with its world matrix.
    pub fn collect_mesh_instances(&self, root: NodeHandle, out: &mut Vec<MeshInstance>) {
        let mut stack = vec![root];
        while let Some(handle) = stack.pop() {
            let Some(node) = self.nodes.get(handle) else {
                continue;
            };
            match node.payload {
                NodePayload::MeshRef(mesh) => out.push(MeshInstance {
                    mesh,
                    world: *node.world_matrix(),
                }),
                NodePayload::Empty => {}
            }
            stack.extend(node.children.iter().rev().copied());
        }
    }
}
