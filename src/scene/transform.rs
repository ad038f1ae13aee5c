use glam::{Affine3A, EulerRot, Mat4, Quat, Vec3};

/// How a node's local matrix is produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocalTransform {
    /// Fixed authored placement, set once and never touched by animation.
    Matrix(Affine3A),
    /// Translation / Euler rotation (pitch, yaw, roll in radians) / scale.
    Components {
        translation: Vec3,
        rotation: Vec3,
        scale: Vec3,
    },
}

impl LocalTransform {
    /// Identity in component mode.
    pub const IDENTITY_COMPONENTS: Self = Self::Components {
        translation: Vec3::ZERO,
        rotation: Vec3::ZERO,
        scale: Vec3::ONE,
    };

    /// Builds the local matrix.
    ///
    /// Component mode composes scale, then rotation, then translation. The
    /// rotation is `yaw(Y) * pitch(X) * roll(Z)`, so pitch acts on the vector
    /// before yaw does.
    #[must_use]
    pub fn to_affine(&self) -> Affine3A {
        match *self {
            Self::Matrix(m) => m,
            Self::Components {
                translation,
                rotation,
                scale,
            } => Affine3A::from_scale_rotation_translation(
                scale,
                euler_to_quat(rotation),
                translation,
            ),
        }
    }
}

impl Default for LocalTransform {
    fn default() -> Self {
        Self::IDENTITY_COMPONENTS
    }
}

/// Pitch (x), yaw (y), roll (z) radians to a quaternion.
#[inline]
#[must_use]
pub fn euler_to_quat(rotation: Vec3) -> Quat {
    Quat::from_euler(EulerRot::YXZ, rotation.y, rotation.x, rotation.z)
}

/// Transform component of a [`TransformNode`](super::node::TransformNode).
///
/// Holds the local transform source plus cached local/world matrices and a
/// dirty flag so unchanged subtrees are not recomputed.
#[derive(Debug, Clone)]
pub struct Transform {
    local: LocalTransform,
    pub(crate) local_matrix: Affine3A,
    pub(crate) world_matrix: Affine3A,
    dirty: bool,
}

impl Transform {
    #[must_use]
    pub fn new() -> Self {
        Self {
            local: LocalTransform::IDENTITY_COMPONENTS,
            local_matrix: Affine3A::IDENTITY,
            world_matrix: Affine3A::IDENTITY,
            dirty: true,
        }
    }

    #[must_use]
    pub fn from_matrix(matrix: Affine3A) -> Self {
        let mut t = Self::new();
        t.set_local_matrix(matrix);
        t
    }

    // ========================================================================
    // Mode switching setters
    // ========================================================================

    /// Switches to base-matrix mode.
    pub fn set_local_matrix(&mut self, matrix: Affine3A) {
        self.local = LocalTransform::Matrix(matrix);
        self.dirty = true;
    }

    /// Sets translation, switching to component mode.
    ///
    /// Leaving base-matrix mode starts from identity components; the authored
    /// matrix is dropped.
    pub fn set_translation(&mut self, value: Vec3) {
        let (_, rotation, scale) = self.components();
        self.set_components(value, rotation, scale);
    }

    /// Sets Euler rotation in radians (pitch, yaw, roll), switching to
    /// component mode.
    pub fn set_rotation(&mut self, value: Vec3) {
        let (translation, _, scale) = self.components();
        self.set_components(translation, value, scale);
    }

    /// Sets scale, switching to component mode.
    pub fn set_scale(&mut self, value: Vec3) {
        let (translation, rotation, _) = self.components();
        self.set_components(translation, rotation, value);
    }

    fn components(&self) -> (Vec3, Vec3, Vec3) {
        match self.local {
            LocalTransform::Components {
                translation,
                rotation,
                scale,
            } => (translation, rotation, scale),
            LocalTransform::Matrix(_) => (Vec3::ZERO, Vec3::ZERO, Vec3::ONE),
        }
    }

    fn set_components(&mut self, translation: Vec3, rotation: Vec3, scale: Vec3) {
        self.local = LocalTransform::Components {
            translation,
            rotation,
            scale,
        };
        self.dirty = true;
    }

    // ========================================================================
    // Update
    // ========================================================================

    /// Rebuilds the local matrix if anything changed since the last call.
    ///
    /// Returns whether it was rebuilt.
    pub fn update_local_matrix(&mut self) -> bool {
        if !self.dirty {
            return false;
        }
        self.local_matrix = self.local.to_affine();
        self.dirty = false;
        true
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    // ========================================================================
    // Getters
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn local(&self) -> &LocalTransform {
        &self.local
    }

    #[inline]
    #[must_use]
    pub fn is_component_mode(&self) -> bool {
        matches!(self.local, LocalTransform::Components { .. })
    }

    #[inline]
    #[must_use]
    pub fn local_matrix(&self) -> &Affine3A {
        &self.local_matrix
    }

    #[inline]
    #[must_use]
    pub fn world_matrix(&self) -> &Affine3A {
        &self.world_matrix
    }

    /// World matrix as `Mat4` for GPU upload.
    #[inline]
    #[must_use]
    pub fn world_matrix_as_mat4(&self) -> Mat4 {
        Mat4::from(self.world_matrix)
    }

    pub(crate) fn set_world_matrix(&mut self, mat: Affine3A) {
        self.world_matrix = mat;
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}
