//! Spotlight
//!
//! Per-fixture light state. A spotlight either carries a position and
//! direction set directly, or is linked to the pan / tilt / beam nodes of a
//! fixture hierarchy, in which case [`Spotlight::update_from_nodes`] derives
//! both from the beam node's world matrix.
//!
//! # Frame order
//!
//! 1. Animation writes pan/tilt through [`Spotlight::set_pan`] / [`Spotlight::set_tilt`]
//! 2. [`NodeTree::update_world_matrices`] propagates the new rotations
//! 3. [`Spotlight::update_from_nodes`] samples the beam node
//! 4. [`Spotlight::update_light_matrix`] rebuilds the shadow view-projection
//!
//! Running step 3 before step 2 leaves the light one frame behind its
//! fixture, which shows up as shadows misaligned with the visible beam.

use bytemuck::{Pod, Zeroable};
use glam::{Affine3A, Mat4, Vec2, Vec3, Vec4};

use crate::config::spotlight as cfg;
use crate::scene::NodeHandle;
use crate::scene::node::NodeTree;

/// GPU layout of one spotlight (144 bytes, 16-byte aligned).
///
/// | Field             | Contents                                         |
/// |-------------------|--------------------------------------------------|
/// | `light_view_proj` | light view × projection, column-major            |
/// | `pos_range`       | xyz position, w range                            |
/// | `dir_angle`       | xyz unit direction, w unused                     |
/// | `color_int`       | rgb color, w intensity                           |
/// | `cone_gobo`       | x beam, y field, z gobo rotation, w gobo index   |
/// | `gobo_off`        | xy gobo shake offset                             |
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SpotlightGpuData {
    pub light_view_proj: [[f32; 4]; 4],
    pub pos_range: [f32; 4],
    pub dir_angle: [f32; 4],
    pub color_int: [f32; 4],
    pub cone_gobo: [f32; 4],
    pub gobo_off: [f32; 4],
}

/// Nodes a spotlight samples its pose from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeLinks {
    pub pan: Option<NodeHandle>,
    pub tilt: Option<NodeHandle>,
    pub beam: Option<NodeHandle>,
}

#[derive(Debug, Clone)]
pub struct Spotlight {
    position: Vec3,
    range: f32,
    direction: Vec3,
    color: Vec3,
    intensity: f32,
    beam_angle: f32,
    field_angle: f32,
    gobo_rotation: f32,
    gobo_index: u32,
    gobo_shake: f32,
    gobo_offset: Vec2,
    pan: f32,
    tilt: f32,
    light_view_proj: Mat4,
    links: Option<NodeLinks>,
}

impl Default for Spotlight {
    fn default() -> Self {
        Self::new()
    }
}

impl Spotlight {
    /// White light hanging at the default height, pointing straight down.
    #[must_use]
    pub fn new() -> Self {
        let mut light = Self {
            position: Vec3::new(0.0, cfg::DEFAULT_HEIGHT, 0.0),
            range: cfg::DEFAULT_RANGE,
            direction: Vec3::NEG_Y,
            color: Vec3::ONE,
            intensity: cfg::DEFAULT_INTENSITY,
            beam_angle: cfg::DEFAULT_BEAM_ANGLE,
            field_angle: cfg::DEFAULT_FIELD_ANGLE,
            gobo_rotation: 0.0,
            gobo_index: 0,
            gobo_shake: 0.0,
            gobo_offset: Vec2::ZERO,
            pan: 0.0,
            tilt: 0.0,
            light_view_proj: Mat4::IDENTITY,
            links: None,
        };
        light.update_light_matrix();
        light
    }

    // ========================================================================
    // Direct setters
    // ========================================================================

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Stores the normalized direction. A zero vector leaves the current
    /// direction in place.
    pub fn set_direction(&mut self, direction: Vec3) {
        match direction.try_normalize() {
            Some(d) => self.direction = d,
            None => log::debug!("Ignoring zero-length spotlight direction"),
        }
    }

    pub fn set_color(&mut self, color: Vec3) {
        self.color = color;
    }

    /// Subtractive mixing approximation: `rgb = 1 - cmy`.
    pub fn set_color_from_cmy(&mut self, c: f32, m: f32, y: f32) {
        self.color = Vec3::new(1.0 - c, 1.0 - m, 1.0 - y);
    }

    pub fn set_intensity(&mut self, intensity: f32) {
        self.intensity = intensity;
    }

    pub fn set_range(&mut self, range: f32) {
        self.range = range;
    }

    /// Inner cone, as the cosine of its half-angle.
    pub fn set_beam_angle(&mut self, beam: f32) {
        self.beam_angle = beam;
    }

    /// Outer cone, as the cosine of its half-angle. Not validated against
    /// the beam angle.
    pub fn set_field_angle(&mut self, field: f32) {
        self.field_angle = field;
    }

    pub fn set_gobo_rotation(&mut self, radians: f32) {
        self.gobo_rotation = radians;
    }

    pub fn set_gobo_index(&mut self, index: u32) {
        self.gobo_index = index;
    }

    pub fn set_gobo_shake(&mut self, amount: f32) {
        self.gobo_shake = amount;
    }

    // ========================================================================
    // Node linking
    // ========================================================================

    pub fn link_nodes(
        &mut self,
        pan: Option<NodeHandle>,
        tilt: Option<NodeHandle>,
        beam: Option<NodeHandle>,
    ) {
        self.links = Some(NodeLinks { pan, tilt, beam });
    }

    #[must_use]
    pub fn links(&self) -> Option<NodeLinks> {
        self.links
    }

    /// Stores the pan angle and, when linked, writes it as yaw onto the pan
    /// node.
    pub fn set_pan(&mut self, degrees: f32, nodes: &mut NodeTree) {
        self.pan = degrees;
        if let Some(pan) = self.links.and_then(|l| l.pan) {
            nodes.set_rotation(pan, Vec3::new(0.0, degrees.to_radians(), 0.0));
        }
    }

    /// Stores the tilt angle and, when linked, writes it as pitch onto the
    /// tilt node.
    pub fn set_tilt(&mut self, degrees: f32, nodes: &mut NodeTree) {
        self.tilt = degrees;
        if let Some(tilt) = self.links.and_then(|l| l.tilt) {
            nodes.set_rotation(tilt, Vec3::new(degrees.to_radians(), 0.0, 0.0));
        }
    }

    /// Turns the light towards `target`.
    ///
    /// Linked lights solve pan (yaw) and tilt (pitch) in the frame of the pan
    /// node's parent and write them through [`Self::set_pan`] /
    /// [`Self::set_tilt`]; the new direction shows up at the next
    /// [`Self::update_from_nodes`]. World matrices must be current. Unlinked
    /// lights take the direction as-is.
    pub fn aim_at(&mut self, target: Vec3, nodes: &mut NodeTree) {
        let Some(world_dir) = (target - self.position).try_normalize() else {
            return;
        };

        let Some(pan) = self.links.and_then(|l| l.pan) else {
            self.set_direction(world_dir);
            return;
        };

        let frame = nodes
            .get(pan)
            .and_then(|node| node.parent())
            .and_then(|parent| nodes.world_matrix(parent))
            .unwrap_or(Affine3A::IDENTITY);
        let local = frame
            .inverse()
            .transform_vector3(world_dir)
            .normalize_or(Vec3::Z);

        // yaw(p) · pitch(t) · +Z = (cos t · sin p, -sin t, cos t · cos p)
        let pan_deg = local.x.atan2(local.z).to_degrees();
        let tilt_deg = (-local.y).clamp(-1.0, 1.0).asin().to_degrees();
        self.set_pan(pan_deg, nodes);
        self.set_tilt(tilt_deg, nodes);
    }

    /// Samples position and direction from the linked beam node.
    ///
    /// Must run after the tree's world matrices were propagated for this
    /// frame. Unlinked lights, or lights whose beam node no longer exists,
    /// keep their current pose.
    pub fn update_from_nodes(&mut self, nodes: &NodeTree) {
        let Some(beam) = self.links.and_then(|l| l.beam) else {
            return;
        };
        let Some(world) = nodes.world_matrix(beam) else {
            log::debug!("Spotlight beam node {beam:?} is gone");
            return;
        };

        self.position = Vec3::from(world.translation);
        if let Some(forward) = world.transform_vector3(Vec3::Z).try_normalize() {
            self.direction = forward;
        }
    }

    // ========================================================================
    // Per-frame
    // ========================================================================

    /// Oscillating gobo UV offset proportional to the shake amount.
    pub fn update_gobo_shake(&mut self, time: f32) {
        let amount = self.gobo_shake * cfg::SHAKE_SCALE;
        self.gobo_offset = Vec2::new(
            (time * cfg::SHAKE_FREQ_X).sin() * amount,
            (time * cfg::SHAKE_FREQ_Y).cos() * amount,
        );
    }

    /// Rebuilds the light view-projection: look along the direction from
    /// the position, 90° vertical FOV, square aspect, far plane at `range`.
    ///
    /// The up vector switches to +Z for near-vertical directions.
    pub fn update_light_matrix(&mut self) {
        let dir = self.direction.normalize_or(Vec3::NEG_Y);
        let up = if dir.y.abs() > cfg::UP_SWITCH_THRESHOLD {
            Vec3::Z
        } else {
            Vec3::Y
        };

        let view = Mat4::look_to_rh(self.position, dir, up);
        let far = self.range.max(cfg::SHADOW_NEAR * 2.0);
        let proj = Mat4::perspective_rh(cfg::SHADOW_FOV, 1.0, cfg::SHADOW_NEAR, far);
        self.light_view_proj = proj * view;
    }

    /// Packs the current state for upload.
    #[must_use]
    pub fn gpu_data(&self) -> SpotlightGpuData {
        SpotlightGpuData {
            light_view_proj: self.light_view_proj.to_cols_array_2d(),
            pos_range: self.position.extend(self.range).to_array(),
            dir_angle: self.direction.extend(0.0).to_array(),
            color_int: self.color.extend(self.intensity).to_array(),
            cone_gobo: Vec4::new(
                self.beam_angle,
                self.field_angle,
                self.gobo_rotation,
                self.gobo_index as f32,
            )
            .to_array(),
            gobo_off: [self.gobo_offset.x, self.gobo_offset.y, 0.0, 0.0],
        }
    }

    // ========================================================================
    // Getters
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[inline]
    #[must_use]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    #[inline]
    #[must_use]
    pub fn color(&self) -> Vec3 {
        self.color
    }

    #[inline]
    #[must_use]
    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    #[inline]
    #[must_use]
    pub fn range(&self) -> f32 {
        self.range
    }

    #[inline]
    #[must_use]
    pub fn beam_angle(&self) -> f32 {
        self.beam_angle
    }

    #[inline]
    #[must_use]
    pub fn field_angle(&self) -> f32 {
        self.field_angle
    }

    #[inline]
    #[must_use]
    pub fn gobo_rotation(&self) -> f32 {
        self.gobo_rotation
    }

    #[inline]
    #[must_use]
    pub fn gobo_index(&self) -> u32 {
        self.gobo_index
    }

    #[inline]
    #[must_use]
    pub fn gobo_shake(&self) -> f32 {
        self.gobo_shake
    }

    #[inline]
    #[must_use]
    pub fn gobo_offset(&self) -> Vec2 {
        self.gobo_offset
    }

    #[inline]
    #[must_use]
    pub fn pan(&self) -> f32 {
        self.pan
    }

    #[inline]
    #[must_use]
    pub fn tilt(&self) -> f32 {
        self.tilt
    }

    #[inline]
    #[must_use]
    pub fn light_view_proj(&self) -> Mat4 {
        self.light_view_proj
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gpu_data_is_144_bytes() {
        assert_eq!(std::mem::size_of::<SpotlightGpuData>(), 144);
    }

    #[test]
    fn vertical_direction_still_yields_finite_matrix() {
        let mut light = Spotlight::new();
        light.set_direction(Vec3::NEG_Y);
        light.update_light_matrix();
        assert!(light.light_view_proj().is_finite());
    }

    #[test]
    fn zero_direction_is_ignored() {
        let mut light = Spotlight::new();
        light.set_direction(Vec3::ZERO);
        assert_eq!(light.direction(), Vec3::NEG_Y);
    }
}
