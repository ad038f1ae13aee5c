//! Fixture description model.
//!
//! The typed form of a moving-head fixture's description: a geometry tree
//! (names, type tags, model references, authored placement matrices), gobo
//! wheels, and DMX channel metadata. Descriptions are read from an archive's
//! `description.xml` (see [`gdtf`](super::gdtf)), from JSON, or built in
//! code via [`FixtureDescription::default_moving_head`].
//!
//! Placement matrices are authored as four brace groups of four numbers,
//! row-major with translation in the fourth column:
//!
//! ```text
//! {1,0,0,0}{0,1,0,-0.2}{0,0,1,0}{0,0,0,1}
//! ```
//!
//! Parsing transposes into glam's column-major layout and negates the
//! translation, which is how the authored offsets map onto the models.

use glam::{Affine3A, Mat4};
use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::{Result, StageError};

/// Geometry type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GeometryKind {
    #[default]
    Geometry,
    /// A rotating axis (pan or tilt).
    Axis,
    /// The light-emitting surface.
    Beam,
    Filter,
    ColorBeam,
}

impl GeometryKind {
    /// Kind named by an XML geometry element; `None` for other elements.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "Geometry" => Some(Self::Geometry),
            "Axis" => Some(Self::Axis),
            "Beam" => Some(Self::Beam),
            "Filter" => Some(Self::Filter),
            "ColorBeam" => Some(Self::ColorBeam),
            _ => None,
        }
    }
}

/// One node of the fixture's geometry tree.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeometryNode {
    pub name: String,
    #[serde(default)]
    pub kind: GeometryKind,
    /// Model reference; empty means no mesh.
    #[serde(default)]
    pub model: String,
    #[serde(default, deserialize_with = "deserialize_placement")]
    pub matrix: Affine3A,
    #[serde(default)]
    pub children: Vec<GeometryNode>,
}

impl GeometryNode {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: GeometryKind) -> Self {
        Self {
            name: name.into(),
            kind,
            model: String::new(),
            matrix: Affine3A::IDENTITY,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub fn with_matrix(mut self, matrix: Affine3A) -> Self {
        self.matrix = matrix;
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: GeometryNode) -> Self {
        self.children.push(child);
        self
    }

    /// Depth-first search by exact name, including `self`.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&GeometryNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(name))
    }

    /// Number of nodes in this subtree.
    #[must_use]
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(GeometryNode::count).sum::<usize>()
    }
}

/// Named model reference resolved to a file inside the archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelRef {
    pub name: String,
    pub file: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GoboSlot {
    pub name: String,
    /// Media file stem inside the archive's `wheels/` folder; empty for the
    /// open slot.
    #[serde(default)]
    pub media_file: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GoboWheel {
    pub name: String,
    #[serde(default)]
    pub slots: Vec<GoboSlot>,
}

/// DMX channel as declared by the description (before offsets are assigned).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DmxChannelDecl {
    pub name: String,
    /// Number of logical channels; zero is treated as one byte.
    #[serde(default)]
    pub logical_channels: u32,
    #[serde(default)]
    pub default_value: f32,
}

/// Channel metadata with its byte offset in the mode's footprint.
#[derive(Debug, Clone, PartialEq)]
pub struct DmxChannel {
    pub name: String,
    pub offset: u32,
    pub byte_count: u32,
    pub default_value: f32,
}

/// A complete fixture description.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FixtureDescription {
    pub name: String,
    #[serde(default)]
    pub models: Vec<ModelRef>,
    pub geometry: GeometryNode,
    #[serde(default)]
    pub wheels: Vec<GoboWheel>,
    #[serde(default, rename = "dmx_channels")]
    pub dmx_channel_decls: Vec<DmxChannelDecl>,
}

impl FixtureDescription {
    /// Parses a JSON description.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Parses a GDTF `description.xml`.
    pub fn from_xml(xml: &str) -> Result<Self> {
        super::gdtf::parse_description(xml)
    }

    /// File backing a model name; the name itself when unmapped.
    #[must_use]
    pub fn model_file<'a>(&'a self, model: &'a str) -> &'a str {
        self.models
            .iter()
            .find(|m| m.name == model)
            .map_or(model, |m| m.file.as_str())
    }

    /// Channels with accumulated offsets, in declaration order.
    #[must_use]
    pub fn dmx_channels(&self) -> Vec<DmxChannel> {
        let mut offset = 0;
        self.dmx_channel_decls
            .iter()
            .map(|decl| {
                let byte_count = decl.logical_channels.max(1);
                let channel = DmxChannel {
                    name: decl.name.clone(),
                    offset,
                    byte_count,
                    default_value: decl.default_value,
                };
                offset += byte_count;
                channel
            })
            .collect()
    }

    /// Total DMX footprint in bytes.
    #[must_use]
    pub fn dmx_footprint(&self) -> u32 {
        self.dmx_channels().iter().map(|c| c.byte_count).sum()
    }

    /// Wheels whose name marks them as gobo wheels.
    pub fn gobo_wheels(&self) -> impl Iterator<Item = &GoboWheel> {
        self.wheels
            .iter()
            .filter(|w| w.name.contains(crate::config::gobo::WHEEL_KEYWORD))
    }

    /// Built-in moving head used when no description is supplied.
    ///
    /// `Base → Yoke (axis) → Head (axis) → Beam`, authored Y-up with the beam
    /// facing local +Z.
    #[must_use]
    pub fn default_moving_head() -> Self {
        let beam = GeometryNode::new("Beam", GeometryKind::Beam)
            .with_matrix(Affine3A::from_translation(glam::Vec3::new(0.0, 0.0, 0.45)));
        let head = GeometryNode::new("Head", GeometryKind::Axis)
            .with_model("Head")
            .with_matrix(Affine3A::from_translation(glam::Vec3::new(0.0, 0.55, 0.0)))
            .with_child(beam);
        let yoke = GeometryNode::new("Yoke", GeometryKind::Axis)
            .with_model("Yoke")
            .with_matrix(Affine3A::from_translation(glam::Vec3::new(0.0, 0.2, 0.0)))
            .with_child(head);
        let base = GeometryNode::new("Base", GeometryKind::Geometry)
            .with_model("Base")
            .with_child(yoke);

        Self {
            name: "Generic Moving Head".to_string(),
            models: Vec::new(),
            geometry: base,
            wheels: vec![GoboWheel {
                name: "Gobo Wheel 1".to_string(),
                slots: vec![GoboSlot {
                    name: "Open".to_string(),
                    media_file: String::new(),
                }],
            }],
            dmx_channel_decls: vec![
                DmxChannelDecl {
                    name: "Yoke".to_string(),
                    logical_channels: 2,
                    default_value: 0.5,
                },
                DmxChannelDecl {
                    name: "Head".to_string(),
                    logical_channels: 2,
                    default_value: 0.5,
                },
                DmxChannelDecl {
                    name: "Dimmer".to_string(),
                    logical_channels: 1,
                    default_value: 0.0,
                },
                DmxChannelDecl {
                    name: "Gobo1".to_string(),
                    logical_channels: 1,
                    default_value: 0.0,
                },
            ],
        }
    }
}

// ============================================================================
// Placement matrix parsing
// ============================================================================

/// Parses an authored placement matrix string.
///
/// Missing trailing numbers fall back to the identity entries; a token that
/// is not a number is an error.
pub fn parse_placement_matrix(text: &str) -> Result<Affine3A> {
    let cleaned: String = text
        .chars()
        .map(|c| if matches!(c, '{' | '}' | ',') { ' ' } else { c })
        .collect();

    let mut m = [0.0_f32; 16];
    let mut tokens = cleaned.split_whitespace();
    for (i, slot) in m.iter_mut().enumerate() {
        *slot = match tokens.next() {
            Some(token) => token
                .parse::<f32>()
                .map_err(|_| StageError::InvalidMatrix(text.to_string()))?,
            None if i % 5 == 0 => 1.0,
            None => 0.0,
        };
    }

    // Array is row-major; glam reads columns, so transpose back.
    let mut matrix = Mat4::from_cols_array(&m).transpose();
    matrix.w_axis.x = -matrix.w_axis.x;
    matrix.w_axis.y = -matrix.w_axis.y;
    matrix.w_axis.z = -matrix.w_axis.z;

    Ok(Affine3A::from_mat4(matrix))
}

/// Parsed placement, or identity with a warning when the text is malformed.
pub(crate) fn placement_or_identity(text: &str) -> Affine3A {
    parse_placement_matrix(text).unwrap_or_else(|e| {
        log::warn!("{e}; using identity placement");
        Affine3A::IDENTITY
    })
}

fn deserialize_placement<'de, D>(deserializer: D) -> std::result::Result<Affine3A, D::Error>
where
    D: Deserializer<'de>,
{
    let text = Option::<String>::deserialize(deserializer)?;
    match text {
        Some(text) if !text.trim().is_empty() => Ok(placement_or_identity(&text)),
        _ => Ok(Affine3A::IDENTITY),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn translation_moves_to_w_axis_and_is_negated() {
        let m = parse_placement_matrix("{1,0,0,1}{0,1,0,2}{0,0,1,3}{0,0,0,1}").unwrap();
        assert_eq!(Vec3::from(m.translation), Vec3::new(-1.0, -2.0, -3.0));
        assert_eq!(m.matrix3, glam::Mat3A::IDENTITY);
    }

    #[test]
    fn short_matrix_fills_identity() {
        let m = parse_placement_matrix("{1,0,0,0}").unwrap();
        assert_eq!(m, Affine3A::IDENTITY);
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(parse_placement_matrix("{1,x,0,0}").is_err());
    }
}
