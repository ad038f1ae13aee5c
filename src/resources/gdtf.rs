//! XML fixture descriptions.
//!
//! Reads the `description.xml` of a GDTF fixture archive into a
//! [`FixtureDescription`]. Only the parts the visualizer consumes are read:
//!
//! ```text
//! GDTF
//! └── FixtureType Name=…
//!     ├── Models/Model                      Name, File
//!     ├── Geometries/(Geometry|Axis|Beam|Filter|ColorBeam)…
//!     │                                     Name, Model, Matrix or Position
//!     ├── Wheels/Wheel/Slot                 Name, MediaFileName
//!     └── DMXModes/DMXMode (first)/DMXChannels/DMXChannel
//!                                           Geometry or Attribute, Default,
//!                                           LogicalChannel children
//! ```
//!
//! Geometry elements of any other kind are skipped along with their subtree.

use glam::Affine3A;
use roxmltree::{Document, Node};

use crate::errors::{Result, StageError};
use crate::resources::fixture::{
    DmxChannelDecl, FixtureDescription, GeometryKind, GeometryNode, GoboSlot, GoboWheel, ModelRef,
    placement_or_identity,
};

/// Parses the text of a `description.xml`.
pub fn parse_description(xml: &str) -> Result<FixtureDescription> {
    let doc = Document::parse(xml.trim_start_matches('\u{feff}'))?;

    let root = doc.root_element();
    if !root.has_tag_name("GDTF") {
        return Err(StageError::InvalidDescription(format!(
            "root element is <{}>, expected <GDTF>",
            root.tag_name().name()
        )));
    }

    let fixture_type = child(root, "FixtureType")
        .ok_or_else(|| StageError::InvalidDescription("missing <FixtureType>".to_string()))?;

    let geometry = child(fixture_type, "Geometries")
        .and_then(|geometries| geometries.children().find_map(parse_geometry))
        .ok_or_else(|| {
            StageError::InvalidDescription("no geometry under <Geometries>".to_string())
        })?;

    Ok(FixtureDescription {
        name: attr(fixture_type, "Name").to_string(),
        models: parse_models(fixture_type),
        geometry,
        wheels: parse_wheels(fixture_type),
        dmx_channel_decls: parse_dmx_channels(fixture_type),
    })
}

fn parse_models(fixture_type: Node<'_, '_>) -> Vec<ModelRef> {
    let Some(models) = child(fixture_type, "Models") else {
        return Vec::new();
    };

    children_named(models, "Model")
        .filter_map(|model| {
            let name = attr(model, "Name");
            let file = attr(model, "File");
            (!name.is_empty() && !file.is_empty()).then(|| ModelRef {
                name: name.to_string(),
                file: file.to_string(),
            })
        })
        .collect()
}

fn parse_geometry(node: Node<'_, '_>) -> Option<GeometryNode> {
    if !node.is_element() {
        return None;
    }
    let kind = GeometryKind::from_tag(node.tag_name().name())?;

    let matrix = [attr(node, "Matrix"), attr(node, "Position")]
        .into_iter()
        .find(|text| !text.trim().is_empty())
        .map_or(Affine3A::IDENTITY, placement_or_identity);

    let mut geometry = GeometryNode::new(attr(node, "Name"), kind)
        .with_model(attr(node, "Model"))
        .with_matrix(matrix);
    geometry.children = node.children().filter_map(parse_geometry).collect();
    Some(geometry)
}

fn parse_wheels(fixture_type: Node<'_, '_>) -> Vec<GoboWheel> {
    let Some(wheels) = child(fixture_type, "Wheels") else {
        return Vec::new();
    };

    children_named(wheels, "Wheel")
        .map(|wheel| GoboWheel {
            name: attr(wheel, "Name").to_string(),
            slots: children_named(wheel, "Slot")
                .map(|slot| GoboSlot {
                    name: attr(slot, "Name").to_string(),
                    media_file: attr(slot, "MediaFileName").to_string(),
                })
                .collect(),
        })
        .collect()
}

/// Channels of the first DMX mode.
fn parse_dmx_channels(fixture_type: Node<'_, '_>) -> Vec<DmxChannelDecl> {
    let Some(channels) = child(fixture_type, "DMXModes")
        .and_then(|modes| child(modes, "DMXMode"))
        .and_then(|mode| child(mode, "DMXChannels"))
    else {
        return Vec::new();
    };

    children_named(channels, "DMXChannel")
        .map(|channel| {
            let name = match attr(channel, "Geometry") {
                "" => attr(channel, "Attribute"),
                geometry => geometry,
            };
            DmxChannelDecl {
                name: name.to_string(),
                logical_channels: children_named(channel, "LogicalChannel").count() as u32,
                default_value: parse_dmx_value(attr(channel, "Default")),
            }
        })
        .collect()
}

/// Leading number of a DMX value such as `128/1`; zero when absent.
fn parse_dmx_value(text: &str) -> f32 {
    text.split('/')
        .next()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(0.0)
}

fn attr<'a>(node: Node<'a, '_>, name: &str) -> &'a str {
    node.attribute(name).unwrap_or("")
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name(name))
}

fn children_named<'a, 'input>(
    node: Node<'a, 'input>,
    name: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(move |n| n.has_tag_name(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dmx_default_takes_leading_number() {
        assert_eq!(parse_dmx_value("128/1"), 128.0);
        assert_eq!(parse_dmx_value("0.5"), 0.5);
        assert_eq!(parse_dmx_value(""), 0.0);
        assert_eq!(parse_dmx_value("full"), 0.0);
    }

    #[test]
    fn wrong_root_is_rejected() {
        let err = parse_description("<Fixture/>").unwrap_err();
        assert!(matches!(err, StageError::InvalidDescription(_)));
    }

    #[test]
    fn unknown_geometry_kinds_are_skipped() {
        let xml = r#"<GDTF><FixtureType Name="X"><Geometries>
            <GeometryReference Name="Ref"/>
            <Geometry Name="Body"><Laser Name="Skip"/><Beam Name="Lens"/></Geometry>
        </Geometries></FixtureType></GDTF>"#;

        let description = parse_description(xml).unwrap();
        assert_eq!(description.geometry.name, "Body");
        assert_eq!(description.geometry.count(), 2);
        assert_eq!(description.geometry.children[0].kind, GeometryKind::Beam);
    }

    #[test]
    fn bom_is_tolerated() {
        let xml = "\u{feff}<GDTF><FixtureType><Geometries><Geometry Name=\"B\"/></Geometries></FixtureType></GDTF>";
        assert_eq!(parse_description(xml).unwrap().geometry.name, "B");
    }
}
