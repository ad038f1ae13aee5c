//! Fixture description tests
//!
//! Tests for:
//! - XML (`description.xml`) and JSON description parsing
//!   (geometry tree, placement matrices, wheels)
//! - DMX channel offset accumulation
//! - Fixture hierarchy building and pan / tilt / beam aliases
//! - Zip archive provider with gobo media

use std::io::{Cursor, Write};

use glam::Vec3;
use stagelight::resources::archive::FixtureArchive;
use stagelight::resources::fixture::{FixtureDescription, GeometryKind};
use stagelight::resources::mesh::MeshLibrary;
use stagelight::scene::fixture::FixtureBuilder;
use stagelight::scene::node::NodeTree;
use stagelight::scene::scene::{Scene, SceneSources};

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

const SPOT_JSON: &str = r#"{
    "name": "Test Spot",
    "models": [{ "name": "Body", "file": "models/body.obj" }],
    "geometry": {
        "name": "Base",
        "model": "Body",
        "children": [{
            "name": "Pan",
            "kind": "Axis",
            "matrix": "{1,0,0,0}{0,1,0,-0.5}{0,0,1,0}{0,0,0,1}",
            "children": [{
                "name": "Tilt",
                "kind": "Axis",
                "matrix": "not a matrix"
            }]
        }]
    },
    "wheels": [
        { "name": "Color Wheel", "slots": [{ "name": "Red" }] },
        { "name": "Gobo Wheel 1", "slots": [
            { "name": "Open" },
            { "name": "Dots", "media_file": "dots" }
        ]}
    ],
    "dmx_channels": [
        { "name": "Pan", "logical_channels": 2, "default_value": 0.5 },
        { "name": "Dimmer" },
        { "name": "Gobo", "logical_channels": 1 }
    ]
}"#;

const SPOT_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="no" ?>
<GDTF DataVersion="1.1">
  <FixtureType Name="XML Spot" ShortName="XS">
    <Models>
      <Model Name="Base" File="base"/>
      <Model Name="Yoke" File="yoke"/>
      <Model Name="Nameless"/>
    </Models>
    <Geometries>
      <Geometry Name="Base" Model="Base">
        <Axis Name="Yoke" Model="Yoke" Position="{1,0,0,0}{0,1,0,-0.2}{0,0,1,0}{0,0,0,1}">
          <Axis Name="Head" Matrix="{1,0,0,0.1}{0,1,0,0}{0,0,1,0}{0,0,0,1}">
            <Beam Name="Beam" Matrix="{1,0,0,0}{0,1,0,0}{0,0,1,-0.3}{0,0,0,1}"/>
          </Axis>
        </Axis>
      </Geometry>
    </Geometries>
    <Wheels>
      <Wheel Name="Color1">
        <Slot Name="Red" Color="0.64,0.33,21.3"/>
      </Wheel>
      <Wheel Name="Gobo1">
        <Slot Name="Open"/>
        <Slot Name="Dots" MediaFileName="dots"/>
        <Slot Name="Stars" MediaFileName="stars"/>
      </Wheel>
    </Wheels>
    <DMXModes>
      <DMXMode Name="Standard" Geometry="Base">
        <DMXChannels>
          <DMXChannel Geometry="Yoke" Default="128/1">
            <LogicalChannel Attribute="Pan"/>
            <LogicalChannel Attribute="PanFine"/>
          </DMXChannel>
          <DMXChannel Attribute="Dimmer"/>
          <DMXChannel Geometry="Head" Default="0/1">
            <LogicalChannel Attribute="Tilt"/>
          </DMXChannel>
        </DMXChannels>
      </DMXMode>
      <DMXMode Name="Extended">
        <DMXChannels>
          <DMXChannel Geometry="Ignored"/>
        </DMXChannels>
      </DMXMode>
    </DMXModes>
  </FixtureType>
</GDTF>"#;

fn png_bytes(size: u32) -> Vec<u8> {
    let mut bytes = Cursor::new(Vec::new());
    image::RgbaImage::from_pixel(size, size, image::Rgba([255, 255, 255, 255]))
        .write_to(&mut bytes, image::ImageFormat::Png)
        .unwrap();
    bytes.into_inner()
}

fn build_archive(members: &[(&str, &[u8])]) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    {
        let mut writer = zip::ZipWriter::new(&mut buffer);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);
        for (name, data) in members {
            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap();
    }
    buffer.into_inner()
}

// ============================================================================
// Description parsing
// ============================================================================

#[test]
fn parses_geometry_tree() {
    let description = FixtureDescription::from_json(SPOT_JSON.as_bytes()).unwrap();

    assert_eq!(description.name, "Test Spot");
    assert_eq!(description.geometry.count(), 3);
    let pan = description.geometry.find("Pan").unwrap();
    assert_eq!(pan.kind, GeometryKind::Axis);
    assert_eq!(description.model_file("Body"), "models/body.obj");
    assert_eq!(description.model_file("Unknown"), "Unknown");
}

#[test]
fn placement_translation_is_negated() {
    let description = FixtureDescription::from_json(SPOT_JSON.as_bytes()).unwrap();
    let pan = description.geometry.find("Pan").unwrap();
    assert!(vec3_approx(Vec3::from(pan.matrix.translation), Vec3::new(0.0, 0.5, 0.0)));
}

#[test]
fn malformed_matrix_falls_back_to_identity() {
    let description = FixtureDescription::from_json(SPOT_JSON.as_bytes()).unwrap();
    let tilt = description.geometry.find("Tilt").unwrap();
    assert_eq!(tilt.matrix, glam::Affine3A::IDENTITY);
}

#[test]
fn missing_geometry_is_a_parse_error() {
    assert!(FixtureDescription::from_json(br#"{ "name": "Broken" }"#).is_err());
}

#[test]
fn only_gobo_wheels_are_selected() {
    let description = FixtureDescription::from_json(SPOT_JSON.as_bytes()).unwrap();
    let names: Vec<_> = description.gobo_wheels().map(|w| w.name.as_str()).collect();
    assert_eq!(names, ["Gobo Wheel 1"]);
}

// ============================================================================
// DMX metadata
// ============================================================================

#[test]
fn dmx_offsets_accumulate_in_declaration_order() {
    let description = FixtureDescription::from_json(SPOT_JSON.as_bytes()).unwrap();
    let channels = description.dmx_channels();

    let layout: Vec<_> = channels.iter().map(|c| (c.name.as_str(), c.offset, c.byte_count)).collect();
    assert_eq!(layout, [("Pan", 0, 2), ("Dimmer", 2, 1), ("Gobo", 3, 1)]);
    assert!(approx_eq(channels[0].default_value, 0.5));
    assert_eq!(description.dmx_footprint(), 4);
}

#[test]
fn built_in_moving_head_footprint() {
    let description = FixtureDescription::default_moving_head();
    assert_eq!(description.dmx_footprint(), 6);
    assert_eq!(description.geometry.name, "Base");
}

// ============================================================================
// Hierarchy builder
// ============================================================================

#[test]
fn aliases_resolve_and_beam_falls_back_to_tilt() {
    let description = FixtureDescription::from_json(SPOT_JSON.as_bytes()).unwrap();
    let mut nodes = NodeTree::new();
    let mut meshes = MeshLibrary::default();

    let mut builder = FixtureBuilder::new(&description, Vec::new());
    let instance = builder.build(&mut nodes, &mut meshes, Vec3::new(2.0, 10.0, 0.0), 0);

    let name = |h| nodes.get(h).unwrap().name.clone();
    assert_eq!(name(instance.pan.unwrap()), "Pan");
    assert_eq!(name(instance.tilt.unwrap()), "Tilt");
    assert_eq!(instance.beam, instance.tilt);
    assert!(meshes.is_empty());
}

#[test]
fn axis_motion_node_sits_under_its_placement() {
    let description = FixtureDescription::from_json(SPOT_JSON.as_bytes()).unwrap();
    let mut nodes = NodeTree::new();
    let mut meshes = MeshLibrary::default();

    let instance = FixtureBuilder::new(&description, Vec::new()).build(
        &mut nodes,
        &mut meshes,
        Vec3::ZERO,
        0,
    );

    let pan = nodes.get(instance.pan.unwrap()).unwrap();
    assert!(pan.transform.is_component_mode());
    let placement = nodes.get(pan.parent().unwrap()).unwrap();
    assert!(!placement.transform.is_component_mode());
}

#[test]
fn shared_models_are_uploaded_once() {
    let description = FixtureDescription::default_moving_head();
    let mut nodes = NodeTree::new();
    let mut meshes = MeshLibrary::default();
    let models = stagelight::resources::primitives::create_moving_head_models();

    let mut builder = FixtureBuilder::new(&description, models);
    builder.build(&mut nodes, &mut meshes, Vec3::ZERO, 0);
    builder.build(&mut nodes, &mut meshes, Vec3::X * 5.0, 1);

    assert_eq!(meshes.len(), 3);
    assert_eq!(nodes.roots().len(), 2);
}

// ============================================================================
// Archive provider
// ============================================================================

#[test]
fn archive_yields_description_and_gobo_media() {
    let png = png_bytes(64);
    let bytes = build_archive(&[
        ("description.json", SPOT_JSON.as_bytes()),
        ("wheels/dots.png", &png),
    ]);
    let mut archive = FixtureArchive::from_reader(Cursor::new(bytes)).unwrap();

    let description = archive.description().unwrap();
    let images = archive.gobo_images(&description);

    assert_eq!(images.len(), 1);
    assert_eq!(images[0].dimensions(), (64, 64));
}

#[test]
fn undecodable_gobo_media_is_skipped() {
    let bytes = build_archive(&[
        ("description.json", SPOT_JSON.as_bytes()),
        ("wheels/dots.png", b"not a png"),
    ]);
    let mut archive = FixtureArchive::from_reader(Cursor::new(bytes)).unwrap();

    let description = archive.description().unwrap();
    assert!(archive.gobo_images(&description).is_empty());
}

#[test]
fn scene_from_archive_on_disk() {
    let png = png_bytes(32);
    let bytes = build_archive(&[
        ("description.json", SPOT_JSON.as_bytes()),
        ("wheels/dots.png", &png),
    ]);
    let path = std::env::temp_dir().join(format!("stagelight-fixture-{}.zip", std::process::id()));
    std::fs::write(&path, bytes).unwrap();

    let sources = SceneSources::with_archive(&path).unwrap();
    std::fs::remove_file(&path).ok();
    let scene = Scene::initialize(sources);

    assert_eq!(scene.fixture_description().name, "Test Spot");
    // Open disc plus the one wheel image, resized to the common size.
    assert_eq!(scene.gobos().len(), 2);
    assert!(scene.gobos().layers().iter().all(|l| l.dimensions() == (512, 512)));
    assert_eq!(scene.spotlights.len(), 4);
}

#[test]
fn xml_description_fills_the_typed_model() {
    let description = FixtureDescription::from_xml(SPOT_XML).unwrap();

    assert_eq!(description.name, "XML Spot");
    assert_eq!(description.geometry.count(), 4);
    assert_eq!(description.geometry.find("Head").unwrap().kind, GeometryKind::Axis);
    assert_eq!(description.geometry.find("Beam").unwrap().kind, GeometryKind::Beam);
    assert_eq!(description.model_file("Yoke"), "yoke");
    assert_eq!(description.models.len(), 2);
}

#[test]
fn xml_placement_uses_matrix_then_position() {
    let description = FixtureDescription::from_xml(SPOT_XML).unwrap();
    let translation = |name: &str| Vec3::from(description.geometry.find(name).unwrap().matrix.translation);

    assert!(vec3_approx(translation("Yoke"), Vec3::new(0.0, 0.2, 0.0)));
    assert!(vec3_approx(translation("Head"), Vec3::new(-0.1, 0.0, 0.0)));
    assert!(vec3_approx(translation("Beam"), Vec3::new(0.0, 0.0, 0.3)));
    assert_eq!(description.geometry.matrix, glam::Affine3A::IDENTITY);
}

#[test]
fn xml_wheels_and_first_dmx_mode() {
    let description = FixtureDescription::from_xml(SPOT_XML).unwrap();

    let gobo: Vec<_> = description.gobo_wheels().collect();
    assert_eq!(gobo.len(), 1);
    assert_eq!(gobo[0].slots[1].media_file, "dots");

    let channels = description.dmx_channels();
    let layout: Vec<_> = channels.iter().map(|c| (c.name.as_str(), c.offset, c.byte_count)).collect();
    assert_eq!(layout, [("Yoke", 0, 2), ("Dimmer", 2, 1), ("Head", 3, 1)]);
    assert!(approx_eq(channels[0].default_value, 128.0));
}

#[test]
fn xml_archive_builds_linked_fixtures() {
    let png = png_bytes(16);
    let bytes = build_archive(&[
        ("description.xml", SPOT_XML.as_bytes()),
        ("wheels/dots.png", &png),
        ("wheels/stars.png", &png),
    ]);
    let mut archive = FixtureArchive::from_reader(Cursor::new(bytes)).unwrap();
    let description = archive.description().unwrap();
    assert_eq!(archive.gobo_images(&description).len(), 2);

    let mut nodes = NodeTree::new();
    let mut meshes = MeshLibrary::default();
    let instance = FixtureBuilder::new(&description, Vec::new()).build(
        &mut nodes,
        &mut meshes,
        Vec3::new(0.0, 12.0, 0.0),
        0,
    );

    let name = |h| nodes.get(h).unwrap().name.clone();
    assert_eq!(name(instance.pan.unwrap()), "Yoke");
    assert_eq!(name(instance.tilt.unwrap()), "Head");
    assert_eq!(name(instance.beam.unwrap()), "Beam");
}

#[test]
fn malformed_xml_is_an_error() {
    assert!(FixtureDescription::from_xml("<GDTF><FixtureType>").is_err());
    assert!(FixtureDescription::from_xml("<GDTF><FixtureType/></GDTF>").is_err());
}

#[test]
fn missing_archive_is_an_error() {
    assert!(SceneSources::with_archive("/nonexistent/fixture.zip").is_err());
}
