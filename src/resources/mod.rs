//! Core resource definitions
//!
//! Data the core consumes from its providers, independent of the GPU:
//! - Mesh: interleaved geometry split into material sub-shapes
//! - Primitives: procedural room, boxes and a demo stage
//! - Fixture: typed fixture description (geometry tree, wheels, DMX metadata)
//! - Gdtf: `description.xml` reader
//! - Archive: zip-backed fixture description provider
//! - Gobo: the ordered gobo image set

pub mod archive;
pub mod fixture;
pub mod gdtf;
pub mod gobo;
pub mod mesh;
pub mod primitives;

pub use archive::FixtureArchive;
pub use fixture::{FixtureDescription, GeometryKind, GeometryNode, GoboSlot, GoboWheel};
pub use gobo::GoboSet;
pub use mesh::{MaterialData, MeshData, MeshHandle, MeshLibrary, ShapeInfo, Vertex};
