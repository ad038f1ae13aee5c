//! Procedural geometry: boxes, the inward-facing room, and a demo stage.

use glam::Vec3;

use crate::config::{fixture, materials, room};
use crate::resources::mesh::{MaterialData, MeshData, Vertex};

/// Four corners (counter-clockwise seen from the normal side) and a normal.
struct Face {
    corners: [[f32; 3]; 4],
    normal: [f32; 3],
}

const FACE_UVS: [[f32; 2]; 4] = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];

fn emit_faces(faces: &[Face]) -> (Vec<Vertex>, Vec<u32>) {
    let mut vertices = Vec::with_capacity(faces.len() * 4);
    let mut indices = Vec::with_capacity(faces.len() * 6);

    for (face_index, face) in faces.iter().enumerate() {
        let base = (face_index * 4) as u32;
        for (corner, uv) in face.corners.iter().zip(FACE_UVS) {
            vertices.push(Vertex::new(*corner, face.normal, uv));
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    (vertices, indices)
}

/// Axis-aligned box centered on `center`, normals facing outward.
#[must_use]
pub fn create_box(center: Vec3, size: Vec3) -> (Vec<Vertex>, Vec<u32>) {
    let h = size * 0.5;
    let (x0, x1) = (center.x - h.x, center.x + h.x);
    let (y0, y1) = (center.y - h.y, center.y + h.y);
    let (z0, z1) = (center.z - h.z, center.z + h.z);

    let faces = [
        // Front (+Z)
        Face {
            corners: [[x0, y0, z1], [x1, y0, z1], [x1, y1, z1], [x0, y1, z1]],
            normal: [0.0, 0.0, 1.0],
        },
        // Back (-Z)
        Face {
            corners: [[x1, y0, z0], [x0, y0, z0], [x0, y1, z0], [x1, y1, z0]],
            normal: [0.0, 0.0, -1.0],
        },
        // Top (+Y)
        Face {
            corners: [[x0, y1, z1], [x1, y1, z1], [x1, y1, z0], [x0, y1, z0]],
            normal: [0.0, 1.0, 0.0],
        },
        // Bottom (-Y)
        Face {
            corners: [[x0, y0, z0], [x1, y0, z0], [x1, y0, z1], [x0, y0, z1]],
            normal: [0.0, -1.0, 0.0],
        },
        // Right (+X)
        Face {
            corners: [[x1, y0, z1], [x1, y0, z0], [x1, y1, z0], [x1, y1, z1]],
            normal: [1.0, 0.0, 0.0],
        },
        // Left (-X)
        Face {
            corners: [[x0, y0, z0], [x0, y0, z1], [x0, y1, z1], [x0, y1, z0]],
            normal: [-1.0, 0.0, 0.0],
        },
    ];

    emit_faces(&faces)
}

/// The room the camera sits in: a box from the floor to the ceiling with
/// normals facing inward. 24 vertices, 36 indices.
#[must_use]
pub fn create_room() -> MeshData {
    let r = room::HALF_WIDTH;
    let (f, c) = (room::FLOOR_Y, room::CEILING_Y);

    let faces = [
        // Floor, normal +Y
        Face {
            corners: [[-r, f, r], [r, f, r], [r, f, -r], [-r, f, -r]],
            normal: [0.0, 1.0, 0.0],
        },
        // Ceiling, normal -Y
        Face {
            corners: [[-r, c, -r], [r, c, -r], [r, c, r], [-r, c, r]],
            normal: [0.0, -1.0, 0.0],
        },
        // Back wall (-Z), normal +Z
        Face {
            corners: [[-r, f, -r], [r, f, -r], [r, c, -r], [-r, c, -r]],
            normal: [0.0, 0.0, 1.0],
        },
        // Front wall (+Z), normal -Z
        Face {
            corners: [[r, f, r], [-r, f, r], [-r, c, r], [r, c, r]],
            normal: [0.0, 0.0, -1.0],
        },
        // Left wall (-X), normal +X
        Face {
            corners: [[-r, f, r], [-r, f, -r], [-r, c, -r], [-r, c, r]],
            normal: [1.0, 0.0, 0.0],
        },
        // Right wall (+X), normal -X
        Face {
            corners: [[r, f, -r], [r, f, r], [r, c, r], [r, c, -r]],
            normal: [-1.0, 0.0, 0.0],
        },
    ];

    let (vertices, indices) = emit_faces(&faces);
    let mut mesh = MeshData::new("Room");
    mesh.push_shape(
        "Room",
        &vertices,
        &indices,
        MaterialData {
            diffuse: Vec3::splat(materials::ROOM_COLOR),
            specular: Vec3::splat(materials::ROOM_SPECULAR),
            shininess: materials::ROOM_SHININESS,
        },
    );
    mesh
}

/// A small stage usable without any on-disk mesh: a platform, a truss bar,
/// and four `Anchor.00N` markers hanging from the truss.
#[must_use]
pub fn create_demo_stage() -> MeshData {
    let mut mesh = MeshData::new("Demo Stage");

    let deck = MaterialData {
        diffuse: Vec3::new(0.32, 0.27, 0.22),
        specular: Vec3::splat(materials::STAGE_SPECULAR),
        shininess: materials::STAGE_SHININESS,
    };
    let metal = MaterialData {
        diffuse: Vec3::splat(0.35),
        specular: Vec3::splat(0.6),
        shininess: 48.0,
    };

    let (v, i) = create_box(Vec3::new(0.0, 0.75, 0.0), Vec3::new(30.0, 1.5, 16.0));
    mesh.push_shape("Deck", &v, &i, deck);

    let (v, i) = create_box(Vec3::new(0.0, 14.5, -4.0), Vec3::new(34.0, 0.5, 0.5));
    mesh.push_shape("Truss", &v, &i, metal);

    for (n, x) in [-12.0_f32, -4.0, 4.0, 12.0].into_iter().enumerate() {
        let (v, i) = create_box(Vec3::new(x, 14.0, -4.0), Vec3::splat(0.4));
        mesh.push_shape(format!("{}{:03}", fixture::ANCHOR_PREFIX, n + 1), &v, &i, metal);
    }

    mesh
}

/// Box meshes for the built-in moving head, named after the models that
/// [`FixtureDescription::default_moving_head`](crate::resources::fixture::FixtureDescription::default_moving_head)
/// references. Each is modeled around its own node origin.
#[must_use]
pub fn create_moving_head_models() -> Vec<MeshData> {
    let body = MaterialData {
        diffuse: Vec3::from(materials::FIXTURE_COLOR),
        specular: Vec3::splat(0.4),
        shininess: 32.0,
    };

    let mut base = MeshData::new("Base");
    let (v, i) = create_box(Vec3::new(0.0, 0.1, 0.0), Vec3::new(0.6, 0.2, 0.6));
    base.push_shape("Base", &v, &i, body);

    let mut yoke = MeshData::new("Yoke");
    let (v, i) = create_box(Vec3::new(0.0, 0.04, 0.0), Vec3::new(0.74, 0.08, 0.2));
    yoke.push_shape("Bridge", &v, &i, body);
    for x in [-0.33_f32, 0.33] {
        let (v, i) = create_box(Vec3::new(x, 0.35, 0.0), Vec3::new(0.08, 0.62, 0.2));
        yoke.push_shape("Arm", &v, &i, body);
    }

    let mut head = MeshData::new("Head");
    let (v, i) = create_box(Vec3::ZERO, Vec3::new(0.5, 0.45, 0.7));
    head.push_shape("Head", &v, &i, body);

    vec![base, yoke, head]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_has_expected_counts() {
        let room_mesh = create_room();
        assert_eq!(room_mesh.vertices.len(), 24);
        assert_eq!(room_mesh.index_count(), room::INDEX_COUNT);
    }

    #[test]
    fn room_normals_point_inward() {
        let room_mesh = create_room();
        for v in &room_mesh.vertices {
            let p = Vec3::from(v.position);
            let n = Vec3::from(v.normal);
            let center = Vec3::new(0.0, (room::FLOOR_Y + room::CEILING_Y) * 0.5, 0.0);
            assert!((center - p).dot(n) > 0.0, "normal {n} at {p} faces outward");
        }
    }

    #[test]
    fn demo_stage_rests_on_zero() {
        let stage = create_demo_stage();
        assert!(stage.min_y().abs() < 1e-6);
        assert_eq!(
            stage
                .shapes
                .iter()
                .filter(|s| s.name.starts_with(fixture::ANCHOR_PREFIX))
                .count(),
            4
        );
    }
}
