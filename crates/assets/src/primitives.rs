//! Procedural meshes used by the default scene.
//!
//! Front faces wind clockwise when seen from outside. Every primitive carries
//! tangents pointing along increasing `u`.

use crate::error::AssetError;
use crate::mesh::{MeshData, MeshVertex};
use glam::{Vec2, Vec3};
use std::f32::consts::{PI, TAU};

/// Axis-aligned cube of edge length `size` centred on the origin, four
/// vertices per face.
pub fn cube(size: f32) -> Result<MeshData, AssetError> {
    if !(size > 0.0) {
        return Err(AssetError::InvalidPrimitive(format!(
            "cube size must be positive, got {size}"
        )));
    }
    let half = size * 0.5;
    // (outward normal, screen-up direction when viewed from outside)
    let faces = [
        (Vec3::X, Vec3::Y),
        (Vec3::NEG_X, Vec3::Y),
        (Vec3::Z, Vec3::Y),
        (Vec3::NEG_Z, Vec3::Y),
        (Vec3::Y, Vec3::Z),
        (Vec3::NEG_Y, Vec3::NEG_Z),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (normal, up) in faces {
        let right = normal.cross(up);
        let center = normal * half;
        let base = vertices.len() as u32;
        for (sx, sy, uv) in [
            (-1.0, 1.0, Vec2::new(0.0, 0.0)),
            (1.0, 1.0, Vec2::new(1.0, 0.0)),
            (1.0, -1.0, Vec2::new(1.0, 1.0)),
            (-1.0, -1.0, Vec2::new(0.0, 1.0)),
        ] {
            let position = center + right * (sx * half) + up * (sy * half);
            vertices.push(MeshVertex::new(position, normal, uv, Vec3::ZERO));
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    let mut mesh = MeshData::new(vertices, indices)?;
    mesh.generate_tangents();
    Ok(mesh)
}

/// UV sphere with `stacks` latitude bands and `slices` longitude segments.
pub fn sphere(radius: f32, stacks: u32, slices: u32) -> Result<MeshData, AssetError> {
    if !(radius > 0.0) {
        return Err(AssetError::InvalidPrimitive(format!(
            "sphere radius must be positive, got {radius}"
        )));
    }
    if stacks < 2 || slices < 3 {
        return Err(AssetError::InvalidPrimitive(format!(
            "sphere needs at least 2 stacks and 3 slices, got {stacks}x{slices}"
        )));
    }

    let ring = slices + 1;
    let mut vertices = Vec::with_capacity(((stacks + 1) * ring) as usize);
    for i in 0..=stacks {
        let v = i as f32 / stacks as f32;
        let (sin_phi, cos_phi) = (v * PI).sin_cos();
        for j in 0..=slices {
            let u = j as f32 / slices as f32;
            let (sin_theta, cos_theta) = (u * TAU).sin_cos();
            let normal = Vec3::new(sin_phi * cos_theta, cos_phi, sin_phi * sin_theta);
            let tangent = Vec3::new(-sin_theta, 0.0, cos_theta);
            vertices.push(MeshVertex::new(
                normal * radius,
                normal,
                Vec2::new(u, v),
                tangent,
            ));
        }
    }

    let mut indices = Vec::with_capacity((stacks * slices * 6) as usize);
    for i in 0..stacks {
        for j in 0..slices {
            let a = i * ring + j;
            let b = a + ring;
            indices.extend_from_slice(&[a, a + 1, b, a + 1, b + 1, b]);
        }
    }

    MeshData::new(vertices, indices)
}

/// Horizontal square at y = 0 spanning `±half_extent`, with texture
/// coordinates repeating `uv_repeat` times across it.
pub fn plane(half_extent: f32, uv_repeat: f32) -> Result<MeshData, AssetError> {
    if !(half_extent > 0.0) || !(uv_repeat > 0.0) {
        return Err(AssetError::InvalidPrimitive(format!(
            "plane needs positive extent and uv repeat, got {half_extent} and {uv_repeat}"
        )));
    }
    let h = half_extent;
    let r = uv_repeat;
    let corner = |x: f32, z: f32, u: f32, v: f32| {
        MeshVertex::new(Vec3::new(x, 0.0, z), Vec3::Y, Vec2::new(u, v), Vec3::X)
    };
    MeshData::new(
        vec![
            corner(-h, -h, 0.0, r),
            corner(h, -h, r, r),
            corner(h, h, r, 0.0),
            corner(-h, h, 0.0, 0.0),
        ],
        vec![0, 3, 2, 0, 2, 1],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use umbra_scene::Geometry;

    fn assert_unit_tangents(mesh: &MeshData) {
        for v in &mesh.vertices {
            assert!((Vec3::from(v.normal).length() - 1.0).abs() < 1e-4);
            assert!((Vec3::from(v.tangent).length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn cube_counts_and_extent() {
        let mesh = cube(2.0).unwrap();
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.index_count(), 36);
        let (lo, hi) = mesh.bounds().unwrap();
        assert!(lo.abs_diff_eq(Vec3::splat(-1.0), 1e-6));
        assert!(hi.abs_diff_eq(Vec3::splat(1.0), 1e-6));
        assert_unit_tangents(&mesh);
    }

    #[test]
    fn cube_tangents_lie_in_face_plane() {
        let mesh = cube(1.0).unwrap();
        for v in &mesh.vertices {
            let t = Vec3::from(v.tangent);
            assert!(t.dot(Vec3::from(v.normal)).abs() < 1e-5);
            assert!((t.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn cube_faces_wind_clockwise_from_outside() {
        let mesh = cube(1.0).unwrap();
        for tri in mesh.indices.chunks_exact(3) {
            let [a, b, c] = [0, 1, 2].map(|k| mesh.vertices[tri[k] as usize].position());
            let n = Vec3::from(mesh.vertices[tri[0] as usize].normal);
            // in a left-handed frame, clockwise from outside puts the edge cross product outward
            assert!((b - a).cross(c - a).dot(n) > 0.0);
        }
    }

    #[test]
    fn sphere_vertices_on_surface() {
        let mesh = sphere(3.0, 8, 12).unwrap();
        assert_eq!(mesh.vertex_count(), 9 * 13);
        assert_eq!(mesh.index_count(), 8 * 12 * 6);
        for v in &mesh.vertices {
            assert!((v.position().length() - 3.0).abs() < 1e-4);
        }
        assert_unit_tangents(&mesh);
    }

    #[test]
    fn plane_is_flat_with_x_tangent() {
        let mesh = plane(10.0, 4.0).unwrap();
        assert_eq!(mesh.index_count(), 6);
        for v in &mesh.vertices {
            assert_eq!(v.position[1], 0.0);
            assert_eq!(Vec3::from(v.tangent), Vec3::X);
        }
        let mut regenerated = mesh.clone();
        regenerated.generate_tangents();
        for v in &regenerated.vertices {
            assert!(Vec3::from(v.tangent).abs_diff_eq(Vec3::X, 1e-6));
        }
    }

    #[test]
    fn rejects_bad_parameters() {
        assert!(cube(0.0).is_err());
        assert!(cube(f32::NAN).is_err());
        assert!(sphere(1.0, 1, 8).is_err());
        assert!(sphere(-1.0, 4, 8).is_err());
        assert!(plane(5.0, 0.0).is_err());
    }
}
