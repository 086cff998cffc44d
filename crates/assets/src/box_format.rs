//! `.box` mesh files.
//!
//! Layout, all little-endian:
//!
//! ```text
//! i32 vertex_count
//! i32 index_count
//! vertex_count × 48-byte vertex records (position xyzw, normal xyz, uv, tangent xyz)
//! index_count  × u32 indices
//! ```
//!
//! There is no magic number or version field.

use crate::error::AssetError;
use crate::mesh::{MeshData, MeshVertex};
use std::path::Path;

const HEADER_LEN: usize = 8;
const FLOATS_PER_VERTEX: usize = MeshVertex::STRIDE / 4;

pub fn load_box(path: impl AsRef<Path>) -> Result<MeshData, AssetError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| AssetError::io(path, e))?;
    let mesh = parse_box(&bytes)?;
    tracing::debug!(
        "loaded {}: {} vertices, {} indices",
        path.display(),
        mesh.vertices.len(),
        mesh.indices.len()
    );
    Ok(mesh)
}

pub fn parse_box(bytes: &[u8]) -> Result<MeshData, AssetError> {
    if bytes.len() < HEADER_LEN {
        return Err(AssetError::Truncated {
            expected: HEADER_LEN as u64,
            actual: bytes.len() as u64,
        });
    }
    let vertex_count = read_count(bytes, 0, "vertex count")?;
    let index_count = read_count(bytes, 4, "index count")?;

    let vertex_bytes = vertex_count as u64 * MeshVertex::STRIDE as u64;
    let index_bytes = index_count as u64 * 4;
    let expected = HEADER_LEN as u64 + vertex_bytes + index_bytes;
    let actual = bytes.len() as u64;
    if actual < expected {
        return Err(AssetError::Truncated { expected, actual });
    }
    if actual > expected {
        tracing::warn!("ignoring {} trailing bytes after mesh data", actual - expected);
    }

    let vertex_end = HEADER_LEN + vertex_bytes as usize;
    let vertices = bytes[HEADER_LEN..vertex_end]
        .chunks_exact(MeshVertex::STRIDE)
        .map(read_vertex)
        .collect();
    let indices = bytes[vertex_end..vertex_end + index_bytes as usize]
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();

    MeshData::new(vertices, indices)
}

/// Serialize a mesh in `.box` layout.
pub fn encode_box(mesh: &MeshData) -> Result<Vec<u8>, AssetError> {
    let vertex_count = header_count(mesh.vertices.len(), "vertex count")?;
    let index_count = header_count(mesh.indices.len(), "index count")?;

    let mut out = Vec::with_capacity(
        HEADER_LEN + mesh.vertices.len() * MeshVertex::STRIDE + mesh.indices.len() * 4,
    );
    out.extend_from_slice(&vertex_count.to_le_bytes());
    out.extend_from_slice(&index_count.to_le_bytes());
    for vertex in &mesh.vertices {
        let floats: &[f32] = bytemuck::cast_slice(std::slice::from_ref(vertex));
        for f in floats {
            out.extend_from_slice(&f.to_le_bytes());
        }
    }
    for index in &mesh.indices {
        out.extend_from_slice(&index.to_le_bytes());
    }
    Ok(out)
}

pub fn save_box(mesh: &MeshData, path: impl AsRef<Path>) -> Result<(), AssetError> {
    let path = path.as_ref();
    let bytes = encode_box(mesh)?;
    std::fs::write(path, &bytes).map_err(|e| AssetError::io(path, e))?;
    tracing::debug!("wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

fn read_count(bytes: &[u8], at: usize, field: &'static str) -> Result<u32, AssetError> {
    let value = i32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]);
    u32::try_from(value).map_err(|_| AssetError::NegativeCount { field, value })
}

fn header_count(len: usize, field: &'static str) -> Result<i32, AssetError> {
    i32::try_from(len).map_err(|_| AssetError::TooLarge { field, value: len })
}

fn read_vertex(record: &[u8]) -> MeshVertex {
    let mut floats = [0f32; FLOATS_PER_VERTEX];
    for (f, c) in floats.iter_mut().zip(record.chunks_exact(4)) {
        *f = f32::from_le_bytes([c[0], c[1], c[2], c[3]]);
    }
    bytemuck::cast(floats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives;
    use glam::{Vec2, Vec3};

    fn triangle() -> MeshData {
        MeshData::new(
            vec![
                MeshVertex::new(Vec3::ZERO, Vec3::Y, Vec2::ZERO, Vec3::X),
                MeshVertex::new(Vec3::Z, Vec3::Y, Vec2::new(0.0, 1.0), Vec3::X),
                MeshVertex::new(Vec3::X, Vec3::Y, Vec2::new(1.0, 0.0), Vec3::X),
            ],
            vec![0, 1, 2],
        )
        .unwrap()
    }

    #[test]
    fn header_and_sizes() {
        let bytes = encode_box(&triangle()).unwrap();
        assert_eq!(bytes.len(), 8 + 3 * 48 + 3 * 4);
        assert_eq!(&bytes[0..4], &3i32.to_le_bytes());
        assert_eq!(&bytes[4..8], &3i32.to_le_bytes());
        // first vertex position w
        assert_eq!(&bytes[8 + 12..8 + 16], &1.0f32.to_le_bytes());
    }

    #[test]
    fn file_round_trip() {
        let mesh = primitives::cube(2.0).unwrap();
        let tmp = tempfile::NamedTempFile::new().unwrap();
        save_box(&mesh, tmp.path()).unwrap();
        let loaded = load_box(tmp.path()).unwrap();
        assert_eq!(loaded, mesh);
    }

    #[test]
    fn rejects_short_header() {
        let err = parse_box(&[1, 0, 0]).unwrap_err();
        assert!(matches!(
            err,
            AssetError::Truncated {
                expected: 8,
                actual: 3
            }
        ));
    }

    #[test]
    fn rejects_truncated_body() {
        let mut bytes = encode_box(&triangle()).unwrap();
        bytes.truncate(bytes.len() - 2);
        let err = parse_box(&bytes).unwrap_err();
        assert!(matches!(err, AssetError::Truncated { .. }));
    }

    #[test]
    fn rejects_negative_counts() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&(-1i32).to_le_bytes());
        bytes.extend_from_slice(&0i32.to_le_bytes());
        let err = parse_box(&bytes).unwrap_err();
        assert!(matches!(
            err,
            AssetError::NegativeCount {
                field: "vertex count",
                value: -1
            }
        ));
    }

    #[test]
    fn rejects_out_of_range_indices() {
        let mut bytes = encode_box(&triangle()).unwrap();
        let last = bytes.len() - 4;
        bytes[last..].copy_from_slice(&7u32.to_le_bytes());
        let err = parse_box(&bytes).unwrap_err();
        assert!(matches!(err, AssetError::IndexOutOfRange { index: 7, .. }));
    }

    #[test]
    fn tolerates_trailing_bytes() {
        let mut bytes = encode_box(&triangle()).unwrap();
        bytes.extend_from_slice(&[0xAA; 5]);
        assert_eq!(parse_box(&bytes).unwrap(), triangle());
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_box(dir.path().join("missing.box")).unwrap_err();
        assert!(matches!(err, AssetError::Io { .. }));
    }
}
