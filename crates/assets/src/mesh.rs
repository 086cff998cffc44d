use crate::error::AssetError;
use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};
use umbra_scene::Geometry;

/// One vertex record, laid out exactly as in `.box` files and vertex buffers.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 4],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub tangent: [f32; 3],
}

impl MeshVertex {
    /// Size of one record in bytes.
    pub const STRIDE: usize = std::mem::size_of::<Self>();

    pub fn new(position: Vec3, normal: Vec3, uv: Vec2, tangent: Vec3) -> Self {
        Self {
            position: position.extend(1.0).to_array(),
            normal: normal.to_array(),
            uv: uv.to_array(),
            tangent: tangent.to_array(),
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::new(self.position[0], self.position[1], self.position[2])
    }
}

/// CPU-side indexed triangle mesh.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Build a mesh, rejecting indices that point past the vertex array.
    pub fn new(vertices: Vec<MeshVertex>, indices: Vec<u32>) -> Result<Self, AssetError> {
        let mesh = Self { vertices, indices };
        mesh.validate()?;
        Ok(mesh)
    }

    pub fn validate(&self) -> Result<(), AssetError> {
        let vertex_count = u32::try_from(self.vertices.len()).map_err(|_| AssetError::TooLarge {
            field: "vertex count",
            value: self.vertices.len(),
        })?;
        if let Some((position, &index)) = self
            .indices
            .iter()
            .enumerate()
            .find(|(_, i)| **i >= vertex_count)
        {
            return Err(AssetError::IndexOutOfRange {
                position,
                index,
                vertex_count,
            });
        }
        if self.indices.len() % 3 != 0 {
            tracing::warn!(
                "index count {} is not a multiple of 3, trailing indices are ignored",
                self.indices.len()
            );
        }
        Ok(())
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Axis-aligned bounds of the vertex positions, or `None` for an empty mesh.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut iter = self.vertices.iter().map(MeshVertex::position);
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p))))
    }

    /// Recompute per-vertex tangents from positions and texture coordinates.
    ///
    /// Each triangle contributes the direction of increasing `u`; shared
    /// vertices average their contributions, which are then made orthogonal
    /// to the vertex normal.
    pub fn generate_tangents(&mut self) {
        let mut accum = vec![Vec3::ZERO; self.vertices.len()];
        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let (Some(v0), Some(v1), Some(v2)) =
                (self.vertices.get(a), self.vertices.get(b), self.vertices.get(c))
            else {
                continue;
            };
            let delta_pos1 = v1.position() - v0.position();
            let delta_pos2 = v2.position() - v0.position();
            let delta_uv1 = Vec2::from(v1.uv) - Vec2::from(v0.uv);
            let delta_uv2 = Vec2::from(v2.uv) - Vec2::from(v0.uv);

            let det = delta_uv1.x * delta_uv2.y - delta_uv1.y * delta_uv2.x;
            if det.abs() < f32::EPSILON {
                continue;
            }
            let tangent = (delta_pos1 * delta_uv2.y - delta_pos2 * delta_uv1.y) / det;
            for i in [a, b, c] {
                accum[i] += tangent;
            }
        }

        for (vertex, tangent) in self.vertices.iter_mut().zip(accum) {
            let normal = Vec3::from(vertex.normal);
            let orthogonal = tangent - normal * normal.dot(tangent);
            vertex.tangent = orthogonal.normalize_or_zero().to_array();
        }
    }
}

impl Geometry for MeshData {
    fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    fn vertex_stride(&self) -> u32 {
        MeshVertex::STRIDE as u32
    }
}
