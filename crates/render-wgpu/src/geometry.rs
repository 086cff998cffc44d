use crate::scope;
use umbra_assets::{LoadErrors, MeshData, MeshVertex, ResourceKind};
use umbra_common::DemoConfig;
use umbra_render::RenderError;
use umbra_scene::{Geometry, Scene, SceneObject};
use wgpu::util::DeviceExt;

/// Vertex layout every pipeline expects: position (vec4), normal, uv,
/// tangent. The shadow pipeline reads only the position.
pub(crate) const VERTEX_STRIDE: u32 = MeshVertex::STRIDE as u32;

/// Vertex and index buffers of one mesh on the GPU.
#[derive(Debug)]
pub struct GpuGeometry {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    vertex_count: u32,
    index_count: u32,
    stride: u32,
}

impl GpuGeometry {
    pub fn from_mesh(
        device: &wgpu::Device,
        name: &str,
        mesh: &MeshData,
    ) -> Result<Self, RenderError> {
        Self::from_raw(
            device,
            name,
            mesh.vertex_bytes(),
            VERTEX_STRIDE,
            mesh.index_bytes(),
        )
    }

    /// Upload raw vertex bytes with the given stride and `u32` indices.
    /// Fails unless the stride matches the pipelines' vertex layout and the
    /// mesh has at least one vertex and one index.
    pub fn from_raw(
        device: &wgpu::Device,
        name: &str,
        vertex_bytes: &[u8],
        stride: u32,
        index_bytes: &[u8],
    ) -> Result<Self, RenderError> {
        let (vertex_count, index_count) =
            buffer_counts(name, vertex_bytes.len(), stride, index_bytes.len())?;

        let (vertex_buffer, index_buffer) = scope::capture(device, "mesh buffers", || {
            let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{name}_vertices")),
                contents: vertex_bytes,
                usage: wgpu::BufferUsages::VERTEX,
            });
            let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{name}_indices")),
                contents: index_bytes,
                usage: wgpu::BufferUsages::INDEX,
            });
            (vertex_buffer, index_buffer)
        })?;

        tracing::debug!(name, vertex_count, index_count, "uploaded mesh");
        Ok(Self {
            vertex_buffer,
            index_buffer,
            vertex_count,
            index_count,
            stride,
        })
    }
}

/// Vertex and index counts for buffers of the given byte lengths.
///
/// wgpu cannot slice a zero-sized buffer, so an empty mesh is refused here
/// rather than at its first draw.
fn buffer_counts(
    name: &str,
    vertex_len: usize,
    stride: u32,
    index_len: usize,
) -> Result<(u32, u32), RenderError> {
    if stride != VERTEX_STRIDE || vertex_len % stride as usize != 0 {
        return Err(RenderError::VertexStride {
            name: name.to_string(),
            stride,
            expected: VERTEX_STRIDE,
        });
    }
    let index_size = std::mem::size_of::<u32>();
    if vertex_len == 0 || index_len < index_size {
        return Err(RenderError::EmptyMesh {
            name: name.to_string(),
        });
    }
    Ok(((vertex_len / stride as usize) as u32, (index_len / index_size) as u32))
}

impl Geometry for GpuGeometry {
    fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    fn index_count(&self) -> u32 {
        self.index_count
    }

    fn vertex_stride(&self) -> u32 {
        self.stride
    }
}

/// Upload every configured entity's mesh and build the scene.
///
/// `meshes` are keyed by entity name. Failures are collected rather than
/// returned one at a time so startup can report all of them at once.
pub fn upload_scene(
    device: &wgpu::Device,
    config: &DemoConfig,
    meshes: &[(String, MeshData)],
) -> Result<Scene<GpuGeometry>, LoadErrors> {
    let mut errors = LoadErrors::new();
    let mut scene = Scene::new();

    for entity in &config.entities {
        let Some((_, mesh)) = meshes.iter().find(|(name, _)| *name == entity.name) else {
            errors.push(ResourceKind::Mesh, &entity.name, "no mesh loaded");
            continue;
        };
        match GpuGeometry::from_mesh(device, &entity.name, mesh) {
            Ok(geometry) => {
                scene.push(SceneObject::from_config(entity, geometry));
            }
            Err(e @ (RenderError::EmptyMesh { .. } | RenderError::VertexStride { .. })) => {
                errors.push(ResourceKind::Mesh, &entity.name, e)
            }
            Err(e) => errors.push(ResourceKind::GpuResource, &entity.name, e),
        }
    }

    errors.into_result()?;
    Ok(scene)
}
