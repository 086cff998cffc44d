/// Errors from frame planning and GPU resource creation.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("uniform buffer full: all {capacity} slots used this frame")]
    UniformCapacity { capacity: u32 },
    #[error("set_world_matrix called before start_shadow_render")]
    ShadowPassNotStarted,
    #[error("shader '{name}' failed to compile: {message}")]
    Shader { name: &'static str, message: String },
    #[error("failed to create {resource}: {message}")]
    ResourceCreation {
        resource: &'static str,
        message: String,
    },
    #[error("'{name}' has a vertex stride of {stride} bytes, expected {expected}")]
    VertexStride {
        name: String,
        stride: u32,
        expected: u32,
    },
    #[error("'{name}' has no triangles to draw")]
    EmptyMesh { name: String },
    #[error("no shading mode {0}, expected 0 to 4")]
    InvalidShadingMode(u32),
    #[error("uniform alignment {0} is not a power of two")]
    InvalidAlignment(u32),
}
