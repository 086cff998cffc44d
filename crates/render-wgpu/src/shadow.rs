use crate::geometry::{GpuGeometry, VERTEX_STRIDE};
use crate::scope;
use crate::shaders;
use crate::texture::{DEPTH_FORMAT, create_depth_texture};
use umbra_common::ShadowConfig;
use umbra_render::{RenderError, ShadowUniforms, UniformArena, UniformSlot, aligned_stride};
use umbra_scene::Geometry;

/// Depth-only render of the scene from the light into a shadow map.
///
/// The shadow map is a `Depth32Float` texture that is both the pass's depth
/// attachment and, once the pass has ended, a `texture_depth_2d` the main
/// pass samples through a comparison sampler.
pub struct ShadowPass {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    size: [u32; 2],
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    capacity: u32,
}

impl ShadowPass {
    /// Create the shadow map target, the per-draw uniform buffer and the
    /// depth-only pipeline. Any GPU failure comes back as an error instead
    /// of aborting.
    pub fn new(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        config: &ShadowConfig,
    ) -> Result<Self, RenderError> {
        let alignment = device.limits().min_uniform_buffer_offset_alignment;
        let stride = aligned_stride(UniformArena::<ShadowUniforms>::block_size() as u32, alignment);
        let capacity = config.max_draws.max(1);
        let block_size = wgpu::BufferSize::new(UniformArena::<ShadowUniforms>::block_size());

        let (texture, view) = create_depth_texture(device, "shadow_map", width, height)?;

        let uniform_buffer = scope::capture(device, "shadow uniform buffer", || {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("shadow_uniforms"),
                size: u64::from(stride) * u64::from(capacity),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        })?;

        let shader = scope::capture_shader(device, "shadow_shader", shaders::SHADOW_SHADER)?;

        let (bind_group, pipeline) = scope::capture(device, "shadow pipeline", || {
            let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("shadow_bind_group_layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: block_size,
                    },
                    count: None,
                }],
            });

            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("shadow_bind_group"),
                layout: &layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                        buffer: &uniform_buffer,
                        offset: 0,
                        size: block_size,
                    }),
                }],
            });

            let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("shadow_pipeline_layout"),
                bind_group_layouts: &[&layout],
                push_constant_ranges: &[],
            });

            let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("shadow_pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_shadow"),
                    compilation_options: Default::default(),
                    buffers: &[wgpu::VertexBufferLayout {
                        array_stride: u64::from(VERTEX_STRIDE),
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![0 => Float32x4],
                    }],
                },
                fragment: None,
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    front_face: wgpu::FrontFace::Cw,
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::LessEqual,
                    stencil: Default::default(),
                    bias: wgpu::DepthBiasState {
                        constant: config.depth_bias_constant,
                        slope_scale: config.depth_bias_slope,
                        clamp: 0.0,
                    },
                }),
                multisample: Default::default(),
                multiview: None,
                cache: None,
            });
            (bind_group, pipeline)
        })?;

        tracing::info!(width, height, capacity, "shadow pass ready");
        Ok(Self {
            texture,
            view,
            size: [width.max(1), height.max(1)],
            pipeline,
            uniform_buffer,
            bind_group,
            capacity,
        })
    }

    /// Recreate the shadow map at a new size. Bind groups that sample the
    /// old view must be rebuilt by the caller.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) -> Result<(), RenderError> {
        let size = [width.max(1), height.max(1)];
        if size == self.size {
            return Ok(());
        }
        let (texture, view) = create_depth_texture(device, "shadow_map", width, height)?;
        self.texture = texture;
        self.view = view;
        self.size = size;
        tracing::debug!(width, height, "shadow map resized");
        Ok(())
    }

    /// Upload this frame's staged per-draw blocks and begin the depth-only
    /// pass. The depth attachment is cleared to 1.0.
    pub fn start_shadow_render<'a>(
        &'a self,
        encoder: &'a mut wgpu::CommandEncoder,
        queue: &wgpu::Queue,
        uniforms: &'a UniformArena<ShadowUniforms>,
    ) -> ShadowRenderPass<'a> {
        if uniforms.len() > self.capacity {
            tracing::warn!(
                staged = uniforms.len(),
                capacity = self.capacity,
                "more shadow draws staged than the uniform buffer holds"
            );
        }
        if !uniforms.is_empty() {
            let bytes = uniforms.as_bytes();
            let limit = bytes.len().min(self.uniform_buffer.size() as usize);
            queue.write_buffer(&self.uniform_buffer, 0, &bytes[..limit]);
        }

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("shadow_pass"),
            color_attachments: &[],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            ..Default::default()
        });
        pass.set_pipeline(&self.pipeline);

        ShadowRenderPass {
            pass,
            bind_group: &self.bind_group,
            uniforms,
            capacity: self.capacity,
        }
    }

    /// View of the shadow map for sampling in later passes.
    pub fn shadow_texture_view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    pub fn size(&self) -> [u32; 2] {
        self.size
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }
}

/// An open shadow pass. Dropping it ends the pass.
pub struct ShadowRenderPass<'a> {
    pass: wgpu::RenderPass<'a>,
    bind_group: &'a wgpu::BindGroup,
    uniforms: &'a UniformArena<ShadowUniforms>,
    capacity: u32,
}

impl ShadowRenderPass<'_> {
    /// Draw `geometry` with the block staged in `slot`.
    pub fn draw(&mut self, slot: UniformSlot, geometry: &GpuGeometry) {
        if slot.index() >= self.capacity {
            tracing::warn!(slot = slot.index(), "shadow draw outside the uniform buffer, skipped");
            return;
        }
        let offset = self.uniforms.offset(slot);
        self.pass.set_bind_group(0, self.bind_group, &[offset]);
        self.pass.set_vertex_buffer(0, geometry.vertex_buffer.slice(..));
        self.pass
            .set_index_buffer(geometry.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.pass.draw_indexed(0..geometry.index_count(), 0, 0..1);
    }
}
