use crate::geometry::{GpuGeometry, VERTEX_STRIDE};
use crate::scope;
use crate::shaders;
use crate::shadow::ShadowPass;
use crate::texture::{self, DEPTH_FORMAT, GpuTexture};
use umbra_assets::{AssetError, TextureData};
use umbra_common::{DebugViewMode, DemoConfig};
use umbra_render::{
    DrawUniforms, Frame, FrameUniforms, Pass, RenderError, UniformArena, aligned_stride,
};
use umbra_scene::{Geometry, Scene};

/// wgpu renderer for the shadow-mapped scene.
///
/// Executes a planned [`Frame`]: the shadow pass into the shadow map, the
/// lit main pass into the surface, then the optional shadow map view. All
/// three are recorded on one command encoder and submitted once.
pub struct WgpuRenderer {
    shadow: ShadowPass,
    shadow_resolution: Option<[u32; 2]>,
    scene_pipeline: wgpu::RenderPipeline,
    debug_pipeline: wgpu::RenderPipeline,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    draw_buffer: wgpu::Buffer,
    draw_bind_group: wgpu::BindGroup,
    material_layout: wgpu::BindGroupLayout,
    material_bind_group: wgpu::BindGroup,
    debug_layout: wgpu::BindGroupLayout,
    debug_bind_group: wgpu::BindGroup,
    diffuse: GpuTexture,
    normal: GpuTexture,
    material_sampler: wgpu::Sampler,
    shadow_sampler: wgpu::Sampler,
    depth_texture: wgpu::TextureView,
    draw_capacity: u32,
    surface_format: wgpu::TextureFormat,
    size: [u32; 2],
}

impl WgpuRenderer {
    /// Build every pipeline and GPU resource. Material textures start as
    /// a plain white diffuse and a flat normal map until
    /// [`set_textures`](Self::set_textures) replaces them.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        config: &DemoConfig,
    ) -> Result<Self, RenderError> {
        let shadow_resolution = config.shadow.resolution;
        let [shadow_w, shadow_h] = config.shadow_resolution(width, height);
        let shadow = ShadowPass::new(device, shadow_w, shadow_h, &config.shadow)?;

        let alignment = device.limits().min_uniform_buffer_offset_alignment;
        let draw_capacity = config.shadow.max_draws.max(1);
        let draw_stride = aligned_stride(UniformArena::<DrawUniforms>::block_size() as u32, alignment);
        let frame_size = wgpu::BufferSize::new(std::mem::size_of::<FrameUniforms>() as u64);
        let draw_size = wgpu::BufferSize::new(UniformArena::<DrawUniforms>::block_size());

        let scene_shader = scope::capture_shader(device, "scene_shader", &shaders::scene_shader())?;
        let debug_shader = scope::capture_shader(device, "debug_shader", &shaders::debug_shader())?;

        let (frame_buffer, draw_buffer) = scope::capture(device, "uniform buffers", || {
            let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("frame_uniforms"),
                size: std::mem::size_of::<FrameUniforms>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let draw_buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("draw_uniforms"),
                size: u64::from(draw_stride) * u64::from(draw_capacity),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            (frame_buffer, draw_buffer)
        })?;

        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frame_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: frame_size,
                },
                count: None,
            }],
        });
        let draw_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("draw_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: draw_size,
                },
                count: None,
            }],
        });
        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("material_bind_group_layout"),
            entries: &[
                texture_entry(0, wgpu::TextureSampleType::Float { filterable: true }),
                texture_entry(1, wgpu::TextureSampleType::Float { filterable: true }),
                sampler_entry(2, wgpu::SamplerBindingType::Filtering),
                texture_entry(3, wgpu::TextureSampleType::Depth),
                sampler_entry(4, wgpu::SamplerBindingType::Comparison),
            ],
        });
        let debug_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("debug_bind_group_layout"),
            entries: &[texture_entry(0, wgpu::TextureSampleType::Depth)],
        });

        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame_bind_group"),
            layout: &frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });
        let draw_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("draw_bind_group"),
            layout: &draw_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &draw_buffer,
                    offset: 0,
                    size: draw_size,
                }),
            }],
        });

        let (scene_pipeline, debug_pipeline) = scope::capture(device, "render pipelines", || {
            let scene_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("scene_pipeline_layout"),
                bind_group_layouts: &[&frame_layout, &draw_layout, &material_layout],
                push_constant_ranges: &[],
            });
            let scene_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("scene_pipeline"),
                layout: Some(&scene_layout),
                vertex: wgpu::VertexState {
                    module: &scene_shader,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[wgpu::VertexBufferLayout {
                        array_stride: u64::from(VERTEX_STRIDE),
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![
                            0 => Float32x4,
                            1 => Float32x3,
                            2 => Float32x2,
                            3 => Float32x3,
                        ],
                    }],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &scene_shader,
                    entry_point: Some("fs_main"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: surface_format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    front_face: wgpu::FrontFace::Cw,
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: Default::default(),
                    bias: Default::default(),
                }),
                multisample: Default::default(),
                multiview: None,
                cache: None,
            });

            let debug_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("debug_pipeline_layout"),
                bind_group_layouts: &[&frame_layout, &debug_layout],
                push_constant_ranges: &[],
            });
            let debug_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("debug_pipeline"),
                layout: Some(&debug_pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &debug_shader,
                    entry_point: Some("vs_fullscreen"),
                    compilation_options: Default::default(),
                    buffers: &[],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &debug_shader,
                    entry_point: Some("fs_depth"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: surface_format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    ..Default::default()
                },
                depth_stencil: None,
                multisample: Default::default(),
                multiview: None,
                cache: None,
            });
            (scene_pipeline, debug_pipeline)
        })?;

        let white = TextureData::new(1, 1, vec![255; 4]).map_err(texture_error)?;
        let flat = TextureData::flat_normal(1).map_err(texture_error)?;
        let diffuse = GpuTexture::from_data(device, queue, &white, "diffuse_texture", true)?;
        let normal = GpuTexture::from_data(device, queue, &flat, "normal_texture", false)?;
        let material_sampler = texture::material_sampler(device);
        let shadow_sampler = texture::shadow_sampler(device);

        let (_, depth_texture) = texture::create_depth_texture(device, "depth_texture", width, height)?;

        let material_bind_group = create_material_bind_group(
            device,
            &material_layout,
            &diffuse,
            &normal,
            &material_sampler,
            shadow.shadow_texture_view(),
            &shadow_sampler,
        );
        let debug_bind_group = create_debug_bind_group(device, &debug_layout, shadow.shadow_texture_view());

        tracing::info!(?surface_format, width, height, "renderer ready");
        Ok(Self {
            shadow,
            shadow_resolution,
            scene_pipeline,
            debug_pipeline,
            frame_buffer,
            frame_bind_group,
            draw_buffer,
            draw_bind_group,
            material_layout,
            material_bind_group,
            debug_layout,
            debug_bind_group,
            diffuse,
            normal,
            material_sampler,
            shadow_sampler,
            depth_texture,
            draw_capacity,
            surface_format,
            size: [width.max(1), height.max(1)],
        })
    }

    /// Replace the material textures. The diffuse map is sRGB, the normal
    /// map linear.
    pub fn set_textures(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        diffuse: &TextureData,
        normal: &TextureData,
    ) -> Result<(), RenderError> {
        self.diffuse = GpuTexture::from_data(device, queue, diffuse, "diffuse_texture", true)?;
        self.normal = GpuTexture::from_data(device, queue, normal, "normal_texture", false)?;
        self.rebuild_bind_groups(device);
        Ok(())
    }

    /// Recreate size-dependent targets. The shadow map follows the window
    /// unless its resolution is fixed in the config.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) -> Result<(), RenderError> {
        let (_, depth_texture) = texture::create_depth_texture(device, "depth_texture", width, height)?;
        self.depth_texture = depth_texture;
        self.size = [width.max(1), height.max(1)];

        if self.shadow_resolution.is_none() {
            self.shadow.resize(device, width, height)?;
            self.rebuild_bind_groups(device);
        }
        Ok(())
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    pub fn shadow_pass(&self) -> &ShadowPass {
        &self.shadow
    }

    /// Record and submit every pass of `frame` onto `view`.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        frame: &Frame<'_>,
        scene: &Scene<GpuGeometry>,
    ) -> Result<(), RenderError> {
        if frame.draw_uniforms.len() > self.draw_capacity {
            return Err(RenderError::UniformCapacity {
                capacity: self.draw_capacity,
            });
        }
        if let Some(uniforms) = frame.plan.frame_uniforms() {
            queue.write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(uniforms));
        }
        if !frame.draw_uniforms.is_empty() {
            queue.write_buffer(&self.draw_buffer, 0, frame.draw_uniforms.as_bytes());
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("frame_encoder"),
        });

        for pass in &frame.plan.passes {
            match pass {
                Pass::Shadow { draws } => {
                    let mut shadow_pass =
                        self.shadow
                            .start_shadow_render(&mut encoder, queue, frame.shadow_uniforms);
                    for draw in draws {
                        let Some(object) = scene.get(draw.object) else {
                            tracing::warn!(object = draw.object, "shadow draw for missing object");
                            continue;
                        };
                        shadow_pass.draw(draw.slot, object.entity.geometry());
                    }
                }
                Pass::Main {
                    clear_color, draws, ..
                } => {
                    let mut main_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                        label: Some("main_pass"),
                        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                            view,
                            resolve_target: None,
                            ops: wgpu::Operations {
                                load: wgpu::LoadOp::Clear(wgpu::Color {
                                    r: f64::from(clear_color[0]),
                                    g: f64::from(clear_color[1]),
                                    b: f64::from(clear_color[2]),
                                    a: f64::from(clear_color[3]),
                                }),
                                store: wgpu::StoreOp::Store,
                            },
                        })],
                        depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                            view: &self.depth_texture,
                            depth_ops: Some(wgpu::Operations {
                                load: wgpu::LoadOp::Clear(1.0),
                                store: wgpu::StoreOp::Store,
                            }),
                            stencil_ops: None,
                        }),
                        ..Default::default()
                    });

                    main_pass.set_pipeline(&self.scene_pipeline);
                    main_pass.set_bind_group(0, &self.frame_bind_group, &[]);
                    main_pass.set_bind_group(2, &self.material_bind_group, &[]);
                    for draw in draws {
                        let Some(object) = scene.get(draw.object) else {
                            tracing::warn!(object = draw.object, "main draw for missing object");
                            continue;
                        };
                        let geometry = object.entity.geometry();
                        main_pass.set_bind_group(
                            1,
                            &self.draw_bind_group,
                            &[frame.draw_uniforms.offset(draw.slot)],
                        );
                        main_pass.set_vertex_buffer(0, geometry.vertex_buffer.slice(..));
                        main_pass.set_index_buffer(
                            geometry.index_buffer.slice(..),
                            wgpu::IndexFormat::Uint32,
                        );
                        main_pass.draw_indexed(0..geometry.index_count(), 0, 0..1);
                    }
                }
                Pass::Debug { view: mode } => {
                    let Some([x, y, w, h]) = debug_viewport(*mode, self.size) else {
                        continue;
                    };
                    let mut debug_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                        label: Some("debug_pass"),
                        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                            view,
                            resolve_target: None,
                            ops: wgpu::Operations {
                                load: wgpu::LoadOp::Load,
                                store: wgpu::StoreOp::Store,
                            },
                        })],
                        ..Default::default()
                    });
                    debug_pass.set_pipeline(&self.debug_pipeline);
                    debug_pass.set_viewport(x, y, w, h, 0.0, 1.0);
                    debug_pass.set_bind_group(0, &self.frame_bind_group, &[]);
                    debug_pass.set_bind_group(1, &self.debug_bind_group, &[]);
                    debug_pass.draw(0..3, 0..1);
                }
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }

    fn rebuild_bind_groups(&mut self, device: &wgpu::Device) {
        self.material_bind_group = create_material_bind_group(
            device,
            &self.material_layout,
            &self.diffuse,
            &self.normal,
            &self.material_sampler,
            self.shadow.shadow_texture_view(),
            &self.shadow_sampler,
        );
        self.debug_bind_group =
            create_debug_bind_group(device, &self.debug_layout, self.shadow.shadow_texture_view());
    }
}

/// Viewport `[x, y, width, height]` of the shadow map view: the bottom-right
/// quarter for the inset, the whole target for full screen.
pub fn debug_viewport(mode: DebugViewMode, size: [u32; 2]) -> Option<[f32; 4]> {
    let [w, h] = [size[0] as f32, size[1] as f32];
    match mode {
        DebugViewMode::Off => None,
        DebugViewMode::Inset => Some([w * 0.5, h * 0.5, w * 0.5, h * 0.5]),
        DebugViewMode::Fullscreen => Some([0.0, 0.0, w, h]),
    }
}

fn texture_error(e: AssetError) -> RenderError {
    RenderError::ResourceCreation {
        resource: "default texture",
        message: e.to_string(),
    }
}

fn texture_entry(binding: u32, sample_type: wgpu::TextureSampleType) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type,
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

fn sampler_entry(binding: u32, kind: wgpu::SamplerBindingType) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(kind),
        count: None,
    }
}

fn create_material_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    diffuse: &GpuTexture,
    normal: &GpuTexture,
    material_sampler: &wgpu::Sampler,
    shadow_view: &wgpu::TextureView,
    shadow_sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("material_bind_group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&diffuse.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(&normal.view),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(material_sampler),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: wgpu::BindingResource::TextureView(shadow_view),
            },
            wgpu::BindGroupEntry {
                binding: 4,
                resource: wgpu::BindingResource::Sampler(shadow_sampler),
            },
        ],
    })
}

fn create_debug_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    shadow_view: &wgpu::TextureView,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("debug_bind_group"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::TextureView(shadow_view),
        }],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inset_covers_bottom_right_quarter() {
        assert_eq!(
            debug_viewport(DebugViewMode::Inset, [800, 600]),
            Some([400.0, 300.0, 400.0, 300.0])
        );
        assert_eq!(
            debug_viewport(DebugViewMode::Fullscreen, [800, 600]),
            Some([0.0, 0.0, 800.0, 600.0])
        );
        assert_eq!(debug_viewport(DebugViewMode::Off, [800, 600]), None);
    }
}
