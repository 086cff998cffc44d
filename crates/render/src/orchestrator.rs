//! Per-frame sequencing of the light orbit, the shadow pass, the main pass
//! and the shadow-map debug view.

use crate::arena::UniformArena;
use crate::error::RenderError;
use crate::plan::{DrawCall, Frame, FramePlan, Pass};
use crate::shading::ShadingMode;
use crate::shadow::ShadowUniformStaging;
use crate::uniforms::{DrawUniforms, FrameUniforms};
use glam::Vec3;
use umbra_common::{DebugViewMode, DemoConfig, LightConfig, LightProjection};
use umbra_scene::{Camera, FrameTime, Geometry, LightOrbit, Scene};

/// Owns the light camera and all CPU staging for a frame. GPU objects live
/// in the backend; the orchestrator only produces a [`Frame`] for it.
#[derive(Debug, Clone)]
pub struct FrameOrchestrator {
    light: Camera,
    orbit: LightOrbit,
    light_near: f32,
    light_far: f32,
    compare_bias: f32,
    clear_color: [f32; 4],
    shadow: ShadowUniformStaging,
    draws: UniformArena<DrawUniforms>,
    shading: ShadingMode,
    debug_view: DebugViewMode,
    plan: FramePlan,
}

impl FrameOrchestrator {
    /// `uniform_alignment` is the device's `min_uniform_buffer_offset_alignment`.
    pub fn new(config: &DemoConfig, uniform_alignment: u32) -> Result<Self, RenderError> {
        let capacity = config.shadow.max_draws;
        let orbit = LightOrbit::from(&config.light);
        let mut light = light_camera(&config.light);
        let light_position = orbit.aim(&mut light, 0.0);

        Ok(Self {
            light,
            orbit,
            light_near: config.light.near,
            light_far: config.light.far,
            compare_bias: config.shadow.compare_bias,
            clear_color: config.window.clear_color,
            shadow: ShadowUniformStaging::new(
                config.light.projection,
                uniform_alignment,
                capacity,
            )?,
            draws: UniformArena::new(uniform_alignment, capacity)?,
            shading: ShadingMode::default(),
            debug_view: config.debug.shadow_view,
            plan: FramePlan {
                light_position,
                ..FramePlan::default()
            },
        })
    }

    /// Run the fixed frame sequence and return the plan for the backend.
    ///
    /// 1. Move the light along its orbit for `time.elapsed`.
    /// 2. Shadow pass: for each shadow caster, rebuild its world matrix and
    ///    stage it with the light's view and projection.
    /// 3. Main pass: per-frame values, then each visible object's world matrix.
    /// 4. Debug view of the shadow map, unless switched off.
    pub fn plan_frame<G: Geometry>(
        &mut self,
        time: FrameTime,
        scene: &mut Scene<G>,
        camera: &Camera,
    ) -> Result<Frame<'_>, RenderError> {
        let light_position = self.orbit.aim(&mut self.light, time.elapsed);

        self.shadow.start_shadow_render(&self.light);
        let mut shadow_draws = Vec::new();
        for (index, object) in scene.objects_mut().iter_mut().enumerate() {
            if !object.casts_shadow {
                continue;
            }
            let world = object.update_transform(light_position);
            let slot = self.shadow.set_world_matrix(world)?;
            shadow_draws.push(DrawCall {
                object: index,
                slot,
                index_count: object.entity.index_count(),
            });
        }
        self.shadow.finish();

        let uniforms = self.frame_uniforms(camera, light_position);
        self.draws.clear();
        let mut main_draws = Vec::new();
        for (index, object) in scene.objects_mut().iter_mut().enumerate() {
            if !object.visible {
                continue;
            }
            let world = object.update_transform(light_position);
            let slot = self.draws.push(&DrawUniforms::new(world))?;
            main_draws.push(DrawCall {
                object: index,
                slot,
                index_count: object.entity.index_count(),
            });
        }

        let mut passes = vec![
            Pass::Shadow {
                draws: shadow_draws,
            },
            Pass::Main {
                clear_color: self.clear_color,
                uniforms,
                draws: main_draws,
            },
        ];
        if self.debug_view != DebugViewMode::Off {
            passes.push(Pass::Debug {
                view: self.debug_view,
            });
        }

        self.plan = FramePlan {
            frame: time.frame,
            elapsed: time.elapsed,
            light_position,
            passes,
        };
        tracing::trace!(
            "frame {}: {} shadow draws, {} main draws",
            time.frame,
            self.plan.shadow_draws().len(),
            self.plan.main_draws().len()
        );

        Ok(self.frame())
    }

    /// The most recently planned frame.
    pub fn frame(&self) -> Frame<'_> {
        Frame {
            plan: &self.plan,
            shadow_uniforms: self.shadow.slots(),
            draw_uniforms: &self.draws,
        }
    }

    fn frame_uniforms(&self, camera: &Camera, light_position: Vec3) -> FrameUniforms {
        let orthographic = match self.shadow.projection() {
            LightProjection::Perspective => 0.0,
            LightProjection::Orthographic => 1.0,
        };
        FrameUniforms {
            view: camera.view_matrix().to_cols_array_2d(),
            proj: camera.projection_matrix().to_cols_array_2d(),
            light_space: self.shadow.light_space().to_cols_array_2d(),
            camera_dir: (-camera.target()).extend(0.0).to_array(),
            light_pos: light_position.extend(1.0).to_array(),
            light_params: [
                self.light_near,
                self.light_far,
                orthographic,
                self.compare_bias,
            ],
            mode: [self.shading.index(), debug_view_index(self.debug_view), 0, 0],
        }
    }

    pub fn set_shading_mode(&mut self, mode: ShadingMode) {
        if mode != self.shading {
            tracing::info!("shading mode: {}", mode.label());
        }
        self.shading = mode;
    }

    pub fn shading_mode(&self) -> ShadingMode {
        self.shading
    }

    pub fn set_debug_view(&mut self, view: DebugViewMode) {
        self.debug_view = view;
    }

    /// Advance off → inset → fullscreen → off and return the new mode.
    pub fn cycle_debug_view(&mut self) -> DebugViewMode {
        self.debug_view = self.debug_view.next();
        tracing::info!("shadow debug view: {}", self.debug_view.label());
        self.debug_view
    }

    pub fn debug_view(&self) -> DebugViewMode {
        self.debug_view
    }

    pub fn light_camera(&self) -> &Camera {
        &self.light
    }

    pub fn light_position(&self) -> Vec3 {
        self.plan.light_position
    }

    /// Slots per pass; the backend sizes its uniform buffers from this.
    pub fn uniform_capacity(&self) -> u32 {
        self.draws.capacity()
    }

    pub fn shadow_staging(&self) -> &ShadowUniformStaging {
        &self.shadow
    }
}

/// Light camera with the configured up vector and projections.
pub fn light_camera(config: &LightConfig) -> Camera {
    let mut light = Camera::new();
    light.set_up(config.up);
    let [width, height] = config.extent;
    light.set_properties(width, height, config.near, config.far);
    light
}

fn debug_view_index(view: DebugViewMode) -> u32 {
    match view {
        DebugViewMode::Off => 0,
        DebugViewMode::Inset => 1,
        DebugViewMode::Fullscreen => 2,
    }
}
