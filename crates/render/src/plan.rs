use crate::arena::{UniformArena, UniformSlot};
use crate::uniforms::{DrawUniforms, FrameUniforms, ShadowUniforms};
use glam::Vec3;
use umbra_common::DebugViewMode;

/// One indexed draw of a scene object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCall {
    /// Index into the scene.
    pub object: usize,
    /// Uniform slot the draw binds.
    pub slot: UniformSlot,
    pub index_count: u32,
}

/// A render pass, in the order the backend must record it.
#[derive(Debug, Clone, PartialEq)]
pub enum Pass {
    /// Depth-only render from the light into the shadow map.
    Shadow { draws: Vec<DrawCall> },
    /// Lit render from the user camera, sampling the shadow map.
    Main {
        clear_color: [f32; 4],
        uniforms: FrameUniforms,
        draws: Vec<DrawCall>,
    },
    /// Blit of the shadow map to the screen.
    Debug { view: DebugViewMode },
}

impl Pass {
    pub fn name(&self) -> &'static str {
        match self {
            Pass::Shadow { .. } => "shadow",
            Pass::Main { .. } => "main",
            Pass::Debug { .. } => "debug",
        }
    }
}

/// Backend-independent description of one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FramePlan {
    pub frame: u64,
    pub elapsed: f64,
    pub light_position: Vec3,
    pub passes: Vec<Pass>,
}

impl FramePlan {
    pub fn shadow_draws(&self) -> &[DrawCall] {
        self.passes
            .iter()
            .find_map(|p| match p {
                Pass::Shadow { draws } => Some(draws.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    pub fn main_draws(&self) -> &[DrawCall] {
        self.passes
            .iter()
            .find_map(|p| match p {
                Pass::Main { draws, .. } => Some(draws.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    pub fn frame_uniforms(&self) -> Option<&FrameUniforms> {
        self.passes.iter().find_map(|p| match p {
            Pass::Main { uniforms, .. } => Some(uniforms),
            _ => None,
        })
    }

    /// Debug view of this frame, [`DebugViewMode::Off`] when no debug pass is planned.
    pub fn debug_view(&self) -> DebugViewMode {
        self.passes
            .iter()
            .find_map(|p| match p {
                Pass::Debug { view } => Some(*view),
                _ => None,
            })
            .unwrap_or(DebugViewMode::Off)
    }

    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(Pass::name).collect()
    }
}

/// A planned frame together with the uniform images its draws index into.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub plan: &'a FramePlan,
    pub shadow_uniforms: &'a UniformArena<ShadowUniforms>,
    pub draw_uniforms: &'a UniformArena<DrawUniforms>,
}
