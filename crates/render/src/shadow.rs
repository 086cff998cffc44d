//! CPU side of the shadow pass: the uniform block the depth-only pipeline
//! reads for every draw.

use crate::arena::{UniformArena, UniformSlot};
use crate::error::RenderError;
use crate::uniforms::ShadowUniforms;
use glam::Mat4;
use umbra_common::LightProjection;
use umbra_scene::Camera;

/// Pick the light camera's projection matrix.
pub fn light_projection(light: &Camera, projection: LightProjection) -> Mat4 {
    match projection {
        LightProjection::Perspective => light.projection_matrix(),
        LightProjection::Orthographic => light.orthographic_matrix(),
    }
}

/// Staged shadow-pass uniforms.
///
/// [`start_shadow_render`](Self::start_shadow_render) loads the light's view
/// and projection and resets the world matrix to identity. Each
/// [`set_world_matrix`](Self::set_world_matrix) call then updates only the
/// world field and snapshots the whole block into a fresh slot, which the
/// following draw binds.
#[derive(Debug, Clone)]
pub struct ShadowUniformStaging {
    projection: LightProjection,
    block: ShadowUniforms,
    slots: UniformArena<ShadowUniforms>,
    started: bool,
}

impl ShadowUniformStaging {
    pub fn new(
        projection: LightProjection,
        alignment: u32,
        capacity: u32,
    ) -> Result<Self, RenderError> {
        Ok(Self {
            projection,
            block: ShadowUniforms::default(),
            slots: UniformArena::new(alignment, capacity)?,
            started: false,
        })
    }

    pub fn start_shadow_render(&mut self, light: &Camera) {
        self.slots.clear();
        self.block = ShadowUniforms::new(
            Mat4::IDENTITY,
            light.view_matrix(),
            light_projection(light, self.projection),
        );
        self.started = true;
    }

    pub fn set_world_matrix(&mut self, world: Mat4) -> Result<UniformSlot, RenderError> {
        if !self.started {
            return Err(RenderError::ShadowPassNotStarted);
        }
        self.block.world = world.to_cols_array_2d();
        self.slots.push(&self.block)
    }

    /// Close the pass. Further `set_world_matrix` calls fail until the next start.
    pub fn finish(&mut self) {
        self.started = false;
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// The block a draw bound to `slot` reads.
    pub fn block(&self, slot: UniformSlot) -> Option<ShadowUniforms> {
        self.slots.get(slot)
    }

    pub fn current(&self) -> &ShadowUniforms {
        &self.block
    }

    /// Light projection × light view of the current pass.
    pub fn light_space(&self) -> Mat4 {
        self.block.projection_matrix() * self.block.view_matrix()
    }

    pub fn projection(&self) -> LightProjection {
        self.projection
    }

    pub fn slots(&self) -> &UniformArena<ShadowUniforms> {
        &self.slots
    }
}
