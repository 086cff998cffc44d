//! wgpu backend for umbra.
//!
//! Uploads scene geometry and textures, owns the shadow map and executes
//! the frame plans produced by `umbra-render`.
//!
//! # Invariants
//! - The renderer never mutates scene state; transforms arrive pre-staged
//!   in the frame's uniform images.
//! - GPU resource creation runs inside error scopes and reports failures as
//!   `RenderError`, never by aborting.
//! - Front faces wind clockwise; culling is off.

mod geometry;
mod gpu;
mod scope;
mod shaders;
mod shadow;
mod texture;

pub use geometry::{GpuGeometry, upload_scene};
pub use gpu::{WgpuRenderer, debug_viewport};
pub use shadow::{ShadowPass, ShadowRenderPass};
pub use texture::{DEPTH_FORMAT, GpuTexture};
