//! Renderer-agnostic frame planning.
//!
//! The [`FrameOrchestrator`] turns the scene, the user camera and the clock
//! into a [`FramePlan`]: a shadow pass, a main pass and an optional debug
//! pass, with every per-draw uniform block already staged in its own slot.
//! Backends only execute plans; they never decide draw order or rebuild
//! transforms.
//!
//! # Invariants
//! - Passes are recorded shadow, main, debug.
//! - Every draw binds its own uniform slot, so no draw reads another draw's
//!   world matrix.

pub mod arena;
pub mod error;
pub mod orchestrator;
pub mod plan;
mod renderer;
pub mod shading;
pub mod shadow;
pub mod uniforms;

pub use arena::{UniformArena, UniformSlot, aligned_stride};
pub use error::RenderError;
pub use orchestrator::{FrameOrchestrator, light_camera};
pub use plan::{DrawCall, Frame, FramePlan, Pass};
pub use renderer::{DebugTextRenderer, Renderer};
pub use shading::ShadingMode;
pub use shadow::{ShadowUniformStaging, light_projection};
pub use uniforms::{DrawUniforms, FrameUniforms, ShadowUniforms};
