//! Shared value types and the demo configuration.
//!
//! Everything here is plain data: no GPU handles, no window state. Other
//! crates read a [`DemoConfig`] once at startup and never write it back.

pub mod config;
pub mod types;

pub use config::{
    CameraConfig, ConfigError, DebugConfig, DemoConfig, EntityConfig, LightConfig,
    LightProjection, MeshSource, ShadowConfig, TextureConfig, TextureSource, WindowConfig,
};
pub use types::{DebugViewMode, TransformOp};
