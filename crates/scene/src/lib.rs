//! Scene state: cameras, entity transforms, the light orbit and the frame clock.
//!
//! Nothing in this crate touches the GPU. Entities are generic over a
//! [`Geometry`] so the same scene can hold wgpu buffers in the desktop app and
//! plain mesh data in tests and the CLI.

pub mod camera;
pub mod clock;
pub mod entity;
pub mod light;
pub mod scene;
pub mod transform;

pub use glam;

pub use camera::{Camera, FIELD_OF_VIEW};
pub use clock::{FrameClock, FrameTime};
pub use entity::{Entity, Geometry};
pub use light::LightOrbit;
pub use scene::{Scene, SceneObject};
pub use transform::ModelTransform;
