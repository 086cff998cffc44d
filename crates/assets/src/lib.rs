//! Mesh and texture data for the renderer.
//!
//! Meshes come from `.box` files or procedural primitives; textures come
//! from image files or are generated. All data here is CPU-side. The wgpu
//! backend uploads it once at startup.

pub mod box_format;
pub mod error;
pub mod loader;
pub mod mesh;
pub mod primitives;
pub mod texture;

pub use box_format::{encode_box, load_box, parse_box, save_box};
pub use error::AssetError;
pub use loader::{
    LoadErrors, LoadFailure, ResourceKind, SceneAssets, load_mesh, load_scene_assets,
};
pub use mesh::{MeshData, MeshVertex};
pub use texture::TextureData;
