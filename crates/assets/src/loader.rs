//! Startup loading of every mesh and texture named by a [`DemoConfig`].
//!
//! Loading does not stop at the first failure: every resource is attempted
//! and all failures are reported together, grouped by category.

use crate::box_format::load_box;
use crate::error::AssetError;
use crate::mesh::MeshData;
use crate::primitives;
use crate::texture::TextureData;
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use umbra_common::{DemoConfig, MeshSource};

/// Category of a startup resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResourceKind {
    Shader,
    Mesh,
    Texture,
    GpuResource,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Shader => "shader",
            Self::Mesh => "mesh",
            Self::Texture => "texture",
            Self::GpuResource => "gpu resource",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFailure {
    pub kind: ResourceKind,
    pub name: String,
    pub message: String,
}

/// Every failure from one loading pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadErrors {
    failures: Vec<LoadFailure>,
}

impl LoadErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: ResourceKind, name: impl Into<String>, error: impl fmt::Display) {
        let failure = LoadFailure {
            kind,
            name: name.into(),
            message: error.to_string(),
        };
        tracing::warn!("failed to load {} '{}': {}", kind, failure.name, failure.message);
        self.failures.push(failure);
    }

    /// Record the error of `result`, if any, and pass the value through.
    pub fn check<T, E: fmt::Display>(
        &mut self,
        kind: ResourceKind,
        name: &str,
        result: Result<T, E>,
    ) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.push(kind, name, e);
                None
            }
        }
    }

    pub fn failures(&self) -> &[LoadFailure] {
        &self.failures
    }

    /// Distinct failing categories, in a stable order.
    pub fn kinds(&self) -> BTreeSet<ResourceKind> {
        self.failures.iter().map(|f| f.kind).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn merge(&mut self, other: LoadErrors) {
        self.failures.extend(other.failures);
    }

    /// `Ok(())` when nothing failed.
    pub fn into_result(self) -> Result<(), LoadErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for LoadErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kinds: Vec<String> = self.kinds().iter().map(ToString::to_string).collect();
        write!(f, "failed to load resources: {}", kinds.join(", "))?;
        for failure in &self.failures {
            write!(f, "\n  {} '{}': {}", failure.kind, failure.name, failure.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for LoadErrors {}

/// CPU-side resources for a whole scene, in config order.
#[derive(Debug, Clone)]
pub struct SceneAssets {
    pub meshes: Vec<(String, MeshData)>,
    pub diffuse: TextureData,
    pub normal: TextureData,
}

/// Build the mesh a config entry describes. Relative file paths resolve
/// against `base_dir`.
pub fn load_mesh(source: &MeshSource, base_dir: &Path) -> Result<MeshData, AssetError> {
    match source {
        MeshSource::File { path } => load_box(base_dir.join(path)),
        MeshSource::Cube { size } => primitives::cube(*size),
        MeshSource::Sphere {
            radius,
            stacks,
            slices,
        } => primitives::sphere(*radius, *stacks, *slices),
        MeshSource::Plane {
            half_extent,
            uv_repeat,
        } => primitives::plane(*half_extent, *uv_repeat),
    }
}

/// Load all meshes and textures, collecting every failure.
pub fn load_scene_assets(config: &DemoConfig, base_dir: &Path) -> Result<SceneAssets, LoadErrors> {
    let mut errors = LoadErrors::new();

    let mut meshes = Vec::with_capacity(config.entities.len());
    for entity in &config.entities {
        let mesh = errors.check(
            ResourceKind::Mesh,
            &entity.name,
            load_mesh(&entity.mesh, base_dir),
        );
        if let Some(mesh) = mesh {
            meshes.push((entity.name.clone(), mesh));
        }
    }

    let diffuse = errors.check(
        ResourceKind::Texture,
        "diffuse",
        TextureData::from_source(&config.textures.diffuse, base_dir),
    );
    let normal = errors.check(
        ResourceKind::Texture,
        "normal",
        TextureData::from_source(&config.textures.normal, base_dir),
    );

    match (diffuse, normal) {
        (Some(diffuse), Some(normal)) if errors.is_empty() => {
            tracing::info!(
                "loaded {} meshes, diffuse {}x{}, normal {}x{}",
                meshes.len(),
                diffuse.width,
                diffuse.height,
                normal.width,
                normal.height
            );
            Ok(SceneAssets {
                meshes,
                diffuse,
                normal,
            })
        }
        _ => Err(errors),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::box_format::save_box;
    use umbra_common::{EntityConfig, TextureSource};

    fn entity(name: &str, mesh: MeshSource) -> EntityConfig {
        EntityConfig {
            name: name.into(),
            mesh,
            placement: Vec::new(),
            attach_to_light: false,
            casts_shadow: true,
            visible: true,
        }
    }

    #[test]
    fn default_config_loads() {
        let assets = load_scene_assets(&DemoConfig::default(), Path::new(".")).unwrap();
        assert_eq!(assets.meshes.len(), DemoConfig::default().entities.len());
        assert_eq!(assets.meshes[0].0, "ground");
        assert_eq!(assets.diffuse.width, 256);
    }

    #[test]
    fn relative_box_paths_resolve_against_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        save_box(&primitives::cube(1.0).unwrap(), dir.path().join("cube.box")).unwrap();

        let mut config = DemoConfig::default();
        config.entities = vec![entity(
            "from-file",
            MeshSource::File {
                path: "cube.box".into(),
            },
        )];
        let assets = load_scene_assets(&config, dir.path()).unwrap();
        assert_eq!(assets.meshes[0].1.vertices.len(), 24);
    }

    #[test]
    fn collects_every_failure_by_category() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = DemoConfig::default();
        config.entities = vec![
            entity("ok", MeshSource::Cube { size: 1.0 }),
            entity(
                "missing",
                MeshSource::File {
                    path: "missing.box".into(),
                },
            ),
            entity("bad", MeshSource::Cube { size: -1.0 }),
        ];
        config.textures.normal = TextureSource::File {
            path: "missing.png".into(),
        };

        let errors = load_scene_assets(&config, dir.path()).unwrap_err();
        assert_eq!(errors.failures().len(), 3);
        assert_eq!(
            errors.kinds().into_iter().collect::<Vec<_>>(),
            vec![ResourceKind::Mesh, ResourceKind::Texture]
        );
        let message = errors.to_string();
        assert!(message.starts_with("failed to load resources: mesh, texture"));
        assert!(message.contains("'missing'"));
        assert!(message.contains("'normal'"));
    }

    #[test]
    fn empty_errors_are_ok() {
        assert!(LoadErrors::new().into_result().is_ok());
        let mut errors = LoadErrors::new();
        errors.push(ResourceKind::Shader, "scene.wgsl", "parse error");
        let mut more = LoadErrors::new();
        more.push(ResourceKind::GpuResource, "shadow map", "out of memory");
        errors.merge(more);
        assert_eq!(errors.kinds().len(), 2);
        assert!(errors.into_result().is_err());
    }
}
