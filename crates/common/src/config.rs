//! Demo configuration.
//!
//! Every field has a compiled-in default matching the stock demo (800x600
//! window, move speed 1.5, look sensitivity 0.005). A YAML file may override
//! any subset of fields.

use crate::types::{DebugViewMode, TransformOp};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Errors from loading or validating a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub light: LightConfig,
    pub shadow: ShadowConfig,
    pub textures: TextureConfig,
    pub debug: DebugConfig,
    pub entities: Vec<EntityConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub clear_color: [f32; 4],
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "umbra".into(),
            width: 800,
            height: 600,
            clear_color: [0.3, 0.5, 1.0, 1.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: Vec3,
    /// Look direction; normalized when applied to the camera.
    pub target: Vec3,
    pub up: Vec3,
    pub near: f32,
    pub far: f32,
    /// Distance moved per W/A/S/D key-down event.
    pub move_speed: f32,
    /// Radians of pitch/yaw per pixel of mouse travel.
    pub rotate_speed: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 12.0, -25.0),
            target: Vec3::new(0.0, -0.3, 1.0),
            up: Vec3::Y,
            near: 0.1,
            far: 1000.0,
            move_speed: 1.5,
            rotate_speed: 0.005,
        }
    }
}

/// Projection used when rendering the shadow map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightProjection {
    #[default]
    Perspective,
    Orthographic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    /// Center of the light's orbit.
    pub origin: Vec3,
    /// Per-axis orbit amplitude.
    pub protrusion: Vec3,
    /// Angular speed multiplier applied to elapsed seconds.
    pub speed: f32,
    pub up: Vec3,
    /// Width/height handed to the light camera's `set_properties`.
    pub extent: [f32; 2],
    pub near: f32,
    pub far: f32,
    pub projection: LightProjection,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            origin: Vec3::new(0.0, 50.0, -10.0),
            protrusion: Vec3::new(30.0, 30.0, -30.0),
            speed: 0.75,
            // the light always sits above the scene, so +Z never lines up with its target
            up: Vec3::Z,
            extent: [120.0, 90.0],
            near: 1.0,
            far: 250.0,
            projection: LightProjection::Perspective,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowConfig {
    /// Shadow map size; follows the window size when unset.
    pub resolution: Option<[u32; 2]>,
    pub depth_bias_constant: i32,
    pub depth_bias_slope: f32,
    /// Subtracted from the light-space depth before the comparison.
    pub compare_bias: f32,
    /// Uniform slots per pass, i.e. the most draws a single pass can issue.
    pub max_draws: u32,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            resolution: None,
            depth_bias_constant: 2,
            depth_bias_slope: 2.0,
            compare_bias: 0.0015,
            max_draws: 256,
        }
    }
}

/// Where a texture's pixels come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TextureSource {
    File {
        path: PathBuf,
    },
    Checker {
        size: u32,
        cells: u32,
        primary: [u8; 4],
        secondary: [u8; 4],
    },
    FlatNormal {
        size: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureConfig {
    pub diffuse: TextureSource,
    pub normal: TextureSource,
}

impl Default for TextureConfig {
    fn default() -> Self {
        Self {
            diffuse: TextureSource::Checker {
                size: 256,
                cells: 8,
                primary: [210, 205, 195, 255],
                secondary: [120, 110, 100, 255],
            },
            normal: TextureSource::FlatNormal { size: 4 },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    pub shadow_view: DebugViewMode,
    pub overlay: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            shadow_view: DebugViewMode::Inset,
            overlay: true,
        }
    }
}

/// Where an entity's geometry comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MeshSource {
    /// A `.box` mesh file.
    File { path: PathBuf },
    Cube { size: f32 },
    Sphere { radius: f32, stacks: u32, slices: u32 },
    Plane { half_extent: f32, uv_repeat: f32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityConfig {
    pub name: String,
    pub mesh: MeshSource,
    #[serde(default)]
    pub placement: Vec<TransformOp>,
    /// Translate to the light position before the placement steps.
    #[serde(default)]
    pub attach_to_light: bool,
    #[serde(default = "default_true")]
    pub casts_shadow: bool,
    #[serde(default = "default_true")]
    pub visible: bool,
}

fn default_true() -> bool {
    true
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            camera: CameraConfig::default(),
            light: LightConfig::default(),
            shadow: ShadowConfig::default(),
            textures: TextureConfig::default(),
            debug: DebugConfig::default(),
            entities: default_entities(),
        }
    }
}

fn default_entities() -> Vec<EntityConfig> {
    vec![
        EntityConfig {
            name: "ground".into(),
            mesh: MeshSource::Plane {
                half_extent: 60.0,
                uv_repeat: 12.0,
            },
            placement: Vec::new(),
            attach_to_light: false,
            casts_shadow: false,
            visible: true,
        },
        EntityConfig {
            name: "crate".into(),
            mesh: MeshSource::Cube { size: 8.0 },
            placement: vec![
                TransformOp::translate(10.0, 4.0, 15.0),
                TransformOp::rotate(Vec3::Y, 30.0),
            ],
            attach_to_light: false,
            casts_shadow: true,
            visible: true,
        },
        EntityConfig {
            name: "pillar".into(),
            mesh: MeshSource::Cube { size: 1.0 },
            placement: vec![
                TransformOp::translate(-12.0, 10.0, 20.0),
                TransformOp::scale(4.0, 20.0, 4.0),
            ],
            attach_to_light: false,
            casts_shadow: true,
            visible: true,
        },
        EntityConfig {
            name: "orb".into(),
            mesh: MeshSource::Sphere {
                radius: 5.0,
                stacks: 24,
                slices: 32,
            },
            placement: vec![
                TransformOp::translate(0.0, 5.0, 30.0),
                TransformOp::rotate(Vec3::new(-1.0, 0.0, 0.0), 90.0),
            ],
            attach_to_light: false,
            casts_shadow: true,
            visible: true,
        },
        EntityConfig {
            name: "light".into(),
            mesh: MeshSource::Sphere {
                radius: 1.5,
                stacks: 12,
                slices: 16,
            },
            placement: Vec::new(),
            attach_to_light: true,
            // the light camera sits inside this mesh
            casts_shadow: false,
            visible: true,
        },
    ]
}

impl DemoConfig {
    /// Load and validate a YAML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml_str(&text)?;
        tracing::debug!(
            "loaded config from {} ({} entities)",
            path.display(),
            config.entities.len()
        );
        Ok(config)
    }

    /// Parse and validate a YAML document. Missing fields take their defaults.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Size of the shadow map for a given output size.
    pub fn shadow_resolution(&self, width: u32, height: u32) -> [u32; 2] {
        self.shadow
            .resolution
            .unwrap_or([width.max(1), height.max(1)])
    }

    /// Reject values the renderer cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if self.window.width == 0 || self.window.height == 0 {
            return invalid(format!(
                "window size must be non-zero, got {}x{}",
                self.window.width, self.window.height
            ));
        }
        check_planes("camera", self.camera.near, self.camera.far)?;
        check_planes("light", self.light.near, self.light.far)?;
        if !self.camera.move_speed.is_finite() || !self.camera.rotate_speed.is_finite() {
            return invalid("camera speeds must be finite".into());
        }
        check_basis("camera", self.camera.target, self.camera.up)?;
        if self.light.up.length_squared() == 0.0 {
            return invalid("light up vector must be non-zero".into());
        }
        if self.light.extent.iter().any(|e| !(*e > 0.0)) {
            return invalid(format!(
                "light extent must be positive, got {:?}",
                self.light.extent
            ));
        }
        if self.shadow.max_draws == 0 {
            return invalid("shadow.max_draws must be at least 1".into());
        }
        if let Some([w, h]) = self.shadow.resolution {
            if w == 0 || h == 0 {
                return invalid(format!("shadow resolution must be non-zero, got {w}x{h}"));
            }
        }
        if self.entities.len() > self.shadow.max_draws as usize {
            return invalid(format!(
                "{} entities exceed shadow.max_draws = {}",
                self.entities.len(),
                self.shadow.max_draws
            ));
        }

        let mut names = BTreeSet::new();
        for entity in &self.entities {
            if !names.insert(entity.name.as_str()) {
                return invalid(format!("duplicate entity name '{}'", entity.name));
            }
        }
        Ok(())
    }
}

fn check_planes(what: &str, near: f32, far: f32) -> Result<(), ConfigError> {
    if !(near > 0.0) || !(far > near) {
        return Err(ConfigError::Invalid(format!(
            "{what} clip planes must satisfy 0 < near < far, got near={near} far={far}"
        )));
    }
    Ok(())
}

fn check_basis(what: &str, target: Vec3, up: Vec3) -> Result<(), ConfigError> {
    if target.length_squared() == 0.0 || up.length_squared() == 0.0 {
        return Err(ConfigError::Invalid(format!(
            "{what} target and up must be non-zero"
        )));
    }
    if target.cross(up).length_squared() < 1e-8 {
        return Err(ConfigError::Invalid(format!(
            "{what} target and up must not be parallel"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_stock_demo() {
        let config = DemoConfig::default();
        assert_eq!(config.window.width, 800);
        assert_eq!(config.window.height, 600);
        assert_eq!(config.camera.move_speed, 1.5);
        assert_eq!(config.camera.rotate_speed, 0.005);
        assert_eq!(config.light.origin, Vec3::new(0.0, 50.0, -10.0));
        assert_eq!(config.light.protrusion, Vec3::new(30.0, 30.0, -30.0));
        assert_eq!(config.light.speed, 0.75);
        config.validate().unwrap();
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = DemoConfig::from_yaml_str(
            "window:\n  width: 1024\ncamera:\n  move_speed: 3.0\n",
        )
        .unwrap();
        assert_eq!(config.window.width, 1024);
        assert_eq!(config.window.height, 600);
        assert_eq!(config.camera.move_speed, 3.0);
        assert_eq!(config.entities.len(), DemoConfig::default().entities.len());
    }

    #[test]
    fn entities_parse_with_tagged_sources() {
        let yaml = r#"
entities:
  - name: chief
    mesh: { kind: file, path: models/chief.box }
    placement:
      - { op: rotate, axis: [-1.0, 0.0, 0.0], degrees: 90.0 }
  - name: box
    mesh: { kind: cube, size: 2.0 }
    casts_shadow: false
"#;
        let config = DemoConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.entities.len(), 2);
        assert_eq!(
            config.entities[0].mesh,
            MeshSource::File {
                path: PathBuf::from("models/chief.box")
            }
        );
        assert_eq!(config.entities[0].placement.len(), 1);
        assert!(config.entities[0].casts_shadow);
        assert!(config.entities[0].visible);
        assert!(!config.entities[1].casts_shadow);
    }

    #[test]
    fn yaml_round_trip() {
        let config = DemoConfig::default();
        let text = config.to_yaml_string().unwrap();
        let parsed = DemoConfig::from_yaml_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn rejects_bad_planes() {
        let mut config = DemoConfig::default();
        config.camera.near = 10.0;
        config.camera.far = 1.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_parallel_camera_basis() {
        let mut config = DemoConfig::default();
        config.camera.target = Vec3::Y;
        config.camera.up = Vec3::Y;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_duplicate_names() {
        let mut config = DemoConfig::default();
        let first = config.entities[0].clone();
        config.entities.push(first);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn rejects_more_entities_than_draw_slots() {
        let mut config = DemoConfig::default();
        config.shadow.max_draws = 2;
        assert!(config.validate().is_err());
    }

    #[test]
    fn shadow_resolution_follows_window_unless_set() {
        let mut config = DemoConfig::default();
        assert_eq!(config.shadow_resolution(800, 600), [800, 600]);
        config.shadow.resolution = Some([2048, 2048]);
        assert_eq!(config.shadow_resolution(800, 600), [2048, 2048]);
    }

    #[test]
    fn load_from_file() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(tmp, "light:\n  speed: 2.0").unwrap();
        let config = DemoConfig::load(tmp.path()).unwrap();
        assert_eq!(config.light.speed, 2.0);
    }

    #[test]
    fn load_missing_file_reports_path() {
        let err = DemoConfig::load("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("not/here.yaml"));
    }
}
