use glam::Vec3;
use serde::{Deserialize, Serialize};

/// One step of an entity placement, applied on top of the current world matrix.
///
/// Steps compose by right-multiplication in list order, so the last step is the
/// first to act on local-space vertices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum TransformOp {
    Translate { by: Vec3 },
    /// Rotation about `axis` by an angle in degrees.
    Rotate { axis: Vec3, degrees: f32 },
    Scale { by: Vec3 },
}

impl TransformOp {
    pub fn translate(x: f32, y: f32, z: f32) -> Self {
        Self::Translate {
            by: Vec3::new(x, y, z),
        }
    }

    pub fn rotate(axis: Vec3, degrees: f32) -> Self {
        Self::Rotate { axis, degrees }
    }

    pub fn scale(x: f32, y: f32, z: f32) -> Self {
        Self::Scale {
            by: Vec3::new(x, y, z),
        }
    }
}

/// How the shadow map is blitted to the screen after the lit pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebugViewMode {
    Off,
    /// Bottom-right quarter of the framebuffer.
    #[default]
    Inset,
    Fullscreen,
}

impl DebugViewMode {
    /// Next mode in the F2 cycle.
    pub fn next(self) -> Self {
        match self {
            Self::Off => Self::Inset,
            Self::Inset => Self::Fullscreen,
            Self::Fullscreen => Self::Off,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Inset => "inset",
            Self::Fullscreen => "fullscreen",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_view_cycles_through_all_modes() {
        let start = DebugViewMode::Off;
        assert_eq!(start.next(), DebugViewMode::Inset);
        assert_eq!(start.next().next(), DebugViewMode::Fullscreen);
        assert_eq!(start.next().next().next(), start);
    }

    #[test]
    fn transform_op_constructors() {
        assert_eq!(
            TransformOp::translate(1.0, 2.0, 3.0),
            TransformOp::Translate {
                by: Vec3::new(1.0, 2.0, 3.0)
            }
        );
        assert!(matches!(
            TransformOp::rotate(Vec3::Y, 90.0),
            TransformOp::Rotate { degrees, .. } if degrees == 90.0
        ));
    }

    #[test]
    fn transform_op_yaml_form() {
        let op: TransformOp =
            serde_yaml::from_str("{ op: rotate, axis: [-1.0, 0.0, 0.0], degrees: 90.0 }").unwrap();
        assert_eq!(op, TransformOp::rotate(Vec3::new(-1.0, 0.0, 0.0), 90.0));

        let op: TransformOp = serde_yaml::from_str("{ op: scale, by: [2.0, 2.0, 2.0] }").unwrap();
        assert_eq!(op, TransformOp::scale(2.0, 2.0, 2.0));
    }
}
