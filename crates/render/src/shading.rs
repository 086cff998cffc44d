use crate::error::RenderError;

/// What the main pass writes to the screen, selected with Z/X/C/V/B.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ShadingMode {
    /// Textured, normal-mapped diffuse lighting with shadows.
    #[default]
    Lit,
    Diffuse,
    Normals,
    ShadowFactor,
    /// Depth of the fragment as seen from the light.
    LightDepth,
}

impl ShadingMode {
    pub const ALL: [ShadingMode; 5] = [
        ShadingMode::Lit,
        ShadingMode::Diffuse,
        ShadingMode::Normals,
        ShadingMode::ShadowFactor,
        ShadingMode::LightDepth,
    ];

    /// Value the shader switches on.
    pub fn index(self) -> u32 {
        match self {
            ShadingMode::Lit => 0,
            ShadingMode::Diffuse => 1,
            ShadingMode::Normals => 2,
            ShadingMode::ShadowFactor => 3,
            ShadingMode::LightDepth => 4,
        }
    }

    pub fn from_index(index: u32) -> Result<Self, RenderError> {
        Self::ALL
            .get(index as usize)
            .copied()
            .ok_or(RenderError::InvalidShadingMode(index))
    }

    pub fn label(self) -> &'static str {
        match self {
            ShadingMode::Lit => "lit + shadows",
            ShadingMode::Diffuse => "diffuse texture",
            ShadingMode::Normals => "normals",
            ShadingMode::ShadowFactor => "shadow factor",
            ShadingMode::LightDepth => "light depth",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_round_trips() {
        for mode in ShadingMode::ALL {
            assert_eq!(ShadingMode::from_index(mode.index()).unwrap(), mode);
        }
    }

    #[test]
    fn out_of_range_index_is_error() {
        assert!(matches!(
            ShadingMode::from_index(5),
            Err(RenderError::InvalidShadingMode(5))
        ));
    }
}
