use crate::error::AssetError;
use std::path::Path;
use umbra_common::TextureSource;

/// Tightly packed RGBA8 pixels, row-major from the top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl TextureData {
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, AssetError> {
        if width == 0 || height == 0 {
            return Err(AssetError::InvalidTexture(format!(
                "texture size must be non-zero, got {width}x{height}"
            )));
        }
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(AssetError::InvalidTexture(format!(
                "{width}x{height} texture needs {expected} bytes, got {}",
                rgba.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba,
        })
    }

    /// Decode a PNG or JPEG file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| AssetError::io(path, e))?;
        let texture = Self::from_memory(&bytes)?;
        tracing::debug!(
            "loaded texture {} ({}x{})",
            path.display(),
            texture.width,
            texture.height
        );
        Ok(texture)
    }

    pub fn from_memory(bytes: &[u8]) -> Result<Self, AssetError> {
        let img = image::load_from_memory(bytes)?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self::new(width, height, rgba.into_raw())
    }

    /// Square checkerboard of `cells` × `cells` squares.
    pub fn checkerboard(
        size: u32,
        cells: u32,
        primary: [u8; 4],
        secondary: [u8; 4],
    ) -> Result<Self, AssetError> {
        if cells == 0 || cells > size {
            return Err(AssetError::InvalidTexture(format!(
                "checkerboard needs 1..={size} cells, got {cells}"
            )));
        }
        let cell = (size / cells).max(1);
        let mut rgba = Vec::with_capacity(size as usize * size as usize * 4);
        for y in 0..size {
            for x in 0..size {
                let even = ((x / cell) + (y / cell)) % 2 == 0;
                rgba.extend_from_slice(if even { &primary } else { &secondary });
            }
        }
        Self::new(size, size, rgba)
    }

    /// Normal map whose every texel decodes to the unperturbed +Z normal.
    pub fn flat_normal(size: u32) -> Result<Self, AssetError> {
        let texels = size as usize * size as usize;
        Self::new(size, size, [128, 128, 255, 255].repeat(texels))
    }

    /// Produce the texture a config entry describes. Relative file paths
    /// resolve against `base_dir`.
    pub fn from_source(source: &TextureSource, base_dir: &Path) -> Result<Self, AssetError> {
        match source {
            TextureSource::File { path } => Self::load(base_dir.join(path)),
            TextureSource::Checker {
                size,
                cells,
                primary,
                secondary,
            } => Self::checkerboard(*size, *cells, *primary, *secondary),
            TextureSource::FlatNormal { size } => Self::flat_normal(*size),
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let at = (y as usize * self.width as usize + x as usize) * 4;
        let p = &self.rgba[at..at + 4];
        Some([p[0], p[1], p[2], p[3]])
    }
}
