use image::RgbaImage;
use std::path::Path;
use std::sync::Arc;

use crate::error::{EngineError, Result};

/// World-space rectangle a map image is stretched over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageBounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

#[derive(Debug, Clone)]
pub struct MapImage {
    pub id: String,
    pub bounds: ImageBounds,
    /// Decoded pixels, when the image was loaded in-process. Browser hosts load
    /// the image themselves and leave this empty.
    pub pixels: Option<Arc<RgbaImage>>,
}

/// The bottom layer of every frame.
#[derive(Debug, Clone, Default)]
pub enum Background {
    #[default]
    Procedural,
    Image(MapImage),
    /// Loading failed; draws the procedural backdrop.
    Failed(String),
}

impl Background {
    /// Decodes an image file. Failures are not fatal: they produce
    /// [`Background::Failed`] so every other layer keeps drawing.
    pub fn load(path: &Path, bounds: ImageBounds) -> Self {
        match decode(path) {
            Ok(pixels) => {
                tracing::info!(
                    path = %path.display(),
                    width = pixels.width(),
                    height = pixels.height(),
                    "map image loaded"
                );
                Self::Image(MapImage {
                    id: path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| "map".to_string()),
                    bounds,
                    pixels: Some(Arc::new(pixels)),
                })
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "map image unavailable, using procedural backdrop");
                Self::Failed(e.to_string())
            }
        }
    }

    pub fn image(&self) -> Option<&MapImage> {
        match self {
            Self::Image(img) => Some(img),
            Self::Procedural | Self::Failed(_) => None,
        }
    }

    pub fn is_procedural(&self) -> bool {
        self.image().is_none()
    }
}

fn decode(path: &Path) -> Result<RgbaImage> {
    let bytes = std::fs::read(path).map_err(|e| EngineError::Background(e.to_string()))?;
    let img = image::load_from_memory(&bytes).map_err(|e| EngineError::Background(e.to_string()))?;
    Ok(img.to_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> ImageBounds {
        ImageBounds {
            min_x: -50.0,
            min_y: -50.0,
            max_x: 50.0,
            max_y: 50.0,
        }
    }

    #[test]
    fn missing_file_degrades_to_procedural() {
        let bg = Background::load(Path::new("/definitely/not/here.png"), bounds());
        assert!(matches!(bg, Background::Failed(_)));
        assert!(bg.is_procedural());
    }

    #[test]
    fn png_file_loads() {
        let path = std::env::temp_dir().join(format!(
            "fleetview-bg-{}.png",
            std::process::id()
        ));
        RgbaImage::from_pixel(4, 3, image::Rgba([1, 2, 3, 255]))
            .save(&path)
            .unwrap();
        let bg = Background::load(&path, bounds());
        let img = bg.image().expect("image background");
        assert_eq!(img.pixels.as_ref().map(|p| p.dimensions()), Some((4, 3)));
        std::fs::remove_file(path).unwrap();
    }
}
