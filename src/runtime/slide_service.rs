use std::fs;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

use image::{Rgba, RgbaImage};
use thiserror::Error;
use tracing::info;

use crate::model::{CoreError, NaturalSize};

/// Upper bound on a downloaded slide, in bytes.
const MAX_DOWNLOAD_BYTES: u64 = 64 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum SlideError {
    #[error("slide I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("slide download failed: {0}")]
    Download(String),

    #[error("slide decode failure: {0}")]
    Image(#[from] image::ImageError),

    #[error("slide has unusable dimensions: {0}")]
    Core(#[from] CoreError),
}

/// A decoded slide ready for display.
#[derive(Debug, Clone)]
pub struct SlideImage {
    pub source: String,
    pub natural: NaturalSize,
    pub pixels: RgbaImage,
}

impl SlideImage {
    pub fn from_rgba(source: impl Into<String>, pixels: RgbaImage) -> Result<Self, SlideError> {
        let natural = NaturalSize::from_pixels(pixels.width(), pixels.height())?;
        Ok(Self {
            source: source.into(),
            natural,
            pixels,
        })
    }

    /// Synthetic H&E-like tissue used when no slide has been loaded.
    pub fn placeholder(width: u32, height: u32) -> Result<Self, SlideError> {
        let width = width.max(1);
        let height = height.max(1);
        let cx = width as f32 * 0.5;
        let cy = height as f32 * 0.5;
        let radius = cx.min(cy) * 0.9;

        let pixels = RgbaImage::from_fn(width, height, |x, y| {
            let dx = (x as f32 - cx) / radius;
            let dy = (y as f32 - cy) / radius;
            let wobble = ((x as f32 * 0.031).sin() + (y as f32 * 0.027).cos()) * 0.08;
            let distance = (dx * dx + dy * dy).sqrt() + wobble;
            if distance > 1.0 {
                return Rgba([244, 240, 246, 255]);
            }
            let nuclei = ((x as f32 * 0.37).sin() * (y as f32 * 0.41).cos()).abs() > 0.93;
            if nuclei {
                Rgba([72, 46, 128, 255])
            } else {
                let shade = (distance * 40.0) as u8;
                Rgba([226 - shade, 150 - shade / 2, 190 - shade / 3, 255])
            }
        });
        Self::from_rgba("placeholder", pixels)
    }
}

fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

#[derive(Debug, Clone)]
pub struct SlideService {
    agent: ureq::Agent,
}

impl Default for SlideService {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

impl SlideService {
    pub fn new(timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }

    pub fn load(&self, source: &str) -> Result<SlideImage, SlideError> {
        let bytes = if is_remote(source) {
            self.download(source)?
        } else {
            fs::read(Path::new(source))?
        };
        let pixels = image::load_from_memory(&bytes)?.to_rgba8();
        let slide = SlideImage::from_rgba(source, pixels)?;
        info!(
            source,
            width = slide.natural.width,
            height = slide.natural.height,
            "slide loaded"
        );
        Ok(slide)
    }

    fn download(&self, url: &str) -> Result<Vec<u8>, SlideError> {
        let response = self
            .agent
            .get(url)
            .call()
            .map_err(|error| SlideError::Download(error.to_string()))?;
        let mut bytes = Vec::new();
        response
            .into_reader()
            .take(MAX_DOWNLOAD_BYTES)
            .read_to_end(&mut bytes)?;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};
    use tempfile::tempdir;

    use super::{SlideImage, SlideService};

    #[test]
    fn placeholder_has_requested_natural_size() {
        let slide = SlideImage::placeholder(1024, 768).expect("placeholder");
        assert_eq!(slide.natural.width, 1024.0);
        assert_eq!(slide.natural.height, 768.0);
        assert_eq!(slide.pixels.dimensions(), (1024, 768));
    }

    #[test]
    fn local_png_is_decoded() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("slide.png");
        RgbaImage::from_pixel(40, 30, Rgba([200, 100, 150, 255]))
            .save(&path)
            .expect("save png");
        let source = path.to_string_lossy().to_string();
        let slide = SlideService::default().load(&source).expect("load");
        assert_eq!(slide.natural.width, 40.0);
        assert_eq!(slide.natural.height, 30.0);
        assert_eq!(slide.source, source);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("absent.png");
        let err = SlideService::default()
            .load(&path.to_string_lossy())
            .expect_err("must fail");
        assert!(err.to_string().contains("slide I/O failure"));
    }
}
