//! Decoded frame handle (8-bit RGBA)
//!
//! **Why**: Turntable frames are product photographs (JPEG/PNG) or synthetic
//! placeholders, so a single `Rgba8` buffer covers every source. The buffer is
//! shared behind an `Arc` so slots, renderers and the GPU upload path can hold
//! the same frame without copying pixels.
//!
//! **Used by**: Loader workers (decode), `Sequence` slots, `FrameRenderer` impls

use image::RgbaImage;
use log::debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Single decoded frame
#[derive(Debug, Clone)]
pub struct Frame {
    image: Arc<RgbaImage>,
}

/// Frame loading errors
///
/// Every variant is an asset-level failure: the loader absorbs them through
/// its fallback chain, they never reach the player's caller.
#[derive(Debug)]
pub enum FrameError {
    NotFound(PathBuf),
    Io(String),
    Image(String),
    UnsupportedFormat(String),
}

impl std::fmt::Display for FrameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrameError::NotFound(p) => write!(f, "Asset not found: {}", p.display()),
            FrameError::Io(e) => write!(f, "IO error: {}", e),
            FrameError::Image(e) => write!(f, "Image error: {}", e),
            FrameError::UnsupportedFormat(e) => write!(f, "Unsupported format: {}", e),
        }
    }
}

impl std::error::Error for FrameError {}

impl Frame {
    /// Wrap an already decoded image
    pub fn from_rgba(image: RgbaImage) -> Self {
        Self { image: Arc::new(image) }
    }

    /// Solid-color frame (tests, blank surfaces)
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        Self::from_rgba(RgbaImage::from_pixel(width, height, image::Rgba(rgba)))
    }

    /// Decode JPEG/PNG file into an RGBA frame.
    ///
    /// # Errors
    ///
    /// - `FrameError::NotFound`: path does not exist
    /// - `FrameError::UnsupportedFormat`: extension is not png/jpg/jpeg
    /// - `FrameError::Image`: decoder failure (truncated or corrupt file)
    pub fn load(path: &Path) -> Result<Self, FrameError> {
        if !path.exists() {
            return Err(FrameError::NotFound(path.to_path_buf()));
        }

        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_lowercase())
            .unwrap_or_default();
        if !matches!(ext.as_str(), "png" | "jpg" | "jpeg") {
            return Err(FrameError::UnsupportedFormat(format!(".{}", ext)));
        }

        let img = image::open(path).map_err(|e| match e {
            image::ImageError::IoError(io) => FrameError::Io(io.to_string()),
            other => FrameError::Image(other.to_string()),
        })?;
        let rgba = img.to_rgba8();
        debug!("Decoded {}: {}x{}", path.display(), rgba.width(), rgba.height());

        Ok(Self::from_rgba(rgba))
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Resolution as tuple
    pub fn resolution(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// A frame with zero area has nothing to draw
    pub fn is_decoded(&self) -> bool {
        self.width() > 0 && self.height() > 0
    }

    /// Raw RGBA bytes, row-major
    pub fn pixels(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Memory size in bytes
    pub fn mem(&self) -> usize {
        self.image.as_raw().len()
    }

    /// Same underlying pixel buffer (cheap identity check for texture caches)
    pub fn ptr_eq(&self, other: &Frame) -> bool {
        Arc::ptr_eq(&self.image, &other.image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solid_frame() {
        let frame = Frame::solid(4, 2, [10, 20, 30, 255]);
        assert_eq!(frame.resolution(), (4, 2));
        assert_eq!(frame.mem(), 4 * 2 * 4);
        assert_eq!(&frame.pixels()[0..4], &[10, 20, 30, 255]);
        assert!(frame.is_decoded());
    }

    #[test]
    fn test_zero_area_not_decoded() {
        let frame = Frame::from_rgba(RgbaImage::new(0, 0));
        assert!(!frame.is_decoded());
    }

    #[test]
    fn test_load_missing_file() {
        let result = Frame::load(Path::new("/nonexistent/path/frame_000.jpg"));
        assert!(matches!(result, Err(FrameError::NotFound(_))));
    }

    #[test]
    fn test_load_png_roundtrip_from_disk() {
        let dir = std::env::temp_dir().join(format!("turntable_frame_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("pixel.png");
        RgbaImage::from_pixel(3, 5, image::Rgba([1, 2, 3, 255])).save(&path).unwrap();

        let frame = Frame::load(&path).unwrap();
        assert_eq!(frame.resolution(), (3, 5));
        assert_eq!(&frame.pixels()[0..4], &[1, 2, 3, 255]);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = std::env::temp_dir().join(format!("turntable_ext_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("frame.exr");
        std::fs::write(&path, b"not an image").unwrap();

        assert!(matches!(Frame::load(&path), Err(FrameError::UnsupportedFormat(_))));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_clone_shares_buffer() {
        let a = Frame::solid(2, 2, [0, 0, 0, 255]);
        let b = a.clone();
        let c = Frame::solid(2, 2, [0, 0, 0, 255]);
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&c));
    }
}
