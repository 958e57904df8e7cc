//! Abstract traits for dependency inversion.
//!
//! The player in `core` talks to its collaborators only through these seams:
//! where images come from, where work runs, and what it paints into.
//! Implementations live in `core/` (workers), `entities/image_source.rs`
//! (filesystem) and `widgets/` (egui surface).

use std::sync::Arc;

use super::frame::{Frame, FrameError};

/// Abstract worker pool interface.
///
/// Lets the loader schedule slot resolution without knowing the concrete
/// thread pool implementation.
pub trait WorkerPool: Send + Sync {
    /// Execute closure on worker thread with epoch-based cancellation.
    ///
    /// If the epoch changed before execution, the closure is skipped.
    fn execute_with_epoch(&self, epoch: u64, f: Box<dyn FnOnce() + Send + 'static>);
}

/// Source of frame images, one attempt per call.
///
/// `path` is relative to the source's root (e.g. `images/360/ring/frame_007.jpg`).
pub trait ImageSource: Send + Sync {
    fn fetch(&self, path: &str) -> Result<Frame, FrameError>;
}

/// Destination rectangle of a fit-scaled frame in surface coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub scale: f32,
}

impl FitRect {
    /// Uniformly scale an image to fit the surface and center it.
    ///
    /// Returns `None` when either side has zero area.
    pub fn fit(surface_w: f32, surface_h: f32, image_w: f32, image_h: f32) -> Option<Self> {
        if surface_w <= 0.0 || surface_h <= 0.0 || image_w <= 0.0 || image_h <= 0.0 {
            return None;
        }
        let scale = (surface_w / image_w).min(surface_h / image_h);
        let width = image_w * scale;
        let height = image_h * scale;
        Some(Self {
            x: (surface_w - width) / 2.0,
            y: (surface_h - height) / 2.0,
            width,
            height,
            scale,
        })
    }
}

/// Host-owned 2D drawing surface.
pub trait FrameRenderer {
    /// Current surface size in surface units (width, height)
    fn surface_size(&self) -> (f32, f32);

    fn clear(&mut self);

    /// Draw `frame` (sequence slot `index`) scaled into `dest`
    fn draw(&mut self, index: usize, frame: &Frame, dest: FitRect);
}

/// Blanket impls: Arc<T> implements traits if T does
impl<T: WorkerPool + ?Sized> WorkerPool for Arc<T> {
    fn execute_with_epoch(&self, epoch: u64, f: Box<dyn FnOnce() + Send + 'static>) {
        (**self).execute_with_epoch(epoch, f)
    }
}

impl<T: ImageSource + ?Sized> ImageSource for Arc<T> {
    fn fetch(&self, path: &str) -> Result<Frame, FrameError> {
        (**self).fetch(path)
    }
}

impl<T: FrameRenderer + ?Sized> FrameRenderer for Box<T> {
    fn surface_size(&self) -> (f32, f32) {
        (**self).surface_size()
    }

    fn clear(&mut self) {
        (**self).clear()
    }

    fn draw(&mut self, index: usize, frame: &Frame, dest: FitRect) {
        (**self).draw(index, frame, dest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_wide_surface() {
        // 800x800 image into 1000x500 surface: height-bound
        let r = FitRect::fit(1000.0, 500.0, 800.0, 800.0).unwrap();
        assert_eq!(r.scale, 0.625);
        assert_eq!((r.width, r.height), (500.0, 500.0));
        assert_eq!((r.x, r.y), (250.0, 0.0));
    }

    #[test]
    fn test_fit_tall_surface() {
        let r = FitRect::fit(400.0, 900.0, 800.0, 400.0).unwrap();
        assert_eq!(r.scale, 0.5);
        assert_eq!((r.width, r.height), (400.0, 200.0));
        assert_eq!((r.x, r.y), (0.0, 350.0));
    }

    #[test]
    fn test_fit_upscales_small_images() {
        let r = FitRect::fit(200.0, 200.0, 50.0, 100.0).unwrap();
        assert_eq!(r.scale, 2.0);
        assert_eq!((r.x, r.y), (50.0, 0.0));
    }

    #[test]
    fn test_fit_zero_area() {
        assert!(FitRect::fit(0.0, 100.0, 10.0, 10.0).is_none());
        assert!(FitRect::fit(100.0, 100.0, 10.0, 0.0).is_none());
    }
}
