//! egui-backed drawing surface for the player.
//!
//! The player draws in surface coordinates (origin at the viewer panel's top
//! left). The surface keeps the last drawn frame like a canvas would and
//! uploads it as a texture only when the frame changes.

use eframe::egui;
use log::trace;

use crate::entities::{FitRect, Frame, FrameRenderer};

/// Last draw call, in surface coordinates
#[derive(Debug, Clone)]
struct Drawn {
    index: usize,
    frame: Frame,
    dest: FitRect,
}

pub struct EguiSurface {
    size: egui::Vec2,
    drawn: Option<Drawn>,
    texture: Option<egui::TextureHandle>,
    /// Frame currently held by `texture`
    uploaded: Option<Frame>,
}

impl Default for EguiSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl EguiSurface {
    pub fn new() -> Self {
        Self {
            size: egui::Vec2::ZERO,
            drawn: None,
            texture: None,
            uploaded: None,
        }
    }

    pub fn size(&self) -> egui::Vec2 {
        self.size
    }

    /// Update the panel size. Returns true if it changed.
    pub fn set_size(&mut self, size: egui::Vec2) -> bool {
        if self.size == size {
            return false;
        }
        self.size = size;
        true
    }

    /// Sequence index of the frame on screen
    pub fn shown_index(&self) -> Option<usize> {
        self.drawn.as_ref().map(|d| d.index)
    }

    /// Paint the retained frame into `panel` (the surface's screen rect)
    pub fn paint(&mut self, ctx: &egui::Context, painter: &egui::Painter, panel: egui::Rect) {
        painter.rect_filled(panel, 0.0, egui::Color32::BLACK);

        let Some(drawn) = self.drawn.as_ref() else {
            return;
        };

        let stale = self.uploaded.as_ref().is_none_or(|f| !f.ptr_eq(&drawn.frame));
        if stale {
            let image = egui::ColorImage::from_rgba_unmultiplied(
                [drawn.frame.width() as usize, drawn.frame.height() as usize],
                drawn.frame.pixels(),
            );
            match self.texture.as_mut() {
                Some(tex) => tex.set(image, egui::TextureOptions::LINEAR),
                None => {
                    self.texture = Some(ctx.load_texture("turntable-frame", image, egui::TextureOptions::LINEAR));
                }
            }
            self.uploaded = Some(drawn.frame.clone());
            trace!("Uploaded texture for frame {}", drawn.index);
        }

        if let Some(tex) = &self.texture {
            let dest = egui::Rect::from_min_size(
                panel.min + egui::vec2(drawn.dest.x, drawn.dest.y),
                egui::vec2(drawn.dest.width, drawn.dest.height),
            );
            let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
            painter.image(tex.id(), dest, uv, egui::Color32::WHITE);
        }
    }
}

impl FrameRenderer for EguiSurface {
    fn surface_size(&self) -> (f32, f32) {
        (self.size.x, self.size.y)
    }

    fn clear(&mut self) {
        self.drawn = None;
    }

    fn draw(&mut self, index: usize, frame: &Frame, dest: FitRect) {
        self.drawn = Some(Drawn { index, frame: frame.clone(), dest });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_retained_until_cleared() {
        let mut s = EguiSurface::new();
        assert!(s.set_size(egui::vec2(100.0, 50.0)));
        assert!(!s.set_size(egui::vec2(100.0, 50.0)));
        assert_eq!(s.surface_size(), (100.0, 50.0));

        let frame = Frame::solid(4, 4, [0, 0, 0, 255]);
        let dest = FitRect::fit(100.0, 50.0, 4.0, 4.0).unwrap();
        s.draw(3, &frame, dest);
        assert_eq!(s.shown_index(), Some(3));
        s.clear();
        assert_eq!(s.shown_index(), None);
    }
}
