//! Synthetic placeholder frames for products without photography.
//!
//! The image is a pure function of `(index, total, product, size)`: a dark
//! radial backdrop, a gold ring drawn as two rotated ellipse strokes, a
//! diamond that shows on the front/back quarter turns, and a bottom marker
//! whose length encodes the frame position. Scrubbing through placeholders
//! therefore still reads as rotation.
//!
//! Geometry is authored on an 800 px canvas and scaled to `size`.

use image::{Rgba, RgbaImage};
use std::f32::consts::TAU;

use super::frame::Frame;

const DESIGN_SIZE: f32 = 800.0;
const GOLD: [u8; 3] = [0xd4, 0xaf, 0x37];
const HIGHLIGHT: [u8; 3] = [0xf0, 0xc9, 0x52];
const BG_INNER: [u8; 3] = [0x1a, 0x1a, 0x1a];

/// Ellipse stroke in design units: semi-axes and line width
struct Stroke {
    a: f32,
    b: f32,
    width: f32,
}

const OUTER_RING: Stroke = Stroke { a: 150.0, b: 40.0, width: 30.0 };
const INNER_RING: Stroke = Stroke { a: 120.0, b: 30.0, width: 20.0 };

/// Rotation angle (radians) shown by frame `index` of `total`
pub fn frame_angle(index: usize, total: usize) -> f32 {
    if total == 0 {
        return 0.0;
    }
    (index % total) as f32 / total as f32 * TAU
}

/// Render placeholder frame `index` of `total` for `product`.
pub fn synthesize(index: usize, total: usize, product: &str, size: u32) -> Frame {
    let size = size.max(1);
    let k = size as f32 / DESIGN_SIZE;
    let center = size as f32 / 2.0;
    let angle = frame_angle(index, total);
    let (sin, cos) = angle.sin_cos();
    let diamond_visible = sin.abs() < 0.5;
    let tint = product_tint(product);

    // Progress marker: bottom bar, length = (index + 1) / total
    let fraction = if total == 0 { 1.0 } else { ((index % total) + 1) as f32 / total as f32 };
    let bar_left = 0.1 * size as f32;
    let bar_right = bar_left + 0.8 * size as f32 * fraction;
    let bar_top = 0.92 * size as f32;
    let bar_bottom = bar_top + (12.0 * k).max(1.0);

    let mut img = RgbaImage::new(size, size);
    for (px, py, pixel) in img.enumerate_pixels_mut() {
        let x = px as f32 + 0.5;
        let y = py as f32 + 0.5;

        let mut rgb = background(x - center, y - center, k);

        // Ring-local design coordinates (inverse rotation, unscaled)
        let dx = (x - center) / k;
        let dy = (y - center) / k;
        let lx = dx * cos + dy * sin;
        let ly = -dx * sin + dy * cos;

        if on_stroke(lx, ly, &OUTER_RING) || on_stroke(lx, ly, &INNER_RING) {
            rgb = GOLD;
        }

        // Faint highlight circle (arc radius 10, stroke 5 at 30% alpha)
        let hd = ((lx + 50.0).powi(2) + (ly + 20.0).powi(2)).sqrt();
        if (hd - 10.0).abs() <= 2.5 {
            rgb = blend(rgb, HIGHLIGHT, 0.3);
        }

        // Diamond: rhombus centred at (0, -40), half-extent 10 x 20
        if diamond_visible && lx.abs() / 10.0 + (ly + 40.0).abs() / 20.0 <= 1.0 {
            rgb = [255, 255, 255];
        }

        if y >= bar_top && y < bar_bottom && x >= bar_left {
            if x < bar_right {
                rgb = blend(rgb, tint, 0.8);
            } else if x < bar_left + 0.8 * size as f32 {
                rgb = blend(rgb, [255, 255, 255], 0.15);
            }
        }

        *pixel = Rgba([rgb[0], rgb[1], rgb[2], 255]);
    }

    Frame::from_rgba(img)
}

/// Radial gradient #1a1a1a (r <= 100) to black (r >= 400), design units
fn background(dx: f32, dy: f32, k: f32) -> [u8; 3] {
    let r = (dx * dx + dy * dy).sqrt() / k;
    let t = ((r - 100.0) / 300.0).clamp(0.0, 1.0);
    blend(BG_INNER, [0, 0, 0], t)
}

/// Approximate distance from the ellipse outline via first-order expansion
fn on_stroke(lx: f32, ly: f32, stroke: &Stroke) -> bool {
    let (a2, b2) = (stroke.a * stroke.a, stroke.b * stroke.b);
    let f = lx * lx / a2 + ly * ly / b2 - 1.0;
    let gx = 2.0 * lx / a2;
    let gy = 2.0 * ly / b2;
    let grad = (gx * gx + gy * gy).sqrt();
    if grad <= f32::EPSILON {
        return false;
    }
    f.abs() / grad <= stroke.width / 2.0
}

fn blend(base: [u8; 3], over: [u8; 3], alpha: f32) -> [u8; 3] {
    let mix = |a: u8, b: u8| (a as f32 * (1.0 - alpha) + b as f32 * alpha).round() as u8;
    [mix(base[0], over[0]), mix(base[1], over[1]), mix(base[2], over[2])]
}

/// Stable per-product marker color (FNV-1a over the name)
fn product_tint(product: &str) -> [u8; 3] {
    let mut hash: u32 = 0x811c_9dc5;
    for byte in product.bytes() {
        hash ^= byte as u32;
        hash = hash.wrapping_mul(0x0100_0193);
    }
    [
        160 + (hash & 0x3f) as u8,
        160 + ((hash >> 8) & 0x3f) as u8,
        160 + ((hash >> 16) & 0x3f) as u8,
    ]
}
