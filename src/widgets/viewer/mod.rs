//! Viewer widget - 360° frame viewer
//!
//! egui texture surface driven by the player, with drag/touch scrubbing

mod surface;
mod viewer_ui;

pub use surface::EguiSurface;
pub use viewer_ui::{ViewerActions, control_rects, frame_label, hotspot_pos, render};
