use eframe::egui;

use super::ProgressBar;
use crate::core::event_bus::{BoxedEvent, downcast_event};
use crate::core::player_events::{
    AutoRotateChangedEvent, FrameChangedEvent, LoadProgressEvent, SequenceReadyEvent, ViewerClosedEvent,
    ViewerOpenedEvent,
};
use crate::widgets::viewer::frame_label;

/// Status bar: product, load progress, frame counter and auto-rotate state.
///
/// Fed from polled player events; holds no reference to the player.
pub struct StatusBar {
    product: String,
    progress: ProgressBar,
    loading: bool,
    frame: usize,
    total: usize,
    fallbacks: usize,
    auto_rotate: bool,
    open: bool,
}

impl Default for StatusBar {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusBar {
    pub fn new() -> Self {
        Self {
            product: String::new(),
            progress: ProgressBar::new(120.0, 14.0),
            loading: false,
            frame: 0,
            total: 0,
            fallbacks: 0,
            auto_rotate: false,
            open: false,
        }
    }

    /// Apply one player event. Returns true if the readout changed.
    pub fn handle_event(&mut self, event: &BoxedEvent) -> bool {
        if downcast_event::<ViewerOpenedEvent>(event).is_some() {
            self.open = true;
            self.loading = true;
            self.fallbacks = 0;
            return true;
        }
        if let Some(e) = downcast_event::<LoadProgressEvent>(event) {
            self.product = e.product.clone();
            self.progress.set_progress(e.loaded, e.total);
            self.total = e.total;
            self.loading = e.loaded < e.total;
            self.open = true;
            if e.loaded == 0 {
                self.fallbacks = 0;
            }
            return true;
        }
        if let Some(e) = downcast_event::<SequenceReadyEvent>(event) {
            self.loading = false;
            self.fallbacks = e.fallbacks;
            self.total = e.total;
            return true;
        }
        if let Some(e) = downcast_event::<FrameChangedEvent>(event) {
            self.frame = e.frame;
            self.total = e.total;
            return true;
        }
        if let Some(e) = downcast_event::<AutoRotateChangedEvent>(event) {
            self.auto_rotate = e.enabled;
            return true;
        }
        if downcast_event::<ViewerClosedEvent>(event).is_some() {
            self.open = false;
            return true;
        }
        false
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn frame_text(&self) -> String {
        frame_label(self.frame, self.total)
    }

    /// Render status bar at bottom of screen
    pub fn render(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if self.open && !self.product.is_empty() {
                    ui.monospace(&self.product);
                } else {
                    ui.monospace("No product");
                }

                ui.separator();
                self.progress.render(ui);

                ui.separator();
                ui.monospace(self.frame_text());

                ui.separator();
                ui.monospace(if self.auto_rotate { "auto-rotate on" } else { "auto-rotate off" });

                if !self.loading && self.fallbacks > 0 {
                    ui.separator();
                    ui.monospace(format!("{} fallback frames", self.fallbacks));
                }
            });
        });
    }
}
