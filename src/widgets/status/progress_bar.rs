use eframe::egui;

/// Progress bar widget for the sequence loading readout
pub struct ProgressBar {
    loaded: usize,
    total: usize,
    width: f32,
    height: f32,
    fill_color: egui::Color32,
}

impl ProgressBar {
    /// Default fill color: gold (#d4af37)
    pub fn new(width: f32, height: f32) -> Self {
        Self::with_color(width, height, egui::Color32::from_rgb(0xd4, 0xaf, 0x37))
    }

    pub fn with_color(width: f32, height: f32, fill_color: egui::Color32) -> Self {
        Self {
            loaded: 0,
            total: 0,
            width,
            height,
            fill_color,
        }
    }

    pub fn set_progress(&mut self, loaded: usize, total: usize) {
        self.loaded = loaded;
        self.total = total;
    }

    /// Filled fraction 0..=1
    pub fn fraction(&self) -> f32 {
        if self.total > 0 {
            (self.loaded as f32 / self.total as f32).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Overlay text: rounded percentage
    pub fn label(&self) -> String {
        if self.total > 0 {
            format!("{}%", ((self.loaded as f64 / self.total as f64) * 100.0).round() as u32)
        } else {
            "--".to_string()
        }
    }

    pub fn render(&self, ui: &mut egui::Ui) {
        let (rect, _response) = ui.allocate_exact_size(egui::vec2(self.width, self.height), egui::Sense::hover());

        ui.painter().rect_filled(rect, 2.0, egui::Color32::from_gray(40));

        let progress = self.fraction();
        if progress > 0.0 {
            let fill_rect = egui::Rect::from_min_size(rect.min, egui::vec2(rect.width() * progress, rect.height()));
            ui.painter().rect_filled(fill_rect, 2.0, self.fill_color);
        }

        ui.painter().text(
            rect.center(),
            egui::Align2::CENTER_CENTER,
            self.label(),
            egui::FontId::monospace(9.0),
            egui::Color32::from_gray(220),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fraction_and_label() {
        let mut bar = ProgressBar::new(100.0, 10.0);
        assert_eq!(bar.fraction(), 0.0);
        assert_eq!(bar.label(), "--");

        bar.set_progress(1, 3);
        assert_eq!(bar.label(), "33%");
        bar.set_progress(2, 3);
        assert_eq!(bar.label(), "67%");
        bar.set_progress(36, 36);
        assert_eq!(bar.fraction(), 1.0);
        assert_eq!(bar.label(), "100%");
    }
}
