//! Viewer widget - UI rendering and input mapping

use eframe::egui;
use std::time::Instant;

use super::EguiSurface;
use crate::core::player::{Player, PointerInput, TouchPhase};
use crate::entities::Product;
use crate::entities::product::Hotspot;

const OVERLAY_TEXT: egui::Color32 = egui::Color32::from_rgba_premultiplied(230, 230, 230, 220);
const GOLD: egui::Color32 = egui::Color32::from_rgb(0xd4, 0xaf, 0x37);
const BUTTON_SIZE: egui::Vec2 = egui::vec2(28.0, 28.0);

/// Requests the host acts on after the viewer was drawn
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ViewerActions {
    pub close: bool,
    pub toggle_fullscreen: bool,
}

/// Frame counter text, 1-based for display
pub fn frame_label(current: usize, total: usize) -> String {
    format!("{} / {}", current + 1, total)
}

/// Screen position of a hotspot inside `panel`
pub fn hotspot_pos(panel: egui::Rect, hotspot: &Hotspot) -> egui::Pos2 {
    let (fx, fy) = hotspot.anchor();
    panel.min + egui::vec2(panel.width() * fx, panel.height() * fy)
}

/// Control button rects, left to right from the panel's top left:
/// auto-rotate, reset, fullscreen, close
pub fn control_rects(panel: egui::Rect) -> [egui::Rect; 4] {
    let first = egui::Rect::from_min_size(panel.min + egui::vec2(10.0, 10.0), BUTTON_SIZE);
    std::array::from_fn(|i| first.translate(egui::vec2(i as f32 * (BUTTON_SIZE.x + 6.0), 0.0)))
}

/// Render the viewer inside the provided UI and feed it pointer/touch input
pub fn render(
    ui: &mut egui::Ui,
    player: &mut Player<EguiSurface>,
    product: Option<&Product>,
    show_hint: bool,
) -> ViewerActions {
    let mut actions = ViewerActions::default();
    let ctx = ui.ctx().clone();
    let panel = ui.max_rect();
    let now = Instant::now();

    if player.renderer_mut().set_size(panel.size()) {
        player.resize();
    }

    let controls = control_rects(panel);
    let response = ui.interact(panel, ui.id().with("viewer_interaction"), egui::Sense::drag());
    if ctx.input(|i| i.any_touches()) {
        handle_touch(&ctx, player, panel, &controls);
    } else {
        handle_pointer(&ctx, &response, player, panel, &controls);
    }
    if player.is_dragging() {
        ctx.set_cursor_icon(egui::CursorIcon::Grabbing);
    } else if response.hovered() {
        ctx.set_cursor_icon(egui::CursorIcon::Grab);
    }

    player.renderer_mut().paint(&ctx, ui.painter(), panel);

    let painter = ui.painter();
    if player.is_ready() {
        if let Some(product) = product {
            draw_hotspots(ui, panel, product);
        }
    } else {
        painter.text(
            panel.center(),
            egui::Align2::CENTER_CENTER,
            format!("Loading {}%", player.progress().percent()),
            egui::FontId::proportional(24.0),
            OVERLAY_TEXT,
        );
    }

    painter.text(
        panel.right_top() + egui::vec2(-12.0, 12.0),
        egui::Align2::RIGHT_TOP,
        frame_label(player.current_frame(), player.total_frames()),
        egui::FontId::monospace(14.0),
        OVERLAY_TEXT,
    );

    if show_hint && !player.is_dragging() {
        painter.text(
            panel.center_bottom() + egui::vec2(0.0, -16.0),
            egui::Align2::CENTER_BOTTOM,
            "Drag to rotate",
            egui::FontId::proportional(14.0),
            OVERLAY_TEXT,
        );
    }

    let [rotate_rect, reset_rect, fullscreen_rect, close_rect] = controls;
    let rotate_label = if player.auto_rotate() { "⏸" } else { "▶" };
    if ui
        .put(rotate_rect, egui::Button::new(rotate_label))
        .on_hover_text("Auto-rotate (Space)")
        .clicked()
    {
        player.toggle_auto_rotate(now);
    }
    if ui
        .put(reset_rect, egui::Button::new("⟲"))
        .on_hover_text("Reset view (Home)")
        .clicked()
    {
        player.reset();
    }
    if ui
        .put(fullscreen_rect, egui::Button::new("⛶"))
        .on_hover_text("Fullscreen (F)")
        .clicked()
    {
        actions.toggle_fullscreen = true;
    }
    if ui
        .put(close_rect, egui::Button::new("✕"))
        .on_hover_text("Close (Esc)")
        .clicked()
    {
        actions.close = true;
    }

    actions
}

fn handle_pointer(
    ctx: &egui::Context,
    response: &egui::Response,
    player: &mut Player<EguiSurface>,
    panel: egui::Rect,
    controls: &[egui::Rect],
) {
    let local_x = |p: egui::Pos2| p.x - panel.min.x;

    // A press on a control button belongs to the button, not to the drag
    if response.drag_started()
        && let Some(origin) = ctx.input(|i| i.pointer.press_origin())
        && !controls.iter().any(|r| r.contains(origin))
    {
        player.pointer(PointerInput::Down { x: local_x(origin) });
    }
    if response.dragged()
        && let Some(pos) = response.interact_pointer_pos()
    {
        player.pointer(PointerInput::Move { x: local_x(pos) });
    }
    if response.drag_stopped() {
        player.pointer(PointerInput::Up);
    } else if player.is_dragging() && !ctx.input(|i| i.pointer.has_pointer()) {
        player.pointer(PointerInput::Leave);
    }
}

fn handle_touch(
    ctx: &egui::Context,
    player: &mut Player<EguiSurface>,
    panel: egui::Rect,
    controls: &[egui::Rect],
) {
    let touches: Vec<(egui::TouchPhase, egui::Pos2)> = ctx.input(|i| {
        i.events
            .iter()
            .filter_map(|e| match e {
                egui::Event::Touch { phase, pos, .. } => Some((*phase, *pos)),
                _ => None,
            })
            .collect()
    });

    for (phase, pos) in touches {
        let phase = match phase {
            egui::TouchPhase::Start if panel.contains(pos) && !controls.iter().any(|r| r.contains(pos)) => {
                TouchPhase::Start
            }
            egui::TouchPhase::Start => continue,
            egui::TouchPhase::Move => TouchPhase::Move,
            egui::TouchPhase::End => TouchPhase::End,
            egui::TouchPhase::Cancel => TouchPhase::Cancel,
        };
        // egui has no native page scroll under the viewer to cancel
        let _ = player.touch(phase, &[pos.x - panel.min.x]);
    }
}

fn draw_hotspots(ui: &egui::Ui, panel: egui::Rect, product: &Product) {
    for (i, hotspot) in product.hotspots.iter().enumerate() {
        let center = hotspot_pos(panel, hotspot);
        let painter = ui.painter();
        painter.circle_filled(center, 6.0, GOLD);
        painter.circle_stroke(center, 11.0, egui::Stroke::new(1.5, GOLD));

        let hit = egui::Rect::from_center_size(center, egui::vec2(24.0, 24.0));
        ui.interact(hit, ui.id().with(("hotspot", i)), egui::Sense::hover())
            .on_hover_ui(|ui| {
                ui.strong(&hotspot.title);
                if !hotspot.description.is_empty() {
                    ui.label(&hotspot.description);
                }
            });
    }
}
