use eframe::egui;

use crate::model::{DisplayRect, Hotspot, Point, ViewportSize};
use crate::session::{Session, hotspot_radius};

use super::interaction::{ViewportMapping, collect_pointer_events};

const BACKGROUND: egui::Color32 = egui::Color32::from_gray(16);
const SELECTION_STROKE: egui::Color32 = egui::Color32::from_rgb(52, 212, 255);
const SELECTED_HOTSPOT: egui::Color32 = egui::Color32::from_rgb(255, 212, 26);
const GRID_SPACING: f32 = 24.0;

/// Draws the slide surface and routes pointer input into the session.
pub(super) fn draw_slide(
    ui: &mut egui::Ui,
    session: &mut Session,
    texture: Option<&egui::TextureHandle>,
) {
    let available = ui.available_size();
    let size = egui::vec2(available.x.max(1.0), available.y.max(1.0));
    let (rect, response) = ui.allocate_exact_size(size, egui::Sense::click_and_drag());
    let viewport = ViewportSize::new(f64::from(rect.width()), f64::from(rect.height()));

    for event in collect_pointer_events(ui.ctx(), &response, rect) {
        session.handle_pointer(event, viewport);
    }

    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 0.0, BACKGROUND);

    let Some(mapping) = session.mapping(viewport) else {
        return;
    };
    let Some(image_rect) = mapping.image_rect().map(|image| to_screen(rect, image)) else {
        return;
    };

    if let Some(texture) = texture {
        painter.image(
            texture.id(),
            image_rect,
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );
    }

    if session.overlay_visible() {
        draw_cell_grid(&painter, image_rect);
    }

    if let Some(selection) = session
        .visible_selection()
        .and_then(|selection| mapping.to_display_rect(selection))
    {
        let selection = to_screen(rect, selection);
        let fill = egui::Color32::from_rgba_unmultiplied(52, 212, 255, 32);
        painter.rect_filled(selection, 0.0, fill);
        painter.rect_stroke(
            selection,
            0.0,
            egui::Stroke::new(1.5, SELECTION_STROKE),
            egui::StrokeKind::Outside,
        );
    }

    if let Some(result) = session.gene_search() {
        let selected = session.selected_hotspot_id();
        for hotspot in &result.hotspots {
            draw_hotspot(&painter, rect, &mapping, hotspot, selected == Some(hotspot.id));
        }
    }

    if let Some(hover) = response.hover_pos() {
        let local = Point::new(
            f64::from(hover.x - rect.min.x),
            f64::from(hover.y - rect.min.y),
        );
        if let Some(point) = mapping.to_natural(local) {
            if mapping.natural.contains(point) {
                painter.text(
                    rect.left_bottom() + egui::vec2(8.0, -8.0),
                    egui::Align2::LEFT_BOTTOM,
                    format!("x {:.0}  y {:.0}", point.x, point.y),
                    egui::FontId::monospace(12.0),
                    egui::Color32::from_gray(220),
                );
            }
        }
    }
}

fn to_screen(canvas: egui::Rect, rect: DisplayRect) -> egui::Rect {
    egui::Rect::from_min_size(
        canvas.min + egui::vec2(rect.left as f32, rect.top as f32),
        egui::vec2(rect.width as f32, rect.height as f32),
    )
}

/// Faint dot lattice suggesting segmented nuclei over the tissue.
fn draw_cell_grid(painter: &egui::Painter, image_rect: egui::Rect) {
    let color = egui::Color32::from_rgba_unmultiplied(255, 255, 255, 40);
    let mut y = image_rect.top() + GRID_SPACING * 0.5;
    while y < image_rect.bottom() {
        let mut x = image_rect.left() + GRID_SPACING * 0.5;
        while x < image_rect.right() {
            painter.circle_filled(egui::pos2(x, y), 1.5, color);
            x += GRID_SPACING;
        }
        y += GRID_SPACING;
    }
}

fn draw_hotspot(
    painter: &egui::Painter,
    canvas: egui::Rect,
    mapping: &ViewportMapping,
    hotspot: &Hotspot,
    selected: bool,
) {
    let Some(center) = mapping.to_display(hotspot.position()) else {
        return;
    };
    let center = canvas.min + egui::vec2(center.x as f32, center.y as f32);
    let radius = hotspot_radius(mapping.scale) as f32;

    painter.circle_filled(center, radius, expression_color(hotspot.expression));
    if selected {
        painter.circle_stroke(center, radius + 2.0, egui::Stroke::new(2.0, SELECTED_HOTSPOT));
    }
}

/// Heat color from blue (low) to red (high) for an expression level in [0, 100].
fn expression_color(expression: f64) -> egui::Color32 {
    let t = (expression / 100.0).clamp(0.0, 1.0) as f32;
    let red = (40.0 + 215.0 * t) as u8;
    let blue = (255.0 - 215.0 * t) as u8;
    egui::Color32::from_rgba_unmultiplied(red, 64, blue, 200)
}

#[cfg(test)]
mod tests {
    use eframe::egui;

    use super::{expression_color, to_screen};
    use crate::model::DisplayRect;

    #[test]
    fn display_rect_is_offset_by_canvas_origin() {
        let canvas = egui::Rect::from_min_size(egui::pos2(10.0, 20.0), egui::vec2(512.0, 768.0));
        let rect = to_screen(
            canvas,
            DisplayRect {
                left: 50.0,
                top: 242.0,
                width: 100.0,
                height: 75.0,
            },
        );
        assert_eq!(rect.min, egui::pos2(60.0, 262.0));
        assert_eq!(rect.size(), egui::vec2(100.0, 75.0));
    }

    #[test]
    fn expression_color_runs_cold_to_hot() {
        let low = expression_color(0.0);
        let high = expression_color(100.0);
        assert!(low.b() > low.r());
        assert!(high.r() > high.b());
        assert_eq!(expression_color(250.0), high);
    }
}
