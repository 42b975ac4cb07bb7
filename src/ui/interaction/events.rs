use eframe::egui;

use crate::model::Point;

/// Pointer gesture on the slide surface, in display coordinates relative to the surface origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Press(Point),
    Drag(Point),
    Release,
    Leave,
}

fn local_point(canvas_rect: egui::Rect, pos: egui::Pos2) -> Point {
    Point::new(
        f64::from(pos.x - canvas_rect.min.x),
        f64::from(pos.y - canvas_rect.min.y),
    )
}

/// Translates one frame of canvas input into pointer events.
pub fn collect_pointer_events(
    ctx: &egui::Context,
    response: &egui::Response,
    canvas_rect: egui::Rect,
) -> Vec<PointerEvent> {
    let primary = egui::PointerButton::Primary;
    let mut events = Vec::new();

    if response.drag_started_by(primary) || response.clicked_by(primary) {
        let origin = ctx
            .input(|input| input.pointer.press_origin())
            .or_else(|| response.interact_pointer_pos());
        if let Some(pos) = origin {
            events.push(PointerEvent::Press(local_point(canvas_rect, pos)));
        }
    }

    if response.dragged_by(primary) {
        if let Some(pos) = response.interact_pointer_pos() {
            if canvas_rect.contains(pos) {
                events.push(PointerEvent::Drag(local_point(canvas_rect, pos)));
            } else {
                events.push(PointerEvent::Leave);
            }
        }
    }

    if response.drag_stopped_by(primary) || response.clicked_by(primary) {
        events.push(PointerEvent::Release);
    }

    events
}
