// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Selection rectangle overlay.

use crate::models::selection::SelectionRect;
use crate::util::geometry::canvas_to_screen;
use egui::{pos2, Color32, Rect, Stroke, Vec2};

/// Outline color of the selection.
pub const STROKE_COLOR: Color32 = Color32::from_rgb(0x23, 0x56, 0xf6);
/// Outline width in canvas pixels.
pub const STROKE_WIDTH: f32 = 2.0;

/// Translucent fill of the selection.
pub fn fill_color() -> Color32 {
    Color32::from_rgba_unmultiplied(75, 135, 255, 77)
}

/// Screen rectangle covered by `rect`, or `None` if it is empty.
///
/// Negative extents (drag up or left of the anchor) are handled.
pub fn selection_screen_rect(rect: &SelectionRect, displayed: Rect, canvas_size: Vec2) -> Option<Rect> {
    if rect.is_empty() {
        return None;
    }

    let anchor = canvas_to_screen(pos2(rect.start_x, rect.start_y), displayed, canvas_size);
    let corner = canvas_to_screen(
        pos2(rect.start_x + rect.width, rect.start_y + rect.height),
        displayed,
        canvas_size,
    );
    Some(Rect::from_two_pos(anchor, corner))
}

/// Paint the selection on top of the rendered frame. Read-only.
pub fn paint_selection(painter: &egui::Painter, rect: &SelectionRect, displayed: Rect, canvas_size: Vec2) {
    let Some(screen_rect) = selection_screen_rect(rect, displayed, canvas_size) else {
        return;
    };

    let scale = displayed.width() / canvas_size.x;
    painter.rect_filled(screen_rect, 0.0, fill_color());
    painter.rect_stroke(screen_rect, 0.0, Stroke::new(STROKE_WIDTH * scale, STROKE_COLOR));
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::vec2;

    #[test]
    fn test_empty_selection_draws_nothing() {
        let displayed = Rect::from_min_size(pos2(0.0, 0.0), vec2(480.0, 270.0));
        let rect = SelectionRect {
            start_x: 10.0,
            start_y: 10.0,
            width: 50.0,
            height: 0.0,
        };
        assert!(selection_screen_rect(&rect, displayed, vec2(960.0, 540.0)).is_none());
    }

    #[test]
    fn test_negative_extent_matches_positive() {
        let displayed = Rect::from_min_size(pos2(20.0, 40.0), vec2(480.0, 270.0));
        let canvas = vec2(960.0, 540.0);
        let forward = SelectionRect {
            start_x: 100.0,
            start_y: 100.0,
            width: 200.0,
            height: 100.0,
        };
        let backward = SelectionRect {
            start_x: 300.0,
            start_y: 200.0,
            width: -200.0,
            height: -100.0,
        };

        let expected = Rect::from_min_size(pos2(70.0, 90.0), vec2(100.0, 50.0));
        assert_eq!(selection_screen_rect(&forward, displayed, canvas), Some(expected));
        assert_eq!(selection_screen_rect(&backward, displayed, canvas), Some(expected));
    }

    #[test]
    fn test_fill_is_translucent() {
        assert!(fill_color().a() < 255);
        assert_eq!(STROKE_COLOR.a(), 255);
    }
}
