// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Drawing canvas for frame display and ad region selection.
//!
//! The canvas has a fixed internal pixel size and is scaled to fit the
//! available space. The current video frame is drawn into it with aspect
//! fitting, the selection overlay is painted on top, and pointer drags are
//! mapped back to canvas pixels.

use crate::config::FitMode;
use crate::models::selection::Selection;
use crate::ui::overlay;
use crate::util::geometry::{canvas_rect_to_screen, fit_canvas, screen_to_canvas, CanvasGeometry};
use egui::{Pos2, Vec2};

/// Result of canvas interaction, in canvas-pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CanvasAction {
    None,
    StartSelection(Pos2),
    UpdateSelection(Pos2),
    EndSelection,
}

/// What the canvas needs to draw one frame.
pub struct CanvasView<'a> {
    pub canvas_size: Vec2,
    pub texture: Option<&'a egui::TextureHandle>,
    /// Intrinsic size of the video, once known
    pub video_size: Option<(u32, u32)>,
    pub fit_mode: FitMode,
    pub selection: &'a Selection,
    /// Accept pointer drags
    pub interactive: bool,
}

/// Display the canvas and handle pointer drags.
pub fn show(ui: &mut egui::Ui, view: CanvasView<'_>) -> CanvasAction {
    let available = ui.available_rect_before_wrap();
    let displayed = fit_canvas(available, view.canvas_size);
    let response = ui.allocate_rect(displayed, egui::Sense::drag());
    let painter = ui.painter_at(displayed);

    // Clear
    painter.rect_filled(displayed, 0.0, egui::Color32::BLACK);

    let geometry = view
        .video_size
        .and_then(|size| CanvasGeometry::compute(size, view.canvas_size, view.fit_mode));

    match (view.texture, geometry) {
        (Some(texture), Some(geometry)) => {
            let draw_rect = canvas_rect_to_screen(geometry.draw_rect(), displayed, view.canvas_size);
            painter.image(
                texture.id(),
                draw_rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );
            overlay::paint_selection(&painter, view.selection.rect(), displayed, view.canvas_size);
        }
        _ => {
            painter.text(
                displayed.center(),
                egui::Align2::CENTER_CENTER,
                "Waiting for video frame...",
                egui::FontId::proportional(16.0),
                egui::Color32::from_gray(160),
            );
        }
    }

    if !view.interactive || geometry.is_none() {
        return CanvasAction::None;
    }

    let to_canvas = |pos: Pos2| screen_to_canvas(pos, displayed, view.canvas_size);

    if response.drag_stopped() {
        CanvasAction::EndSelection
    } else if response.drag_started() {
        // Anchor at the press, not where the drag threshold was crossed
        ui.input(|i| i.pointer.press_origin())
            .or_else(|| response.interact_pointer_pos())
            .map(|pos| CanvasAction::StartSelection(to_canvas(pos)))
            .unwrap_or(CanvasAction::None)
    } else if response.dragged() {
        response
            .interact_pointer_pos()
            .map(|pos| CanvasAction::UpdateSelection(to_canvas(pos)))
            .unwrap_or(CanvasAction::None)
    } else {
        CanvasAction::None
    }
}

/// Welcome message shown when nothing is loaded.
pub fn show_welcome(ui: &mut egui::Ui) {
    ui.centered_and_justified(|ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(20.0);
            ui.heading(
                egui::RichText::new("AdPlace")
                    .size(32.0)
                    .color(egui::Color32::from_gray(200)),
            );
            ui.label(
                egui::RichText::new("Ad Placement Analysis")
                    .size(14.0)
                    .color(egui::Color32::from_gray(150)),
            );
            ui.add_space(20.0);
            ui.label(
                egui::RichText::new("Open a video to upload it for analysis")
                    .color(egui::Color32::from_gray(180)),
            );
            ui.add_space(10.0);
            ui.label(
                egui::RichText::new("File → Open Video...")
                    .weak()
                    .color(egui::Color32::from_gray(130)),
            );
        });
    });
}
