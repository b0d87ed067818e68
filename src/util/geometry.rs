// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! Three coordinate spaces are involved when drawing on a video frame:
//!
//! - screen space: logical points of the on-screen canvas widget, which may
//!   be displayed at a different size than its pixel buffer;
//! - canvas space: pixels of the fixed-size internal canvas buffer;
//! - video space: native pixels of the video frame.
//!
//! This module provides the transforms between them and the aspect-fit
//! rectangle used to draw a frame into the canvas.

use crate::config::FitMode;
use egui::{pos2, vec2, Pos2, Rect, Vec2};

/// Map a pointer position to canvas-pixel space.
///
/// `displayed` is the canvas's on-screen rectangle and `canvas_size` its
/// internal pixel dimensions. Corrects for the canvas being shown at a
/// different size than its buffer.
pub fn screen_to_canvas(pointer: Pos2, displayed: Rect, canvas_size: Vec2) -> Pos2 {
    let scale_x = canvas_size.x / displayed.width();
    let scale_y = canvas_size.y / displayed.height();
    pos2(
        (pointer.x - displayed.min.x) * scale_x,
        (pointer.y - displayed.min.y) * scale_y,
    )
}

/// Inverse of [`screen_to_canvas`].
pub fn canvas_to_screen(point: Pos2, displayed: Rect, canvas_size: Vec2) -> Pos2 {
    let scale_x = displayed.width() / canvas_size.x;
    let scale_y = displayed.height() / canvas_size.y;
    pos2(
        displayed.min.x + point.x * scale_x,
        displayed.min.y + point.y * scale_y,
    )
}

/// Map a canvas-space rectangle to screen space.
pub fn canvas_rect_to_screen(rect: Rect, displayed: Rect, canvas_size: Vec2) -> Rect {
    Rect::from_two_pos(
        canvas_to_screen(rect.min, displayed, canvas_size),
        canvas_to_screen(rect.max, displayed, canvas_size),
    )
}

/// Largest rectangle of `canvas_size`'s aspect ratio that fits in `available`,
/// centered.
pub fn fit_canvas(available: Rect, canvas_size: Vec2) -> Rect {
    let scale = (available.width() / canvas_size.x).min(available.height() / canvas_size.y);
    Rect::from_center_size(available.center(), canvas_size * scale)
}

/// Placement of a video frame inside the canvas buffer.
///
/// Derived every frame from the current video intrinsic size and canvas
/// size; never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasGeometry {
    pub container_width: f32,
    pub container_height: f32,
    pub draw_width: f32,
    pub draw_height: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl CanvasGeometry {
    /// Compute where to draw a `video_size` frame in a `canvas_size` canvas.
    ///
    /// Returns `None` while any dimension is zero (video not ready yet).
    pub fn compute(video_size: (u32, u32), canvas_size: Vec2, mode: FitMode) -> Option<Self> {
        let (video_width, video_height) = (video_size.0 as f32, video_size.1 as f32);
        if video_width <= 0.0 || video_height <= 0.0 || canvas_size.x <= 0.0 || canvas_size.y <= 0.0
        {
            return None;
        }

        let video_aspect = video_width / video_height;
        let canvas_aspect = canvas_size.x / canvas_size.y;
        let video_is_wider = video_aspect > canvas_aspect;

        // Contain fits the long axis, cover fits the short one.
        let fit_to_height = match mode {
            FitMode::Contain => !video_is_wider,
            FitMode::Cover => video_is_wider,
        };

        let (draw_width, draw_height) = if fit_to_height {
            let draw_height = canvas_size.y;
            (video_width * (draw_height / video_height), draw_height)
        } else {
            let draw_width = canvas_size.x;
            (draw_width, video_height * (draw_width / video_width))
        };

        Some(Self {
            container_width: canvas_size.x,
            container_height: canvas_size.y,
            draw_width,
            draw_height,
            offset_x: (canvas_size.x - draw_width) / 2.0,
            offset_y: (canvas_size.y - draw_height) / 2.0,
        })
    }

    /// Draw rectangle in canvas space.
    pub fn draw_rect(&self) -> Rect {
        Rect::from_min_size(
            pos2(self.offset_x, self.offset_y),
            vec2(self.draw_width, self.draw_height),
        )
    }
}

/// Per-axis factor from canvas pixels to video pixels.
pub fn canvas_to_video_scale(canvas_size: Vec2, video_size: (u32, u32)) -> Vec2 {
    vec2(
        video_size.0 as f32 / canvas_size.x,
        video_size.1 as f32 / canvas_size.y,
    )
}
