// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Advertisement region in native video pixels.
//!
//! This is the payload the analysis backend receives: the user's canvas
//! selection normalized to a top-left anchored rectangle and scaled to the
//! video's native resolution.

use super::selection::SelectionRect;
use crate::error::ClientError;
use crate::util::geometry::canvas_to_video_scale;
use egui::{pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Rectangle in native video pixel space.
///
/// Always satisfies `x + width <= original_video_width` and
/// `y + height <= original_video_height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub original_video_width: u32,
    pub original_video_height: u32,
}

impl AdRegion {
    /// Convert a canvas selection to video pixels.
    ///
    /// The selection is normalized (any drag direction), clipped to the
    /// canvas, scaled by `video / canvas` per axis and rounded.
    pub fn from_selection(
        rect: &SelectionRect,
        canvas_size: Vec2,
        video_size: (u32, u32),
    ) -> Result<Self, ClientError> {
        let (video_width, video_height) = video_size;
        if video_width == 0 || video_height == 0 {
            return Err(ClientError::validation("video dimensions are not available yet"));
        }

        let canvas = Rect::from_min_size(pos2(0.0, 0.0), canvas_size);
        let clipped = rect.normalized().intersect(canvas);
        if !clipped.is_positive() {
            return Err(ClientError::validation("selected region lies outside the frame"));
        }

        let scale = canvas_to_video_scale(canvas_size, video_size);
        let x = scale_round(clipped.min.x, scale.x).min(video_width);
        let y = scale_round(clipped.min.y, scale.y).min(video_height);
        let width = scale_round(clipped.width(), scale.x).min(video_width - x);
        let height = scale_round(clipped.height(), scale.y).min(video_height - y);

        if width == 0 || height == 0 {
            return Err(ClientError::validation("selected region is too small"));
        }

        Ok(Self {
            x,
            y,
            width,
            height,
            original_video_width: video_width,
            original_video_height: video_height,
        })
    }
}

fn scale_round(value: f32, scale: f32) -> u32 {
    (value * scale).round().max(0.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::vec2;

    /// Map back to canvas space using the inverse scale.
    fn to_canvas_rect(region: &AdRegion, canvas_size: Vec2) -> Rect {
        let scale_x = canvas_size.x / region.original_video_width as f32;
        let scale_y = canvas_size.y / region.original_video_height as f32;
        Rect::from_min_size(
            pos2(region.x as f32 * scale_x, region.y as f32 * scale_y),
            vec2(region.width as f32 * scale_x, region.height as f32 * scale_y),
        )
    }

    fn rect(start_x: f32, start_y: f32, width: f32, height: f32) -> SelectionRect {
        SelectionRect {
            start_x,
            start_y,
            width,
            height,
        }
    }

    #[test]
    fn test_scales_to_video_pixels() {
        let region =
            AdRegion::from_selection(&rect(50.0, 50.0, 100.0, 70.0), vec2(960.0, 540.0), (1920, 1080))
                .unwrap();
        assert_eq!(
            region,
            AdRegion {
                x: 100,
                y: 100,
                width: 200,
                height: 140,
                original_video_width: 1920,
                original_video_height: 1080,
            }
        );
    }

    #[test]
    fn test_drag_direction_does_not_matter() {
        let canvas = vec2(800.0, 450.0);
        let forward = AdRegion::from_selection(&rect(50.0, 50.0, 50.0, 50.0), canvas, (1280, 720));
        let backward =
            AdRegion::from_selection(&rect(100.0, 100.0, -50.0, -50.0), canvas, (1280, 720));
        let mixed = AdRegion::from_selection(&rect(100.0, 50.0, -50.0, 50.0), canvas, (1280, 720));

        let forward = forward.unwrap();
        assert_eq!(forward, backward.unwrap());
        assert_eq!(forward, mixed.unwrap());
    }

    #[test]
    fn test_clipped_to_frame_bounds() {
        // Drag ran past the bottom-right edge of the canvas
        let region =
            AdRegion::from_selection(&rect(900.0, 500.0, 200.0, 100.0), vec2(960.0, 540.0), (1920, 1080))
                .unwrap();
        assert_eq!(region.x + region.width, 1920);
        assert_eq!(region.y + region.height, 1080);

        // And past the top-left
        let region =
            AdRegion::from_selection(&rect(30.0, 30.0, -60.0, -60.0), vec2(960.0, 540.0), (1920, 1080))
                .unwrap();
        assert_eq!((region.x, region.y), (0, 0));
        assert_eq!((region.width, region.height), (60, 60));
    }

    #[test]
    fn test_region_outside_canvas_is_rejected() {
        let result =
            AdRegion::from_selection(&rect(1000.0, 600.0, 50.0, 50.0), vec2(960.0, 540.0), (1920, 1080));
        assert!(matches!(result, Err(ClientError::Validation(_))));
    }

    #[test]
    fn test_unknown_video_size_is_rejected() {
        let result = AdRegion::from_selection(&rect(0.0, 0.0, 50.0, 50.0), vec2(960.0, 540.0), (0, 0));
        assert!(result.unwrap_err().is_validation());
    }

    #[test]
    fn test_canvas_video_roundtrip_within_one_pixel() {
        let canvas = vec2(960.0, 540.0);
        let cases = [
            (rect(13.3, 27.9, 211.4, 98.6), (1920, 1080)),
            (rect(400.0, 10.0, -123.7, 301.2), (3840, 2160)),
            (rect(5.5, 5.5, 700.25, 400.75), (1280, 720)),
            (rect(77.0, 66.0, 55.0, 44.0), (640, 480)),
        ];

        for (selection, video) in cases {
            let region = AdRegion::from_selection(&selection, canvas, video).unwrap();
            let back = to_canvas_rect(&region, canvas);
            let original = selection.normalized();

            for (a, b) in [
                (back.min.x, original.min.x),
                (back.min.y, original.min.y),
                (back.width(), original.width()),
                (back.height(), original.height()),
            ] {
                assert!((a - b).abs() <= 1.0, "{selection:?} @ {video:?}: {a} vs {b}");
            }
        }
    }

    #[test]
    fn test_serializes_backend_field_names() {
        let region = AdRegion {
            x: 1,
            y: 2,
            width: 3,
            height: 4,
            original_video_width: 1920,
            original_video_height: 1080,
        };
        let json = serde_json::to_value(region).unwrap();
        assert_eq!(json["original_video_width"], 1920);
        assert_eq!(json["height"], 4);
    }
}
