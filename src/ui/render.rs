// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Continuous frame rendering for area selection.
//!
//! While area selection is active the canvas repaints every display frame
//! so the current video frame stays live under the selection overlay.
//! [`RenderLoop`] is the handle for that loop: it only schedules the next
//! repaint while active, so stopping it ends the loop on the next tick.

use crate::io::media::Frame;

/// Handle for the per-frame repaint loop.
#[derive(Debug, Default)]
pub struct RenderLoop {
    active: bool,
    ticks: u64,
}

impl RenderLoop {
    pub fn start(&mut self) {
        if !self.active {
            log::debug!("Render loop started");
        }
        self.active = true;
    }

    pub fn stop(&mut self) {
        if self.active {
            log::debug!("Render loop stopped after {} ticks", self.ticks);
        }
        self.active = false;
        self.ticks = 0;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Run one iteration: schedule the next repaint if still active.
    ///
    /// Returns `false` without scheduling anything once stopped.
    pub fn tick(&mut self, ctx: &egui::Context) -> bool {
        if !self.active {
            return false;
        }
        self.ticks += 1;
        ctx.request_repaint();
        true
    }
}

/// GPU texture holding the most recent video frame.
#[derive(Default)]
pub struct FrameRenderer {
    texture: Option<egui::TextureHandle>,
    frame_size: Option<(u32, u32)>,
}

impl FrameRenderer {
    /// Replace the displayed frame.
    pub fn upload(&mut self, ctx: &egui::Context, frame: &Frame) {
        let size = [frame.width as usize, frame.height as usize];
        let image = egui::ColorImage::from_rgba_unmultiplied(size, &frame.pixels);

        if let Some(texture) = self.texture.as_mut() {
            texture.set(image, egui::TextureOptions::LINEAR);
        } else {
            self.texture = Some(ctx.load_texture("video_frame", image, egui::TextureOptions::LINEAR));
        }
        self.frame_size = Some((frame.width, frame.height));
    }

    pub fn texture(&self) -> Option<&egui::TextureHandle> {
        self.texture.as_ref()
    }

    /// Size of the last uploaded frame.
    pub fn frame_size(&self) -> Option<(u32, u32)> {
        self.frame_size
    }

    pub fn clear(&mut self) {
        self.texture = None;
        self.frame_size = None;
    }
}
