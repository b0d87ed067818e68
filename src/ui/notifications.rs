// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Non-blocking toast notifications.
//!
//! Every notification is also written to the log at a matching level.

use std::time::{Duration, Instant};

/// How long a toast stays on screen.
const TOAST_LIFETIME: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Info,
    Warning,
    Error,
}

impl Level {
    fn color(self) -> egui::Color32 {
        match self {
            Level::Success => egui::Color32::from_rgb(103, 194, 58),
            Level::Info => egui::Color32::from_gray(200),
            Level::Warning => egui::Color32::from_rgb(230, 162, 60),
            Level::Error => egui::Color32::from_rgb(245, 108, 108),
        }
    }
}

#[derive(Debug, Clone)]
struct Toast {
    level: Level,
    message: String,
    expires_at: Instant,
}

/// Queue of on-screen notifications.
#[derive(Debug, Default)]
pub struct Notifications {
    toasts: Vec<Toast>,
}

impl Notifications {
    pub fn success(&mut self, message: impl Into<String>) {
        self.push(Level::Success, message.into());
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(Level::Info, message.into());
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(Level::Warning, message.into());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Level::Error, message.into());
    }

    fn push(&mut self, level: Level, message: String) {
        match level {
            Level::Success | Level::Info => log::info!("{}", message),
            Level::Warning => log::warn!("{}", message),
            Level::Error => log::error!("{}", message),
        }
        self.toasts.push(Toast {
            level,
            message,
            expires_at: Instant::now() + TOAST_LIFETIME,
        });
    }

    /// Drop expired toasts.
    pub fn prune(&mut self, now: Instant) {
        self.toasts.retain(|toast| toast.expires_at > now);
    }

    /// Most recent notification, if any.
    #[cfg(test)]
    pub fn latest(&self) -> Option<(Level, &str)> {
        self.toasts
            .last()
            .map(|toast| (toast.level, toast.message.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    /// Draw the toasts in the bottom-right corner.
    pub fn show(&mut self, ctx: &egui::Context) {
        self.prune(Instant::now());
        if self.is_empty() {
            return;
        }

        egui::Area::new(egui::Id::new("notifications"))
            .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-12.0, -12.0))
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                for toast in &self.toasts {
                    egui::Frame::popup(ui.style()).show(ui, |ui| {
                        ui.colored_label(toast.level.color(), &toast.message);
                    });
                }
            });

        // Keep repainting so toasts disappear on time
        ctx.request_repaint_after(Duration::from_millis(250));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_and_prune() {
        let mut notifications = Notifications::default();
        notifications.info("Selection reset");
        notifications.warning("Please select the ad region first");
        assert_eq!(
            notifications.latest(),
            Some((Level::Warning, "Please select the ad region first"))
        );

        notifications.prune(Instant::now() + TOAST_LIFETIME + Duration::from_millis(1));
        assert!(notifications.is_empty());
    }
}
