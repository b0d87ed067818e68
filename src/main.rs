// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! AdPlace - Ad Placement Analysis client
//!
//! A cross-platform desktop client that uploads a video to the analysis
//! backend, lets the user mark where an advertisement appears on a frame,
//! and shows the scene recognition and ad-fit scores once ready.

mod app;
mod config;
mod error;
mod io;
mod models;
mod session;
mod submission;
mod ui;
mod util;

use anyhow::{Context, Result};
use app::AdPlaceApp;
use config::AppConfig;
use io::api::HttpBackend;
use std::path::Path;
use std::sync::Arc;

/// Register a font with CJK glyphs as a fallback for every family.
fn install_ui_font(ctx: &egui::Context, path: &Path) -> Result<()> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read font {}", path.display()))?;

    let mut fonts = egui::FontDefinitions::default();
    fonts
        .font_data
        .insert("ui_font".to_owned(), egui::FontData::from_owned(bytes));
    for family in [egui::FontFamily::Proportional, egui::FontFamily::Monospace] {
        fonts
            .families
            .entry(family)
            .or_default()
            .push("ui_font".to_owned());
    }
    ctx.set_fonts(fonts);
    Ok(())
}

fn main() -> Result<()> {
    let config = AppConfig::load()?;

    // Initialize logging; RUST_LOG overrides the configured level
    env_logger::Builder::new()
        .filter_level(config.log_level.to_level_filter())
        .parse_default_env()
        .init();

    let backend = HttpBackend::new(&config.api_base_url, config.request_timeout())?;
    log::info!("Using backend {}", backend.base_url());

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("AdPlace - Ad Placement Analysis"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "AdPlace",
        options,
        Box::new(move |cc| {
            if let Some(path) = &config.ui_font {
                if let Err(e) = install_ui_font(&cc.egui_ctx, path) {
                    log::warn!("{:#}", e);
                }
            }
            Ok(Box::new(AdPlaceApp::new(config, Arc::new(backend))))
        }),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
