// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Application configuration.
//!
//! Settings are read from a YAML file (`ADPLACE_CONFIG`, else `adplace.yaml`
//! in the working directory). Missing fields fall back to defaults, and
//! `ADPLACE_API_URL` overrides the backend address.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "ADPLACE_CONFIG";
/// Environment variable overriding `api_base_url`.
pub const API_URL_ENV: &str = "ADPLACE_API_URL";
/// Config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "adplace.yaml";

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// How a video frame is fitted into the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FitMode {
    /// Whole frame visible, letterboxed on the short axis
    Contain,
    /// Wider frames fit the canvas height, taller ones its width
    #[default]
    Cover,
}

/// Client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Backend base URL, including the `/api` prefix
    pub api_base_url: String,
    /// Delay between task status polls
    pub poll_interval_ms: u64,
    /// Per-request timeout
    pub request_timeout_secs: u64,
    /// Internal canvas buffer width in pixels
    pub canvas_width: u32,
    /// Internal canvas buffer height in pixels
    pub canvas_height: u32,
    /// Minimum drag extent (canvas pixels, each axis) for a selection to count
    pub min_selection_px: f32,
    /// Frame fitting strategy
    pub fit_mode: FitMode,
    /// Log verbosity
    pub log_level: LogLevel,
    /// Font file with CJK glyphs for category and scene labels
    pub ui_font: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:5001/api".to_string(),
            poll_interval_ms: 1000,
            request_timeout_secs: 30,
            canvas_width: 960,
            canvas_height: 540,
            min_selection_px: 20.0,
            fit_mode: FitMode::default(),
            log_level: LogLevel::default(),
            ui_font: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from the environment-selected file, or defaults.
    pub fn load() -> Result<Self> {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .or_else(|| {
                let local = PathBuf::from(DEFAULT_CONFIG_FILE);
                local.exists().then_some(local)
            });

        let mut config = match path {
            Some(path) => Self::from_path(&path)?,
            None => Self::default(),
        };

        if let Ok(url) = std::env::var(API_URL_ENV) {
            config.api_base_url = url;
        }
        config.validate()?;
        Ok(config)
    }

    /// Read a YAML config file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_yaml(&yaml).with_context(|| format!("Invalid config {}", path.display()))
    }

    /// Parse YAML config text.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Reject settings the client cannot work with.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(!self.api_base_url.is_empty(), "api_base_url must not be empty");
        anyhow::ensure!(self.poll_interval_ms > 0, "poll_interval_ms must be positive");
        anyhow::ensure!(
            self.canvas_width > 0 && self.canvas_height > 0,
            "canvas size must be non-zero"
        );
        anyhow::ensure!(self.min_selection_px >= 0.0, "min_selection_px must not be negative");
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Internal canvas size as an egui vector.
    pub fn canvas_size(&self) -> egui::Vec2 {
        egui::vec2(self.canvas_width as f32, self.canvas_height as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
        assert_eq!(config.min_selection_px, 20.0);
        assert_eq!(config.fit_mode, FitMode::Cover);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = AppConfig::from_yaml(
            "api_base_url: http://analysis.local/api\nfit_mode: contain\nlog_level: debug\n",
        )
        .unwrap();
        assert_eq!(config.api_base_url, "http://analysis.local/api");
        assert_eq!(config.fit_mode, FitMode::Contain);
        assert_eq!(config.log_level.to_level_filter(), log::LevelFilter::Debug);
        assert_eq!(config.canvas_width, 960);
        assert_eq!(config.poll_interval_ms, 1000);
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let config = AppConfig {
            poll_interval_ms: 0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("adplace.yaml");
        std::fs::write(&path, "canvas_width: 640\ncanvas_height: 360\n").unwrap();

        let config = AppConfig::from_path(&path).unwrap();
        assert_eq!(config.canvas_size(), egui::vec2(640.0, 360.0));
    }
}
