// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Analysis report serialization and deserialization.
//!
//! This module handles exporting and importing reports in YAML and JSON
//! formats.

use crate::models::report::AnalysisReport;
use anyhow::{bail, Result};
use std::path::Path;

/// Export a report to YAML format.
pub fn export_yaml(report: &AnalysisReport, path: &Path) -> Result<()> {
    let yaml = serde_yaml::to_string(report)?;
    std::fs::write(path, yaml)?;
    Ok(())
}

/// Export a report to JSON format.
pub fn export_json(report: &AnalysisReport, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Import a report from YAML format.
pub fn import_yaml(path: &Path) -> Result<AnalysisReport> {
    let yaml = std::fs::read_to_string(path)?;
    let report = serde_yaml::from_str(&yaml)?;
    Ok(report)
}

/// Import a report from JSON format.
pub fn import_json(path: &Path) -> Result<AnalysisReport> {
    let json = std::fs::read_to_string(path)?;
    let report = serde_json::from_str(&json)?;
    Ok(report)
}

/// Export in the format named by the file extension.
pub fn export_report(report: &AnalysisReport, path: &Path) -> Result<()> {
    let extension = path.extension().and_then(|s| s.to_str());
    match extension {
        Some("yaml") | Some("yml") => export_yaml(report, path),
        Some("json") => export_json(report, path),
        _ => bail!("Unsupported file extension: {:?}", extension),
    }
}

/// Import in the format named by the file extension.
pub fn import_report(path: &Path) -> Result<AnalysisReport> {
    let extension = path.extension().and_then(|s| s.to_str());
    match extension {
        Some("yaml") | Some("yml") => import_yaml(path),
        Some("json") => import_json(path),
        _ => bail!("Unsupported file extension: {:?}", extension),
    }
}
