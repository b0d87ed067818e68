// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Exportable analysis report.

use super::region::AdRegion;
use super::task::{AnalysisResult, Scores};
use serde::{Deserialize, Serialize};

/// Complete record of one analysis for serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub video_file: String,
    pub task_id: String,
    pub ad_type: String,
    pub ad_region: AdRegion,
    pub scene: String,
    pub scene_label: String,
    pub scores: Scores,
    #[serde(default)]
    pub scene_images: Vec<String>,
    #[serde(default)]
    pub ad_images: Vec<String>,
}

impl AnalysisReport {
    /// Assemble a report from a submitted region and its result.
    pub fn new(
        video_file: String,
        task_id: String,
        ad_type: String,
        ad_region: AdRegion,
        result: &AnalysisResult,
    ) -> Self {
        Self {
            video_file,
            task_id,
            ad_type,
            ad_region,
            scene: result.scene.clone(),
            scene_label: result.scene_label.clone(),
            scores: result.scores,
            scene_images: result.scene_images.clone(),
            ad_images: result.ad_images.clone(),
        }
    }
}
