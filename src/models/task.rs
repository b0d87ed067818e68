// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Analysis task data structures.
//!
//! Wire types for the backend's task endpoints and the displayable result
//! derived from a completed task.

use crate::error::ClientError;
use serde::{Deserialize, Serialize};

/// Status reported by the backend for a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Uploaded, waiting for an ad region
    Pending,
    Processing,
    Completed,
    Failed,
}

impl TaskStatus {
    /// Completed and failed tasks never change again.
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

/// `POST /upload` response.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    pub task_id: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Ad-fit sub-scores and final score, all on a 0-100 scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    /// Saliency ratio of the ad region
    #[serde(rename = "FA1")]
    pub fa1: f64,
    /// Color contrast between ad and surroundings
    #[serde(rename = "FA2")]
    pub fa2: f64,
    /// Position and area of the ad
    #[serde(rename = "FA3")]
    pub fa3: f64,
    pub final_score: f64,
}

/// Structured result attached to a completed task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSummary {
    pub scene: String,
    pub scores: Scores,
}

/// `GET /task/{id}` response.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskStatusResponse {
    pub status: TaskStatus,
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub result_summary: Option<ResultSummary>,
    #[serde(default)]
    pub scene_images: Vec<String>,
    #[serde(default)]
    pub ad_images: Vec<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Entry of the `GET /tasks` listing.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskSummary {
    pub task_id: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub filename: Option<String>,
}

/// `GET /health` response.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Scene classes with a localized display label. Anything else is shown
/// verbatim.
const SCENE_LABELS: &[(&str, &str)] = &[
    ("office", "办公室场景"),
    ("office_cubicles", "办公隔间场景"),
    ("conference_room", "会议室场景"),
    ("corridor", "走廊场景"),
    ("lobby", "大堂场景"),
    ("elevator_lobby", "电梯厅场景"),
    ("classroom", "教室场景"),
    ("lecture_room", "报告厅场景"),
    ("library/indoor", "图书馆场景"),
    ("restaurant", "餐厅场景"),
    ("coffee_shop", "咖啡店场景"),
    ("fastfood_restaurant", "快餐店场景"),
    ("kitchen", "厨房场景"),
    ("living_room", "客厅场景"),
    ("bedroom", "卧室场景"),
    ("supermarket", "超市场景"),
    ("shopping_mall/indoor", "商场场景"),
    ("clothing_store", "服装店场景"),
    ("hospital_room", "病房场景"),
    ("street", "街道场景"),
    ("crosswalk", "人行横道场景"),
    ("downtown", "市中心场景"),
    ("parking_lot", "停车场场景"),
    ("subway_station/platform", "地铁站场景"),
    ("train_station/platform", "火车站场景"),
    ("airport_terminal", "机场航站楼场景"),
    ("bus_station/indoor", "公交车站场景"),
    ("gymnasium/indoor", "体育馆场景"),
    ("stadium/soccer", "足球场场景"),
];

/// Display label for a backend scene class.
pub fn scene_label(scene: &str) -> String {
    SCENE_LABELS
        .iter()
        .find(|(key, _)| *key == scene)
        .map(|(_, label)| (*label).to_string())
        .unwrap_or_else(|| scene.to_string())
}

/// File name part of a backend image reference such as
/// `scene_results/1/frame_30.jpg`.
pub fn image_file_name(reference: &str) -> &str {
    reference.rsplit('/').next().unwrap_or(reference)
}

/// Result of a completed analysis, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub scene: String,
    pub scene_label: String,
    pub scores: Scores,
    pub scene_images: Vec<String>,
    pub ad_images: Vec<String>,
}

impl AnalysisResult {
    /// Build the displayable result from a completed status response.
    ///
    /// A completed task without `result_summary` is a data-integrity error;
    /// nothing is partially rendered.
    pub fn from_response(response: &TaskStatusResponse) -> Result<Self, ClientError> {
        let summary = response.result_summary.as_ref().ok_or_else(|| {
            ClientError::IncompleteResult("task completed without result_summary".to_string())
        })?;

        Ok(Self {
            scene: summary.scene.clone(),
            scene_label: scene_label(&summary.scene),
            scores: summary.scores,
            scene_images: response.scene_images.clone(),
            ad_images: response.ad_images.clone(),
        })
    }

    /// Final score on the 0-1 display scale.
    pub fn display_score(&self) -> f64 {
        self.scores.final_score / 100.0
    }
}

/// Lifecycle of one upload/analysis attempt.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TaskPhase {
    #[default]
    Idle,
    /// Video body is being sent; progress in percent
    Uploading {
        progress: u8,
    },
    /// Uploaded; waiting for the user to select a region
    AwaitingRegion,
    Polling {
        progress: u8,
    },
    Completed,
    Failed(String),
}

impl TaskPhase {
    pub fn label(&self) -> &'static str {
        match self {
            TaskPhase::Idle => "Idle",
            TaskPhase::Uploading { .. } => "Uploading",
            TaskPhase::AwaitingRegion => "Awaiting region",
            TaskPhase::Polling { .. } => "Analyzing",
            TaskPhase::Completed => "Completed",
            TaskPhase::Failed(_) => "Failed",
        }
    }
}

/// The task owned by the current session.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub task_id: String,
    pub status: TaskStatus,
    pub progress: u8,
    pub result: Option<AnalysisResult>,
}

impl Task {
    pub fn new(task_id: String) -> Self {
        Self {
            task_id,
            status: TaskStatus::Pending,
            progress: 0,
            result: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_processing_response() {
        let response: TaskStatusResponse =
            serde_json::from_str(r#"{"task_id":"abc123","status":"processing","progress":40,"filename":"1.mp4"}"#)
                .unwrap();
        assert_eq!(response.status, TaskStatus::Processing);
        assert_eq!(response.progress, 40);
        assert!(response.result_summary.is_none());
        assert!(!response.status.is_terminal());
    }

    #[test]
    fn test_completed_response_maps_to_result() {
        let response: TaskStatusResponse = serde_json::from_str(
            r#"{
                "status": "completed",
                "progress": 100,
                "result_summary": {
                    "scene": "office",
                    "scores": {"FA1": 80, "FA2": 75, "FA3": 90, "final_score": 85}
                },
                "scene_images": ["scene_results/1/frame_30.jpg"],
                "ad_images": ["ad_results/1/frame_30.jpg"]
            }"#,
        )
        .unwrap();

        let result = AnalysisResult::from_response(&response).unwrap();
        assert_eq!(result.scene_label, "办公室场景");
        assert_eq!(result.display_score(), 0.85);
        assert_eq!(result.scores.fa3, 90.0);
        assert_eq!(result.scene_images.len(), 1);
    }

    #[test]
    fn test_missing_summary_is_incomplete() {
        let response: TaskStatusResponse =
            serde_json::from_str(r#"{"status":"completed","progress":100}"#).unwrap();
        let err = AnalysisResult::from_response(&response).unwrap_err();
        assert!(matches!(err, ClientError::IncompleteResult(_)));
    }

    #[test]
    fn test_unmapped_scene_passes_through() {
        assert_eq!(scene_label("corridor"), "走廊场景");
        assert_eq!(scene_label("igloo/outdoor"), "igloo/outdoor");
    }

    #[test]
    fn test_image_file_name() {
        assert_eq!(image_file_name("scene_results/1/frame_30.jpg"), "frame_30.jpg");
        assert_eq!(image_file_name("frame_60.jpg"), "frame_60.jpg");
    }

    #[test]
    fn test_failed_status_is_terminal() {
        let response: TaskStatusResponse =
            serde_json::from_str(r#"{"status":"failed","progress":12,"error":"decoder crashed"}"#)
                .unwrap();
        assert!(response.status.is_terminal());
        assert_eq!(response.error.as_deref(), Some("decoder crashed"));
    }

    #[test]
    fn test_parse_task_list_and_health() {
        let tasks: Vec<TaskSummary> = serde_json::from_str(
            r#"[{"task_id":"abc123","status":"pending","progress":0,"filename":"1.mp4"},
                {"task_id":"def456","status":"completed","progress":100}]"#,
        )
        .unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].status, TaskStatus::Pending);
        assert!(!tasks[0].status.is_terminal());
        assert_eq!(tasks[1].filename, None);

        let health: HealthResponse =
            serde_json::from_str(r#"{"status":"ok","message":"service running"}"#).unwrap();
        assert_eq!(health.status, "ok");
    }
}
