// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Analysis results panel.
//!
//! Shows the task state, the submitted region, the scene classification
//! and scores of a completed analysis, result images, and the backend's
//! recent task list.

use crate::io::api::RegionRequest;
use crate::models::region::AdRegion;
use crate::models::report::AnalysisReport;
use crate::models::task::{image_file_name, AnalysisResult, Task, TaskPhase, TaskSummary};
use crate::ui::gallery::{ImageGallery, ImageKey, ImageKind};
use std::path::Path;

/// Action requested from the results panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultsAction {
    None,
    FetchImage(ImageKey),
    RefreshTasks,
    CloseReport,
}

/// Everything the panel displays.
pub struct ResultsView<'a> {
    pub phase: &'a TaskPhase,
    pub task: Option<&'a Task>,
    /// Video uploaded for the current task
    pub video_file: Option<&'a Path>,
    pub submitted: Option<&'a RegionRequest>,
    pub result: Option<&'a AnalysisResult>,
    /// The final score may be revealed
    pub score_visible: bool,
    pub gallery: &'a ImageGallery,
    pub recent_tasks: &'a [TaskSummary],
    /// Report opened from disk, if any
    pub saved_report: Option<&'a AnalysisReport>,
}

/// Score text on the 0-1 display scale.
pub fn format_score(final_score: f64) -> String {
    format!("{:.2}", final_score / 100.0)
}

/// Display the results panel.
pub fn show(ui: &mut egui::Ui, view: ResultsView<'_>) -> ResultsAction {
    let mut action = ResultsAction::None;

    ui.heading("Analysis");
    ui.separator();

    egui::ScrollArea::vertical().show(ui, |ui| {
        show_status(ui, &view);

        if let Some(request) = view.submitted {
            ui.add_space(8.0);
            ui.label(egui::RichText::new("Ad Region").strong());
            show_region(ui, "ad_region_grid", &request.ad_type, &request.ad_region);
        }

        if let Some(result) = view.result {
            ui.add_space(8.0);
            ui.separator();
            show_scores(ui, result, view.score_visible);

            if let Some(task) = view.task {
                let images = [
                    ("Scene Frames", ImageKind::Scene, &result.scene_images),
                    ("Ad Frames", ImageKind::Ad, &result.ad_images),
                ];
                for (title, kind, references) in images {
                    let fetch = show_images(ui, title, &task.task_id, kind, references, view.gallery);
                    if let Some(fetch) = fetch {
                        action = ResultsAction::FetchImage(fetch);
                    }
                }
            }
        }

        if let Some(report) = view.saved_report {
            ui.add_space(8.0);
            ui.separator();
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new("Saved Report").strong());
                if ui.small_button("✖").on_hover_text("Close").clicked() {
                    action = ResultsAction::CloseReport;
                }
            });
            egui::Grid::new("saved_report_grid").num_columns(2).show(ui, |ui| {
                ui.label("Video:");
                ui.label(&report.video_file);
                ui.end_row();
                ui.label("Task:");
                ui.monospace(&report.task_id);
                ui.end_row();
                ui.label("Scene:");
                ui.label(&report.scene_label);
                ui.end_row();
                ui.label("Scores:");
                ui.label(format!(
                    "{:.1} / {:.1} / {:.1}",
                    report.scores.fa1, report.scores.fa2, report.scores.fa3
                ));
                ui.end_row();
                ui.label("Final score:");
                ui.label(format_score(report.scores.final_score));
                ui.end_row();
            });
            show_region(ui, "saved_region_grid", &report.ad_type, &report.ad_region);
        }

        ui.add_space(8.0);
        ui.separator();
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new("Recent Tasks").strong());
            if ui.small_button("⟳").on_hover_text("Refresh").clicked() {
                action = ResultsAction::RefreshTasks;
            }
        });
        if view.recent_tasks.is_empty() {
            ui.label(egui::RichText::new("No tasks").weak());
        }
        for summary in view.recent_tasks {
            ui.horizontal(|ui| {
                ui.monospace(&summary.task_id);
                ui.label(format!("{:?} {}%", summary.status, summary.progress).to_lowercase());
                if let Some(filename) = &summary.filename {
                    ui.label(egui::RichText::new(filename).weak());
                }
            });
        }
    });

    action
}

fn show_region(ui: &mut egui::Ui, id: &str, ad_type: &str, region: &AdRegion) {
    egui::Grid::new(id).num_columns(2).show(ui, |ui| {
        ui.label("Category:");
        ui.label(ad_type);
        ui.end_row();
        ui.label("Position:");
        ui.label(format!("({}, {})", region.x, region.y));
        ui.end_row();
        ui.label("Size:");
        ui.label(format!("{} × {}", region.width, region.height));
        ui.end_row();
        ui.label("Video:");
        ui.label(format!(
            "{} × {}",
            region.original_video_width, region.original_video_height
        ));
        ui.end_row();
    });
}

fn show_status(ui: &mut egui::Ui, view: &ResultsView<'_>) {
    egui::Grid::new("task_status_grid").num_columns(2).show(ui, |ui| {
        ui.label("Status:");
        ui.label(view.phase.label());
        ui.end_row();

        if let Some(path) = view.video_file {
            ui.label("Video:");
            let name = path.file_name().unwrap_or(path.as_os_str());
            ui.label(name.to_string_lossy().into_owned())
                .on_hover_text(path.display().to_string());
            ui.end_row();
        }

        if let Some(task) = view.task {
            ui.label("Task:");
            ui.monospace(&task.task_id);
            ui.end_row();
        }
    });

    match view.phase {
        TaskPhase::Uploading { progress } => {
            ui.label("Uploading video...");
            ui.add(
                egui::ProgressBar::new(f32::from(*progress) / 100.0)
                    .show_percentage()
                    .animate(true),
            );
        }
        TaskPhase::Polling { progress } => {
            ui.add(
                egui::ProgressBar::new(f32::from(*progress) / 100.0)
                    .show_percentage()
                    .animate(true),
            );
        }
        TaskPhase::Failed(message) => {
            ui.colored_label(egui::Color32::from_rgb(245, 108, 108), message);
        }
        _ => {}
    }
}

fn show_scores(ui: &mut egui::Ui, result: &AnalysisResult, score_visible: bool) {
    ui.label(egui::RichText::new("Scene").strong());
    ui.label(egui::RichText::new(&result.scene_label).size(16.0));
    ui.add_space(6.0);

    egui::Grid::new("scores_grid").num_columns(2).show(ui, |ui| {
        ui.label("FA1 (saliency):");
        ui.label(format!("{:.1}", result.scores.fa1));
        ui.end_row();
        ui.label("FA2 (contrast):");
        ui.label(format!("{:.1}", result.scores.fa2));
        ui.end_row();
        ui.label("FA3 (position):");
        ui.label(format!("{:.1}", result.scores.fa3));
        ui.end_row();
    });

    ui.add_space(6.0);
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new("Final score:").strong());
        if score_visible {
            ui.label(
                egui::RichText::new(format_score(result.scores.final_score))
                    .size(22.0)
                    .color(egui::Color32::from_rgb(103, 194, 58)),
            );
        } else {
            ui.spinner();
        }
    });
}

/// Returns the image to fetch, if the user asked for one.
fn show_images(
    ui: &mut egui::Ui,
    title: &str,
    task_id: &str,
    kind: ImageKind,
    references: &[String],
    gallery: &ImageGallery,
) -> Option<ImageKey> {
    if references.is_empty() {
        return None;
    }

    let mut fetch = None;
    ui.add_space(8.0);
    egui::CollapsingHeader::new(format!("{} ({})", title, references.len()))
        .default_open(false)
        .show(ui, |ui| {
            for reference in references {
                let key = ImageKey::new(task_id, kind, reference.as_str());
                if let Some(texture) = gallery.texture(&key) {
                    let size = texture.size_vec2();
                    let width = ui.available_width().min(size.x);
                    let scaled = egui::vec2(width, size.y * width / size.x.max(1.0));
                    ui.image((texture.id(), scaled));
                } else if gallery.is_loading(&key) {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label(image_file_name(reference));
                    });
                } else if ui.link(image_file_name(reference)).clicked() {
                    fetch = Some(key);
                }
            }
        });
    fetch
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(85.0), "0.85");
        assert_eq!(format_score(100.0), "1.00");
        assert_eq!(format_score(0.0), "0.00");
    }
}
