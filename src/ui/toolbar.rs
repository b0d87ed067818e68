// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Toolbar for ad category selection and region actions.

use crate::models::ad_type::{category_label, AdTypeChoice, AD_CATEGORIES};
use crate::models::selection::SelectionState;

/// Button pressed in the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    None,
    Submit,
    ResetSelection,
    ExitSelection,
}

/// Display the toolbar.
pub fn show(
    ui: &mut egui::Ui,
    ad_type: &mut AdTypeChoice,
    selection_state: SelectionState,
    selecting_area: bool,
) -> ToolbarAction {
    let mut action = ToolbarAction::None;

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        ui.label("Ad category:");

        let selected = ad_type
            .preset
            .and_then(category_label)
            .unwrap_or("Choose...");
        egui::ComboBox::from_id_source("ad_category")
            .selected_text(selected)
            .show_ui(ui, |ui| {
                ui.selectable_value(&mut ad_type.preset, None, "None");
                for category in AD_CATEGORIES {
                    ui.selectable_value(&mut ad_type.preset, Some(category.value), category.label);
                }
            });

        ui.add(
            egui::TextEdit::singleline(&mut ad_type.custom)
                .hint_text("Custom category")
                .desired_width(140.0),
        );

        ui.separator();

        ui.add_enabled_ui(selecting_area, |ui| {
            if ui.button("Submit Region").clicked() {
                action = ToolbarAction::Submit;
            }
            if ui.button("Reset").clicked() {
                action = ToolbarAction::ResetSelection;
            }
            if ui.button("Exit").clicked() {
                action = ToolbarAction::ExitSelection;
            }
        });

        ui.separator();

        let hint = match (selecting_area, selection_state) {
            (false, _) => "Upload a video to select the ad region",
            (true, SelectionState::Idle) => "Drag on the frame to mark the ad region",
            (true, SelectionState::Selecting) => "Release to finish the region",
            (true, SelectionState::Completed) => "Choose a category and submit",
        };
        ui.label(egui::RichText::new(hint).italics().weak());
    });

    action
}
