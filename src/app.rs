// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! [`AdPlaceApp`] owns everything one analysis needs: the frame source and
//! its renderer, the selection state machine, the ad category choice and
//! the backend session. Dropping the app stops the render loop and cancels
//! any poll in flight.

use crate::config::AppConfig;
use crate::error::ClientError;
use crate::io::api::AnalysisBackend;
use crate::io::media::{self, Frame, FrameSource, StillFrame};
use crate::models::ad_type::AdTypeChoice;
use crate::models::report::AnalysisReport;
use crate::models::selection::{Selection, SelectionEvent};
use crate::models::task::{TaskPhase, TaskSummary};
use crate::session::{AnalysisSession, SessionEvent};
use crate::submission::prepare_submission;
use crate::ui::canvas::{self, CanvasAction, CanvasView};
use crate::ui::gallery::ImageGallery;
use crate::ui::notifications::Notifications;
use crate::ui::render::{FrameRenderer, RenderLoop};
use crate::ui::results::{self, ResultsAction, ResultsView};
use crate::ui::toolbar::{self, ToolbarAction};
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Repaint cadence while background work is in flight.
const BUSY_REPAINT: Duration = Duration::from_millis(100);

/// Main application state.
pub struct AdPlaceApp {
    config: AppConfig,

    /// Upload and analysis of the current video
    session: AnalysisSession,

    /// Ad region being drawn on the canvas
    selection: Selection,

    /// Ad category to submit with the region
    ad_type: AdTypeChoice,

    /// Where canvas frames come from
    frame_source: Option<Box<dyn FrameSource>>,

    /// Receiver for background frame image loading
    frame_loader: Option<Receiver<Result<Frame, String>>>,

    /// Loading state message
    loading_message: Option<String>,

    renderer: FrameRenderer,

    /// Runs exactly while area selection is active
    render_loop: RenderLoop,
    notifications: Notifications,

    /// Downloaded result images
    gallery: ImageGallery,

    recent_tasks: Vec<TaskSummary>,
    task_list_loader: Option<Receiver<Result<Vec<TaskSummary>, ClientError>>>,

    /// The final score notification has been shown
    score_announced: bool,

    /// Previously exported report opened for review
    saved_report: Option<AnalysisReport>,
}

impl AdPlaceApp {
    /// Create the application around a backend.
    pub fn new(config: AppConfig, backend: Arc<dyn AnalysisBackend>) -> Self {
        let session = AnalysisSession::new(backend, config.poll_interval());
        let selection = Selection::new(config.min_selection_px);

        let app = Self {
            config,
            session,
            selection,
            ad_type: AdTypeChoice::default(),
            frame_source: None,
            frame_loader: None,
            loading_message: None,
            renderer: FrameRenderer::default(),
            render_loop: RenderLoop::default(),
            notifications: Notifications::default(),
            gallery: ImageGallery::default(),
            recent_tasks: Vec::new(),
            task_list_loader: None,
            score_announced: false,
            saved_report: None,
        };
        app.check_health();
        app
    }

    /// Log backend availability once, off the UI thread.
    fn check_health(&self) {
        let backend = self.session.backend();
        std::thread::spawn(move || match backend.health() {
            Ok(health) => log::info!(
                "Backend health: {} {}",
                health.status,
                health.message.unwrap_or_default()
            ),
            Err(e) => log::warn!("Backend health check failed: {}", e),
        });
    }

    /// Native size of the frames being drawn on.
    fn video_size(&self) -> Option<(u32, u32)> {
        self.frame_source
            .as_ref()
            .and_then(|source| source.intrinsic_size())
            .or_else(|| self.renderer.frame_size())
    }

    /// Upload a new video and open it for preview.
    ///
    /// Any previous analysis is discarded.
    pub fn open_video(&mut self, path: PathBuf) {
        if let Err(e) = self.session.start_upload(path.clone()) {
            self.notify_error(&e);
            return;
        }

        self.clear_local_state();
        self.loading_message = None;
        self.frame_loader = None;

        match media::open_source(&path) {
            Ok(source) => self.frame_source = Some(source),
            Err(e) => self.notifications.warning(format!(
                "Video preview unavailable ({}). Open a captured frame to select the ad region.",
                e
            )),
        }
        self.notifications.info("Uploading video...");
    }

    /// Load a still image to draw the ad region on (asynchronously).
    pub fn open_frame_image(&mut self, path: PathBuf) {
        let (sender, receiver) = channel();
        self.frame_loader = Some(receiver);
        self.loading_message = Some("Loading frame...".to_string());

        std::thread::spawn(move || {
            let result = media::load_image(&path)
                .map_err(|e| format!("Failed to load frame: {}", e))
                .inspect(|frame| {
                    log::info!("Loaded frame: {} ({}x{})", path.display(), frame.width, frame.height)
                });
            let _ = sender.send(result);
        });
    }

    fn poll_frame_loader(&mut self) {
        let Some(receiver) = &self.frame_loader else {
            return;
        };
        let Ok(result) = receiver.try_recv() else {
            return;
        };
        self.frame_loader = None;
        self.loading_message = None;

        match result {
            Ok(frame) => {
                self.renderer.clear();
                self.frame_source = Some(Box::new(StillFrame::new(frame)));
                if *self.session.phase() == TaskPhase::AwaitingRegion
                    && !self.render_loop.is_active()
                {
                    self.enter_area_selection();
                }
            }
            Err(e) => self.notifications.error(e),
        }
    }

    /// Activate area selection for the uploaded video.
    pub fn enter_area_selection(&mut self) {
        if self.session.task().is_none() {
            self.notifications.warning("Please upload a video first");
            return;
        }
        self.render_loop.start();
        self.notifications.info("Drag on the frame to select the ad region");
    }

    /// Leave area selection and drop the selection.
    pub fn exit_area_selection(&mut self) {
        self.render_loop.stop();
        self.selection.reset();
        self.notifications.info("Exited area selection");
    }

    pub fn reset_selection(&mut self) {
        let event = self.selection.reset();
        self.handle_selection_event(event);
    }

    /// Discard the current analysis and start over.
    pub fn new_analysis(&mut self) {
        self.session.reset();
        self.clear_local_state();
        self.frame_source = None;
        self.frame_loader = None;
        self.loading_message = None;
    }

    fn clear_local_state(&mut self) {
        self.render_loop.stop();
        self.selection.reset();
        self.ad_type.clear();
        self.renderer.clear();
        self.frame_source = None;
        self.gallery.clear();
        self.score_announced = false;
    }

    /// Validate the selection and hand it to the session for submission.
    pub fn submit_selection(&mut self) {
        let request = match prepare_submission(
            &self.selection,
            &self.ad_type,
            self.config.canvas_size(),
            self.video_size(),
        ) {
            Ok(request) => request,
            Err(e) => {
                self.notify_error(&e);
                return;
            }
        };

        match self.session.submit(request) {
            Ok(()) => {
                self.render_loop.stop();
                self.gallery.clear();
                self.score_announced = false;
                self.notifications.info("Ad region submitted, analyzing...");
            }
            Err(e) => self.notify_error(&e),
        }
    }

    fn notify_error(&mut self, error: &ClientError) {
        if error.is_validation() {
            self.notifications.warning(error.to_string());
        } else {
            self.notifications.error(error.to_string());
        }
    }

    fn handle_canvas_action(&mut self, action: CanvasAction) {
        let event = match action {
            CanvasAction::StartSelection(point) => self.selection.start(point),
            CanvasAction::UpdateSelection(point) => {
                self.selection.update(point);
                SelectionEvent::None
            }
            CanvasAction::EndSelection => self.selection.end(),
            CanvasAction::None => SelectionEvent::None,
        };
        self.handle_selection_event(event);
    }

    fn handle_selection_event(&mut self, event: SelectionEvent) {
        match event {
            SelectionEvent::Completed => self
                .notifications
                .success("Ad region selected. Choose a category and submit."),
            SelectionEvent::Reset => self.notifications.info("Selection reset"),
            // A too-small drag is dropped silently
            SelectionEvent::Started | SelectionEvent::Discarded | SelectionEvent::None => {}
        }
    }

    fn handle_toolbar_action(&mut self, action: ToolbarAction) {
        match action {
            ToolbarAction::Submit => self.submit_selection(),
            ToolbarAction::ResetSelection => self.reset_selection(),
            ToolbarAction::ExitSelection => self.exit_area_selection(),
            ToolbarAction::None => {}
        }
    }

    fn handle_results_action(&mut self, action: ResultsAction) {
        match action {
            ResultsAction::FetchImage(key) => {
                let current = self.session.task().is_some_and(|task| task.task_id == key.task_id);
                if current {
                    self.gallery.request(self.session.backend(), key);
                }
            }
            ResultsAction::RefreshTasks => self.refresh_tasks(),
            ResultsAction::CloseReport => self.saved_report = None,
            ResultsAction::None => {}
        }
    }

    /// Draw the next frame from the source while the render loop runs.
    fn tick_render(&mut self, ctx: &egui::Context, now: Instant) {
        // The first frame is shown even outside area selection
        let needs_frame = self.renderer.texture().is_none();
        if !self.render_loop.tick(ctx) && !needs_frame {
            return;
        }
        if let Some(frame) = self
            .frame_source
            .as_mut()
            .and_then(|source| source.next_frame(now))
        {
            self.renderer.upload(ctx, &frame);
        }
    }

    /// Turn session progress into notifications.
    fn poll_session(&mut self, ctx: &egui::Context, now: Instant) {
        for event in self.session.update(now) {
            match event {
                SessionEvent::Uploaded(task_id) => {
                    self.notifications
                        .success(format!("Video uploaded (task {})", task_id));
                    if self.frame_source.is_some() {
                        self.enter_area_selection();
                    }
                }
                SessionEvent::UploadFailed(message) => {
                    self.notifications
                        .error(format!("Upload failed: {}", message));
                    self.clear_local_state();
                }
                SessionEvent::RegionSubmitted => self.notifications.info("Ad region saved"),
                SessionEvent::RegionRejected(message) => self
                    .notifications
                    .warning(format!("Ad region was not saved: {}", message)),
                SessionEvent::Progress(progress) => log::debug!("Analysis progress {}%", progress),
                SessionEvent::Completed => {
                    if let Some(result) = self.session.result() {
                        let message = format!("Scene recognized: {}", result.scene_label);
                        self.notifications.success(message);
                    }
                }
                SessionEvent::Failed(message) => self.notifications.error(message),
            }
        }

        if let Some(remaining) = self.session.reveal_pending(now) {
            ctx.request_repaint_after(remaining);
        } else if self.session.score_visible(now) && !self.score_announced {
            self.score_announced = true;
            if let Some(result) = self.session.result() {
                let message = format!("Final score: {}", results::format_score(result.scores.final_score));
                self.notifications.success(message);
            }
        }

        if self.session.is_busy() {
            ctx.request_repaint_after(BUSY_REPAINT);
        }
    }

    /// Fetch the backend's task list in the background.
    fn refresh_tasks(&mut self) {
        let (sender, receiver) = channel();
        let backend = self.session.backend();
        std::thread::spawn(move || {
            let _ = sender.send(backend.list_tasks());
        });
        self.task_list_loader = Some(receiver);
    }

    fn poll_task_list(&mut self) {
        let Some(receiver) = &self.task_list_loader else {
            return;
        };
        let Ok(result) = receiver.try_recv() else {
            return;
        };
        self.task_list_loader = None;

        match result {
            Ok(tasks) => {
                log::info!("Fetched {} tasks", tasks.len());
                self.recent_tasks = tasks;
            }
            Err(e) => self
                .notifications
                .error(format!("Failed to list tasks: {}", e)),
        }
    }

    /// Export the completed analysis to a file.
    fn export_report(&mut self, path: PathBuf) {
        let Some(report) = self.session.report() else {
            self.notifications.warning("No completed analysis to export");
            return;
        };

        match crate::io::serialization::export_report(&report, &path) {
            Ok(()) => self
                .notifications
                .success(format!("Exported report to {}", path.display())),
            Err(e) => self
                .notifications
                .error(format!("Failed to export report: {}", e)),
        }
    }

    /// Open a previously exported report for review.
    fn open_report(&mut self, path: PathBuf) {
        match crate::io::serialization::import_report(&path) {
            Ok(report) => {
                self.notifications.info(format!(
                    "Opened report for task {} ({})",
                    report.task_id, report.scene_label
                ));
                self.saved_report = Some(report);
            }
            Err(e) => self
                .notifications
                .error(format!("Failed to open report: {}", e)),
        }
    }

    fn show_menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open Video...").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("Videos", media::VIDEO_EXTENSIONS)
                            .pick_file()
                        {
                            self.open_video(path);
                        }
                        ui.close_menu();
                    }
                    if ui.button("Open Frame Image...").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("Images", media::IMAGE_EXTENSIONS)
                            .pick_file()
                        {
                            self.open_frame_image(path);
                        }
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Open Report...").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("Reports", &["yaml", "yml", "json"])
                            .pick_file()
                        {
                            self.open_report(path);
                        }
                        ui.close_menu();
                    }
                    let has_report = self.session.result().is_some();
                    if ui
                        .add_enabled(has_report, egui::Button::new("Export Report..."))
                        .clicked()
                    {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("YAML", &["yaml", "yml"])
                            .add_filter("JSON", &["json"])
                            .set_file_name("report.yaml")
                            .save_file()
                        {
                            self.export_report(path);
                        }
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("Analysis", |ui| {
                    let selecting_area = self.render_loop.is_active();
                    let can_select =
                        !selecting_area && *self.session.phase() == TaskPhase::AwaitingRegion;
                    if ui
                        .add_enabled(can_select, egui::Button::new("Select Ad Region"))
                        .clicked()
                    {
                        self.enter_area_selection();
                        ui.close_menu();
                    }
                    if ui
                        .add_enabled(selecting_area, egui::Button::new("Reset Selection"))
                        .clicked()
                    {
                        self.reset_selection();
                        ui.close_menu();
                    }
                    if ui
                        .add_enabled(selecting_area, egui::Button::new("Exit Area Selection"))
                        .clicked()
                    {
                        self.exit_area_selection();
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("New Analysis").clicked() {
                        self.new_analysis();
                        ui.close_menu();
                    }
                });
            });
        });
    }
}

impl eframe::App for AdPlaceApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();

        self.poll_frame_loader();
        self.poll_session(ctx, now);
        self.poll_task_list();
        for error in self.gallery.update(ctx) {
            self.notifications.error(error);
        }
        self.tick_render(ctx, now);

        // Keep spinners moving
        if self.loading_message.is_some() || self.gallery.has_pending() || self.task_list_loader.is_some() {
            ctx.request_repaint_after(BUSY_REPAINT);
        }

        self.show_menu_bar(ctx);

        let toolbar_action = egui::TopBottomPanel::top("toolbar")
            .show(ctx, |ui| {
                toolbar::show(
                    ui,
                    &mut self.ad_type,
                    self.selection.state(),
                    self.render_loop.is_active(),
                )
            })
            .inner;
        self.handle_toolbar_action(toolbar_action);

        let results_action = egui::SidePanel::right("results")
            .default_width(280.0)
            .show(ctx, |ui| {
                results::show(
                    ui,
                    ResultsView {
                        phase: self.session.phase(),
                        task: self.session.task(),
                        video_file: self.session.video_file(),
                        submitted: self.session.submitted(),
                        result: self.session.result(),
                        score_visible: self.session.score_visible(now),
                        gallery: &self.gallery,
                        recent_tasks: &self.recent_tasks,
                        saved_report: self.saved_report.as_ref(),
                    },
                )
            })
            .inner;
        self.handle_results_action(results_action);

        if self.render_loop.is_active()
            && !ctx.wants_keyboard_input()
            && ctx.input(|i| i.key_pressed(egui::Key::Escape))
        {
            self.reset_selection();
        }

        let canvas_action = egui::CentralPanel::default()
            .show(ctx, |ui| {
                if let Some(ref message) = self.loading_message {
                    ui.centered_and_justified(|ui| {
                        ui.vertical_centered(|ui| {
                            ui.add_space(20.0);
                            ui.spinner();
                            ui.add_space(10.0);
                            ui.label(
                                egui::RichText::new(message)
                                    .size(16.0)
                                    .color(egui::Color32::from_gray(200)),
                            );
                        });
                    });
                    CanvasAction::None
                } else if self.frame_source.is_none() && *self.session.phase() == TaskPhase::Idle {
                    canvas::show_welcome(ui);
                    CanvasAction::None
                } else {
                    canvas::show(
                        ui,
                        CanvasView {
                            canvas_size: self.config.canvas_size(),
                            texture: self.renderer.texture(),
                            video_size: self.video_size(),
                            fit_mode: self.config.fit_mode,
                            selection: &self.selection,
                            interactive: self.render_loop.is_active(),
                        },
                    )
                }
            })
            .inner;
        self.handle_canvas_action(canvas_action);

        self.notifications.show(ctx);
    }
}

impl Drop for AdPlaceApp {
    fn drop(&mut self) {
        self.render_loop.stop();
        self.session.reset();
    }
}
