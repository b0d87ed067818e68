// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Analysis task lifecycle.
//!
//! One session tracks one upload/analysis attempt:
//! `Idle -> Uploading -> AwaitingRegion -> Polling -> Completed | Failed`.
//! Background work (upload thread, poll worker) reports through channels
//! that are drained once per UI frame by [`AnalysisSession::update`].
//! Resetting or dropping the session cancels any poll in flight.

use crate::error::ClientError;
use crate::io::api::{upload_percent, AnalysisBackend, RegionRequest, UploadProgress};
use crate::io::media::is_supported_video;
use crate::models::report::AnalysisReport;
use crate::models::task::{AnalysisResult, Task, TaskPhase, TaskStatus, UploadResponse};
use crate::submission::{PollEvent, PollHandle, ScoreReveal};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Something that happened since the last update, for user notifications.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Uploaded(String),
    UploadFailed(String),
    RegionSubmitted,
    /// Region metadata was not accepted; analysis is still tracked
    RegionRejected(String),
    Progress(u8),
    Completed,
    Failed(String),
}

/// Message from the upload worker.
#[derive(Debug)]
enum UploadMessage {
    Progress(u8),
    Done(Result<UploadResponse, ClientError>),
}

/// The current upload/analysis attempt.
pub struct AnalysisSession {
    backend: Arc<dyn AnalysisBackend>,
    poll_interval: Duration,
    phase: TaskPhase,
    task: Option<Task>,
    video_file: Option<PathBuf>,
    upload: Option<Receiver<UploadMessage>>,
    poll: Option<PollHandle>,
    submitted: Option<RegionRequest>,
    reveal: Option<ScoreReveal>,
}

impl AnalysisSession {
    pub fn new(backend: Arc<dyn AnalysisBackend>, poll_interval: Duration) -> Self {
        Self {
            backend,
            poll_interval,
            phase: TaskPhase::Idle,
            task: None,
            video_file: None,
            upload: None,
            poll: None,
            submitted: None,
            reveal: None,
        }
    }

    pub fn backend(&self) -> Arc<dyn AnalysisBackend> {
        Arc::clone(&self.backend)
    }

    pub fn phase(&self) -> &TaskPhase {
        &self.phase
    }

    pub fn task(&self) -> Option<&Task> {
        self.task.as_ref()
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.task.as_ref().and_then(|task| task.result.as_ref())
    }

    pub fn video_file(&self) -> Option<&Path> {
        self.video_file.as_deref()
    }

    pub fn submitted(&self) -> Option<&RegionRequest> {
        self.submitted.as_ref()
    }

    /// True while an upload or poll is in flight.
    pub fn is_busy(&self) -> bool {
        self.upload.is_some() || self.poll.is_some()
    }

    /// Validate and upload a new video, discarding any previous attempt.
    pub fn start_upload(&mut self, path: PathBuf) -> Result<(), ClientError> {
        if !is_supported_video(&path) {
            return Err(ClientError::validation("Please choose a valid video file"));
        }

        self.reset();

        let (sender, receiver) = channel();
        let backend = self.backend();
        let upload_path = path.clone();
        std::thread::spawn(move || {
            let progress_sender = sender.clone();
            let mut last = None;
            // Only whole-percent changes are forwarded
            let progress: UploadProgress = Box::new(move |sent, total| {
                let percent = upload_percent(sent, total);
                if last != Some(percent) {
                    last = Some(percent);
                    let _ = progress_sender.send(UploadMessage::Progress(percent));
                }
            });
            let outcome = backend.upload_video(&upload_path, progress);
            let _ = sender.send(UploadMessage::Done(outcome));
        });

        log::info!("Upload started: {}", path.display());
        self.video_file = Some(path);
        self.upload = Some(receiver);
        self.phase = TaskPhase::Uploading { progress: 0 };
        Ok(())
    }

    /// Submit the ad region for the uploaded video and start polling.
    ///
    /// A submission supersedes any poll still running for this session.
    pub fn submit(&mut self, request: RegionRequest) -> Result<(), ClientError> {
        let task = self
            .task
            .as_mut()
            .ok_or_else(|| ClientError::validation("Upload a video before submitting a region"))?;

        if let Some(mut previous) = self.poll.take() {
            previous.cancel();
        }

        task.status = TaskStatus::Processing;
        task.progress = 0;
        task.result = None;
        self.reveal = None;

        self.poll = Some(PollHandle::spawn(
            Arc::clone(&self.backend),
            task.task_id.clone(),
            request.clone(),
            self.poll_interval,
        ));
        log::info!("Submitted ad region for task {}", task.task_id);
        self.submitted = Some(request);
        self.phase = TaskPhase::Polling { progress: 0 };
        Ok(())
    }

    /// Drain background results and advance the lifecycle.
    pub fn update(&mut self, now: Instant) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        self.update_upload(&mut events);
        self.update_poll(now, &mut events);
        events
    }

    fn update_upload(&mut self, events: &mut Vec<SessionEvent>) {
        let outcome = loop {
            let Some(receiver) = &self.upload else {
                return;
            };
            match receiver.try_recv() {
                Ok(UploadMessage::Progress(progress)) => {
                    self.phase = TaskPhase::Uploading { progress };
                }
                Ok(UploadMessage::Done(outcome)) => break outcome,
                Err(TryRecvError::Empty) => return,
                Err(TryRecvError::Disconnected) => {
                    break Err(ClientError::TaskFailed("upload worker stopped".to_string()))
                }
            }
        };
        self.upload = None;

        match outcome {
            Ok(response) => {
                log::info!(
                    "Upload complete, task {}: {}",
                    response.task_id,
                    response.message.as_deref().unwrap_or("no message")
                );
                events.push(SessionEvent::Uploaded(response.task_id.clone()));
                self.task = Some(Task::new(response.task_id));
                self.phase = TaskPhase::AwaitingRegion;
            }
            Err(e) => {
                log::error!("Upload failed: {}", e);
                events.push(SessionEvent::UploadFailed(e.to_string()));
                self.video_file = None;
                self.phase = TaskPhase::Idle;
            }
        }
    }

    fn update_poll(&mut self, now: Instant, events: &mut Vec<SessionEvent>) {
        loop {
            let Some(event) = self.poll.as_ref().and_then(PollHandle::try_next) else {
                break;
            };
            match event {
                PollEvent::RegionSubmitted => events.push(SessionEvent::RegionSubmitted),
                PollEvent::RegionRejected(message) => {
                    events.push(SessionEvent::RegionRejected(message))
                }
                PollEvent::Progress(progress) => {
                    if let Some(task) = self.task.as_mut() {
                        task.progress = progress;
                    }
                    self.phase = TaskPhase::Polling { progress };
                    events.push(SessionEvent::Progress(progress));
                }
                PollEvent::Completed(result) => {
                    log::info!(
                        "Analysis complete: scene {} score {:.2}",
                        result.scene_label,
                        result.display_score()
                    );
                    if let Some(task) = self.task.as_mut() {
                        task.status = TaskStatus::Completed;
                        task.progress = 100;
                        task.result = Some(result);
                    }
                    self.poll = None;
                    self.reveal = Some(ScoreReveal::schedule(now));
                    self.phase = TaskPhase::Completed;
                    events.push(SessionEvent::Completed);
                }
                PollEvent::Failed(e) => {
                    log::error!("Analysis failed: {}", e);
                    if let Some(task) = self.task.as_mut() {
                        task.status = TaskStatus::Failed;
                    }
                    self.poll = None;
                    self.phase = TaskPhase::Failed(e.to_string());
                    events.push(SessionEvent::Failed(e.to_string()));
                }
            }
        }
    }

    /// Whether the final score may be shown yet.
    pub fn score_visible(&self, now: Instant) -> bool {
        self.reveal.is_some_and(|reveal| reveal.is_due(now))
    }

    /// Time until the score reveal, if one is pending.
    pub fn reveal_pending(&self, now: Instant) -> Option<Duration> {
        self.reveal
            .filter(|reveal| !reveal.is_due(now))
            .map(|reveal| reveal.remaining(now))
    }

    /// Report of the completed analysis, if any.
    pub fn report(&self) -> Option<AnalysisReport> {
        let task = self.task.as_ref()?;
        let result = task.result.as_ref()?;
        let request = self.submitted.as_ref()?;
        let video_file = self
            .video_file
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_default();

        Some(AnalysisReport::new(
            video_file,
            task.task_id.clone(),
            request.ad_type.clone(),
            request.ad_region,
            result,
        ))
    }

    /// Drop the task and cancel background work.
    pub fn reset(&mut self) {
        if let Some(mut poll) = self.poll.take() {
            poll.cancel();
        }
        self.upload = None;
        self.task = None;
        self.video_file = None;
        self.submitted = None;
        self.reveal = None;
        self.phase = TaskPhase::Idle;
    }
}
