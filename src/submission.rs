// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Region submission and task status polling.
//!
//! A completed selection is converted to native video pixels and sent to
//! the backend together with the ad category. A worker thread then polls
//! the task until it completes or fails, reporting back over a channel.
//! The worker stops as soon as its [`PollHandle`] is cancelled or dropped.

use crate::error::ClientError;
use crate::io::api::{AnalysisBackend, RegionRequest};
use crate::models::ad_type::AdTypeChoice;
use crate::models::region::AdRegion;
use crate::models::selection::Selection;
use crate::models::task::{AnalysisResult, TaskStatus};
use egui::Vec2;
use rand::Rng;
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Delay range between showing the scene result and revealing the score.
pub const SCORE_REVEAL_DELAY_MS: std::ops::RangeInclusive<u64> = 300..=500;

/// Validate the current selection and build the backend request.
///
/// Fails with a validation error if the selection is not completed, no ad
/// category is chosen, or the video size is not known yet.
pub fn prepare_submission(
    selection: &Selection,
    ad_type: &AdTypeChoice,
    canvas_size: Vec2,
    video_size: Option<(u32, u32)>,
) -> Result<RegionRequest, ClientError> {
    if !selection.is_completed() {
        return Err(ClientError::validation("Please select the ad region first"));
    }

    let ad_type = ad_type
        .resolve()
        .ok_or_else(|| ClientError::validation("Please choose or enter an ad category"))?;

    let video_size = video_size
        .ok_or_else(|| ClientError::validation("Video frame is not ready yet"))?;

    let ad_region = AdRegion::from_selection(selection.rect(), canvas_size, video_size)?;
    log::info!("Prepared ad region {:?} for category {}", ad_region, ad_type);

    Ok(RegionRequest { ad_region, ad_type })
}

/// Progress reported by the poll worker.
#[derive(Debug)]
pub enum PollEvent {
    /// Region metadata accepted by the backend
    RegionSubmitted,
    /// Region metadata rejected; polling continues regardless
    RegionRejected(String),
    Progress(u8),
    Completed(AnalysisResult),
    Failed(ClientError),
}

/// Handle to a running poll worker.
///
/// Cancelling (or dropping) the handle stops the worker before its next
/// request.
pub struct PollHandle {
    cancel: Option<Sender<()>>,
    events: Receiver<PollEvent>,
}

impl PollHandle {
    /// Submit `request` for `task_id` and start polling every `interval`.
    pub fn spawn(
        backend: Arc<dyn AnalysisBackend>,
        task_id: String,
        request: RegionRequest,
        interval: Duration,
    ) -> Self {
        let (cancel_tx, cancel_rx) = channel();
        let (event_tx, event_rx) = channel();

        std::thread::spawn(move || {
            run_poll(backend.as_ref(), &task_id, &request, interval, &cancel_rx, &event_tx);
            log::debug!("Poll worker for task {} finished", task_id);
        });

        Self {
            cancel: Some(cancel_tx),
            events: event_rx,
        }
    }

    /// Next pending event without blocking.
    pub fn try_next(&self) -> Option<PollEvent> {
        self.events.try_recv().ok()
    }

    pub fn cancel(&mut self) {
        if self.cancel.take().is_some() {
            log::debug!("Polling cancelled");
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn run_poll(
    backend: &dyn AnalysisBackend,
    task_id: &str,
    request: &RegionRequest,
    interval: Duration,
    cancel: &Receiver<()>,
    events: &Sender<PollEvent>,
) {
    // Region metadata is best-effort: a failure is reported but does not
    // stop the analysis from being tracked.
    let submitted = match backend.submit_region(task_id, request) {
        Ok(()) => PollEvent::RegionSubmitted,
        Err(e) => {
            log::warn!("Failed to submit ad region for task {}: {}", task_id, e);
            PollEvent::RegionRejected(e.to_string())
        }
    };
    if events.send(submitted).is_err() {
        return;
    }

    loop {
        match cancel.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => {}
            // Explicit cancel or handle dropped
            Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
        }

        let response = match backend.task_status(task_id) {
            Ok(response) => response,
            Err(e) => {
                let _ = events.send(PollEvent::Failed(e));
                return;
            }
        };

        let terminal = response.status.is_terminal();
        let event = match response.status {
            TaskStatus::Pending | TaskStatus::Processing => {
                log::debug!("Task {} progress {}%", task_id, response.progress);
                PollEvent::Progress(response.progress.min(100))
            }
            TaskStatus::Completed => match AnalysisResult::from_response(&response) {
                Ok(result) => PollEvent::Completed(result),
                Err(e) => PollEvent::Failed(e),
            },
            TaskStatus::Failed => PollEvent::Failed(ClientError::TaskFailed(
                response.error.unwrap_or_else(|| "unknown error".to_string()),
            )),
        };

        if events.send(event).is_err() || terminal {
            return;
        }
    }
}

/// Deferred reveal of the final score after the scene result is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreReveal {
    at: Instant,
}

impl ScoreReveal {
    /// Reveal after a random delay in [`SCORE_REVEAL_DELAY_MS`].
    pub fn schedule(now: Instant) -> Self {
        let delay = rand::thread_rng().gen_range(SCORE_REVEAL_DELAY_MS);
        Self::after(now, Duration::from_millis(delay))
    }

    pub fn after(now: Instant, delay: Duration) -> Self {
        Self { at: now + delay }
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.at
    }

    /// Time left until the reveal, zero once due.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.at.saturating_duration_since(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::api::testing::ScriptedBackend;
    use crate::models::ad_type::AdTypeChoice;
    use egui::{pos2, vec2};

    impl PollHandle {
        fn next_timeout(&self, timeout: Duration) -> Option<PollEvent> {
            self.events.recv_timeout(timeout).ok()
        }

        fn is_cancelled(&self) -> bool {
            self.cancel.is_none()
        }
    }

    const FAST: Duration = Duration::from_millis(5);
    const WAIT: Duration = Duration::from_secs(5);

    fn completed_selection(from: (f32, f32), to: (f32, f32)) -> Selection {
        let mut selection = Selection::default();
        selection.start(pos2(from.0, from.1));
        selection.update(pos2(to.0, to.1));
        selection.end();
        selection
    }

    fn preset(value: &'static str) -> AdTypeChoice {
        AdTypeChoice {
            preset: Some(value),
            custom: String::new(),
        }
    }

    fn sample_request() -> RegionRequest {
        prepare_submission(
            &completed_selection((50.0, 50.0), (150.0, 120.0)),
            &preset("产品"),
            vec2(960.0, 540.0),
            Some((1920, 1080)),
        )
        .unwrap()
    }

    #[test]
    fn test_rejects_incomplete_selection() {
        let mut selection = Selection::default();
        selection.start(pos2(10.0, 10.0));
        selection.update(pos2(200.0, 200.0));

        let err = prepare_submission(&selection, &preset("产品"), vec2(960.0, 540.0), Some((1920, 1080)))
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_rejects_missing_category() {
        let selection = completed_selection((50.0, 50.0), (150.0, 120.0));
        let err = prepare_submission(
            &selection,
            &AdTypeChoice::default(),
            vec2(960.0, 540.0),
            Some((1920, 1080)),
        )
        .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_custom_category_and_scaling() {
        let selection = completed_selection((150.0, 120.0), (50.0, 50.0));
        let choice = AdTypeChoice {
            preset: None,
            custom: "饮料".to_string(),
        };
        let request =
            prepare_submission(&selection, &choice, vec2(960.0, 540.0), Some((1920, 1080))).unwrap();

        assert_eq!(request.ad_type, "饮料");
        assert_eq!(
            (request.ad_region.x, request.ad_region.y, request.ad_region.width, request.ad_region.height),
            (100, 100, 200, 140)
        );
    }

    #[test]
    fn test_opposite_drags_submit_identical_regions() {
        let canvas = vec2(800.0, 450.0);
        let a = prepare_submission(
            &completed_selection((100.0, 100.0), (50.0, 50.0)),
            &preset("品牌"),
            canvas,
            Some((1280, 720)),
        )
        .unwrap();
        let b = prepare_submission(
            &completed_selection((50.0, 50.0), (100.0, 100.0)),
            &preset("品牌"),
            canvas,
            Some((1280, 720)),
        )
        .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_polling_stops_at_first_completed() {
        let backend = Arc::new(ScriptedBackend::with_statuses(&[
            r#"{"status":"processing","progress":40}"#,
            r#"{"status":"completed","progress":100,"result_summary":{"scene":"office","scores":{"FA1":80,"FA2":75,"FA3":90,"final_score":85}}}"#,
            r#"{"status":"processing","progress":10}"#,
        ]));
        let handle = PollHandle::spawn(backend.clone(), "abc123".into(), sample_request(), FAST);

        assert!(matches!(handle.next_timeout(WAIT), Some(PollEvent::RegionSubmitted)));
        assert!(matches!(handle.next_timeout(WAIT), Some(PollEvent::Progress(40))));
        match handle.next_timeout(WAIT) {
            Some(PollEvent::Completed(result)) => {
                assert_eq!(result.scene_label, "办公室场景");
                assert_eq!(result.display_score(), 0.85);
            }
            other => panic!("expected completion, got {other:?}"),
        }

        std::thread::sleep(FAST * 10);
        assert_eq!(backend.status_calls(), 2);
        assert!(handle.try_next().is_none());

        let submitted = backend.submitted();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].0, "abc123");
        assert_eq!(submitted[0].1.ad_type, "产品");
    }

    #[test]
    fn test_polling_stops_at_failure() {
        let backend = Arc::new(ScriptedBackend::with_statuses(&[
            r#"{"status":"failed","progress":5,"error":"no frames"}"#,
            r#"{"status":"processing","progress":10}"#,
        ]));
        let handle = PollHandle::spawn(backend.clone(), "t1".into(), sample_request(), FAST);

        handle.next_timeout(WAIT);
        match handle.next_timeout(WAIT) {
            Some(PollEvent::Failed(ClientError::TaskFailed(message))) => assert_eq!(message, "no frames"),
            other => panic!("expected failure, got {other:?}"),
        }

        std::thread::sleep(FAST * 10);
        assert_eq!(backend.status_calls(), 1);
    }

    #[test]
    fn test_region_rejection_does_not_stop_polling() {
        let backend = Arc::new(
            ScriptedBackend::with_statuses(&[
                r#"{"status":"completed","progress":100,"result_summary":{"scene":"corridor","scores":{"FA1":1,"FA2":2,"FA3":3,"final_score":50}}}"#,
            ])
            .rejecting_regions(),
        );
        let handle = PollHandle::spawn(backend, "t2".into(), sample_request(), FAST);

        assert!(matches!(handle.next_timeout(WAIT), Some(PollEvent::RegionRejected(_))));
        assert!(matches!(handle.next_timeout(WAIT), Some(PollEvent::Completed(_))));
    }

    #[test]
    fn test_completed_without_summary_fails() {
        let backend = Arc::new(ScriptedBackend::with_statuses(&[r#"{"status":"completed","progress":100}"#]));
        let handle = PollHandle::spawn(backend, "t3".into(), sample_request(), FAST);

        handle.next_timeout(WAIT);
        assert!(matches!(
            handle.next_timeout(WAIT),
            Some(PollEvent::Failed(ClientError::IncompleteResult(_)))
        ));
    }

    #[test]
    fn test_cancel_stops_worker() {
        let backend = Arc::new(ScriptedBackend::with_statuses(&[]));
        let mut handle =
            PollHandle::spawn(backend.clone(), "t4".into(), sample_request(), Duration::from_millis(200));

        assert!(matches!(handle.next_timeout(WAIT), Some(PollEvent::RegionSubmitted)));
        handle.cancel();
        assert!(handle.is_cancelled());

        std::thread::sleep(Duration::from_millis(500));
        assert_eq!(backend.status_calls(), 0);
    }

    #[test]
    fn test_score_reveal_window() {
        let now = Instant::now();
        let reveal = ScoreReveal::schedule(now);
        assert!(!reveal.is_due(now));
        assert!(reveal.remaining(now) >= Duration::from_millis(300));
        assert!(reveal.remaining(now) <= Duration::from_millis(500));
        assert!(reveal.is_due(now + Duration::from_millis(500)));
    }
}
