// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Analysis backend client.
//!
//! The backend owns video decoding, scene recognition and scoring; this
//! module only speaks its HTTP contract. Calls are blocking and are made
//! from worker threads so the UI never waits on the network.

use crate::error::ClientError;
use crate::models::region::AdRegion;
use crate::models::task::{HealthResponse, TaskStatusResponse, TaskSummary, UploadResponse};
use reqwest::blocking::{multipart, Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::time::Duration;

/// Upload progress callback, called with bytes sent and total bytes.
pub type UploadProgress = Box<dyn FnMut(u64, u64) + Send>;

/// Body of `POST /set_ad_region/{task_id}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionRequest {
    pub ad_region: AdRegion,
    pub ad_type: String,
}

/// Operations the client needs from the analysis backend.
pub trait AnalysisBackend: Send + Sync {
    /// Upload a video; returns the new task id.
    ///
    /// `progress` is called as the file body is streamed.
    fn upload_video(
        &self,
        path: &Path,
        progress: UploadProgress,
    ) -> Result<UploadResponse, ClientError>;

    /// Current status of a task.
    fn task_status(&self, task_id: &str) -> Result<TaskStatusResponse, ClientError>;

    /// Attach the ad region and category to a task, starting analysis.
    fn submit_region(&self, task_id: &str, request: &RegionRequest) -> Result<(), ClientError>;

    /// Scene recognition image bytes.
    fn scene_image(&self, task_id: &str, filename: &str) -> Result<Vec<u8>, ClientError>;

    /// Ad evaluation image bytes.
    fn ad_image(&self, task_id: &str, filename: &str) -> Result<Vec<u8>, ClientError>;

    /// All tasks known to the backend.
    fn list_tasks(&self) -> Result<Vec<TaskSummary>, ClientError>;

    fn health(&self) -> Result<HealthResponse, ClientError>;
}

/// HTTP implementation of [`AnalysisBackend`].
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    /// Create a client for the backend at `base_url` (including `/api`).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self.client.get(self.url(path)).send()?;
        decode(check(response)?)
    }

    fn get_bytes(&self, path: &str) -> Result<Vec<u8>, ClientError> {
        let response = self.client.get(self.url(path)).send()?;
        Ok(check(response)?.bytes()?.to_vec())
    }
}

impl AnalysisBackend for HttpBackend {
    fn upload_video(
        &self,
        path: &Path,
        progress: UploadProgress,
    ) -> Result<UploadResponse, ClientError> {
        let file = File::open(path)?;
        let total = file.metadata()?.len();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "video".to_string());

        let reader = ProgressReader {
            inner: file,
            sent: 0,
            total,
            progress,
        };
        let part = multipart::Part::reader_with_length(reader, total).file_name(file_name);
        let form = multipart::Form::new().part("file", part);

        log::info!("Uploading {} ({} bytes) to {}", path.display(), total, self.base_url);
        let response = self.client.post(self.url("upload")).multipart(form).send()?;
        decode(check(response)?)
    }

    fn task_status(&self, task_id: &str) -> Result<TaskStatusResponse, ClientError> {
        self.get_json(&format!("task/{task_id}"))
    }

    fn submit_region(&self, task_id: &str, request: &RegionRequest) -> Result<(), ClientError> {
        let response = self
            .client
            .post(self.url(&format!("set_ad_region/{task_id}")))
            .json(request)
            .send()?;
        check(response)?;
        Ok(())
    }

    fn scene_image(&self, task_id: &str, filename: &str) -> Result<Vec<u8>, ClientError> {
        self.get_bytes(&format!("scene_image/{task_id}/{filename}"))
    }

    fn ad_image(&self, task_id: &str, filename: &str) -> Result<Vec<u8>, ClientError> {
        self.get_bytes(&format!("ad_image/{task_id}/{filename}"))
    }

    fn list_tasks(&self) -> Result<Vec<TaskSummary>, ClientError> {
        self.get_json("tasks")
    }

    fn health(&self) -> Result<HealthResponse, ClientError> {
        self.get_json("health")
    }
}

/// Reports bytes read so far through an [`UploadProgress`] callback.
struct ProgressReader<R> {
    inner: R,
    sent: u64,
    total: u64,
    progress: UploadProgress,
}

impl<R: Read> Read for ProgressReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let read = self.inner.read(buf)?;
        if read > 0 {
            self.sent += read as u64;
            (self.progress)(self.sent, self.total);
        }
        Ok(read)
    }
}

/// Whole percent of an upload, 100 for an empty file.
pub fn upload_percent(sent: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    (sent.min(total) * 100 / total) as u8
}

/// Turn non-success statuses into [`ClientError::Http`], keeping the
/// backend's `{"error": ...}` message when present.
fn check(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().unwrap_or_default();
    Err(ClientError::Http {
        status: status.as_u16(),
        message: error_message(&body),
    })
}

fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let bytes = response.bytes()?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("error")?.as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

/// In-memory backend for tests.
#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Replays scripted status responses; once exhausted every poll answers
    /// `processing` so extra requests show up in [`ScriptedBackend::status_calls`].
    pub struct ScriptedBackend {
        task_id: Option<String>,
        statuses: Mutex<VecDeque<TaskStatusResponse>>,
        status_calls: AtomicUsize,
        submitted: Mutex<Vec<(String, RegionRequest)>>,
        reject_regions: bool,
    }

    impl ScriptedBackend {
        pub fn with_statuses(statuses: &[&str]) -> Self {
            Self {
                task_id: Some("abc123".to_string()),
                statuses: Mutex::new(
                    statuses
                        .iter()
                        .map(|json| serde_json::from_str(json).unwrap())
                        .collect(),
                ),
                status_calls: AtomicUsize::new(0),
                submitted: Mutex::new(Vec::new()),
                reject_regions: false,
            }
        }

        pub fn rejecting_regions(mut self) -> Self {
            self.reject_regions = true;
            self
        }

        pub fn failing_uploads(mut self) -> Self {
            self.task_id = None;
            self
        }

        pub fn status_calls(&self) -> usize {
            self.status_calls.load(Ordering::SeqCst)
        }

        pub fn submitted(&self) -> Vec<(String, RegionRequest)> {
            self.submitted.lock().unwrap().clone()
        }
    }

    impl AnalysisBackend for ScriptedBackend {
        fn upload_video(
            &self,
            _path: &Path,
            mut progress: UploadProgress,
        ) -> Result<UploadResponse, ClientError> {
            match &self.task_id {
                Some(task_id) => {
                    progress(512, 1024);
                    progress(1024, 1024);
                    Ok(UploadResponse {
                        task_id: task_id.clone(),
                        message: None,
                    })
                }
                None => Err(ClientError::Http {
                    status: 400,
                    message: "unsupported file type".to_string(),
                }),
            }
        }

        fn task_status(&self, _task_id: &str) -> Result<TaskStatusResponse, ClientError> {
            self.status_calls.fetch_add(1, Ordering::SeqCst);
            let next = self.statuses.lock().unwrap().pop_front();
            Ok(next.unwrap_or_else(|| {
                serde_json::from_str(r#"{"status":"processing","progress":0}"#).unwrap()
            }))
        }

        fn submit_region(&self, task_id: &str, request: &RegionRequest) -> Result<(), ClientError> {
            if self.reject_regions {
                return Err(ClientError::Http {
                    status: 404,
                    message: "task not found".to_string(),
                });
            }
            self.submitted
                .lock()
                .unwrap()
                .push((task_id.to_string(), request.clone()));
            Ok(())
        }

        fn scene_image(&self, _task_id: &str, filename: &str) -> Result<Vec<u8>, ClientError> {
            Ok(filename.as_bytes().to_vec())
        }

        fn ad_image(&self, _task_id: &str, filename: &str) -> Result<Vec<u8>, ClientError> {
            Ok(filename.as_bytes().to_vec())
        }

        fn list_tasks(&self) -> Result<Vec<TaskSummary>, ClientError> {
            Ok(Vec::new())
        }

        fn health(&self) -> Result<HealthResponse, ClientError> {
            Ok(HealthResponse {
                status: "ok".to_string(),
                message: None,
            })
        }
    }
}
