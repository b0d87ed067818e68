// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Result image fetching and texture cache.
//!
//! Scene and ad images referenced by a completed task are downloaded on a
//! background thread, decoded, and uploaded as textures on the UI thread.

use crate::io::api::AnalysisBackend;
use crate::io::media::{decode_image, Frame};
use crate::models::task::image_file_name;
use std::collections::{HashMap, HashSet};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;

/// Which result image endpoint a reference belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageKind {
    Scene,
    Ad,
}

/// Identifies one result image of one task.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageKey {
    pub task_id: String,
    pub kind: ImageKind,
    /// Reference as listed by the backend
    pub reference: String,
}

impl ImageKey {
    pub fn new(task_id: impl Into<String>, kind: ImageKind, reference: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            kind,
            reference: reference.into(),
        }
    }
}

type FetchResult = (ImageKey, Result<Frame, String>);

/// Downloaded result images.
pub struct ImageGallery {
    sender: Sender<FetchResult>,
    receiver: Receiver<FetchResult>,
    textures: HashMap<ImageKey, egui::TextureHandle>,
    loading: HashSet<ImageKey>,
}

impl Default for ImageGallery {
    fn default() -> Self {
        let (sender, receiver) = channel();
        Self {
            sender,
            receiver,
            textures: HashMap::new(),
            loading: HashSet::new(),
        }
    }
}

impl ImageGallery {
    /// Start downloading `key` unless it is cached or already in flight.
    pub fn request(&mut self, backend: Arc<dyn AnalysisBackend>, key: ImageKey) {
        if self.textures.contains_key(&key) || !self.loading.insert(key.clone()) {
            return;
        }

        let sender = self.sender.clone();
        std::thread::spawn(move || {
            let filename = image_file_name(&key.reference);
            let bytes = match key.kind {
                ImageKind::Scene => backend.scene_image(&key.task_id, filename),
                ImageKind::Ad => backend.ad_image(&key.task_id, filename),
            };
            let result = bytes
                .map_err(|e| e.to_string())
                .and_then(|bytes| decode_image(&bytes).map_err(|e| e.to_string()));
            let _ = sender.send((key, result));
        });
    }

    /// Upload finished downloads as textures. Returns failure messages.
    pub fn update(&mut self, ctx: &egui::Context) -> Vec<String> {
        let mut errors = Vec::new();
        while let Ok((key, result)) = self.receiver.try_recv() {
            // Results for a cleared gallery or an earlier task are stale
            if !self.loading.remove(&key) {
                continue;
            }
            match result {
                Ok(frame) => {
                    let size = [frame.width as usize, frame.height as usize];
                    let image = egui::ColorImage::from_rgba_unmultiplied(size, &frame.pixels);
                    let texture = ctx.load_texture(
                        format!("result:{}:{}", key.task_id, key.reference),
                        image,
                        egui::TextureOptions::LINEAR,
                    );
                    self.textures.insert(key, texture);
                }
                Err(e) => {
                    errors.push(format!(
                        "Failed to load {} of task {}: {}",
                        key.reference, key.task_id, e
                    ));
                }
            }
        }
        errors
    }

    pub fn texture(&self, key: &ImageKey) -> Option<&egui::TextureHandle> {
        self.textures.get(key)
    }

    pub fn is_loading(&self, key: &ImageKey) -> bool {
        self.loading.contains(key)
    }

    pub fn has_pending(&self) -> bool {
        !self.loading.is_empty()
    }

    pub fn clear(&mut self) {
        self.textures.clear();
        self.loading.clear();
    }
}
