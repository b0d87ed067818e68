// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Media file loading (captured frames and videos).
//!
//! This module handles loading image and video files and producing RGBA
//! frames suitable for display in egui.

use anyhow::{bail, Result};
use std::path::Path;
use std::time::Instant;

/// Video extensions the analysis backend accepts.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv"];

/// Still image extensions accepted as a captured frame.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif"];

/// A decoded RGBA8 frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Lower-cased extension of `path`, if any.
fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

/// Whether `path` has a video extension the backend accepts.
pub fn is_supported_video(path: &Path) -> bool {
    extension(path).is_some_and(|ext| VIDEO_EXTENSIONS.contains(&ext.as_str()))
}

/// Whether `path` can be opened as a still frame.
pub fn is_supported_image(path: &Path) -> bool {
    extension(path).is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// Load an image file as an RGBA frame.
pub fn load_image(path: &Path) -> Result<Frame> {
    let img = image::open(path)?.to_rgba8();
    Ok(Frame {
        width: img.width(),
        height: img.height(),
        pixels: img.into_raw(),
    })
}

/// Decode an in-memory image (e.g. a backend result image).
pub fn decode_image(bytes: &[u8]) -> Result<Frame> {
    let img = image::load_from_memory(bytes)?.to_rgba8();
    Ok(Frame {
        width: img.width(),
        height: img.height(),
        pixels: img.into_raw(),
    })
}

/// Something that can supply frames to draw the ad region on.
pub trait FrameSource {
    /// Native frame size, or `None` until enough data is buffered.
    fn intrinsic_size(&self) -> Option<(u32, u32)>;

    /// A new frame to display, if one is due at `now`.
    fn next_frame(&mut self, now: Instant) -> Option<Frame>;
}

/// A single captured frame.
pub struct StillFrame {
    size: (u32, u32),
    pending: Option<Frame>,
}

impl StillFrame {
    pub fn new(frame: Frame) -> Self {
        Self {
            size: (frame.width, frame.height),
            pending: Some(frame),
        }
    }

    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::new(load_image(path)?))
    }
}

impl FrameSource for StillFrame {
    fn intrinsic_size(&self) -> Option<(u32, u32)> {
        Some(self.size)
    }

    fn next_frame(&mut self, _now: Instant) -> Option<Frame> {
        // Delivered once; the renderer keeps the texture.
        self.pending.take()
    }
}

#[cfg(feature = "video-opencv")]
pub use opencv_video::VideoFile;

#[cfg(feature = "video-opencv")]
mod opencv_video {
    use super::{Frame, FrameSource};
    use anyhow::{bail, Result};
    use opencv::{core::Mat, imgproc, prelude::*, videoio};
    use std::path::Path;
    use std::time::{Duration, Instant};

    /// A video file decoded with OpenCV, played at its native frame rate
    /// and looped at the end.
    pub struct VideoFile {
        capture: videoio::VideoCapture,
        size: Option<(u32, u32)>,
        frame_interval: Duration,
        last_frame_at: Option<Instant>,
    }

    impl VideoFile {
        pub fn open(path: &Path) -> Result<Self> {
            let capture =
                videoio::VideoCapture::from_file(&path.to_string_lossy(), videoio::CAP_ANY)?;
            if !capture.is_opened()? {
                bail!("Could not open video {}", path.display());
            }

            let fps = capture.get(videoio::CAP_PROP_FPS)?;
            let fps = if fps.is_finite() && fps > 0.0 { fps } else { 25.0 };
            log::info!("Opened video {} at {:.2} fps", path.display(), fps);

            Ok(Self {
                capture,
                size: None,
                frame_interval: Duration::from_secs_f64(1.0 / fps),
                last_frame_at: None,
            })
        }

        fn decode(&mut self) -> Result<Option<Frame>> {
            let mut bgr = Mat::default();
            if !self.capture.read(&mut bgr)? || bgr.empty() {
                // End of stream, start over
                self.capture.set(videoio::CAP_PROP_POS_FRAMES, 0.0)?;
                return Ok(None);
            }

            let mut rgba = Mat::default();
            imgproc::cvt_color(&bgr, &mut rgba, imgproc::COLOR_BGR2RGBA, 0)?;
            let size = rgba.size()?;
            let frame = Frame {
                width: size.width as u32,
                height: size.height as u32,
                pixels: rgba.data_bytes()?.to_vec(),
            };
            self.size = Some((frame.width, frame.height));
            Ok(Some(frame))
        }
    }

    impl FrameSource for VideoFile {
        fn intrinsic_size(&self) -> Option<(u32, u32)> {
            self.size
        }

        fn next_frame(&mut self, now: Instant) -> Option<Frame> {
            if let Some(last) = self.last_frame_at {
                if now.duration_since(last) < self.frame_interval {
                    return None;
                }
            }
            self.last_frame_at = Some(now);

            match self.decode() {
                Ok(frame) => frame,
                Err(e) => {
                    log::warn!("Failed to decode video frame: {}", e);
                    None
                }
            }
        }
    }
}

/// Open a frame source for `path`: a captured frame for images, a decoded
/// video for video files.
pub fn open_source(path: &Path) -> Result<Box<dyn FrameSource>> {
    if is_supported_image(path) {
        return Ok(Box::new(StillFrame::open(path)?));
    }

    if is_supported_video(path) {
        #[cfg(feature = "video-opencv")]
        return Ok(Box::new(VideoFile::open(path)?));

        #[cfg(not(feature = "video-opencv"))]
        bail!("Video preview requires the video-opencv feature; open a captured frame instead");
    }

    bail!("Unsupported media file: {}", path.display())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn solid_frame(width: u32, height: u32) -> Frame {
        Frame {
            width,
            height,
            pixels: vec![255; (width * height * 4) as usize],
        }
    }

    #[test]
    fn test_video_extensions() {
        assert!(is_supported_video(&PathBuf::from("clips/1.MP4")));
        assert!(is_supported_video(&PathBuf::from("a.mkv")));
        assert!(!is_supported_video(&PathBuf::from("a.webm")));
        assert!(!is_supported_video(&PathBuf::from("mp4")));
    }

    #[test]
    fn test_still_frame_delivers_once() {
        let mut source = StillFrame::new(solid_frame(4, 2));
        assert_eq!(source.intrinsic_size(), Some((4, 2)));

        let now = Instant::now();
        assert!(source.next_frame(now).is_some());
        assert!(source.next_frame(now).is_none());
        assert_eq!(source.intrinsic_size(), Some((4, 2)));
    }

    #[test]
    fn test_load_and_decode_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        image::RgbaImage::from_pixel(6, 3, image::Rgba([10, 20, 30, 255]))
            .save(&path)
            .unwrap();

        let frame = load_image(&path).unwrap();
        assert_eq!((frame.width, frame.height), (6, 3));
        assert_eq!(&frame.pixels[..4], &[10, 20, 30, 255]);

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(decode_image(&bytes).unwrap(), frame);

        let source = open_source(&path).unwrap();
        assert_eq!(source.intrinsic_size(), Some((6, 3)));
    }

    #[test]
    fn test_open_source_rejects_unknown_extension() {
        assert!(open_source(&PathBuf::from("notes.txt")).is_err());
    }
}
