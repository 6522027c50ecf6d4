// THEORY:
// A `VideoSource` is the controller's only view of decoding. It reports the
// stream's nominal geometry and rate up front, hands out one owned `Frame` per
// call until the stream ends, and can be released explicitly. The trait is
// synchronous on purpose: decoding is blocking work, and the playback loop calls
// it from exactly one place.
//
// `ImageSequenceSource` plays a directory of still images as a video. It needs
// nothing beyond the `image` crate, which makes the player usable (and testable)
// on machines without a native video stack.

use std::path::{Path, PathBuf};

use image::ImageFormat;
use tracing::debug;

use crate::core_modules::frame::Frame;
use crate::error::{BrightnessError, ConfigError, Result};

/// Nominal properties of a stream, known once it is opened.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceInfo {
    /// Human-readable name, usually the file or directory name.
    pub name: String,
    pub width: u32,
    pub height: u32,
    /// Nominal frames per second; zero or negative when unknown.
    pub fps: f64,
    /// Total number of frames; zero when unknown (live sources).
    pub total_frames: u64,
}

pub trait VideoSource {
    fn info(&self) -> &SourceInfo;

    /// The next frame, `Ok(None)` at end of stream.
    fn read_frame(&mut self) -> Result<Option<Frame>>;

    /// Releases the underlying resources. Must be safe to call more than once.
    fn release(&mut self);
}

impl<S: VideoSource + ?Sized> VideoSource for Box<S> {
    fn info(&self) -> &SourceInfo {
        (**self).info()
    }

    fn read_frame(&mut self) -> Result<Option<Frame>> {
        (**self).read_frame()
    }

    fn release(&mut self) {
        (**self).release()
    }
}

/// Plays the images of a directory, sorted by file name, as a video.
#[derive(Debug)]
pub struct ImageSequenceSource {
    info: SourceInfo,
    frames: Vec<PathBuf>,
    next: usize,
    released: bool,
}

impl ImageSequenceSource {
    pub fn open(dir: impl AsRef<Path>, fps: f64) -> Result<Self> {
        let dir = dir.as_ref();
        if !(fps.is_finite() && fps > 0.0) {
            return Err(ConfigError::FrameRate(fps).into());
        }

        let entries = std::fs::read_dir(dir).map_err(|e| BrightnessError::source_open(dir, e))?;
        let mut frames = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| BrightnessError::source_open(dir, e))?.path();
            if path.is_file() && ImageFormat::from_path(&path).is_ok() {
                frames.push(path);
            }
        }
        frames.sort();

        let first = frames
            .first()
            .ok_or_else(|| BrightnessError::source_open(dir, "directory contains no image frames"))?;
        let (width, height) =
            image::image_dimensions(first).map_err(|e| BrightnessError::source_open(first, e))?;

        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| dir.display().to_string());
        debug!(%name, frames = frames.len(), width, height, "opened image sequence");

        Ok(Self {
            info: SourceInfo {
                name,
                width,
                height,
                fps,
                total_frames: frames.len() as u64,
            },
            frames,
            next: 0,
            released: false,
        })
    }

    pub fn remaining(&self) -> usize {
        self.frames.len().saturating_sub(self.next)
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl VideoSource for ImageSequenceSource {
    fn info(&self) -> &SourceInfo {
        &self.info
    }

    fn read_frame(&mut self) -> Result<Option<Frame>> {
        if self.released {
            return Ok(None);
        }
        let Some(path) = self.frames.get(self.next) else {
            return Ok(None);
        };
        let index = self.next as u64;
        self.next += 1;
        let image = image::open(path).map_err(|e| BrightnessError::source_read(index, e))?;
        Ok(Some(Frame::from(image.to_rgb8())))
    }

    fn release(&mut self) {
        if !self.released {
            debug!(name = %self.info.name, "releasing image sequence");
            self.frames.clear();
            self.released = true;
        }
    }
}
