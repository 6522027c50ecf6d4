//! Error types for the brightness engine.
//!
//! Only `SourceOpen` and `Configuration` are fatal to a caller. Everything that
//! can go wrong inside a single playback tick is reported, logged, and turned
//! into a clean stop by the controller.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BrightnessError>;

/// Field-level configuration problems, rejected before any resource is acquired.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("max_samples must be at least 1 (got {0})")]
    MaxSamples(usize),

    #[error("fovea_size must be in (0, 1] (got {0})")]
    FoveaSize(f64),

    #[error("history_capacity must be at least 1")]
    HistoryCapacity,

    #[error("frame rate must be positive and finite (got {0})")]
    FrameRate(f64),
}

#[derive(Debug, Error)]
pub enum BrightnessError {
    /// The video could not be opened; the loop never starts.
    #[error("could not open video source '{}': {reason}", path.display())]
    SourceOpen { path: PathBuf, reason: String },

    /// A frame read failed mid-stream.
    #[error("failed to read frame {frame_index}: {reason}")]
    SourceRead { frame_index: u64, reason: String },

    #[error("invalid configuration: {0}")]
    Configuration(#[from] ConfigError),

    /// The pixel buffer does not match its declared geometry.
    #[error("malformed frame: expected {expected} bytes for {width}x{height}, got {actual}")]
    MalformedFrame {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("cannot sample a {width}x{height} frame")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("display error: {0}")]
    Display(String),
}

impl BrightnessError {
    pub fn source_open(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::SourceOpen {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn source_read(frame_index: u64, reason: impl ToString) -> Self {
        Self::SourceRead {
            frame_index,
            reason: reason.to_string(),
        }
    }
}
