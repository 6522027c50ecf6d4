// THEORY:
// This file is the main entry point for the `foveal_luma` library crate.
// It defines the public API exposed to frontends (like the `luma_player` binary).
//
// The primary export is the `PlaybackSession` and its configuration structures
// (`PlaybackConfig`, `SamplingConfig`, etc.), which together form a high-level
// interface for measuring the perceived brightness of a video frame by frame.
// The brightness engine itself (`core_modules`) stays usable on its own: a
// caller holding a single frame can generate a foveated sample set and estimate
// its luminance without ever starting a playback loop.
//
// Video decoding and presentation are collaborators: the crate only defines the
// `VideoSource`, `Display` and `TickReporter` seams, plus one dependency-light
// source (`ImageSequenceSource`) built on the `image` crate.

pub mod config;
pub mod control;
pub mod core_modules;
pub mod error;
pub mod overlay;
pub mod playback;
pub mod source;

pub use config::{BrightnessFormat, PacingConfig, PlaybackConfig, SamplingConfig};
pub use control::{ControlHandle, ControlReceiver, ControlSignal, PlaybackState};
pub use error::{BrightnessError, ConfigError, Result};
pub use core_modules::frame::{Frame, FrameBuffer, PixelLayout};
pub use core_modules::history::{BrightnessCategory, BrightnessStats};
pub use core_modules::sampler::{SamplePoint, SampleSet};
pub use overlay::OverlayText;
pub use playback::{
    Display, PlaybackSession, PlaybackSummary, SilentReporter, StopReason, Tick, TickReporter,
};
pub use source::{ImageSequenceSource, SourceInfo, VideoSource};
