use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use foveal_luma::config::{DEFAULT_FOVEA_SIZE, DEFAULT_HISTORY_CAPACITY, DEFAULT_MAX_SAMPLES};
use foveal_luma::{
    BrightnessError, BrightnessFormat, ImageSequenceSource, PacingConfig, PlaybackConfig,
    PlaybackSession, SamplingConfig, VideoSource, control,
};
use tracing_subscriber::EnvFilter;

mod console;
mod input;
#[cfg(feature = "opencv")]
mod video_io;

/// Calculates the perceived brightness of a video in real time using WCAG
/// relative luminance over a foveated sample of pixels.
#[derive(Parser, Debug)]
#[command(name = "luma_player")]
#[command(about = "Measure the perceived brightness of a video frame by frame")]
struct Args {
    /// Path to a video file, or to a directory of image frames
    input: PathBuf,

    /// Display brightness as a percentage (0-100%) instead of a decimal (0.0-1.0)
    #[arg(short, long)]
    percentage: bool,

    /// Do not open a video window (console output only)
    #[arg(long)]
    no_display: bool,

    /// Do not draw the brightness overlay on displayed frames
    #[arg(long)]
    no_overlay: bool,

    /// Number of pixels sampled per frame
    #[arg(long, env = "LUMA_MAX_SAMPLES", default_value_t = DEFAULT_MAX_SAMPLES)]
    max_samples: usize,

    /// Fovea diameter relative to the frame, in (0, 1]
    #[arg(long, env = "LUMA_FOVEA_SIZE", default_value_t = DEFAULT_FOVEA_SIZE)]
    fovea_size: f64,

    /// Seed for the sample pattern, for reproducible measurements
    #[arg(long, env = "LUMA_SEED")]
    seed: Option<u64>,

    /// Playback rate for image-frame directories
    #[arg(long, env = "LUMA_FPS", default_value_t = 30.0)]
    fps: f64,

    /// Number of per-frame values kept for the final statistics
    #[arg(long, default_value_t = DEFAULT_HISTORY_CAPACITY)]
    history_capacity: usize,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn playback_config(&self) -> Result<PlaybackConfig> {
        let config = PlaybackConfig {
            sampling: SamplingConfig {
                max_samples: self.max_samples,
                fovea_size: self.fovea_size,
                seed: self.seed,
            },
            display: !self.no_display,
            overlay: !self.no_overlay,
            format: if self.percentage {
                BrightnessFormat::Percentage
            } else {
                BrightnessFormat::Decimal
            },
            pacing: PacingConfig::default(),
            history_capacity: self.history_capacity,
        };
        config
            .validate()
            .map_err(BrightnessError::from)
            .context("refusing to start playback")?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    // Configuration is checked before the video is touched.
    let config = args.playback_config()?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start the async runtime")?;
    let result = runtime.block_on(play(&args.input, config, args.fps));
    // The stdin reader may still be parked in a blocking read.
    runtime.shutdown_background();
    result
}

async fn play(input: &Path, mut config: PlaybackConfig, sequence_fps: f64) -> Result<()> {
    let source = open_source(input, sequence_fps)
        .with_context(|| format!("error processing video '{}'", input.display()))?;

    let (handle, mut control_rx) = control::channel();
    input::spawn_ctrl_c(handle.clone());

    let session = match attach_display(&mut config)? {
        Some(display) => PlaybackSession::new(config.clone(), source)?.with_display(display),
        None => {
            input::spawn_stdin_commands(handle);
            PlaybackSession::new(config.clone(), source)?
        }
    };

    let stdout = std::io::stdout();
    let mut reporter = console::ConsoleReporter::new(stdout.lock(), config.format, config.display);
    // A stream that breaks mid-way still ends with a summary and a zero exit.
    session.run(&mut control_rx, &mut reporter).await;
    Ok(())
}

fn open_source(input: &Path, sequence_fps: f64) -> Result<Box<dyn VideoSource>> {
    if input.is_dir() {
        return Ok(Box::new(ImageSequenceSource::open(input, sequence_fps)?));
    }

    #[cfg(feature = "opencv")]
    {
        Ok(Box::new(video_io::OpenCvSource::open(input)?))
    }

    #[cfg(not(feature = "opencv"))]
    {
        Err(BrightnessError::source_open(
            input,
            "video files need the `opencv` feature; pass a directory of image frames instead",
        )
        .into())
    }
}

/// Opens the video window if one was asked for and can be provided.
fn attach_display(config: &mut PlaybackConfig) -> Result<Option<Box<dyn foveal_luma::Display>>> {
    if !config.display {
        return Ok(None);
    }

    #[cfg(feature = "opencv")]
    {
        let display = video_io::HighGuiDisplay::new(video_io::WINDOW_NAME)?;
        Ok(Some(Box::new(display)))
    }

    #[cfg(not(feature = "opencv"))]
    {
        tracing::warn!("built without the `opencv` feature, falling back to console output");
        config.display = false;
        Ok(None)
    }
}
