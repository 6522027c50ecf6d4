// THEORY:
// The `playback` module is the top-level API of the crate. A `PlaybackSession`
// owns everything that changes while a video plays: the source, the sample
// cache, the last frame and brightness, the brightness history, and the
// `PlaybackState`. One loop drives it, so there is exactly one writer and no
// locking.
//
// Each tick follows the same order:
// 1.  **Measure** (Running only): read a frame, fetch the session's sample set,
//     estimate brightness, remember both as "last known". End of stream or any
//     error inside this step stops the session cleanly.
// 2.  **Present**: hand the last frame and a `Tick` to the display, if one is
//     attached and `config.display` is set.
//     While paused this re-presents the same frame and value.
// 3.  **Control**: take at most one signal, from the display's key poll first and
//     the control channel second, and apply it to the state machine.
// 4.  **Pace**: without an active display nothing else slows the loop down, so it sleeps
//     for one frame interval (or a fixed interval while paused). The sleep races
//     the control channel, so a quit never waits out a full interval.
//
// Whatever ends the loop, the source and display are released before `run`
// returns, and a `PlaybackSummary` is produced. `run` itself cannot fail: the
// only fatal errors (opening the source, bad configuration) happen before a
// session exists.

use std::time::{Duration, Instant};

use tokio::sync::mpsc::error::TryRecvError;
use tracing::{debug, info, warn};

use crate::config::PlaybackConfig;
use crate::control::{ControlReceiver, ControlSignal, PlaybackState};
use crate::core_modules::frame::{Frame, FrameBuffer};
use crate::core_modules::history::{BrightnessHistory, BrightnessStats};
use crate::core_modules::luminance;
use crate::core_modules::sample_cache::SampleCache;
use crate::error::Result;
use crate::overlay::{self, OverlayText};
use crate::source::{SourceInfo, VideoSource};

/// What collaborators see on every tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    pub brightness: f64,
    /// 1-based index of the last measured frame; 0 before the first one.
    pub frame_index: u64,
    pub total_frames: u64,
    pub state: PlaybackState,
}

/// An on-screen surface. Presenting a frame is also where key presses are read.
pub trait Display {
    /// Shows `frame`, drawing `overlay` on top when given.
    fn present(
        &mut self,
        frame: &FrameBuffer<'_>,
        tick: &Tick,
        overlay: Option<&OverlayText>,
    ) -> Result<Option<ControlSignal>>;

    fn release(&mut self);
}

/// Receives progress for a console or log. Every method defaults to doing nothing.
pub trait TickReporter {
    fn session_started(&mut self, _info: &SourceInfo) {}

    /// Called once per freshly measured frame.
    fn frame_measured(&mut self, _tick: &Tick) {}

    fn state_changed(&mut self, _state: PlaybackState) {}

    fn session_finished(&mut self, _summary: &PlaybackSummary) {}
}

/// A reporter that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl TickReporter for SilentReporter {}

#[derive(Debug, Clone, PartialEq)]
pub enum StopReason {
    EndOfStream,
    Quit,
    /// A tick failed; the message is the reported error.
    Error(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSummary {
    pub frames_processed: u64,
    pub elapsed: Duration,
    pub stop_reason: StopReason,
    pub last_brightness: f64,
    /// Statistics over the retained brightness history, if any frame was measured.
    pub statistics: Option<BrightnessStats>,
}

impl PlaybackSummary {
    /// Frames processed per second of wall-clock time.
    pub fn average_fps(&self) -> Option<f64> {
        let seconds = self.elapsed.as_secs_f64();
        (self.frames_processed > 0 && seconds > 0.0).then(|| self.frames_processed as f64 / seconds)
    }
}

/// One playback run of a single video source, from open to release.
pub struct PlaybackSession<S: VideoSource> {
    config: PlaybackConfig,
    source: S,
    display: Option<Box<dyn Display>>,
    cache: SampleCache,
    history: BrightnessHistory,
    state: PlaybackState,
    frame_count: u64,
    last_frame: Option<Frame>,
    last_brightness: f64,
    released: bool,
}

impl<S: VideoSource> PlaybackSession<S> {
    /// Validates `config` and takes ownership of an already opened source.
    pub fn new(config: PlaybackConfig, source: S) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            cache: SampleCache::from_config(&config.sampling),
            history: BrightnessHistory::new(config.history_capacity),
            config,
            source,
            display: None,
            state: PlaybackState::Running,
            frame_count: 0,
            last_frame: None,
            last_brightness: 0.0,
            released: false,
        })
    }

    /// Attaches a display. It is only presented to while `config.display` is set.
    pub fn with_display(mut self, display: Box<dyn Display>) -> Self {
        self.display = Some(display);
        self
    }

    fn display_active(&self) -> bool {
        self.config.display && self.display.is_some()
    }

    /// Runs the loop until end of stream, a quit signal, or a tick error.
    pub async fn run(
        mut self,
        control: &mut ControlReceiver,
        reporter: &mut dyn TickReporter,
    ) -> PlaybackSummary {
        let started = Instant::now();
        let info = self.source.info().clone();
        let running_interval = self.config.pacing.running_interval(info.fps);
        let mut control_open = true;

        info!(
            source = %info.name,
            width = info.width,
            height = info.height,
            fps = info.fps,
            total_frames = info.total_frames,
            display = self.display_active(),
            "playback started"
        );
        if self.config.display && self.display.is_none() {
            warn!("display requested but none attached, pacing to the source frame rate");
        } else if !self.config.display && self.display.is_some() {
            debug!("display attached but disabled in the configuration");
        }
        reporter.session_started(&info);

        let stop_reason = loop {
            if self.state.is_running() {
                match self.measure_next() {
                    Ok(Some(tick)) => reporter.frame_measured(&tick),
                    Ok(None) => {
                        self.state = PlaybackState::Stopped;
                        break StopReason::EndOfStream;
                    }
                    Err(err) => {
                        warn!(error = %err, frame = self.frame_count, "stopping playback");
                        self.state = PlaybackState::Stopped;
                        break StopReason::Error(err.to_string());
                    }
                }
            }

            let mut signal = match self.present() {
                Ok(key) => key,
                Err(err) => {
                    warn!(error = %err, "display failed, stopping playback");
                    self.state = PlaybackState::Stopped;
                    break StopReason::Error(err.to_string());
                }
            };
            if signal.is_none() {
                signal = poll_control(control, &mut control_open);
            }
            if let Some(signal) = signal {
                if self.apply(signal, reporter) {
                    break StopReason::Quit;
                }
            }

            if !self.display_active() {
                let interval = if self.state.is_paused() {
                    self.config.pacing.paused_interval
                } else {
                    running_interval
                };
                if let Some(signal) = pace(control, &mut control_open, interval).await {
                    if self.apply(signal, reporter) {
                        break StopReason::Quit;
                    }
                }
            } else {
                // Give control producers on this runtime a chance to run.
                tokio::task::yield_now().await;
            }
        };

        self.release();
        let summary = PlaybackSummary {
            frames_processed: self.frame_count,
            elapsed: started.elapsed(),
            stop_reason,
            last_brightness: self.last_brightness,
            statistics: self.history.stats(),
        };
        info!(
            frames = summary.frames_processed,
            elapsed_secs = summary.elapsed.as_secs_f64(),
            reason = ?summary.stop_reason,
            "playback finished"
        );
        reporter.session_finished(&summary);
        summary
    }

    /// Reads and measures one frame. `Ok(None)` at end of stream.
    fn measure_next(&mut self) -> Result<Option<Tick>> {
        let Some(frame) = self.source.read_frame()? else {
            return Ok(None);
        };
        self.frame_count += 1;

        let view = frame.view()?;
        let samples = self
            .cache
            .get_or_create(view.width(), view.height(), &self.config.sampling)?;
        let brightness = luminance::estimate(&view, samples);

        self.last_brightness = brightness;
        self.history.push(brightness);
        self.last_frame = Some(frame);
        Ok(Some(self.tick()))
    }

    fn present(&mut self) -> Result<Option<ControlSignal>> {
        if !self.config.display {
            return Ok(None);
        }
        let tick = self.tick();
        let (Some(display), Some(frame)) = (self.display.as_mut(), self.last_frame.as_ref()) else {
            return Ok(None);
        };
        let overlay = self.config.overlay.then(|| {
            overlay::compose(
                tick.brightness,
                tick.frame_index,
                tick.total_frames,
                tick.state.is_paused(),
                self.config.format,
            )
        });
        display.present(&frame.view()?, &tick, overlay.as_ref())
    }

    /// Applies a signal; returns `true` when the session is now stopped.
    fn apply(&mut self, signal: ControlSignal, reporter: &mut dyn TickReporter) -> bool {
        let next = self.state.apply(signal);
        if next != self.state {
            debug!(from = ?self.state, to = ?next, ?signal, "playback state changed");
            self.state = next;
            reporter.state_changed(next);
        }
        self.state.is_stopped()
    }

    fn tick(&self) -> Tick {
        Tick {
            brightness: self.last_brightness,
            frame_index: self.frame_count,
            total_frames: self.source.info().total_frames,
            state: self.state,
        }
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.source.release();
        if let Some(display) = self.display.as_mut() {
            display.release();
        }
        self.cache.clear();
        self.last_frame = None;
    }
}

impl<S: VideoSource> Drop for PlaybackSession<S> {
    fn drop(&mut self) {
        self.release();
    }
}

fn poll_control(control: &mut ControlReceiver, open: &mut bool) -> Option<ControlSignal> {
    if !*open {
        return None;
    }
    match control.try_recv() {
        Ok(signal) => Some(signal),
        Err(TryRecvError::Empty) => None,
        Err(TryRecvError::Disconnected) => {
            debug!("control channel closed");
            *open = false;
            None
        }
    }
}

/// Sleeps for `interval`, waking early if a control signal arrives.
async fn pace(
    control: &mut ControlReceiver,
    open: &mut bool,
    interval: Duration,
) -> Option<ControlSignal> {
    if !*open {
        tokio::time::sleep(interval).await;
        return None;
    }
    tokio::select! {
        _ = tokio::time::sleep(interval) => None,
        signal = control.recv() => {
            if signal.is_none() {
                debug!("control channel closed");
                *open = false;
            }
            signal
        }
    }
}
