// THEORY:
// The console is the player's primary output. A header describes the stream,
// then one status line per measured frame is rewritten in place with `\r`, and
// a summary block closes the session. Pause and resume interrupt the status
// line with a note on its own line.
//
// The reporter is generic over its writer so tests can capture the output.
// A broken stdout is not worth aborting playback for; write failures are only
// logged.

use std::fmt;
use std::io::Write;

use foveal_luma::overlay::status_line;
use foveal_luma::{BrightnessFormat, PlaybackState, PlaybackSummary, SourceInfo, StopReason, Tick, TickReporter};
use tracing::debug;

const RULE_WIDTH: usize = 50;

pub struct ConsoleReporter<W: Write> {
    out: W,
    format: BrightnessFormat,
    /// Keys are read from the video window rather than typed on stdin.
    window_keys: bool,
    /// A `\r` status line is pending and needs a newline before other output.
    line_open: bool,
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W, format: BrightnessFormat, window_keys: bool) -> Self {
        Self {
            out,
            format,
            window_keys,
            line_open: false,
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, args: fmt::Arguments<'_>) {
        if let Err(err) = self.out.write_fmt(args).and_then(|()| self.out.flush()) {
            debug!(%err, "console write failed");
        }
    }

    fn controls_hint(&self) -> &'static str {
        if self.window_keys {
            "Press 'q' to quit, 'p' to pause/resume"
        } else {
            "Type 'p' + Enter to pause/resume, 'q' + Enter to quit"
        }
    }

    fn resume_hint(&self) -> &'static str {
        if self.window_keys {
            "Press 'p' to resume, 'q' to quit"
        } else {
            "Type 'p' + Enter to resume, 'q' + Enter to quit"
        }
    }
}

impl<W: Write> TickReporter for ConsoleReporter<W> {
    fn session_started(&mut self, info: &SourceInfo) {
        let hint = self.controls_hint();
        self.emit(format_args!(
            "Processing video: {}\nResolution: {}x{}, FPS: {:.2}, Frames: {}\n{}\n{}\n",
            info.name,
            info.width,
            info.height,
            info.fps,
            info.total_frames,
            hint,
            "-".repeat(RULE_WIDTH),
        ));
    }

    fn frame_measured(&mut self, tick: &Tick) {
        let line = status_line(tick.brightness, tick.frame_index, tick.total_frames, self.format);
        self.emit(format_args!("\r{line}"));
        self.line_open = true;
    }

    fn state_changed(&mut self, state: PlaybackState) {
        match state {
            PlaybackState::Paused => {
                let hint = self.resume_hint();
                self.emit(format_args!("\n[PAUSED] {hint}\n"));
            }
            PlaybackState::Running => self.emit(format_args!("\n[RESUMED]\n")),
            PlaybackState::Stopped => return,
        }
        self.line_open = false;
    }

    fn session_finished(&mut self, summary: &PlaybackSummary) {
        if self.line_open {
            self.emit(format_args!("\n"));
            self.line_open = false;
        }
        let rule = "=".repeat(RULE_WIDTH);
        self.emit(format_args!(
            "{rule}\nProcessing complete!\nTotal frames processed: {}\nTime elapsed: {:.2} seconds\n",
            summary.frames_processed,
            summary.elapsed.as_secs_f64(),
        ));
        if let Some(fps) = summary.average_fps() {
            self.emit(format_args!("Average processing speed: {fps:.2} FPS\n"));
        }
        if let Some(stats) = summary.statistics {
            let format = self.format;
            self.emit(format_args!(
                "Brightness: mean {} ({}), min {}, max {}, std dev {:.4}\n",
                format.render(stats.mean),
                stats.category(),
                format.render(stats.min),
                format.render(stats.max),
                stats.std_dev,
            ));
        }
        if let StopReason::Error(reason) = &summary.stop_reason {
            self.emit(format_args!("Stopped early: {reason}\n"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foveal_luma::BrightnessStats;
    use std::time::Duration;

    fn reporter(format: BrightnessFormat, window_keys: bool) -> ConsoleReporter<Vec<u8>> {
        ConsoleReporter::new(Vec::new(), format, window_keys)
    }

    fn output(reporter: ConsoleReporter<Vec<u8>>) -> String {
        String::from_utf8(reporter.into_inner()).unwrap()
    }

    fn tick(brightness: f64, frame_index: u64) -> Tick {
        Tick {
            brightness,
            frame_index,
            total_frames: 3,
            state: PlaybackState::Running,
        }
    }

    fn summary(stop_reason: StopReason) -> PlaybackSummary {
        PlaybackSummary {
            frames_processed: 3,
            elapsed: Duration::from_millis(1500),
            stop_reason,
            last_brightness: 0.5,
            statistics: Some(BrightnessStats {
                count: 3,
                mean: 0.5,
                min: 0.25,
                max: 0.75,
                std_dev: 0.2041,
            }),
        }
    }

    #[test]
    fn header_describes_the_stream() {
        let mut console = reporter(BrightnessFormat::Decimal, true);
        console.session_started(&SourceInfo {
            name: "clip.mp4".into(),
            width: 1920,
            height: 1080,
            fps: 29.97,
            total_frames: 300,
        });
        let text = output(console);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "Processing video: clip.mp4");
        assert_eq!(lines[1], "Resolution: 1920x1080, FPS: 29.97, Frames: 300");
        assert_eq!(lines[2], "Press 'q' to quit, 'p' to pause/resume");
        assert_eq!(lines[3], "-".repeat(50));
    }

    #[test]
    fn status_lines_are_rewritten_in_place() {
        let mut console = reporter(BrightnessFormat::Percentage, false);
        console.frame_measured(&tick(0.1, 1));
        console.frame_measured(&tick(0.2, 2));
        assert_eq!(
            output(console),
            "\rFrame 1/3: Brightness = 10.00%\rFrame 2/3: Brightness = 20.00%"
        );
    }

    #[test]
    fn pause_and_resume_notes() {
        let mut console = reporter(BrightnessFormat::Decimal, false);
        console.state_changed(PlaybackState::Paused);
        console.state_changed(PlaybackState::Running);
        console.state_changed(PlaybackState::Stopped);
        assert_eq!(
            output(console),
            "\n[PAUSED] Type 'p' + Enter to resume, 'q' + Enter to quit\n\n[RESUMED]\n"
        );
    }

    #[test]
    fn summary_closes_the_open_status_line() {
        let mut console = reporter(BrightnessFormat::Decimal, true);
        console.frame_measured(&tick(0.5, 3));
        console.session_finished(&summary(StopReason::EndOfStream));
        let text = output(console);
        assert!(text.starts_with("\rFrame 3/3: Brightness = 0.5000\n=================================================="));
        assert!(text.contains("Processing complete!\n"));
        assert!(text.contains("Total frames processed: 3\n"));
        assert!(text.contains("Time elapsed: 1.50 seconds\n"));
        assert!(text.contains("Average processing speed: 2.00 FPS\n"));
        assert!(text.contains("Brightness: mean 0.5000 (medium), min 0.2500, max 0.7500"));
        assert!(!text.contains("Stopped early"));
    }

    #[test]
    fn summary_reports_an_early_stop() {
        let mut console = reporter(BrightnessFormat::Decimal, true);
        console.session_finished(&summary(StopReason::Error("decode failed".into())));
        assert!(output(console).ends_with("Stopped early: decode failed\n"));
    }
}
