// THEORY:
// The overlay is composed, not drawn, here. `compose` is a stateless function of
// the values a frontend needs to show (brightness, frame position, pause state,
// number format) and returns plain text lines. Drawing them onto pixels is the
// display collaborator's job, which keeps this crate free of any GUI toolkit.
//
// The console status line lives next to it so both surfaces format numbers the
// same way.

use crate::config::BrightnessFormat;

pub const PAUSED_BANNER: &str = "[PAUSED]";

/// Text lines of the brightness overlay, top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayText {
    /// `Brightness: 0.1234`, drawn large.
    pub headline: String,
    /// `Frame: 12/300`, drawn small.
    pub frame_line: String,
    /// Present only while paused.
    pub paused_banner: Option<&'static str>,
}

pub fn compose(
    brightness: f64,
    frame_index: u64,
    total_frames: u64,
    paused: bool,
    format: BrightnessFormat,
) -> OverlayText {
    OverlayText {
        headline: format!("Brightness: {}", format.render(brightness)),
        frame_line: format!("Frame: {frame_index}/{total_frames}"),
        paused_banner: paused.then_some(PAUSED_BANNER),
    }
}

/// The per-frame console line, e.g. `Frame 12/300: Brightness = 0.1234`.
pub fn status_line(
    brightness: f64,
    frame_index: u64,
    total_frames: u64,
    format: BrightnessFormat,
) -> String {
    format!(
        "Frame {frame_index}/{total_frames}: Brightness = {}",
        format.render(brightness)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composes_decimal_overlay() {
        let text = compose(0.52341, 12, 300, false, BrightnessFormat::Decimal);
        assert_eq!(text.headline, "Brightness: 0.5234");
        assert_eq!(text.frame_line, "Frame: 12/300");
        assert_eq!(text.paused_banner, None);
    }

    #[test]
    fn paused_overlay_carries_the_banner() {
        let text = compose(0.1, 1, 0, true, BrightnessFormat::Percentage);
        assert_eq!(text.headline, "Brightness: 10.00%");
        assert_eq!(text.frame_line, "Frame: 1/0");
        assert_eq!(text.paused_banner, Some("[PAUSED]"));
    }

    #[test]
    fn status_line_matches_the_console_format() {
        assert_eq!(
            status_line(0.25, 7, 10, BrightnessFormat::Percentage),
            "Frame 7/10: Brightness = 25.00%"
        );
    }
}
