// THEORY:
// Configuration is built exactly once, before a session acquires any resource,
// and every field's range is checked at that point. The playback loop never
// re-validates: if a `PlaybackConfig` passed `validate`, every tick can trust it.
//
// `SamplingConfig` is the part the brightness engine cares about and is also the
// key the `SampleCache` compares against. The remaining fields only shape how a
// frontend presents the results.

use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_MAX_SAMPLES: usize = 100;
pub const DEFAULT_FOVEA_SIZE: f64 = 0.4;
/// Roughly five minutes of 30 fps video.
pub const DEFAULT_HISTORY_CAPACITY: usize = 10_000;

const DEFAULT_FALLBACK_INTERVAL: Duration = Duration::from_millis(33);
const DEFAULT_PAUSED_INTERVAL: Duration = Duration::from_millis(100);

/// Parameters of the foveated sampler.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingConfig {
    /// Number of pixels sampled per frame. Must be at least 1.
    pub max_samples: usize,
    /// Diameter of the fovea relative to the frame, in `(0, 1]`.
    pub fovea_size: f64,
    /// Seed for the session's random source. `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            max_samples: DEFAULT_MAX_SAMPLES,
            fovea_size: DEFAULT_FOVEA_SIZE,
            seed: None,
        }
    }
}

impl SamplingConfig {
    pub fn new(max_samples: usize, fovea_size: f64) -> Result<Self, ConfigError> {
        let config = Self {
            max_samples,
            fovea_size,
            seed: None,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_samples < 1 {
            return Err(ConfigError::MaxSamples(self.max_samples));
        }
        // Written so that NaN fails too.
        if !(self.fovea_size > 0.0 && self.fovea_size <= 1.0) {
            return Err(ConfigError::FoveaSize(self.fovea_size));
        }
        Ok(())
    }
}

/// How a brightness value is rendered for people.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BrightnessFormat {
    /// `0.1234`
    #[default]
    Decimal,
    /// `12.34%`
    Percentage,
}

impl BrightnessFormat {
    pub fn render(self, brightness: f64) -> String {
        match self {
            Self::Decimal => format!("{brightness:.4}"),
            Self::Percentage => format!("{:.2}%", brightness * 100.0),
        }
    }
}

/// Sleep intervals used when no display is pacing the loop.
#[derive(Debug, Clone, PartialEq)]
pub struct PacingConfig {
    /// Used while running when the source reports no usable frame rate.
    pub fallback_interval: Duration,
    /// Used while paused, so control signals stay responsive without spinning.
    pub paused_interval: Duration,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            fallback_interval: DEFAULT_FALLBACK_INTERVAL,
            paused_interval: DEFAULT_PAUSED_INTERVAL,
        }
    }
}

impl PacingConfig {
    /// Interval between frames while running at the source's nominal rate.
    pub fn running_interval(&self, fps: f64) -> Duration {
        if fps.is_finite() && fps > 0.0 {
            Duration::from_secs_f64(1.0 / fps)
        } else {
            self.fallback_interval
        }
    }
}

/// Everything a `PlaybackSession` needs, validated once up front.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackConfig {
    pub sampling: SamplingConfig,
    /// Whether a display collaborator is expected to present frames.
    pub display: bool,
    /// Whether the display draws the brightness overlay.
    pub overlay: bool,
    pub format: BrightnessFormat,
    pub pacing: PacingConfig,
    /// Number of per-frame values retained for the session statistics.
    pub history_capacity: usize,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            sampling: SamplingConfig::default(),
            display: true,
            overlay: true,
            format: BrightnessFormat::default(),
            pacing: PacingConfig::default(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

impl PlaybackConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.sampling.validate()?;
        if self.history_capacity < 1 {
            return Err(ConfigError::HistoryCapacity);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(PlaybackConfig::default().validate().is_ok());
        let sampling = SamplingConfig::default();
        assert_eq!(sampling.max_samples, 100);
        assert_eq!(sampling.fovea_size, 0.4);
    }

    #[test]
    fn rejects_zero_samples() {
        assert_eq!(
            SamplingConfig::new(0, 0.4),
            Err(ConfigError::MaxSamples(0))
        );
    }

    #[test]
    fn rejects_fovea_outside_unit_interval() {
        assert_eq!(SamplingConfig::new(100, 0.0), Err(ConfigError::FoveaSize(0.0)));
        assert_eq!(SamplingConfig::new(100, 1.5), Err(ConfigError::FoveaSize(1.5)));
        assert!(SamplingConfig::new(100, -0.2).is_err());
        assert!(SamplingConfig::new(100, f64::NAN).is_err());
        assert!(SamplingConfig::new(100, 1.0).is_ok());
    }

    #[test]
    fn playback_config_checks_sampling_and_history() {
        let mut config = PlaybackConfig::default();
        config.sampling.fovea_size = 1.5;
        assert!(config.validate().is_err());

        let mut config = PlaybackConfig::default();
        config.history_capacity = 0;
        assert_eq!(config.validate(), Err(ConfigError::HistoryCapacity));
    }

    #[test]
    fn renders_decimal_and_percentage() {
        assert_eq!(BrightnessFormat::Decimal.render(0.52341), "0.5234");
        assert_eq!(BrightnessFormat::Percentage.render(0.52341), "52.34%");
    }

    #[test]
    fn running_interval_falls_back_on_bad_fps() {
        let pacing = PacingConfig::default();
        assert_eq!(pacing.running_interval(25.0), Duration::from_millis(40));
        assert_eq!(pacing.running_interval(0.0), Duration::from_millis(33));
        assert_eq!(pacing.running_interval(-1.0), Duration::from_millis(33));
        assert_eq!(pacing.running_interval(f64::NAN), Duration::from_millis(33));
    }
}
