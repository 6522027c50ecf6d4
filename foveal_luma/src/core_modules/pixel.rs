// THEORY (single-pixel luminance):
// The `Pixel` module is the most fundamental unit of the brightness engine. It is
// a "dumb" data container for one red-green-blue triple plus the one heuristic
// that can be computed from that pixel alone: its WCAG relative luminance.
//
// Channel order is fixed here. Whatever order a decoder delivers (OpenCV hands
// out BGR, the `image` crate hands out RGB), the bytes are mapped into named
// `red`/`green`/`blue` fields before anything is weighted. That mapping lives in
// `frame::PixelLayout`, so this module never has to guess.
//
// Order of operations matters for numeric parity with reference output: every
// channel is first normalized to 0..1 by dividing by 255, and only then weighted.
// Weighting the raw bytes and dividing the sum afterwards yields slightly
// different floating point results.

pub mod pixel {
    pub type Channel = u8;
    pub type NormalizedChannel = f64;
    pub type Luminance = f64;

    /// WCAG weight of the red channel.
    pub const RED_WEIGHT: f64 = 0.2126;
    /// WCAG weight of the green channel.
    pub const GREEN_WEIGHT: f64 = 0.7152;
    /// WCAG weight of the blue channel.
    pub const BLUE_WEIGHT: f64 = 0.0722;

    const CHANNEL_MAX: NormalizedChannel = Channel::MAX as NormalizedChannel;

    /// A single pixel with its channels already in red-green-blue order.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Pixel {
        /// The red channel value (0-255).
        pub red: Channel,
        /// The green channel value (0-255).
        pub green: Channel,
        /// The blue channel value (0-255).
        pub blue: Channel,
    }

    impl Pixel {
        pub fn new(red: Channel, green: Channel, blue: Channel) -> Self {
            Self { red, green, blue }
        }

        #[inline]
        fn normalize(channel: Channel) -> NormalizedChannel {
            channel as NormalizedChannel / CHANNEL_MAX
        }

        /// The red channel value (0.0-1.0).
        pub fn red_normalized(&self) -> NormalizedChannel {
            Self::normalize(self.red)
        }

        /// The green channel value (0.0-1.0).
        pub fn green_normalized(&self) -> NormalizedChannel {
            Self::normalize(self.green)
        }

        /// The blue channel value (0.0-1.0).
        pub fn blue_normalized(&self) -> NormalizedChannel {
            Self::normalize(self.blue)
        }

        /// WCAG relative luminance in `[0.0, 1.0]`.
        ///
        /// - Weights the normalized channels by 0.2126 / 0.7152 / 0.0722.
        /// - Works on gamma-encoded values as delivered; no linearization.
        pub fn relative_luminance(&self) -> Luminance {
            RED_WEIGHT * self.red_normalized()
                + GREEN_WEIGHT * self.green_normalized()
                + BLUE_WEIGHT * self.blue_normalized()
        }
    }

    impl From<[Channel; 3]> for Pixel {
        fn from([red, green, blue]: [Channel; 3]) -> Self {
            Pixel::new(red, green, blue)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::pixel::*;

    #[test]
    fn black_has_zero_luminance() {
        assert_eq!(Pixel::new(0, 0, 0).relative_luminance(), 0.0);
    }

    #[test]
    fn white_has_unit_luminance() {
        let white = Pixel::new(255, 255, 255).relative_luminance();
        assert!((white - 1.0).abs() < 1e-12, "got {white}");
    }

    #[test]
    fn each_primary_carries_its_weight() {
        assert!((Pixel::new(255, 0, 0).relative_luminance() - RED_WEIGHT).abs() < 1e-12);
        assert!((Pixel::new(0, 255, 0).relative_luminance() - GREEN_WEIGHT).abs() < 1e-12);
        assert!((Pixel::new(0, 0, 255).relative_luminance() - BLUE_WEIGHT).abs() < 1e-12);
    }

    #[test]
    fn normalizes_before_weighting() {
        let pixel = Pixel::from([51, 102, 204]);
        let expected = RED_WEIGHT * (51.0 / 255.0)
            + GREEN_WEIGHT * (102.0 / 255.0)
            + BLUE_WEIGHT * (204.0 / 255.0);
        assert_eq!(pixel.relative_luminance(), expected);
    }
}
