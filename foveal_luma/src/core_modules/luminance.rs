// THEORY:
// The `luminance` module turns a frame plus a sample set into one number: the
// mean WCAG relative luminance over exactly the sampled pixels.
//
// This is a spatial estimate, not a true pixel average. With a foveated sample
// set it deliberately over-weights the center of the frame, the way a viewer's
// attention does. Because the sample set is reused across a whole session, the
// estimate is also stable from frame to frame: brightness changes reflect the
// picture, not a reshuffled sampling pattern.

use crate::core_modules::frame::FrameBuffer;
use crate::core_modules::pixel::pixel::Luminance;
use crate::core_modules::sampler::SampleSet;

/// Mean relative luminance of the sampled pixels, in `[0.0, 1.0]`.
///
/// Coordinates are clamped into the frame again before reading, so a set that
/// was generated for a larger frame still reads valid pixels. An empty set
/// yields `0.0`.
pub fn estimate(frame: &FrameBuffer<'_>, samples: &SampleSet) -> Luminance {
    if samples.is_empty() {
        return 0.0;
    }

    let total: Luminance = samples
        .iter()
        .map(|point| frame.pixel_at(point.x, point.y).relative_luminance())
        .sum();

    (total / samples.len() as Luminance).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::frame::{Frame, PixelLayout};
    use crate::core_modules::pixel::pixel::Pixel;
    use crate::core_modules::sampler::{self, SamplePoint};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn samples_for(width: u32, height: u32) -> SampleSet {
        sampler::generate(width, height, 100, 0.4, &mut StdRng::seed_from_u64(9)).unwrap()
    }

    #[test]
    fn black_frame_is_zero() {
        let frame = Frame::solid(64, 48, Pixel::new(0, 0, 0));
        assert_eq!(estimate(&frame.view().unwrap(), &samples_for(64, 48)), 0.0);
    }

    #[test]
    fn white_frame_is_one() {
        let frame = Frame::solid(64, 48, Pixel::new(255, 255, 255));
        let value = estimate(&frame.view().unwrap(), &samples_for(64, 48));
        assert!((value - 1.0).abs() < 1e-9, "got {value}");
    }

    #[test]
    fn green_frame_matches_the_green_weight() {
        let frame = Frame::solid(64, 48, Pixel::new(0, 255, 0));
        let value = estimate(&frame.view().unwrap(), &samples_for(64, 48));
        assert!((value - 0.7152).abs() < 1e-9, "got {value}");
    }

    #[test]
    fn bgr_green_is_still_green() {
        let data: Vec<u8> = std::iter::repeat_n([0u8, 255, 0], 16).flatten().collect();
        let view = FrameBuffer::new(4, 4, PixelLayout::Bgr, &data).unwrap();
        let value = estimate(&view, &samples_for(4, 4));
        assert!((value - 0.7152).abs() < 1e-9);
    }

    #[test]
    fn pure_blue_in_bgr_is_not_read_as_red() {
        let data: Vec<u8> = std::iter::repeat_n([255u8, 0, 0], 16).flatten().collect();
        let view = FrameBuffer::new(4, 4, PixelLayout::Bgr, &data).unwrap();
        let value = estimate(&view, &samples_for(4, 4));
        assert!((value - 0.0722).abs() < 1e-9, "got {value}");
    }

    #[test]
    fn repeated_estimates_are_bit_identical() {
        let data: Vec<u8> = (0..64 * 48 * 3).map(|i| (i * 37 % 256) as u8).collect();
        let view = FrameBuffer::new(64, 48, PixelLayout::Rgb, &data).unwrap();
        let samples = samples_for(64, 48);
        assert_eq!(
            estimate(&view, &samples).to_bits(),
            estimate(&view, &samples).to_bits()
        );
    }

    #[test]
    fn only_sampled_pixels_count() {
        // Left column white, right column black; sample only the left column.
        let data = vec![255, 255, 255, 0, 0, 0, 255, 255, 255, 0, 0, 0];
        let view = FrameBuffer::new(2, 2, PixelLayout::Rgb, &data).unwrap();
        let samples = SampleSet::from(vec![SamplePoint { x: 0, y: 0 }, SamplePoint { x: 0, y: 1 }]);
        assert!((estimate(&view, &samples) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn stale_coordinates_are_clamped() {
        let frame = Frame::solid(2, 2, Pixel::new(255, 0, 0));
        let samples = SampleSet::from(vec![SamplePoint { x: 1919, y: 1079 }]);
        assert!((estimate(&frame.view().unwrap(), &samples) - 0.2126).abs() < 1e-12);
    }

    #[test]
    fn empty_sample_set_is_zero() {
        let frame = Frame::solid(2, 2, Pixel::new(255, 255, 255));
        assert_eq!(estimate(&frame.view().unwrap(), &SampleSet::from(Vec::new())), 0.0);
    }
}
