// THEORY:
// A `Frame` is one decoded picture as handed over by a video source; a
// `FrameBuffer` is the read-only, validated view the estimator works on.
//
// The split exists so that geometry is checked once, when the view is created:
// a `FrameBuffer` always holds exactly `width * height * bytes_per_pixel` bytes,
// so per-sample reads never need bounds handling beyond coordinate clamping.
// Sources that deliver something else (a truncated buffer, a zero-sized frame)
// are reported as `MalformedFrame` at the tick boundary instead of panicking in
// the middle of a luminance sum.

use image::RgbImage;

use crate::core_modules::pixel::pixel::Pixel;
use crate::error::{BrightnessError, Result};

/// Byte order of the channels in a pixel buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelLayout {
    Rgb,
    Bgr,
    Rgba,
    Bgra,
}

impl PixelLayout {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgb | Self::Bgr => 3,
            Self::Rgba | Self::Bgra => 4,
        }
    }

    /// Maps one pixel's bytes to red-green-blue. Alpha is ignored.
    #[inline]
    pub fn pixel(self, bytes: &[u8]) -> Pixel {
        match self {
            Self::Rgb | Self::Rgba => Pixel::new(bytes[0], bytes[1], bytes[2]),
            Self::Bgr | Self::Bgra => Pixel::new(bytes[2], bytes[1], bytes[0]),
        }
    }
}

/// An owned, decoded video frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    width: u32,
    height: u32,
    layout: PixelLayout,
    data: Vec<u8>,
}

impl Frame {
    pub fn new(width: u32, height: u32, layout: PixelLayout, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            layout,
            data,
        }
    }

    /// A frame filled with a single color, mostly useful for tests and probes.
    pub fn solid(width: u32, height: u32, pixel: Pixel) -> Self {
        let count = width as usize * height as usize;
        let mut data = Vec::with_capacity(count * 3);
        for _ in 0..count {
            data.extend_from_slice(&[pixel.red, pixel.green, pixel.blue]);
        }
        Self::new(width, height, PixelLayout::Rgb, data)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn layout(&self) -> PixelLayout {
        self.layout
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Borrows the frame as a validated `FrameBuffer`.
    pub fn view(&self) -> Result<FrameBuffer<'_>> {
        FrameBuffer::new(self.width, self.height, self.layout, &self.data)
    }
}

impl From<RgbImage> for Frame {
    fn from(image: RgbImage) -> Self {
        let (width, height) = image.dimensions();
        Self::new(width, height, PixelLayout::Rgb, image.into_raw())
    }
}

/// A read-only view of one frame whose byte length matches its geometry.
#[derive(Debug, Clone, Copy)]
pub struct FrameBuffer<'a> {
    width: u32,
    height: u32,
    layout: PixelLayout,
    data: &'a [u8],
}

impl<'a> FrameBuffer<'a> {
    pub fn new(width: u32, height: u32, layout: PixelLayout, data: &'a [u8]) -> Result<Self> {
        let expected = width as usize * height as usize * layout.bytes_per_pixel();
        if width == 0 || height == 0 || data.len() != expected {
            return Err(BrightnessError::MalformedFrame {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            layout,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn layout(&self) -> PixelLayout {
        self.layout
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Reads the pixel at `(x, y)`, clamping both coordinates into the frame.
    #[inline]
    pub fn pixel_at(&self, x: u32, y: u32) -> Pixel {
        let x = x.min(self.width - 1) as usize;
        let y = y.min(self.height - 1) as usize;
        let bpp = self.layout.bytes_per_pixel();
        let start = (y * self.width as usize + x) * bpp;
        self.layout.pixel(&self.data[start..start + bpp])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bgr_bytes_are_reordered() {
        let data = [10u8, 20, 30];
        let view = FrameBuffer::new(1, 1, PixelLayout::Bgr, &data).unwrap();
        assert_eq!(view.pixel_at(0, 0), Pixel::new(30, 20, 10));
    }

    #[test]
    fn alpha_layouts_skip_the_fourth_byte() {
        // Two BGRA pixels: pure blue, then pure red.
        let data = [255u8, 0, 0, 255, 0, 0, 255, 255];
        let view = FrameBuffer::new(2, 1, PixelLayout::Bgra, &data).unwrap();
        assert_eq!(view.pixel_at(0, 0), Pixel::new(0, 0, 255));
        assert_eq!(view.pixel_at(1, 0), Pixel::new(255, 0, 0));
    }

    #[test]
    fn out_of_range_coordinates_are_clamped() {
        let frame = Frame::new(2, 2, PixelLayout::Rgb, vec![
            0, 0, 0, 1, 1, 1,
            2, 2, 2, 3, 3, 3,
        ]);
        let view = frame.view().unwrap();
        assert_eq!(view.pixel_at(99, 99), Pixel::new(3, 3, 3));
        assert_eq!(view.pixel_at(5, 0), Pixel::new(1, 1, 1));
    }

    #[test]
    fn short_buffers_are_malformed() {
        let frame = Frame::new(4, 4, PixelLayout::Rgb, vec![0; 10]);
        match frame.view() {
            Err(BrightnessError::MalformedFrame { expected, actual, .. }) => {
                assert_eq!(expected, 48);
                assert_eq!(actual, 10);
            }
            other => panic!("expected MalformedFrame, got {other:?}"),
        }
    }

    #[test]
    fn empty_frames_are_malformed() {
        assert!(FrameBuffer::new(0, 10, PixelLayout::Rgb, &[]).is_err());
    }

    #[test]
    fn converts_from_rgb_image() {
        let image = RgbImage::from_pixel(3, 2, image::Rgb([1, 2, 3]));
        let frame = Frame::from(image);
        assert_eq!((frame.width(), frame.height()), (3, 2));
        assert_eq!(frame.layout(), PixelLayout::Rgb);
        assert_eq!(frame.view().unwrap().pixel_at(2, 1), Pixel::new(1, 2, 3));
    }
}
