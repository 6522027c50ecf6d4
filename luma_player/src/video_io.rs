// THEORY:
// OpenCV-backed collaborators for the playback loop: a `VideoCapture` source
// that decodes any container OpenCV understands, and a HighGUI window that shows
// each frame with the brightness overlay burnt in and reads the `q`/`p` keys.
//
// OpenCV hands out BGR frames, which the brightness engine reads directly; no
// color conversion happens on the measuring path. Conversion only happens on
// the way back to the window when a frame arrives in another layout.

use std::path::Path;

use foveal_luma::{
    BrightnessError, ControlSignal, Display, Frame, FrameBuffer, OverlayText, PixelLayout,
    SourceInfo, Tick, VideoSource,
};
use opencv::{
    core::{self, Mat, Point, Scalar},
    highgui, imgproc,
    prelude::*,
    videoio::{self, VideoCapture},
};
use tracing::{debug, warn};

pub const WINDOW_NAME: &str = "Video Brightness";

const FONT: i32 = imgproc::FONT_HERSHEY_SIMPLEX;
const HEADLINE_SCALE: f64 = 1.8;
const HEADLINE_THICKNESS: i32 = 4;
const FRAME_LINE_SCALE: f64 = 0.6;
const FRAME_LINE_THICKNESS: i32 = 2;
const BANNER_SCALE: f64 = 0.8;
const BANNER_THICKNESS: i32 = 3;

fn display_error(err: opencv::Error) -> BrightnessError {
    BrightnessError::Display(err.to_string())
}

pub struct OpenCvSource {
    capture: VideoCapture,
    info: SourceInfo,
    frames_read: u64,
    released: bool,
}

impl OpenCvSource {
    pub fn open(path: &Path) -> foveal_luma::Result<Self> {
        let location = path
            .to_str()
            .ok_or_else(|| BrightnessError::source_open(path, "path is not valid UTF-8"))?;
        let capture = VideoCapture::from_file(location, videoio::CAP_ANY)
            .map_err(|e| BrightnessError::source_open(path, e))?;
        if !capture
            .is_opened()
            .map_err(|e| BrightnessError::source_open(path, e))?
        {
            return Err(BrightnessError::source_open(path, "could not open video file"));
        }

        // Containers without a frame count or rate report zero, which is allowed.
        let property = |id: i32| capture.get(id).unwrap_or(0.0);
        let info = SourceInfo {
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            width: property(videoio::CAP_PROP_FRAME_WIDTH).max(0.0) as u32,
            height: property(videoio::CAP_PROP_FRAME_HEIGHT).max(0.0) as u32,
            fps: property(videoio::CAP_PROP_FPS),
            total_frames: property(videoio::CAP_PROP_FRAME_COUNT).max(0.0) as u64,
        };
        debug!(?info, "opened video");

        Ok(Self {
            capture,
            info,
            frames_read: 0,
            released: false,
        })
    }
}

impl VideoSource for OpenCvSource {
    fn info(&self) -> &SourceInfo {
        &self.info
    }

    fn read_frame(&mut self) -> foveal_luma::Result<Option<Frame>> {
        if self.released {
            return Ok(None);
        }
        let index = self.frames_read;
        let read_error = |e: opencv::Error| BrightnessError::source_read(index, e);

        let mut mat = Mat::default();
        if !self.capture.read(&mut mat).map_err(read_error)? || mat.empty() {
            return Ok(None);
        }
        self.frames_read += 1;

        let size = mat.size().map_err(read_error)?;
        // Captured frames are normally continuous; cloning compacts the rest.
        let data = if mat.is_continuous() {
            mat.data_bytes().map_err(read_error)?.to_vec()
        } else {
            mat.try_clone()
                .and_then(|m| m.data_bytes().map(<[u8]>::to_vec))
                .map_err(read_error)?
        };
        Ok(Some(Frame::new(
            size.width.max(0) as u32,
            size.height.max(0) as u32,
            PixelLayout::Bgr,
            data,
        )))
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        if let Err(err) = self.capture.release() {
            warn!(%err, "failed to release video capture");
        }
        self.released = true;
    }
}

impl Drop for OpenCvSource {
    fn drop(&mut self) {
        self.release();
    }
}

/// A HighGUI window; presenting a frame also polls the keyboard for 1 ms.
pub struct HighGuiDisplay {
    window: String,
    open: bool,
}

impl HighGuiDisplay {
    pub fn new(window: &str) -> foveal_luma::Result<Self> {
        highgui::named_window(window, highgui::WINDOW_AUTOSIZE).map_err(display_error)?;
        Ok(Self {
            window: window.to_owned(),
            open: true,
        })
    }
}

impl Display for HighGuiDisplay {
    fn present(
        &mut self,
        frame: &FrameBuffer<'_>,
        _tick: &Tick,
        overlay: Option<&OverlayText>,
    ) -> foveal_luma::Result<Option<ControlSignal>> {
        let mut image = to_bgr_mat(frame).map_err(display_error)?;
        if let Some(overlay) = overlay {
            draw_overlay(&mut image, overlay).map_err(display_error)?;
        }
        highgui::imshow(&self.window, &image).map_err(display_error)?;

        let key = highgui::wait_key(1).map_err(display_error)?;
        if key < 0 {
            return Ok(None);
        }
        Ok(char::from_u32((key & 0xFF) as u32).and_then(ControlSignal::from_key))
    }

    fn release(&mut self) {
        if !self.open {
            return;
        }
        if let Err(err) = highgui::destroy_window(&self.window) {
            warn!(%err, window = %self.window, "failed to close window");
        }
        self.open = false;
    }
}

impl Drop for HighGuiDisplay {
    fn drop(&mut self) {
        self.release();
    }
}

/// Packs any supported layout into tightly packed BGR bytes.
fn bgr_bytes(frame: &FrameBuffer<'_>) -> Vec<u8> {
    match frame.layout() {
        PixelLayout::Bgr => frame.data().to_vec(),
        layout => frame
            .data()
            .chunks_exact(layout.bytes_per_pixel())
            .flat_map(|bytes| {
                let pixel = layout.pixel(bytes);
                [pixel.blue, pixel.green, pixel.red]
            })
            .collect(),
    }
}

fn to_bgr_mat(frame: &FrameBuffer<'_>) -> opencv::Result<Mat> {
    let mut mat = Mat::new_rows_cols_with_default(
        frame.height() as i32,
        frame.width() as i32,
        core::CV_8UC3,
        Scalar::all(0.0),
    )?;
    mat.data_bytes_mut()?.copy_from_slice(&bgr_bytes(frame));
    Ok(mat)
}

fn draw_overlay(image: &mut Mat, overlay: &OverlayText) -> opencv::Result<()> {
    let mut baseline = 0;
    let text = imgproc::get_text_size(
        &overlay.headline,
        FONT,
        HEADLINE_SCALE,
        HEADLINE_THICKNESS,
        &mut baseline,
    )?;

    // Black backing box so the headline stays readable on bright frames.
    imgproc::rectangle_points(
        image,
        Point::new(15, 15),
        Point::new(25 + text.width, 50 + text.height),
        Scalar::all(0.0),
        imgproc::FILLED,
        imgproc::LINE_8,
        0,
    )?;
    imgproc::put_text(
        image,
        &overlay.headline,
        Point::new(20, 45 + text.height),
        FONT,
        HEADLINE_SCALE,
        Scalar::all(255.0),
        HEADLINE_THICKNESS,
        imgproc::LINE_8,
        false,
    )?;
    imgproc::put_text(
        image,
        &overlay.frame_line,
        Point::new(20, 80 + text.height),
        FONT,
        FRAME_LINE_SCALE,
        Scalar::new(200.0, 200.0, 200.0, 0.0),
        FRAME_LINE_THICKNESS,
        imgproc::LINE_8,
        false,
    )?;
    if let Some(banner) = overlay.paused_banner {
        // Yellow, in BGR.
        imgproc::put_text(
            image,
            banner,
            Point::new(20, 110 + text.height),
            FONT,
            BANNER_SCALE,
            Scalar::new(0.0, 255.0, 255.0, 0.0),
            BANNER_THICKNESS,
            imgproc::LINE_8,
            false,
        )?;
    }
    Ok(())
}
