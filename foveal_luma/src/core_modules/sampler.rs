// THEORY:
// The `sampler` decides *where* the engine looks. Measuring every pixel of every
// frame is wasteful when the goal is a single perceived-brightness number, so we
// mimic the human eye instead: a dense cluster of samples in the fovea (the frame
// center) and a sparse scattering over the periphery.
//
// Key architectural principles:
// 1.  **Fixed budget**: Exactly `max_samples` points come out, always. 70% go to
//     the fovea, the remainder to the periphery.
// 2.  **Uniform area, not uniform radius**: Fovea radii are drawn as
//     `sqrt(u) * R`. Drawing `u * R` directly would pile samples up at the very
//     center, because a thin ring near the middle has far less area than one
//     near the edge.
// 3.  **Bounded rejection**: Periphery points are drawn uniformly over the frame
//     and rejected while they land inside the fovea ellipse. After
//     `PERIPHERY_MAX_ATTEMPTS` misses the point is placed on a ring just outside
//     the fovea. This only relaxes *where* that point lands, never whether it is
//     produced, so generation always terminates with a full set even when the
//     fovea covers most of the frame.
// 4.  **Explicit randomness**: The random source is a parameter. The function is
//     otherwise pure, which keeps it reproducible under a seeded `StdRng`.

use std::f64::consts::{SQRT_2, TAU};

use rand::Rng;
use tracing::debug;

use crate::error::{BrightnessError, Result};

/// Share of the sample budget spent inside the fovea.
pub const FOVEA_SHARE: f64 = 0.7;
/// Rejection-sampling attempts per periphery point before falling back to the ring.
pub const PERIPHERY_MAX_ATTEMPTS: usize = 20;
/// Radius of the fallback ring, relative to the fovea's minor radius.
pub const FALLBACK_RING_SCALE: f64 = 1.2;

/// An integer pixel coordinate inside a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SamplePoint {
    pub x: u32,
    pub y: u32,
}

/// The ordered set of coordinates sampled on every frame of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleSet {
    points: Vec<SamplePoint>,
}

impl SampleSet {
    pub fn points(&self) -> &[SamplePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SamplePoint> {
        self.points.iter()
    }
}

impl From<Vec<SamplePoint>> for SampleSet {
    fn from(points: Vec<SamplePoint>) -> Self {
        Self { points }
    }
}

impl<'a> IntoIterator for &'a SampleSet {
    type Item = &'a SamplePoint;
    type IntoIter = std::slice::Iter<'a, SamplePoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// Geometry of the central region for one frame size.
#[derive(Debug, Clone, Copy)]
struct Fovea {
    center_x: f64,
    center_y: f64,
    /// Radius of the disc the fovea samples are drawn from.
    disc_radius: f64,
    /// Horizontal semi-axis of the ellipse the periphery must avoid. At
    /// `fovea_size = 1.0` the ellipse passes through the frame corners.
    radius_x: f64,
    /// Vertical semi-axis of the ellipse the periphery must avoid.
    radius_y: f64,
}

impl Fovea {
    fn new(width: u32, height: u32, fovea_size: f64) -> Self {
        let (width, height) = (width as f64, height as f64);
        Self {
            center_x: width / 2.0,
            center_y: height / 2.0,
            disc_radius: width.min(height) * fovea_size / 2.0,
            radius_x: width * fovea_size / SQRT_2,
            radius_y: height * fovea_size / SQRT_2,
        }
    }

    /// Normalized ellipse test; the boundary itself counts as outside.
    fn contains(&self, x: f64, y: f64) -> bool {
        let dx = (x - self.center_x) / self.radius_x;
        let dy = (y - self.center_y) / self.radius_y;
        dx * dx + dy * dy < 1.0
    }

    fn fallback_ring_radius(&self) -> f64 {
        FALLBACK_RING_SCALE * self.radius_x.min(self.radius_y)
    }

    fn polar(&self, radius: f64, angle: f64) -> (f64, f64) {
        (
            self.center_x + radius * angle.cos(),
            self.center_y + radius * angle.sin(),
        )
    }
}

/// Truncates to integers and clamps each coordinate into the frame.
fn to_point(x: f64, y: f64, width: u32, height: u32) -> SamplePoint {
    let clamp = |value: f64, limit: u32| (value as i64).clamp(0, limit as i64 - 1) as u32;
    SamplePoint {
        x: clamp(x, width),
        y: clamp(y, height),
    }
}

/// Generates a foveated sample set of exactly `max_samples` points.
///
/// `max_samples` and `fovea_size` are expected to have passed
/// `SamplingConfig::validate`; a zero-sized frame is rejected here because no
/// valid coordinate exists for it.
pub fn generate<R: Rng + ?Sized>(
    width: u32,
    height: u32,
    max_samples: usize,
    fovea_size: f64,
    rng: &mut R,
) -> Result<SampleSet> {
    generate_counted(width, height, max_samples, fovea_size, rng).map(|(set, _)| set)
}

/// Like `generate`, also returning how many periphery points came from the ring.
fn generate_counted<R: Rng + ?Sized>(
    width: u32,
    height: u32,
    max_samples: usize,
    fovea_size: f64,
    rng: &mut R,
) -> Result<(SampleSet, usize)> {
    if width == 0 || height == 0 {
        return Err(BrightnessError::InvalidDimensions { width, height });
    }

    let fovea = Fovea::new(width, height, fovea_size);
    let fovea_count = (max_samples as f64 * FOVEA_SHARE).floor() as usize;
    let periphery_count = max_samples - fovea_count;
    let mut points = Vec::with_capacity(max_samples);

    for _ in 0..fovea_count {
        let angle = rng.gen_range(0.0..TAU);
        let radius = rng.r#gen::<f64>().sqrt() * fovea.disc_radius;
        let (x, y) = fovea.polar(radius, angle);
        points.push(to_point(x, y, width, height));
    }

    let mut fallbacks = 0usize;
    for _ in 0..periphery_count {
        let accepted = (0..PERIPHERY_MAX_ATTEMPTS).find_map(|_| {
            let x = rng.gen_range(0.0..width as f64);
            let y = rng.gen_range(0.0..height as f64);
            (!fovea.contains(x, y)).then_some((x, y))
        });
        let (x, y) = accepted.unwrap_or_else(|| {
            fallbacks += 1;
            fovea.polar(fovea.fallback_ring_radius(), rng.gen_range(0.0..TAU))
        });
        points.push(to_point(x, y, width, height));
    }

    debug!(
        width,
        height,
        fovea_count,
        periphery_count,
        fallbacks,
        "generated foveated sample set"
    );
    Ok((SampleSet::from(points), fallbacks))
}
