// The brightness engine, leaves first: a `Pixel` knows its own luminance, a
// `FrameBuffer` is a validated view over decoded bytes, the `sampler` decides
// where to look, `luminance` combines what it sees, and the `SampleCache` keeps
// the sampling work to once per session.

pub mod frame;
pub mod history;
pub mod luminance;
pub mod pixel;
pub mod sample_cache;
pub mod sampler;
