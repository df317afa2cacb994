//! # Video Processing Module
//!
//! Frame buffers, ffmpeg-backed decoding and encoding, and the audio remux stage.

pub mod compositor;
pub mod loader;
pub mod process;
pub mod remux;
pub mod types;

pub use compositor::{intermediate_path, FfmpegEncoder};
pub use loader::{FfmpegDecoder, VideoLoader};
pub use remux::{finalize_output, AudioMuxer, FfmpegMuxer, RemuxOutcome, VideoOnlyReason};
pub use types::{Frame, FrameSink, FrameSource, VideoMetadata};
