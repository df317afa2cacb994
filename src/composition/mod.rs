//! # Render Engine
//!
//! The render engine coordinates annotation validation, frame decoding, drawing,
//! encoding, and the final audio remux for one render job.

pub mod engine;
pub mod pipeline;

// Re-exports for convenience
pub use engine::{RenderEngine, RenderJob, RenderReport};
pub use pipeline::{FramePipeline, PipelineState, PipelineStats};
