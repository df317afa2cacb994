//! # Video-Annotator
//!
//! Burn time-anchored markers and captions into a video.
//!
//! This library takes a source video and a list of annotations, each with a
//! position, a display window, a marker shape and a caption style, and renders a
//! new video with the annotations drawn into every frame they are active on. The
//! source audio is copied into the result when requested.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use video_annotator::{
//!     annotation::{load_annotations, Annotation},
//!     composition::RenderEngine,
//!     config::Config,
//! };
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut annotations = load_annotations("annotations.json")?;
//! annotations.push(Annotation::new(99, 640.0, 360.0, 2.5));
//!
//! let engine = RenderEngine::new(Config::default());
//! let output = engine.render("clip.mp4", "clip_annotated.mp4", &annotations, true)?;
//! println!("Wrote {}", output.display());
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//!
//! - [`annotation`] - Annotation model, color resolution and the active-window timeline
//! - [`styles`] - Marker and caption drawing
//! - [`video`] - Frame buffers, ffmpeg decoding and encoding, audio remux
//! - [`composition`] - Frame pipeline and the render engine
//! - [`config`] - Configuration management
//!
//! ## Custom Frame Sources
//!
//! The frame pipeline reads from any [`FrameSource`](video::FrameSource) and
//! writes to any [`FrameSink`](video::FrameSink), so annotations can be drawn on
//! frames that never touch ffmpeg:
//!
//! ```rust,no_run
//! use video_annotator::error::Result;
//! use video_annotator::video::{Frame, FrameSource, VideoMetadata};
//!
//! struct Slideshow {
//!     metadata: VideoMetadata,
//!     slides: Vec<Frame>,
//! }
//!
//! impl FrameSource for Slideshow {
//!     fn metadata(&self) -> &VideoMetadata {
//!         &self.metadata
//!     }
//!
//!     fn read_frame(&mut self, frame: &mut Frame) -> Result<bool> {
//!         match self.slides.pop() {
//!             Some(slide) => {
//!                 *frame = slide;
//!                 Ok(true)
//!             }
//!             None => Ok(false),
//!         }
//!     }
//!
//!     fn close(self) -> Result<()> {
//!         Ok(())
//!     }
//! }
//! ```

pub mod annotation;
pub mod composition;
pub mod config;
pub mod error;
pub mod styles;
pub mod video;

// Re-export commonly used types for convenience
pub use crate::{
    annotation::{Annotation, Timeline},
    composition::RenderEngine,
    config::Config,
    error::{AnnotatorError, Result},
    styles::AnnotationRenderer,
};
