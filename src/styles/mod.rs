//! # Annotation Drawing
//!
//! This module paints annotations onto decoded frames. Each annotation combines
//! a marker shape with a caption layout, and both are drawn straight into the
//! frame buffer.
//!
//! ## Markers
//!
//! - **Dot**: Filled disc in the annotation color with a white ring
//! - **Arrow**: Arrow pointing into the position from up and to the left
//! - **Pin**: Round head above the position, joined by a stem to a diamond
//!
//! ## Captions
//!
//! - **Label**: Text beside the marker on a translucent panel with an accent strip
//! - **Callout**: Bordered box offset from the marker with a leader line
//! - **Headline**: Lower-third bar, stacked upward by rank
//!
//! ## Usage
//!
//! ```rust,no_run
//! use video_annotator::annotation::Annotation;
//! use video_annotator::styles::AnnotationRenderer;
//! use video_annotator::video::Frame;
//!
//! let renderer = AnnotationRenderer::default();
//! let mut frame = Frame::new_black(1280, 720);
//!
//! let mut ann = Annotation::new(1, 640.0, 360.0, 0.0);
//! ann.text = "Look here".to_string();
//! let resolved = ann.resolve().unwrap();
//!
//! renderer.draw(&mut frame, &resolved, 0);
//! ```

pub mod canvas;
pub mod marker;
pub mod presentation;
pub mod renderer;
pub mod text;

pub use canvas::{clamp_to_frame, Point};
pub use presentation::{Caption, Rect};
pub use renderer::{AnnotationRenderer, Placement};
pub use text::{shorten, FontSpec};
