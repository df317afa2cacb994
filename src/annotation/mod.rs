//! # Annotation Model
//!
//! Caller-supplied annotation records, the color/contrast resolver that turns their
//! style fields into drawing parameters, and the timeline that decides which
//! annotations are visible in a given frame.

pub mod color;
pub mod timeline;
pub mod types;

pub use color::{Bgr, Contrast};
pub use timeline::{ActiveAnnotation, ActiveWindow, Timeline};
pub use types::{load_annotations, Annotation, FontWeight, MarkerType, ResolvedAnnotation, TextStyle};
