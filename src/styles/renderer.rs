use tracing::trace;

use crate::annotation::{ResolvedAnnotation, TextStyle};
use crate::config::RenderConfig;
use crate::video::Frame;

use super::canvas::{clamp_to_frame, Point};
use super::marker::draw_marker;
use super::presentation::{draw_callout, draw_headline, draw_label, Caption, Rect};
use super::text::{shorten, FontSpec};

/// Where an annotation ended up on the frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Marker center after clamping
    pub anchor: Point,
    /// Caption background panel
    pub panel: Rect,
}

/// Paints one annotation (marker plus caption) onto a frame
#[derive(Debug, Clone)]
pub struct AnnotationRenderer {
    config: RenderConfig,
}

impl AnnotationRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Draw `annotation` at its stacking `rank` among the annotations active on this frame.
    ///
    /// The marker position is clamped into the frame first, so a marker is always
    /// visible even when authored off-screen.
    pub fn draw(&self, frame: &mut Frame, annotation: &ResolvedAnnotation, rank: usize) -> Placement {
        let anchor = clamp_to_frame(annotation.position, frame.width(), frame.height());
        // Nothing larger than the frame is visible anyway
        let longest_edge = frame.width().max(frame.height()).clamp(1, i32::MAX as u32 / 4) as i32;
        let marker_size = annotation.marker_size.min(longest_edge);
        draw_marker(frame, annotation.marker, anchor, marker_size, annotation.color);

        let text = shorten(&annotation.text, self.config.max_text_chars);
        let opacity = match annotation.style {
            TextStyle::Callout => self.config.callout_opacity,
            TextStyle::Label | TextStyle::Headline => self.config.panel_opacity,
        };
        let caption = Caption {
            text: &text,
            font: FontSpec::for_style(annotation.style, annotation.text_size, annotation.font_weight),
            accent: annotation.color,
            text_color: annotation.text_color,
            panel: annotation.contrast.panel_color(annotation.style),
            opacity,
        };

        let panel = match annotation.style {
            TextStyle::Label => draw_label(frame, &caption, anchor, marker_size),
            TextStyle::Callout => draw_callout(frame, &caption, anchor),
            TextStyle::Headline => draw_headline(frame, &caption, rank),
        };

        trace!(
            "Annotation {} ({:?}/{:?}) rank {} at {:?}",
            annotation.id,
            annotation.marker,
            annotation.style,
            rank,
            anchor
        );
        Placement { anchor, panel }
    }
}

impl Default for AnnotationRenderer {
    fn default() -> Self {
        Self::new(RenderConfig::default())
    }
}
