//! Caption layouts: a label beside the marker, a callout box tied to it by a
//! leader line, and a lower-third headline bar.
//!
//! Each layout returns the rectangle its background panel covers. The rectangle
//! is not clipped, so headlines stacked past the top edge report negative rows.

use crate::annotation::Bgr;
use crate::video::Frame;

use super::canvas::{self, clamp_range, Point};
use super::text::{draw_text, text_size, FontSpec};

/// Distance kept between a label and the frame edge
const LABEL_MARGIN: i32 = 10;
const LABEL_PADDING: i32 = 5;
/// Width of the colored strip on a label's leading edge
const LABEL_ACCENT_WIDTH: i32 = 4;

const CALLOUT_PADDING: i32 = 10;
const CALLOUT_MARGIN: i32 = 20;
/// Callout box offset from the marker, right and up
const CALLOUT_OFFSET: Point = (40, -40);
const CALLOUT_BORDER: i32 = 2;

const HEADLINE_INSET: i32 = 20;
const HEADLINE_BOTTOM_MARGIN: i32 = 50;
const HEADLINE_MIN_HEIGHT: i32 = 40;
const HEADLINE_GAP: i32 = 10;
const HEADLINE_ACCENT_WIDTH: i32 = 5;
const HEADLINE_TEXT_INDENT: i32 = 14;

/// Inclusive pixel rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Rect {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> i32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> i32 {
        self.y2 - self.y1
    }

    pub fn contains(&self, point: Point) -> bool {
        (self.x1..=self.x2).contains(&point.0) && (self.y1..=self.y2).contains(&point.1)
    }
}

/// Text and colors shared by all caption layouts
#[derive(Debug, Clone, Copy)]
pub struct Caption<'a> {
    pub text: &'a str,
    pub font: FontSpec,
    /// Annotation color, used for borders and accents
    pub accent: Bgr,
    pub text_color: Bgr,
    pub panel: Bgr,
    /// Panel alpha over the video
    pub opacity: f32,
}

/// Text floating to the right of the marker on a translucent panel
pub fn draw_label(frame: &mut Frame, caption: &Caption<'_>, anchor: Point, marker_size: i32) -> Rect {
    let (w, h) = (frame.width() as i32, frame.height() as i32);
    let (tw, th) = text_size(caption.text, caption.font);

    let tx = clamp_range(anchor.0 + marker_size + LABEL_MARGIN, LABEL_MARGIN, w - tw - LABEL_MARGIN);
    let ty = clamp_range(anchor.1, th + LABEL_MARGIN, h - LABEL_MARGIN);

    let panel = Rect::new(
        tx - LABEL_PADDING,
        ty - th - LABEL_PADDING,
        tx + tw + LABEL_PADDING,
        ty + LABEL_PADDING,
    );
    canvas::blend_rect(frame, panel.x1, panel.y1, panel.x2, panel.y2, caption.panel, caption.opacity);
    canvas::fill_rect(
        frame,
        panel.x1,
        panel.y1,
        panel.x1 + LABEL_ACCENT_WIDTH - 1,
        panel.y2,
        caption.accent,
    );
    draw_text(frame, caption.text, (tx, ty), caption.font, caption.text_color);
    panel
}

/// Bordered box up and to the right of the marker, with a line back to it
pub fn draw_callout(frame: &mut Frame, caption: &Caption<'_>, anchor: Point) -> Rect {
    let (w, h) = (frame.width() as i32, frame.height() as i32);
    let (tw, th) = text_size(caption.text, caption.font);
    let box_w = tw + 2 * CALLOUT_PADDING;
    let box_h = th + 2 * CALLOUT_PADDING;

    let bx = clamp_range(anchor.0 + CALLOUT_OFFSET.0, CALLOUT_MARGIN, w - box_w - CALLOUT_MARGIN);
    let by = clamp_range(anchor.1 + CALLOUT_OFFSET.1, CALLOUT_MARGIN, h - box_h - CALLOUT_MARGIN);

    let panel = Rect::new(bx, by, bx + box_w, by + box_h);
    canvas::blend_rect(frame, panel.x1, panel.y1, panel.x2, panel.y2, caption.panel, caption.opacity);
    canvas::stroke_rect(frame, panel.x1, panel.y1, panel.x2, panel.y2, caption.accent, CALLOUT_BORDER);
    canvas::draw_line(frame, (bx, by + box_h / 2), anchor, caption.accent, CALLOUT_BORDER);
    draw_text(
        frame,
        caption.text,
        (bx + CALLOUT_PADDING, by + CALLOUT_PADDING + th),
        caption.font,
        caption.text_color,
    );
    panel
}

/// Vertical distance between stacked headline bars for a font
pub fn headline_step(font: FontSpec) -> i32 {
    headline_height(font) + HEADLINE_GAP
}

fn headline_height(font: FontSpec) -> i32 {
    (font.line_height() + 24).max(HEADLINE_MIN_HEIGHT)
}

/// Full-width bar above the bottom edge; each rank sits one bar higher
pub fn draw_headline(frame: &mut Frame, caption: &Caption<'_>, rank: usize) -> Rect {
    let (w, h) = (frame.width() as i32, frame.height() as i32);
    let (_, th) = text_size(caption.text, caption.font);
    let bar_h = headline_height(caption.font);

    let rank = i32::try_from(rank).unwrap_or(i32::MAX);
    let bottom = (h - HEADLINE_BOTTOM_MARGIN).saturating_sub(rank.saturating_mul(headline_step(caption.font)));
    let panel = Rect::new(HEADLINE_INSET, bottom.saturating_sub(bar_h), w - HEADLINE_INSET, bottom);
    if bottom < 0 {
        return panel;
    }

    canvas::blend_rect(frame, panel.x1, panel.y1, panel.x2, panel.y2, caption.panel, caption.opacity);
    canvas::fill_rect(
        frame,
        panel.x1,
        panel.y1,
        panel.x1 + HEADLINE_ACCENT_WIDTH - 1,
        panel.y2,
        caption.accent,
    );
    draw_text(
        frame,
        caption.text,
        (panel.x1 + HEADLINE_TEXT_INDENT, bottom - (bar_h - th) / 2),
        caption.font,
        caption.text_color,
    );
    panel
}

#[cfg(test)]
mod tests {
    use super::*;

    const GREY: Bgr = Bgr([100, 100, 100]);
    const ACCENT: Bgr = Bgr::from_rgb(0, 200, 0);

    fn caption(text: &str) -> Caption<'_> {
        Caption {
            text,
            font: FontSpec::new(2, 2),
            accent: ACCENT,
            text_color: Bgr::WHITE,
            panel: Bgr::BLACK,
            opacity: 0.7,
        }
    }

    #[test]
    fn test_label_sits_right_of_marker() {
        let mut frame = Frame::new_filled(640, 480, GREY);
        let panel = draw_label(&mut frame, &caption("Hello"), (100, 200), 16);

        // tx = 100 + 16 + 10, ty = 200, text 81x16
        assert_eq!(panel, Rect::new(121, 179, 212, 205));
        assert_eq!(frame.get_pixel(121, 190), ACCENT);
        // Panel is blended, so the grey background still shows through
        assert_eq!(frame.get_pixel(210, 203), Bgr([30, 30, 30]));
        assert_eq!(frame.get_pixel(220, 203), GREY);
    }

    #[test]
    fn test_label_clamped_inside_frame() {
        let mut frame = Frame::new_filled(320, 240, GREY);
        let panel = draw_label(&mut frame, &caption("Edge"), (319, 0), 16);

        assert!(panel.x1 >= 0 && panel.x2 < 320, "{:?}", panel);
        assert!(panel.y1 >= 0 && panel.y2 < 240, "{:?}", panel);
    }

    #[test]
    fn test_callout_box_fits_text_and_stays_inside() {
        let mut frame = Frame::new_filled(640, 480, GREY);
        let c = caption("Look here");
        let (tw, th) = text_size(c.text, c.font);

        let panel = draw_callout(&mut frame, &c, (100, 200));
        assert_eq!(panel, Rect::new(140, 160, 140 + tw + 20, 160 + th + 20));
        assert_eq!(frame.get_pixel(140, 170), ACCENT);

        let mut frame = Frame::new_filled(640, 480, GREY);
        let panel = draw_callout(&mut frame, &c, (639, 0));
        assert!(panel.x1 >= 20 && panel.x2 <= 620, "{:?}", panel);
        assert!(panel.y1 >= 20 && panel.y2 <= 460, "{:?}", panel);
    }

    #[test]
    fn test_callout_leader_line_reaches_marker() {
        let mut frame = Frame::new_filled(640, 480, GREY);
        draw_callout(&mut frame, &caption("Here"), (300, 300));
        assert_eq!(frame.get_pixel(300, 300), ACCENT);
    }

    #[test]
    fn test_headline_spans_width_and_stacks_by_rank() {
        let mut frame = Frame::new_filled(640, 480, GREY);
        let c = caption("Breaking");

        let first = draw_headline(&mut frame, &c, 0);
        let second = draw_headline(&mut frame, &c, 1);

        assert_eq!((first.x1, first.x2), (20, 620));
        assert_eq!(first.y2, 430);
        assert_eq!(first.height(), 40);
        assert_eq!(second.y2, first.y2 - headline_step(c.font));
        assert!(second.y2 < first.y1, "bars overlap: {:?} {:?}", first, second);
        assert_eq!(frame.get_pixel(22, 420), ACCENT);
    }

    #[test]
    fn test_headline_with_huge_rank_does_not_overflow() {
        let mut frame = Frame::new_filled(64, 48, GREY);
        let panel = draw_headline(&mut frame, &caption("x"), usize::MAX);
        assert!(panel.y2 < 0);
        assert_eq!(frame.get_pixel(30, 30), GREY);
    }

    #[test]
    fn test_rect_contains() {
        let rect = Rect::new(0, 0, 10, 5);
        assert!(rect.contains((10, 5)));
        assert!(!rect.contains((11, 5)));
        assert_eq!((rect.width(), rect.height()), (10, 5));
    }
}
