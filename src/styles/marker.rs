use crate::annotation::{Bgr, MarkerType};
use crate::video::Frame;

use super::canvas::{self, Point};

/// Fraction of the arrow shaft used for each barb
const ARROW_TIP_RATIO: f64 = 0.2;
const ARROW_THICKNESS: i32 = 3;
/// Dot drawn on the arrow's target point
const ARROW_HUB_RADIUS: i32 = 5;
const PIN_STEM_THICKNESS: i32 = 2;
const RING_THICKNESS: i32 = 2;

/// Radius of dot and pin heads for a marker size
pub fn head_radius(marker_size: i32) -> i32 {
    (marker_size / 2).max(4)
}

/// Tail of an arrow pointing at `target`, up and to the left of it
pub fn arrow_tail(target: Point, marker_size: i32) -> Point {
    (
        (target.0 - 3 * marker_size).max(0),
        (target.1 - 2 * marker_size).max(0),
    )
}

/// Draw a marker centered on `anchor`, which must already be inside the frame
pub fn draw_marker(frame: &mut Frame, marker: MarkerType, anchor: Point, size: i32, color: Bgr) {
    match marker {
        MarkerType::Dot => draw_dot(frame, anchor, size, color),
        MarkerType::Arrow => draw_arrow_marker(frame, anchor, size, color),
        MarkerType::Pin => draw_pin(frame, anchor, size, color),
    }
}

fn draw_dot(frame: &mut Frame, anchor: Point, size: i32, color: Bgr) {
    let radius = head_radius(size);
    canvas::fill_circle(frame, anchor, radius, color);
    canvas::stroke_circle(frame, anchor, radius + 2, Bgr::WHITE, RING_THICKNESS);
}

fn draw_arrow_marker(frame: &mut Frame, anchor: Point, size: i32, color: Bgr) {
    let tail = arrow_tail(anchor, size);
    canvas::draw_arrow(frame, tail, anchor, color, ARROW_THICKNESS, ARROW_TIP_RATIO);
    canvas::fill_circle(frame, anchor, ARROW_HUB_RADIUS, color);
}

fn draw_pin(frame: &mut Frame, anchor: Point, size: i32, color: Bgr) {
    let radius = head_radius(size);
    let head = (anchor.0, anchor.1 - 2 * size);

    canvas::draw_line(frame, head, anchor, color, PIN_STEM_THICKNESS);
    canvas::fill_circle(frame, head, radius, color);
    // Highlight, up and left of the head's center
    let accent = (radius / 3).max(1);
    canvas::fill_circle(frame, (head.0 - accent, head.1 - accent), accent, Bgr::WHITE);

    canvas::draw_diamond(frame, anchor, size * 2, color, PIN_STEM_THICKNESS);
    canvas::fill_circle(frame, anchor, 2, color);
}
