//! Raster primitives drawn directly into a [`Frame`].
//!
//! Coordinates are signed and may fall outside the frame; everything is clipped
//! per pixel. Rectangle corners are inclusive.

use crate::annotation::Bgr;
use crate::video::Frame;

/// Pixel coordinate, possibly off-frame
pub type Point = (i32, i32);

/// Clamp a point into `[0, width-1] x [0, height-1]`
pub fn clamp_to_frame(point: Point, width: u32, height: u32) -> Point {
    let max_x = width.saturating_sub(1).min(i32::MAX as u32) as i32;
    let max_y = height.saturating_sub(1).min(i32::MAX as u32) as i32;
    (point.0.clamp(0, max_x), point.1.clamp(0, max_y))
}

/// `value` pushed into `[lo, hi]`, with `lo` winning when the range is empty
pub fn clamp_range(value: i32, lo: i32, hi: i32) -> i32 {
    lo.max(hi.min(value))
}

/// Intersect an inclusive rectangle with the frame; inverted rectangles are empty
fn clip_rect(frame: &Frame, x1: i32, y1: i32, x2: i32, y2: i32) -> Option<(u32, u32, u32, u32)> {
    let max_x = frame.width() as i64 - 1;
    let max_y = frame.height() as i64 - 1;

    let cx1 = (x1 as i64).max(0);
    let cy1 = (y1 as i64).max(0);
    let cx2 = (x2 as i64).min(max_x);
    let cy2 = (y2 as i64).min(max_y);
    if cx1 > cx2 || cy1 > cy2 {
        return None;
    }
    Some((cx1 as u32, cy1 as u32, cx2 as u32, cy2 as u32))
}

pub fn fill_rect(frame: &mut Frame, x1: i32, y1: i32, x2: i32, y2: i32, color: Bgr) {
    let Some((x1, y1, x2, y2)) = clip_rect(frame, x1, y1, x2, y2) else {
        return;
    };
    for y in y1..=y2 {
        for x in x1..=x2 {
            frame.set_pixel(x, y, color);
        }
    }
}

/// Composite a translucent rectangle over the frame
pub fn blend_rect(frame: &mut Frame, x1: i32, y1: i32, x2: i32, y2: i32, color: Bgr, alpha: f32) {
    let Some((x1, y1, x2, y2)) = clip_rect(frame, x1, y1, x2, y2) else {
        return;
    };
    for y in y1..=y2 {
        for x in x1..=x2 {
            frame.blend_pixel(x, y, color, alpha);
        }
    }
}

/// Rectangle outline whose stroke is centered on the edges
pub fn stroke_rect(frame: &mut Frame, x1: i32, y1: i32, x2: i32, y2: i32, color: Bgr, thickness: i32) {
    let t = thickness.max(1);
    let lo = (t - 1) / 2;
    let hi = t / 2;
    fill_rect(frame, x1 - lo, y1 - lo, x2 + hi, y1 + hi, color);
    fill_rect(frame, x1 - lo, y2 - lo, x2 + hi, y2 + hi, color);
    fill_rect(frame, x1 - lo, y1 - lo, x1 + hi, y2 + hi, color);
    fill_rect(frame, x2 - lo, y1 - lo, x2 + hi, y2 + hi, color);
}

pub fn fill_circle(frame: &mut Frame, center: Point, radius: i32, color: Bgr) {
    let r = radius.max(0);
    let r2 = (r as i64) * (r as i64);
    for dy in -r..=r {
        for dx in -r..=r {
            if (dx as i64).pow(2) + (dy as i64).pow(2) <= r2 {
                frame.put(center.0.saturating_add(dx), center.1.saturating_add(dy), color);
            }
        }
    }
}

/// Circle outline of the given stroke width, centered on `radius`
pub fn stroke_circle(frame: &mut Frame, center: Point, radius: i32, color: Bgr, thickness: i32) {
    let half = thickness.max(1) as f32 / 2.0;
    let inner = (radius as f32 - half).max(0.0);
    let outer = radius as f32 + half;
    let reach = outer.ceil() as i32;

    for dy in -reach..=reach {
        for dx in -reach..=reach {
            let d = ((dx * dx + dy * dy) as f32).sqrt();
            if d >= inner && d < outer {
                frame.put(center.0.saturating_add(dx), center.1.saturating_add(dy), color);
            }
        }
    }
}

/// Straight line of the given width (Bresenham, stamped with a disc)
pub fn draw_line(frame: &mut Frame, from: Point, to: Point, color: Bgr, thickness: i32) {
    let radius = (thickness.max(1) - 1) / 2;
    let (mut x, mut y) = (from.0 as i64, from.1 as i64);
    let (x1, y1) = (to.0 as i64, to.1 as i64);
    let dx = (x1 - x).abs();
    let dy = -(y1 - y).abs();
    let sx = if x < x1 { 1 } else { -1 };
    let sy = if y < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        let p = (x as i32, y as i32);
        if radius == 0 {
            frame.put(p.0, p.1, color);
        } else {
            fill_circle(frame, p, radius, color);
        }
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Line from `from` to `to` with two barbs at the `to` end.
///
/// Barb length is `tip_ratio` times the shaft length, at 45 degrees either side.
pub fn draw_arrow(frame: &mut Frame, from: Point, to: Point, color: Bgr, thickness: i32, tip_ratio: f64) {
    draw_line(frame, from, to, color, thickness);

    let (fx, fy) = (from.0 as f64, from.1 as f64);
    let (tx, ty) = (to.0 as f64, to.1 as f64);
    let length = ((fx - tx).powi(2) + (fy - ty).powi(2)).sqrt();
    if length == 0.0 {
        return;
    }

    let tip = length * tip_ratio;
    let angle = (fy - ty).atan2(fx - tx);
    for barb in [angle + std::f64::consts::FRAC_PI_4, angle - std::f64::consts::FRAC_PI_4] {
        let end = (
            (tx + tip * barb.cos()).round() as i32,
            (ty + tip * barb.sin()).round() as i32,
        );
        draw_line(frame, end, to, color, thickness);
    }
}

/// Diamond outline with the given overall width and height
pub fn draw_diamond(frame: &mut Frame, center: Point, size: i32, color: Bgr, thickness: i32) {
    let half = size / 2;
    let (cx, cy) = center;
    let corners = [(cx, cy - half), (cx + half, cy), (cx, cy + half), (cx - half, cy)];
    for i in 0..corners.len() {
        draw_line(frame, corners[i], corners[(i + 1) % corners.len()], color, thickness);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Bgr = Bgr::from_rgb(255, 0, 0);

    fn count(frame: &Frame, color: Bgr) -> usize {
        let mut n = 0;
        for y in 0..frame.height() {
            for x in 0..frame.width() {
                if frame.get_pixel(x, y) == color {
                    n += 1;
                }
            }
        }
        n
    }

    #[test]
    fn test_clamp_to_frame() {
        assert_eq!(clamp_to_frame((-50, 900), 640, 480), (0, 479));
        assert_eq!(clamp_to_frame((700, -1), 640, 480), (639, 0));
        assert_eq!(clamp_to_frame((10, 20), 640, 480), (10, 20));
    }

    #[test]
    fn test_clamp_range_prefers_lower_bound_when_inverted() {
        assert_eq!(clamp_range(5, 20, 100), 20);
        assert_eq!(clamp_range(500, 20, 100), 100);
        assert_eq!(clamp_range(50, 20, 10), 20);
    }

    #[test]
    fn test_fill_rect_is_inclusive_and_clipped() {
        let mut frame = Frame::new_black(10, 10);
        fill_rect(&mut frame, 2, 2, 4, 3, RED);
        assert_eq!(count(&frame, RED), 6);

        let mut frame = Frame::new_black(10, 10);
        fill_rect(&mut frame, -5, -5, 1, 1, RED);
        assert_eq!(count(&frame, RED), 4);

        fill_rect(&mut frame, 20, 20, 30, 30, Bgr::WHITE);
        fill_rect(&mut frame, 8, 2, 3, 4, Bgr::WHITE);
        assert_eq!(count(&frame, Bgr::WHITE), 0);
    }

    #[test]
    fn test_blend_rect_keeps_background_visible() {
        let mut frame = Frame::new_filled(4, 4, Bgr([100, 100, 100]));
        blend_rect(&mut frame, 0, 0, 3, 3, Bgr::BLACK, 0.7);
        assert_eq!(frame.get_pixel(2, 2), Bgr([30, 30, 30]));
    }

    #[test]
    fn test_fill_circle_center_and_extent() {
        let mut frame = Frame::new_black(21, 21);
        fill_circle(&mut frame, (10, 10), 5, RED);
        assert_eq!(frame.get_pixel(10, 10), RED);
        assert_eq!(frame.get_pixel(15, 10), RED);
        assert_eq!(frame.get_pixel(16, 10), Bgr::BLACK);
        assert_eq!(frame.get_pixel(14, 14), Bgr::BLACK);
    }

    #[test]
    fn test_stroke_circle_leaves_center_untouched() {
        let mut frame = Frame::new_black(41, 41);
        stroke_circle(&mut frame, (20, 20), 10, RED, 2);
        assert_eq!(frame.get_pixel(20, 20), Bgr::BLACK);
        assert_eq!(frame.get_pixel(30, 20), RED);
        assert_eq!(frame.get_pixel(20, 10), RED);
    }

    #[test]
    fn test_line_hits_both_endpoints() {
        let mut frame = Frame::new_black(20, 20);
        draw_line(&mut frame, (1, 2), (17, 11), RED, 1);
        assert_eq!(frame.get_pixel(1, 2), RED);
        assert_eq!(frame.get_pixel(17, 11), RED);
    }

    #[test]
    fn test_arrow_barbs_point_back_toward_tail() {
        let mut frame = Frame::new_black(40, 40);
        draw_arrow(&mut frame, (0, 20), (30, 20), RED, 1, 0.2);
        // Shaft length 30 -> barbs ~6px long, ending near (25.8, 15.8) and (25.8, 24.2)
        assert_eq!(frame.get_pixel(26, 16), RED);
        assert_eq!(frame.get_pixel(26, 24), RED);
        assert_eq!(frame.get_pixel(34, 20), Bgr::BLACK);
    }

    #[test]
    fn test_diamond_corners() {
        let mut frame = Frame::new_black(40, 40);
        draw_diamond(&mut frame, (20, 20), 16, RED, 1);
        for corner in [(20, 12), (28, 20), (20, 28), (12, 20)] {
            assert_eq!(frame.get_pixel(corner.0, corner.1), RED);
        }
        assert_eq!(frame.get_pixel(20, 20), Bgr::BLACK);
    }

    #[test]
    fn test_stroke_rect_outline_only() {
        let mut frame = Frame::new_black(20, 20);
        stroke_rect(&mut frame, 2, 2, 17, 17, RED, 2);
        assert_eq!(frame.get_pixel(2, 2), RED);
        assert_eq!(frame.get_pixel(17, 10), RED);
        assert_eq!(frame.get_pixel(10, 10), Bgr::BLACK);
    }
}
