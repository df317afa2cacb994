//! Caption text: shortening, measurement and 8x8 bitmap glyph drawing.

use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};

use crate::annotation::{Bgr, FontWeight, TextStyle};
use crate::video::Frame;

use super::canvas::Point;

/// Appended to captions cut short by [`shorten`]
pub const ELLIPSIS: &str = "...";

/// Glyph cell edge in font units
const GLYPH_CELL: i32 = 8;
/// Largest pixel scale honored for explicit text sizes
const MAX_SCALE: i32 = 32;
/// Measured widths saturate here, leaving headroom for layout offsets
const MAX_EXTENT: i32 = i32::MAX / 4;

/// Collapse whitespace and cut `text` on a word boundary so it fits in `max_chars`.
///
/// Cut text ends with [`ELLIPSIS`], which counts toward the limit. A first word
/// longer than the limit is itself cut.
pub fn shorten(text: &str, max_chars: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    let collapsed = words.join(" ");
    if collapsed.chars().count() <= max_chars {
        return collapsed;
    }

    let budget = max_chars.saturating_sub(ELLIPSIS.len());
    let mut kept = String::new();
    for word in &words {
        let extra = if kept.is_empty() { 0 } else { 1 };
        if kept.chars().count() + extra + word.chars().count() > budget {
            break;
        }
        if extra == 1 {
            kept.push(' ');
        }
        kept.push_str(word);
    }

    if kept.is_empty() {
        kept = words
            .first()
            .map(|word| word.chars().take(budget).collect())
            .unwrap_or_default();
    }

    kept.push_str(ELLIPSIS);
    kept
}

/// Pixel scale and stroke weight for drawing a caption
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontSpec {
    /// Screen pixels per glyph pixel
    pub scale: i32,
    /// Horizontal overstrike passes; 1 is a regular weight
    pub thickness: i32,
}

impl FontSpec {
    pub fn new(scale: i32, thickness: i32) -> Self {
        Self {
            scale: scale.max(1),
            thickness: thickness.max(1),
        }
    }

    /// Font for a caption style, honoring explicit size and weight overrides.
    ///
    /// `text_size` is the caption height in pixels; headlines draw it half again
    /// as large.
    pub fn for_style(style: TextStyle, text_size: Option<f32>, weight: Option<FontWeight>) -> Self {
        let (font_scale, default_thickness) = match style {
            TextStyle::Label => (0.7, 2),
            TextStyle::Callout => (0.6, 1),
            TextStyle::Headline => (0.8, 2),
        };

        let scale = match text_size {
            Some(px) => {
                let px = if style == TextStyle::Headline { px * 1.5 } else { px };
                ((px / GLYPH_CELL as f32).round() as i32).min(MAX_SCALE)
            }
            // A font scale of 1.0 is roughly 22px tall
            None => (font_scale * 22.0 / GLYPH_CELL as f32).round() as i32,
        };
        let thickness = weight
            .map(|w| w.stroke_thickness() as i32)
            .unwrap_or(default_thickness);

        Self::new(scale, thickness)
    }

    /// Height of one line of text
    pub fn line_height(&self) -> i32 {
        GLYPH_CELL * self.scale
    }
}

/// Width and height in pixels of `text` drawn with `font`
pub fn text_size(text: &str, font: FontSpec) -> (i32, i32) {
    let chars = i32::try_from(text.chars().count()).unwrap_or(i32::MAX);
    let width = if chars == 0 {
        0
    } else {
        chars
            .saturating_mul(GLYPH_CELL * font.scale)
            .saturating_add(font.thickness - 1)
            .min(MAX_EXTENT)
    };
    (width, font.line_height())
}

fn glyph(ch: char) -> [u8; 8] {
    BASIC_FONTS
        .get(ch)
        .or_else(|| LATIN_FONTS.get(ch))
        .or_else(|| BASIC_FONTS.get('?'))
        .unwrap_or([0; 8])
}

/// Draw `text` with its bottom-left corner on `baseline`
pub fn draw_text(frame: &mut Frame, text: &str, baseline: Point, font: FontSpec, color: Bgr) {
    let top = baseline.1 - font.line_height();
    let mut cursor_x = baseline.0;

    for ch in text.chars() {
        let rows = glyph(ch);
        for (row_idx, &bits) in rows.iter().enumerate() {
            for col_idx in 0..GLYPH_CELL {
                if (bits >> col_idx) & 1 == 0 {
                    continue;
                }
                let px = cursor_x + col_idx * font.scale;
                let py = top + row_idx as i32 * font.scale;
                for sy in 0..font.scale {
                    for sx in 0..font.scale + font.thickness - 1 {
                        frame.put(px + sx, py + sy, color);
                    }
                }
            }
        }
        cursor_x += GLYPH_CELL * font.scale;
    }
}
