//! Hex color parsing and the luminance-based contrast decision.

use std::fmt;

use super::types::TextStyle;

/// A color in the frame buffer's byte order (blue, green, red)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bgr(pub [u8; 3]);

impl Bgr {
    pub const WHITE: Bgr = Bgr([255, 255, 255]);
    pub const BLACK: Bgr = Bgr([0, 0, 0]);

    /// Build from conventional red/green/blue components
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Bgr([b, g, r])
    }

    /// Parse `#RRGGBB` (the leading `#` is optional). Anything else is rejected.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }

        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Self::from_rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Lowercase `#rrggbb`
    pub fn to_hex(&self) -> String {
        let [b, g, r] = self.0;
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }

    pub fn r(&self) -> u8 {
        self.0[2]
    }

    pub fn g(&self) -> u8 {
        self.0[1]
    }

    pub fn b(&self) -> u8 {
        self.0[0]
    }

    /// Perceptual luminance in `[0, 1]`
    pub fn luminance(&self) -> f32 {
        (0.299 * self.r() as f32 + 0.587 * self.g() as f32 + 0.114 * self.b() as f32) / 255.0
    }
}

impl fmt::Display for Bgr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Which side of the luminance midpoint a caption's text color falls on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contrast {
    /// Text luminance below 0.5; gets a near-white panel
    DarkText,
    /// Text luminance at or above 0.5; gets a near-black panel
    LightText,
}

impl Contrast {
    pub fn of(text_color: Bgr) -> Self {
        if text_color.luminance() < 0.5 {
            Contrast::DarkText
        } else {
            Contrast::LightText
        }
    }

    pub fn is_dark_text(self) -> bool {
        self == Contrast::DarkText
    }

    /// Background panel color for the given caption style
    pub fn panel_color(self, style: TextStyle) -> Bgr {
        match (style, self) {
            (TextStyle::Callout, Contrast::DarkText) => Bgr([240, 240, 240]),
            (TextStyle::Callout, Contrast::LightText) => Bgr([20, 20, 20]),
            (TextStyle::Label | TextStyle::Headline, Contrast::DarkText) => Bgr([245, 245, 245]),
            (TextStyle::Label | TextStyle::Headline, Contrast::LightText) => Bgr([10, 10, 10]),
        }
    }
}
