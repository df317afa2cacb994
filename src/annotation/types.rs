use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AnnotationError, Result};

use super::color::{Bgr, Contrast};
use super::timeline::ActiveWindow;

/// Marker shape drawn at the annotation point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerType {
    #[default]
    Dot,
    Arrow,
    Pin,
}

/// How the caption text is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextStyle {
    #[default]
    Label,
    Callout,
    Headline,
}

/// CSS-style font weight (100-900)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawFontWeight", into = "u16")]
pub struct FontWeight(u16);

impl FontWeight {
    pub const NORMAL: FontWeight = FontWeight(400);
    pub const BOLD: FontWeight = FontWeight(700);

    pub fn new(weight: u16) -> Option<Self> {
        (100..=900).contains(&weight).then_some(Self(weight))
    }

    pub fn value(&self) -> u16 {
        self.0
    }

    /// Stroke thickness in pixels used when drawing glyphs
    pub fn stroke_thickness(&self) -> u32 {
        match self.0 {
            0..=599 => 1,
            600..=799 => 2,
            _ => 3,
        }
    }
}

impl From<FontWeight> for u16 {
    fn from(weight: FontWeight) -> Self {
        weight.0
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFontWeight {
    Number(u16),
    Text(String),
}

impl TryFrom<RawFontWeight> for FontWeight {
    type Error = String;

    fn try_from(raw: RawFontWeight) -> std::result::Result<Self, Self::Error> {
        let weight = match raw {
            RawFontWeight::Number(n) => n,
            RawFontWeight::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "normal" => 400,
                "bold" => 700,
                other => other
                    .parse::<u16>()
                    .map_err(|_| format!("unknown font weight '{}'", s))?,
            },
        };
        FontWeight::new(weight).ok_or_else(|| format!("font weight {} out of range 100-900", weight))
    }
}

fn default_duration() -> f64 {
    3.0
}

fn default_color() -> String {
    "#3b82f6".to_string()
}

fn default_text_color() -> String {
    "#ffffff".to_string()
}

fn default_marker_size() -> i32 {
    16
}

fn default_true() -> bool {
    true
}

/// A time-anchored marker and caption, as supplied by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Identifier, only used as fallback caption text
    pub id: i64,

    /// Position in source-frame pixels; may lie outside the frame
    pub x: f64,
    pub y: f64,

    /// Start of the display window in seconds
    pub time_sec: f64,

    /// Length of the display window in seconds
    #[serde(default = "default_duration")]
    pub duration_sec: f64,

    #[serde(default)]
    pub text: String,

    #[serde(default)]
    pub marker_type: MarkerType,

    #[serde(default)]
    pub text_style: TextStyle,

    /// Marker color, `#RRGGBB`
    #[serde(default = "default_color")]
    pub color: String,

    /// Caption color, `#RRGGBB`
    #[serde(default = "default_text_color")]
    pub text_color: String,

    #[serde(default = "default_marker_size")]
    pub marker_size: i32,

    /// Caption height in pixels, overriding the per-style default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_size: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<FontWeight>,

    /// Editor hover behaviour; burned-in captions are always drawn
    #[serde(default = "default_true")]
    pub label_always_visible: bool,
}

impl Annotation {
    /// Minimal annotation with the editor's defaults
    pub fn new(id: i64, x: f64, y: f64, time_sec: f64) -> Self {
        Self {
            id,
            x,
            y,
            time_sec,
            duration_sec: default_duration(),
            text: String::new(),
            marker_type: MarkerType::default(),
            text_style: TextStyle::default(),
            color: default_color(),
            text_color: default_text_color(),
            marker_size: default_marker_size(),
            text_size: None,
            font_weight: None,
            label_always_visible: true,
        }
    }

    /// Caption text, falling back to `#id` when blank
    pub fn display_text(&self) -> String {
        let trimmed = self.text.trim();
        if trimmed.is_empty() {
            format!("#{}", self.id)
        } else {
            trimmed.to_string()
        }
    }

    /// Validate the annotation and convert its style fields to drawing parameters
    pub fn resolve(&self) -> std::result::Result<ResolvedAnnotation, AnnotationError> {
        let parse = |field: &'static str, value: &str| {
            Bgr::from_hex(value).ok_or_else(|| AnnotationError::InvalidColor {
                id: self.id,
                field,
                value: value.to_string(),
            })
        };
        let color = parse("color", &self.color)?;
        let text_color = parse("text_color", &self.text_color)?;

        let invalid = |details: String| AnnotationError::InvalidParameters { id: self.id, details };

        if !self.x.is_finite() || !self.y.is_finite() {
            return Err(invalid(format!("position ({}, {}) is not finite", self.x, self.y)));
        }
        if !self.time_sec.is_finite() || !self.duration_sec.is_finite() {
            return Err(invalid(format!(
                "time window {}s + {}s is not finite",
                self.time_sec, self.duration_sec
            )));
        }
        if self.marker_size <= 0 {
            return Err(invalid(format!("marker_size must be positive, got {}", self.marker_size)));
        }
        if let Some(size) = self.text_size {
            if !(size.is_finite() && size > 0.0) {
                return Err(invalid(format!("text_size must be positive, got {}", size)));
            }
        }

        Ok(ResolvedAnnotation {
            id: self.id,
            // Truncation toward zero, saturating on overflow
            position: (self.x as i32, self.y as i32),
            window: ActiveWindow::new(self.time_sec, self.duration_sec),
            text: self.display_text(),
            marker: self.marker_type,
            style: self.text_style,
            color,
            text_color,
            contrast: Contrast::of(text_color),
            marker_size: self.marker_size,
            text_size: self.text_size,
            font_weight: self.font_weight,
        })
    }
}

/// A validated annotation with colors already converted to frame byte order
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAnnotation {
    pub id: i64,
    pub position: (i32, i32),
    pub window: ActiveWindow,
    pub text: String,
    pub marker: MarkerType,
    pub style: TextStyle,
    pub color: Bgr,
    pub text_color: Bgr,
    pub contrast: Contrast,
    pub marker_size: i32,
    pub text_size: Option<f32>,
    pub font_weight: Option<FontWeight>,
}

/// Load an annotation list from a JSON array
pub fn load_annotations<P: AsRef<Path>>(path: P) -> Result<Vec<Annotation>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| AnnotationError::LoadFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let annotations = serde_json::from_str(&content).map_err(|e| AnnotationError::LoadFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    Ok(annotations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_applied_when_fields_missing() {
        let ann: Annotation =
            serde_json::from_str(r#"{"id": 3, "x": 10.7, "y": -4.2, "time_sec": 1.5}"#).unwrap();

        assert_eq!(ann.duration_sec, 3.0);
        assert_eq!(ann.marker_type, MarkerType::Dot);
        assert_eq!(ann.text_style, TextStyle::Label);
        assert_eq!(ann.color, "#3b82f6");
        assert_eq!(ann.text_color, "#ffffff");
        assert_eq!(ann.marker_size, 16);
        assert!(ann.text_size.is_none());

        let resolved = ann.resolve().unwrap();
        assert_eq!(resolved.position, (10, -4));
        assert_eq!(resolved.text, "#3");
        assert_eq!(resolved.contrast, Contrast::LightText);
    }

    #[test]
    fn test_unknown_style_rejected_at_parse_time() {
        let err = serde_json::from_str::<Annotation>(
            r#"{"id": 1, "x": 0, "y": 0, "time_sec": 0, "marker_type": "star"}"#,
        );
        assert!(err.is_err());

        let err = serde_json::from_str::<Annotation>(
            r#"{"id": 1, "x": 0, "y": 0, "time_sec": 0, "text_style": "banner"}"#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_font_weight_accepts_strings_and_numbers() {
        let parse = |raw: &str| {
            serde_json::from_str::<Annotation>(&format!(
                r#"{{"id": 1, "x": 0, "y": 0, "time_sec": 0, "font_weight": {}}}"#,
                raw
            ))
            .map(|a| a.font_weight.unwrap().value())
        };

        assert_eq!(parse(r#""700""#).unwrap(), 700);
        assert_eq!(parse("900").unwrap(), 900);
        assert_eq!(parse(r#""bold""#).unwrap(), 700);
        assert_eq!(parse(r#""normal""#).unwrap(), 400);
        assert!(parse(r#""heavy""#).is_err());
        assert!(parse("1200").is_err());
    }

    #[test]
    fn test_stroke_thickness_grows_with_weight() {
        assert_eq!(FontWeight::NORMAL.stroke_thickness(), 1);
        assert_eq!(FontWeight::new(500).unwrap().stroke_thickness(), 1);
        assert_eq!(FontWeight::new(600).unwrap().stroke_thickness(), 2);
        assert_eq!(FontWeight::BOLD.stroke_thickness(), 2);
        assert_eq!(FontWeight::new(900).unwrap().stroke_thickness(), 3);
    }

    #[test]
    fn test_whitespace_text_falls_back_to_id() {
        let mut ann = Annotation::new(42, 0.0, 0.0, 0.0);
        ann.text = "   \t ".to_string();
        assert_eq!(ann.display_text(), "#42");

        ann.text = "  Click here ".to_string();
        assert_eq!(ann.display_text(), "Click here");
    }

    #[test]
    fn test_malformed_color_is_fatal() {
        let mut ann = Annotation::new(5, 0.0, 0.0, 0.0);
        ann.text_color = "#ffff".to_string();

        match ann.resolve() {
            Err(AnnotationError::InvalidColor { id, field, value }) => {
                assert_eq!(id, 5);
                assert_eq!(field, "text_color");
                assert_eq!(value, "#ffff");
            }
            other => panic!("expected InvalidColor, got {:?}", other),
        }
    }

    #[test]
    fn test_non_positive_marker_size_rejected() {
        let mut ann = Annotation::new(1, 0.0, 0.0, 0.0);
        ann.marker_size = 0;
        assert!(matches!(
            ann.resolve(),
            Err(AnnotationError::InvalidParameters { id: 1, .. })
        ));
    }

    #[test]
    fn test_load_annotations_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("annotations.json");
        std::fs::write(
            &path,
            r##"[
                {"id": 1, "x": 100, "y": 50, "time_sec": 0, "duration_sec": 2,
                 "text": "Open menu", "marker_type": "arrow", "text_style": "callout",
                 "color": "#ef4444", "text_color": "#000000", "marker_size": 24,
                 "text_size": 18, "font_weight": "600", "label_always_visible": false},
                {"id": 2, "x": 10, "y": 10, "time_sec": 1, "text": "Second"}
            ]"##,
        )
        .unwrap();

        let annotations = load_annotations(&path).unwrap();
        assert_eq!(annotations.len(), 2);
        assert_eq!(annotations[0].marker_type, MarkerType::Arrow);
        assert_eq!(annotations[0].text_style, TextStyle::Callout);
        assert_eq!(annotations[0].text_size, Some(18.0));
        assert!(!annotations[0].label_always_visible);
        assert_eq!(annotations[1].duration_sec, 3.0);
    }

    #[test]
    fn test_load_annotations_reports_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = load_annotations(&path).unwrap_err();
        assert!(err.to_string().contains("broken.json"));
    }
}
