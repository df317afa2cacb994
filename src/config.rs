use std::path::Path;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Main configuration for the Video-Annotator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Decoder/encoder settings
    #[serde(default)]
    pub video: VideoConfig,

    /// Audio remux settings
    #[serde(default)]
    pub remux: RemuxConfig,

    /// Annotation drawing settings
    #[serde(default)]
    pub render: RenderConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound { path: path.display().to_string() })?;

        let config: Config = toml::from_str(&content)
            .map_err(|_| ConfigError::ParseFailed { path: path.display().to_string() })?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidValue {
                key: "config".to_string(),
                value: e.to_string()
            })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.video.validate()?;
        self.remux.validate()?;
        self.render.validate()?;
        Ok(())
    }
}

fn require_non_empty(key: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: format!("{:?}", value),
        }.into());
    }
    Ok(())
}

/// Decoder/encoder configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    /// ffmpeg executable used for decoding and encoding
    pub ffmpeg_path: String,

    /// ffprobe executable used for metadata probing
    pub ffprobe_path: String,

    /// Video codec for the intermediate video-only file
    pub codec: String,

    /// Quality setting (0-100, higher is better)
    pub quality: u8,

    /// Output pixel format
    pub pixel_format: String,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            // Built into every ffmpeg, unlike libx264
            codec: "mpeg4".to_string(),
            quality: 85,
            pixel_format: "yuv420p".to_string(),
        }
    }
}

impl VideoConfig {
    fn validate(&self) -> Result<()> {
        require_non_empty("video.ffmpeg_path", &self.ffmpeg_path)?;
        require_non_empty("video.ffprobe_path", &self.ffprobe_path)?;
        require_non_empty("video.codec", &self.codec)?;
        require_non_empty("video.pixel_format", &self.pixel_format)?;

        if self.quality > 100 {
            return Err(ConfigError::InvalidValue {
                key: "video.quality".to_string(),
                value: self.quality.to_string()
            }.into());
        }

        Ok(())
    }
}

/// Audio remux configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemuxConfig {
    /// Muxing tool looked up on PATH
    pub tool: String,

    /// Codec the audio track is re-encoded to
    pub audio_codec: String,

    /// Token appended to the output file stem to name the video-only intermediate
    pub intermediate_suffix: String,
}

impl Default for RemuxConfig {
    fn default() -> Self {
        Self {
            tool: "ffmpeg".to_string(),
            audio_codec: "aac".to_string(),
            intermediate_suffix: ".annotator-tmp".to_string(),
        }
    }
}

impl RemuxConfig {
    fn validate(&self) -> Result<()> {
        require_non_empty("remux.tool", &self.tool)?;
        require_non_empty("remux.audio_codec", &self.audio_codec)?;
        require_non_empty("remux.intermediate_suffix", &self.intermediate_suffix)?;
        Ok(())
    }
}

/// Annotation drawing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Captions longer than this are shortened with an ellipsis
    pub max_text_chars: usize,

    /// Opacity of label and headline background panels
    pub panel_opacity: f32,

    /// Opacity of callout boxes
    pub callout_opacity: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_text_chars: 60,
            panel_opacity: 0.7,
            callout_opacity: 0.8,
        }
    }
}

impl RenderConfig {
    fn validate(&self) -> Result<()> {
        if self.max_text_chars <= crate::styles::text::ELLIPSIS.len() {
            return Err(ConfigError::InvalidValue {
                key: "render.max_text_chars".to_string(),
                value: self.max_text_chars.to_string()
            }.into());
        }

        // Panels are blended, never opaque
        for (key, value) in [
            ("render.panel_opacity", self.panel_opacity),
            ("render.callout_opacity", self.callout_opacity),
        ] {
            if !(value > 0.0 && value < 1.0) {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: value.to_string()
                }.into());
            }
        }

        Ok(())
    }
}
