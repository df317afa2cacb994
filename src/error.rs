use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the Video-Annotator library
#[derive(Error, Debug)]
pub enum AnnotatorError {
    #[error("Annotation error: {0}")]
    Annotation(#[from] AnnotationError),

    #[error("Video processing error: {0}")]
    Video(#[from] VideoError),

    #[error("Audio remux error: {0}")]
    Remux(#[from] RemuxError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Generic error: {0}")]
    Generic(String),
}

/// Annotation input errors
#[derive(Error, Debug)]
pub enum AnnotationError {
    #[error("Annotation {id}: invalid {field} color '{value}' (expected #RRGGBB)")]
    InvalidColor {
        id: i64,
        field: &'static str,
        value: String,
    },

    #[error("Annotation {id}: {details}")]
    InvalidParameters { id: i64, details: String },

    #[error("Failed to load annotations from {path}: {reason}")]
    LoadFailed { path: String, reason: String },
}

/// Video decode/encode errors
#[derive(Error, Debug)]
pub enum VideoError {
    #[error("Could not open video {path}: {reason}")]
    OpenFailed { path: String, reason: String },

    #[error("Video decoding failed: {reason}")]
    DecodingFailed { reason: String },

    #[error("Video encoding failed: {reason}")]
    EncodingFailed { reason: String },

    #[error("Invalid video parameters: {details}")]
    InvalidParameters { details: String },
}

/// Errors raised after the video-only render has already succeeded
#[derive(Error, Debug)]
pub enum RemuxError {
    #[error("{tool} exited with {status}: {stderr} (video-only render kept at {})", intermediate.display())]
    ToolFailed {
        tool: String,
        status: String,
        stderr: String,
        intermediate: PathBuf,
    },

    #[error("Could not move {} to {}: {reason}", from.display(), to.display())]
    FinalizeFailed {
        from: PathBuf,
        to: PathBuf,
        reason: String,
    },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}")]
    ParseFailed { path: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Convenience type alias for Results using AnnotatorError
pub type Result<T> = std::result::Result<T, AnnotatorError>;

impl AnnotatorError {
    /// Create a generic error with a custom message
    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic(message.into())
    }

    /// Path of the video-only render left behind when the audio remux failed
    pub fn intermediate_path(&self) -> Option<&std::path::Path> {
        match self {
            Self::Remux(RemuxError::ToolFailed { intermediate, .. }) => Some(intermediate),
            _ => None,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Video(VideoError::OpenFailed { path, .. }) => {
                format!("Could not open video file '{}'. Please check the file exists and is a decodable video.", path)
            }
            Self::Annotation(AnnotationError::InvalidColor { id, field, value }) => {
                format!("Annotation {} has an invalid {} '{}'. Colors must be 6-digit hex like #3b82f6.", id, field, value)
            }
            Self::Remux(RemuxError::ToolFailed { intermediate, .. }) => {
                format!(
                    "Adding the audio track failed. The rendered video without audio was kept at '{}'.",
                    intermediate.display()
                )
            }
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            _ => self.to_string(),
        }
    }
}
