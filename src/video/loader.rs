use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};

use serde::Deserialize;
use tracing::{debug, info};

use crate::config::VideoConfig;
use crate::error::{Result, VideoError};
use crate::video::process::{reap, StderrTail};
use crate::video::types::{Frame, FrameSource, VideoMetadata};

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
    #[serde(default)]
    format: Option<FfprobeFormat>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    #[serde(default)]
    codec_type: Option<String>,
    #[serde(default)]
    width: Option<u32>,
    #[serde(default)]
    height: Option<u32>,
    #[serde(default)]
    r_frame_rate: Option<String>,
    #[serde(default)]
    avg_frame_rate: Option<String>,
    #[serde(default)]
    nb_frames: Option<String>,
    #[serde(default)]
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    #[serde(default)]
    duration: Option<String>,
}

/// Probes and opens source videos through the ffmpeg command-line tools
#[derive(Debug, Clone)]
pub struct VideoLoader {
    ffmpeg_path: String,
    ffprobe_path: String,
}

impl VideoLoader {
    pub fn new(config: &VideoConfig) -> Self {
        Self {
            ffmpeg_path: config.ffmpeg_path.clone(),
            ffprobe_path: config.ffprobe_path.clone(),
        }
    }

    /// Read width, height, frame rate, frame count and audio presence
    pub fn probe<P: AsRef<Path>>(&self, path: P) -> Result<VideoMetadata> {
        let path = path.as_ref();
        let open_failed = |reason: String| VideoError::OpenFailed {
            path: path.display().to_string(),
            reason,
        };

        if !path.is_file() {
            return Err(open_failed("file does not exist".to_string()).into());
        }

        let output = Command::new(&self.ffprobe_path)
            .args(["-v", "error", "-print_format", "json", "-show_streams", "-show_format"])
            .arg(path)
            .output()
            .map_err(|e| open_failed(format!("failed to run {}: {}", self.ffprobe_path, e)))?;

        if !output.status.success() {
            return Err(open_failed(format!(
                "{} exited with {}: {}",
                self.ffprobe_path,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ))
            .into());
        }

        let metadata = parse_probe_output(&output.stdout).map_err(open_failed)?;

        info!(
            "Video metadata: {}x{} @ {:.2}fps, {} frames ({:.2}s), audio: {}",
            metadata.width, metadata.height, metadata.fps, metadata.frame_count, metadata.duration, metadata.has_audio
        );
        Ok(metadata)
    }

    /// Probe and start decoding a source video
    pub fn open<P: AsRef<Path>>(&self, path: P) -> Result<FfmpegDecoder> {
        let metadata = self.probe(path.as_ref())?;
        FfmpegDecoder::spawn(&self.ffmpeg_path, path.as_ref(), metadata)
    }
}

fn parse_probe_output(json: &[u8]) -> std::result::Result<VideoMetadata, String> {
    let parsed: FfprobeOutput =
        serde_json::from_slice(json).map_err(|e| format!("unreadable ffprobe output: {}", e))?;

    let stream = parsed
        .streams
        .iter()
        .find(|stream| stream.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| "no video stream".to_string())?;

    let (width, height) = match (stream.width, stream.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
        _ => return Err("video stream has no dimensions".to_string()),
    };

    let fps = stream
        .r_frame_rate
        .as_deref()
        .and_then(parse_rate)
        .or_else(|| stream.avg_frame_rate.as_deref().and_then(parse_rate))
        .ok_or_else(|| "video stream has no usable frame rate".to_string())?;

    let duration = stream
        .duration
        .as_deref()
        .and_then(parse_positive_float)
        .or_else(|| {
            parsed
                .format
                .as_ref()
                .and_then(|format| format.duration.as_deref())
                .and_then(parse_positive_float)
        })
        .unwrap_or(0.0);

    let frame_count = stream
        .nb_frames
        .as_deref()
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .filter(|&n| n > 0)
        .unwrap_or_else(|| (duration * fps).round() as u64);

    let has_audio = parsed
        .streams
        .iter()
        .any(|stream| stream.codec_type.as_deref() == Some("audio"));

    Ok(VideoMetadata {
        width,
        height,
        fps,
        frame_count,
        duration,
        has_audio,
    })
}

/// Parse an ffprobe rate such as `30/1` or `24000/1001`
fn parse_rate(raw: &str) -> Option<f64> {
    let value = raw.trim();
    let rate = match value.split_once('/') {
        Some((num, den)) => {
            let num = num.trim().parse::<f64>().ok()?;
            let den = den.trim().parse::<f64>().ok()?;
            if den == 0.0 {
                return None;
            }
            num / den
        }
        None => value.parse::<f64>().ok()?,
    };
    (rate.is_finite() && rate > 0.0).then_some(rate)
}

fn parse_positive_float(raw: &str) -> Option<f64> {
    let parsed = raw.trim().parse::<f64>().ok()?;
    (parsed.is_finite() && parsed > 0.0).then_some(parsed)
}

/// Streams `bgr24` frames out of an ffmpeg child process.
///
/// Dropping the decoder without [`FrameSource::close`] kills the child.
pub struct FfmpegDecoder {
    child: Child,
    stdout: Option<ChildStdout>,
    stderr: Option<StderrTail>,
    metadata: VideoMetadata,
    path: PathBuf,
    frames_read: u64,
}

impl FfmpegDecoder {
    fn spawn(ffmpeg_path: &str, path: &Path, metadata: VideoMetadata) -> Result<Self> {
        let open_failed = |reason: String| VideoError::OpenFailed {
            path: path.display().to_string(),
            reason,
        };

        let mut child = Command::new(ffmpeg_path)
            .args(["-hide_banner", "-loglevel", "error", "-nostdin", "-i"])
            .arg(path)
            .args(["-map", "0:v:0", "-f", "rawvideo", "-pix_fmt", "bgr24", "-"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| open_failed(format!("failed to spawn {}: {}", ffmpeg_path, e)))?;

        let pipes = child.stdout.take().zip(child.stderr.take());
        let Some((stdout, stderr)) = pipes else {
            reap(&mut child, "decoder");
            return Err(open_failed("failed to capture decoder output".to_string()).into());
        };
        let stderr = match StderrTail::spawn(stderr, "decoder") {
            Ok(tail) => tail,
            Err(e) => {
                reap(&mut child, "decoder");
                return Err(open_failed(format!("failed to start stderr reader: {}", e)).into());
            }
        };

        debug!("Spawned decoder for {}", path.display());
        Ok(Self {
            child,
            stdout: Some(stdout),
            stderr: Some(stderr),
            metadata,
            path: path.to_path_buf(),
            frames_read: 0,
        })
    }

    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }

    fn stderr_tail(&mut self) -> String {
        self.stderr.take().map(StderrTail::finish).unwrap_or_default()
    }
}

impl FrameSource for FfmpegDecoder {
    fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    fn read_frame(&mut self, frame: &mut Frame) -> Result<bool> {
        let Some(stdout) = self.stdout.as_mut() else {
            return Ok(false);
        };
        match stdout.read_exact(frame.as_bytes_mut()) {
            Ok(()) => {
                self.frames_read += 1;
                Ok(true)
            }
            // A trailing partial frame is dropped, like a short read from any decoder
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(false),
            Err(e) => Err(VideoError::DecodingFailed {
                reason: format!("reading frame {} of {}: {}", self.frames_read, self.path.display(), e),
            }
            .into()),
        }
    }

    fn close(mut self) -> Result<()> {
        drop(self.stdout.take());
        let status = self.child.wait().map_err(|e| VideoError::DecodingFailed {
            reason: format!("waiting for decoder: {}", e),
        })?;
        let stderr = self.stderr_tail();

        if !status.success() {
            return Err(VideoError::DecodingFailed {
                reason: format!("decoder exited with {}: {}", status, stderr),
            }
            .into());
        }

        debug!("Decoder closed after {} frames", self.frames_read);
        Ok(())
    }

    fn abort(mut self) {
        drop(self.stdout.take());
        reap(&mut self.child, "decoder");
        let stderr = self.stderr_tail();
        if !stderr.is_empty() {
            debug!("Decoder stderr before abort: {}", stderr);
        }
    }
}

impl Drop for FfmpegDecoder {
    fn drop(&mut self) {
        reap(&mut self.child, "decoder");
    }
}
