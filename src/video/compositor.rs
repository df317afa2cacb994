use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use tracing::{debug, info};

use crate::config::VideoConfig;
use crate::error::{Result, VideoError};
use crate::video::process::{reap, StderrTail};
use crate::video::types::{Frame, FrameSink, VideoMetadata};

/// Name of the video-only file rendered next to `output` before audio is attached.
///
/// `out/render.mp4` with the default suffix `.annotator-tmp` becomes
/// `out/render.annotator-tmp.mp4`. The name is a pure function of the output
/// path, so two jobs must never share an output.
pub fn intermediate_path(output: &Path, suffix: &str) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "render".to_string());
    let extension = output
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "mp4".to_string());

    output.with_file_name(format!("{}{}.{}", stem, suffix, extension))
}

/// Pipes raw frames into an ffmpeg encoder writing a video-only file.
///
/// Dropping the encoder without [`FrameSink::finish`] kills the child, leaving
/// a truncated file for the caller to remove.
pub struct FfmpegEncoder {
    child: Child,
    stdin: Option<ChildStdin>,
    stderr: Option<StderrTail>,
    path: PathBuf,
    frame_bytes: usize,
    frames_written: u64,
}

impl FfmpegEncoder {
    /// Start an encoder for frames shaped like `metadata`
    pub fn create(path: &Path, metadata: &VideoMetadata, config: &VideoConfig) -> Result<Self> {
        let args = encoder_args(metadata, config);
        let encoding_failed = |reason: String| VideoError::EncodingFailed { reason };

        let mut child = Command::new(&config.ffmpeg_path)
            .args(&args)
            .arg(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| encoding_failed(format!("failed to spawn {}: {}", config.ffmpeg_path, e)))?;

        let pipes = child.stdin.take().zip(child.stderr.take());
        let Some((stdin, stderr)) = pipes else {
            reap(&mut child, "encoder");
            return Err(encoding_failed("failed to capture encoder pipes".to_string()).into());
        };
        let stderr = match StderrTail::spawn(stderr, "encoder") {
            Ok(tail) => tail,
            Err(e) => {
                reap(&mut child, "encoder");
                return Err(encoding_failed(format!("failed to start stderr reader: {}", e)).into());
            }
        };

        debug!("Encoder started: {} {} {}", config.ffmpeg_path, args.join(" "), path.display());
        Ok(Self {
            child,
            stdin: Some(stdin),
            stderr: Some(stderr),
            path: path.to_path_buf(),
            frame_bytes: Frame::byte_len(metadata.width, metadata.height),
            frames_written: 0,
        })
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    fn stderr_tail(&mut self) -> String {
        self.stderr.take().map(StderrTail::finish).unwrap_or_default()
    }
}

impl FrameSink for FfmpegEncoder {
    fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        if frame.as_bytes().len() != self.frame_bytes {
            return Err(VideoError::InvalidParameters {
                details: format!(
                    "frame is {}x{}, encoder expects {} bytes",
                    frame.width(),
                    frame.height(),
                    self.frame_bytes
                ),
            }
            .into());
        }

        let written = match self.stdin.as_mut() {
            Some(stdin) => stdin.write_all(frame.as_bytes()),
            None => Err(std::io::ErrorKind::BrokenPipe.into()),
        };
        if let Err(e) = written {
            // The encoder died; its stderr says why
            drop(self.stdin.take());
            reap(&mut self.child, "encoder");
            let tail = self.stderr_tail();
            return Err(VideoError::EncodingFailed {
                reason: format!("writing frame {}: {} ({})", self.frames_written, e, tail),
            }
            .into());
        }

        self.frames_written += 1;
        Ok(())
    }

    fn finish(mut self) -> Result<()> {
        if let Some(mut stdin) = self.stdin.take() {
            stdin.flush().map_err(|e| VideoError::EncodingFailed {
                reason: format!("failed to flush encoder: {}", e),
            })?;
        }

        let status = self.child.wait().map_err(|e| VideoError::EncodingFailed {
            reason: format!("waiting for encoder: {}", e),
        })?;
        let stderr = self.stderr_tail();

        if !status.success() {
            return Err(VideoError::EncodingFailed {
                reason: format!("encoder exited with {}: {}", status, stderr),
            }
            .into());
        }

        info!("Wrote {} frames to {}", self.frames_written, self.path.display());
        Ok(())
    }

    fn abort(mut self) {
        drop(self.stdin.take());
        reap(&mut self.child, "encoder");
        let stderr = self.stderr_tail();
        debug!(
            "Encoder for {} aborted after {} frames: {}",
            self.path.display(),
            self.frames_written,
            stderr
        );
    }
}

impl Drop for FfmpegEncoder {
    fn drop(&mut self) {
        reap(&mut self.child, "encoder");
    }
}

fn encoder_args(metadata: &VideoMetadata, config: &VideoConfig) -> Vec<String> {
    let mut args = vec![
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-y".to_string(),
        "-f".to_string(),
        "rawvideo".to_string(),
        "-pix_fmt".to_string(),
        "bgr24".to_string(),
        "-s:v".to_string(),
        format!("{}x{}", metadata.width, metadata.height),
        "-r".to_string(),
        format!("{}", metadata.fps),
        "-i".to_string(),
        "-".to_string(),
        "-an".to_string(),
        "-c:v".to_string(),
        config.codec.clone(),
        "-pix_fmt".to_string(),
        config.pixel_format.clone(),
    ];
    args.extend(quality_args(&config.codec, config.quality));
    args
}

/// Map the 0-100 quality knob onto the codec's own rate-control flag
fn quality_args(codec: &str, quality: u8) -> Vec<String> {
    match codec {
        "libx264" | "libx265" => vec!["-crf".to_string(), quality_to_crf(quality).to_string()],
        "mpeg4" | "mjpeg" => vec!["-q:v".to_string(), quality_to_qscale(quality).to_string()],
        _ => Vec::new(),
    }
}

fn quality_to_crf(quality: u8) -> u8 {
    (51 - ((quality as f32 / 100.0) * 51.0) as u8).clamp(0, 51)
}

fn quality_to_qscale(quality: u8) -> u8 {
    (31 - ((quality as f32 / 100.0) * 29.0) as u8).clamp(2, 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intermediate_path_inserts_suffix_before_extension() {
        assert_eq!(
            intermediate_path(Path::new("outputs/render_clip.mp4"), "_temp"),
            PathBuf::from("outputs/render_clip_temp.mp4")
        );
        assert_eq!(
            intermediate_path(Path::new("clip.mov"), ".video-only"),
            PathBuf::from("clip.video-only.mov")
        );
        assert_eq!(intermediate_path(Path::new("noext"), "_temp"), PathBuf::from("noext_temp.mp4"));
    }

    #[test]
    fn test_default_intermediate_never_names_a_sibling_output() {
        let suffix = crate::config::RemuxConfig::default().intermediate_suffix;
        let outputs = [Path::new("jobs/a.mp4"), Path::new("jobs/a_temp.mp4"), Path::new("jobs/a-tmp.mp4")];

        let intermediates: Vec<PathBuf> = outputs.iter().map(|o| intermediate_path(o, &suffix)).collect();
        assert_eq!(intermediates[0], PathBuf::from("jobs/a.annotator-tmp.mp4"));
        for intermediate in &intermediates {
            assert!(!outputs.contains(&intermediate.as_path()), "{:?}", intermediate);
        }
    }

    #[test]
    fn test_intermediate_path_is_deterministic() {
        let output = Path::new("/tmp/jobs/a.mp4");
        assert_eq!(intermediate_path(output, "_temp"), intermediate_path(output, "_temp"));
        assert_ne!(
            intermediate_path(output, "_temp"),
            intermediate_path(Path::new("/tmp/jobs/b.mp4"), "_temp")
        );
    }

    #[test]
    fn test_quality_mapping() {
        assert_eq!(quality_to_crf(100), 0);
        assert_eq!(quality_to_crf(0), 51);
        assert_eq!(quality_to_qscale(100), 2);
        assert_eq!(quality_to_qscale(0), 31);
        assert!(quality_args("prores_ks", 80).is_empty());
    }

    #[test]
    fn test_encoder_args_describe_raw_input() {
        let metadata = VideoMetadata {
            width: 320,
            height: 240,
            fps: 2.0,
            frame_count: 10,
            duration: 5.0,
            has_audio: false,
        };
        let args = encoder_args(&metadata, &VideoConfig::default());
        let joined = args.join(" ");

        assert!(joined.contains("-f rawvideo -pix_fmt bgr24 -s:v 320x240 -r 2 -i -"));
        assert!(joined.contains("-an"));
        assert!(joined.contains("-c:v mpeg4"));
        assert!(joined.contains("-q:v"));
    }
}
