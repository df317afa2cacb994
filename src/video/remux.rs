//! Attaches the source audio to the rendered video-only file.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, info, warn};

use crate::config::RemuxConfig;
use crate::error::{RemuxError, Result};

/// External muxing tool behind a swappable interface
pub trait AudioMuxer: Send + Sync {
    /// Whether the tool can be run at all
    fn is_available(&self) -> bool;

    /// Copy the video track of `video_only`, take audio (if any) from `audio_source`,
    /// and write the combined file to `output`
    fn mux(&self, video_only: &Path, audio_source: &Path, output: &Path) -> Result<()>;
}

/// Muxes with the ffmpeg command-line tool
#[derive(Debug, Clone)]
pub struct FfmpegMuxer {
    tool: String,
    audio_codec: String,
}

impl FfmpegMuxer {
    pub fn new(config: &RemuxConfig) -> Self {
        Self {
            tool: config.tool.clone(),
            audio_codec: config.audio_codec.clone(),
        }
    }

    fn mux_args(&self, video_only: &Path, audio_source: &Path, output: &Path) -> Vec<std::ffi::OsString> {
        let mut args: Vec<std::ffi::OsString> = Vec::new();
        args.extend(["-hide_banner", "-loglevel", "error", "-y", "-i"].map(std::ffi::OsString::from));
        args.push(video_only.into());
        args.push("-i".into());
        args.push(audio_source.into());
        // `1:a?` keeps sources without an audio track from failing the job
        args.extend(["-map", "0:v", "-map", "1:a?", "-c:v", "copy", "-c:a"].map(std::ffi::OsString::from));
        args.push(self.audio_codec.clone().into());
        args.push("-shortest".into());
        args.push(output.into());
        args
    }
}

impl AudioMuxer for FfmpegMuxer {
    fn is_available(&self) -> bool {
        Command::new(&self.tool)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    fn mux(&self, video_only: &Path, audio_source: &Path, output: &Path) -> Result<()> {
        let args = self.mux_args(video_only, audio_source, output);
        debug!("Running {} {:?}", self.tool, args);

        let result = Command::new(&self.tool)
            .args(&args)
            .stdin(Stdio::null())
            .output();

        let output = match result {
            Ok(output) => output,
            Err(e) => {
                return Err(RemuxError::ToolFailed {
                    tool: self.tool.clone(),
                    status: "spawn failure".to_string(),
                    stderr: e.to_string(),
                    intermediate: video_only.to_path_buf(),
                }
                .into())
            }
        };

        if !output.status.success() {
            return Err(RemuxError::ToolFailed {
                tool: self.tool.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                intermediate: video_only.to_path_buf(),
            }
            .into());
        }

        Ok(())
    }
}

/// How the final output was produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemuxOutcome {
    /// Audio remuxed in; the intermediate was deleted
    Muxed,
    /// The intermediate was renamed to the output untouched
    VideoOnly { reason: VideoOnlyReason },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoOnlyReason {
    AudioNotRequested,
    MuxerUnavailable,
}

/// Turn the video-only intermediate into the final output.
///
/// A muxer failure is returned as an error and the intermediate is left in place.
pub fn finalize_output(
    muxer: &dyn AudioMuxer,
    keep_audio: bool,
    intermediate: &Path,
    audio_source: &Path,
    output: &Path,
) -> Result<RemuxOutcome> {
    let reason = if !keep_audio {
        VideoOnlyReason::AudioNotRequested
    } else if !muxer.is_available() {
        warn!("Audio requested but the muxing tool is not available; writing video only");
        VideoOnlyReason::MuxerUnavailable
    } else {
        info!("Remuxing audio from {}", audio_source.display());
        muxer.mux(intermediate, audio_source, output)?;

        if let Err(e) = std::fs::remove_file(intermediate) {
            warn!("Could not remove intermediate {}: {}", intermediate.display(), e);
        }
        return Ok(RemuxOutcome::Muxed);
    };

    debug!("Skipping remux ({:?})", reason);
    move_file(intermediate, output)?;
    Ok(RemuxOutcome::VideoOnly { reason })
}

fn move_file(from: &Path, to: &Path) -> Result<()> {
    let finalize_failed = |e: std::io::Error| RemuxError::FinalizeFailed {
        from: PathBuf::from(from),
        to: PathBuf::from(to),
        reason: e.to_string(),
    };

    if std::fs::rename(from, to).is_ok() {
        return Ok(());
    }

    // rename cannot cross filesystems
    std::fs::copy(from, to).map_err(finalize_failed)?;
    std::fs::remove_file(from).map_err(finalize_failed)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::tempdir;

    use crate::error::AnnotatorError;

    struct FakeMuxer {
        available: bool,
        fail: bool,
        calls: Mutex<Vec<(PathBuf, PathBuf, PathBuf)>>,
    }

    impl FakeMuxer {
        fn new(available: bool, fail: bool) -> Self {
            Self {
                available,
                fail,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl AudioMuxer for FakeMuxer {
        fn is_available(&self) -> bool {
            self.available
        }

        fn mux(&self, video_only: &Path, audio_source: &Path, output: &Path) -> Result<()> {
            self.calls.lock().unwrap().push((
                video_only.to_path_buf(),
                audio_source.to_path_buf(),
                output.to_path_buf(),
            ));
            if self.fail {
                return Err(RemuxError::ToolFailed {
                    tool: "fake".to_string(),
                    status: "exit status: 1".to_string(),
                    stderr: "no such stream".to_string(),
                    intermediate: video_only.to_path_buf(),
                }
                .into());
            }
            let mut bytes = std::fs::read(video_only)?;
            bytes.extend_from_slice(b"+audio");
            std::fs::write(output, bytes)?;
            Ok(())
        }
    }

    fn fixture() -> (tempfile::TempDir, PathBuf, PathBuf, PathBuf) {
        let dir = tempdir().unwrap();
        let intermediate = dir.path().join("out.annotator-tmp.mp4");
        let source = dir.path().join("in.mp4");
        let output = dir.path().join("out.mp4");
        std::fs::write(&intermediate, b"video-only-bytes").unwrap();
        std::fs::write(&source, b"source").unwrap();
        (dir, intermediate, source, output)
    }

    #[test]
    fn test_no_audio_renames_intermediate_byte_for_byte() {
        let (_dir, intermediate, source, output) = fixture();
        let muxer = FakeMuxer::new(true, false);

        let outcome = finalize_output(&muxer, false, &intermediate, &source, &output).unwrap();

        assert_eq!(
            outcome,
            RemuxOutcome::VideoOnly { reason: VideoOnlyReason::AudioNotRequested }
        );
        assert_eq!(std::fs::read(&output).unwrap(), b"video-only-bytes");
        assert!(!intermediate.exists());
        assert!(muxer.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unavailable_muxer_falls_back_to_video_only() {
        let (_dir, intermediate, source, output) = fixture();
        let muxer = FakeMuxer::new(false, false);

        let outcome = finalize_output(&muxer, true, &intermediate, &source, &output).unwrap();

        assert_eq!(
            outcome,
            RemuxOutcome::VideoOnly { reason: VideoOnlyReason::MuxerUnavailable }
        );
        assert_eq!(std::fs::read(&output).unwrap(), b"video-only-bytes");
        assert!(muxer.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_successful_mux_removes_intermediate() {
        let (_dir, intermediate, source, output) = fixture();
        let muxer = FakeMuxer::new(true, false);

        let outcome = finalize_output(&muxer, true, &intermediate, &source, &output).unwrap();

        assert_eq!(outcome, RemuxOutcome::Muxed);
        assert_eq!(std::fs::read(&output).unwrap(), b"video-only-bytes+audio");
        assert!(!intermediate.exists());

        let calls = muxer.calls.lock().unwrap();
        assert_eq!(calls.as_slice(), &[(intermediate.clone(), source.clone(), output.clone())]);
    }

    #[test]
    fn test_mux_failure_keeps_intermediate() {
        let (_dir, intermediate, source, output) = fixture();
        let muxer = FakeMuxer::new(true, true);

        let err = finalize_output(&muxer, true, &intermediate, &source, &output).unwrap_err();

        assert!(matches!(err, AnnotatorError::Remux(RemuxError::ToolFailed { .. })));
        assert_eq!(err.intermediate_path(), Some(intermediate.as_path()));
        assert!(intermediate.exists());
        assert!(!output.exists());
    }

    #[test]
    fn test_ffmpeg_mux_arguments() {
        let muxer = FfmpegMuxer::new(&RemuxConfig::default());
        let args: Vec<String> = muxer
            .mux_args(Path::new("v.mp4"), Path::new("src.mov"), Path::new("out.mp4"))
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        assert_eq!(
            args.join(" "),
            "-hide_banner -loglevel error -y -i v.mp4 -i src.mov -map 0:v -map 1:a? -c:v copy -c:a aac -shortest out.mp4"
        );
    }

    #[test]
    fn test_missing_tool_is_unavailable() {
        let muxer = FfmpegMuxer::new(&RemuxConfig {
            tool: "definitely-not-a-real-muxer-binary".to_string(),
            ..RemuxConfig::default()
        });
        assert!(!muxer.is_available());
    }
}
