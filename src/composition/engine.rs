use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::{
    annotation::{Annotation, Timeline},
    config::Config,
    error::{Result, VideoError},
    styles::AnnotationRenderer,
    video::{
        finalize_output, intermediate_path, AudioMuxer, FfmpegDecoder, FfmpegEncoder, FfmpegMuxer,
        FrameSource, RemuxOutcome, VideoLoader, VideoMetadata,
    },
};

use super::pipeline::{FramePipeline, PipelineStats};

/// Everything known about one render once its source is open
#[derive(Debug, Clone)]
pub struct RenderJob {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Video-only file written next to `output` before audio is attached
    pub intermediate: PathBuf,
    pub keep_audio: bool,
    pub metadata: VideoMetadata,
}

/// Result of a finished render
#[derive(Debug, Clone, PartialEq)]
pub struct RenderReport {
    pub output: PathBuf,
    pub stats: PipelineStats,
    pub remux: RemuxOutcome,
}

/// Main render engine that burns annotations into a video
///
/// The engine follows a clear pipeline:
/// 1. Validation - Check the configuration, then resolve colors and parameters for every annotation
/// 2. Source Opening - Probe the input and start the decoder
/// 3. Frame Rendering - Draw active annotations on each frame into a video-only file
/// 4. Audio Remux - Attach the source audio, or promote the video-only file as is
pub struct RenderEngine {
    config: Config,
    renderer: AnnotationRenderer,
    muxer: Box<dyn AudioMuxer>,
}

impl RenderEngine {
    /// Create an engine that muxes audio with the configured ffmpeg tool
    pub fn new(config: Config) -> Self {
        let muxer = Box::new(FfmpegMuxer::new(&config.remux));
        Self::with_muxer(config, muxer)
    }

    /// Create an engine with a custom audio muxer
    pub fn with_muxer(config: Config, muxer: Box<dyn AudioMuxer>) -> Self {
        let renderer = AnnotationRenderer::new(config.render.clone());
        Self {
            config,
            renderer,
            muxer,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Render `annotations` onto `input` and write the result to `output`,
    /// returning the output path.
    ///
    /// Nothing is written when the configuration or the annotations are invalid,
    /// or the input cannot be opened. When the audio remux fails, the video-only intermediate is kept
    /// and its path is carried by the error.
    ///
    /// # Arguments
    ///
    /// * `input` - Source video
    /// * `output` - Final video path
    /// * `annotations` - Annotations in stacking order
    /// * `keep_audio` - Copy the source audio track into the output
    pub fn render<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input: P,
        output: Q,
        annotations: &[Annotation],
        keep_audio: bool,
    ) -> Result<PathBuf> {
        self.render_with_report(input, output, annotations, keep_audio)
            .map(|report| report.output)
    }

    /// Same as [`RenderEngine::render`], with frame counts and the remux outcome
    pub fn render_with_report<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input: P,
        output: Q,
        annotations: &[Annotation],
        keep_audio: bool,
    ) -> Result<RenderReport> {
        let input = input.as_ref();
        let output = output.as_ref();

        info!("🎬 Starting annotation render");
        info!("   Input: {:?}", input);
        info!("   Output: {:?}", output);
        info!("   Annotations: {}", annotations.len());
        info!("   Keep audio: {}", keep_audio);

        // Pipeline Step 1: Validation
        self.config.validate()?;
        let timeline = Timeline::from_annotations(annotations)?;

        // Pipeline Step 2: Source Opening
        let (job, decoder) = self.open_job(input, output, keep_audio)?;

        // Pipeline Step 3: Frame Rendering
        let stats = self.render_frames(&job, &timeline, decoder)?;

        // Pipeline Step 4: Audio Remux
        let remux = self.finish_output(&job)?;

        match &remux {
            RemuxOutcome::Muxed => info!("   ✅ Audio remuxed from source"),
            RemuxOutcome::VideoOnly { reason } => info!("   ✅ Video-only output ({:?})", reason),
        }
        info!("🎉 Render complete! Output saved to: {:?}", job.output);
        Ok(RenderReport {
            output: job.output,
            stats,
            remux,
        })
    }

    // ==========================================
    // PIPELINE STEP 2: SOURCE OPENING
    // ==========================================

    fn open_job(
        &self,
        input: &Path,
        output: &Path,
        keep_audio: bool,
    ) -> Result<(RenderJob, FfmpegDecoder)> {
        info!("📹 Opening source video...");

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.is_dir() {
                return Err(VideoError::EncodingFailed {
                    reason: format!("output directory {} does not exist", parent.display()),
                }
                .into());
            }
        }

        let loader = VideoLoader::new(&self.config.video);
        let decoder = loader.open(input)?;
        let metadata = decoder.metadata().clone();

        let job = RenderJob {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            intermediate: intermediate_path(output, &self.config.remux.intermediate_suffix),
            keep_audio,
            metadata,
        };

        if keep_audio && !job.metadata.has_audio {
            debug!("Source has no audio track; remux will only copy video");
        }
        debug!("Intermediate output: {:?}", job.intermediate);
        Ok((job, decoder))
    }

    // ==========================================
    // PIPELINE STEP 3: FRAME RENDERING
    // ==========================================

    fn render_frames(
        &self,
        job: &RenderJob,
        timeline: &Timeline,
        decoder: FfmpegDecoder,
    ) -> Result<PipelineStats> {
        info!(
            "🖌️  Rendering {} frames at {}x{}...",
            job.metadata.frame_count, job.metadata.width, job.metadata.height
        );

        let mut pipeline = FramePipeline::new(timeline, &self.renderer);
        let result = pipeline.run(decoder, |metadata| {
            FfmpegEncoder::create(&job.intermediate, metadata, &self.config.video)
        });

        if result.is_err() && job.intermediate.exists() {
            warn!("Render failed; removing partial output {:?}", job.intermediate);
            let _ = std::fs::remove_file(&job.intermediate);
        }
        result
    }

    // ==========================================
    // PIPELINE STEP 4: AUDIO REMUX
    // ==========================================

    fn finish_output(&self, job: &RenderJob) -> Result<RemuxOutcome> {
        info!("🔊 Finalizing output...");
        finalize_output(
            self.muxer.as_ref(),
            job.keep_audio,
            &job.intermediate,
            &job.input,
            &job.output,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AnnotationError, AnnotatorError, ConfigError};
    use tempfile::tempdir;

    struct NeverMuxer;

    impl AudioMuxer for NeverMuxer {
        fn is_available(&self) -> bool {
            false
        }

        fn mux(&self, _video_only: &Path, _audio_source: &Path, _output: &Path) -> Result<()> {
            Err(AnnotatorError::generic("not expected"))
        }
    }

    #[test]
    fn test_invalid_annotation_fails_before_touching_files() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("out.mp4");
        let engine = RenderEngine::with_muxer(Config::default(), Box::new(NeverMuxer));

        let mut ann = Annotation::new(4, 0.0, 0.0, 0.0);
        ann.color = "blue".to_string();

        let err = engine
            .render(dir.path().join("missing.mp4"), &output, &[ann], true)
            .unwrap_err();

        assert!(matches!(
            err,
            AnnotatorError::Annotation(AnnotationError::InvalidColor { id: 4, .. })
        ));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_missing_source_creates_no_output() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("out.mp4");
        let engine = RenderEngine::with_muxer(Config::default(), Box::new(NeverMuxer));

        let err = engine
            .render(dir.path().join("missing.mp4"), &output, &[], false)
            .unwrap_err();

        assert!(matches!(err, AnnotatorError::Video(VideoError::OpenFailed { .. })));
        assert!(!output.exists());
        assert!(!intermediate_path(&output, &Config::default().remux.intermediate_suffix).exists());
    }

    #[test]
    fn test_missing_output_directory_is_a_resource_error() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.mp4");
        std::fs::write(&input, b"not really a video").unwrap();
        let engine = RenderEngine::with_muxer(Config::default(), Box::new(NeverMuxer));

        let err = engine
            .render(&input, dir.path().join("nope").join("out.mp4"), &[], false)
            .unwrap_err();

        assert!(matches!(err, AnnotatorError::Video(VideoError::EncodingFailed { .. })));
    }

    #[test]
    fn test_opaque_panels_are_rejected_before_rendering() {
        let dir = tempdir().unwrap();
        let mut config = Config::default();
        config.render.panel_opacity = 1.0;
        let engine = RenderEngine::with_muxer(config, Box::new(NeverMuxer));

        let err = engine
            .render(dir.path().join("missing.mp4"), dir.path().join("out.mp4"), &[], false)
            .unwrap_err();

        assert!(matches!(
            err,
            AnnotatorError::Config(ConfigError::InvalidValue { ref key, .. }) if key == "render.panel_opacity"
        ));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
