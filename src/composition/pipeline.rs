use tracing::{debug, info, warn};

use crate::annotation::Timeline;
use crate::error::{Result, VideoError};
use crate::styles::AnnotationRenderer;
use crate::video::{Frame, FrameSink, FrameSource, VideoMetadata};

/// Stage of a frame pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Opening,
    Decoding,
    Closing,
}

/// Counters from a finished run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub frames_written: u64,
    /// Frames with at least one annotation drawn on them
    pub annotated_frames: u64,
    pub annotations_drawn: u64,
}

/// Decodes every frame, draws the annotations active at its timestamp, and
/// writes it to the sink
pub struct FramePipeline<'a> {
    timeline: &'a Timeline,
    renderer: &'a AnnotationRenderer,
    state: PipelineState,
}

impl<'a> FramePipeline<'a> {
    pub fn new(timeline: &'a Timeline, renderer: &'a AnnotationRenderer) -> Self {
        Self {
            timeline,
            renderer,
            state: PipelineState::Opening,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    fn enter(&mut self, state: PipelineState) {
        debug!("Pipeline {:?} -> {:?}", self.state, state);
        self.state = state;
    }

    /// Run `source` to exhaustion.
    ///
    /// The sink is only opened once the source is known to be readable, so a bad
    /// source never leaves an output file behind. Both ends are closed before
    /// returning, and a close failure fails the run. When either end fails, the
    /// other is aborted before the error is returned.
    pub fn run<S, K, F>(&mut self, mut source: S, open_sink: F) -> Result<PipelineStats>
    where
        S: FrameSource,
        K: FrameSink,
        F: FnOnce(&VideoMetadata) -> Result<K>,
    {
        self.enter(PipelineState::Opening);
        let metadata = source.metadata().clone();
        if !(metadata.fps.is_finite() && metadata.fps > 0.0) {
            source.abort();
            return Err(VideoError::InvalidParameters {
                details: format!("frame rate must be positive, got {}", metadata.fps),
            }
            .into());
        }

        let mut sink = match open_sink(&metadata) {
            Ok(sink) => sink,
            Err(e) => {
                source.abort();
                return Err(e);
            }
        };

        self.enter(PipelineState::Decoding);
        let stats = match self.decode_all(&mut source, &mut sink, &metadata) {
            Ok(stats) => stats,
            Err(e) => {
                warn!("Frame pipeline failed: {}", e);
                source.abort();
                sink.abort();
                return Err(e);
            }
        };

        self.enter(PipelineState::Closing);
        if let Err(e) = source.close() {
            sink.abort();
            return Err(e);
        }
        sink.finish()?;

        info!(
            "   ✅ {} frames written, {} with annotations",
            stats.frames_written, stats.annotated_frames
        );
        Ok(stats)
    }

    fn decode_all<S: FrameSource, K: FrameSink>(
        &self,
        source: &mut S,
        sink: &mut K,
        metadata: &VideoMetadata,
    ) -> Result<PipelineStats> {
        let mut frame = Frame::new_black(metadata.width, metadata.height);
        let mut stats = PipelineStats::default();
        debug!(
            "Decoding {}x{} @ {:.3}fps with {} annotations",
            metadata.width,
            metadata.height,
            metadata.fps,
            self.timeline.len()
        );

        while source.read_frame(&mut frame)? {
            let t = Timeline::playback_time(stats.frames_written, metadata.fps);

            let mut drawn = 0;
            for active in self.timeline.active_at(t) {
                self.renderer.draw(&mut frame, active.annotation, active.rank);
                drawn += 1;
            }
            if drawn > 0 {
                stats.annotated_frames += 1;
                stats.annotations_drawn += drawn;
            }

            sink.write_frame(&frame)?;
            stats.frames_written += 1;

            if stats.frames_written % 250 == 0 {
                debug!(
                    "   {} frames rendered ({:.1}s, {} active)",
                    stats.frames_written, t, drawn
                );
            }
        }
        Ok(stats)
    }
}
