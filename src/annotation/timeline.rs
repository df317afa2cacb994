use tracing::debug;

use crate::error::Result;

use super::types::{Annotation, ResolvedAnnotation};

/// Inclusive `[start, end]` interval during which an annotation is drawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveWindow {
    pub start: f64,
    pub end: f64,
}

impl ActiveWindow {
    /// Non-positive durations collapse to the single instant `start`
    pub fn new(time_sec: f64, duration_sec: f64) -> Self {
        Self {
            start: time_sec,
            end: time_sec + duration_sec.max(0.0),
        }
    }

    pub fn contains(&self, t: f64) -> bool {
        self.start <= t && t <= self.end
    }
}

/// An annotation visible in the current frame, with its stacking rank
#[derive(Debug, Clone, Copy)]
pub struct ActiveAnnotation<'a> {
    /// 0-based position among the annotations active at this instant
    pub rank: usize,
    pub annotation: &'a ResolvedAnnotation,
}

/// The validated annotation set for one render, queried once per frame
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    annotations: Vec<ResolvedAnnotation>,
}

impl Timeline {
    pub fn new(annotations: Vec<ResolvedAnnotation>) -> Self {
        Self { annotations }
    }

    /// Validate every annotation up front; the first bad one aborts the render
    pub fn from_annotations(annotations: &[Annotation]) -> Result<Self> {
        let resolved = annotations
            .iter()
            .map(Annotation::resolve)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        debug!("Timeline built with {} annotations", resolved.len());
        Ok(Self::new(resolved))
    }

    /// Playback time of a decoded frame
    pub fn playback_time(frame_index: u64, fps: f64) -> f64 {
        frame_index as f64 / fps
    }

    /// Annotations whose window contains `t`, in input order, ranked from 0
    pub fn active_at(&self, t: f64) -> impl Iterator<Item = ActiveAnnotation<'_>> {
        self.annotations
            .iter()
            .filter(move |annotation| annotation.window.contains(t))
            .enumerate()
            .map(|(rank, annotation)| ActiveAnnotation { rank, annotation })
    }

    pub fn annotations(&self) -> &[ResolvedAnnotation] {
        &self.annotations
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }
}
