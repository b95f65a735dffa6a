//! # Current-Segment Locator
//!
//! Maps a playback position to the segment being recited, and back.
//!
//! Two modes exist:
//! - **Precise**: a complete timeline is available and the active segment is
//!   the last one whose start time is at or before the position.
//! - **Weighted**: no usable timeline; the position's fraction of the total
//!   duration is matched against cumulative text weight.
//!
//! All functions are pure and total: out-of-range positions clamp to the
//! first or last segment, and nothing here panics on empty input.

use bridge_traits::Segment;
use std::sync::Arc;

/// How a position is being mapped to a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocatorMode {
    Precise,
    Weighted,
}

fn is_precise(segments: &[Segment], timeline: &[f64]) -> bool {
    !segments.is_empty() && timeline.len() == segments.len()
}

fn usable_duration(duration: Option<f64>) -> Option<f64> {
    duration.filter(|d| d.is_finite() && *d > 0.0)
}

/// Index of the active segment at `position` seconds.
///
/// Returns `None` for an empty segment list, or when there is neither a
/// complete timeline nor a positive duration to estimate from.
pub fn locate(
    position: f64,
    duration: Option<f64>,
    segments: &[Segment],
    timeline: &[f64],
) -> Option<usize> {
    if segments.is_empty() {
        return None;
    }
    let last = segments.len() - 1;

    if is_precise(segments, timeline) {
        // Equal starts resolve to the later segment
        let idx = timeline.partition_point(|start| *start <= position);
        return Some(idx.saturating_sub(1).min(last));
    }

    let duration = usable_duration(duration)?;
    let mut fraction = (position / duration).clamp(0.0, 1.0);
    if fraction.is_nan() {
        fraction = 0.0;
    }

    let total: f64 = segments.iter().map(Segment::weight).sum();
    let target = fraction * total;

    let mut cumulative = 0.0;
    for (idx, segment) in segments.iter().enumerate() {
        cumulative += segment.weight();
        if cumulative > target {
            return Some(idx);
        }
    }

    Some(last)
}

/// Position in seconds at which segment `index` begins.
///
/// `index` is clamped to the segment range. Weighted estimates are clamped to
/// `[0, duration]`.
pub fn seek_position(
    index: usize,
    duration: Option<f64>,
    segments: &[Segment],
    timeline: &[f64],
) -> Option<f64> {
    if segments.is_empty() {
        return None;
    }
    let index = index.min(segments.len() - 1);

    if is_precise(segments, timeline) {
        return Some(timeline[index]);
    }

    let duration = usable_duration(duration)?;
    let total: f64 = segments.iter().map(Segment::weight).sum();
    let before: f64 = segments[..index].iter().map(Segment::weight).sum();

    Some((duration * before / total).clamp(0.0, duration))
}

/// Segments of the current recording paired with their timeline.
///
/// Cheap to clone. A timeline whose length disagrees with the segment list
/// is discarded, which puts the locator in weighted mode.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SegmentLocator {
    segments: Arc<[Segment]>,
    timeline: Arc<[f64]>,
}

impl SegmentLocator {
    pub fn new(segments: Vec<Segment>, timeline: Vec<f64>) -> Self {
        let timeline = if timeline.len() == segments.len() {
            timeline
        } else {
            Vec::new()
        };

        Self {
            segments: segments.into(),
            timeline: timeline.into(),
        }
    }

    /// Segments only; positions are estimated by weight.
    pub fn weighted(segments: Vec<Segment>) -> Self {
        Self::new(segments, Vec::new())
    }

    pub fn mode(&self) -> LocatorMode {
        if is_precise(&self.segments, &self.timeline) {
            LocatorMode::Precise
        } else {
            LocatorMode::Weighted
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn timeline(&self) -> &[f64] {
        &self.timeline
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn locate(&self, position: f64, duration: Option<f64>) -> Option<usize> {
        locate(position, duration, &self.segments, &self.timeline)
    }

    pub fn seek_position(&self, index: usize, duration: Option<f64>) -> Option<f64> {
        seek_position(index, duration, &self.segments, &self.timeline)
    }
}
