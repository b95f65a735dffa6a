use bridge_traits::Segment;

use super::AnchorMap;

/// Per-segment start times in seconds, same length as the segment list.
///
/// Always non-decreasing with a non-negative first element. An empty
/// timeline means no precise timing is available.
pub type Timeline = Vec<f64>;

/// Extrapolation step when neither anchors nor a duration give one.
pub const DEFAULT_STEP_SECONDS: f64 = 2.5;

/// Lower bound for the duration-derived extrapolation step.
pub const MIN_STEP_SECONDS: f64 = 0.1;

fn fallback_step(total_duration: Option<f64>, segment_count: usize) -> f64 {
    match total_duration {
        Some(duration) if duration.is_finite() && duration > 0.0 && segment_count > 0 => {
            (duration / segment_count as f64).max(MIN_STEP_SECONDS)
        }
        _ => DEFAULT_STEP_SECONDS,
    }
}

fn step_between(a: (usize, f64), b: (usize, f64), fallback: f64) -> f64 {
    let step = (b.1 - a.1) / (b.0 - a.0) as f64;
    if step.is_finite() && step > 0.0 {
        step
    } else {
        fallback
    }
}

/// Builds a complete timeline from sparse anchors.
///
/// Requires at least two segments with an anchor; otherwise returns an empty
/// timeline so callers fall back to weighted locating. Unknown segments
/// between two anchors share the span in proportion to their text weight.
/// Segments before the first or after the last anchor are extrapolated with
/// the step implied by the two nearest anchors.
pub fn reconstruct_timeline(
    segments: &[Segment],
    anchors: &AnchorMap,
    total_duration: Option<f64>,
) -> Timeline {
    let mut starts: Vec<Option<f64>> = segments
        .iter()
        .map(|segment| anchors.get(&segment.key).copied())
        .collect();

    let known: Vec<(usize, f64)> = starts
        .iter()
        .enumerate()
        .filter_map(|(idx, start)| start.map(|s| (idx, s)))
        .collect();

    if known.len() < 2 {
        return Timeline::new();
    }

    for pair in known.windows(2) {
        let (i0, t0) = pair[0];
        let (i1, t1) = pair[1];
        if i1 - i0 < 2 {
            continue;
        }

        let span = (t1 - t0).max(0.0);
        let total_weight: f64 = segments[i0..i1].iter().map(Segment::weight).sum();
        let mut covered = 0.0;
        for k in (i0 + 1)..i1 {
            covered += segments[k - 1].weight();
            starts[k] = Some(t0 + span * covered / total_weight);
        }
    }

    let fallback = fallback_step(total_duration, segments.len());

    let (first_idx, first_start) = known[0];
    let lead = step_between(known[0], known[1], fallback);
    for (k, start) in starts.iter_mut().enumerate().take(first_idx) {
        *start = Some(first_start - lead * (first_idx - k) as f64);
    }

    let (last_idx, last_start) = known[known.len() - 1];
    let trail = step_between(known[known.len() - 2], known[known.len() - 1], fallback);
    for (k, start) in starts.iter_mut().enumerate().skip(last_idx + 1) {
        *start = Some(last_start + trail * (k - last_idx) as f64);
    }

    let mut timeline = Timeline::with_capacity(starts.len());
    let mut previous = 0.0_f64;
    for start in starts {
        let value = start.unwrap_or(previous).max(previous);
        timeline.push(value);
        previous = value;
    }

    timeline
}
