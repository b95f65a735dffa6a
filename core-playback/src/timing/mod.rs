//! # Segment Timing
//!
//! Turns the sparse, unit-ambiguous timing records delivered by the catalog
//! into a complete per-segment start-time sequence.
//!
//! ## Pipeline
//!
//! 1. [`normalize_timings`] resolves units and segment keys, producing an
//!    [`AnchorMap`] of trusted start times.
//! 2. [`reconstruct_timeline`] spreads those anchors over every segment by
//!    text weight and repairs the result into a non-decreasing [`Timeline`].
//!
//! Both steps are pure functions.

mod normalize;
mod reconstruct;

pub use normalize::{detect_unit, normalize_timings, AnchorMap, TimingUnit, MILLIS_THRESHOLD};
pub use reconstruct::{
    reconstruct_timeline, Timeline, DEFAULT_STEP_SECONDS, MIN_STEP_SECONDS,
};
