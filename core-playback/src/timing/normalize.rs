use bridge_traits::RawTiming;
use std::collections::BTreeMap;

/// Segment key to earliest start time in seconds.
pub type AnchorMap = BTreeMap<String, f64>;

/// Raw maxima at or above this value can only be milliseconds.
pub const MILLIS_THRESHOLD: f64 = 10_000.0;

/// Ratio over the duration hint past which raw values are taken as milliseconds.
const HINT_RATIO: f64 = 1.5;

/// Unit of the raw `start` values in one timing payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimingUnit {
    Seconds,
    Milliseconds,
}

impl TimingUnit {
    fn to_seconds(self, raw: f64) -> f64 {
        match self {
            TimingUnit::Seconds => raw,
            TimingUnit::Milliseconds => raw / 1000.0,
        }
    }
}

/// Decides the unit of a payload from its largest raw value.
///
/// A payload whose maximum reaches [`MILLIS_THRESHOLD`], or exceeds 1.5x a
/// positive duration hint, is in milliseconds.
pub fn detect_unit(max_raw: f64, duration_hint: Option<f64>) -> TimingUnit {
    if max_raw >= MILLIS_THRESHOLD {
        return TimingUnit::Milliseconds;
    }

    match duration_hint {
        Some(hint) if hint.is_finite() && hint > 0.0 && max_raw > hint * HINT_RATIO => {
            TimingUnit::Milliseconds
        }
        _ => TimingUnit::Seconds,
    }
}

fn resolve_key(recording_id: u32, record: &RawTiming) -> Option<String> {
    if let Some(key) = record.segment_key.as_deref().map(str::trim) {
        if !key.is_empty() {
            return Some(key.to_string());
        }
    }

    match record.ordinal {
        Some(ordinal) if ordinal > 0 => Some(format!("{}:{}", recording_id, ordinal)),
        _ => None,
    }
}

/// Normalizes raw timing records into trusted anchors.
///
/// Records without a usable key are dropped, as are negative or non-finite
/// starts. When several records share a key the earliest start wins.
pub fn normalize_timings(
    recording_id: u32,
    records: &[RawTiming],
    duration_hint: Option<f64>,
) -> AnchorMap {
    let max_raw = records
        .iter()
        .map(|r| r.start)
        .filter(|s| s.is_finite())
        .fold(f64::NEG_INFINITY, f64::max);

    let mut anchors = AnchorMap::new();
    if !max_raw.is_finite() {
        return anchors;
    }

    let unit = detect_unit(max_raw, duration_hint);

    for record in records {
        if !record.start.is_finite() || record.start < 0.0 {
            continue;
        }
        let Some(key) = resolve_key(recording_id, record) else {
            continue;
        };

        let start = unit.to_seconds(record.start);
        anchors
            .entry(key)
            .and_modify(|existing| {
                if start < *existing {
                    *existing = start;
                }
            })
            .or_insert(start);
    }

    anchors
}
