//! Self-clocking demodulation.
//!
//! Samples where both channels are high are clock markers. The sample halfway between
//! two consecutive markers carries the data: channel 1 alone high is a `1`, channel 0
//! alone high is a `0`. An interval whose midpoint is anything else is ambiguous and
//! produces no bit at all, so decoded bit indices do not map 1:1 onto marker intervals.
//!
//! When gap tracking is enabled each dropped interval is recorded as a [Gap] so callers
//! can tell where the decoded stream is discontinuous.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, span, trace, Level};

use crate::channels::Sample;
use crate::observer::{tick, Observer, Stage};

/// Options for [demodulate].
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DemodOpts {
    pub track_gaps: bool,
}

impl DemodOpts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a [Gap] for every ambiguous interval.
    pub fn with_gap_tracking(mut self, enabled: bool) -> Self {
        self.track_gaps = enabled;
        self
    }
}

/// An ambiguous interval that produced no bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Gap {
    /// Index into the decoded bits where the missing bit would have been.
    pub bit_index: usize,
    /// Sample index of the marker opening the interval.
    pub start: usize,
    /// Sample index of the marker closing the interval.
    pub end: usize,
}

/// Output of [demodulate].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Demodulated {
    /// Decoded bits; every value is 0 or 1.
    pub bits: Vec<u8>,
    /// Number of clock markers found, including the first.
    pub markers: usize,
    /// Number of intervals dropped as ambiguous.
    pub dropped: usize,
    /// Dropped intervals, only populated when gap tracking is enabled.
    pub gaps: Vec<Gap>,
}

/// Decode the data value for the interval between two markers, or `None` if the midpoint
/// sample is ambiguous.
#[must_use]
pub fn decode_interval(samples: &[Sample], start: usize, end: usize) -> Option<u8> {
    let mid = (start + end) / 2;
    match samples.get(mid)? {
        Sample { ch0: 0, ch1: 1 } => Some(1),
        Sample { ch0: 1, ch1: 0 } => Some(0),
        _ => None,
    }
}

/// Indices of all clock marker samples, in order.
pub fn marker_indices(samples: &[Sample], observer: &mut dyn Observer) -> Vec<usize> {
    let total = samples.len();
    let mut markers = Vec::new();
    for (i, s) in samples.iter().enumerate() {
        tick(observer, Stage::Demodulate, i, total);
        if s.is_marker() {
            markers.push(i);
        }
    }
    observer.on_progress(Stage::Demodulate, total, total);
    markers
}

/// Demodulate `samples` into a bit sequence.
pub fn demodulate(samples: &[Sample], opts: &DemodOpts, observer: &mut dyn Observer) -> Demodulated {
    let span = span!(Level::DEBUG, "demodulate", samples = samples.len());
    let _guard = span.enter();

    let markers = marker_indices(samples, observer);
    let mut zult = Demodulated {
        bits: Vec::with_capacity(markers.len().saturating_sub(1)),
        markers: markers.len(),
        ..Default::default()
    };

    for pair in markers.windows(2) {
        let (start, end) = (pair[0], pair[1]);
        match decode_interval(samples, start, end) {
            Some(bit) => zult.bits.push(bit),
            None => {
                trace!(start, end, "ambiguous interval");
                zult.dropped += 1;
                if opts.track_gaps {
                    zult.gaps.push(Gap {
                        bit_index: zult.bits.len(),
                        start,
                        end,
                    });
                }
            }
        }
    }

    debug!(
        markers = zult.markers,
        bits = zult.bits.len(),
        dropped = zult.dropped,
        "demodulated"
    );
    zult
}
