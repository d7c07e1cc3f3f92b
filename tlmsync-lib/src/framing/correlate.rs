use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, span, Level};

use super::{SyncOpts, SYNC_PATTERN_BITS};
use crate::bits::to_digits;
use crate::observer::{tick, Observer, Stage};

/// A position where the leading bits of the sync pattern nearly match.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PartialMatch {
    /// Index into the decoded bits.
    pub position: usize,
    /// Number of agreeing bits within the correlation window.
    pub score: usize,
    /// Up to [SYNC_PATTERN_BITS] observed bits starting at `position`.
    pub observed: Vec<u8>,
}

impl fmt::Display for PartialMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "position: {}, data: {}",
            self.position,
            to_digits(&self.observed)
        )
    }
}

/// Number of positions where `window` agrees with `reference`.
#[inline]
#[must_use]
pub fn score(window: &[u8], reference: &[u8]) -> usize {
    window
        .iter()
        .zip(reference)
        .filter(|(a, b)| a == b)
        .count()
}

/// Score every window of `opts.window` bits against the leading bits of the sync pattern
/// and return those scoring at least `opts.threshold`.
///
/// This is an exhaustive pass independent of frame synchronization, so exact matches are
/// reported here as well.
pub fn correlate(bits: &[u8], opts: &SyncOpts, observer: &mut dyn Observer) -> Vec<PartialMatch> {
    let span = span!(Level::DEBUG, "correlate", bits = bits.len());
    let _guard = span.enter();

    if opts.window == 0 || opts.window > SYNC_PATTERN_BITS {
        return Vec::new();
    }
    let reference = &opts.pattern[..opts.window];
    let total = bits.len();
    let mut matches = Vec::new();

    for (k, window) in bits.windows(opts.window).enumerate() {
        tick(observer, Stage::Correlate, k, total);
        let agree = score(window, reference);
        if agree >= opts.threshold {
            let end = (k + SYNC_PATTERN_BITS).min(total);
            matches.push(PartialMatch {
                position: k,
                score: agree,
                observed: bits[k..end].to_vec(),
            });
        }
    }
    observer.on_progress(Stage::Correlate, total, total);

    debug!(partial_matches = matches.len(), "correlated");
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framing::SYNC_PATTERN;
    use crate::observer::NoopObserver;
    use test_case::test_case;

    /// The first 24 pattern bits with the first `flips` of them inverted.
    fn flipped(flips: usize) -> Vec<u8> {
        SYNC_PATTERN[..24]
            .iter()
            .enumerate()
            .map(|(i, b)| if i < flips { 1 - b } else { *b })
            .collect()
    }

    #[test_case(0, true ; "exact")]
    #[test_case(4, true ; "twenty of twenty four")]
    #[test_case(5, false ; "nineteen of twenty four")]
    fn threshold_boundary(flips: usize, expected: bool) {
        let bits = flipped(flips);
        let matches = correlate(&bits, &SyncOpts::default(), &mut NoopObserver);
        assert_eq!(!matches.is_empty(), expected, "{matches:?}");
        if expected {
            assert_eq!(matches[0].position, 0);
            assert_eq!(matches[0].score, 24 - flips);
            // Fewer than 32 bits available
            assert_eq!(matches[0].observed, bits);
        }
    }

    #[test]
    fn observed_spans_pattern_length() {
        let mut bits = vec![0u8; 8];
        bits.extend_from_slice(&SYNC_PATTERN);
        bits.extend_from_slice(&[1; 8]);
        let matches = correlate(&bits, &SyncOpts::default(), &mut NoopObserver);
        let exact = matches
            .iter()
            .find(|m| m.position == 8)
            .expect("exact match to be reported");
        assert_eq!(exact.score, 24);
        assert_eq!(exact.observed, SYNC_PATTERN.to_vec());
        assert_eq!(
            exact.to_string(),
            "position: 8, data: 00011010110011111111110000011101"
        );
    }

    #[test]
    fn short_input_has_no_windows() {
        let matches = correlate(&SYNC_PATTERN[..23], &SyncOpts::default(), &mut NoopObserver);
        assert!(matches.is_empty());
    }

    #[test]
    fn custom_threshold() {
        let opts = SyncOpts::default().with_correlation(24, 19).unwrap();
        let matches = correlate(&flipped(5), &opts, &mut NoopObserver);
        assert_eq!(matches.len(), 1);
    }
}
