#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{Frame, PartialMatch, SYNC_PATTERN_BITS};
use crate::bits::to_digits;

/// Default number of leading bits included in [Diagnostics::preview].
pub const DEFAULT_PREVIEW_BITS: usize = 1000;

/// Information for figuring out why synchronization failed.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Diagnostics {
    /// Leading decoded bits as `'0'`/`'1'` characters.
    pub preview: String,
    /// The first [SYNC_PATTERN_BITS] decoded bits as `'0'`/`'1'` characters.
    pub head: String,
    pub partial_matches: Vec<PartialMatch>,
}

impl Diagnostics {
    /// Build diagnostics if they are warranted, i.e., there are decoded bits but no frames
    /// were found. Otherwise `None`.
    #[must_use]
    pub fn collect(
        bits: &[u8],
        frames: &[Frame],
        partial_matches: &[PartialMatch],
        preview_bits: usize,
    ) -> Option<Self> {
        if bits.is_empty() || !frames.is_empty() {
            return None;
        }
        Some(Diagnostics {
            preview: to_digits(&bits[..preview_bits.min(bits.len())]),
            head: to_digits(&bits[..SYNC_PATTERN_BITS.min(bits.len())]),
            partial_matches: partial_matches.to_vec(),
        })
    }

    /// One line per partial match.
    #[must_use]
    pub fn partial_match_lines(&self) -> Vec<String> {
        self.partial_matches.iter().map(ToString::to_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_when_bits_and_no_frames() {
        assert!(Diagnostics::collect(&[], &[], &[], DEFAULT_PREVIEW_BITS).is_none());

        let frame = Frame::from_region(&[1; 8], 0, 8);
        assert!(Diagnostics::collect(&[1; 8], &[frame], &[], DEFAULT_PREVIEW_BITS).is_none());

        let diag = Diagnostics::collect(&[1, 0, 1], &[], &[], DEFAULT_PREVIEW_BITS).unwrap();
        assert_eq!(diag.preview, "101");
        assert_eq!(diag.head, "101");
        assert!(diag.partial_match_lines().is_empty());
    }

    #[test]
    fn preview_is_truncated() {
        let bits: Vec<u8> = (0..2000).map(|i| (i % 2) as u8).collect();
        let diag = Diagnostics::collect(&bits, &[], &[], DEFAULT_PREVIEW_BITS).unwrap();
        assert_eq!(diag.preview.len(), 1000);
        assert_eq!(diag.head.len(), 32);
        assert!(diag.head.starts_with("0101"));
    }

    #[test]
    fn lists_partial_matches() {
        let pm = PartialMatch {
            position: 7,
            score: 21,
            observed: vec![0, 1, 1],
        };
        let diag = Diagnostics::collect(&[0; 40], &[], &[pm], 10).unwrap();
        assert_eq!(diag.preview, "0000000000");
        assert_eq!(diag.partial_match_lines(), vec!["position: 7, data: 011"]);
    }
}
