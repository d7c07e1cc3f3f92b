//! Frame synchronization over a decoded bit stream.
//!
//! Frames start at an exact match of the 32-bit sync pattern and run until the next exact
//! match or the end of the stream. An independent correlation pass reports near misses
//! that are useful when no exact match is found.
mod correlate;
mod diagnostics;
mod synchronizer;

pub use correlate::*;
pub use diagnostics::*;
pub use synchronizer::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::bits::{pack, unpack};
use crate::demod::Gap;
use crate::{Error, Result};

/// Default attached sync marker, `0x1ACFFC1D`.
pub const ASM: [u8; 4] = [0x1a, 0xcf, 0xfc, 0x1d];

/// Number of bits in a sync pattern.
pub const SYNC_PATTERN_BITS: usize = 32;

/// [ASM] as a bit sequence.
#[rustfmt::skip]
pub const SYNC_PATTERN: [u8; SYNC_PATTERN_BITS] = [
    0, 0, 0, 1, 1, 0, 1, 0, 1, 1, 0, 0, 1, 1, 1, 1,
    1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0, 1, 1, 1, 0, 1,
];

/// Number of leading sync pattern bits scored when correlating.
pub const CORRELATION_WINDOW: usize = 24;

/// Minimum number of agreeing bits within [CORRELATION_WINDOW] for a partial match.
pub const CORRELATION_THRESHOLD: usize = 20;

/// Options used for synchronization.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SyncOpts {
    pub pattern: [u8; SYNC_PATTERN_BITS],
    pub window: usize,
    pub threshold: usize,
}

impl Default for SyncOpts {
    fn default() -> Self {
        SyncOpts {
            pattern: SYNC_PATTERN,
            window: CORRELATION_WINDOW,
            threshold: CORRELATION_THRESHOLD,
        }
    }
}

impl SyncOpts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different sync pattern given as bits.
    ///
    /// # Errors
    /// [Error::InvalidSyncPattern] if `pattern` is not exactly [SYNC_PATTERN_BITS] long or
    /// contains values other than 0 and 1.
    pub fn with_pattern(mut self, pattern: &[u8]) -> Result<Self> {
        if pattern.len() != SYNC_PATTERN_BITS {
            return Err(Error::InvalidSyncPattern(format!(
                "expected {SYNC_PATTERN_BITS} bits, got {}",
                pattern.len()
            )));
        }
        if let Some(idx) = pattern.iter().position(|b| *b > 1) {
            return Err(Error::InvalidSyncPattern(format!(
                "value {} at index {idx} is not a bit",
                pattern[idx]
            )));
        }
        self.pattern.copy_from_slice(pattern);
        Ok(self)
    }

    /// Use a different sync pattern given as 4 bytes, MSB first.
    ///
    /// # Errors
    /// [Error::InvalidSyncPattern] if `asm` is not 4 bytes long.
    pub fn with_asm(self, asm: &[u8]) -> Result<Self> {
        if asm.len() * 8 != SYNC_PATTERN_BITS {
            return Err(Error::InvalidSyncPattern(format!(
                "expected {} bytes, got {}",
                SYNC_PATTERN_BITS / 8,
                asm.len()
            )));
        }
        self.with_pattern(&unpack(asm))
    }

    /// Change the correlation window and threshold used to find partial matches.
    ///
    /// # Errors
    /// [Error::CorrelationConfig] if `window` is 0 or longer than the pattern, or if
    /// `threshold` is 0 or greater than `window`.
    pub fn with_correlation(mut self, window: usize, threshold: usize) -> Result<Self> {
        if window == 0 || window > SYNC_PATTERN_BITS {
            return Err(Error::CorrelationConfig(format!(
                "window must be 1..={SYNC_PATTERN_BITS}, got {window}"
            )));
        }
        if threshold == 0 || threshold > window {
            return Err(Error::CorrelationConfig(format!(
                "threshold must be 1..={window}, got {threshold}"
            )));
        }
        self.window = window;
        self.threshold = threshold;
        Ok(self)
    }
}

/// A synchronized frame.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Frame {
    /// Index of the first (sync marker) bit in the decoded bit sequence.
    pub start: usize,
    /// Frame length in bits, including the sync marker.
    pub bits: usize,
    /// Frame bits packed MSB first. The final byte is zero padded.
    pub data: Vec<u8>,
}

impl Frame {
    /// Build the frame covering `bits[start..end]`.
    #[must_use]
    pub fn from_region(bits: &[u8], start: usize, end: usize) -> Self {
        let len = end.saturating_sub(start);
        Frame {
            start,
            bits: len,
            data: pack(bits, start, len),
        }
    }

    /// Index one past the last bit of this frame.
    #[must_use]
    pub fn end(&self) -> usize {
        self.start + self.bits
    }

    /// Number of demodulation gaps that fall strictly inside this frame, i.e., where at
    /// least one bit is missing between two bits of the frame.
    #[must_use]
    pub fn gaps_within(&self, gaps: &[Gap]) -> usize {
        gaps.iter()
            .filter(|g| g.bit_index > self.start && g.bit_index < self.end())
            .count()
    }
}

/// Aggregate statistics over a set of frames.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FrameStats {
    pub count: usize,
    /// Shortest frame in bits, 0 if there are no frames.
    pub min_bits: usize,
    /// Longest frame in bits, 0 if there are no frames.
    pub max_bits: usize,
    pub total_bits: usize,
}

impl FrameStats {
    #[must_use]
    pub fn from_frames(frames: &[Frame]) -> Self {
        let mut stats = FrameStats {
            count: frames.len(),
            min_bits: frames.iter().map(|f| f.bits).min().unwrap_or(0),
            ..Default::default()
        };
        for frame in frames {
            stats.max_bits = stats.max_bits.max(frame.bits);
            stats.total_bits += frame.bits;
        }
        stats
    }

    /// One line description of the result, given the number of partial matches.
    #[must_use]
    pub fn describe(&self, partial_matches: usize) -> String {
        if self.count > 0 {
            format!("length: {}-{} bits", self.min_bits, self.max_bits)
        } else if partial_matches > 0 {
            format!("no frames; {partial_matches} partial matches")
        } else {
            "no frames; no partial matches".to_string()
        }
    }
}
