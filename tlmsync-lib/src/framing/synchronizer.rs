use tracing::{debug, span, trace, Level};

use super::{Frame, SyncOpts};
use crate::observer::{tick, NoopObserver, Observer, Stage};

/// True if `pattern` occurs exactly at `bits[idx..]`.
#[inline]
#[must_use]
pub fn matches_at(bits: &[u8], idx: usize, pattern: &[u8]) -> bool {
    bits.get(idx..idx + pattern.len())
        .is_some_and(|window| window == pattern)
}

/// Find the first exact occurrence of `pattern` at or after `from`.
#[must_use]
pub fn find_sync(bits: &[u8], pattern: &[u8], from: usize) -> Option<usize> {
    if pattern.is_empty() || bits.len() < pattern.len() {
        return None;
    }
    (from..=bits.len() - pattern.len()).find(|i| matches_at(bits, *i, pattern))
}

/// Synchronizer scans a decoded bit sequence for frames delimited by a sync pattern.
///
/// A frame begins at an exact pattern match and ends immediately before the next exact
/// match, or at the end of the bits. Frames never overlap; scanning resumes at the end
/// of the last frame found. Bits before the first match are discarded.
pub struct Synchronizer<'a> {
    bits: &'a [u8],
    pattern: [u8; super::SYNC_PATTERN_BITS],
    // Index where the next scan starts
    offset: usize,
}

impl<'a> Synchronizer<'a> {
    pub fn new(bits: &'a [u8], opts: &SyncOpts) -> Self {
        Synchronizer {
            bits,
            pattern: opts.pattern,
            offset: 0,
        }
    }

    /// Scan from the current offset and return the next [Frame], or `None` if there are
    /// no more sync pattern matches.
    ///
    /// Progress is reported for every bit position examined, including the search for the
    /// end of a frame.
    pub fn scan(&mut self, observer: &mut dyn Observer) -> Option<Frame> {
        let plen = self.pattern.len();
        let total = self.bits.len();

        while self.offset + plen <= total {
            tick(observer, Stage::Synchronize, self.offset, total);
            if !matches_at(self.bits, self.offset, &self.pattern) {
                self.offset += 1;
                continue;
            }
            let start = self.offset;
            let mut next = start + plen;
            let end = loop {
                if next + plen > total {
                    break total;
                }
                tick(observer, Stage::Synchronize, next, total);
                if matches_at(self.bits, next, &self.pattern) {
                    break next;
                }
                next += 1;
            };
            trace!(start, end, "frame");
            self.offset = end;
            return Some(Frame::from_region(self.bits, start, end));
        }

        self.offset = total;
        None
    }
}

impl<'a> IntoIterator for Synchronizer<'a> {
    type Item = Frame;
    type IntoIter = FrameIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        FrameIter { scanner: self }
    }
}

/// Iterates over the frames found by the source [Synchronizer] without reporting progress.
/// Created using ``Synchronizer::into_iter``.
pub struct FrameIter<'a> {
    scanner: Synchronizer<'a>,
}

impl Iterator for FrameIter<'_> {
    type Item = Frame;

    fn next(&mut self) -> Option<Self::Item> {
        self.scanner.scan(&mut NoopObserver)
    }
}

/// Find all frames in `bits`.
///
/// For scan level control see [Synchronizer].
pub fn synchronize(bits: &[u8], opts: &SyncOpts, observer: &mut dyn Observer) -> Vec<Frame> {
    let span = span!(Level::DEBUG, "synchronize", bits = bits.len());
    let _guard = span.enter();

    let mut sync = Synchronizer::new(bits, opts);
    let mut frames = Vec::new();
    while let Some(frame) = sync.scan(observer) {
        frames.push(frame);
    }
    observer.on_progress(Stage::Synchronize, bits.len(), bits.len());
    debug!(frames = frames.len(), "synchronized");
    frames
}
