//! Composition of the recovery stages.
//!
//! # Example
//! ```
//! use tlmsync::{observer::NoopObserver, Pipeline};
//!
//! let recovery = Pipeline::new().run(&[0x03, 0x01, 0x02, 0x03], &mut NoopObserver);
//! assert_eq!(recovery.demod.bits, vec![0]);
//! assert_eq!(recovery.demod.markers, 2);
//! assert!(recovery.frames.is_empty());
//! ```
use std::path::Path;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, info_span};

use crate::channels::{extract, ChannelStats, Sample};
use crate::demod::{demodulate, DemodOpts, Demodulated};
use crate::framing::{
    correlate, synchronize, Diagnostics, Frame, FrameStats, PartialMatch, SyncOpts,
    DEFAULT_PREVIEW_BITS,
};
use crate::observer::{Observer, Stage};
use crate::Result;

/// Builder for the full recovery process: channel extraction, demodulation, frame
/// synchronization and correlation.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Pipeline {
    demod: DemodOpts,
    sync: SyncOpts,
    preview_bits: usize,
}

impl Default for Pipeline {
    fn default() -> Self {
        Pipeline {
            demod: DemodOpts::default(),
            sync: SyncOpts::default(),
            preview_bits: DEFAULT_PREVIEW_BITS,
        }
    }
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_demod(mut self, opts: DemodOpts) -> Self {
        self.demod = opts;
        self
    }

    pub fn with_sync(mut self, opts: SyncOpts) -> Self {
        self.sync = opts;
        self
    }

    /// Number of leading bits to include in [Diagnostics::preview].
    pub fn with_preview_bits(mut self, num: usize) -> Self {
        self.preview_bits = num;
        self
    }

    pub fn sync_opts(&self) -> &SyncOpts {
        &self.sync
    }

    /// Run all stages over `bytes`.
    pub fn run(&self, bytes: &[u8], observer: &mut dyn Observer) -> Recovery {
        let span = info_span!("recover", bytes = bytes.len());
        let _guard = span.enter();

        observer.on_status("extracting channels");
        let samples = extract(bytes, observer);
        let channel_stats = ChannelStats::from_samples(&samples);

        observer.on_status("demodulating");
        let demod = demodulate(&samples, &self.demod, observer);

        observer.on_status("synchronizing frames");
        let frames = synchronize(&demod.bits, &self.sync, observer);
        let stats = FrameStats::from_frames(&frames);
        let partial_matches = correlate(&demod.bits, &self.sync, observer);
        let diagnostics =
            Diagnostics::collect(&demod.bits, &frames, &partial_matches, self.preview_bits);

        debug!(
            frames = stats.count,
            partial_matches = partial_matches.len(),
            "recovery complete"
        );

        Recovery {
            samples,
            channel_stats,
            demod,
            frames,
            stats,
            partial_matches,
            diagnostics,
        }
    }

    /// Read the entire capture at `path` and [run](Self::run) it.
    ///
    /// # Errors
    /// [Error::Io](crate::Error::Io) if the file cannot be read.
    pub fn process_file<P: AsRef<Path>>(
        &self,
        path: P,
        observer: &mut dyn Observer,
    ) -> Result<Recovery> {
        let bytes = std::fs::read(path.as_ref())?;
        debug!(path = ?path.as_ref(), bytes = bytes.len(), "read capture");
        Ok(self.run(&bytes, observer))
    }
}

/// Everything produced from one capture.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Recovery {
    pub samples: Vec<Sample>,
    pub channel_stats: ChannelStats,
    pub demod: Demodulated,
    pub frames: Vec<Frame>,
    pub stats: FrameStats,
    pub partial_matches: Vec<PartialMatch>,
    /// Only present when there are decoded bits but no frames.
    pub diagnostics: Option<Diagnostics>,
}

impl Recovery {
    /// All frame bytes, frame after frame, without delimiters.
    #[must_use]
    pub fn packed(&self) -> Vec<u8> {
        self.frames.iter().flat_map(|f| f.data.iter().copied()).collect()
    }

    /// Same as [packed](Self::packed), reporting [Stage::Pack] progress per frame.
    pub fn packed_with(&self, observer: &mut dyn Observer) -> Vec<u8> {
        let total = self.frames.len();
        let mut out = Vec::with_capacity(self.stats.total_bits.div_ceil(8) + total);
        for (i, frame) in self.frames.iter().enumerate() {
            observer.on_progress(Stage::Pack, i, total);
            out.extend_from_slice(&frame.data);
        }
        observer.on_progress(Stage::Pack, total, total);
        out
    }

    /// Number of frames that contain at least one demodulation gap. Always 0 unless gap
    /// tracking was enabled.
    #[must_use]
    pub fn frames_with_gaps(&self) -> usize {
        self.frames
            .iter()
            .filter(|f| f.gaps_within(&self.demod.gaps) > 0)
            .count()
    }

    /// One line description of the synchronization result.
    #[must_use]
    pub fn describe(&self) -> String {
        self.stats.describe(self.partial_matches.len())
    }
}
