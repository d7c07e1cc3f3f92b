//! Channel extraction.
//!
//! Each captured byte holds one simultaneous sample of two binary channels: channel 0
//! in bit 0 and channel 1 in bit 1. All other bits are ignored.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::observer::{tick, Observer, Stage};

/// One sample of both channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Sample {
    pub ch0: u8,
    pub ch1: u8,
}

impl Sample {
    #[must_use]
    pub const fn new(ch0: u8, ch1: u8) -> Self {
        Sample { ch0, ch1 }
    }

    /// Split a raw capture byte into its channel bits.
    #[must_use]
    pub const fn from_byte(b: u8) -> Self {
        Sample {
            ch0: b & 1,
            ch1: (b >> 1) & 1,
        }
    }

    /// Both channels high; used as a clock marker when demodulating.
    #[must_use]
    pub const fn is_marker(&self) -> bool {
        self.ch0 == 1 && self.ch1 == 1
    }

    /// Logical AND of the two channels.
    #[must_use]
    pub const fn both(&self) -> u8 {
        self.ch0 & self.ch1
    }
}

impl From<u8> for Sample {
    fn from(b: u8) -> Self {
        Sample::from_byte(b)
    }
}

/// Extract one [Sample] per input byte, in input order.
pub fn extract(bytes: &[u8], observer: &mut dyn Observer) -> Vec<Sample> {
    let total = bytes.len();
    let mut samples = Vec::with_capacity(total);
    for (i, b) in bytes.iter().enumerate() {
        tick(observer, Stage::Extract, i, total);
        samples.push(Sample::from_byte(*b));
    }
    observer.on_progress(Stage::Extract, total, total);
    debug!(samples = total, "extracted channels");
    samples
}

/// Counts of high samples on each channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChannelStats {
    pub samples: usize,
    pub ch0_high: usize,
    pub ch1_high: usize,
}

impl ChannelStats {
    #[must_use]
    pub fn from_samples(samples: &[Sample]) -> Self {
        samples.iter().fold(
            ChannelStats {
                samples: samples.len(),
                ..Default::default()
            },
            |mut stats, s| {
                stats.ch0_high += usize::from(s.ch0);
                stats.ch1_high += usize::from(s.ch1);
                stats
            },
        )
    }

    /// Fraction of samples where channel 0 is high, or 0 if there are no samples.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn ch0_ratio(&self) -> f64 {
        if self.samples == 0 {
            return 0.0;
        }
        self.ch0_high as f64 / self.samples as f64
    }

    /// Fraction of samples where channel 1 is high, or 0 if there are no samples.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn ch1_ratio(&self) -> f64 {
        if self.samples == 0 {
            return 0.0;
        }
        self.ch1_high as f64 / self.samples as f64
    }
}
