//! Progress and status notifications emitted by the recovery stages.
//!
//! The library never writes to a terminal itself. Callers that want feedback implement
//! [Observer] and hand it to the [Pipeline](crate::Pipeline) or to the individual stage
//! functions.
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of items processed between progress notifications.
pub const PROGRESS_INTERVAL: usize = 100_000;

/// Recovery stage a notification belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Stage {
    Extract,
    Demodulate,
    Synchronize,
    Correlate,
    Pack,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Extract => "extract",
            Stage::Demodulate => "demodulate",
            Stage::Synchronize => "synchronize",
            Stage::Correlate => "correlate",
            Stage::Pack => "pack",
        };
        f.write_str(name)
    }
}

/// Receives notifications from the recovery stages.
///
/// Both methods default to doing nothing so implementations only need to override what
/// they care about.
pub trait Observer {
    /// Called every [PROGRESS_INTERVAL] items, and once more when a stage completes with
    /// `current == total`.
    fn on_progress(&mut self, _stage: Stage, _current: usize, _total: usize) {}

    /// Called with a short human readable status message.
    fn on_status(&mut self, _message: &str) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl Observer for NoopObserver {}

impl<O: Observer + ?Sized> Observer for &mut O {
    fn on_progress(&mut self, stage: Stage, current: usize, total: usize) {
        (**self).on_progress(stage, current, total);
    }

    fn on_status(&mut self, message: &str) {
        (**self).on_status(message);
    }
}

/// Emit a progress notification if `current` falls on a [PROGRESS_INTERVAL] boundary.
#[inline]
pub(crate) fn tick(observer: &mut dyn Observer, stage: Stage, current: usize, total: usize) {
    if current % PROGRESS_INTERVAL == 0 {
        observer.on_progress(stage, current, total);
    }
}
