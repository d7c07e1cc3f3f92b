use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::Serialize;
use tlmsync::{
    observer::{Observer, Stage},
    Pipeline, Recovery,
};
use tracing::{debug, error, info, warn};

use crate::output::{
    with_file, write_channels, write_decoded_bits, write_frames, write_partial_matches,
    write_preview, CHANNELS_CSV, DECODED_BITS_CSV, FRAMES_BIN,
};

/// Forwards recovery notifications to the log.
#[derive(Debug, Default)]
pub struct LogObserver {
    last: Option<(Stage, usize)>,
}

impl Observer for LogObserver {
    fn on_progress(&mut self, stage: Stage, current: usize, total: usize) {
        // completion is reported by both the final tick and the stage; only log once
        if self.last == Some((stage, current)) {
            return;
        }
        self.last = Some((stage, current));
        #[allow(clippy::cast_precision_loss)]
        let pct = if total == 0 {
            100.0
        } else {
            current as f64 / total as f64 * 100.0
        };
        debug!("{stage}: {current}/{total} ({pct:.1}%)");
    }

    fn on_status(&mut self, message: &str) {
        info!("{message}");
    }
}

/// Per-input result summary.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub samples: usize,
    pub ch0_high: usize,
    pub ch1_high: usize,
    pub markers: usize,
    pub bits: usize,
    pub dropped: usize,
    pub gaps: usize,
    pub frames: usize,
    pub min_frame_bits: usize,
    pub max_frame_bits: usize,
    pub total_frame_bits: usize,
    pub frames_with_gaps: usize,
    pub partial_matches: usize,
    pub description: String,
}

impl Summary {
    pub fn new(input: &Path, output: Option<&Path>, recovery: &Recovery) -> Self {
        Summary {
            input: input.to_path_buf(),
            output: output.map(Path::to_path_buf),
            samples: recovery.channel_stats.samples,
            ch0_high: recovery.channel_stats.ch0_high,
            ch1_high: recovery.channel_stats.ch1_high,
            markers: recovery.demod.markers,
            bits: recovery.demod.bits.len(),
            dropped: recovery.demod.dropped,
            gaps: recovery.demod.gaps.len(),
            frames: recovery.stats.count,
            min_frame_bits: recovery.stats.min_bits,
            max_frame_bits: recovery.stats.max_bits,
            total_frame_bits: recovery.stats.total_bits,
            frames_with_gaps: recovery.frames_with_gaps(),
            partial_matches: recovery.partial_matches.len(),
            description: recovery.describe(),
        }
    }
}

/// Result directory for `input`: `<stem>_result_<YYYYmmdd_HHMMSS>` inside `base`, or
/// next to the input if `base` is `None`.
///
/// If that directory already exists, e.g., another input with the same stem was already
/// processed into `base`, a `_1`, `_2`, ... suffix is added so results are never mixed.
pub fn output_dir(input: &Path, base: Option<&Path>, now: DateTime<Local>) -> PathBuf {
    let stem = input
        .file_stem()
        .map_or_else(|| "capture".to_string(), |s| s.to_string_lossy().to_string());
    let name = format!("{stem}_result_{}", now.format("%Y%m%d_%H%M%S"));
    let base = base
        .map(Path::to_path_buf)
        .or_else(|| input.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    let dir = base.join(&name);
    if !dir.exists() {
        return dir;
    }
    (1..)
        .map(|n| base.join(format!("{name}_{n}")))
        .find(|p| !p.exists())
        .unwrap_or(dir)
}

/// Expand directories to the `*.bin` files they contain, sorted by name.
pub fn expand_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut expanded = Vec::default();
    for input in inputs {
        if !input.is_dir() {
            expanded.push(input.clone());
            continue;
        }
        let mut found: Vec<PathBuf> = fs::read_dir(input)
            .with_context(|| format!("listing {input:?}"))?
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && p.extension().is_some_and(|e| e == "bin"))
            .collect();
        if found.is_empty() {
            warn!("no .bin files found in {input:?}");
        }
        found.sort();
        expanded.extend(found);
    }
    Ok(expanded)
}

fn log_recovery(input: &Path, recovery: &Recovery) {
    let cs = &recovery.channel_stats;
    info!(
        "{input:?}: {} samples; ch0: {} ({:.1}%), ch1: {} ({:.1}%)",
        cs.samples,
        cs.ch0_high,
        cs.ch0_ratio() * 100.0,
        cs.ch1_high,
        cs.ch1_ratio() * 100.0
    );
    info!(
        "decoded {} bits from {} markers ({} ambiguous intervals dropped)",
        recovery.demod.bits.len(),
        recovery.demod.markers,
        recovery.demod.dropped
    );
    if !recovery.partial_matches.is_empty() {
        info!("partial matches: {}", recovery.partial_matches.len());
    }
    if recovery.stats.count > 0 {
        info!("found {} frames; {}", recovery.stats.count, recovery.describe());
    } else {
        info!("{}", recovery.describe());
    }
}

/// Write diagnostics if there are any. Failures are logged but never returned.
fn emit_diagnostics(dest: &Path, recovery: &Recovery) {
    let Some(diag) = &recovery.diagnostics else {
        return;
    };
    match write_preview(dest, diag) {
        Ok(path) => error!(
            "sync marker not found; first {} bits saved to {path:?}",
            diag.preview.len()
        ),
        Err(err) => error!("failed to save debug info: {err:#}"),
    }
    error!("first 32 bits: {}", diag.head);
    match write_partial_matches(dest, diag) {
        Ok(Some(path)) => warn!("partial matches saved to {path:?}"),
        Ok(None) => (),
        Err(err) => error!("failed to save debug info: {err:#}"),
    }
}

/// Recover frames from `input`, writing all artifacts to `dest`.
pub fn recover(input: &Path, dest: &Path, pipeline: &Pipeline) -> Result<Summary> {
    let mut observer = LogObserver::default();
    info!("processing {input:?}");

    let recovery = pipeline
        .process_file(input, &mut observer)
        .with_context(|| format!("reading {input:?}"))?;
    fs::create_dir_all(dest).with_context(|| format!("creating output dir {dest:?}"))?;

    log_recovery(input, &recovery);

    with_file(&dest.join(CHANNELS_CSV), |dst| {
        write_channels(&recovery.samples, dst)
    })?;
    with_file(&dest.join(DECODED_BITS_CSV), |dst| {
        write_decoded_bits(&recovery.demod.bits, dst)
    })?;

    emit_diagnostics(dest, &recovery);

    write_frames(&recovery.packed_with(&mut observer), &dest.join(FRAMES_BIN))?;
    if recovery.frames.is_empty() {
        info!("{FRAMES_BIN} created empty; no frames found");
    }
    info!("results saved to {dest:?}");

    Ok(Summary::new(input, Some(dest), &recovery))
}

/// Recover frames from `input` without writing anything.
pub fn inspect(input: &Path, pipeline: &Pipeline) -> Result<Summary> {
    let mut observer = LogObserver::default();
    let recovery = pipeline
        .process_file(input, &mut observer)
        .with_context(|| format!("reading {input:?}"))?;
    log_recovery(input, &recovery);
    if let Some(diag) = &recovery.diagnostics {
        warn!("sync marker not found; first 32 bits: {}", diag.head);
        for line in diag.partial_match_lines() {
            warn!("{line}");
        }
    }
    Ok(Summary::new(input, None, &recovery))
}
