//! Writers for recovery artifacts.
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use tlmsync::{channels::Sample, framing::Diagnostics};
use tracing::debug;

pub const CHANNELS_CSV: &str = "channels.csv";
pub const DECODED_BITS_CSV: &str = "decoded_bits.csv";
pub const FRAMES_BIN: &str = "out.bin";
pub const DEBUG_BITS_TXT: &str = "debug_first_1000_bits.txt";
pub const PARTIAL_MATCHES_TXT: &str = "partial_matches.txt";

/// Write one `ch0,ch1,ch0&ch1` record per sample, without a header.
pub fn write_channels<W: Write>(samples: &[Sample], dst: W) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(dst);
    for s in samples {
        wtr.serialize((s.ch0, s.ch1, s.both()))
            .context("writing channel record")?;
    }
    wtr.flush().context("flushing channels")?;
    Ok(())
}

/// Write one record per decoded bit.
pub fn write_decoded_bits<W: Write>(bits: &[u8], dst: W) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(dst);
    for bit in bits {
        wtr.write_record([bit.to_string()])
            .context("writing bit record")?;
    }
    wtr.flush().context("flushing decoded bits")?;
    Ok(())
}

/// Create `path` and write packed frame bytes to it. The file is created even if there
/// is no data.
pub fn write_frames(packed: &[u8], path: &Path) -> Result<()> {
    let mut dst = File::create(path).with_context(|| format!("creating {path:?}"))?;
    dst.write_all(packed)
        .with_context(|| format!("writing frames to {path:?}"))
}

/// Create `path` and hand a buffered writer for it to `f`.
pub fn with_file<F>(path: &Path, f: F) -> Result<()>
where
    F: FnOnce(BufWriter<File>) -> Result<()>,
{
    let file = File::create(path).with_context(|| format!("creating {path:?}"))?;
    f(BufWriter::new(file))?;
    debug!("wrote {path:?}");
    Ok(())
}

/// Write the bit preview to [DEBUG_BITS_TXT] in `dir`.
pub fn write_preview(dir: &Path, diag: &Diagnostics) -> Result<PathBuf> {
    let path = dir.join(DEBUG_BITS_TXT);
    fs::write(&path, &diag.preview).with_context(|| format!("writing {path:?}"))?;
    Ok(path)
}

/// Write partial matches, one per line, to [PARTIAL_MATCHES_TXT] in `dir`. Returns `None`
/// without creating anything if there are no partial matches.
pub fn write_partial_matches(dir: &Path, diag: &Diagnostics) -> Result<Option<PathBuf>> {
    if diag.partial_matches.is_empty() {
        return Ok(None);
    }
    let path = dir.join(PARTIAL_MATCHES_TXT);
    with_file(&path, |mut dst| {
        for line in diag.partial_match_lines() {
            writeln!(dst, "{line}")?;
        }
        dst.flush()?;
        Ok(())
    })?;
    Ok(Some(path))
}
