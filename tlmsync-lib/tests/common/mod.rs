#![allow(dead_code)]

use std::path::PathBuf;

/// Clock marker sample, both channels high.
pub const MARKER: u8 = 0x03;
/// Channel 1 high only, decodes to `1`.
pub const ONE: u8 = 0x02;
/// Channel 0 high only, decodes to `0`.
pub const ZERO: u8 = 0x01;
/// Neither channel high, an ambiguous midpoint.
pub const IDLE: u8 = 0x00;

/// Synthesize a capture that demodulates to exactly `bits`.
///
/// Each bit becomes a marker followed by one data sample, and a closing marker ends the
/// capture, so every interval midpoint lands on the data sample.
pub fn capture(bits: &[u8]) -> Vec<u8> {
    let mut dat = Vec::with_capacity(bits.len() * 2 + 1);
    for bit in bits {
        dat.push(MARKER);
        dat.push(if *bit == 0 { ZERO } else { ONE });
    }
    dat.push(MARKER);
    dat
}

/// Like [capture], but with an ambiguous interval inserted before bit index `at`.
pub fn capture_with_gap(bits: &[u8], at: usize) -> Vec<u8> {
    let mut dat = capture(&bits[..at]);
    // capture ends with a marker; add the ambiguous interval and continue
    dat.push(IDLE);
    dat.extend_from_slice(&capture(&bits[at..]));
    dat
}

pub fn concat(parts: &[&[u8]]) -> Vec<u8> {
    parts.iter().flat_map(|p| p.iter().copied()).collect()
}

pub fn fixture_path(name: &str) -> PathBuf {
    let mut path =
        PathBuf::from(std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set"));
    path.push("tests/fixtures");
    path.push(name);
    path
}
