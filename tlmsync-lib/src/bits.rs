//! Conversions between bit sequences and bytes.
//!
//! Bit sequences are slices of `u8` where each element is 0 or 1. Any non-zero element
//! is treated as a 1 when packing.

/// Pack `len` bits starting at `start` into `ceil(len / 8)` bytes, MSB first.
///
/// Unused trailing bits of the last byte are zero. Bits past the end of `bits` are also
/// treated as zero, so this never panics.
///
/// # Example
/// ```
/// use tlmsync::bits::pack;
///
/// assert_eq!(pack(&[1, 0, 1], 0, 3), vec![0b1010_0000]);
/// ```
#[must_use]
pub fn pack(bits: &[u8], start: usize, len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len.div_ceil(8)];
    let region = bits.iter().skip(start).take(len);
    for (i, bit) in region.enumerate() {
        if *bit != 0 {
            bytes[i / 8] |= 1 << (7 - (i % 8));
        }
    }
    bytes
}

/// Pack all of `bits`.
#[must_use]
pub fn pack_all(bits: &[u8]) -> Vec<u8> {
    pack(bits, 0, bits.len())
}

/// Expand bytes into bits, MSB first.
#[must_use]
pub fn unpack(bytes: &[u8]) -> Vec<u8> {
    bytes
        .iter()
        .flat_map(|b| (0..8).rev().map(move |k| (b >> k) & 1))
        .collect()
}

/// Render bits as a string of `'0'` and `'1'` characters.
#[must_use]
pub fn to_digits(bits: &[u8]) -> String {
    bits.iter().map(|b| if *b == 0 { '0' } else { '1' }).collect()
}
