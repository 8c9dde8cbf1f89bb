//! Lowercase hex helpers for the datagram fields.

use std::fmt;

use bytes::{BufMut, BytesMut};

const DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Minimal-width lowercase hex, `0` for zero.
pub(crate) fn put_hex_u32(dst: &mut BytesMut, value: u32) {
    let mut digits = [0u8; 8];
    let mut pos = digits.len();
    let mut rest = value;
    loop {
        pos -= 1;
        digits[pos] = DIGITS[(rest & 0xf) as usize];
        rest >>= 4;
        if rest == 0 {
            break;
        }
    }
    dst.put_slice(&digits[pos..]);
}

/// Two lowercase hex digits per byte.
pub(crate) fn put_hex_bytes(dst: &mut BytesMut, bytes: &[u8]) {
    dst.reserve(bytes.len() * 2);
    for b in bytes {
        dst.put_u8(DIGITS[usize::from(b >> 4)]);
        dst.put_u8(DIGITS[usize::from(b & 0xf)]);
    }
}

fn nibble(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

/// Parse a non-empty hex number that fits in a `u32`.
pub(crate) fn parse_hex_u32(src: &[u8]) -> Option<u32> {
    if src.is_empty() {
        return None;
    }
    src.iter().try_fold(0u32, |acc, &c| {
        let n = nibble(c)?;
        acc.checked_mul(16)?.checked_add(u32::from(n))
    })
}

/// Parse an even-length hex string into bytes. Empty input is an empty payload.
pub(crate) fn parse_hex_bytes(src: &[u8]) -> Option<Vec<u8>> {
    if src.len() % 2 != 0 {
        return None;
    }
    src.chunks_exact(2)
        .map(|pair| Some((nibble(pair[0])? << 4) | nibble(pair[1])?))
        .collect()
}

/// `Display` adapter rendering bytes as lowercase hex.
pub(crate) struct HexBytes<'a>(pub(crate) &'a [u8]);

impl fmt::Display for HexBytes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}
