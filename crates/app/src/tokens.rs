//! Random token material.

use rand::{RngCore, rngs::OsRng};
use zeroize::Zeroize;

const HEX: &[u8; 16] = b"0123456789abcdef";

/// Draw `N` bytes from the OS RNG and hex-encode them behind `prefix`.
pub(crate) fn random_hex_token<const N: usize>(prefix: &str) -> String {
    let mut bytes = [0_u8; N];

    OsRng.fill_bytes(&mut bytes);

    let mut encoded = String::with_capacity(prefix.len() + N * 2);

    encoded.push_str(prefix);

    for byte in &bytes {
        encoded.push(HEX[usize::from(byte >> 4)] as char);
        encoded.push(HEX[usize::from(byte & 0x0f)] as char);
    }

    bytes.zeroize();

    encoded
}

/// Whether `value` is `prefix` followed by exactly `hex_chars` lowercase hex digits.
pub(crate) fn has_hex_shape(value: &str, prefix: &str, hex_chars: usize) -> bool {
    value.strip_prefix(prefix).is_some_and(|hex| {
        hex.len() == hex_chars && hex.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    })
}
