//! Compact length prefix ("short_vec") written before every list on the wire.
//!
//! Each byte carries seven value bits, least-significant group first; the
//! high bit is set while more groups follow.
//!
//! - 0..=0x7f          -> 1 byte
//! - 0x80..=0x3fff     -> 2 bytes
//! - 0x4000..=0x1fffff -> 3 bytes
//!
//! The codec itself has no upper bound; the message layer keeps counts
//! within protocol limits.

use crate::error::SolError;

/// Append the encoding of `len` to `buf`.
pub fn write_length(buf: &mut Vec<u8>, len: usize) {
    let mut rem = len;
    loop {
        let mut byte = (rem & 0x7f) as u8;
        rem >>= 7;
        if rem > 0 {
            byte |= 0x80;
        }
        buf.push(byte);
        if rem == 0 {
            break;
        }
    }
}

/// Encode `len` into a fresh buffer.
pub fn encode_length(len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(encoded_len(len));
    write_length(&mut out, len);
    out
}

/// Number of bytes [`write_length`] emits for `len`.
pub fn encoded_len(len: usize) -> usize {
    let bits = (usize::BITS - len.leading_zeros()).max(1) as usize;
    bits.div_ceil(7)
}

/// Decode a length from the front of `data`.
///
/// Returns `(value, bytes_consumed)`. Fails on truncated input, on values
/// that do not fit in `usize`, and on padded (non-canonical) encodings.
pub fn decode_length(data: &[u8]) -> Result<(usize, usize), SolError> {
    let mut value = 0usize;

    for (i, &byte) in data.iter().enumerate() {
        let shift = 7 * i as u32;
        let bits = (byte & 0x7f) as usize;
        if shift >= usize::BITS || shift > bits.leading_zeros() {
            return Err(SolError::Serialization("short_vec value overflow".into()));
        }
        value |= bits << shift;

        if byte & 0x80 == 0 {
            // A zero final group after the first byte is an alias encoding.
            if byte == 0 && i > 0 {
                return Err(SolError::Serialization("non-canonical short_vec".into()));
            }
            return Ok((value, i + 1));
        }
    }

    Err(SolError::Serialization(
        "unexpected end of data while decoding short_vec".into(),
    ))
}
