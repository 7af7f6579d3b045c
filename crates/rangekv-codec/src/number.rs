//! Fixed-width, order-preserving integer encodings.

use crate::error::CodecError;

const SIGN_MASK: u64 = 0x8000_0000_0000_0000;

/// Append a big-endian u64. Bytewise order equals numeric order.
pub fn encode_u64(out: &mut Vec<u8>, value: u64) {
    out.extend_from_slice(&value.to_be_bytes());
}

/// Decode a big-endian u64 from the front of `input`, advancing it.
pub fn decode_u64(input: &mut &[u8]) -> Result<u64, CodecError> {
    if input.len() < 8 {
        return Err(CodecError::TruncatedEncoding);
    }
    let (head, rest) = input.split_at(8);
    *input = rest;
    let mut buf = [0u8; 8];
    buf.copy_from_slice(head);
    Ok(u64::from_be_bytes(buf))
}

/// Append an i64 with its sign bit flipped, so that negative values sort
/// bytewise before non-negative ones.
pub fn encode_i64(out: &mut Vec<u8>, value: i64) {
    encode_u64(out, (value as u64) ^ SIGN_MASK);
}

/// Decode an i64 written by [`encode_i64`].
pub fn decode_i64(input: &mut &[u8]) -> Result<i64, CodecError> {
    Ok((decode_u64(input)? ^ SIGN_MASK) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded_i64(value: i64) -> Vec<u8> {
        let mut out = Vec::new();
        encode_i64(&mut out, value);
        out
    }

    #[test]
    fn test_u64_round_trip() {
        for value in [0u64, 1, u64::MAX, 0x0102_0304_0506_0708] {
            let mut out = Vec::new();
            encode_u64(&mut out, value);
            let mut input = out.as_slice();
            assert_eq!(decode_u64(&mut input).unwrap(), value);
            assert!(input.is_empty());
        }
    }

    #[test]
    fn test_i64_round_trip() {
        for value in [i64::MIN, -1, 0, 1, i64::MAX] {
            let buf = encoded_i64(value);
            let mut input = buf.as_slice();
            assert_eq!(decode_i64(&mut input).unwrap(), value);
            assert!(input.is_empty());
        }
    }

    #[test]
    fn test_i64_order_preserving() {
        let values = [i64::MIN, -100, -1, 0, 1, 100, i64::MAX];
        for pair in values.windows(2) {
            assert!(encoded_i64(pair[0]) < encoded_i64(pair[1]), "{} should sort before {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_decode_truncated() {
        let mut input = &[0u8; 7][..];
        assert_eq!(decode_u64(&mut input), Err(CodecError::TruncatedEncoding));
        let mut input = &[0u8; 7][..];
        assert_eq!(decode_i64(&mut input), Err(CodecError::TruncatedEncoding));
    }
}
