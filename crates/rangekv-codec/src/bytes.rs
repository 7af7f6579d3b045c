//! Memcomparable byte-string encoding.
//!
//! The input is cut into groups of 8 bytes. Each group is padded with
//! `0x00` up to 8 bytes and followed by a marker byte `0xFF - pad_count`;
//! an input whose length is a multiple of 8 (including the empty input)
//! still emits a final all-padding group. Bytewise comparison of two
//! encodings matches lexicographic comparison of the inputs, and no
//! encoding is a strict prefix of another.

use crate::error::CodecError;

const ENC_GROUP_SIZE: usize = 8;
const ENC_MARKER: u8 = 0xFF;
const ENC_PAD: u8 = 0x00;

/// Append the order-preserving encoding of `data` to `out`.
pub fn encode_bytes(out: &mut Vec<u8>, data: &[u8]) {
    let len = data.len();
    out.reserve((len / ENC_GROUP_SIZE + 1) * (ENC_GROUP_SIZE + 1));

    let mut idx = 0;
    while idx <= len {
        let remain = len - idx;
        if remain >= ENC_GROUP_SIZE {
            out.extend_from_slice(&data[idx..idx + ENC_GROUP_SIZE]);
            out.push(ENC_MARKER);
        } else {
            let pad = ENC_GROUP_SIZE - remain;
            out.extend_from_slice(&data[idx..]);
            out.extend(std::iter::repeat(ENC_PAD).take(pad));
            out.push(ENC_MARKER - pad as u8);
        }
        idx += ENC_GROUP_SIZE;
    }
}

/// Decode one byte-string encoding from the front of `input`, advancing
/// it past the consumed groups.
pub fn decode_bytes(input: &mut &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::new();

    loop {
        if input.len() < ENC_GROUP_SIZE + 1 {
            return Err(CodecError::TruncatedEncoding);
        }
        let (group, rest) = input.split_at(ENC_GROUP_SIZE + 1);
        *input = rest;

        let marker = group[ENC_GROUP_SIZE];
        let pad = ENC_MARKER.wrapping_sub(marker) as usize;
        if pad > ENC_GROUP_SIZE {
            return Err(CodecError::BadPadding);
        }

        let real = ENC_GROUP_SIZE - pad;
        out.extend_from_slice(&group[..real]);

        if pad > 0 {
            // Padding bytes must all be zero; anything else is corruption.
            if group[real..ENC_GROUP_SIZE].iter().any(|&b| b != ENC_PAD) {
                return Err(CodecError::BadPadding);
            }
            return Ok(out);
        }
    }
}
