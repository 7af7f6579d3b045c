//! Decode errors for the key codec.
//!
//! A decode failure indicates data corruption or a logical-type mismatch;
//! it is always fatal to the operation that triggered it and never
//! retried.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The leading bytes do not match the expected namespace prefix.
    #[error("encoded key does not start with the expected prefix")]
    InvalidPrefix,

    /// The decoded type flag differs from the flag the caller expected.
    #[error("expected type flag '{expected}' but found {actual:#x}")]
    InvalidTypeFlag { expected: char, actual: u64 },

    /// Length framing overran the input.
    #[error("encoded key is truncated")]
    TruncatedEncoding,

    /// A byte-group marker or its padding bytes are malformed.
    #[error("encoded key has malformed group padding")]
    BadPadding,
}
