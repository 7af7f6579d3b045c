//! Order-preserving key encodings for rangekv.
//!
//! Several logical data-structure types (strings, hashes, lists) share
//! one flat, lexicographically ordered keyspace. The codec maps a
//! `(type flag, user key[, sub-key])` tuple to a single byte string such
//! that bytewise comparison of encodings matches componentwise comparison
//! of the tuples, and no valid encoding is a strict prefix of another.
//! Range scans over one structure, or over one user key's sub-keys, are
//! therefore contiguous byte-range scans.
//!
//! Pure functions only; no I/O, no state beyond the namespace prefix.

mod bytes;
mod error;
mod number;
mod structure;

pub use bytes::decode_bytes;
pub use bytes::encode_bytes;
pub use error::CodecError;
pub use number::decode_i64;
pub use number::decode_u64;
pub use number::encode_i64;
pub use number::encode_u64;
pub use structure::KeyCodec;
pub use structure::TypeFlag;
