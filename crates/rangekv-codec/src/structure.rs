//! Structured key encoding: multiplexing typed structures into one
//! ordered keyspace.
//!
//! Encoded key layout:
//!
//! ```text
//! prefix || encode_bytes(user_key) || encode_u64(type_flag) || sub-key
//! ```
//!
//! where the sub-key is `encode_bytes(field)` for hash data and
//! `encode_i64(index)` for list data, and absent otherwise. The flag is
//! encoded as a fixed-width comparable uint so that all keys of one user
//! key sort together, grouped by structure type.

use crate::bytes::decode_bytes;
use crate::bytes::encode_bytes;
use crate::error::CodecError;
use crate::number::decode_i64;
use crate::number::decode_u64;
use crate::number::encode_i64;
use crate::number::encode_u64;

/// Flag identifying which logical structure an encoded key belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TypeFlag {
    /// String structure metadata.
    StringMeta = b'S',
    /// String structure data.
    StringData = b's',
    /// Hash structure metadata.
    HashMeta = b'H',
    /// Hash structure data, keyed additionally by field.
    HashData = b'h',
    /// List structure metadata.
    ListMeta = b'L',
    /// List structure data, keyed additionally by signed index.
    ListData = b'l',
}

impl TypeFlag {
    pub fn as_byte(self) -> u8 {
        self as u8
    }
}

/// Encoder/decoder for structured keys within one namespace prefix.
///
/// Encoded keys are synthesized on every structure operation and never
/// persisted as a separate object; they are recomputed deterministically
/// from logical identifiers.
#[derive(Debug, Clone)]
pub struct KeyCodec {
    prefix: Vec<u8>,
}

impl KeyCodec {
    pub fn new(prefix: impl Into<Vec<u8>>) -> Self {
        Self { prefix: prefix.into() }
    }

    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }

    /// String structure metadata key.
    pub fn string_meta_key(&self, key: &[u8]) -> Vec<u8> {
        self.typed_key(key, TypeFlag::StringMeta)
    }

    /// String structure data key.
    pub fn string_data_key(&self, key: &[u8]) -> Vec<u8> {
        self.typed_key(key, TypeFlag::StringData)
    }

    /// Hash structure metadata key.
    pub fn hash_meta_key(&self, key: &[u8]) -> Vec<u8> {
        self.typed_key(key, TypeFlag::HashMeta)
    }

    /// Hash structure data key for one field.
    pub fn hash_data_key(&self, key: &[u8], field: &[u8]) -> Vec<u8> {
        let mut ek = self.typed_key(key, TypeFlag::HashData);
        encode_bytes(&mut ek, field);
        ek
    }

    /// Common prefix of all hash data keys under one user key. Scanning
    /// the byte range starting here visits exactly that hash's fields.
    pub fn hash_data_prefix(&self, key: &[u8]) -> Vec<u8> {
        self.typed_key(key, TypeFlag::HashData)
    }

    /// List structure metadata key.
    pub fn list_meta_key(&self, key: &[u8]) -> Vec<u8> {
        self.typed_key(key, TypeFlag::ListMeta)
    }

    /// List structure data key for one signed index. Negative indices
    /// sort before non-negative ones.
    pub fn list_data_key(&self, key: &[u8], index: i64) -> Vec<u8> {
        let mut ek = self.typed_key(key, TypeFlag::ListData);
        encode_i64(&mut ek, index);
        ek
    }

    /// Decode a string data key back to its user key.
    pub fn decode_string_data_key(&self, ek: &[u8]) -> Result<Vec<u8>, CodecError> {
        let (key, _) = self.decode_typed_key(ek, TypeFlag::StringData)?;
        Ok(key)
    }

    /// Decode a hash data key back to its (user key, field) pair.
    pub fn decode_hash_data_key(&self, ek: &[u8]) -> Result<(Vec<u8>, Vec<u8>), CodecError> {
        let (key, mut rest) = self.decode_typed_key(ek, TypeFlag::HashData)?;
        let field = decode_bytes(&mut rest)?;
        Ok((key, field))
    }

    /// Decode a list data key back to its (user key, index) pair.
    pub fn decode_list_data_key(&self, ek: &[u8]) -> Result<(Vec<u8>, i64), CodecError> {
        let (key, mut rest) = self.decode_typed_key(ek, TypeFlag::ListData)?;
        let index = decode_i64(&mut rest)?;
        Ok((key, index))
    }

    fn typed_key(&self, key: &[u8], flag: TypeFlag) -> Vec<u8> {
        let mut ek = Vec::with_capacity(self.prefix.len() + key.len() + 16);
        ek.extend_from_slice(&self.prefix);
        encode_bytes(&mut ek, key);
        encode_u64(&mut ek, flag.as_byte() as u64);
        ek
    }

    /// Strip the prefix, decode the user key, and check the type flag
    /// against what the caller expects. A flag mismatch signals
    /// corruption or a programming error, not a soft miss.
    fn decode_typed_key<'a>(&self, ek: &'a [u8], expected: TypeFlag) -> Result<(Vec<u8>, &'a [u8]), CodecError> {
        if !ek.starts_with(&self.prefix) {
            return Err(CodecError::InvalidPrefix);
        }
        let mut rest = &ek[self.prefix.len()..];

        let key = decode_bytes(&mut rest)?;
        let flag = decode_u64(&mut rest)?;
        if flag != expected.as_byte() as u64 {
            return Err(CodecError::InvalidTypeFlag {
                expected: expected.as_byte() as char,
                actual: flag,
            });
        }
        Ok((key, rest))
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn codec() -> KeyCodec {
        KeyCodec::new(&b"m"[..])
    }

    #[test]
    fn test_string_data_key_round_trip() {
        let c = codec();
        let ek = c.string_data_key(b"user");
        assert_eq!(c.decode_string_data_key(&ek).unwrap(), b"user");
    }

    #[test]
    fn test_hash_data_key_round_trip() {
        let c = codec();
        let ek = c.hash_data_key(b"user", b"name");
        assert_eq!(c.decode_hash_data_key(&ek).unwrap(), (b"user".to_vec(), b"name".to_vec()));
    }

    #[test]
    fn test_list_data_key_round_trip() {
        let c = codec();
        for index in [i64::MIN, -3, 0, 7, i64::MAX] {
            let ek = c.list_data_key(b"queue", index);
            assert_eq!(c.decode_list_data_key(&ek).unwrap(), (b"queue".to_vec(), index));
        }
    }

    #[test]
    fn test_hash_data_keys_share_prefix() {
        let c = codec();
        let prefix = c.hash_data_prefix(b"user");
        assert!(c.hash_data_key(b"user", b"a").starts_with(&prefix));
        assert!(c.hash_data_key(b"user", b"zz").starts_with(&prefix));
        assert!(!c.hash_data_key(b"user2", b"a").starts_with(&prefix));
    }

    #[test]
    fn test_fields_sort_within_one_hash() {
        let c = codec();
        let a = c.hash_data_key(b"user", b"a");
        let b = c.hash_data_key(b"user", b"b");
        assert!(a < b);
    }

    #[test]
    fn test_list_indices_sort_signed() {
        let c = codec();
        let neg = c.list_data_key(b"queue", -1);
        let zero = c.list_data_key(b"queue", 0);
        let pos = c.list_data_key(b"queue", 1);
        assert!(neg < zero);
        assert!(zero < pos);
    }

    #[test]
    fn test_distinct_user_keys_never_prefix_one_another() {
        // "ab" is a byte prefix of "abc"; encodings must not collide.
        let c = codec();
        let shorter = c.hash_data_prefix(b"ab");
        let longer = c.hash_data_key(b"abc", b"f");
        assert!(!longer.starts_with(&shorter));
    }

    #[test]
    fn test_decode_wrong_prefix() {
        let other = KeyCodec::new(&b"n"[..]);
        let ek = codec().string_data_key(b"user");
        assert_eq!(other.decode_string_data_key(&ek), Err(CodecError::InvalidPrefix));
    }

    #[test]
    fn test_decode_wrong_flag() {
        let c = codec();
        let ek = c.hash_meta_key(b"user");
        let err = c.decode_hash_data_key(&ek).unwrap_err();
        assert_eq!(
            err,
            CodecError::InvalidTypeFlag {
                expected: 'h',
                actual: u64::from(b'H'),
            }
        );
    }

    #[test]
    fn test_decode_truncated() {
        let c = codec();
        let ek = c.hash_data_key(b"user", b"name");
        assert_eq!(c.decode_hash_data_key(&ek[..ek.len() - 4]), Err(CodecError::TruncatedEncoding));
    }

    proptest! {
        #[test]
        fn test_hash_data_key_round_trips(
            key in proptest::collection::vec(any::<u8>(), 0..64),
            field in proptest::collection::vec(any::<u8>(), 0..64),
        ) {
            let c = codec();
            let ek = c.hash_data_key(&key, &field);
            prop_assert_eq!(c.decode_hash_data_key(&ek).unwrap(), (key, field));
        }

        #[test]
        fn test_hash_data_key_order_matches_tuple_order(
            key_a in proptest::collection::vec(any::<u8>(), 0..16),
            field_a in proptest::collection::vec(any::<u8>(), 0..16),
            key_b in proptest::collection::vec(any::<u8>(), 0..16),
            field_b in proptest::collection::vec(any::<u8>(), 0..16),
        ) {
            let c = codec();
            let ek_a = c.hash_data_key(&key_a, &field_a);
            let ek_b = c.hash_data_key(&key_b, &field_b);
            let tuple_order = (key_a, field_a).cmp(&(key_b, field_b));
            prop_assert_eq!(ek_a.cmp(&ek_b), tuple_order);
        }

        #[test]
        fn test_list_data_key_order_matches_tuple_order(
            key_a in proptest::collection::vec(any::<u8>(), 0..16),
            index_a in any::<i64>(),
            key_b in proptest::collection::vec(any::<u8>(), 0..16),
            index_b in any::<i64>(),
        ) {
            let c = codec();
            let ek_a = c.list_data_key(&key_a, index_a);
            let ek_b = c.list_data_key(&key_b, index_b);
            let tuple_order = (key_a, index_a).cmp(&(key_b, index_b));
            prop_assert_eq!(ek_a.cmp(&ek_b), tuple_order);
        }
    }
}
