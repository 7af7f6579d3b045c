//! Key range type for representing contiguous segments of the keyspace.

use serde::Deserialize;
use serde::Serialize;

/// An opaque, non-empty byte-string key.
pub type Key = Vec<u8>;

/// An opaque byte-string value. The raw store reserves the empty value
/// as its absence sentinel, so clients never write one.
pub type Value = Vec<u8>;

/// A key paired with its value, as returned by scans.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KvPair {
    pub key: Key,
    pub value: Value,
}

impl KvPair {
    pub fn new(key: impl Into<Key>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A key range representing a contiguous segment of the keyspace.
///
/// Ranges are half-open intervals: `[start, end)`.
/// An empty `end` indicates the range extends to the end of the keyspace;
/// an empty `start` indicates it begins at the start of the keyspace.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct KeyRange {
    /// Start key (inclusive). Empty means start of keyspace.
    pub start: Key,
    /// End key (exclusive). Empty means end of keyspace.
    pub end: Key,
}

impl KeyRange {
    /// Create a new key range.
    pub fn new(start: impl Into<Key>, end: impl Into<Key>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Create a range covering the entire keyspace.
    pub fn full() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    /// Check if a key falls within this range.
    ///
    /// Returns true if `start <= key < end` (or `key >= start` if `end`
    /// is empty).
    pub fn contains(&self, key: &[u8]) -> bool {
        key >= self.start.as_slice() && (self.end.is_empty() || key < self.end.as_slice())
    }

    /// Check if this range contains no keys.
    pub fn is_empty(&self) -> bool {
        !self.end.is_empty() && self.start >= self.end
    }

    /// Check if this range is the last one before the end of the keyspace.
    pub fn is_unbounded(&self) -> bool {
        self.end.is_empty()
    }

    /// Split this range at the given key, returning (left, right) ranges.
    ///
    /// Returns None if the split key is not strictly inside the range.
    pub fn split_at(&self, split_key: &[u8]) -> Option<(KeyRange, KeyRange)> {
        if !self.contains(split_key) || split_key == self.start.as_slice() {
            return None;
        }

        let left = KeyRange::new(self.start.clone(), split_key.to_vec());
        let right = KeyRange::new(split_key.to_vec(), self.end.clone());

        Some((left, right))
    }

    /// Intersect this range with another, returning the overlapping
    /// segment or None when the ranges are disjoint.
    pub fn intersect(&self, other: &KeyRange) -> Option<KeyRange> {
        let start = if self.start >= other.start {
            self.start.clone()
        } else {
            other.start.clone()
        };

        let end = match (self.end.is_empty(), other.end.is_empty()) {
            (true, true) => Vec::new(),
            (true, false) => other.end.clone(),
            (false, true) => self.end.clone(),
            (false, false) => {
                if self.end <= other.end {
                    self.end.clone()
                } else {
                    other.end.clone()
                }
            }
        };

        let result = KeyRange::new(start, end);
        if result.is_empty() { None } else { Some(result) }
    }
}

impl Default for KeyRange {
    fn default() -> Self {
        Self::full()
    }
}
