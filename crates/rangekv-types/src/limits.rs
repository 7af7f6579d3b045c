//! Fixed size limits enforced before any network call.

/// Maximum key size in bytes.
pub const MAX_KEY_SIZE: u32 = 4 * 1024;

/// Maximum value size in bytes.
pub const MAX_VALUE_SIZE: u32 = 1024 * 1024;

/// Maximum number of pairs in one batch write.
pub const MAX_BATCH_KEYS: u32 = 1024;

/// Maximum number of results one scan may request.
pub const MAX_SCAN_LIMIT: u32 = 10240;
