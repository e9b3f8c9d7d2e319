//! Content digests used to shrink large request bodies into key fragments.

use sha2::{Digest, Sha256};

/// Deterministic, one-way digest of arbitrary text.
///
/// Implementations must return the same fixed-length string for the same input.
pub trait ContentHasher: Send + Sync {
    fn digest(&self, text: &str) -> String;
}

/// SHA-256, lowercase hex (64 characters).
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

impl ContentHasher for Sha256Hasher {
    fn digest(&self, text: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        hex::encode(hasher.finalize())
    }
}
