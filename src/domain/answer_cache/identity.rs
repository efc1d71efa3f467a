//! Deterministic point identifiers

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Derives content-addressed ids from `(question, usecase)`
pub struct IdentityHasher;

impl IdentityHasher {
    /// Id for the pair: SHA-256 of `question + "_" + usecase`, truncated to
    /// 16 bytes and rendered as a hyphenated UUID.
    pub fn id(question: &str, usecase: &str) -> String {
        let digest = Sha256::digest(format!("{}_{}", question, usecase).as_bytes());

        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&digest[..16]);

        Uuid::from_bytes(bytes).to_string()
    }
}
