//! One-way hashing of license keys.
//!
//! Only the SHA-256 digest of a raw key is ever stored. Verification hashes the
//! presented key and compares digests in constant time.

use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Hash a raw license key for storage. Returns a lowercase hex string.
pub fn hash_key(raw_key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw_key.as_bytes());
    hex::encode(hasher.finalize())
}

/// Check a presented raw key against a stored digest.
pub fn verify_key(raw_key: &str, stored_digest: &str) -> bool {
    let presented = hash_key(raw_key);
    presented.as_bytes().ct_eq(stored_digest.as_bytes()).into()
}

/// Constant-time equality for bearer tokens.
pub fn tokens_match(presented: &str, expected: &str) -> bool {
    presented.as_bytes().ct_eq(expected.as_bytes()).into()
}

/// Generate a random raw license key: 20 random bytes, hex encoded.
pub fn generate_key() -> String {
    let mut bytes = [0u8; 20];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
