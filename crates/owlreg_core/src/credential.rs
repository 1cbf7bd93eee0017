//! Salted credential hashing shared with the staff-auth surface.
//!
//! # Responsibility
//! - Hash and verify staff passwords with a per-password random salt.
//!
//! # Invariants
//! - Stored blobs are `SALT_LEN + HASH_LEN` bytes: salt first, hash second.
//! - Verification never panics, whatever the stored blob looks like.

use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;

pub const SALT_LEN: usize = 32;
pub const HASH_LEN: usize = 32;
const PBKDF2_ROUNDS: u32 = 100_000;

/// Hashes a password under a freshly generated salt.
///
/// The returned blob embeds the salt, so it is self-contained for storage
/// in a single binary column.
pub fn hash_password(password: &str) -> Vec<u8> {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    hash_with_salt(password, &salt)
}

/// Verifies a provided password against a stored `salt || hash` blob.
///
/// Malformed blobs (wrong length) verify as `false` rather than erroring.
pub fn verify_password(stored: &[u8], provided: &str) -> bool {
    if stored.len() != SALT_LEN + HASH_LEN {
        return false;
    }
    hash_with_salt(provided, &stored[..SALT_LEN]) == stored
}

fn hash_with_salt(password: &str, salt: &[u8]) -> Vec<u8> {
    let mut derived = [0u8; HASH_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ROUNDS, &mut derived);

    let mut stored = Vec::with_capacity(SALT_LEN + HASH_LEN);
    stored.extend_from_slice(salt);
    stored.extend_from_slice(&derived);
    stored
}

#[cfg(test)]
mod tests {
    use super::{hash_password, verify_password, HASH_LEN, SALT_LEN};

    #[test]
    fn hash_then_verify_roundtrip() {
        let stored = hash_password("correct horse");
        assert_eq!(stored.len(), SALT_LEN + HASH_LEN);
        assert!(verify_password(&stored, "correct horse"));
    }

    #[test]
    fn wrong_password_is_rejected() {
        let stored = hash_password("correct horse");
        assert!(!verify_password(&stored, "battery staple"));
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let first = hash_password("repeat");
        let second = hash_password("repeat");
        assert_ne!(first[..SALT_LEN], second[..SALT_LEN]);
    }

    #[test]
    fn malformed_blob_verifies_false() {
        assert!(!verify_password(b"short", "anything"));
        assert!(!verify_password(&[], "anything"));
    }
}
