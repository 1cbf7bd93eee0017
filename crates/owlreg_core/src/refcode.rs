//! Reference code generation.
//!
//! # Responsibility
//! - Produce the short, human-shareable identifier that correlates one
//!   registration across both backends.
//!
//! # Invariants
//! - Generated codes are exactly `REFERENCE_CODE_LEN` characters and start
//!   with `R`, so they are visually distinct from raw row IDs.
//! - Truncation uses a fixed offset and keeps the trailing random block.

use rand::Rng;
use std::time::{SystemTime, UNIX_EPOCH};

/// Authoritative code width; the networked store's column is this wide.
pub const REFERENCE_CODE_LEN: usize = 10;

const RANDOM_BLOCK_LEN: usize = 5;
const TRUNCATE_OFFSET: usize = 5;
const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Current unix time in whole seconds.
pub(crate) fn unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}

/// Generates a reference code from the current timestamp plus a random
/// uppercase-alphanumeric block.
///
/// Collisions are not algebraically prevented: callers treat a uniqueness
/// violation on insert as retryable and regenerate once.
pub fn generate_reference_code() -> String {
    let mut rng = rand::rng();
    let random_block: String = (0..RANDOM_BLOCK_LEN)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect();

    let raw = format!("R{}{random_block}", unix_seconds());
    if raw.len() <= REFERENCE_CODE_LEN {
        return raw;
    }

    // Drop the slow-moving leading timestamp digits; the window keeps the
    // low digits and the random tail so per-second codes stay distinct.
    let window = &raw[TRUNCATE_OFFSET..TRUNCATE_OFFSET + REFERENCE_CODE_LEN - 1];
    format!("R{window}")
}

#[cfg(test)]
mod tests {
    use super::{generate_reference_code, CHARSET, REFERENCE_CODE_LEN};

    #[test]
    fn generated_code_has_fixed_width_and_prefix() {
        let code = generate_reference_code();
        assert_eq!(code.len(), REFERENCE_CODE_LEN);
        assert!(code.starts_with('R'));
    }

    #[test]
    fn generated_code_uses_uppercase_alphanumerics_only() {
        let code = generate_reference_code();
        assert!(code.bytes().all(|byte| byte == b'R' || CHARSET.contains(&byte)));
    }

    #[test]
    fn consecutive_codes_differ() {
        let codes: Vec<String> = (0..32).map(|_| generate_reference_code()).collect();
        let first = &codes[0];
        assert!(codes.iter().any(|code| code != first));
    }
}
