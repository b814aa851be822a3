//! Random shortcode generation
//!
//! Auto-generated codes draw from a 36-symbol alphabet (lowercase letters
//! plus digits) at a fixed length of 6, giving a 36^6 keyspace. Collisions
//! are resolved by redrawing, bounded at 100 attempts; exhausting them means
//! the store is saturated for this alphabet and length.

use rand::Rng;

use crate::error::StoreError;

/// Alphabet for auto-generated codes (lowercase + digits only)
const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Length of auto-generated codes
pub const CODE_LENGTH: usize = 6;

/// Bound on collision-resolution redraws
pub const MAX_ATTEMPTS: u32 = 100;

/// Draws one uniformly random code of [`CODE_LENGTH`] symbols.
pub fn random_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LENGTH)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Draws codes until one passes the caller's collision check.
///
/// `taken` must answer case-insensitively; generated codes are already
/// lowercase so no normalization happens here.
pub fn generate_unique(mut taken: impl FnMut(&str) -> bool) -> Result<String, StoreError> {
    for _ in 0..MAX_ATTEMPTS {
        let code = random_code();
        if !taken(&code) {
            return Ok(code);
        }
    }
    Err(StoreError::GenerationExhausted)
}
