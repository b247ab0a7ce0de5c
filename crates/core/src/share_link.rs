//! Share-token generation and expiry.
//!
//! A share token grants time-limited, unauthenticated download access to
//! exactly one file. Tokens are short random identifiers drawn from a
//! URL-safe alphabet so they can sit directly in a path segment.

use chrono::Duration;
use rand::Rng;

use crate::types::Timestamp;

/// URL-safe token alphabet (64 symbols).
const TOKEN_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

/// Length of a generated share token.
pub const TOKEN_LENGTH: usize = 12;

/// Generate a new unguessable share token (12 chars, 64-symbol alphabet,
/// 72 bits of entropy).
pub fn generate_token() -> String {
    let mut rng = rand::rng();
    (0..TOKEN_LENGTH)
        .map(|_| TOKEN_ALPHABET[rng.random_range(0..TOKEN_ALPHABET.len())] as char)
        .collect()
}

/// Expiry timestamp for a token issued or refreshed at `now`.
pub fn expires_at(now: Timestamp, token_lifetime_days: i64) -> Timestamp {
    now + Duration::days(token_lifetime_days)
}

/// Whether a token with the given expiry is past its lifetime.
pub fn is_expired(expires_at: Timestamp, now: Timestamp) -> bool {
    now > expires_at
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
