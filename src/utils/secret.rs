//! Secret generation and timing-safe comparison.

use rand::distributions::Alphanumeric;
use rand::Rng;

/// Fixed length of a session token secret.
pub const SECRET_LENGTH: usize = 60;

/// Generate a fresh random secret.
///
/// Alphanumeric only, so the recaller separator `|` can never appear in it.
pub fn generate_secret() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SECRET_LENGTH)
        .map(char::from)
        .collect()
}

/// Constant-time byte comparison to prevent timing attacks.
///
/// The stored and supplied secrets must be compared without short-circuiting
/// on the first mismatching byte; an attacker measuring response times must
/// learn nothing beyond the length check.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_secrets_are_fixed_length_alphanumeric() {
        let secret = generate_secret();
        assert_eq!(secret.len(), SECRET_LENGTH);
        assert!(secret.chars().all(|c| c.is_ascii_alphanumeric()));
        assert!(!secret.contains('|'));
    }

    #[test]
    fn generated_secrets_differ() {
        assert_ne!(generate_secret(), generate_secret());
    }

    #[test]
    fn constant_time_eq_works() {
        assert!(constant_time_eq(b"hello", b"hello"));
        assert!(!constant_time_eq(b"hello", b"world"));
        assert!(!constant_time_eq(b"short", b"longer"));
        assert!(constant_time_eq(b"", b""));
    }
}
