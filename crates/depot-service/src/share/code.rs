//! Share code generation.

use rand::Rng;
use uuid::Uuid;

/// Length of a share code.
pub const CODE_LENGTH: usize = 10;

/// Alphanumeric alphabet used for share codes.
const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Generate a random fixed-length alphanumeric share code.
pub fn generate_code() -> String {
    let mut rng = rand::thread_rng();
    (0..CODE_LENGTH)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

/// UUID-derived fallback code, used when random codes keep colliding.
pub fn fallback_code() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    hex[..CODE_LENGTH].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_have_fixed_length_and_charset() {
        for _ in 0..100 {
            let code = generate_code();
            assert_eq!(code.len(), CODE_LENGTH);
            assert!(code.bytes().all(|b| ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn fallback_code_has_fixed_length() {
        let code = fallback_code();
        assert_eq!(code.len(), CODE_LENGTH);
        assert!(code.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn consecutive_codes_differ() {
        // Collisions are possible but vanishingly unlikely across a handful
        // of draws; a stuck RNG would fail this immediately.
        let codes: std::collections::HashSet<String> =
            (0..16).map(|_| generate_code()).collect();
        assert!(codes.len() > 1);
    }
}
