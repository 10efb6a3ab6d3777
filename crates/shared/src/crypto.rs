//! Digest helpers and one-time code generation.

use rand::Rng;
use sha2::{Digest, Sha256};

/// Computes SHA-256 hash of the input and returns it as a hex string.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Generates a numeric one-time code with exactly `digits` digits.
///
/// The first digit is never zero so the code keeps its length when
/// handled as a number by clients.
pub fn generate_numeric_code(digits: u32) -> String {
    let digits = digits.clamp(1, 9);
    let low = 10u32.pow(digits - 1);
    let high = 10u32.pow(digits);
    rand::thread_rng().gen_range(low..high).to_string()
}

/// Compares two strings in constant time with respect to their contents.
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex() {
        let hash = sha256_hex("test");
        assert_eq!(hash.len(), 64);
        assert_eq!(
            hash,
            "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08"
        );
    }

    #[test]
    fn test_sha256_hex_deterministic() {
        assert_eq!(sha256_hex("4821"), sha256_hex("4821"));
        assert_ne!(sha256_hex("4821"), sha256_hex("4822"));
    }

    #[test]
    fn test_generate_numeric_code_length() {
        for _ in 0..200 {
            let code = generate_numeric_code(4);
            assert_eq!(code.len(), 4);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
            assert!(!code.starts_with('0'));
        }
    }

    #[test]
    fn test_generate_numeric_code_clamps_digits() {
        assert_eq!(generate_numeric_code(0).len(), 1);
        assert_eq!(generate_numeric_code(12).len(), 9);
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq("abc", "abc"));
        assert!(!constant_time_eq("abc", "abd"));
        assert!(!constant_time_eq("abc", "abcd"));
        assert!(constant_time_eq("", ""));
    }
}
