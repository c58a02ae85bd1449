//! Code generation and hashing for one-time codes.

use rand::{rngs::OsRng, Rng};
use sha2::{Digest, Sha256};

/// Number of digits in a generated code.
pub const CODE_LEN: usize = 6;

/// Generate a random 6-digit numeric code.
///
/// Each digit is drawn uniformly from the OS CSPRNG; collisions across
/// accounts are permitted. The plaintext is only handed to the mailer,
/// never persisted.
#[must_use]
pub fn generate_code() -> String {
    let mut rng = OsRng;
    (0..CODE_LEN)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

/// Hash a code for storage and comparison.
///
/// Deterministic SHA-256 hex digest; the cleartext code never reaches the
/// database.
#[must_use]
pub fn hash_code(code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(code.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_code_is_six_digits() {
        for _ in 0..32 {
            let code = generate_code();
            assert_eq!(code.len(), CODE_LEN);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn hash_is_deterministic_hex() {
        let first = hash_code("123456");
        let second = hash_code("123456");
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn different_codes_hash_differently() {
        assert_ne!(hash_code("123456"), hash_code("123457"));
    }

    #[test]
    fn hash_matches_known_vector() {
        // sha256("123456")
        assert_eq!(
            hash_code("123456"),
            "8d969eef6ecad3c29a3a629280e686cf0c3f5d5a86aff3ca12020c923adc6c92"
        );
    }
}
