//! OTP code generation and one-way hashing helpers.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use rand::Rng;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

/// Generate a numeric one-time code of the given length (e.g. 6 -> "149523").
///
/// Digits come from the operating system's CSPRNG; the short TTL on stored
/// codes makes an unsalted digest acceptable, but predictable generation
/// would not be.
#[must_use]
pub fn generate_numeric_code(length: usize) -> String {
    let mut rng = OsRng;
    (0..length).map(|_| rng.gen_range(0..10).to_string()).collect()
}

/// SHA-256 digest of the input, base64-encoded.
///
/// Used for OTP storage: only the digest is persisted, never the plaintext.
#[must_use]
pub fn sha256_base64(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    BASE64.encode(hasher.finalize())
}

/// One-way hash of a client IP for abuse throttling.
///
/// Raw addresses are never persisted; the salt keeps the hash from being a
/// trivially reversible lookup table over the IPv4 space.
#[must_use]
pub fn hash_ip(ip: &str) -> String {
    sha256_base64(&format!("quillpost-ip:{ip}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_numeric_code_length_and_charset() {
        for length in [4, 6, 8] {
            let code = generate_numeric_code(length);
            assert_eq!(code.len(), length);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_generate_numeric_code_varies() {
        // 10^-60 collision odds; a repeat here means the RNG is broken.
        let codes: Vec<String> = (0..10).map(|_| generate_numeric_code(6)).collect();
        assert!(codes.windows(2).any(|w| w[0] != w[1]));
    }

    #[test]
    fn test_sha256_base64_is_deterministic() {
        assert_eq!(sha256_base64("123456"), sha256_base64("123456"));
        assert_ne!(sha256_base64("123456"), sha256_base64("123457"));
    }

    #[test]
    fn test_sha256_base64_known_vector() {
        // SHA-256("abc") = ba7816bf... ; base64 of those bytes.
        assert_eq!(sha256_base64("abc"), "ungWv48Bz+pBQUDeXa4iI7ADYaOWF3qctBD/YfIAFa0=");
    }

    #[test]
    fn test_hash_ip_differs_from_plain_digest() {
        assert_ne!(hash_ip("203.0.113.7"), sha256_base64("203.0.113.7"));
    }
}
