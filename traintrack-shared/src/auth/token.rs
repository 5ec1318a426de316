/// Session tokens and random credentials
///
/// # Security
///
/// - **Format**: `tts_{40_chars}` (prefix + 40 random alphanumeric chars)
/// - **Storage**: Tokens are hashed with SHA-256 before storage; only the
///   client ever holds the plaintext
///
/// # Example
///
/// ```
/// use traintrack_shared::auth::token::{generate_session_token, hash_session_token, validate_session_token_format};
///
/// let (token, hash) = generate_session_token();
/// assert!(validate_session_token_format(&token));
/// assert_eq!(hash_session_token(&token), hash);
/// ```

use rand::Rng;
use sha2::{Digest, Sha256};

/// Length of the random part of a session token (characters)
const TOKEN_RANDOM_LENGTH: usize = 40;

/// Session token prefix
const TOKEN_PREFIX: &str = "tts_";

/// Total length of a session token (prefix + random)
pub const SESSION_TOKEN_LENGTH: usize = TOKEN_PREFIX.len() + TOKEN_RANDOM_LENGTH;

/// Length of generated temporary passwords
pub const TEMPORARY_PASSWORD_LENGTH: usize = 16;

/// Generates a new session token
///
/// # Returns
///
/// Tuple of (plaintext_token, sha256_hex_hash)
pub fn generate_session_token() -> (String, String) {
    let token = format!("{}{}", TOKEN_PREFIX, generate_random_string(TOKEN_RANDOM_LENGTH));
    let hash = hash_session_token(&token);

    (token, hash)
}

/// Generates a random temporary password for the reset flow
pub fn generate_temporary_password() -> String {
    generate_random_string(TEMPORARY_PASSWORD_LENGTH)
}

/// Generates a random alphanumeric string (base62)
fn generate_random_string(length: usize) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();

    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// Hashes a session token using SHA-256
///
/// Returns the hex-encoded digest (64 characters).
pub fn hash_session_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Checks a token has the expected prefix, length and alphabet
///
/// Malformed tokens are rejected before any store lookup.
pub fn validate_session_token_format(token: &str) -> bool {
    if token.len() != SESSION_TOKEN_LENGTH {
        return false;
    }

    match token.strip_prefix(TOKEN_PREFIX) {
        Some(random_part) => random_part.chars().all(|c| c.is_ascii_alphanumeric()),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_session_token_format() {
        let (token, hash) = generate_session_token();

        assert!(token.starts_with("tts_"));
        assert_eq!(token.len(), SESSION_TOKEN_LENGTH);
        assert_eq!(hash.len(), 64);
        assert!(validate_session_token_format(&token));
    }

    #[test]
    fn test_generate_session_token_unique() {
        let (token1, hash1) = generate_session_token();
        let (token2, hash2) = generate_session_token();

        assert_ne!(token1, token2);
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_hash_deterministic() {
        assert_eq!(hash_session_token("tts_abc"), hash_session_token("tts_abc"));
        assert_ne!(hash_session_token("tts_abc"), hash_session_token("tts_abd"));
    }

    #[test]
    fn test_validate_format_rejects_malformed() {
        assert!(!validate_session_token_format(""));
        assert!(!validate_session_token_format("tts_short"));

        let wrong_prefix = format!("xyz_{}", "a".repeat(TOKEN_RANDOM_LENGTH));
        assert!(!validate_session_token_format(&wrong_prefix));

        let bad_chars = format!("tts_{}!", "a".repeat(TOKEN_RANDOM_LENGTH - 1));
        assert!(!validate_session_token_format(&bad_chars));
    }

    #[test]
    fn test_temporary_password() {
        let password = generate_temporary_password();
        assert_eq!(password.len(), TEMPORARY_PASSWORD_LENGTH);
        assert!(password.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(password, generate_temporary_password());
    }
}
