use base64::{Engine as _, engine::general_purpose};
use rand::RngCore;
use rand::rngs::OsRng;
use subtle::ConstantTimeEq;

/// The size of session and CSRF tokens in bytes (256 bits).
pub const TOKEN_SIZE: usize = 32;

/// Generates a new random token.
///
/// # Returns
///
/// A URL-safe base64-encoded token without padding.
pub fn generate_token() -> String {
    let mut token = [0u8; TOKEN_SIZE];
    OsRng.fill_bytes(&mut token);
    general_purpose::URL_SAFE_NO_PAD.encode(token)
}

/// Compares two tokens in constant time.
///
/// Length differences return early; only the contents are protected.
pub fn tokens_match(expected: &str, candidate: &str) -> bool {
    expected.as_bytes().ct_eq(candidate.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_carry_256_bits() {
        let token = generate_token();
        let decoded = general_purpose::URL_SAFE_NO_PAD.decode(&token).unwrap();
        assert_eq!(decoded.len(), TOKEN_SIZE);
    }

    #[test]
    fn tokens_are_unique() {
        assert_ne!(generate_token(), generate_token());
    }

    #[test]
    fn matching_is_exact() {
        let token = generate_token();
        assert!(tokens_match(&token, &token.clone()));
        assert!(!tokens_match(&token, ""));
        assert!(!tokens_match(&token, &token[1..]));
        assert!(!tokens_match(&token, &generate_token()));
    }
}
