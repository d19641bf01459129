//! Invite token generation.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;

/// Number of random bytes in an invite token.
const TOKEN_BYTES: usize = 32;

/// Generate a URL-safe invite token from 32 random bytes.
#[must_use]
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Acceptance URL for a token.
#[must_use]
pub fn acceptance_url(base_url: &str, token: &str) -> String {
    format!("{}/auth/invite/{token}", base_url.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_shape() {
        let token = generate_token();
        assert_eq!(token.len(), 43);
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
        assert_ne!(token, generate_token());
    }

    #[test]
    fn test_acceptance_url() {
        assert_eq!(
            acceptance_url("https://app.example.com/", "abc"),
            "https://app.example.com/auth/invite/abc"
        );
    }
}
