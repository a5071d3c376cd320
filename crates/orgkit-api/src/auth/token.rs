//! Invitation token generation.

/// Generate an opaque invitation token: 16 random bytes, hex-encoded.
///
/// 128 bits of entropy makes collisions negligible; the storage-level unique
/// index on the token column is the backstop either way.
pub fn generate_invitation_token() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let random_bytes: Vec<u8> = (0..16).map(|_| rng.random()).collect();
    hex::encode(random_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_32_hex_chars() {
        let token = generate_invitation_token();
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn sequential_tokens_differ() {
        let a = generate_invitation_token();
        let b = generate_invitation_token();
        assert_ne!(a, b);
    }
}
