use crate::b64;
use crate::error::*;
use rand::rngs::OsRng;
use rand::RngCore;

/// Create a random string with `bytes` bytes of entropy, drawn from the operating system's
/// RNG.  The string is url-safe base64 without padding, so it will be longer than `bytes`
/// characters, and can be used as a nonce directly.
pub fn random_nonce(bytes: usize) -> Result<String> {
    let mut buf = vec![0u8; bytes];
    OsRng.try_fill_bytes(&mut buf)?;
    Ok(base64::encode_config(&buf, b64::BEWIT_CONFIG))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_random_nonce() {
        let nonce = random_nonce(10).unwrap();
        // 10 bytes encode to 14 characters without padding
        assert_eq!(nonce.len(), 14);
        assert!(nonce
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_ne!(nonce, random_nonce(10).unwrap());
    }
}
