use crate::crypto::{self, HmacKey};
use crate::error::*;
use crate::DigestAlgorithm;
use std::fmt;

/// Hawk credentials: an id, the secret key associated with that id, and the digest
/// algorithm agreed between client and server.
///
/// Credentials with an empty id or key are *incomplete*; every signing or verifying
/// operation refuses them rather than falling back to a default.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub id: String,
    pub key: String,
    pub algorithm: DigestAlgorithm,
}

impl Credentials {
    pub fn new<I, K>(id: I, key: K, algorithm: DigestAlgorithm) -> Credentials
    where
        I: Into<String>,
        K: Into<String>,
    {
        Credentials {
            id: id.into(),
            key: key.into(),
            algorithm,
        }
    }

    /// True if both the id and the key are non-empty.
    pub fn is_complete(&self) -> bool {
        !self.id.is_empty() && !self.key.is_empty()
    }

    /// Build the HMAC key for these credentials, refusing incomplete credentials.
    pub fn signing_key(&self) -> Result<Key> {
        if !self.is_complete() {
            return Err(CredentialError::Incomplete.into());
        }
        Key::new(&self.key, self.algorithm)
    }
}

// the key never appears in debug output
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("id", &self.id)
            .field("key", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

/// Hawk key.
///
/// While any sequence of bytes can be specified as a key, note that each digest algorithm has
/// a suggested key length, and that passwords should *not* be used as keys.  Keys of incorrect
/// length are handled according to the digest's implementation.
pub struct Key(Box<dyn HmacKey>);

impl Key {
    pub fn new<B>(key: B, algorithm: DigestAlgorithm) -> Result<Key>
    where
        B: AsRef<[u8]>,
    {
        Ok(Key(crypto::new_key(algorithm, key.as_ref())?))
    }

    pub fn sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(self.0.sign(data)?)
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("Key(..)")
    }
}
