use super::{CryptoError, Cryptographer, Hasher, HmacKey};
use crate::DigestAlgorithm;
use openssl::error::ErrorStack;
use openssl::hash::MessageDigest;
use openssl::pkey::{PKey, Private};
use openssl::sign::Signer;

impl From<ErrorStack> for CryptoError {
    fn from(e: ErrorStack) -> Self {
        CryptoError::Other(e.into())
    }
}

pub struct OpensslCryptographer;

struct OpensslHmacKey {
    key: PKey<Private>,
    digest: MessageDigest,
}

impl HmacKey for OpensslHmacKey {
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let mut signer = Signer::new(self.digest, &self.key)?;
        signer.update(data)?;
        Ok(signer.sign_to_vec()?)
    }
}

struct OpensslHasher(openssl::hash::Hasher);

impl Hasher for OpensslHasher {
    fn update(&mut self, data: &[u8]) -> Result<(), CryptoError> {
        self.0.update(data)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<Vec<u8>, CryptoError> {
        let digest = self.0.finish()?;
        Ok(digest.as_ref().to_vec())
    }
}

fn message_digest(algorithm: DigestAlgorithm) -> MessageDigest {
    match algorithm {
        DigestAlgorithm::Sha256 => MessageDigest::sha256(),
        DigestAlgorithm::Sha512 => MessageDigest::sha512(),
    }
}

impl Cryptographer for OpensslCryptographer {
    fn new_key(
        &self,
        algorithm: DigestAlgorithm,
        key: &[u8],
    ) -> Result<Box<dyn HmacKey>, CryptoError> {
        Ok(Box::new(OpensslHmacKey {
            key: PKey::hmac(key)?,
            digest: message_digest(algorithm),
        }))
    }

    fn new_hasher(&self, algorithm: DigestAlgorithm) -> Result<Box<dyn Hasher>, CryptoError> {
        let hasher = openssl::hash::Hasher::new(message_digest(algorithm))?;
        Ok(Box::new(OpensslHasher(hasher)))
    }

    fn constant_time_compare(&self, a: &[u8], b: &[u8]) -> bool {
        // openssl's memcmp panics on a length mismatch
        a.len() == b.len() && openssl::memcmp::eq(a, b)
    }
}
