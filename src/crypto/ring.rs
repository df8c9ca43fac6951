use super::{CryptoError, Cryptographer, Hasher, HmacKey};
use crate::DigestAlgorithm;
use ring::{constant_time, digest, hmac};

pub struct RingCryptographer;

struct RingHmacKey(hmac::Key);

impl HmacKey for RingHmacKey {
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let tag = hmac::sign(&self.0, data);
        Ok(tag.as_ref().to_vec())
    }
}

// This is always `Some` until `finish` is called.
struct RingHasher(Option<digest::Context>);

impl Hasher for RingHasher {
    fn update(&mut self, data: &[u8]) -> Result<(), CryptoError> {
        match self.0.as_mut() {
            Some(ctx) => {
                ctx.update(data);
                Ok(())
            }
            None => Err(finished()),
        }
    }

    fn finish(&mut self) -> Result<Vec<u8>, CryptoError> {
        let ctx = self.0.take().ok_or_else(finished)?;
        Ok(ctx.finish().as_ref().to_vec())
    }
}

fn finished() -> CryptoError {
    CryptoError::Other(failure::err_msg("hasher used after `finish`"))
}

impl Cryptographer for RingCryptographer {
    fn new_key(
        &self,
        algorithm: DigestAlgorithm,
        key: &[u8],
    ) -> Result<Box<dyn HmacKey>, CryptoError> {
        let algorithm = match algorithm {
            DigestAlgorithm::Sha256 => hmac::HMAC_SHA256,
            DigestAlgorithm::Sha512 => hmac::HMAC_SHA512,
        };
        Ok(Box::new(RingHmacKey(hmac::Key::new(algorithm, key))))
    }

    fn new_hasher(&self, algorithm: DigestAlgorithm) -> Result<Box<dyn Hasher>, CryptoError> {
        let algorithm = match algorithm {
            DigestAlgorithm::Sha256 => &digest::SHA256,
            DigestAlgorithm::Sha512 => &digest::SHA512,
        };
        Ok(Box::new(RingHasher(Some(digest::Context::new(algorithm)))))
    }

    fn constant_time_compare(&self, a: &[u8], b: &[u8]) -> bool {
        constant_time::verify_slices_are_equal(a, b).is_ok()
    }
}
