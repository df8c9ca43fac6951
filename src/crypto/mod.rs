//! Cryptographic backends.
//!
//! All hashing, HMAC computation and secret comparison in this crate goes through a
//! [`Cryptographer`].  One is installed automatically from the `use_ring` (default) or
//! `use_openssl` feature; a custom one can be installed with [`set_cryptographer`].

use crate::DigestAlgorithm;
use failure::Fail;

mod holder;
pub use self::holder::{set_boxed_cryptographer, set_cryptographer, SetCryptographerError};

#[cfg(feature = "use_ring")]
mod ring;

#[cfg(feature = "use_openssl")]
mod openssl;

#[derive(Fail, Debug)]
pub enum CryptoError {
    #[fail(display = "Digest algorithm {} is unsupported by the current Cryptographer", _0)]
    UnsupportedDigest(DigestAlgorithm),

    #[fail(display = "{}", _0)]
    Other(#[fail(cause)] failure::Error),
}

/// A key ready to produce HMAC tags.
pub trait HmacKey: Send + Sync {
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError>;
}

/// An incremental, unkeyed digest.
pub trait Hasher {
    fn update(&mut self, data: &[u8]) -> Result<(), CryptoError>;
    fn finish(&mut self) -> Result<Vec<u8>, CryptoError>;
}

pub trait Cryptographer: Send + Sync + 'static {
    fn new_key(&self, algorithm: DigestAlgorithm, key: &[u8])
        -> Result<Box<dyn HmacKey>, CryptoError>;

    fn new_hasher(&self, algorithm: DigestAlgorithm) -> Result<Box<dyn Hasher>, CryptoError>;

    /// Compare two slices of equal length without leaking the position of the first
    /// difference.  The crate never calls this with slices of different lengths.
    fn constant_time_compare(&self, a: &[u8], b: &[u8]) -> bool;
}

pub(crate) fn new_key(
    algorithm: DigestAlgorithm,
    key: &[u8],
) -> Result<Box<dyn HmacKey>, CryptoError> {
    holder::get_cryptographer().new_key(algorithm, key)
}

pub(crate) fn new_hasher(algorithm: DigestAlgorithm) -> Result<Box<dyn Hasher>, CryptoError> {
    holder::get_cryptographer().new_hasher(algorithm)
}

/// Compare two byte strings in constant time.
///
/// When the lengths differ, both operands are still scanned in full (the shorter one
/// zero-padded to the longer length) before the comparison reports inequality.
pub(crate) fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    let cryptographer = holder::get_cryptographer();
    if a.len() == b.len() {
        return cryptographer.constant_time_compare(a, b);
    }

    let len = std::cmp::max(a.len(), b.len());
    let mut padded_a = vec![0u8; len];
    let mut padded_b = vec![0u8; len];
    padded_a[..a.len()].copy_from_slice(a);
    padded_b[..b.len()].copy_from_slice(b);
    let _ = cryptographer.constant_time_compare(&padded_a, &padded_b);
    false
}
