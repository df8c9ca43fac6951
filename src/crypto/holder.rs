use super::Cryptographer;
use failure::Fail;
use once_cell::sync::OnceCell;

static CRYPTOGRAPHER: OnceCell<&'static dyn Cryptographer> = OnceCell::new();

#[derive(Debug, Fail)]
#[fail(display = "Cryptographer already initialized")]
pub struct SetCryptographerError(());

/// Sets the global object that will be used for cryptographic operations.
///
/// This is a convenience wrapper over [`set_cryptographer`],
/// but takes a `Box<dyn Cryptographer>` instead.
pub fn set_boxed_cryptographer(c: Box<dyn Cryptographer>) -> Result<(), SetCryptographerError> {
    set_cryptographer(Box::leak(c))
}

/// Sets the global object that will be used for cryptographic operations.
///
/// This function may only be called once in the lifetime of a program, and must be called
/// before the first operation that needs cryptography.  With the `use_ring` or `use_openssl`
/// feature enabled, that first operation installs the feature's backend instead.
///
/// Any calls into this crate that perform cryptography with no backend installed and no
/// backend feature enabled will panic.
pub fn set_cryptographer(c: &'static dyn Cryptographer) -> Result<(), SetCryptographerError> {
    CRYPTOGRAPHER.set(c).map_err(|_| SetCryptographerError(()))
}

pub(crate) fn get_cryptographer() -> &'static dyn Cryptographer {
    autoinit_crypto();
    CRYPTOGRAPHER
        .get()
        .copied()
        .expect("`hawk_auth` cryptographer not initialized!")
}

#[cfg(feature = "use_ring")]
#[inline]
fn autoinit_crypto() {
    let _ = set_cryptographer(&super::ring::RingCryptographer);
}

#[cfg(all(feature = "use_openssl", not(feature = "use_ring")))]
#[inline]
fn autoinit_crypto() {
    let _ = set_cryptographer(&super::openssl::OpensslCryptographer);
}

#[cfg(not(any(feature = "use_openssl", feature = "use_ring")))]
#[inline]
fn autoinit_crypto() {}
