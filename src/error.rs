use crate::crypto::CryptoError;
use failure::Fail;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by this crate.
///
/// MAC and payload-hash mismatches share the single [`Error::MacMismatch`] variant, so a
/// caller relaying the error cannot tell an attacker which of the two checks failed.
#[derive(Fail, Debug)]
pub enum Error {
    #[fail(display = "{}", _0)]
    Malformed(#[fail(cause)] Malformed),

    #[fail(display = "{}", _0)]
    Credential(#[fail(cause)] CredentialError),

    #[fail(display = "Bad MAC")]
    MacMismatch,

    #[fail(display = "Replayed request rejected")]
    ReplayRejected,

    #[fail(display = "{}", _0)]
    Stale(#[fail(cause)] Stale),

    #[fail(display = "{}", _0)]
    ProtocolViolation(#[fail(cause)] ProtocolViolation),

    #[fail(display = "Crypto error: {}", _0)]
    Crypto(#[fail(cause)] CryptoError),

    #[fail(display = "RNG error: {}", _0)]
    Rng(#[fail(cause)] rand::Error),
}

/// Input that cannot be interpreted as Hawk protocol data.
#[derive(Fail, Debug, PartialEq)]
pub enum Malformed {
    #[fail(display = "Invalid url: {}", _0)]
    InvalidUrl(String),

    #[fail(display = "Invalid Hawk header value for `{}`", _0)]
    InvalidHeaderValue(&'static str),

    #[fail(display = "Missing Hawk attributes")]
    MissingAttributes,

    #[fail(display = "Missing required payload hash")]
    MissingPayloadHash,

    #[fail(display = "Missing response hash attribute")]
    MissingResponseHash,

    #[fail(display = "Empty bewit")]
    EmptyBewit,

    #[fail(display = "Multiple bewits in URL")]
    MultipleBewits,

    #[fail(display = "Invalid bewit encoding")]
    InvalidEncoding,

    #[fail(display = "Invalid bewit structure")]
    InvalidStructure,

    #[fail(display = "Invalid timestamp value")]
    InvalidTimestamp,

    #[fail(display = "Unsupported digest algorithm `{}`", _0)]
    InvalidAlgorithm(String),
}

#[derive(Fail, Debug, PartialEq)]
pub enum CredentialError {
    #[fail(display = "Failed to get credentials: {}", _0)]
    LookupFailed(String),

    #[fail(display = "Incomplete credentials")]
    Incomplete,
}

#[derive(Fail, Debug, PartialEq)]
pub enum Stale {
    #[fail(display = "Stale timestamp")]
    Timestamp,

    #[fail(display = "Access expired")]
    Expired,
}

#[derive(Fail, Debug, PartialEq)]
pub enum ProtocolViolation {
    #[fail(display = "Multiple authentications")]
    MultipleAuthentications,

    #[fail(display = "Invalid method `{}` for bewit authentication", _0)]
    InvalidMethod(String),
}

impl From<Malformed> for Error {
    fn from(e: Malformed) -> Self {
        Error::Malformed(e)
    }
}

impl From<CredentialError> for Error {
    fn from(e: CredentialError) -> Self {
        Error::Credential(e)
    }
}

impl From<Stale> for Error {
    fn from(e: Stale) -> Self {
        Error::Stale(e)
    }
}

impl From<ProtocolViolation> for Error {
    fn from(e: ProtocolViolation) -> Self {
        Error::ProtocolViolation(e)
    }
}

impl From<CryptoError> for Error {
    fn from(e: CryptoError) -> Self {
        Error::Crypto(e)
    }
}

impl From<rand::Error> for Error {
    fn from(e: rand::Error) -> Self {
        Error::Rng(e)
    }
}
