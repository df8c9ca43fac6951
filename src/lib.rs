//! The `hawk_auth` crate provides support for [Hawk](https://github.com/hueniverse/hawk)
//! authentication.  It is a low-level crate, used by higher-level crates to integrate with
//! various Rust HTTP libraries.  It does no I/O of its own: the HTTP transport, credential
//! storage and nonce-replay bookkeeping are supplied by the embedding application through
//! the [`CredentialStore`], [`NonceValidator`] and [`Clock`] traits.
//!
//! # Examples
//!
//! ## Hawk Client
//!
//! A client signs each request with [`Client::request_header`], sends the result as the
//! `Authorization` header, and checks the server's `Server-Authorization` header with
//! [`Client::authenticate_response`].
//!
//! ```
//! use hawk_auth::{Attributes, Client, Credentials, DigestAlgorithm};
//!
//! let credentials = Credentials::new(
//!     "dh37fgj492je",
//!     "werxhqb98rpaxn39848xrunpaw3489ruxnpa98w4rxn",
//!     DigestAlgorithm::Sha256,
//! );
//! let client = Client::new(credentials);
//!
//! // a real client would use `Attributes::generate` for the current time and a fresh nonce
//! let attributes = Attributes::new(1353832234, "j4h3g2").ext("some-app-ext-data");
//! let header = client
//!     .request_header("GET", "http://example.com:8000/resource/1?b=1&a=2", &attributes)
//!     .unwrap();
//! assert_eq!(
//!     header,
//!     "Hawk id=\"dh37fgj492je\", ts=\"1353832234\", nonce=\"j4h3g2\", \
//!      ext=\"some-app-ext-data\", mac=\"6R4rV5iE+NPoym+WwjeHzjAGXUtLNIxmo1vpMofpLAE=\""
//! );
//! ```
//!
//! ## Hawk Server
//!
//! A server looks the client's credentials up by id and validates the header.
//!
//! ```
//! use hawk_auth::{
//!     Credentials, DigestAlgorithm, FixedClock, Server, ServerRequest, StaticCredentialStore,
//! };
//!
//! let store = StaticCredentialStore::new(vec![Credentials::new(
//!     "dh37fgj492je",
//!     "werxhqb98rpaxn39848xrunpaw3489ruxnpa98w4rxn",
//!     DigestAlgorithm::Sha256,
//! )]);
//! let server = Server::new(store).clock(FixedClock(1353832234));
//!
//! let authorization = "Hawk id=\"dh37fgj492je\", ts=\"1353832234\", nonce=\"j4h3g2\", \
//!     ext=\"some-app-ext-data\", mac=\"6R4rV5iE+NPoym+WwjeHzjAGXUtLNIxmo1vpMofpLAE=\"";
//! let request = ServerRequest::new("GET", "/resource/1?b=1&a=2")
//!     .host("example.com:8000")
//!     .authorization(authorization);
//!
//! let credentials = server.authenticate(&request).unwrap();
//! assert_eq!(credentials.id, "dh37fgj492je");
//! ```
//!
//! ## Bewits
//!
//! A [`BewitIssuer`] produces a token granting time-limited GET access to a single URL; the
//! server checks it with [`Server::authenticate_bewit`].
//!
//! ```
//! use hawk_auth::{BewitIssuer, Credentials, DigestAlgorithm, FixedClock};
//! use std::time::Duration;
//!
//! let credentials = Credentials::new("123456", "2983d45yun89q", DigestAlgorithm::Sha256);
//! let bewit = BewitIssuer::new(&credentials, Duration::from_secs(60 * 60 * 24 * 365 * 100))
//!     .ext("some-app-data")
//!     .issue("http://example.com/resource/4?a=1&b=2", &FixedClock(1365711458))
//!     .unwrap();
//! assert_eq!(
//!     bewit,
//!     "MTIzNDU2XDQ1MTkzMTE0NThcYkkwanFlS1prUHE0V1hRMmkxK0NrQ2lOanZEc3BSVkNGajlmbElqMXphWT1\
//!      cc29tZS1hcHAtZGF0YQ"
//! );
//! ```
//!
//! # Request paths
//!
//! Request targets are parsed as URLs before signing, so dot segments in the path are
//! resolved and unsafe characters percent-encoded.  Peers that sign the raw path only
//! interoperate for targets that are already in that normal form.
//!
//! # Features
//!
//! By default, the `use_ring` feature is enabled, which means that this crate will use `ring`
//! for all cryptographic operations.  Alternatively, `use_openssl` selects OpenSSL, or any
//! other [`crypto::Cryptographer`] implementation can be installed with
//! [`crypto::set_cryptographer`] before the first cryptographic operation.

use std::fmt;
use std::str::FromStr;

mod b64;
mod error;
pub use crate::error::*;

mod clock;
pub use crate::clock::{Clock, FixedClock, SystemClock};

mod credentials;
pub use crate::credentials::{Credentials, Key};

mod attributes;
pub use crate::attributes::Attributes;

mod normalize;
pub use crate::normalize::{normalize, MacType};

mod payload;
pub use crate::payload::{sanitize_content_type, PayloadHasher};

mod mac;
pub use crate::mac::Mac;

mod header;
pub use crate::header::Header;

mod bewit;
pub use crate::bewit::{Bewit, BewitIssuer};

mod store;
pub use crate::store::{CredentialStore, NonceValidator, StaticCredentialStore};

mod client;
pub use crate::client::Client;

mod server;
pub use crate::server::{HostOverride, Server, ServerRequest};

mod util;
pub use crate::util::random_nonce;

pub mod crypto;

/// The digest algorithm agreed between client and server for a set of credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigestAlgorithm {
    Sha256,
    Sha512,
}

impl DigestAlgorithm {
    /// The algorithm's conventional Hawk name, as used in configuration.
    pub fn name(self) -> &'static str {
        match self {
            DigestAlgorithm::Sha256 => "sha256",
            DigestAlgorithm::Sha512 => "sha512",
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = Error;
    fn from_str(s: &str) -> Result<DigestAlgorithm> {
        if s.eq_ignore_ascii_case("sha256") {
            Ok(DigestAlgorithm::Sha256)
        } else if s.eq_ignore_ascii_case("sha512") {
            Ok(DigestAlgorithm::Sha512)
        } else {
            Err(Malformed::InvalidAlgorithm(s.to_string()).into())
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_algorithm_names() {
        assert_eq!(DigestAlgorithm::Sha256.to_string(), "sha256");
        assert_eq!(
            "SHA512".parse::<DigestAlgorithm>().unwrap(),
            DigestAlgorithm::Sha512
        );
        assert_eq!(
            "sha256".parse::<DigestAlgorithm>().unwrap(),
            DigestAlgorithm::Sha256
        );
    }

    #[test]
    fn test_algorithm_unknown() {
        match "md5".parse::<DigestAlgorithm>() {
            Err(Error::Malformed(Malformed::InvalidAlgorithm(name))) => assert_eq!(name, "md5"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
