//! The collaborators a [`Server`](crate::Server) consults: where credentials come from, and
//! how replayed nonces are detected.

use crate::credentials::Credentials;
use failure::format_err;
use std::collections::HashMap;

/// Looks up credentials by id.
///
/// Implementations may back this with a database, configuration file, or any other
/// credential store.  Closures of the matching signature implement it too.
pub trait CredentialStore: Send + Sync {
    /// Retrieve the credentials for the given id.  Any error is reported to the caller of
    /// the server as a failed lookup.
    fn get_credentials(&self, id: &str) -> Result<Credentials, failure::Error>;
}

impl<F> CredentialStore for F
where
    F: Fn(&str) -> Result<Credentials, failure::Error> + Send + Sync,
{
    fn get_credentials(&self, id: &str) -> Result<Credentials, failure::Error> {
        self(id)
    }
}

/// A simple in-memory credential store.
///
/// # Examples
///
/// ```
/// use hawk_auth::{CredentialStore, Credentials, DigestAlgorithm, StaticCredentialStore};
///
/// let store = StaticCredentialStore::new(vec![
///     Credentials::new("dh37fgj492je", "werxhqb98rpaxn39848xrunpaw3489ruxnpa98w4rxn", DigestAlgorithm::Sha256),
/// ]);
///
/// assert!(store.get_credentials("dh37fgj492je").is_ok());
/// assert!(store.get_credentials("nobody").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticCredentialStore {
    credentials: HashMap<String, Credentials>,
}

impl StaticCredentialStore {
    pub fn new(credentials: impl IntoIterator<Item = Credentials>) -> Self {
        StaticCredentialStore {
            credentials: credentials
                .into_iter()
                .map(|c| (c.id.clone(), c))
                .collect(),
        }
    }
}

impl CredentialStore for StaticCredentialStore {
    fn get_credentials(&self, id: &str) -> Result<Credentials, failure::Error> {
        self.credentials
            .get(id)
            .cloned()
            .ok_or_else(|| format_err!("unknown id `{}`", id))
    }
}

/// Decides whether a nonce may be used.
///
/// `validate` must atomically check and record the `(key, nonce)` pair: of two concurrent
/// calls presenting the same pair, at most one may return true.  How long nonces are
/// remembered is up to the implementation; they need not outlive the server's timestamp
/// skew.
pub trait NonceValidator: Send + Sync {
    fn validate(&self, key: &str, nonce: &str, ts: i64) -> bool;
}

impl<F> NonceValidator for F
where
    F: Fn(&str, &str, i64) -> bool + Send + Sync,
{
    fn validate(&self, key: &str, nonce: &str, ts: i64) -> bool {
        self(key, nonce, ts)
    }
}
