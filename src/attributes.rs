use crate::clock::Clock;
use crate::error::*;
use crate::payload::PayloadHasher;
use crate::util::random_nonce;
use crate::DigestAlgorithm;

/// Number of random bytes in a generated nonce.
const NONCE_BYTES: usize = 6;

/// The per-operation Hawk parameter set.
///
/// `payload` and `content_type` are never transmitted; they are used to compute `hash`.
/// `app` and `dlg` apply only to delegated credentials, and `dlg` is ignored without `app`.
/// Empty strings are treated as absent by all setters.
///
/// # Examples
///
/// ```
/// use hawk_auth::Attributes;
/// let base = Attributes::new(1353832234, "j4h3g2").app("my-app");
/// let with_ext = base.clone().ext("some-app-ext-data");
/// assert_eq!(with_ext.app.as_deref(), Some("my-app"));
/// assert_eq!(base.ext, None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Attributes {
    pub ts: i64,
    pub nonce: String,
    pub payload: Option<Vec<u8>>,
    pub content_type: Option<String>,
    pub hash: Option<String>,
    pub ext: Option<String>,
    pub app: Option<String>,
    pub dlg: Option<String>,
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

impl Attributes {
    pub fn new<S: Into<String>>(ts: i64, nonce: S) -> Self {
        Attributes {
            ts,
            nonce: nonce.into(),
            ..Default::default()
        }
    }

    /// Attributes for a new request: the clock's current time and a fresh random nonce.
    pub fn generate(clock: &dyn Clock, offset: i64) -> Result<Self> {
        Ok(Attributes::new(clock.now(offset), random_nonce(NONCE_BYTES)?))
    }

    /// Set the body and content type from which `hash` will be computed.
    pub fn payload<C, P>(mut self, content_type: C, payload: P) -> Self
    where
        C: Into<String>,
        P: Into<Vec<u8>>,
    {
        self.content_type = Some(content_type.into());
        self.payload = Some(payload.into());
        self
    }

    /// Set a precomputed payload hash (base64).
    pub fn hash<S: Into<String>>(mut self, hash: S) -> Self {
        self.hash = non_empty(hash.into());
        self
    }

    pub fn ext<S: Into<String>>(mut self, ext: S) -> Self {
        self.ext = non_empty(ext.into());
        self
    }

    pub fn app<S: Into<String>>(mut self, app: S) -> Self {
        self.app = non_empty(app.into());
        self
    }

    pub fn dlg<S: Into<String>>(mut self, dlg: S) -> Self {
        self.dlg = non_empty(dlg.into());
        self
    }

    /// Return a copy of these attributes with `hash` filled in from `payload` and
    /// `content_type`, when the hash is absent and both of those are present.
    pub fn with_payload_hash(&self, algorithm: DigestAlgorithm) -> Result<Attributes> {
        let mut derived = self.clone();
        if derived.hash.is_none() {
            if let (Some(content_type), Some(payload)) = (&self.content_type, &self.payload) {
                derived.hash = Some(PayloadHasher::hash(content_type, algorithm, payload)?);
            }
        }
        Ok(derived)
    }
}
