use crate::attributes::Attributes;
use crate::clock::Clock;
use crate::credentials::Credentials;
use crate::crypto;
use crate::error::*;
use crate::header::Header;
use crate::mac::Mac;
use crate::normalize::MacType;
use crate::payload::PayloadHasher;
use log::debug;

/// The client side of Hawk: signs requests and authenticates the server's responses.
#[derive(Debug, Clone)]
pub struct Client {
    credentials: Credentials,
}

impl Client {
    pub fn new(credentials: Credentials) -> Client {
        Client { credentials }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Build the `Authorization` header value for a request.
    ///
    /// If `attrs` carries a payload and content type but no hash, the hash is computed and
    /// signed; the caller's `attrs` are left as they were.
    pub fn request_header(&self, method: &str, uri: &str, attrs: &Attributes) -> Result<String> {
        let key = self.credentials.signing_key()?;
        let attrs = attrs.with_payload_hash(self.credentials.algorithm)?;
        let mac = Mac::new(MacType::Header, &key, method, uri, None, &attrs)?;
        Header::request_value(&self.credentials.id, &attrs, &mac)
    }

    /// Authenticate the `Server-Authorization` header of a response to a request made with
    /// `attrs`.
    ///
    /// When `payload` (the response body) is given, the response must carry a matching
    /// payload hash over it and `content_type`.  Without it, only the MAC is checked.
    pub fn authenticate_response(
        &self,
        method: &str,
        uri: &str,
        attrs: &Attributes,
        server_authorization: &str,
        content_type: Option<&str>,
        payload: Option<&[u8]>,
    ) -> Result<()> {
        let key = self.credentials.signing_key()?;
        let header = Header::parse(server_authorization);
        let expected = header.mac.as_deref().ok_or(Malformed::MissingAttributes)?;

        let verification = Attributes {
            hash: header.hash.clone(),
            ext: header.ext.clone(),
            payload: None,
            content_type: None,
            ..attrs.clone()
        };
        let mac = Mac::new(MacType::Response, &key, method, uri, None, &verification)?;
        if !mac.matches(expected) {
            debug!("response to {} {}: bad MAC", method, uri);
            return Err(Error::MacMismatch);
        }

        let payload = match payload {
            Some(payload) => payload,
            None => return Ok(()),
        };
        let hash = header.hash.as_deref().ok_or(Malformed::MissingResponseHash)?;
        let computed = PayloadHasher::hash(
            content_type.unwrap_or_default(),
            self.credentials.algorithm,
            payload,
        )?;
        if !crypto::constant_time_compare(computed.as_bytes(), hash.as_bytes()) {
            debug!("response to {} {}: bad payload hash", method, uri);
            return Err(Error::MacMismatch);
        }
        Ok(())
    }

    /// Verify the time-synchronization hint in a server's `WWW-Authenticate` header and
    /// return the server's clock minus this client's, in seconds.  Pass the result as the
    /// offset of later clock reads, e.g. to [`Attributes::generate`].
    pub fn timestamp_offset(&self, www_authenticate: &str, clock: &dyn Clock) -> Result<i64> {
        let key = self.credentials.signing_key()?;
        let header = Header::parse(www_authenticate);
        let ts = header.timestamp()?;
        let tsm = header.tsm.as_deref().ok_or(Malformed::MissingAttributes)?;
        if !Mac::for_timestamp(&key, ts)?.matches(tsm) {
            debug!("timestamp hint: bad tsm");
            return Err(Error::MacMismatch);
        }
        Ok(ts.saturating_sub(clock.now(0)))
    }
}
