use crate::attributes::Attributes;
use crate::bewit::{canonicalize_query, raw_query, Bewit};
use crate::clock::{Clock, SystemClock};
use crate::credentials::{Credentials, Key};
use crate::crypto;
use crate::error::*;
use crate::header::Header;
use crate::mac::Mac;
use crate::normalize::{parse_url, MacType};
use crate::payload::PayloadHasher;
use crate::store::{CredentialStore, NonceValidator};
use log::debug;
use std::convert::TryFrom;
use std::time::Duration;

const DEFAULT_TIMESTAMP_SKEW: Duration = Duration::from_secs(60);

/// Where the server finds the host, port and URI to verify, when they differ from what the
/// request itself carries (for example behind a reverse proxy).
#[derive(Debug, Clone, Default)]
pub struct HostOverride {
    host_header: Option<String>,
    host_port: Option<String>,
    uri_header: Option<String>,
}

impl HostOverride {
    pub fn new() -> Self {
        HostOverride::default()
    }

    /// Take the host (and optional port) from this request header instead of `Host`.
    pub fn host_header<S: Into<String>>(mut self, name: S) -> Self {
        self.host_header = Some(name.into());
        self
    }

    /// Always verify against this `host[:port]`.  Takes precedence over every other source
    /// of the host.
    pub fn host_port<S: Into<String>>(mut self, host_port: S) -> Self {
        self.host_port = Some(host_port.into());
        self
    }

    /// Take the whole request URI from this request header.  The host is then derived from
    /// that URI unless a fixed `host_port` is configured.
    pub fn uri_header<S: Into<String>>(mut self, name: S) -> Self {
        self.uri_header = Some(name.into());
        self
    }
}

/// The parts of an incoming HTTP request that Hawk authentication looks at.
///
/// `uri` may be absolute or, as on an HTTP/1.1 request line, origin-form; an origin-form URI
/// is resolved against the request's host.  The `host`, `content_type` and `authorization`
/// setters are shorthands for the corresponding headers.
#[derive(Debug, Clone)]
pub struct ServerRequest<'a> {
    method: &'a str,
    uri: &'a str,
    host: Option<&'a str>,
    content_type: Option<&'a str>,
    authorization: Option<&'a str>,
    payload: Option<&'a [u8]>,
    headers: Vec<(&'a str, &'a str)>,
}

impl<'a> ServerRequest<'a> {
    pub fn new(method: &'a str, uri: &'a str) -> Self {
        ServerRequest {
            method,
            uri,
            host: None,
            content_type: None,
            authorization: None,
            payload: None,
            headers: vec![],
        }
    }

    pub fn host(mut self, host: &'a str) -> Self {
        self.host = Some(host);
        self
    }

    pub fn content_type(mut self, content_type: &'a str) -> Self {
        self.content_type = Some(content_type);
        self
    }

    pub fn authorization(mut self, authorization: &'a str) -> Self {
        self.authorization = Some(authorization);
        self
    }

    /// Set the request body.  When a body is set, the request must carry a matching
    /// payload hash.
    pub fn payload<B>(mut self, payload: &'a B) -> Self
    where
        B: AsRef<[u8]> + ?Sized,
    {
        self.payload = Some(payload.as_ref());
        self
    }

    /// Add any other request header.
    pub fn header(mut self, name: &'a str, value: &'a str) -> Self {
        self.headers.push((name, value));
        self
    }

    /// Look up a header, case-insensitively.  Empty values count as absent.
    fn header_value(&self, name: &str) -> Option<&'a str> {
        let shorthand = if name.eq_ignore_ascii_case("host") {
            self.host
        } else if name.eq_ignore_ascii_case("content-type") {
            self.content_type
        } else if name.eq_ignore_ascii_case("authorization") {
            self.authorization
        } else {
            None
        };
        shorthand
            .or_else(|| {
                self.headers
                    .iter()
                    .find(|(n, _)| n.eq_ignore_ascii_case(name))
                    .map(|(_, v)| *v)
            })
            .filter(|v| !v.is_empty())
    }
}

/// The uri and host a request's MAC is verified against.
struct Target {
    uri: String,
    host_port: Option<String>,
}

/// The server side of Hawk: authenticates requests and bewits, and signs responses.
///
/// # Examples
///
/// ```
/// use hawk_auth::{HostOverride, Server, StaticCredentialStore};
/// use std::time::Duration;
///
/// let server = Server::new(StaticCredentialStore::new(vec![]))
///     .nonce_validator(|_key: &str, _nonce: &str, _ts: i64| true)
///     .timestamp_skew(Duration::from_secs(30))
///     .host_override(HostOverride::new().host_header("X-Forwarded-Host"));
/// ```
pub struct Server {
    store: Box<dyn CredentialStore>,
    nonce_validator: Option<Box<dyn NonceValidator>>,
    clock: Box<dyn Clock>,
    timestamp_skew: Duration,
    local_time_offset: i64,
    host_override: HostOverride,
}

impl Server {
    pub fn new<S>(store: S) -> Server
    where
        S: CredentialStore + 'static,
    {
        Server {
            store: Box::new(store),
            nonce_validator: None,
            clock: Box::new(SystemClock),
            timestamp_skew: DEFAULT_TIMESTAMP_SKEW,
            local_time_offset: 0,
            host_override: HostOverride::default(),
        }
    }

    /// Check every request's nonce with this validator.  Without one, nonces are not
    /// checked and replay protection is up to the caller.
    pub fn nonce_validator<N>(mut self, validator: N) -> Self
    where
        N: NonceValidator + 'static,
    {
        self.nonce_validator = Some(Box::new(validator));
        self
    }

    pub fn clock<C>(mut self, clock: C) -> Self
    where
        C: Clock + 'static,
    {
        self.clock = Box::new(clock);
        self
    }

    /// The largest accepted difference between a request's timestamp and this server's
    /// clock.  Defaults to 60 seconds.
    pub fn timestamp_skew(mut self, skew: Duration) -> Self {
        self.timestamp_skew = skew;
        self
    }

    /// Seconds added to every clock read.
    pub fn local_time_offset(mut self, offset: i64) -> Self {
        self.local_time_offset = offset;
        self
    }

    pub fn host_override(mut self, host_override: HostOverride) -> Self {
        self.host_override = host_override;
        self
    }

    fn now(&self) -> i64 {
        self.clock.now(self.local_time_offset)
    }

    /// Authenticate a request carrying a Hawk `Authorization` header, returning the
    /// credentials it was signed with.
    pub fn authenticate(&self, req: &ServerRequest) -> Result<Credentials> {
        let header = Header::parse(req.header_value("authorization").unwrap_or_default());
        let (id, nonce, mac) = match (&header.id, &header.nonce, &header.mac) {
            (Some(id), Some(nonce), Some(mac)) if header.ts.is_some() => (id, nonce, mac),
            _ => {
                debug!("{} {}: missing Hawk attributes", req.method, req.uri);
                return Err(Malformed::MissingAttributes.into());
            }
        };
        let ts = header.timestamp()?;

        let (credentials, key) = self.lookup(id)?;
        let target = self.target(req);

        let attrs = Attributes {
            ts,
            nonce: nonce.clone(),
            payload: None,
            content_type: None,
            hash: header.hash.clone(),
            ext: header.ext.clone(),
            app: header.app.clone(),
            dlg: header.dlg.clone(),
        };
        let expected = Mac::new(
            MacType::Header,
            &key,
            req.method,
            &target.uri,
            target.host_port.as_deref(),
            &attrs,
        )?;
        if !expected.matches(mac) {
            debug!("{} {}: bad MAC for id `{}`", req.method, req.uri, id);
            return Err(Error::MacMismatch);
        }

        if let Some(payload) = req.payload {
            let hash = header.hash.as_deref().ok_or_else(|| {
                debug!("{} {}: missing payload hash", req.method, req.uri);
                Malformed::MissingPayloadHash
            })?;
            let computed = PayloadHasher::hash(
                req.header_value("content-type").unwrap_or_default(),
                credentials.algorithm,
                payload,
            )?;
            if !crypto::constant_time_compare(computed.as_bytes(), hash.as_bytes()) {
                debug!("{} {}: bad payload hash for id `{}`", req.method, req.uri, id);
                return Err(Error::MacMismatch);
            }
        }

        if let Some(validator) = &self.nonce_validator {
            if !validator.validate(&credentials.key, nonce, ts) {
                debug!("{} {}: replayed nonce for id `{}`", req.method, req.uri, id);
                return Err(Error::ReplayRejected);
            }
        }

        let skew = i64::try_from(self.timestamp_skew.as_secs()).unwrap_or(i64::MAX);
        let now = self.now();
        if ts.saturating_sub(now).saturating_abs() > skew {
            debug!(
                "{} {}: stale timestamp {} (now {}) for id `{}`",
                req.method, req.uri, ts, now, id
            );
            return Err(Stale::Timestamp.into());
        }

        Ok(credentials)
    }

    /// Build the `Server-Authorization` header value for the response to an authenticated
    /// request.
    ///
    /// `attrs` supplies the response's `ext` and its payload hash: either `hash`, or a
    /// `content_type` and `payload` to compute it from.  The timestamp, nonce and
    /// delegation attributes are taken from the request.
    pub fn response_header(
        &self,
        credentials: &Credentials,
        req: &ServerRequest,
        attrs: &Attributes,
    ) -> Result<String> {
        let key = credentials.signing_key()?;
        let header = Header::parse(req.header_value("authorization").unwrap_or_default());
        let nonce = header.nonce.clone().ok_or(Malformed::MissingAttributes)?;
        let ts = header.timestamp()?;

        let hash = match (&attrs.hash, &attrs.content_type) {
            (Some(hash), _) => Some(hash.clone()),
            (None, Some(content_type)) => Some(PayloadHasher::hash(
                content_type,
                credentials.algorithm,
                attrs.payload.as_deref().unwrap_or_default(),
            )?),
            (None, None) => None,
        };

        let response = Attributes {
            ts,
            nonce,
            payload: None,
            content_type: None,
            hash,
            ext: attrs.ext.clone(),
            app: header.app.clone(),
            dlg: header.dlg.clone(),
        };
        let target = self.target(req);
        let mac = Mac::new(
            MacType::Response,
            &key,
            req.method,
            &target.uri,
            target.host_port.as_deref(),
            &response,
        )?;
        Header::response_value(&mac, &response)
    }

    /// Authenticate a GET or HEAD request carrying a `bewit` query parameter in place of an
    /// `Authorization` header.
    pub fn authenticate_bewit(&self, req: &ServerRequest) -> Result<Credentials> {
        if req.header_value("authorization").is_some() {
            debug!("{} {}: bewit with Authorization header", req.method, req.uri);
            return Err(ProtocolViolation::MultipleAuthentications.into());
        }
        if !req.method.eq_ignore_ascii_case("GET") && !req.method.eq_ignore_ascii_case("HEAD") {
            debug!("{} {}: bewit on a {} request", req.method, req.uri, req.method);
            return Err(ProtocolViolation::InvalidMethod(req.method.to_string()).into());
        }

        let target = self.target(req);
        let bewit = Bewit::from_query(raw_query(&target.uri))?;

        let now = self.now();
        if bewit.exp() <= now {
            debug!(
                "{} {}: bewit expired at {} (now {})",
                req.method, req.uri, bewit.exp(), now
            );
            return Err(Stale::Expired.into());
        }

        let mut url = parse_url(&target.uri, target.host_port.as_deref())?;
        canonicalize_query(&mut url);

        let (credentials, key) = self.lookup(bewit.id())?;
        let expected = Mac::new(
            MacType::Bewit,
            &key,
            "GET",
            url.as_str(),
            target.host_port.as_deref(),
            &bewit.attributes(),
        )?;
        if !expected.matches(bewit.mac()) {
            debug!("{} {}: bad bewit MAC for id `{}`", req.method, req.uri, bewit.id());
            return Err(Error::MacMismatch);
        }

        Ok(credentials)
    }

    /// Build a `WWW-Authenticate` header value telling a client with a stale clock the
    /// server's time, signed so the client can trust it.
    pub fn timestamp_header(&self, credentials: &Credentials) -> Result<String> {
        let key = credentials.signing_key()?;
        let ts = self.now();
        let tsm = Mac::for_timestamp(&key, ts)?;
        Header::timestamp_value(ts, &tsm, &Stale::Timestamp.to_string())
    }

    fn lookup(&self, id: &str) -> Result<(Credentials, Key)> {
        let credentials = self.store.get_credentials(id).map_err(|e| {
            debug!("credential lookup for id `{}` failed: {}", id, e);
            CredentialError::LookupFailed(e.to_string())
        })?;
        let key = credentials.signing_key().map_err(|e| {
            debug!("credentials for id `{}` are unusable: {}", id, e);
            e
        })?;
        Ok((credentials, key))
    }

    fn target(&self, req: &ServerRequest) -> Target {
        let overrides = &self.host_override;
        let uri_from_header = overrides
            .uri_header
            .as_deref()
            .and_then(|name| req.header_value(name));

        let host_port = if let Some(host_port) = &overrides.host_port {
            Some(host_port.clone())
        } else if uri_from_header.is_some() {
            None
        } else {
            overrides
                .host_header
                .as_deref()
                .and_then(|name| req.header_value(name))
                .or_else(|| req.header_value("host"))
                .map(str::to_string)
        };

        Target {
            uri: uri_from_header.unwrap_or(req.uri).to_string(),
            host_port,
        }
    }
}
