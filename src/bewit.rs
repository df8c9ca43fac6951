use crate::attributes::Attributes;
use crate::b64;
use crate::clock::Clock;
use crate::credentials::Credentials;
use crate::error::*;
use crate::mac::Mac;
use crate::normalize::{parse_url, MacType};
use log::debug;
use std::borrow::Cow;
use std::convert::TryFrom;
use std::str::FromStr;
use std::time::Duration;
use url::{form_urlencoded, Url};

const BEWIT_PARAM: &str = "bewit";
const BACKSLASH: u8 = b'\\';

/// A Bewit is a piece of data attached to a GET request that functions in place of a Hawk
/// Authentication header.  It contains an id, an expiration timestamp, a MAC, and an optional
/// `ext` value.  These are available using accessor functions.
#[derive(Clone, Debug, PartialEq)]
pub struct Bewit<'a> {
    id: Cow<'a, str>,
    exp: i64,
    mac: Cow<'a, str>,
    ext: Option<Cow<'a, str>>,
}

impl<'a> Bewit<'a> {
    /// Create a new Bewit with the given values.  `mac` is the base64-encoded MAC.
    ///
    /// See [`BewitIssuer`] for an easier way to make a Bewit.
    pub fn new(id: &'a str, exp: i64, mac: &'a str, ext: Option<&'a str>) -> Bewit<'a> {
        Bewit {
            id: Cow::Borrowed(id),
            exp,
            mac: Cow::Borrowed(mac),
            ext: ext.filter(|s| !s.is_empty()).map(Cow::Borrowed),
        }
    }

    /// Extract the `bewit` query parameter from the URL, removing it.  The remaining query
    /// is rewritten in the canonical form that bewit MACs are computed over: stably sorted
    /// by key and form-urlencoded.
    ///
    /// A missing or empty bewit and a URL carrying more than one bewit are errors.
    pub fn from_url(url: &mut Url) -> Result<Bewit<'static>> {
        let bewit = Bewit::from_query(url.query().unwrap_or_default())?;
        canonicalize_query(url);
        Ok(bewit)
    }

    /// Find and decode the single `bewit` parameter of a raw query string.
    pub(crate) fn from_query(query: &str) -> Result<Bewit<'static>> {
        let mut bewits: Vec<String> = form_urlencoded::parse(query.as_bytes())
            .filter(|(k, _)| k == BEWIT_PARAM)
            .map(|(_, v)| v.into_owned())
            .collect();

        let bewit = match bewits.len() {
            0 => return Err(Malformed::EmptyBewit.into()),
            1 => bewits.remove(0),
            _ => return Err(Malformed::MultipleBewits.into()),
        };
        if bewit.is_empty() {
            return Err(Malformed::EmptyBewit.into());
        }
        Bewit::from_str(&bewit)
    }

    /// Generate the fully-encoded string for this Bewit
    pub fn to_str(&self) -> String {
        let raw = format!(
            "{}\\{}\\{}\\{}",
            self.id,
            self.exp,
            self.mac,
            self.ext().unwrap_or_default()
        );

        base64::encode_config(&raw, b64::BEWIT_CONFIG)
    }

    /// Get the Bewit's client identifier
    pub fn id(&self) -> &str {
        self.id.as_ref()
    }

    /// Get the expiration time of the bewit, in seconds since the UNIX epoch
    pub fn exp(&self) -> i64 {
        self.exp
    }

    /// Get the base64-encoded MAC included in the Bewit
    pub fn mac(&self) -> &str {
        self.mac.as_ref()
    }

    /// Get the Bewit's `ext` field.
    pub fn ext(&self) -> Option<&str> {
        match self.ext {
            Some(ref cow) => Some(cow.as_ref()),
            None => None,
        }
    }

    /// The attributes the Bewit's MAC is computed over: the expiration stands in for the
    /// timestamp, and the nonce is empty.
    pub(crate) fn attributes(&self) -> Attributes {
        let attrs = Attributes::new(self.exp, "");
        match self.ext() {
            Some(ext) => attrs.ext(ext),
            None => attrs,
        }
    }
}

impl<'a> FromStr for Bewit<'a> {
    type Err = Error;
    fn from_str(bewit: &str) -> Result<Bewit<'a>> {
        // tolerate padding added by encoders that always pad
        let bewit = base64::decode_config(bewit.trim_end_matches('='), b64::BEWIT_CONFIG)
            .map_err(|_| Malformed::InvalidEncoding)?;
        let bewit = String::from_utf8(bewit).map_err(|_| Malformed::InvalidEncoding)?;

        let parts: Vec<&str> = bewit.split(BACKSLASH as char).collect();
        if parts.len() != 4 {
            return Err(Malformed::InvalidStructure.into());
        }
        if parts[0].is_empty() || parts[1].is_empty() || parts[2].is_empty() {
            return Err(Malformed::MissingAttributes.into());
        }

        let exp = i64::from_str(parts[1]).map_err(|_| Malformed::InvalidTimestamp)?;

        Ok(Bewit {
            id: Cow::Owned(parts[0].to_string()),
            exp,
            mac: Cow::Owned(parts[2].to_string()),
            ext: match parts[3].len() {
                0 => None,
                _ => Some(Cow::Owned(parts[3].to_string())),
            },
        })
    }
}

/// Rewrite the URL's query in the canonical form signed by bewits: any `bewit` parameter
/// removed, the rest stably sorted by key and form-urlencoded.  A query left empty is
/// removed entirely.
pub(crate) fn canonicalize_query(url: &mut Url) {
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != BEWIT_PARAM)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    if pairs.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(pairs);
    }
}

/// The query of a request target as sent, absolute or origin-form, without its fragment.
pub(crate) fn raw_query(uri: &str) -> &str {
    let uri = uri.split('#').next().unwrap_or_default();
    uri.splitn(2, '?').nth(1).unwrap_or_default()
}

/// Issues bewits for a set of credentials.
///
/// # Examples
///
/// ```
/// use hawk_auth::{BewitIssuer, Credentials, DigestAlgorithm, SystemClock};
/// use std::time::Duration;
///
/// let credentials = Credentials::new("me", "tok", DigestAlgorithm::Sha256);
/// let issuer = BewitIssuer::new(&credentials, Duration::from_secs(60));
/// let bewit = issuer.issue("https://example.com/file?x=1", &SystemClock).unwrap();
/// let url = format!("https://example.com/file?x=1&bewit={}", bewit);
/// ```
#[derive(Debug, Clone)]
pub struct BewitIssuer<'c> {
    credentials: &'c Credentials,
    ttl: Duration,
    ext: Option<String>,
    local_time_offset: i64,
}

impl<'c> BewitIssuer<'c> {
    /// Create an issuer whose bewits are valid for `ttl` from the time of issue.
    pub fn new(credentials: &'c Credentials, ttl: Duration) -> Self {
        BewitIssuer {
            credentials,
            ttl,
            ext: None,
            local_time_offset: 0,
        }
    }

    pub fn ext<S: Into<String>>(mut self, ext: S) -> Self {
        let ext = ext.into();
        self.ext = if ext.is_empty() { None } else { Some(ext) };
        self
    }

    /// Seconds added to the clock's time when computing the expiration.
    pub fn local_time_offset(mut self, offset: i64) -> Self {
        self.local_time_offset = offset;
        self
    }

    /// Issue a bewit for `url`, to be appended to it as the `bewit` query parameter.
    ///
    /// Returns `None`, rather than an error, when no bewit can be produced: for an empty or
    /// unparseable URL, or incomplete credentials.
    pub fn issue(&self, url: &str, clock: &dyn Clock) -> Option<String> {
        if url.is_empty() {
            debug!("not issuing a bewit for an empty URL");
            return None;
        }
        match self.try_issue(url, clock) {
            Ok(bewit) => Some(bewit),
            Err(e) => {
                debug!("not issuing a bewit for {}: {}", url, e);
                None
            }
        }
    }

    fn try_issue(&self, url: &str, clock: &dyn Clock) -> Result<String> {
        let key = self.credentials.signing_key()?;
        if self.credentials.id.as_bytes().contains(&BACKSLASH) {
            return Err(Malformed::InvalidHeaderValue("id").into());
        }
        if let Some(ext) = &self.ext {
            if ext.as_bytes().contains(&BACKSLASH) {
                return Err(Malformed::InvalidHeaderValue("ext").into());
            }
        }

        let mut url = parse_url(url, None)?;
        canonicalize_query(&mut url);

        let ttl = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        let exp = clock.now(self.local_time_offset).saturating_add(ttl);

        let mut attrs = Attributes::new(exp, "");
        attrs.ext = self.ext.clone();
        let mac = Mac::new(MacType::Bewit, &key, "GET", url.as_str(), None, &attrs)?.to_string();

        let bewit = Bewit::new(&self.credentials.id, exp, &mac, self.ext.as_deref());
        Ok(bewit.to_str())
    }
}
