use crate::attributes::Attributes;
use crate::error::*;
use log::trace;
use url::{ParseError, Url};

/// The kind of MAC being computed.  Each kind signs a differently-tagged canonical string,
/// so a MAC of one kind can never be replayed as another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacType {
    Header,
    Response,
    Bewit,
}

impl MacType {
    pub fn tag(self) -> &'static str {
        match self {
            MacType::Header => "header",
            MacType::Response => "response",
            MacType::Bewit => "bewit",
        }
    }
}

/// Build the canonical string signed by a Hawk MAC.
///
/// `host_port`, when given, replaces the host and port found in `uri`.  It may omit the
/// port, in which case the port still comes from `uri` (or its scheme's default).  A
/// relative `uri` is only accepted together with `host_port`.
///
/// The signed path is the one the `url` crate parses out of `uri`: dot segments are
/// resolved and characters outside the URL path set are percent-encoded.  Both sides of
/// this crate agree on it, but a peer that signs the path exactly as sent will compute a
/// different MAC for targets such as `/a/./b` or `/a b`.
pub fn normalize(
    mac_type: MacType,
    method: &str,
    uri: &str,
    host_port: Option<&str>,
    attrs: &Attributes,
) -> Result<Vec<u8>> {
    let url = parse_url(uri, host_port)?;
    let (host, port) = target_host_port(&url, host_port)?;

    let mut target = url.path().to_string();
    if let Some(query) = url.query() {
        target.push('?');
        target.push_str(query);
    }

    let mut buffer: Vec<u8> = vec![];
    write_field(&mut buffer, &format!("hawk.1.{}", mac_type.tag()));
    write_field(&mut buffer, &attrs.ts.to_string());
    write_field(&mut buffer, &attrs.nonce);
    write_field(&mut buffer, &method.to_ascii_uppercase());
    write_field(&mut buffer, &target);
    write_field(&mut buffer, &host.to_ascii_lowercase());
    write_field(&mut buffer, &port.to_string());
    write_field(&mut buffer, attrs.hash.as_deref().unwrap_or_default());
    write_field(&mut buffer, &escape_ext(attrs.ext.as_deref().unwrap_or_default()));

    if let Some(app) = attrs.app.as_deref().filter(|app| !app.is_empty()) {
        write_field(&mut buffer, app);
        write_field(&mut buffer, attrs.dlg.as_deref().unwrap_or_default());
    }

    trace!(
        "normalized {} string: {:?}",
        mac_type.tag(),
        String::from_utf8_lossy(&buffer)
    );
    Ok(buffer)
}

fn write_field(buffer: &mut Vec<u8>, value: &str) {
    buffer.extend_from_slice(value.as_bytes());
    buffer.push(b'\n');
}

fn escape_ext(ext: &str) -> String {
    ext.replace('\\', "\\\\").replace('\n', "\\n")
}

/// Parse `uri`, resolving an origin-form (relative) URI against `http://<host_port>`.
pub(crate) fn parse_url(uri: &str, host_port: Option<&str>) -> Result<Url> {
    match Url::parse(uri) {
        Ok(url) => Ok(url),
        Err(ParseError::RelativeUrlWithoutBase) => {
            let host_port = host_port
                .filter(|h| !h.is_empty())
                .ok_or_else(|| Malformed::InvalidUrl(format!("{}: no host to resolve against", uri)))?;
            let base = Url::parse(&format!("http://{}/", host_port))
                .map_err(|e| Malformed::InvalidUrl(format!("{}: {}", host_port, e)))?;
            Ok(base
                .join(uri)
                .map_err(|e| Malformed::InvalidUrl(format!("{}: {}", uri, e)))?)
        }
        Err(e) => Err(Malformed::InvalidUrl(format!("{}: {}", uri, e)).into()),
    }
}

/// Determine the host and port that are signed for `url`.
fn target_host_port(url: &Url, host_port: Option<&str>) -> Result<(String, u16)> {
    let url_port = url.port_or_known_default();
    if let Some(host_port) = host_port.filter(|h| !h.is_empty()) {
        let (host, port) = split_host_port(host_port)?;
        let port = port
            .or(url_port)
            .ok_or_else(|| Malformed::InvalidUrl(format!("{}: no port", host_port)))?;
        return Ok((host.to_string(), port));
    }

    let host = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| Malformed::InvalidUrl(format!("{}: no host", url)))?;
    let port = url_port.ok_or_else(|| Malformed::InvalidUrl(format!("{}: no port", url)))?;
    Ok((host.to_string(), port))
}

/// Split a `host[:port]` value, as found in a `Host` header.  Bracketed IPv6 literals keep
/// their brackets, matching how hosts are rendered from URLs.
pub(crate) fn split_host_port(value: &str) -> Result<(&str, Option<u16>)> {
    let invalid = || Malformed::InvalidUrl(format!("invalid host `{}`", value));

    let (host, port) = if value.starts_with('[') {
        let end = value.find(']').ok_or_else(invalid)?;
        let rest = &value[end + 1..];
        if rest.is_empty() {
            (&value[..=end], None)
        } else if rest.starts_with(':') {
            (&value[..=end], Some(&rest[1..]))
        } else {
            return Err(invalid().into());
        }
    } else {
        match value.rfind(':') {
            // an unbracketed IPv6 literal has no port
            Some(_) if value.matches(':').count() > 1 => (value, None),
            Some(i) => (&value[..i], Some(&value[i + 1..])),
            None => (value, None),
        }
    };

    if host.is_empty() {
        return Err(invalid().into());
    }
    let port = match port {
        Some(port) => Some(port.parse::<u16>().map_err(|_| invalid())?),
        None => None,
    };
    Ok((host, port))
}
