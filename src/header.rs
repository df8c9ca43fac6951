use crate::attributes::Attributes;
use crate::error::*;
use crate::mac::Mac;
use std::fmt::Write;

const SCHEME_PREFIX: &str = "Hawk ";

/// The attributes of a Hawk header value, as found in the `Authorization`,
/// `Server-Authorization` and `WWW-Authenticate` headers.
///
/// Every attribute is optional at this level: which ones are required depends on where the
/// header came from, and is checked by the [`Client`](crate::Client) and
/// [`Server`](crate::Server).  Empty values are treated as absent.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Header {
    pub id: Option<String>,
    pub ts: Option<String>,
    pub nonce: Option<String>,
    pub hash: Option<String>,
    pub ext: Option<String>,
    pub mac: Option<String>,
    pub app: Option<String>,
    pub dlg: Option<String>,
    pub tsm: Option<String>,
    pub error: Option<String>,
}

impl Header {
    /// Parse a header value such as `Hawk id="..", ts="..", mac=".."`.
    ///
    /// Parsing never fails.  A value without the `Hawk ` prefix yields an empty header,
    /// malformed `key="value"` pairs and unknown keys are skipped, and when a key is
    /// repeated its first value wins.
    pub fn parse(value: &str) -> Header {
        let mut header = Header::default();
        let mut p = match value.trim_start().strip_prefix(SCHEME_PREFIX) {
            Some(rest) => rest,
            None => return header,
        };

        while !p.is_empty() {
            // Skip whitespace and commas used as separators
            p = p.trim_start_matches(|c: char| c == ',' || c.is_whitespace());
            if p.is_empty() {
                break;
            }

            match parse_pair(p) {
                Some((attr, val, rest)) => {
                    header.set(attr, val);
                    p = rest;
                }
                // skip to the next separator and carry on
                None => match p.find(',') {
                    Some(i) => p = &p[i + 1..],
                    None => break,
                },
            }
        }
        header
    }

    fn set(&mut self, attr: &str, val: &str) {
        let slot = match attr {
            "id" => &mut self.id,
            "ts" => &mut self.ts,
            "nonce" => &mut self.nonce,
            "hash" => &mut self.hash,
            "ext" => &mut self.ext,
            "mac" => &mut self.mac,
            "app" => &mut self.app,
            "dlg" => &mut self.dlg,
            "tsm" => &mut self.tsm,
            "error" => &mut self.error,
            _ => return,
        };
        if slot.is_none() && !val.is_empty() {
            *slot = Some(val.to_string());
        }
    }

    /// The `ts` attribute as a unix timestamp.
    pub fn timestamp(&self) -> Result<i64> {
        match &self.ts {
            None => Err(Malformed::MissingAttributes.into()),
            Some(ts) => Ok(ts
                .parse::<i64>()
                .map_err(|_| Malformed::InvalidTimestamp)?),
        }
    }

    /// Format an `Authorization` header value.
    pub(crate) fn request_value(id: &str, attrs: &Attributes, mac: &Mac) -> Result<String> {
        let mut w = HeaderWriter::new();
        w.field("id", id)?;
        w.field("ts", &attrs.ts.to_string())?;
        w.field("nonce", &attrs.nonce)?;
        w.optional_field("hash", attrs.hash.as_deref())?;
        w.optional_field("ext", attrs.ext.as_deref())?;
        w.field("mac", &mac.to_string())?;
        if let Some(app) = attrs.app.as_deref().filter(|app| !app.is_empty()) {
            w.field("app", app)?;
            w.optional_field("dlg", attrs.dlg.as_deref())?;
        }
        Ok(w.finish())
    }

    /// Format a `Server-Authorization` header value.
    pub(crate) fn response_value(mac: &Mac, attrs: &Attributes) -> Result<String> {
        let mut w = HeaderWriter::new();
        w.field("mac", &mac.to_string())?;
        w.optional_field("hash", attrs.hash.as_deref())?;
        w.optional_field("ext", attrs.ext.as_deref())?;
        Ok(w.finish())
    }

    /// Format a `WWW-Authenticate` header value carrying a time-synchronization hint.
    pub(crate) fn timestamp_value(ts: i64, tsm: &Mac, error: &str) -> Result<String> {
        let mut w = HeaderWriter::new();
        w.field("ts", &ts.to_string())?;
        w.field("tsm", &tsm.to_string())?;
        w.field("error", error)?;
        Ok(w.finish())
    }
}

/// Parse one `key="value"` pair at the start of `p`, returning the key, the value and the
/// remaining input.
fn parse_pair(p: &str) -> Option<(&str, &str, &str)> {
    let eq = p.find('=')?;
    let attr = p[..eq].trim();
    if attr.is_empty() || !attr.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }
    let rest = p[eq + 1..].trim_start().strip_prefix('"')?;
    // Hawk does not allow escaped characters in values, so the first quote ends the value
    let end = rest.find('"')?;
    let val = &rest[..end];
    if val.contains('\\') {
        return None;
    }
    Some((attr, val, &rest[end + 1..]))
}

struct HeaderWriter {
    out: String,
    first: bool,
}

impl HeaderWriter {
    fn new() -> Self {
        HeaderWriter {
            out: SCHEME_PREFIX.to_string(),
            first: true,
        }
    }

    /// Append `name="value"`, refusing values that could not be parsed back.
    fn field(&mut self, name: &'static str, value: &str) -> Result<()> {
        if value.chars().any(|c| c == '"' || c == '\\' || c.is_control()) {
            return Err(Malformed::InvalidHeaderValue(name).into());
        }
        if !self.first {
            self.out.push_str(", ");
        }
        self.first = false;
        // writing to a String cannot fail
        let _ = write!(self.out, "{}=\"{}\"", name, value);
        Ok(())
    }

    fn optional_field(&mut self, name: &'static str, value: Option<&str>) -> Result<()> {
        match value {
            Some(value) if !value.is_empty() => self.field(name, value),
            _ => Ok(()),
        }
    }

    fn finish(self) -> String {
        self.out
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn some(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    #[test]
    fn test_parse() {
        let header = Header::parse(
            "Hawk id=\"dh37fgj492je\", ts=\"1353832234\", nonce=\"j4h3g2\", \
             hash=\"Yi9LfIIFRtBEPt74PVmbTF/xVAwPn7ub15ePICfgnuY=\", ext=\"some-app-ext-data\", \
             mac=\"6R4rV5iE+NPoym+WwjeHzjAGXUtLNIxmo1vpMofpLAE=\", app=\"my-app\", dlg=\"my-dlg\"",
        );
        assert_eq!(
            header,
            Header {
                id: some("dh37fgj492je"),
                ts: some("1353832234"),
                nonce: some("j4h3g2"),
                hash: some("Yi9LfIIFRtBEPt74PVmbTF/xVAwPn7ub15ePICfgnuY="),
                ext: some("some-app-ext-data"),
                mac: some("6R4rV5iE+NPoym+WwjeHzjAGXUtLNIxmo1vpMofpLAE="),
                app: some("my-app"),
                dlg: some("my-dlg"),
                tsm: None,
                error: None,
            }
        );
        assert_eq!(header.timestamp().unwrap(), 1353832234);
    }

    #[test]
    fn test_parse_tolerant_separators() {
        let header = Header::parse("Hawk id=\"a\",ts=\"1\"  nonce=\"n\" ,mac=\"m\",");
        assert_eq!(header.id, some("a"));
        assert_eq!(header.ts, some("1"));
        assert_eq!(header.nonce, some("n"));
        assert_eq!(header.mac, some("m"));
    }

    #[test]
    fn test_parse_without_prefix() {
        assert_eq!(Header::parse("id=\"a\", mac=\"m\""), Header::default());
        assert_eq!(Header::parse("Bearer abc"), Header::default());
        assert_eq!(Header::parse(""), Header::default());
        assert_eq!(Header::parse("Hawk "), Header::default());
    }

    #[test]
    fn test_parse_skips_malformed_pairs() {
        let header = Header::parse("Hawk id=abc, ts=\"1\", nonce=\"a\\b\", bogus, mac=\"m\"");
        assert_eq!(header.id, None);
        assert_eq!(header.ts, some("1"));
        assert_eq!(header.nonce, None);
        assert_eq!(header.mac, some("m"));
    }

    #[test]
    fn test_parse_unknown_and_duplicate_keys() {
        let header = Header::parse("Hawk id=\"first\", extra=\"x\", id=\"second\", ext=\"\"");
        assert_eq!(header.id, some("first"));
        assert_eq!(header.ext, None);
    }

    #[test]
    fn test_parse_timestamp_hint() {
        let header = Header::parse(
            "Hawk ts=\"1353832234\", tsm=\"2mw1eh/qXzl0wJZ/E6XvBhRMEJN7L3j8AyMA8eItEb0=\", \
             error=\"Stale timestamp\"",
        );
        assert_eq!(header.timestamp().unwrap(), 1353832234);
        assert_eq!(header.tsm, some("2mw1eh/qXzl0wJZ/E6XvBhRMEJN7L3j8AyMA8eItEb0="));
        assert_eq!(header.error, some("Stale timestamp"));
    }

    #[test]
    fn test_timestamp_errors() {
        match Header::parse("Hawk id=\"a\"").timestamp() {
            Err(Error::Malformed(Malformed::MissingAttributes)) => (),
            other => panic!("unexpected {:?}", other),
        }
        match Header::parse("Hawk ts=\"soon\"").timestamp() {
            Err(Error::Malformed(Malformed::InvalidTimestamp)) => (),
            other => panic!("unexpected {:?}", other),
        }
    }

    fn mac() -> Mac {
        Mac::from(vec![1u8, 2, 3, 4])
    }

    #[test]
    fn test_request_value() {
        let attrs = Attributes::new(1353832234, "j4h3g2")
            .hash("AQIDBA==")
            .ext("ext-data")
            .app("my-app")
            .dlg("my-dlg");
        assert_eq!(
            Header::request_value("me", &attrs, &mac()).unwrap(),
            "Hawk id=\"me\", ts=\"1353832234\", nonce=\"j4h3g2\", hash=\"AQIDBA==\", \
             ext=\"ext-data\", mac=\"AQIDBA==\", app=\"my-app\", dlg=\"my-dlg\""
        );
    }

    #[test]
    fn test_request_value_minimal() {
        let attrs = Attributes::new(1, "n").dlg("ignored");
        assert_eq!(
            Header::request_value("me", &attrs, &mac()).unwrap(),
            "Hawk id=\"me\", ts=\"1\", nonce=\"n\", mac=\"AQIDBA==\""
        );
    }

    #[test]
    fn test_request_value_empty_app() {
        let attrs = Attributes {
            app: Some(String::new()),
            dlg: Some("my-dlg".to_string()),
            ..Attributes::new(1, "n")
        };
        assert_eq!(
            Header::request_value("me", &attrs, &mac()).unwrap(),
            "Hawk id=\"me\", ts=\"1\", nonce=\"n\", mac=\"AQIDBA==\""
        );
    }

    #[test]
    fn test_response_value() {
        let attrs = Attributes::new(1, "n").hash("aGFzaA==").ext("resp");
        assert_eq!(
            Header::response_value(&mac(), &attrs).unwrap(),
            "Hawk mac=\"AQIDBA==\", hash=\"aGFzaA==\", ext=\"resp\""
        );
        assert_eq!(
            Header::response_value(&mac(), &Attributes::new(1, "n")).unwrap(),
            "Hawk mac=\"AQIDBA==\""
        );
    }

    #[test]
    fn test_emitted_values_reparse() {
        let attrs = Attributes::new(1, "n").ext("ext-data").app("my-app");
        let value = Header::request_value("me", &attrs, &mac()).unwrap();
        let header = Header::parse(&value);
        assert_eq!(header.id, some("me"));
        assert_eq!(header.ext, some("ext-data"));
        assert_eq!(header.app, some("my-app"));
        assert_eq!(header.mac, some("AQIDBA=="));
    }

    #[test]
    fn test_invalid_values_refused() {
        let attrs = Attributes::new(1, "n").ext("say \"hi\"");
        match Header::request_value("me", &attrs, &mac()) {
            Err(Error::Malformed(Malformed::InvalidHeaderValue("ext"))) => (),
            other => panic!("unexpected {:?}", other),
        }
        match Header::request_value("m\\e", &Attributes::new(1, "n"), &mac()) {
            Err(Error::Malformed(Malformed::InvalidHeaderValue("id"))) => (),
            other => panic!("unexpected {:?}", other),
        }
        let attrs = Attributes::new(1, "n").ext("line\nbreak");
        assert!(Header::response_value(&mac(), &attrs).is_err());
    }
}
