use crate::attributes::Attributes;
use crate::b64;
use crate::credentials::Key;
use crate::crypto;
use crate::error::*;
use crate::normalize::{normalize, MacType};
use std::fmt;

/// A Hawk MAC, as carried (base64-encoded) in the `mac` attribute of a header or in a bewit.
///
/// Comparing two `Mac`s, or a `Mac` against an encoded value with [`Mac::matches`], always
/// runs in constant time.
#[derive(Clone)]
pub struct Mac(Vec<u8>);

impl Mac {
    /// Compute the MAC of the canonical string for the given request and attributes.
    pub fn new(
        mac_type: MacType,
        key: &Key,
        method: &str,
        uri: &str,
        host_port: Option<&str>,
        attrs: &Attributes,
    ) -> Result<Mac> {
        let normalized = normalize(mac_type, method, uri, host_port, attrs)?;
        Ok(Mac(key.sign(&normalized)?))
    }

    /// Compute the MAC of a bare timestamp, as sent in the `tsm` attribute of a
    /// time-synchronization hint.
    pub fn for_timestamp(key: &Key, ts: i64) -> Result<Mac> {
        let normalized = format!("hawk.1.ts\n{}\n", ts);
        Ok(Mac(key.sign(normalized.as_bytes())?))
    }

    /// Check this MAC against a base64-encoded value from the wire.
    pub fn matches(&self, encoded: &str) -> bool {
        crypto::constant_time_compare(self.to_string().as_bytes(), encoded.as_bytes())
    }
}

impl AsRef<[u8]> for Mac {
    fn as_ref(&self) -> &[u8] {
        &self.0[..]
    }
}

impl From<Vec<u8>> for Mac {
    fn from(original: Vec<u8>) -> Self {
        Mac(original)
    }
}

impl fmt::Display for Mac {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&b64::encode(&self.0))
    }
}

impl fmt::Debug for Mac {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Mac({})", self)
    }
}

impl PartialEq for Mac {
    fn eq(&self, other: &Mac) -> bool {
        crypto::constant_time_compare(&self.0, &other.0)
    }
}

#[cfg(all(test, any(feature = "use_ring", feature = "use_openssl")))]
mod test {
    use super::*;
    use crate::DigestAlgorithm;
    use pretty_assertions::assert_eq;

    const URI: &str = "http://example.com:8000/resource/1?b=1&a=2";

    fn key(algorithm: DigestAlgorithm) -> Key {
        Key::new("werxhqb98rpaxn39848xrunpaw3489ruxnpa98w4rxn", algorithm).unwrap()
    }

    fn attrs() -> Attributes {
        Attributes::new(1353832234, "j4h3g2").ext("some-app-ext-data")
    }

    fn header_mac(method: &str, uri: &str, attrs: &Attributes) -> String {
        Mac::new(
            MacType::Header,
            &key(DigestAlgorithm::Sha256),
            method,
            uri,
            None,
            attrs,
        )
        .unwrap()
        .to_string()
    }

    #[test]
    fn test_known_vector() {
        assert_eq!(
            header_mac("GET", URI, &attrs()),
            "6R4rV5iE+NPoym+WwjeHzjAGXUtLNIxmo1vpMofpLAE="
        );
    }

    #[test]
    fn test_known_vector_app_dlg() {
        let attrs = attrs().app("my-app").dlg("my-dlg");
        assert_eq!(
            header_mac("GET", URI, &attrs),
            "imCuweCaxAT1gR3oF3pLPtcNpNgNByz8tbMtaysk5iY="
        );
    }

    #[test]
    fn test_known_vector_sha512() {
        let mac = Mac::new(
            MacType::Header,
            &key(DigestAlgorithm::Sha512),
            "GET",
            URI,
            None,
            &attrs(),
        )
        .unwrap();
        assert_eq!(
            mac.to_string(),
            "EcTUjNOUn8AC7Lz+SkQy2mBv2tbeA+mgMjpYC1M3X3DEBwYcmEIvwnPHdVd1dBhSO+Y63tb+kImNnt2ZV8PXfg=="
        );
    }

    #[test]
    fn test_response_vector() {
        let attrs = Attributes::new(1453070933, "3hOHpR")
            .hash("f9cDF/TDm7TkYRLnGwRMfeDzT6LixQVLvrIKhh0vgmM=")
            .ext("response-specific");
        let mac = Mac::new(
            MacType::Response,
            &key(DigestAlgorithm::Sha256),
            "POST",
            "http://example.com:8080/resource/4?filter=a",
            None,
            &attrs,
        )
        .unwrap();
        assert_eq!(mac.to_string(), "odsVGUq0rCoITaiNagW22REIpqkwP9zt5FyqqOW9Zj8=");
    }

    #[test]
    fn test_timestamp_vector() {
        let mac = Mac::for_timestamp(&key(DigestAlgorithm::Sha256), 1353832234).unwrap();
        assert_eq!(mac.to_string(), "2mw1eh/qXzl0wJZ/E6XvBhRMEJN7L3j8AyMA8eItEb0=");
    }

    #[test]
    fn test_every_field_changes_mac() {
        let base = attrs().hash("AQIDBA==").app("my-app").dlg("my-dlg");
        let reference = header_mac("GET", URI, &base);

        let variants = vec![
            header_mac("GET", URI, &Attributes { ts: 1353832235, ..base.clone() }),
            header_mac("GET", URI, &Attributes { nonce: "j4h3g3".to_string(), ..base.clone() }),
            header_mac("POST", URI, &base),
            header_mac("GET", "http://example.com:8000/resource/2?b=1&a=2", &base),
            header_mac("GET", "http://example.com:8000/resource/1?b=1&a=3", &base),
            header_mac("GET", "http://example.net:8000/resource/1?b=1&a=2", &base),
            header_mac("GET", "http://example.com:8001/resource/1?b=1&a=2", &base),
            header_mac("GET", URI, &base.clone().hash("AQIDBQ==")),
            header_mac("GET", URI, &base.clone().ext("other")),
            header_mac("GET", URI, &base.clone().app("other-app")),
            header_mac("GET", URI, &base.clone().dlg("other-dlg")),
        ];
        for (i, variant) in variants.iter().enumerate() {
            assert_ne!(variant, &reference, "variant {} did not change the MAC", i);
        }
    }

    #[test]
    fn test_mac_type_changes_mac() {
        let key = key(DigestAlgorithm::Sha256);
        let header = Mac::new(MacType::Header, &key, "GET", URI, None, &attrs()).unwrap();
        let response = Mac::new(MacType::Response, &key, "GET", URI, None, &attrs()).unwrap();
        assert!(header != response);
        assert!(header == header.clone());
    }

    #[test]
    fn test_matches() {
        let mac = Mac::for_timestamp(&key(DigestAlgorithm::Sha256), 1353832234).unwrap();
        assert!(mac.matches("2mw1eh/qXzl0wJZ/E6XvBhRMEJN7L3j8AyMA8eItEb0="));
        assert!(!mac.matches("2mw1eh/qXzl0wJZ/E6XvBhRMEJN7L3j8AyMA8eItEb0"));
        assert!(!mac.matches(""));
    }
}
