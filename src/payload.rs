use crate::b64;
use crate::crypto::{self, Hasher};
use crate::error::*;
use crate::DigestAlgorithm;

/// Reduce a `Content-Type` value to the form that is hashed: the media type only, without
/// parameters, trimmed and lower-cased.
pub fn sanitize_content_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// A utility for hashing payloads. Feed your entity body to this, then pass the `finish`
/// result to a request or response.
pub struct PayloadHasher {
    hasher: Box<dyn Hasher>,
}

impl PayloadHasher {
    /// Create a new PayloadHasher. The `content_type` may carry parameters (such as a
    /// charset); they are not part of the hash. The algorithm should be the one given in
    /// the credentials for the request.
    pub fn new(content_type: &str, algorithm: DigestAlgorithm) -> Result<Self> {
        let mut hasher = PayloadHasher {
            hasher: crypto::new_hasher(algorithm)?,
        };
        hasher.update(b"hawk.1.payload\n")?;
        hasher.update(sanitize_content_type(content_type).as_bytes())?;
        hasher.update(b"\n")?;
        Ok(hasher)
    }

    /// Hash a single value and return it, base64-encoded.
    pub fn hash<B>(content_type: &str, algorithm: DigestAlgorithm, payload: B) -> Result<String>
    where
        B: AsRef<[u8]>,
    {
        let mut hasher = PayloadHasher::new(content_type, algorithm)?;
        hasher.update(payload)?;
        hasher.finish()
    }

    /// Update the hash with new data.
    pub fn update<B>(&mut self, data: B) -> Result<()>
    where
        B: AsRef<[u8]>,
    {
        Ok(self.hasher.update(data.as_ref())?)
    }

    /// Finish hashing and return the result, base64-encoded.
    pub fn finish(mut self) -> Result<String> {
        self.hasher.update(b"\n")?;
        Ok(b64::encode(self.hasher.finish()?))
    }
}

#[cfg(all(test, any(feature = "use_ring", feature = "use_openssl")))]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn hash_consistency() {
        let mut hasher1 = PayloadHasher::new("text/plain", DigestAlgorithm::Sha256).unwrap();
        hasher1.update("pay").unwrap();
        hasher1.update("load").unwrap();
        let hash1 = hasher1.finish().unwrap();

        let mut hasher2 = PayloadHasher::new("text/plain", DigestAlgorithm::Sha256).unwrap();
        hasher2.update("payload").unwrap();
        let hash2 = hasher2.finish().unwrap();

        let hash3 = PayloadHasher::hash("text/plain", DigestAlgorithm::Sha256, "payload").unwrap();

        assert_eq!(hash2, hash1);
        assert_eq!(hash3, hash1);
    }

    #[test]
    fn known_vector() {
        let hash = PayloadHasher::hash(
            "text/plain",
            DigestAlgorithm::Sha256,
            "Thank you for flying Hawk",
        )
        .unwrap();
        assert_eq!(hash, "Yi9LfIIFRtBEPt74PVmbTF/xVAwPn7ub15ePICfgnuY=");
    }

    #[test]
    fn content_type_parameters_ignored() {
        let hash = PayloadHasher::hash(
            "Text/Plain; charset=utf-8",
            DigestAlgorithm::Sha256,
            "Thank you for flying Hawk",
        )
        .unwrap();
        assert_eq!(hash, "Yi9LfIIFRtBEPt74PVmbTF/xVAwPn7ub15ePICfgnuY=");
    }

    #[test]
    fn response_body_vector() {
        let hash = PayloadHasher::hash("text/plain", DigestAlgorithm::Sha256, "some reply").unwrap();
        assert_eq!(hash, "f9cDF/TDm7TkYRLnGwRMfeDzT6LixQVLvrIKhh0vgmM=");
    }

    #[test]
    fn sha512_length() {
        let hash = PayloadHasher::hash("text/plain", DigestAlgorithm::Sha512, "payload").unwrap();
        assert_eq!(base64::decode(&hash).unwrap().len(), 64);
    }

    #[test]
    fn sanitize() {
        assert_eq!(sanitize_content_type(" Application/JSON ;charset=x"), "application/json");
        assert_eq!(sanitize_content_type(""), "");
    }
}
