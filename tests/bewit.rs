use hawk_auth::{
    Bewit, BewitIssuer, Credentials, DigestAlgorithm, Error, FixedClock, HostOverride,
    ProtocolViolation, Server, ServerRequest, Stale, StaticCredentialStore,
};
use pretty_assertions::assert_eq;
use std::str::FromStr;
use std::time::Duration;

const NOW: i64 = 1365711458;
const TTL: Duration = Duration::from_secs(3600);

fn credentials() -> Credentials {
    Credentials::new("123456", "2983d45yun89q", DigestAlgorithm::Sha256)
}

fn server(now: i64) -> Server {
    Server::new(StaticCredentialStore::new(vec![credentials()])).clock(FixedClock(now))
}

fn issue(url: &str) -> String {
    let credentials = credentials();
    BewitIssuer::new(&credentials, TTL)
        .ext("some-app-data")
        .issue(url, &FixedClock(NOW))
        .unwrap()
}

fn with_bewit(path_and_query: &str, bewit: &str) -> String {
    let separator = if path_and_query.contains('?') { '&' } else { '?' };
    format!("{}{}bewit={}", path_and_query, separator, bewit)
}

#[test]
fn issued_bewit_authenticates_until_expiry() {
    let bewit = issue("https://example.com/resource/4?a=1&b=2");
    let uri = with_bewit("https://example.com/resource/4?a=1&b=2", &bewit);
    let req = ServerRequest::new("GET", &uri);

    for now in &[NOW, NOW + 3599] {
        let found = server(*now).authenticate_bewit(&req).unwrap();
        assert_eq!(found.id, "123456");
    }
    for now in &[NOW + 3600, NOW + 7200] {
        match server(*now).authenticate_bewit(&req) {
            Err(Error::Stale(Stale::Expired)) => (),
            other => panic!("unexpected {:?}", other),
        }
    }
}

#[test]
fn bewit_without_query() {
    let bewit = issue("http://example.com/file.txt");
    let uri = with_bewit("/file.txt", &bewit);
    let req = ServerRequest::new("HEAD", &uri).host("example.com");
    assert!(server(NOW).authenticate_bewit(&req).is_ok());
}

#[test]
fn tampered_bewit_rejected() {
    let bewit = issue("http://example.com/resource/4?a=1&b=2");
    let raw = base64::decode_config(&bewit, base64::URL_SAFE_NO_PAD).unwrap();

    for i in 0..raw.len() {
        let mut tampered = raw.clone();
        tampered[i] ^= 1;
        let tampered = base64::encode_config(&tampered, base64::URL_SAFE_NO_PAD);
        let uri = with_bewit("http://example.com/resource/4?a=1&b=2", &tampered);
        let req = ServerRequest::new("GET", &uri);
        assert!(
            server(NOW).authenticate_bewit(&req).is_err(),
            "byte {} was tampered without detection",
            i
        );
    }
}

#[test]
fn bewit_and_authorization_header() {
    let bewit = issue("http://example.com/resource/4?a=1&b=2");
    let uri = with_bewit("http://example.com/resource/4?a=1&b=2", &bewit);
    let req = ServerRequest::new("GET", &uri).authorization("Hawk id=\"x\"");
    match server(NOW).authenticate_bewit(&req) {
        Err(Error::ProtocolViolation(ProtocolViolation::MultipleAuthentications)) => (),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn bewit_behind_proxy() {
    let bewit = issue("https://public.example.com/resource/4?a=1&b=2");
    let uri = with_bewit("/resource/4?a=1&b=2", &bewit);

    let server = server(NOW).host_override(HostOverride::new().host_port("public.example.com:443"));
    let req = ServerRequest::new("GET", &uri).host("backend:8080");
    assert!(server.authenticate_bewit(&req).is_ok());
}

#[test]
fn bewit_round_trips_through_parsing() {
    let bewit = issue("http://example.com/resource/4?a=1&b=2");
    let parsed = Bewit::from_str(&bewit).unwrap();
    assert_eq!(parsed.id(), "123456");
    assert_eq!(parsed.exp(), NOW + 3600);
    assert_eq!(parsed.ext(), Some("some-app-data"));
    assert_eq!(parsed.to_str(), bewit);
}
