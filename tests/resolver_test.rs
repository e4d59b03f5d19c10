//! Resolver Tests
//!
//! Covers the full lookup state machine through a mock `Transport`:
//! - success path with synthetic wire-format answers
//! - HTTP status / transport / decode / not-found error mapping
//! - GET and POST request shaping as seen by the transport

use dohnet::transport::Executing;
use dohnet::{
    DohMethod, DohRequest, DohResolver, DohResponse, ErrorCause, Transport, DNS_MESSAGE,
};

use bytes::Bytes;
use http::StatusCode;
use std::net::IpAddr;
use std::sync::{Arc, Mutex};

/// Transport double: records every request and replays a canned result.
struct MockTransport {
    response: Result<DohResponse, String>,
    seen: Mutex<Vec<DohRequest>>,
}

impl MockTransport {
    fn ok(status: StatusCode, body: Vec<u8>) -> Arc<Self> {
        Arc::new(Self {
            response: Ok(DohResponse {
                status,
                body: Bytes::from(body),
            }),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            response: Err(message.to_string()),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn last_request(&self) -> DohRequest {
        self.seen.lock().unwrap().last().cloned().unwrap()
    }
}

impl Transport for MockTransport {
    fn execute(&self, request: DohRequest) -> Executing {
        self.seen.lock().unwrap().push(request);
        let response = self.response.clone();
        Box::pin(async move { response.map_err(|message| message.into()) })
    }
}

fn resolver_with(transport: Arc<MockTransport>, method: &str) -> DohResolver {
    DohResolver::builder("https://dns.example/resolve")
        .method(method)
        .transport(transport)
        .build()
        .unwrap()
}

/// Minimal wire-format answer: echoes one question, then A records whose
/// owner points back at the question name.
fn answer_message(hostname: &str, addrs: &[[u8; 4]]) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(&0u16.to_be_bytes());
    buf.extend_from_slice(&0x8180u16.to_be_bytes());
    buf.extend_from_slice(&1u16.to_be_bytes());
    buf.extend_from_slice(&(addrs.len() as u16).to_be_bytes());
    buf.extend_from_slice(&0u16.to_be_bytes());
    buf.extend_from_slice(&0u16.to_be_bytes());

    for label in hostname.split('.') {
        buf.push(label.len() as u8);
        buf.extend_from_slice(label.as_bytes());
    }
    buf.push(0);
    buf.extend_from_slice(&1u16.to_be_bytes()); // TYPE A
    buf.extend_from_slice(&1u16.to_be_bytes()); // CLASS IN

    for rdata in addrs {
        buf.extend_from_slice(&0xC00Cu16.to_be_bytes());
        buf.extend_from_slice(&1u16.to_be_bytes());
        buf.extend_from_slice(&1u16.to_be_bytes());
        buf.extend_from_slice(&300u32.to_be_bytes());
        buf.extend_from_slice(&4u16.to_be_bytes());
        buf.extend_from_slice(rdata);
    }

    buf
}

#[tokio::test]
async fn test_lookup_success() {
    let body = answer_message("example.com", &[[93, 184, 216, 34], [93, 184, 216, 35]]);
    let transport = MockTransport::ok(StatusCode::OK, body);
    let resolver = resolver_with(transport, "GET");

    let addrs = resolver.lookup("example.com").await.unwrap();

    assert_eq!(
        addrs,
        vec![
            "93.184.216.34".parse::<IpAddr>().unwrap(),
            "93.184.216.35".parse::<IpAddr>().unwrap(),
        ]
    );
}

#[tokio::test]
async fn test_get_request_shape() {
    let body = answer_message("example.com", &[[1, 2, 3, 4]]);
    let transport = MockTransport::ok(StatusCode::OK, body);
    let resolver = resolver_with(transport.clone(), "GET");

    resolver.lookup("example.com").await.unwrap();

    let request = transport.last_request();
    assert_eq!(request.method, http::Method::GET);
    assert_eq!(request.accept, DNS_MESSAGE);
    assert!(request.body.is_none());

    let (key, value) = request.url.query_pairs().next().unwrap();
    assert_eq!(key, "dns");
    assert!(!value.is_empty());
    assert!(!value.contains('='));
    assert_eq!(request.url.path(), "/resolve");
}

#[tokio::test]
async fn test_post_request_shape() {
    let body = answer_message("example.com", &[[1, 2, 3, 4]]);
    let transport = MockTransport::ok(StatusCode::OK, body);
    let resolver = resolver_with(transport.clone(), "POST");

    resolver.lookup("example.com").await.unwrap();

    let request = transport.last_request();
    assert_eq!(request.method, http::Method::POST);
    assert_eq!(request.url.as_str(), "https://dns.example/resolve");
    assert_eq!(request.accept, DNS_MESSAGE);

    let (body, content_type) = request.body.expect("POST must carry the query");
    assert_eq!(content_type, DNS_MESSAGE);
    // DNS header + two questions (A and AAAA by default).
    assert!(body.len() > 12);
    assert_eq!(u16::from_be_bytes([body[4], body[5]]), 2); // QDCOUNT
}

#[tokio::test]
async fn test_http_error_status_maps_to_http_status_cause() {
    let transport = MockTransport::ok(StatusCode::INTERNAL_SERVER_ERROR, Vec::new());
    let resolver = resolver_with(transport, "GET");

    let err = resolver.lookup("example.com").await.unwrap_err();

    assert_eq!(err.hostname, "example.com");
    match err.cause {
        ErrorCause::HttpStatus { code, ref message } => {
            assert_eq!(code, 500);
            assert_eq!(message, "Internal Server Error");
        }
        ref other => panic!("expected HttpStatus cause, got {other:?}"),
    }
}

#[tokio::test]
async fn test_transport_failure_maps_to_transport_cause() {
    let transport = MockTransport::failing("connection refused");
    let resolver = resolver_with(transport, "GET");

    let err = resolver.lookup("example.com").await.unwrap_err();

    assert!(matches!(err.cause, ErrorCause::Transport(_)));
    assert!(!err.is_not_found());
}

#[tokio::test]
async fn test_empty_answer_is_not_found() {
    let body = answer_message("example.com", &[]);
    let transport = MockTransport::ok(StatusCode::OK, body);
    let resolver = resolver_with(transport, "GET");

    let err = resolver.lookup("example.com").await.unwrap_err();

    assert!(err.is_not_found());
    assert!(matches!(err.cause, ErrorCause::NotFound));
}

#[tokio::test]
async fn test_garbage_body_is_decode_failure_not_not_found() {
    let transport = MockTransport::ok(StatusCode::OK, vec![0xFF; 5]);
    let resolver = resolver_with(transport, "GET");

    let err = resolver.lookup("example.com").await.unwrap_err();

    assert!(matches!(err.cause, ErrorCause::Decode(_)));
    assert!(!err.is_not_found());
}

#[tokio::test]
async fn test_bad_hostname_fails_without_round_trip() {
    let transport = MockTransport::ok(StatusCode::OK, Vec::new());
    let resolver = resolver_with(transport.clone(), "GET");

    let err = resolver
        .lookup(&"a".repeat(64)) // 64-byte label exceeds the wire limit
        .await
        .unwrap_err();

    assert!(matches!(err.cause, ErrorCause::Encode(_)));
    assert!(transport.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_ipv4_only_query_when_ipv6_disabled() {
    let body = answer_message("example.com", &[[1, 2, 3, 4]]);
    let transport = MockTransport::ok(StatusCode::OK, body);
    let resolver = DohResolver::builder("https://dns.example/resolve")
        .method("POST")
        .include_ipv6(false)
        .transport(transport.clone())
        .build()
        .unwrap();

    resolver.lookup("example.com").await.unwrap();

    let (body, _) = transport.last_request().body.unwrap();
    assert_eq!(u16::from_be_bytes([body[4], body[5]]), 1); // QDCOUNT
}

#[test]
fn test_method_accessor_reflects_config() {
    let transport = MockTransport::ok(StatusCode::OK, Vec::new());
    let resolver = resolver_with(transport, "POST");
    assert_eq!(resolver.method(), DohMethod::Post);
}
