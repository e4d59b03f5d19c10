//! HTTP request construction for the two DoH transport modes.
//!
//! A [`DohRequest`] is a pure value describing what to send; it carries no
//! network state. The GET/POST branch is decided once at resolver
//! construction, not per call.

use crate::error::ConfigError;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use bytes::Bytes;
use http::Method;
use std::str::FromStr;
use url::Url;

/// RFC 8484 media type for DNS wire-format messages.
pub const DNS_MESSAGE: &str = "application/dns-message";
/// Legacy media type from the draft era; some servers still require it.
pub const UDP_WIREFORMAT: &str = "application/dns-udpwireformat";

/// Transport mode, fixed at construction.
///
/// Modeled as one enum rather than two resolver types; the request builder
/// branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DohMethod {
    /// `GET <url>?dns=<base64url(query)>` — cacheable by HTTP intermediaries.
    Get,
    /// `POST <url>` with the raw query bytes as the body.
    Post,
}

impl FromStr for DohMethod {
    type Err = ConfigError;

    /// Exactly `"GET"` or `"POST"`; anything else is a construction-time
    /// failure.
    fn from_str(method: &str) -> Result<Self, Self::Err> {
        match method {
            "GET" => Ok(DohMethod::Get),
            "POST" => Ok(DohMethod::Post),
            other => Err(ConfigError::UnsupportedMethod(other.to_string())),
        }
    }
}

/// A fully-formed description of one DoH HTTP exchange.
#[derive(Debug, Clone)]
pub struct DohRequest {
    pub method: Method,
    pub url: Url,
    /// Value for the `Accept` header.
    pub accept: String,
    /// Raw query bytes plus their media type; present only for POST.
    pub body: Option<(Bytes, String)>,
}

impl DohRequest {
    /// Builds the request for an encoded query.
    ///
    /// GET appends the query as a padding-free base64url `dns` parameter;
    /// POST sends the raw bytes with the configured content type. Both set
    /// `Accept` to the configured content type.
    pub fn build(query: &[u8], url: &Url, method: DohMethod, content_type: &str) -> Self {
        match method {
            DohMethod::Get => {
                let encoded = URL_SAFE_NO_PAD.encode(query);
                let mut url = url.clone();
                url.query_pairs_mut().append_pair("dns", &encoded);
                Self {
                    method: Method::GET,
                    url,
                    accept: content_type.to_string(),
                    body: None,
                }
            }
            DohMethod::Post => Self {
                method: Method::POST,
                url: url.clone(),
                accept: content_type.to_string(),
                body: Some((Bytes::copy_from_slice(query), content_type.to_string())),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://dns.example/resolve").unwrap()
    }

    #[test]
    fn test_method_parsing_is_exact() {
        assert_eq!("GET".parse::<DohMethod>().unwrap(), DohMethod::Get);
        assert_eq!("POST".parse::<DohMethod>().unwrap(), DohMethod::Post);

        for bad in ["get", "Post", "PUT", "HEAD", ""] {
            assert!(matches!(
                bad.parse::<DohMethod>(),
                Err(ConfigError::UnsupportedMethod(_))
            ));
        }
    }

    #[test]
    fn test_get_request_encodes_base64url_without_padding() {
        // Example DNS header + start of a question.
        let query = [0x00u8, 0x00, 0x01, 0x00, 0x00, 0x01, 0x00, 0x00];
        let request = DohRequest::build(&query, &base_url(), DohMethod::Get, DNS_MESSAGE);

        assert_eq!(request.method, Method::GET);
        assert!(request.body.is_none());
        assert_eq!(request.accept, DNS_MESSAGE);

        let url = request.url.as_str();
        assert!(url.starts_with("https://dns.example/resolve?dns="));

        let (_, value) = request.url.query_pairs().next().unwrap();
        assert!(!value.contains('='), "padding must be stripped: {url}");
    }

    #[test]
    fn test_get_parameter_round_trips() {
        let query = [0x12u8, 0x34, 0xFF, 0xFE, 0x00];
        let request = DohRequest::build(&query, &base_url(), DohMethod::Get, DNS_MESSAGE);

        let (key, value) = request.url.query_pairs().next().unwrap();
        assert_eq!(key, "dns");
        assert_eq!(URL_SAFE_NO_PAD.decode(value.as_bytes()).unwrap(), query);
    }

    #[test]
    fn test_post_request_carries_raw_body() {
        let query = [0xABu8, 0xCD, 0x00, 0x01];
        let request = DohRequest::build(&query, &base_url(), DohMethod::Post, UDP_WIREFORMAT);

        assert_eq!(request.method, Method::POST);
        assert_eq!(request.url, base_url());
        assert_eq!(request.accept, UDP_WIREFORMAT);

        let (body, content_type) = request.body.unwrap();
        assert_eq!(body.as_ref(), query);
        assert_eq!(content_type, UDP_WIREFORMAT);
    }
}
