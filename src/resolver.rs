//! The DoH resolver: orchestration of codec, request building and transport.
//!
//! One `lookup` call is one state machine pass: encode the query, build the
//! HTTP request, run it through the [`Transport`], gate on the HTTP status,
//! decode the answer, map an empty answer to "not found". Nothing is
//! retried; nothing is cached; no state outlives the call.

use crate::error::{ConfigError, ErrorCause, ResolveError};
use crate::request::{DohMethod, DohRequest, DNS_MESSAGE};
use crate::resolve::{Addrs, BootstrapDns, Name, Resolve, Resolving};
use crate::transport::{ReqwestTransport, Transport};
use crate::wire;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use url::Url;

/// Frozen per-resolver configuration. Built once, shared across lookups.
struct DohConfig {
    url: Url,
    method: DohMethod,
    content_type: String,
    include_ipv6: bool,
    transport: Arc<dyn Transport>,
}

/// A DNS-over-HTTPS resolver (RFC 8484).
///
/// Resolves hostnames by sending DNS wire-format queries to a DoH endpoint
/// over HTTPS. Cloning is cheap; all clones share the same frozen
/// configuration and transport.
///
/// # Example
///
/// ```rust,ignore
/// use dohnet::DohResolver;
///
/// let resolver = DohResolver::builder("https://dns.example/dns-query")
///     .build()?;
/// let addrs = resolver.lookup("example.com").await?;
/// ```
#[derive(Clone)]
pub struct DohResolver {
    config: Arc<DohConfig>,
}

impl DohResolver {
    /// Starts building a resolver for the given endpoint URL.
    pub fn builder(url: impl Into<String>) -> DohResolverBuilder {
        DohResolverBuilder::new(url)
    }

    /// The configured endpoint URL.
    pub fn url(&self) -> &Url {
        &self.config.url
    }

    /// Whether lookups also request AAAA records.
    pub fn include_ipv6(&self) -> bool {
        self.config.include_ipv6
    }

    /// The configured transport mode.
    pub fn method(&self) -> DohMethod {
        self.config.method
    }

    /// The configured DoH media type.
    pub fn content_type(&self) -> &str {
        &self.config.content_type
    }

    /// Resolves `hostname` to its addresses, in the order the server
    /// returned them.
    ///
    /// Exactly one HTTP round trip per call. Every failure — encoding,
    /// transport, HTTP status, decoding, or an empty answer — surfaces as a
    /// [`ResolveError`] wrapping the cause. An IP literal short-circuits
    /// without any network traffic.
    pub async fn lookup(&self, hostname: &str) -> Result<Vec<IpAddr>, ResolveError> {
        if let Ok(ip) = hostname.parse::<IpAddr>() {
            return Ok(vec![ip]);
        }

        let config = &self.config;

        let query = wire::encode_query(hostname, config.include_ipv6)
            .map_err(|e| ResolveError::new(hostname, ErrorCause::Encode(e)))?;

        let request = DohRequest::build(&query, &config.url, config.method, &config.content_type);
        tracing::debug!(
            hostname,
            url = %request.url,
            method = %request.method,
            "doh lookup"
        );

        let response = config.transport.execute(request).await.map_err(|e| {
            tracing::debug!(hostname, error = %e, "doh transport failed");
            ResolveError::new(hostname, ErrorCause::Transport(e))
        })?;

        if !response.status.is_success() {
            tracing::warn!(hostname, status = %response.status, "doh server returned error status");
            return Err(ResolveError::new(
                hostname,
                ErrorCause::HttpStatus {
                    code: response.status.as_u16(),
                    message: response
                        .status
                        .canonical_reason()
                        .unwrap_or("unknown")
                        .to_string(),
                },
            ));
        }

        let addrs = wire::decode_answers(hostname, &response.body).map_err(|e| {
            tracing::debug!(hostname, error = %e, "doh response did not decode");
            ResolveError::new(hostname, ErrorCause::Decode(e))
        })?;

        if addrs.is_empty() {
            return Err(ResolveError::new(hostname, ErrorCause::NotFound));
        }

        tracing::debug!(hostname, count = addrs.len(), "doh lookup complete");
        Ok(addrs)
    }
}

impl Resolve for DohResolver {
    fn resolve(&self, name: Name) -> Resolving {
        let resolver = self.clone();
        Box::pin(async move {
            let addrs = resolver.lookup(name.as_str()).await?;
            let addrs: Vec<SocketAddr> =
                addrs.into_iter().map(|ip| SocketAddr::new(ip, 0)).collect();
            Ok(Box::new(addrs.into_iter()) as Addrs)
        })
    }
}

impl std::fmt::Debug for DohResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DohResolver")
            .field("url", &self.config.url.as_str())
            .field("method", &self.config.method)
            .field("include_ipv6", &self.config.include_ipv6)
            .field("content_type", &self.config.content_type)
            .finish_non_exhaustive()
    }
}

/// Builder for [`DohResolver`].
///
/// Defaults: GET, `application/dns-message`, IPv6 included, a fresh
/// [`ReqwestTransport`]. The HTTP method is validated at [`build`]
/// (exactly `"GET"` or `"POST"`), so a bad method is a construction-time
/// failure, never a per-lookup one.
///
/// [`build`]: Self::build
pub struct DohResolverBuilder {
    url: String,
    method: String,
    content_type: String,
    include_ipv6: bool,
    bootstrap: Option<Arc<dyn Resolve>>,
    bootstrap_addrs: Option<Vec<IpAddr>>,
    client: Option<reqwest::Client>,
    transport: Option<Arc<dyn Transport>>,
}

impl DohResolverBuilder {
    fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: "GET".to_string(),
            content_type: DNS_MESSAGE.to_string(),
            include_ipv6: true,
            bootstrap: None,
            bootstrap_addrs: None,
            client: None,
            transport: None,
        }
    }

    /// HTTP method as a string; validated to exactly `"GET"` or `"POST"`
    /// when the resolver is built.
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    /// Media type sent as `Accept` (and `Content-Type` for POST).
    ///
    /// [`DNS_MESSAGE`] is the RFC 8484 standard; [`UDP_WIREFORMAT`] is the
    /// legacy value some servers require.
    ///
    /// [`UDP_WIREFORMAT`]: crate::request::UDP_WIREFORMAT
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Whether to also request AAAA records (default true).
    pub fn include_ipv6(mut self, include: bool) -> Self {
        self.include_ipv6 = include;
        self
    }

    /// Resolver used only to resolve the DoH endpoint's own hostname.
    ///
    /// Applies to the internally-built HTTP client; if a custom client or
    /// transport is supplied, wire the bootstrap into it yourself.
    pub fn bootstrap(mut self, bootstrap: Arc<dyn Resolve>) -> Self {
        self.bootstrap = Some(bootstrap);
        self
    }

    /// Known addresses for the DoH endpoint host, as a bootstrap shortcut.
    pub fn bootstrap_addrs(mut self, addrs: Vec<IpAddr>) -> Self {
        self.bootstrap_addrs = Some(addrs);
        self
    }

    /// Use an existing `reqwest::Client` for HTTP execution.
    pub fn client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Use a custom transport. Takes precedence over `client` and
    /// `bootstrap`.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Validates the configuration and builds the resolver.
    pub fn build(self) -> Result<DohResolver, ConfigError> {
        let url = Url::parse(&self.url).map_err(ConfigError::InvalidUrl)?;
        let method: DohMethod = self.method.parse()?;

        let bootstrap = match (self.bootstrap, self.bootstrap_addrs) {
            (Some(resolver), _) => Some(resolver),
            (None, Some(addrs)) => {
                let host = url.host_str().ok_or(ConfigError::MissingHost)?;
                Some(Arc::new(BootstrapDns::new(host, addrs)) as Arc<dyn Resolve>)
            }
            (None, None) => None,
        };

        let transport: Arc<dyn Transport> = match (self.transport, self.client, bootstrap) {
            (Some(transport), _, _) => transport,
            (None, Some(client), _) => Arc::new(ReqwestTransport::new(client)),
            (None, None, Some(bootstrap)) => Arc::new(
                ReqwestTransport::with_bootstrap(bootstrap).map_err(ConfigError::Client)?,
            ),
            (None, None, None) => Arc::new(ReqwestTransport::default()),
        };

        Ok(DohResolver {
            config: Arc::new(DohConfig {
                url,
                method,
                content_type: self.content_type,
                include_ipv6: self.include_ipv6,
                transport,
            }),
        })
    }
}
