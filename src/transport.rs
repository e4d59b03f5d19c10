//! The HTTP execution seam.
//!
//! The resolver never talks to the network directly; it hands a
//! [`DohRequest`] to a [`Transport`] and gets back a status code and body
//! bytes. Connection pooling, TLS, timeouts, cancellation and HTTP caching
//! all live behind this trait, in whatever client implements it.
//!
//! [`ReqwestTransport`] is the default implementation. Tests substitute
//! their own `Transport` to exercise the resolver without a network.

use crate::error::BoxError;
use crate::request::DohRequest;
use crate::resolve::{Name, Resolve};
use bytes::Bytes;
use http::StatusCode;
use std::{future::Future, pin::Pin, sync::Arc};

/// Status and body of one completed DoH exchange.
#[derive(Debug, Clone)]
pub struct DohResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

/// Alias for the `Future` type returned by a transport.
pub type Executing = Pin<Box<dyn Future<Output = Result<DohResponse, BoxError>> + Send>>;

/// Executes one HTTP exchange for the resolver.
///
/// Implementations must be thread-safe. Any error returned here is surfaced
/// to the caller as a transport-level resolution failure; the transport must
/// not retry on its own.
pub trait Transport: Send + Sync {
    fn execute(&self, request: DohRequest) -> Executing;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn execute(&self, request: DohRequest) -> Executing {
        (**self).execute(request)
    }
}

/// Default transport backed by a [`reqwest::Client`].
///
/// The client's own connection pool, TLS configuration, HTTP cache and
/// per-request timeout apply unchanged; this wrapper only shapes the
/// request and collects the body.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Wraps an existing client.
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Builds a fresh client whose DNS goes through `bootstrap`.
    ///
    /// This is how the DoH endpoint's own hostname gets resolved before any
    /// DoH traffic is possible.
    pub fn with_bootstrap(bootstrap: Arc<dyn Resolve>) -> Result<Self, BoxError> {
        let client = reqwest::Client::builder()
            .dns_resolver(Arc::new(BootstrapAdapter(bootstrap)))
            .build()?;
        Ok(Self { client })
    }

    /// Maps a [`DohRequest`] onto the client: `Accept` always, plus
    /// `Content-Type` and body for POST.
    fn prepare(&self, request: DohRequest) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .request(request.method, request.url)
            .header(http::header::ACCEPT, request.accept);

        if let Some((body, content_type)) = request.body {
            builder = builder
                .header(http::header::CONTENT_TYPE, content_type)
                .body(body);
        }

        builder
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}

impl Transport for ReqwestTransport {
    fn execute(&self, request: DohRequest) -> Executing {
        let builder = self.prepare(request);
        Box::pin(async move {
            let response = builder.send().await?;
            let status = response.status();

            // A non-2xx answer is terminal; drop the response without
            // reading the body.
            if !status.is_success() {
                return Ok(DohResponse {
                    status,
                    body: Bytes::new(),
                });
            }

            let body = response.bytes().await?;
            Ok(DohResponse { status, body })
        })
    }
}

/// Bridges the crate's `Resolve` trait into reqwest's resolver seam.
struct BootstrapAdapter(Arc<dyn Resolve>);

impl reqwest::dns::Resolve for BootstrapAdapter {
    fn resolve(&self, name: reqwest::dns::Name) -> reqwest::dns::Resolving {
        let inner = self.0.clone();
        let host = name.as_str().to_string();
        Box::pin(async move {
            let addrs: reqwest::dns::Addrs = inner.resolve(Name::new(host)).await?;
            Ok(addrs)
        })
    }
}
