//! # dohnet
//!
//! A DNS-over-HTTPS (RFC 8484) resolver library for Rust.
//!
//! `dohnet` tunnels standard DNS queries over HTTPS, giving any application
//! a pluggable hostname resolver whose traffic looks like — and is cached
//! like — ordinary HTTPS.
//!
//! ## Features
//!
//! - **RFC 1035 wire codec**: query encoding and answer decoding with
//!   bounded, hostile-input-safe compression-pointer traversal
//! - **Both DoH transports**: GET with base64url `dns` parameter, or POST
//!   with the raw wire-format body
//! - **One failure type**: every transport, protocol, and codec failure
//!   surfaces as a single [`ResolveError`] wrapping its cause
//! - **Pluggable seams**: swap the HTTP [`Transport`], supply a bootstrap
//!   resolver for the DoH endpoint itself, or plug the resolver into any
//!   client accepting [`Resolve`]
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dohnet::DohResolver;
//!
//! #[tokio::main]
//! async fn main() {
//!     let resolver = DohResolver::builder("https://dns.example/dns-query")
//!         .build()
//!         .unwrap();
//!     let addrs = resolver.lookup("example.com").await.unwrap();
//!     println!("Resolved: {addrs:?}");
//! }
//! ```
//!
//! ## Modules
//!
//! - [`wire`] - RFC 1035 query/answer codec
//! - [`request`] - HTTP request construction for the two transport modes
//! - [`transport`] - the HTTP execution seam and the reqwest default
//! - [`resolve`] - the pluggable-resolver trait and bootstrap resolver
//! - [`resolver`] - the DoH resolver and its builder
//! - [`error`] - the failure taxonomy
//!
//! ## Scope
//!
//! One lookup is one HTTP round trip: no retries, no fallback endpoints, no
//! response caching beyond what the HTTP client provides, and no record
//! types beyond A/AAAA.

pub mod error;
pub mod request;
pub mod resolve;
pub mod resolver;
pub mod transport;
pub mod wire;

pub use error::{ConfigError, DecodeError, EncodeError, ErrorCause, ResolveError};
pub use request::{DohMethod, DohRequest, DNS_MESSAGE, UDP_WIREFORMAT};
pub use resolve::{Addrs, BootstrapDns, Name, Resolve, Resolving};
pub use resolver::{DohResolver, DohResolverBuilder};
pub use transport::{DohResponse, ReqwestTransport, Transport};
