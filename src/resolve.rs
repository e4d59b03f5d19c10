//! Core resolution types and traits.
//!
//! This module defines the `Resolve` trait and supporting types that let the
//! DoH resolver plug into any client accepting a pluggable resolver, and
//! that supply the bootstrap path for resolving the DoH endpoint itself.

use crate::error::{ErrorCause, ResolveError};
use std::{collections::HashMap, fmt, future::Future, net::IpAddr, net::SocketAddr, pin::Pin, sync::Arc};

/// A domain name to resolve into IP addresses.
///
/// A lightweight wrapper around a hostname string that provides a type-safe
/// way to pass domain names to resolvers.
#[derive(Clone, Hash, Eq, PartialEq)]
pub struct Name {
    host: Box<str>,
}

impl Name {
    /// Creates a new [`Name`] from any string-like type.
    #[inline]
    pub fn new(host: impl Into<Box<str>>) -> Self {
        Self { host: host.into() }
    }

    /// View the hostname as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.host
    }
}

impl From<&str> for Name {
    fn from(value: &str) -> Self {
        Name::new(value)
    }
}

impl From<String> for Name {
    fn from(value: String) -> Self {
        Name::new(value)
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.host, f)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.host, f)
    }
}

/// Alias for an `Iterator` trait object over `SocketAddr`.
///
/// Addresses carry port 0; callers set the appropriate port for the target
/// service.
pub type Addrs = Box<dyn Iterator<Item = SocketAddr> + Send>;

/// Alias for the `Future` type returned by a resolver.
pub type Resolving = Pin<Box<dyn Future<Output = Result<Addrs, ResolveError>> + Send>>;

/// Trait for hostname resolution.
///
/// Implementations must be thread-safe: resolution borrows `&self` so
/// concurrent lookups need no locking on the caller's side, and the returned
/// future is boxed for trait-object compatibility.
pub trait Resolve: Send + Sync {
    /// Resolves a domain name to IP addresses.
    fn resolve(&self, name: Name) -> Resolving;
}

/// Blanket implementation for Arc-wrapped resolvers.
impl<R: Resolve + ?Sized> Resolve for Arc<R> {
    fn resolve(&self, name: Name) -> Resolving {
        (**self).resolve(name)
    }
}

/// Fixed hostname-to-address resolver used to bootstrap the DoH endpoint.
///
/// Before the first DoH query can be sent, the DoH server's own hostname has
/// to resolve without DoH. `BootstrapDns` answers from a fixed map and fails
/// for every other name, so it can never be misused as a general resolver.
pub struct BootstrapDns {
    entries: HashMap<String, Vec<IpAddr>>,
}

impl BootstrapDns {
    /// Creates a bootstrap resolver for a single host.
    pub fn new(host: impl Into<String>, addrs: Vec<IpAddr>) -> Self {
        let mut entries = HashMap::new();
        entries.insert(host.into(), addrs);
        Self { entries }
    }

    /// Creates a bootstrap resolver from a map of hosts.
    pub fn from_map(entries: HashMap<String, Vec<IpAddr>>) -> Self {
        Self { entries }
    }

    /// Returns the number of configured hosts.
    pub fn host_count(&self) -> usize {
        self.entries.len()
    }
}

impl Resolve for BootstrapDns {
    fn resolve(&self, name: Name) -> Resolving {
        let result = match self.entries.get(name.as_str()) {
            Some(addrs) => {
                let addrs: Vec<SocketAddr> =
                    addrs.iter().map(|ip| SocketAddr::new(*ip, 0)).collect();
                Ok(Box::new(addrs.into_iter()) as Addrs)
            }
            None => Err(ResolveError::new(name.as_str(), ErrorCause::NotFound)),
        };
        Box::pin(std::future::ready(result))
    }
}

impl fmt::Debug for BootstrapDns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BootstrapDns")
            .field("host_count", &self.entries.len())
            .finish_non_exhaustive()
    }
}
