//! Error types for DoH resolution.
//!
//! Every failure a lookup can hit — a hostname that will not encode, a dead
//! connection, a non-2xx status, a mangled response, an empty answer — is
//! folded into a single outward-facing [`ResolveError`] so callers depend on
//! one error type. The underlying failure stays reachable through
//! [`ResolveError::cause`] and the standard `Error::source()` chain.

use thiserror::Error;

/// Boxed error type used at the transport seam.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A hostname that cannot be encoded as a DNS question.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("hostname is empty")]
    EmptyHostname,
    #[error("hostname contains an empty label")]
    EmptyLabel,
    #[error("label '{0}' exceeds 63 bytes")]
    LabelTooLong(String),
    #[error("encoded name exceeds 255 bytes")]
    NameTooLong,
    #[error("label '{0}' contains characters invalid in a DNS name")]
    InvalidLabel(String),
}

/// A DNS response message that cannot be parsed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("message shorter than the 12-byte DNS header")]
    ShortHeader,
    #[error("message truncated at offset {0}")]
    Truncated(usize),
    #[error("unsupported label type at offset {0}")]
    BadLabel(usize),
    #[error("compression pointer target {target} is out of range")]
    BadPointer { target: usize },
    #[error("compression pointer chain exceeded {0} hops")]
    PointerLoop(usize),
    #[error("record type {rtype} declares RDLENGTH {declared}, expected {expected}")]
    BadRdLength {
        rtype: u16,
        declared: u16,
        expected: u16,
    },
}

/// The underlying reason a lookup failed.
///
/// Wrapped in [`ResolveError`]; callers that only care whether resolution
/// worked never need to match on this.
#[derive(Debug, Error)]
pub enum ErrorCause {
    /// The hostname could not be encoded into a DNS question.
    #[error("failed to encode query")]
    Encode(#[source] EncodeError),
    /// The HTTP round trip itself failed (connect, TLS, timeout, cancel).
    #[error("transport failure")]
    Transport(#[source] BoxError),
    /// The DoH server answered with a non-2xx status. The body is not read.
    #[error("HTTP status {code}: {message}")]
    HttpStatus { code: u16, message: String },
    /// The response body is not a well-formed DNS message.
    #[error("failed to decode response")]
    Decode(#[source] DecodeError),
    /// A well-formed response carried no address records. This is the
    /// negative answer, distinct from every protocol failure above.
    #[error("no address records in answer")]
    NotFound,
}

/// Failure to resolve a hostname over DoH.
///
/// The single error type produced by [`DohResolver::lookup`]. The original
/// failure is carried in [`cause`](Self::cause).
///
/// [`DohResolver::lookup`]: crate::DohResolver::lookup
#[derive(Debug, Error)]
#[error("failed to resolve '{hostname}'")]
pub struct ResolveError {
    /// The hostname the lookup was for.
    pub hostname: String,
    /// What actually went wrong.
    #[source]
    pub cause: ErrorCause,
}

impl ResolveError {
    pub(crate) fn new(hostname: impl Into<String>, cause: ErrorCause) -> Self {
        Self {
            hostname: hostname.into(),
            cause,
        }
    }

    /// True if this failure is the negative answer ("no such host") rather
    /// than a transport or protocol breakage.
    pub fn is_not_found(&self) -> bool {
        matches!(self.cause, ErrorCause::NotFound)
    }
}

/// Invalid resolver configuration, reported at construction time.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unsupported HTTP method '{0}', only GET and POST are supported")]
    UnsupportedMethod(String),
    #[error("invalid DoH endpoint URL")]
    InvalidUrl(#[source] url::ParseError),
    #[error("DoH endpoint URL has no host")]
    MissingHost,
    #[error("failed to build HTTP client")]
    Client(#[source] BoxError),
}
