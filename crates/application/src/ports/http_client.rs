//! HTTP Client port

use std::future::Future;
use std::pin::Pin;

use apicheck_domain::{ErrorKind, PreparedRequest, RawResponse};
use thiserror::Error;

/// Transport-level errors reported by an [`HttpClient`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HttpClientError {
    /// URL could not be used.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Request exceeded its timeout.
    #[error("request timed out after {timeout_ms} ms")]
    Timeout {
        /// Configured timeout.
        timeout_ms: u64,
    },

    /// Host name could not be resolved.
    #[error("DNS resolution failed for {host}: {message}")]
    DnsError {
        /// Host that failed to resolve.
        host: String,
        /// Resolver message.
        message: String,
    },

    /// The server refused the connection.
    #[error("connection refused by {host}:{port}")]
    ConnectionRefused {
        /// Target host.
        host: String,
        /// Target port.
        port: u16,
    },

    /// Any other connection failure.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// TLS handshake or certificate failure.
    #[error("TLS error: {0}")]
    TlsError(String),

    /// Redirect limit exceeded.
    #[error("too many redirects (max {max})")]
    TooManyRedirects {
        /// Redirect limit.
        max: usize,
    },

    /// Unclassified error.
    #[error("{0}")]
    Other(String),
}

impl HttpClientError {
    /// Maps the transport error onto the verdict taxonomy.
    #[must_use]
    pub const fn to_error_kind(&self) -> ErrorKind {
        match self {
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::InvalidUrl(_) => ErrorKind::InvalidRequest,
            Self::DnsError { .. }
            | Self::ConnectionRefused { .. }
            | Self::ConnectionFailed(_)
            | Self::TlsError(_)
            | Self::TooManyRedirects { .. }
            | Self::Other(_) => ErrorKind::NetworkFailure,
        }
    }
}

/// Future returned by [`HttpClient::execute`].
pub type HttpFuture<'a> =
    Pin<Box<dyn Future<Output = Result<RawResponse, HttpClientError>> + Send + 'a>>;

/// Port for executing HTTP requests.
///
/// Implementations must be safe to share between concurrently running cases
/// and must not retry on their own.
pub trait HttpClient: Send + Sync {
    /// Sends the request and returns the raw response.
    ///
    /// The response's `elapsed` must cover the time from just before sending
    /// until the headers arrived.
    fn execute(&self, request: &PreparedRequest) -> HttpFuture<'_>;
}
