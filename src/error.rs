//! Error types for the proxy
//!
//! Provides unified per-connection error handling using thiserror.
//! None of these ever terminate the process; a failing connection is
//! simply closed.

use std::io;
use std::time::Duration;

use thiserror::Error;

// == Proxy Error Enum ==
/// Unified error type for a single proxied connection.
#[derive(Error, Debug)]
pub enum ProxyError {
    /// The peer closed before sending a request line
    #[error("Connection closed before a request was sent")]
    EmptyRequest,

    /// Request line or header line could not be parsed
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    /// Any method other than GET
    #[error("Unsupported method: {0}")]
    UnsupportedMethod(String),

    /// Request target is not an absolute `http://` URI
    #[error("Invalid URI: {0}")]
    InvalidUri(String),

    /// A request line or header block exceeded its size limit
    #[error("Request too large: {0}")]
    RequestTooLarge(String),

    /// Resolving or connecting to the origin failed
    #[error("Origin connect failed for {target}: {source}")]
    OriginConnect {
        target: String,
        #[source]
        source: io::Error,
    },

    /// Reading from or writing to the client failed
    #[error("Client I/O error: {0}")]
    ClientIo(#[source] io::Error),

    /// Reading from or writing to the origin failed
    #[error("Origin I/O error: {0}")]
    OriginIo(#[source] io::Error),

    /// An enabled timeout elapsed
    #[error("Timed out after {0:?} while {1}")]
    Timeout(Duration, &'static str),
}

impl ProxyError {
    /// Returns true for outcomes that are expected in normal traffic and
    /// only worth a debug log line.
    pub fn is_benign(&self) -> bool {
        matches!(
            self,
            ProxyError::EmptyRequest | ProxyError::UnsupportedMethod(_) | ProxyError::ClientIo(_)
        )
    }
}

// == Result Type Alias ==
/// Convenience Result type for the proxy.
pub type Result<T> = std::result::Result<T, ProxyError>;
