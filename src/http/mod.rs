//! HTTP Module
//!
//! The small slice of HTTP/1.x the proxy needs: request-head and URI
//! parsing plus the request header sent to the origin.

mod headers;
mod request;

pub use headers::{build_origin_request, Header, USER_AGENT};
pub use request::{RequestHead, RequestLine, Target, DEFAULT_HTTP_PORT, MAX_HEADERS};

/// Longest request or header line accepted from a client.
pub const MAX_LINE: usize = 8192;

/// Largest total header block accepted from a client.
pub const MAX_HEADER_BYTES: usize = 64 * 1024;
