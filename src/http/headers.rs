//! Forwarded Request Headers
//!
//! Builds the HTTP/1.0 request sent to the origin from the parsed target and
//! whatever headers the client sent.

use crate::http::Target;

/// User-Agent sent to every origin regardless of the client's own.
pub const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:10.0.3) Gecko/20120305 Firefox/10.0.3";

/// Headers the proxy always writes itself.
const REPLACED_HEADERS: [&str; 4] = ["host", "user-agent", "connection", "proxy-connection"];

/// One `Name: value` header line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// Renders the full request header block for the origin.
///
/// The client's `Host` wins over the URI's; `User-Agent`, `Connection` and
/// `Proxy-Connection` are always replaced. Everything else passes through in
/// order.
pub fn build_origin_request(target: &Target, client_headers: &[Header]) -> String {
    let host = client_headers
        .iter()
        .find(|h| h.is("host"))
        .map(|h| h.value.clone())
        .unwrap_or_else(|| target.host_header());

    let mut request = format!("GET {} HTTP/1.0\r\n", target.path);
    request.push_str(&format!("Host: {}\r\n", host));
    request.push_str(&format!("User-Agent: {}\r\n", USER_AGENT));
    request.push_str("Connection: close\r\n");
    request.push_str("Proxy-Connection: close\r\n");

    for header in client_headers
        .iter()
        .filter(|h| !REPLACED_HEADERS.iter().any(|name| h.is(name)))
    {
        request.push_str(&format!("{}: {}\r\n", header.name, header.value));
    }

    request.push_str("\r\n");
    request
}
