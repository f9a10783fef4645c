//! Request Head Parsing
//!
//! Parses the client's request head with `httparse` and breaks an absolute
//! `http://` URI into the pieces needed to reach the origin.

use httparse::Status;

use crate::error::{ProxyError, Result};
use crate::http::Header;

/// Port used when the URI names none.
pub const DEFAULT_HTTP_PORT: u16 = 80;

/// Most header lines accepted in one request head.
pub const MAX_HEADERS: usize = 100;

/// A parsed HTTP/1.x request line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    pub method: String,
    pub uri: String,
    pub version: String,
}

impl RequestLine {
    /// Parses one request line, with or without its trailing CRLF.
    pub fn parse(line: &str) -> Result<Self> {
        let mut head = line.trim_end_matches(&['\r', '\n'][..]).as_bytes().to_vec();
        head.extend_from_slice(b"\r\n\r\n");
        RequestHead::parse(&head).map(|head| head.line)
    }

    /// Only GET is serviced.
    pub fn is_get(&self) -> bool {
        self.method.eq_ignore_ascii_case("GET")
    }
}

/// Request line plus header fields, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHead {
    pub line: RequestLine,
    pub headers: Vec<Header>,
}

impl RequestHead {
    /// Parses a complete head, request line through the blank line.
    pub fn parse(head: &[u8]) -> Result<Self> {
        let malformed = || {
            let first = head.split(|b| *b == b'\n').next().unwrap_or_default();
            ProxyError::MalformedRequest(String::from_utf8_lossy(first).trim_end().to_string())
        };

        let mut headers_storage = [httparse::EMPTY_HEADER; MAX_HEADERS];
        let mut req = httparse::Request::new(&mut headers_storage);

        match req.parse(head) {
            Ok(Status::Complete(_)) => {}
            Ok(Status::Partial) => return Err(malformed()),
            Err(httparse::Error::TooManyHeaders) => {
                return Err(ProxyError::RequestTooLarge(format!(
                    "more than {} headers",
                    MAX_HEADERS
                )))
            }
            Err(_) => return Err(malformed()),
        }

        let (Some(method), Some(uri), Some(version)) = (req.method, req.path, req.version) else {
            return Err(malformed());
        };

        let headers = req
            .headers
            .iter()
            .map(|h| {
                let value = std::str::from_utf8(h.value).map_err(|_| malformed())?;
                Ok(Header::new(h.name, value.trim()))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            line: RequestLine {
                method: method.to_string(),
                uri: uri.to_string(),
                version: format!("HTTP/1.{}", version),
            },
            headers,
        })
    }
}

/// Origin coordinates taken from an absolute URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub host: String,
    pub port: u16,
    pub path: String,
    /// True if the URI spelled the port out
    pub explicit_port: bool,
}

impl Target {
    /// Parses `http://host[:port][/path][?query]`. Fragments are dropped.
    pub fn parse(uri: &str) -> Result<Self> {
        let invalid = || ProxyError::InvalidUri(uri.to_string());

        let scheme_end = uri.find("://").ok_or_else(invalid)?;
        if !uri[..scheme_end].eq_ignore_ascii_case("http") {
            return Err(invalid());
        }
        let rest = &uri[scheme_end + 3..];
        let rest = rest.split('#').next().unwrap_or(rest);
        let (authority, path) = match rest.find(&['/', '?'][..]) {
            Some(idx) if rest[idx..].starts_with('?') => (&rest[..idx], format!("/{}", &rest[idx..])),
            Some(idx) => (&rest[..idx], rest[idx..].to_string()),
            None => (rest, "/".to_string()),
        };
        // Userinfo is not forwarded.
        let authority = authority.rsplit('@').next().unwrap_or(authority);

        let (host, port) = if let Some(bracketed) = authority.strip_prefix('[') {
            let (host, after) = bracketed.split_once(']').ok_or_else(invalid)?;
            match after {
                "" => (host, None),
                _ => (host, Some(after.strip_prefix(':').ok_or_else(invalid)?)),
            }
        } else {
            match authority.rsplit_once(':') {
                Some((host, port)) => (host, Some(port)),
                None => (authority, None),
            }
        };

        let (port, explicit_port) = match port {
            Some(port) => (port.parse::<u16>().map_err(|_| invalid())?, true),
            None => (DEFAULT_HTTP_PORT, false),
        };

        if host.is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            host: host.to_string(),
            port,
            path,
            explicit_port,
        })
    }

    /// Value for a synthesized `Host` header.
    pub fn host_header(&self) -> String {
        if self.explicit_port {
            self.authority()
        } else {
            self.bracketed_host()
        }
    }

    /// `host:port` for logging.
    pub fn authority(&self) -> String {
        format!("{}:{}", self.bracketed_host(), self.port)
    }

    fn bracketed_host(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        }
    }
}
