//! Origin Connections
//!
//! Connecting to the origin server and the optional timeout wrapper used for
//! every socket operation.

use std::future::Future;
use std::io;
use std::time::Duration;

use tokio::net::TcpStream;
use tracing::debug;

use crate::error::{ProxyError, Result};
use crate::http::Target;
use crate::proxy::ProxySettings;

/// Base delay between connect attempts; grows linearly per attempt.
const RETRY_BACKOFF: Duration = Duration::from_millis(100);

/// Runs an I/O future, bounded by `limit` when one is set.
pub async fn timed<T>(
    limit: Option<Duration>,
    what: &'static str,
    fut: impl Future<Output = io::Result<T>>,
    wrap: fn(io::Error) -> ProxyError,
) -> Result<T> {
    match limit {
        Some(limit) => match tokio::time::timeout(limit, fut).await {
            Ok(result) => result.map_err(wrap),
            Err(_) => Err(ProxyError::Timeout(limit, what)),
        },
        None => fut.await.map_err(wrap),
    }
}

/// Opens a connection to the origin named by `target`.
///
/// Name resolution tries every address the resolver returns. Failed
/// attempts are retried `connect_retries` times.
pub async fn connect(target: &Target, settings: &ProxySettings) -> Result<TcpStream> {
    let mut attempt: u32 = 0;

    loop {
        let result = match settings.connect_timeout {
            Some(limit) => {
                match tokio::time::timeout(limit, TcpStream::connect((target.host.as_str(), target.port))).await {
                    Ok(result) => result,
                    Err(_) => Err(io::Error::new(io::ErrorKind::TimedOut, "connect timed out")),
                }
            }
            None => TcpStream::connect((target.host.as_str(), target.port)).await,
        };

        match result {
            Ok(stream) => return Ok(stream),
            Err(err) if attempt < settings.connect_retries => {
                attempt += 1;
                debug!(
                    origin = %target.authority(),
                    attempt,
                    error = %err,
                    "Origin connect failed, retrying"
                );
                tokio::time::sleep(RETRY_BACKOFF * attempt).await;
            }
            Err(err) => {
                return Err(ProxyError::OriginConnect {
                    target: target.authority(),
                    source: err,
                })
            }
        }
    }
}
