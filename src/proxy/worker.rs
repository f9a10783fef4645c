//! Connection Worker
//!
//! Serves exactly one request per client connection:
//! 1. Read the request line
//! 2. Look the request line up under the read guard
//! 3. On a hit, write the cached bytes, promote the entry and drain the rest
//!    of the request head
//! 4. On a miss, read the header block, forward to the origin and stream the
//!    reply back
//! 5. Cache the reply if it stayed under the per-object limit
//!
//! Any failure ends the connection without a response body.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::cache::InsertOutcome;
use crate::error::{ProxyError, Result};
use crate::http::{build_origin_request, RequestHead, RequestLine, Target, MAX_HEADER_BYTES, MAX_LINE};
use crate::proxy::{connect, timed, Admission, ResponseBuffer};
use crate::state::AppState;

/// How long a served hit waits for the client to finish sending its headers.
const HIT_DRAIN_GRACE: Duration = Duration::from_millis(500);

/// How a connection was served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Served {
    /// Answered from the cache; the origin was not contacted
    Hit { bytes: usize },
    /// Forwarded to the origin
    Forwarded { bytes: usize, cached: bool },
}

/// Runs one connection to completion and closes it.
///
/// Errors are logged here and go no further.
pub async fn handle_connection(mut stream: TcpStream, peer: SocketAddr, state: AppState) {
    let span = info_span!("conn", %peer);

    async move {
        match serve(&mut stream, &state).await {
            Ok(served) => debug!(?served, "Connection finished"),
            Err(err) if err.is_benign() => debug!(error = %err, "Connection dropped"),
            Err(err) => warn!(error = %err, "Connection failed"),
        }

        if let Err(err) = stream.shutdown().await {
            debug!(error = %err, "Client close failed");
        }
    }
    .instrument(span)
    .await
}

/// Serves the single request waiting on `client`.
pub async fn serve<S>(client: &mut S, state: &AppState) -> Result<Served>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let settings = &state.settings;
    let mut client = BufReader::new(client);

    // == Await request line ==
    let raw_line = read_line(&mut client, settings.io_timeout)
        .await?
        .ok_or(ProxyError::EmptyRequest)?;
    let key = raw_line.trim_end_matches(&['\r', '\n'][..]).to_string();
    let request = RequestLine::parse(&key)?;
    if !request.is_get() {
        return Err(ProxyError::UnsupportedMethod(request.method));
    }

    // == Cache lookup ==
    if let Some(hit) = state.cache.lookup(&key).await {
        let bytes = hit.payload.len();
        write_client(&mut client, &hit.payload, settings.io_timeout).await?;
        if !state.cache.promote(hit.handle).await {
            debug!(request = %key, "Entry evicted before promotion");
        }
        info!(request = %key, bytes, "Served from cache");
        drain_head(&mut client).await;
        return Ok(Served::Hit { bytes });
    }

    // == Forward ==
    let mut head = raw_line.into_bytes();
    if !head.ends_with(b"\n") {
        head.extend_from_slice(b"\r\n");
    }
    read_header_block(&mut client, &mut head, settings.io_timeout).await?;
    let head = RequestHead::parse(&head)?;

    let target = Target::parse(&request.uri)?;
    let origin_request = build_origin_request(&target, &head.headers);
    let mut origin = connect(&target, settings).await?;

    let result = stream_response(&mut client, &mut origin, &origin_request, state, &key).await;

    // == Teardown ==
    if let Err(err) = origin.shutdown().await {
        debug!(error = %err, "Origin close failed");
    }
    result
}

/// Closes the reply side, then reads whatever is left of the request head so
/// the final close does not reset the connection.
async fn drain_head<C>(client: &mut BufReader<C>)
where
    C: AsyncRead + AsyncWrite + Unpin,
{
    if let Err(err) = client.shutdown().await {
        debug!(error = %err, "Client close failed");
        return;
    }

    let mut rest = Vec::new();
    match tokio::time::timeout(HIT_DRAIN_GRACE, read_header_block(client, &mut rest, None)).await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => debug!(error = %err, "Request head not drained"),
        Err(_) => debug!("Client kept its request head open"),
    }
}

async fn stream_response<C>(
    client: &mut C,
    origin: &mut TcpStream,
    origin_request: &str,
    state: &AppState,
    key: &str,
) -> Result<Served>
where
    C: AsyncWrite + Unpin,
{
    let io_timeout = state.settings.io_timeout;

    timed(
        io_timeout,
        "writing to origin",
        origin.write_all(origin_request.as_bytes()),
        ProxyError::OriginIo,
    )
    .await?;

    // == Stream response ==
    let mut buffer = ResponseBuffer::new(state.settings.max_object_size);
    let mut chunk = vec![0u8; MAX_LINE];
    loop {
        let n = timed(io_timeout, "reading from origin", origin.read(&mut chunk), ProxyError::OriginIo).await?;
        if n == 0 {
            break;
        }
        buffer.push(&chunk[..n]);
        write_client(client, &chunk[..n], io_timeout).await?;
    }
    let bytes = buffer.total();

    // == Cache populate ==
    let cached = match buffer.finish() {
        Admission::Cacheable(payload) => {
            match state.cache.insert(key.to_string(), payload).await {
                InsertOutcome::TooLarge => {
                    debug!(request = %key, bytes, "Object larger than the whole cache");
                    false
                }
                outcome => {
                    debug!(request = %key, bytes, evicted = outcome.evicted(), "Cached response");
                    true
                }
            }
        }
        Admission::Oversized { total } => {
            debug!(request = %key, bytes = total, "Response too large to cache");
            false
        }
        Admission::Unavailable => {
            warn!(request = %key, bytes, "Cache unavailable, proceeding without caching");
            false
        }
        Admission::Empty => false,
    };

    info!(request = %key, bytes, cached, "Forwarded from origin");
    Ok(Served::Forwarded { bytes, cached })
}

/// Reads one line, bounded at `MAX_LINE`. Returns None at EOF.
async fn read_line<R>(reader: &mut R, io_timeout: Option<Duration>) -> Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = Vec::new();
    let mut limited = reader.take(MAX_LINE as u64);
    let n = timed(
        io_timeout,
        "reading from client",
        limited.read_until(b'\n', &mut line),
        ProxyError::ClientIo,
    )
    .await?;

    if n == 0 {
        return Ok(None);
    }
    if !line.ends_with(b"\n") && n >= MAX_LINE {
        return Err(ProxyError::RequestTooLarge(format!("line exceeds {} bytes", MAX_LINE)));
    }

    String::from_utf8(line)
        .map(Some)
        .map_err(|_| ProxyError::MalformedRequest("request is not valid UTF-8".into()))
}

/// Appends header lines to `head` through the blank line. EOF also ends
/// the block; the terminator is supplied if the client never sent it.
async fn read_header_block<R>(reader: &mut R, head: &mut Vec<u8>, io_timeout: Option<Duration>) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let Some(line) = read_line(reader, io_timeout).await? else {
            head.extend_from_slice(b"\r\n");
            return Ok(());
        };

        head.extend_from_slice(line.as_bytes());
        if head.len() > MAX_HEADER_BYTES {
            return Err(ProxyError::RequestTooLarge(format!(
                "headers exceed {} bytes",
                MAX_HEADER_BYTES
            )));
        }
        if line == "\r\n" || line == "\n" {
            return Ok(());
        }
        if !line.ends_with('\n') {
            // Cut off by EOF mid-line
            head.extend_from_slice(b"\r\n\r\n");
            return Ok(());
        }
    }
}

async fn write_client<W>(client: &mut W, bytes: &[u8], io_timeout: Option<Duration>) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    timed(io_timeout, "writing to client", client.write_all(bytes), ProxyError::ClientIo).await?;
    timed(io_timeout, "writing to client", client.flush(), ProxyError::ClientIo).await
}
