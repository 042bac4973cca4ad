//! Forwarding Pipeline
//!
//! The per-connection state machine: read the request line, classify the
//! method, consult the cache, and otherwise open an upstream connection,
//! rewrite the headers and relay the response while capturing a copy for
//! the cache. Every exit path drops both channels.

use std::io;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tracing::debug;

use crate::cache::MAX_OBJECT_SIZE;
use crate::error::Result;
use crate::state::AppState;

use super::channel::BufferedChannel;
use super::uri::parse_target;

// == Wire Constants ==
/// Longest request or header line the proxy reads
const MAX_LINE: usize = 8192;

/// Fixed User-Agent presented to origins
const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:10.0.3) Gecko/20120305 Firefox/10.0.3";

/// Handshake reply for CONNECT; no tunnel follows, the connection closes
const CONNECTION_ESTABLISHED: &[u8] = b"HTTP/1.0 200 Connection Established\r\n\r\n";

// == Connection Handler ==
/// Forwards one client transaction end to end.
///
/// Reads the request line, replies to `CONNECT` with the bare handshake,
/// rejects anything but `GET` with a 501 page, serves `GET` from the cache
/// when the literal request target is present, and otherwise relays the
/// request to the origin and the response back, storing a copy of small
/// responses under the request target.
///
/// A client that closes without sending anything, a malformed request
/// line, an unresolvable target and an unreachable origin all end the
/// transaction silently. I/O errors mid-transaction propagate to the
/// caller, which logs them.
pub async fn handle_connection<C>(client: C, state: AppState) -> Result<()>
where
    C: AsyncRead + AsyncWrite + Unpin,
{
    let mut client = BufferedChannel::new(client);

    // AwaitRequestLine: nothing from the peer is a normal termination
    let mut line = Vec::new();
    client.read_line(&mut line, MAX_LINE).await?;
    if line.is_empty() {
        return Ok(());
    }

    let text = String::from_utf8_lossy(&line);
    let mut tokens = text.split_whitespace();
    let (method, target) = match (tokens.next(), tokens.next()) {
        (Some(method), Some(target)) => (method.to_string(), target.to_string()),
        _ => {
            debug!(line = %text.trim_end(), "malformed request line");
            return Ok(());
        }
    };
    debug!(%method, %target, "request");

    // ClassifyMethod
    if method.eq_ignore_ascii_case("CONNECT") {
        client.write_all(CONNECTION_ESTABLISHED).await?;
        return Ok(());
    }
    if !method.eq_ignore_ascii_case("GET") {
        return write_error_response(
            &mut client,
            "501",
            "Not Implemented",
            "Proxy does not implement this method",
            &method,
        )
        .await;
    }

    // CacheLookup: the guard is released before the payload goes out
    let cached = {
        let cache = state.cache.read().await;
        cache.lookup(&target)
    };
    if let Some(payload) = cached {
        debug!(%target, bytes = payload.len(), "cache hit");
        client.write_all(&payload).await?;
        return Ok(());
    }

    // ResolveTarget
    let resolved = match parse_target(&target) {
        Ok(resolved) => resolved,
        Err(err) => {
            debug!(%target, %err, "unresolvable request target");
            return Ok(());
        }
    };

    // ConnectUpstream: no synthetic error body is owed to the client here
    let origin = match TcpStream::connect(resolved.authority()).await {
        Ok(stream) => stream,
        Err(err) => {
            debug!(authority = %resolved.authority(), %err, "upstream connect failed");
            return Ok(());
        }
    };
    let mut origin = BufferedChannel::new(origin);

    // ForwardHeaders: downgrade the request line, path only
    let request_line = format!("{} {} HTTP/1.0\r\n", method, resolved.path);
    origin.write_all(request_line.as_bytes()).await?;
    forward_request_headers(&mut client, &mut origin, &resolved.host).await?;

    // RelayBody, then CacheStore when the response stayed within bounds
    if let Some(body) = relay_response(&mut origin, &mut client).await? {
        let mut cache = state.cache.write().await;
        if let Err(err) = cache.store(target.clone(), body) {
            debug!(%target, %err, "response not cached");
        }
    }

    Ok(())
}

// == Header Rewrite ==
/// Streams the client's header lines to the origin with the proxy rewrite
/// applied.
///
/// `User-Agent`, `Connection` and `Proxy-Connection` lines are dropped in
/// favor of the canonical versions appended afterwards. A `Host` line
/// passes through unmodified and suppresses the synthetic one. After the
/// client's blank line, the appended block is: `Host` (if none seen), the
/// fixed `User-Agent`, `Connection: close`, `Proxy-Connection: close`,
/// blank line.
///
/// # Errors
/// End-of-stream before the blank line, or any transport failure.
async fn forward_request_headers<C, O>(
    client: &mut BufferedChannel<C>,
    origin: &mut BufferedChannel<O>,
    host: &str,
) -> Result<()>
where
    C: AsyncRead + AsyncWrite + Unpin,
    O: AsyncRead + AsyncWrite + Unpin,
{
    let mut saw_host = false;
    let mut line = Vec::new();

    loop {
        let n = client.read_line(&mut line, MAX_LINE).await?;
        if n == 0 {
            return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
        }
        if line == b"\r\n" {
            break;
        }

        if header_is(&line, "User-Agent")
            || header_is(&line, "Connection")
            || header_is(&line, "Proxy-Connection")
        {
            continue;
        }
        if header_is(&line, "Host") {
            saw_host = true;
        }

        origin.write_all(&line).await?;
    }

    if !saw_host {
        origin
            .write_all(format!("Host: {}\r\n", host).as_bytes())
            .await?;
    }
    origin
        .write_all(format!("User-Agent: {}\r\n", USER_AGENT).as_bytes())
        .await?;
    origin.write_all(b"Connection: close\r\n").await?;
    origin.write_all(b"Proxy-Connection: close\r\n").await?;
    origin.write_all(b"\r\n").await?;

    Ok(())
}

/// True if the header line starts with `name` immediately followed by a
/// colon, matched case-insensitively.
fn header_is(line: &[u8], name: &str) -> bool {
    let name = name.as_bytes();
    line.len() > name.len()
        && line[name.len()] == b':'
        && line[..name.len()].eq_ignore_ascii_case(name)
}

// == Response Relay ==
/// Relays the origin's response to the client in fixed-size chunks while
/// accumulating a copy for the cache.
///
/// # Returns
/// `Some(bytes)` holding the complete response when it fit within the
/// cacheable size limit, `None` when it overflowed (the relay itself is
/// unaffected; the partial copy is discarded).
async fn relay_response<O, C>(
    origin: &mut BufferedChannel<O>,
    client: &mut BufferedChannel<C>,
) -> Result<Option<Vec<u8>>>
where
    O: AsyncRead + AsyncWrite + Unpin,
    C: AsyncRead + AsyncWrite + Unpin,
{
    let mut chunk = [0u8; MAX_LINE];
    let mut scratch = Vec::new();
    let mut cacheable = true;

    loop {
        let n = origin.read_full(&mut chunk).await?;
        if n == 0 {
            break;
        }
        client.write_all(&chunk[..n]).await?;

        if cacheable {
            if scratch.len() + n > MAX_OBJECT_SIZE {
                debug!(captured = scratch.len() + n, "response too large to cache");
                cacheable = false;
                scratch = Vec::new();
            } else {
                scratch.extend_from_slice(&chunk[..n]);
            }
        }
    }

    if cacheable {
        Ok(Some(scratch))
    } else {
        Ok(None)
    }
}

// == Synthetic Error Page ==
/// Writes a synthetic HTML error page to the client.
///
/// Status line, a `Content-type` header, then a short HTML body naming the
/// offending cause. The page carries no `Content-length` and no closing
/// tags; the connection closing ends it.
async fn write_error_response<S>(
    client: &mut BufferedChannel<S>,
    code: &str,
    reason: &str,
    detail: &str,
    cause: &str,
) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let page = format!(
        "HTTP/1.0 {} {}\r\nContent-type: text/html\r\n\r\n\
         <html><title>Proxy Error</title><body bgcolor=ffffff>\r\n\
         {}: {}\r\n<p>{}: {}\r\n<hr><em>The Proxy Web server</em>\r\n",
        code, reason, code, reason, detail, cause
    );

    client.write_all(page.as_bytes()).await?;
    Ok(())
}
