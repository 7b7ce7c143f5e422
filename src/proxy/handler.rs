use std::net::SocketAddr;
use std::time::Instant;

use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::debug;

use crate::logging::AccessLogBuilder;

use super::cache::Lookup;
use super::error::{RequestError, Side};
use super::headers::build_upstream_header;
use super::io_util::{read_line, write_all_bytes};
use super::request::{RequestTarget, parse_absolute_uri, parse_request_line};
use super::upstream::connect_to_origin;
use super::{AppContext, MAX_LINE};

/// Runs one request from accept to close: parse, gate, cache probe, header
/// rewrite, dial, relay, cache admission. Any failure drops the request;
/// the client sees a truncated or empty response, never a synthesized one.
pub(super) async fn handle_client(
    stream: TcpStream,
    peer: SocketAddr,
    app: AppContext,
) -> Result<(), RequestError> {
    let start = Instant::now();
    let mut reader = BufReader::new(stream);

    let mut line = Vec::new();
    read_line(&mut reader, &mut line, Side::Client, MAX_LINE).await?;
    let text = std::str::from_utf8(&line)
        .map_err(|_| RequestError::malformed("request line contained invalid bytes"))?;
    let request = parse_request_line(text)?;
    debug!(
        peer = %peer,
        method = %request.method,
        target = %request.uri,
        version = %request.version,
        "parsed request line"
    );

    if !request.method.eq_ignore_ascii_case("GET") {
        // Dropped without writing anything back.
        return Err(RequestError::malformed(format!(
            "unsupported method '{}'",
            request.method
        )));
    }

    let target = parse_absolute_uri(&request.uri)?;
    let key = target.cache_key();

    let mut object = vec![0u8; app.settings.max_object_size];
    if let Lookup::Hit(size) = app.cache.lookup(&key, &mut object) {
        write_all_bytes(reader.get_mut(), &object[..size], Side::Client).await?;
        reader.get_mut().shutdown().await.ok();
        access_log(peer, &request.method, &target, "hit", size as u64, start);
        return Ok(());
    }

    let header = build_upstream_header(&mut reader, &target).await?;
    let mut origin = connect_to_origin(&target.host, &target.port).await?;
    write_all_bytes(&mut origin, &header, Side::Origin).await?;

    let relay = relay_response(&mut reader, &mut origin, app.settings.max_object_size).await?;
    drop(origin);

    if relay.relayed > 0 && relay.relayed <= app.settings.max_object_size {
        app.cache.insert(&key, &relay.body);
    }

    reader.get_mut().shutdown().await.ok();
    access_log(
        peer,
        &request.method,
        &target,
        "miss",
        relay.relayed as u64,
        start,
    );
    Ok(())
}

struct RelayOutcome {
    relayed: usize,
    body: Vec<u8>,
}

/// Streams the origin response to the client while keeping a copy for cache
/// admission. The copy only grows while the running total is still within
/// the object budget, so a skipped chunk is never followed by an appended
/// one and the kept body is always an exact prefix of the response.
async fn relay_response(
    reader: &mut BufReader<TcpStream>,
    origin: &mut TcpStream,
    max_object_size: usize,
) -> Result<RelayOutcome, RequestError> {
    let mut chunk = vec![0u8; MAX_LINE];
    let mut body = Vec::new();
    let mut relayed = 0usize;

    loop {
        let read = origin.read(&mut chunk).await.map_err(|source| {
            RequestError::Read {
                side: Side::Origin,
                source,
            }
        })?;
        if read == 0 {
            break;
        }
        write_all_bytes(reader.get_mut(), &chunk[..read], Side::Client).await?;
        if relayed.saturating_add(read) <= max_object_size {
            body.extend_from_slice(&chunk[..read]);
        }
        relayed = relayed.saturating_add(read);
    }

    Ok(RelayOutcome { relayed, body })
}

fn access_log(
    peer: SocketAddr,
    method: &str,
    target: &RequestTarget,
    cache: &'static str,
    bytes_out: u64,
    start: Instant,
) {
    AccessLogBuilder::new(peer)
        .method(method)
        .host(target.host.as_str())
        .path(target.path.as_str())
        .cache(cache)
        .bytes_out(bytes_out)
        .elapsed(start.elapsed())
        .log();
}
