use std::collections::HashSet;
use std::io::{self, ErrorKind};
use std::net::SocketAddr;

use tokio::net::{TcpStream, lookup_host};
use tracing::debug;

use super::error::RequestError;

/// Resolves `host:port` and connects to the first candidate address that
/// accepts. Candidates are tried in resolution order; the error reported on
/// exhaustion is the last connect failure.
pub(crate) async fn connect_to_origin(host: &str, port: &str) -> Result<TcpStream, RequestError> {
    let port_num: u16 = port.parse().map_err(|_| {
        connect_error(
            host,
            port,
            io::Error::new(ErrorKind::InvalidInput, format!("invalid port '{port}'")),
        )
    })?;

    let addrs = resolve(host, port_num)
        .await
        .map_err(|source| connect_error(host, port, source))?;

    let mut last_err: Option<io::Error> = None;
    for addr in &addrs {
        match TcpStream::connect(addr).await {
            Ok(stream) => {
                if let Err(err) = stream.set_nodelay(true) {
                    debug!(
                        host = %addr.ip(),
                        port = addr.port(),
                        error = %err,
                        "failed to set TCP_NODELAY on origin stream"
                    );
                }
                debug!(host = %addr.ip(), port = addr.port(), "connected to origin");
                return Ok(stream);
            }
            Err(err) => {
                debug!(address = %addr, error = %err, "origin candidate refused; trying next");
                last_err = Some(err);
            }
        }
    }

    Err(connect_error(
        host,
        port,
        last_err.unwrap_or_else(|| {
            io::Error::new(
                ErrorKind::NotFound,
                "DNS lookup returned no usable addresses",
            )
        }),
    ))
}

async fn resolve(host: &str, port: u16) -> io::Result<Vec<SocketAddr>> {
    let addrs = lookup_host((host, port)).await?;
    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    for addr in addrs {
        if seen.insert(addr) {
            unique.push(addr);
        }
    }
    Ok(unique)
}

fn connect_error(host: &str, port: &str, source: io::Error) -> RequestError {
    RequestError::Connect {
        host: host.to_string(),
        port: port.to_string(),
        source,
    }
}
