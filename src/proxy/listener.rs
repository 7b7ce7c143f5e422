use std::io::{self, ErrorKind};
use std::net::SocketAddr;

use anyhow::{Context, Result};
use tokio::net::{TcpListener, TcpSocket};
use tracing::{debug, info, warn};

use super::{AppContext, LISTEN_BACKLOG, handler};

pub async fn start_listener(app: AppContext) -> Result<()> {
    let bind_addr = app.settings.listen;
    let listener =
        bind(bind_addr).with_context(|| format!("failed to bind listener on {bind_addr}"))?;
    let local_addr = listener.local_addr().unwrap_or(bind_addr);
    info!(address = %local_addr, "proxy listener started");

    loop {
        let (stream, peer_addr) = match listener.accept().await {
            Ok(pair) => pair,
            Err(err) if is_transient_accept_error(&err) => {
                warn!(error = %err, "transient accept failure; continuing");
                continue;
            }
            Err(err) => return Err(err).context("fatal accept failure"),
        };
        debug!(peer = %peer_addr, "accepted connection");
        if let Err(err) = stream.set_nodelay(true) {
            debug!(peer = %peer_addr, error = %err, "failed to set TCP_NODELAY on client stream");
        }
        let connection_app = app.clone();
        tokio::spawn(async move {
            if let Err(err) = handler::handle_client(stream, peer_addr, connection_app).await {
                debug!(peer = %peer_addr, error = %err, "request dropped");
            }
        });
    }
}

fn bind(addr: SocketAddr) -> io::Result<TcpListener> {
    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()?
    } else {
        TcpSocket::new_v6()?
    };
    socket.set_reuseaddr(true)?;
    socket.bind(addr)?;
    socket.listen(LISTEN_BACKLOG)
}

/// Accept failures the loop rides out; anything else tears the proxy down.
fn is_transient_accept_error(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::ConnectionAborted
            | ErrorKind::ConnectionReset
            | ErrorKind::NetworkDown
            | ErrorKind::NetworkUnreachable
            | ErrorKind::HostUnreachable
    )
}
