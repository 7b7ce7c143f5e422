use std::net::{Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// Scripted origin server: answers every connection with the same canned
/// response and records each request head it receives.
pub struct TestOrigin {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<Vec<u8>>>>,
    handle: JoinHandle<()>,
}

impl TestOrigin {
    pub async fn with_response(response: impl Into<Vec<u8>>) -> Result<Self> {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await?;
        let addr = listener.local_addr()?;
        let response = Arc::new(response.into());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = requests.clone();

        let handle = tokio::spawn(async move {
            loop {
                let (mut stream, _) = match listener.accept().await {
                    Ok(conn) => conn,
                    Err(_) => break,
                };
                let response = response.clone();
                let recorded = recorded.clone();
                tokio::spawn(async move {
                    if let Ok(head) = read_request_head(&mut stream).await {
                        recorded
                            .lock()
                            .unwrap_or_else(|err| err.into_inner())
                            .push(head);
                    }
                    let _ = stream.write_all(&response).await;
                    stream.shutdown().await.ok();
                });
            }
        });

        Ok(Self {
            addr,
            requests,
            handle,
        })
    }

    pub async fn http_ok(body: &str) -> Result<Self> {
        let response = format!(
            "HTTP/1.0 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        );
        Self::with_response(response.into_bytes()).await
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Every request head received so far, in arrival order.
    pub fn request_heads(&self) -> Vec<Vec<u8>> {
        self.requests
            .lock()
            .unwrap_or_else(|err| err.into_inner())
            .clone()
    }
}

impl Drop for TestOrigin {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn read_request_head(stream: &mut TcpStream) -> Result<Vec<u8>> {
    let mut head = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        let read = stream.read(&mut byte).await?;
        if read == 0 {
            break;
        }
        head.extend_from_slice(&byte);
        if head.ends_with(b"\r\n\r\n") {
            break;
        }
    }
    Ok(head)
}
