use std::net::SocketAddr;

use anyhow::Result;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// Raw TCP client speaking absolute-form HTTP/1.0 through the proxy.
pub struct ProxyClient {
    stream: TcpStream,
}

impl ProxyClient {
    pub async fn connect(addr: SocketAddr) -> Result<Self> {
        Ok(Self {
            stream: TcpStream::connect(addr).await?,
        })
    }

    pub async fn send(&mut self, request: impl AsRef<[u8]>) -> Result<()> {
        self.stream.write_all(request.as_ref()).await?;
        self.stream.flush().await?;
        Ok(())
    }

    /// Reads until the proxy closes the connection.
    pub async fn read_response(&mut self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.stream.read_to_end(&mut buf).await?;
        Ok(buf)
    }

    /// One-shot request/response round trip.
    pub async fn request(addr: SocketAddr, request: impl AsRef<[u8]>) -> Result<Vec<u8>> {
        let mut client = Self::connect(addr).await?;
        client.send(request).await?;
        client.read_response().await
    }
}
