use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, anyhow};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};

use cacheproxy::cli::LogFormat;
use cacheproxy::proxy::{self, AppContext, MAX_CACHE_SIZE, MAX_OBJECT_SIZE, cache::ObjectCache};
use cacheproxy::settings::Settings;

/// A proxy instance listening on a loopback port, with a handle on its
/// cache so tests can assert on admissions.
pub struct ProxyHarness {
    pub addr: SocketAddr,
    pub cache: Arc<ObjectCache>,
    handle: JoinHandle<()>,
}

impl ProxyHarness {
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with(MAX_CACHE_SIZE, MAX_OBJECT_SIZE).await
    }

    pub async fn spawn_with(max_cache_size: usize, max_object_size: usize) -> Result<Self> {
        let port = find_free_port()?;
        let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
        let settings = Arc::new(Settings {
            listen: addr,
            log: LogFormat::Text,
            max_object_size,
            max_cache_size,
        });
        let cache = Arc::new(ObjectCache::new(max_cache_size, max_object_size));
        let app = AppContext::new(settings, cache.clone());

        let handle = tokio::spawn(async move {
            if let Err(err) = proxy::run(app).await {
                eprintln!("proxy run failed: {err:?}");
            }
        });
        wait_for_listener(addr).await?;

        Ok(Self {
            addr,
            cache,
            handle,
        })
    }

    pub async fn shutdown(self) {
        self.handle.abort();
        let _ = self.handle.await;
    }
}

pub fn find_free_port() -> Result<u16> {
    let listener = std::net::TcpListener::bind((Ipv4Addr::LOCALHOST, 0))?;
    let port = listener.local_addr()?.port();
    drop(listener);
    Ok(port)
}

pub async fn wait_for_listener(addr: SocketAddr) -> Result<()> {
    for _ in 0..50 {
        match timeout(Duration::from_millis(50), TcpStream::connect(addr)).await {
            Ok(Ok(mut stream)) => {
                stream.shutdown().await.ok();
                return Ok(());
            }
            _ => sleep(Duration::from_millis(50)).await,
        }
    }
    Err(anyhow!("listener {addr} did not become ready"))
}
