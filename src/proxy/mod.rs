pub mod cache;
pub mod listener;

mod error;
mod handler;
mod headers;
mod io_util;
mod request;
mod upstream;

pub use headers::USER_AGENT;

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::settings::Settings;
use cache::ObjectCache;

/// Upper bound on a single line read from a peer, and the relay chunk size.
pub const MAX_LINE: usize = 8192;
/// Largest response payload the cache will admit.
pub const MAX_OBJECT_SIZE: usize = 102_400;
/// Total byte budget across all cached payloads.
pub const MAX_CACHE_SIZE: usize = 1_049_000;
/// Listen backlog for the accept socket.
pub const LISTEN_BACKLOG: u32 = 1024;

#[derive(Clone)]
pub struct AppContext {
    pub settings: Arc<Settings>,
    pub cache: Arc<ObjectCache>,
}

impl AppContext {
    pub fn new(settings: Arc<Settings>, cache: Arc<ObjectCache>) -> Self {
        Self { settings, cache }
    }
}

pub async fn run(app: AppContext) -> Result<()> {
    let cache = app.cache.clone();
    tokio::select! {
        result = listener::start_listener(app) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("received shutdown signal; draining cache");
            cache.clear();
            Ok(())
        }
    }
}
