use std::net::{Ipv4Addr, SocketAddr};

use anyhow::{Result, ensure};

use crate::cli::{Cli, LogFormat};
use crate::proxy::{MAX_CACHE_SIZE, MAX_OBJECT_SIZE};

#[derive(Debug, Clone)]
pub struct Settings {
    pub listen: SocketAddr,
    pub log: LogFormat,
    /// Largest response payload the cache will admit.
    pub max_object_size: usize,
    /// Total byte budget across all cached payloads.
    pub max_cache_size: usize,
}

impl Settings {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            listen: SocketAddr::from((Ipv4Addr::UNSPECIFIED, cli.port)),
            log: cli.log_format,
            max_object_size: MAX_OBJECT_SIZE,
            max_cache_size: MAX_CACHE_SIZE,
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.max_object_size > 0,
            "max_object_size must be greater than 0 (got {})",
            self.max_object_size
        );
        ensure!(
            self.max_object_size <= self.max_cache_size,
            "max_object_size ({}) must not exceed max_cache_size ({})",
            self.max_object_size,
            self.max_cache_size
        );
        Ok(())
    }
}
