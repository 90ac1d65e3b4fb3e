//! Process configuration.
//!
//! Everything is driven by environment variables. Unset variables keep the
//! [`Default`] value.

use std::net::SocketAddr;

use crate::error::Error;

/// Runtime settings for the service.
#[derive(Debug, Clone)]
pub struct Config {
    /// `host:port` to listen on. `HTTPCMP_LISTEN`.
    pub listen: String,
    /// Fallback log filter when `RUST_LOG` is unset. `HTTPCMP_LOG_LEVEL`.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:3000".to_owned(),
            log_level: "info".to_owned(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(v) = lookup("HTTPCMP_LISTEN") {
            config.listen = v;
        }
        if let Some(v) = lookup("HTTPCMP_LOG_LEVEL") {
            config.log_level = v;
        }

        config
    }

    /// Parses [`listen`](Config::listen) into a socket address.
    pub fn listen_addr(&self) -> Result<SocketAddr, Error> {
        self.listen.parse().map_err(|source| Error::InvalidAddr {
            addr: self.listen.clone(),
            source,
        })
    }
}
