//! Configuration Module
//!
//! The listening port comes from the command line (one positional argument);
//! everything else is optional and read from environment variables.

use std::env;

use crate::error::{ProxyError, Result};

/// Proxy configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port the proxy listens on (positional argument)
    pub listen_port: u16,
    /// Loopback port for the admin endpoints, None disables them
    pub admin_port: Option<u16>,
    /// Interval in seconds between cache summary log lines
    pub stats_interval: u64,
}

impl Config {
    /// Builds a Config from the process argument list.
    ///
    /// Exactly one positional argument (the listening port) is accepted;
    /// anything else is a usage error, reported before any socket work.
    ///
    /// # Environment Variables
    /// - `ADMIN_PORT` - serve /stats and /health on this loopback port (default: disabled)
    /// - `STATS_INTERVAL` - cache summary log interval in seconds (default: 60)
    pub fn from_args<I>(mut args: I) -> Result<Self>
    where
        I: Iterator<Item = String>,
    {
        let program = args.next().unwrap_or_else(|| "mini_proxy".to_string());

        let port = match (args.next(), args.next()) {
            (Some(port), None) => port,
            _ => return Err(ProxyError::Usage(program)),
        };

        let listen_port = port
            .parse::<u16>()
            .map_err(|_| ProxyError::Usage(program))?;

        Ok(Self {
            listen_port,
            admin_port: env::var("ADMIN_PORT").ok().and_then(|v| v.parse().ok()),
            stats_interval: env::var("STATS_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_port: 8080,
            admin_port: None,
            stats_interval: 60,
        }
    }
}
