//! Configuration for beanqueue
//!
//! Centralized configuration with sensible defaults.

use crate::protocol::DEFAULT_MAX_JOB_SIZE;

/// Configuration for a beanqueue connection
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// Server address (host:port)
    pub server_addr: String,

    /// Connection read timeout (milliseconds, 0 = none)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 = none)
    pub write_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Protocol Configuration
    // -------------------------------------------------------------------------
    /// Largest accepted put payload, in bytes. Payloads at or above this
    /// size are rejected locally before anything is sent. The server
    /// advertises its own limit under the `max-job-size` stats key; see
    /// [`crate::client::Connection::refresh_max_job_size`] to adopt it.
    pub max_job_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_addr: "127.0.0.1:11300".to_string(),
            read_timeout_ms: 0,
            write_timeout_ms: 0,
            max_job_size: DEFAULT_MAX_JOB_SIZE,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the server address (host:port)
    pub fn server_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.server_addr = addr.into();
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set the maximum put payload size (in bytes)
    pub fn max_job_size(mut self, bytes: usize) -> Self {
        self.config.max_job_size = bytes;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
