//! Client configuration.
//!
//! Defaults: 5 s connect/read/write timeouts and a pool of up to 2000 idle
//! connections kept for 50 s. Response bodies are read in full with no size
//! cap.
//!
//! `read_timeout_ms` bounds the wait for the response head only. The agent
//! has no per-read timeout, so a body download is bounded as a whole by
//! `body_timeout_ms`, which is unset by default: a slow but steady body is
//! read to the end.

use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// Timeouts and pool sizing for an [`crate::EnvelopeClient`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub connect_timeout_ms: u64,
    pub read_timeout_ms: u64,
    pub write_timeout_ms: u64,
    /// Cap on the whole body download. `None` leaves it unbounded.
    pub body_timeout_ms: Option<u64>,
    pub max_idle_connections: usize,
    pub idle_timeout_secs: u64,
    /// Largest response body read, in bytes.
    pub max_body_bytes: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 5_000,
            read_timeout_ms: 5_000,
            write_timeout_ms: 5_000,
            body_timeout_ms: None,
            max_idle_connections: 2_000,
            idle_timeout_secs: 50,
            max_body_bytes: u64::MAX,
        }
    }
}

impl ClientConfig {
    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }

    pub fn body_timeout(&self) -> Option<Duration> {
        self.body_timeout_ms.map(Duration::from_millis)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    /// Build the pooled agent every executor call goes through.
    ///
    /// Error statuses are returned as responses, never as `ureq::Error`, so
    /// the executor can apply its own status handling.
    pub(crate) fn agent(&self) -> ureq::Agent {
        ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_connect(Some(self.connect_timeout()))
            .timeout_send_request(Some(self.write_timeout()))
            .timeout_send_body(Some(self.write_timeout()))
            .timeout_recv_response(Some(self.read_timeout()))
            .timeout_recv_body(self.body_timeout())
            .max_idle_connections(self.max_idle_connections)
            .max_idle_connections_per_host(self.max_idle_connections)
            .max_idle_age(self.idle_timeout())
            .build()
            .new_agent()
    }
}
