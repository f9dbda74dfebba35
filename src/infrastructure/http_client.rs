//! Outbound HTTP Client
//!
//! Builds the single reqwest client shared by every outbound adapter.

use std::time::Duration;

/// Settings for the shared HTTP client.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Bound on each outbound call, connect through body
    pub timeout: Duration,
    /// Bound on establishing the TCP/TLS connection
    pub connect_timeout: Duration,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(4),
            connect_timeout: Duration::from_secs(2),
        }
    }
}

impl HttpClientConfig {
    /// Config with the given per-call timeout; the connect bound never exceeds it.
    pub fn with_timeout(timeout: Duration) -> Self {
        let connect_timeout = Self::default().connect_timeout.min(timeout);
        Self {
            timeout,
            connect_timeout,
        }
    }
}

/// Build the shared client.
///
/// A timed-out call surfaces as a `reqwest::Error` like any other transport
/// failure, so callers need no special handling for stalls.
pub fn build_http_client(config: &HttpClientConfig) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
}
