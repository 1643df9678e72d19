// Shared transport configuration for building reqwest::Client instances.
//
// Every domain client builds its HTTP client through this module so TLS and
// timeout settings stay identical across services.

use std::time::Duration;

use crate::error::Error;

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
    /// Accept any certificate (self-signed staging environments).
    pub danger_accept_invalid_certs: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            danger_accept_invalid_certs: false,
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("bsp-provision/", env!("CARGO_PKG_VERSION")))
            .danger_accept_invalid_certs(self.danger_accept_invalid_certs)
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}
