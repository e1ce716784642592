// Shared transport configuration for building reqwest::Client instances.
//
// The Ardoq client owns one reqwest::Client built here; timeout, TLS roots
// and the request budget all come from this module.

use std::path::PathBuf;
use std::time::Duration;

use crate::rate_limit::RateLimit;

/// TLS root-of-trust selection.
#[derive(Debug, Clone, Default)]
pub enum TlsMode {
    /// Use the bundled/system certificate store.
    #[default]
    System,
    /// Additionally trust a custom CA certificate from the given PEM file
    /// (intercepting corporate proxies).
    CustomCa(PathBuf),
}

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
    /// Client-side request budget. `None` disables throttling.
    pub rate_limit: Option<RateLimit>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: Duration::from_secs(30),
            rate_limit: Some(RateLimit::default()),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` with additional default headers.
    ///
    /// Used by [`ArdoqClient`](crate::ArdoqClient) to inject the
    /// `Authorization` header.
    pub fn build_client_with_headers(
        &self,
        headers: reqwest::header::HeaderMap,
    ) -> Result<reqwest::Client, crate::error::Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("aqsync/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers);

        if let TlsMode::CustomCa(path) = &self.tls {
            let cert_pem = std::fs::read(path).map_err(|e| {
                crate::error::Error::Tls(format!("failed to read CA cert: {e}"))
            })?;
            let cert = reqwest::Certificate::from_pem(&cert_pem)
                .map_err(|e| crate::error::Error::Tls(format!("invalid CA cert: {e}")))?;
            builder = builder.add_root_certificate(cert);
        }

        builder
            .build()
            .map_err(|e| crate::error::Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}
