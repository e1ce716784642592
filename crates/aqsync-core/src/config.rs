// ── Runtime sync configuration ──
//
// Describes *where* to sync: service endpoint, organization, credentials,
// the workspace table and transport tuning. Never touches disk; the CLI
// builds a `SyncConfig` from a profile and hands it in.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use aqsync_api::{RateLimit, TlsMode, TransportConfig};
use secrecy::SecretString;
use url::Url;

use crate::model::WorkspaceName;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store.
    #[default]
    SystemDefaults,
    /// Additionally trust a custom CA certificate file.
    CustomCa(PathBuf),
}

/// Configuration for one sync target.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Service URL (e.g. `https://acme.ardoq.com`); `/api/` is appended.
    pub url: Url,
    /// Organization label sent as the `org` query parameter.
    pub org: String,
    pub token: SecretString,
    /// Workspace name → remote workspace id.
    pub workspaces: BTreeMap<WorkspaceName, String>,
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Client-side request budget; `None` disables throttling.
    pub rate_limit: Option<RateLimit>,
}

impl SyncConfig {
    pub fn new(url: Url, org: impl Into<String>, token: SecretString) -> Self {
        Self {
            url,
            org: org.into(),
            token,
            workspaces: BTreeMap::new(),
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            rate_limit: Some(RateLimit::default()),
        }
    }

    pub(crate) fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: match &self.tls {
                TlsVerification::SystemDefaults => TlsMode::System,
                TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            },
            timeout: self.timeout,
            rate_limit: self.rate_limit,
        }
    }
}
