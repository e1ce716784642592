// ── Core error types ──
//
// Errors surfaced by the sync engine. Transport failures keep the request
// context (method, url, status, bodies) because a failed apply is only
// diagnosable from them. The `From<aqsync_api::Error>` impl translates
// transport-layer errors into these variants.

use thiserror::Error;

use crate::ids::IdKind;
use crate::model::EntityKind;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Request to {url} timed out")]
    Timeout { url: String },

    // ── Remote errors ────────────────────────────────────────────────
    /// Non-success response from the service. Never retried.
    #[error("{method} {url} failed with HTTP {status}")]
    Remote {
        method: String,
        url: String,
        status: u16,
        request_body: Option<String>,
        response_body: String,
    },

    #[error("Unexpected response from service: {message}")]
    UnexpectedResponse { message: String },

    // ── Declared graph errors ────────────────────────────────────────
    /// A type name, parent, source or target that maps to no remote or
    /// declared identifier.
    #[error("Unresolved {kind} '{identifier}'{}", workspace_suffix(.workspace.as_deref()))]
    Unresolved {
        kind: IdKind,
        identifier: String,
        workspace: Option<String>,
    },

    #[error("{kind} '{custom_id}' is declared in unknown workspace '{workspace}'")]
    UnknownWorkspace {
        kind: EntityKind,
        custom_id: String,
        workspace: String,
    },

    #[error("Duplicate {kind} customId '{custom_id}'")]
    DuplicateCustomId { kind: EntityKind, custom_id: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

fn workspace_suffix(workspace: Option<&str>) -> String {
    workspace.map_or_else(String::new, |ws| format!(" in workspace '{ws}'"))
}

impl CoreError {
    pub(crate) fn unresolved(
        kind: IdKind,
        identifier: impl Into<String>,
        workspace: Option<&str>,
    ) -> Self {
        Self::Unresolved {
            kind,
            identifier: identifier.into(),
            workspace: workspace.map(str::to_owned),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<aqsync_api::Error> for CoreError {
    fn from(err: aqsync_api::Error) -> Self {
        match err {
            aqsync_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            aqsync_api::Error::Transport(ref e) => {
                let url = e.url().map_or_else(|| "<unknown>".into(), ToString::to_string);
                if e.is_timeout() {
                    CoreError::Timeout { url }
                } else {
                    CoreError::ConnectionFailed {
                        url,
                        reason: e.to_string(),
                    }
                }
            }
            aqsync_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            aqsync_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            aqsync_api::Error::Api {
                method,
                url,
                status,
                request_body,
                response_body,
            } => CoreError::Remote {
                method,
                url,
                status,
                request_body,
                response_body,
            },
            aqsync_api::Error::Deserialization { message, .. } => {
                CoreError::UnexpectedResponse { message }
            }
            aqsync_api::Error::Serialization(e) => {
                CoreError::Internal(format!("failed to encode request: {e}"))
            }
        }
    }
}
