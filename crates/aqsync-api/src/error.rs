use thiserror::Error;

/// Top-level error type for the `aqsync-api` crate.
///
/// Covers every failure mode of a single REST call: authentication,
/// transport, non-success responses, and undecodable bodies.
/// `aqsync-core` maps these into engine-level errors. Nothing here is retried.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Token rejected by the service (HTTP 401) or not encodable as a header.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup error (unreadable or invalid CA bundle).
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Remote API ──────────────────────────────────────────────────
    /// Non-success response. Carries the full request context so a failed
    /// apply can be diagnosed without re-running it.
    #[error("{method} {url} failed (HTTP {status}): {}", preview(.response_body))]
    Api {
        method: String,
        url: String,
        status: u16,
        request_body: Option<String>,
        response_body: String,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// Request payload could not be encoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying by the caller.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Api { status: 404, .. } => true,
            _ => false,
        }
    }

    /// HTTP status of the failed response, if the request got that far.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Authentication { .. } => Some(401),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

fn preview(body: &str) -> &str {
    let mut end = body.len().min(200);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
