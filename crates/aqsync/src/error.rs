//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use aqsync_config::ConfigError;
use aqsync_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const INVALID_GRAPH: i32 = 5;
    pub const REMOTE: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to {url}")]
    #[diagnostic(
        code(aqsync::connection_failed),
        help(
            "Check the service URL and your network.\n\
             Reason: {reason}"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request to {url} timed out")]
    #[diagnostic(
        code(aqsync::timeout),
        help("Increase the timeout with --timeout or in your profile.")
    )]
    Timeout { url: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed")]
    #[diagnostic(
        code(aqsync::auth_failed),
        help(
            "Verify the API token and organization.\n\
             Store a new token with: aqsync config set-token\n\
             Service said: {message}"
        )
    )]
    AuthFailed { message: String },

    #[error("No API token configured for profile '{profile}'")]
    #[diagnostic(
        code(aqsync::no_credentials),
        help(
            "Configure a token with: aqsync config set-token\n\
             Or set the AQSYNC_TOKEN environment variable."
        )
    )]
    NoCredentials { profile: String },

    // ── Remote ───────────────────────────────────────────────────────
    #[error("{method} {url} failed with HTTP {status}")]
    #[diagnostic(code(aqsync::remote), help("Response: {response_body}"))]
    Remote {
        method: String,
        url: String,
        status: u16,
        response_body: String,
    },

    #[error("Unexpected response from service: {message}")]
    #[diagnostic(code(aqsync::unexpected_response))]
    UnexpectedResponse { message: String },

    // ── Declared graph ───────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(aqsync::unresolved),
        help(
            "Every parent, source and target must name a component declared in\n\
             the graph file, and every workspace must be in the workspace table."
        )
    )]
    Unresolved { message: String },

    #[error("Invalid graph: {message}")]
    #[diagnostic(code(aqsync::invalid_graph))]
    InvalidGraph { message: String },

    #[error("Cannot read graph file {path}")]
    #[diagnostic(
        code(aqsync::graph_file),
        help("{reason}\nGraph files are JSON, or YAML when named *.yaml / *.yml.")
    )]
    GraphFile { path: String, reason: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(aqsync::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(aqsync::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: aqsync config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No sync target configured")]
    #[diagnostic(
        code(aqsync::no_config),
        help(
            "Create a profile with: aqsync config init\n\
             Expected at: {path}\n\
             Or pass --url, --org, --token and --workspace NAME=ID."
        )
    )]
    NoConfig { path: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(aqsync::config))]
    Config { message: String },

    // ── Interactive ──────────────────────────────────────────────────
    #[error("'{action}' requires confirmation")]
    #[diagnostic(
        code(aqsync::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Internal error: {message}")]
    #[diagnostic(code(aqsync::internal))]
    Internal { message: String },
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::Remote { status: 404, .. } | Self::ProfileNotFound { .. } => {
                exit_code::NOT_FOUND
            }
            Self::Remote { .. } | Self::UnexpectedResponse { .. } => exit_code::REMOTE,
            Self::Unresolved { .. } | Self::InvalidGraph { .. } | Self::GraphFile { .. } => {
                exit_code::INVALID_GRAPH
            }
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },
            CoreError::Timeout { url } => CliError::Timeout { url },
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },
            CoreError::Remote {
                method,
                url,
                status,
                response_body,
                ..
            } => CliError::Remote {
                method,
                url,
                status,
                response_body,
            },
            CoreError::UnexpectedResponse { message } => CliError::UnexpectedResponse { message },
            err @ CoreError::Unresolved { .. } => CliError::Unresolved {
                message: err.to_string(),
            },
            err @ (CoreError::UnknownWorkspace { .. } | CoreError::DuplicateCustomId { .. }) => {
                CliError::InvalidGraph {
                    message: err.to_string(),
                }
            }
            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "graph".into(),
                reason: message,
            },
            CoreError::Config { message } => CliError::Config { message },
            CoreError::Internal(message) => CliError::Internal { message },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::UnknownProfile { name } => CliError::ProfileNotFound {
                name,
                available: String::new(),
            },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}
