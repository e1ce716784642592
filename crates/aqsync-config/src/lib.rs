//! Shared configuration for the aqsync CLI.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext), and
//! translation to `aqsync_core::SyncConfig`. The CLI layers its global
//! flags on top.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::Duration;

use aqsync_api::RateLimit;
use aqsync_core::{SyncConfig, TlsVerification};
use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Keyring service name; entries are keyed `<profile>/token`.
pub const KEYRING_SERVICE: &str = "aqsync";

/// Overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "AQSYNC_CONFIG";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no API token configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{name}' not found")]
    UnknownProfile { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named sync targets.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Name of the profile to use when none is given explicitly.
    pub fn active_profile_name(&self) -> &str {
        self.default_profile.as_deref().unwrap_or("default")
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Sustained request rate; 0 disables client-side throttling.
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,

    #[serde(default = "default_burst")]
    pub burst: u32,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
            requests_per_second: default_requests_per_second(),
            burst: default_burst(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_requests_per_second() -> u32 {
    RateLimit::default().requests_per_second
}
fn default_burst() -> u32 {
    RateLimit::default().burst
}

/// A named sync target.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Profile {
    /// Service base URL (e.g., "https://acme.ardoq.com").
    pub url: String,

    /// Organization label.
    pub org: String,

    /// API token (plaintext; prefer keyring or env var).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Environment variable name containing the API token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_env: Option<String>,

    /// Workspace name → remote workspace id.
    #[serde(default)]
    pub workspaces: BTreeMap<String, String>,

    /// Path to custom CA certificate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    /// Override timeout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Override request rate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requests_per_second: Option<u32>,

    /// Override burst capacity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub burst: Option<u32>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path: `AQSYNC_CONFIG`, else platform conventions.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    ProjectDirs::from("com", "aqsync", "aqsync").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("aqsync");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path` (missing file = defaults), then `AQSYNC_` env vars
/// (`AQSYNC_DEFAULTS__TIMEOUT=10`, `AQSYNC_DEFAULT_PROFILE=prod`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("AQSYNC_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't parse.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution (without CLI flags) ───────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, ConfigError> {
    Ok(keyring::Entry::new(
        KEYRING_SERVICE,
        &format!("{profile_name}/token"),
    )?)
}

/// Store a token in the system keyring for `profile_name`.
pub fn store_token(profile_name: &str, token: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(token)?;
    Ok(())
}

/// Resolve the API token from the credential chain (no CLI flag step).
pub fn resolve_token(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    resolve_token_with(profile, profile_name, |name| std::env::var(name).ok())
}

fn resolve_token_with(
    profile: &Profile,
    profile_name: &str,
    lookup_env: impl Fn(&str) -> Option<String>,
) -> Result<SecretString, ConfigError> {
    // 1. Profile's token_env → env var lookup
    if let Some(ref env_name) = profile.token_env {
        if let Some(val) = lookup_env(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring_entry(profile_name) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    if let Some(ref token) = profile.token {
        return Ok(SecretString::from(token.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Build a `SyncConfig` from a profile and its resolved token, filling gaps
/// from `defaults`.
pub fn build_sync_config(
    profile: &Profile,
    defaults: &Defaults,
    token: SecretString,
) -> Result<SyncConfig, ConfigError> {
    let url: url::Url = profile.url.parse().map_err(|_| ConfigError::Validation {
        field: "url".into(),
        reason: format!("invalid URL: {}", profile.url),
    })?;
    if profile.org.is_empty() {
        return Err(ConfigError::Validation {
            field: "org".into(),
            reason: "organization must not be empty".into(),
        });
    }

    let mut config = SyncConfig::new(url, profile.org.clone(), token);
    config.workspaces.clone_from(&profile.workspaces);
    if let Some(ref ca_path) = profile.ca_cert {
        config.tls = TlsVerification::CustomCa(ca_path.clone());
    }
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));

    let requests_per_second = profile
        .requests_per_second
        .unwrap_or(defaults.requests_per_second);
    config.rate_limit = (requests_per_second > 0).then(|| RateLimit {
        requests_per_second,
        burst: profile.burst.unwrap_or(defaults.burst).max(1),
    });

    Ok(config)
}
