//! CLI configuration: thin wrapper around `aqsync_config` shared types.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides (--url,
//! --token, --workspace, etc.).

use secrecy::SecretString;

use aqsync_core::SyncConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use aqsync_config::{
    Config, Profile, config_path, load_config, load_config_or_default, save_config, store_token,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .unwrap_or_else(|| config.active_profile_name().to_owned())
}

/// Build a `SyncConfig` from the config file, active profile and flags.
///
/// Flags override profile values. Without a matching profile, `--url`,
/// `--org` and `--token` must all be given.
pub fn resolve_sync_config(global: &GlobalOpts) -> Result<SyncConfig, CliError> {
    let cfg = load_config()?;
    let profile_name = active_profile_name(global, &cfg);

    let stored = cfg.profiles.get(&profile_name);
    if stored.is_none() && global.profile.is_some() {
        let mut available: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
        available.sort_unstable();
        return Err(CliError::ProfileNotFound {
            name: profile_name,
            available: if available.is_empty() {
                "(none)".into()
            } else {
                available.join(", ")
            },
        });
    }
    if stored.is_none() && global.url.is_none() {
        return Err(CliError::NoConfig {
            path: config_path().display().to_string(),
        });
    }

    let mut profile = stored.cloned().unwrap_or_default();
    apply_overrides(&mut profile, global);

    let token = match (&global.token, stored) {
        (Some(token), _) => SecretString::from(token.clone()),
        (None, Some(_)) => aqsync_config::resolve_token(&profile, &profile_name)?,
        (None, None) => {
            return Err(CliError::NoCredentials {
                profile: profile_name,
            });
        }
    };

    Ok(aqsync_config::build_sync_config(&profile, &cfg.defaults, token)?)
}

/// Layer URL, org, timeout and workspace flags over a profile.
fn apply_overrides(profile: &mut Profile, global: &GlobalOpts) {
    if let Some(ref url) = global.url {
        profile.url.clone_from(url);
    }
    if let Some(ref org) = global.org {
        profile.org.clone_from(org);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }
    for (name, id) in &global.workspaces {
        profile.workspaces.insert(name.clone(), id.clone());
    }
}
