//! Config subcommand handlers.

use dialoguer::{Input, Password, Select};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

const MASK: &str = "****";

// ── Helpers ─────────────────────────────────────────────────────────

/// Copy of the config with plaintext tokens masked.
fn redacted(cfg: &Config) -> Config {
    let mut cfg = cfg.clone();
    for profile in cfg.profiles.values_mut() {
        if profile.token.is_some() {
            profile.token = Some(MASK.into());
        }
    }
    cfg
}

fn render_config(format: OutputFormat, cfg: &Config) -> Result<String, CliError> {
    match format {
        OutputFormat::Table | OutputFormat::Plain => {
            toml::to_string_pretty(cfg).map_err(|e| CliError::Config {
                message: e.to_string(),
            })
        }
        structured => output::render_structured(structured, cfg),
    }
}

fn sorted_names(cfg: &Config) -> Vec<&str> {
    let mut names: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
    names.sort_unstable();
    names
}

fn profile_not_found(cfg: &Config, name: String) -> CliError {
    let available = sorted_names(cfg);
    CliError::ProfileNotFound {
        name,
        available: if available.is_empty() {
            "(none)".into()
        } else {
            available.join(", ")
        },
    }
}

fn save_config(cfg: &Config) -> Result<std::path::PathBuf, CliError> {
    Ok(config::save_config(cfg)?)
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn prompt_token() -> Result<String, CliError> {
    let token = Password::new()
        .with_prompt("API token")
        .interact()
        .map_err(prompt_err)?;
    if token.is_empty() {
        return Err(CliError::Validation {
            field: "token".into(),
            reason: "token cannot be empty".into(),
        });
    }
    Ok(token)
}

/// Ask for `NAME=ID` workspace pairs until an empty name.
fn prompt_workspaces(profile: &mut Profile) -> Result<(), CliError> {
    eprintln!("   Map workspace names used in graph files to Ardoq workspace ids.");
    eprintln!("   Leave the name empty to finish.");
    loop {
        let name: String = Input::new()
            .with_prompt("Workspace name")
            .allow_empty(true)
            .interact_text()
            .map_err(prompt_err)?;
        if name.is_empty() {
            return Ok(());
        }
        let id: String = Input::new()
            .with_prompt(format!("Workspace id for '{name}'"))
            .interact_text()
            .map_err(prompt_err)?;
        profile.workspaces.insert(name, id);
    }
}

/// Store the token where the user chooses and record the choice on `profile`.
fn prompt_token_storage(profile: &mut Profile, profile_name: &str) -> Result<(), CliError> {
    let choices = &[
        "Store in system keyring (recommended)",
        "Read from an environment variable",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt("Where should the API token live?")
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    match selection {
        0 => {
            let token = prompt_token()?;
            config::store_token(profile_name, &token)?;
            eprintln!("   ✓ Token stored in system keyring");
        }
        1 => {
            let var: String = Input::new()
                .with_prompt("Environment variable")
                .default("AQSYNC_TOKEN".into())
                .interact_text()
                .map_err(prompt_err)?;
            profile.token_env = Some(var);
        }
        _ => profile.token = Some(prompt_token()?),
    }
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(),

        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            let out = render_config(global.output, &redacted(&cfg))?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: aqsync config init");
                return Ok(());
            }
            let default = cfg.active_profile_name();
            for name in sorted_names(&cfg) {
                let profile = &cfg.profiles[name];
                let marker = if name == default { "*" } else { " " };
                println!("{marker} {name}\t{} ({})", profile.url, profile.org);
            }
            Ok(())
        }

        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();
            if !cfg.profiles.contains_key(&name) {
                return Err(profile_not_found(&cfg, name));
            }
            cfg.default_profile = Some(name.clone());
            save_config(&cfg)?;
            if !global.quiet {
                eprintln!("✓ Default profile set to '{name}'");
            }
            Ok(())
        }

        ConfigCommand::SetToken { profile } => {
            let cfg = config::load_config_or_default();
            let profile_name = profile.unwrap_or_else(|| config::active_profile_name(global, &cfg));
            if !cfg.profiles.contains_key(&profile_name) {
                return Err(profile_not_found(&cfg, profile_name));
            }
            let token = prompt_token()?;
            config::store_token(&profile_name, &token)?;
            if !global.quiet {
                eprintln!("✓ Token for '{profile_name}' stored in system keyring");
            }
            Ok(())
        }
    }
}

/// Interactive wizard: adds one profile to the (possibly new) config file.
fn init() -> Result<(), CliError> {
    let mut cfg = config::load_config_or_default();
    eprintln!("aqsync configuration wizard");
    eprintln!("   Config path: {}\n", config::config_path().display());

    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default("default".into())
        .interact_text()
        .map_err(prompt_err)?;

    let url: String = Input::new()
        .with_prompt("Ardoq URL")
        .default("https://app.ardoq.com".into())
        .interact_text()
        .map_err(prompt_err)?;

    let org: String = Input::new()
        .with_prompt("Organization label")
        .interact_text()
        .map_err(prompt_err)?;

    let mut profile = Profile {
        url,
        org,
        ..Profile::default()
    };
    prompt_workspaces(&mut profile)?;
    prompt_token_storage(&mut profile, &profile_name)?;

    cfg.profiles.insert(profile_name.clone(), profile);
    if !cfg.profiles.contains_key(cfg.active_profile_name()) {
        cfg.default_profile = Some(profile_name.clone());
    }

    let path = save_config(&cfg)?;
    eprintln!("\n✓ Configuration written to {}", path.display());
    eprintln!("  Default profile: {}", cfg.active_profile_name());
    eprintln!("\n  Try it: aqsync -p {profile_name} plan graph.json");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config_with_token() -> Config {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "prod".into(),
            Profile {
                url: "https://acme.ardoq.com".into(),
                org: "acme".into(),
                token: Some("s3cret".into()),
                ..Profile::default()
            },
        );
        cfg
    }

    #[test]
    fn show_masks_plaintext_tokens() {
        let out = render_config(OutputFormat::Table, &redacted(&config_with_token())).unwrap();
        assert!(out.contains(MASK));
        assert!(!out.contains("s3cret"));
    }

    #[test]
    fn unknown_profile_lists_available() {
        let err = profile_not_found(&config_with_token(), "staging".into());
        match err {
            CliError::ProfileNotFound { name, available } => {
                assert_eq!(name, "staging");
                assert_eq!(available, "prod");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
