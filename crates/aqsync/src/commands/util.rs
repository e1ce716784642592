//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::path::Path;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;

use aqsync_core::{FieldDefinition, Graph};

use crate::error::CliError;

/// Parsed graph file: the graph plus the custom fields its models need.
#[derive(Debug, Default, Deserialize)]
pub struct GraphFile {
    #[serde(flatten)]
    pub graph: Graph,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

/// Read a graph file. YAML when the extension is `.yaml`/`.yml`, JSON otherwise.
pub fn read_graph_file(path: &Path) -> Result<GraphFile, CliError> {
    let graph_err = |reason: String| CliError::GraphFile {
        path: path.display().to_string(),
        reason,
    };

    let contents = std::fs::read_to_string(path).map_err(|e| graph_err(e.to_string()))?;
    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    if is_yaml {
        serde_yaml::from_str(&contents).map_err(|e| graph_err(format!("invalid YAML: {e}")))
    } else {
        serde_json::from_str(&contents).map_err(|e| graph_err(format!("invalid JSON: {e}")))
    }
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal to prompt on, `--yes` is required.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Spinner on stderr while a long call runs; `None` in quiet mode.
pub fn spinner(message: &'static str, quiet: bool) -> Option<ProgressBar> {
    if quiet {
        return None;
    }
    let bar = ProgressBar::new_spinner();
    bar.set_style(ProgressStyle::default_spinner());
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));
    Some(bar)
}
