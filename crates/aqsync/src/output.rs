//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders plans and apply reports in the format selected by `--output`.
//! Table uses `tabled`, structured formats use serde, plain emits one
//! change per line.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use aqsync_core::model::LocalReference;
use aqsync_core::{ApplyReport, Diff, DiffSummary};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

// ── Plan rendering ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Create,
    Update,
    Delete,
}

impl Action {
    fn symbol(self) -> &'static str {
        match self {
            Self::Create => "+",
            Self::Update => "~",
            Self::Delete => "-",
        }
    }

    fn paint(self, color: bool) -> String {
        let symbol = self.symbol();
        if !color {
            return symbol.to_owned();
        }
        match self {
            Self::Create => symbol.green().to_string(),
            Self::Update => symbol.yellow().to_string(),
            Self::Delete => symbol.red().to_string(),
        }
    }
}

/// One line of a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Change {
    action: Action,
    workspace: String,
    kind: &'static str,
    id: String,
    detail: String,
}

#[derive(Tabled)]
struct ChangeRow {
    #[tabled(rename = "")]
    action: String,
    #[tabled(rename = "Workspace")]
    workspace: String,
    #[tabled(rename = "Kind")]
    kind: &'static str,
    #[tabled(rename = "Id")]
    id: String,
    #[tabled(rename = "Detail")]
    detail: String,
}

/// Flatten a diff into display lines, types and fields first.
fn changes(diff: &Diff) -> Vec<Change> {
    let mut out = Vec::new();
    let mut push = |action, workspace: &str, kind, id: &str, detail: String| {
        out.push(Change {
            action,
            workspace: workspace.to_owned(),
            kind,
            id: id.to_owned(),
            detail,
        });
    };

    for (ws, types) in &diff.component_types {
        for name in &types.new {
            push(Action::Create, ws, "component type", name, String::new());
        }
    }
    for (ws, types) in &diff.reference_types {
        for name in &types.new {
            push(Action::Create, ws, "reference type", name, String::new());
        }
    }
    for (ws, fields) in &diff.fields {
        for field in &fields.new {
            push(
                Action::Create,
                ws,
                "field",
                &field.name,
                format!("{:?} \"{}\"", field.field_type, field.label),
            );
        }
    }
    for (ws, components) in &diff.components {
        for c in &components.new {
            push(Action::Create, ws, "component", &c.custom_id, label(&c.name, &c.type_name));
        }
        for (_, c) in &components.updated {
            push(Action::Update, ws, "component", &c.custom_id, label(&c.name, &c.type_name));
        }
        for c in &components.deleted {
            let id = c.custom_id.as_deref().unwrap_or(&c.id);
            push(Action::Delete, ws, "component", id, label(&c.name, &c.type_name));
        }
    }
    for (ws, references) in &diff.references {
        for r in &references.new {
            push(Action::Create, ws, "reference", &r.custom_id, edge(r));
        }
        for (_, r) in &references.updated {
            push(Action::Update, ws, "reference", &r.custom_id, edge(r));
        }
        for r in &references.deleted {
            let id = r.custom_id.as_deref().unwrap_or(&r.id);
            push(Action::Delete, ws, "reference", id, String::new());
        }
    }

    out
}

fn label(name: &str, type_name: &str) -> String {
    format!("{name} ({type_name})")
}

fn edge(r: &LocalReference) -> String {
    format!("{} -> {} ({})", r.source, r.target, r.type_name)
}

fn summary_line(summary: &DiffSummary) -> String {
    let create = summary.component_types
        + summary.reference_types
        + summary.fields
        + summary.components.new
        + summary.references.new;
    let update = summary.components.updated + summary.references.updated;
    let delete = summary.components.deleted + summary.references.deleted;
    format!("Plan: {create} to create, {update} to update, {delete} to delete.")
}

#[derive(Serialize)]
struct PlanOutput<'a> {
    summary: DiffSummary,
    diff: &'a Diff,
}

/// Render a plan in the chosen format.
pub fn render_plan(format: OutputFormat, diff: &Diff, color: bool) -> Result<String, CliError> {
    let summary = diff.summary();
    match format {
        OutputFormat::Table => {
            if diff.is_empty() {
                return Ok("No changes. Remote workspaces match the graph.".into());
            }
            let rows: Vec<ChangeRow> = changes(diff)
                .into_iter()
                .map(|c| ChangeRow {
                    action: c.action.paint(color),
                    workspace: c.workspace,
                    kind: c.kind,
                    id: c.id,
                    detail: c.detail,
                })
                .collect();
            Ok(format!("{}\n\n{}", render_table(&rows), summary_line(&summary)))
        }
        OutputFormat::Plain => Ok(changes(diff)
            .iter()
            .map(|c| {
                let kind = c.kind.replace(' ', "-");
                format!("{} {kind} {} {}", c.action.symbol(), c.workspace, c.id)
            })
            .collect::<Vec<_>>()
            .join("\n")),
        structured => render_structured(structured, &PlanOutput { summary, diff }),
    }
}

// ── Apply report rendering ───────────────────────────────────────────

#[derive(Tabled)]
struct ReportRow {
    #[tabled(rename = "Operation")]
    operation: &'static str,
    #[tabled(rename = "Count")]
    count: usize,
}

fn report_rows(report: &ApplyReport) -> Vec<ReportRow> {
    let row = |operation, count| ReportRow { operation, count };
    vec![
        row("models updated", report.models_updated),
        row("component types created", report.component_types_created),
        row("reference types created", report.reference_types_created),
        row("fields created", report.fields_created),
        row("components created", report.components_created),
        row("references created", report.references_created),
        row("components updated", report.components_updated),
        row("references updated", report.references_updated),
        row("components deleted", report.components_deleted),
        row("references deleted", report.references_deleted),
        row("references removed by cascade", report.references_cascaded),
    ]
}

/// Render an apply report in the chosen format.
pub fn render_report(format: OutputFormat, report: &ApplyReport) -> Result<String, CliError> {
    match format {
        OutputFormat::Table => Ok(render_table(&report_rows(report))),
        OutputFormat::Plain => Ok(report_rows(report)
            .iter()
            .filter(|r| r.count > 0)
            .map(|r| format!("{}\t{}", r.operation, r.count))
            .collect::<Vec<_>>()
            .join("\n")),
        structured => render_structured(structured, report),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

/// Serialize `data` as JSON (pretty or compact) or YAML.
pub fn render_structured<T: Serialize + ?Sized>(
    format: OutputFormat,
    data: &T,
) -> Result<String, CliError> {
    Ok(match format {
        OutputFormat::JsonCompact => serde_json::to_string(data)?,
        OutputFormat::Yaml => serde_yaml::to_string(data)?,
        _ => serde_json::to_string_pretty(data)?,
    })
}
