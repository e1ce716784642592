//! `aqsync apply`: plan, confirm, then make the remote graph match.

use aqsync_core::{ArdoqClient, Syncer};

use crate::cli::{ApplyArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn handle(
    syncer: &Syncer<ArdoqClient>,
    args: ApplyArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let file = util::read_graph_file(&args.graph)?;

    let progress = util::spinner("Reading remote workspaces...", global.quiet);
    let plan = syncer.plan(&file.graph, &file.fields).await;
    if let Some(bar) = progress {
        bar.finish_and_clear();
    }
    let plan = plan?;

    let color = output::should_color(global.color);
    output::print_output(
        &output::render_plan(global.output, &plan.diff, color)?,
        global.quiet,
    );
    if plan.is_empty() {
        return Ok(());
    }

    if !util::confirm("Apply these changes?", "apply", global.yes)? {
        if !global.quiet {
            eprintln!("Apply cancelled.");
        }
        return Ok(());
    }

    let progress = util::spinner("Applying changes...", global.quiet);
    let report = syncer.apply(plan).await;
    if let Some(bar) = progress {
        bar.finish_and_clear();
    }
    let report = report?;

    output::print_output(&output::render_report(global.output, &report)?, global.quiet);
    Ok(())
}
