//! `aqsync plan`: fetch, diff, print. Never mutates the remote side.

use aqsync_core::{ArdoqClient, Syncer};

use crate::cli::{GlobalOpts, PlanArgs};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn handle(
    syncer: &Syncer<ArdoqClient>,
    args: PlanArgs,
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
    let rendered = output::render_plan(global.output, &plan.diff, color)?;
    output::print_output(&rendered, global.quiet);
    Ok(())
}
