//! `run` command (C8–C9)
//!
//! Loads the previously written plan, replanning first if the Plan
//! Directory is missing or incomplete (spec.md §4.7), then dispatches it.

use crate::cancel::CancellationToken;
use crate::config::cli::{GlobalArgs, RunArgs};
use crate::config::validator;
use crate::dispatch::Dispatcher;
use crate::model::RunMode;
use crate::plan::loader;

pub async fn execute(
    global: &GlobalArgs,
    args: &RunArgs,
    cancel: CancellationToken,
) -> crate::Result<()> {
    let layout = validator::resolve_layout(global);

    let (planner, inputs, framework) = validator::build_planner(global, &args.planner)?;
    let worker_count = loader::load_or_replan(&layout, &planner, &inputs).await?;

    let worker_env = validator::worker_env(args)?;
    let command = validator::command_override(args.command.as_deref());
    let dispatcher = Dispatcher::new(layout, framework, worker_env, command);
    let mode = RunMode::from(worker_count, args.ci_node);

    if args.ci_node >= 0 && args.ci_node_workers > 1 {
        dispatcher
            .run_with_sub_sharding(mode, args.ci_node_workers, cancel)
            .await?;
    } else {
        dispatcher.run(mode, cancel).await?;
    }

    Ok(())
}
