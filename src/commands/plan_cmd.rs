//! `plan` command (C4–C7, C3)
//!
//! Resolves adapters, runs the planner, writes the Plan Directory, and
//! configures the selected CI provider. A CI-provider failure is logged and
//! does not fail the command — the plan itself is already durable by the
//! time it runs (spec.md §7).

use tracing::{info, warn};

use crate::config::cli::{GlobalArgs, PlanArgs};
use crate::config::validator;
use crate::plan::writer::write_plan;
use crate::state::ProcessState;

pub async fn execute(global: &GlobalArgs, args: &PlanArgs) -> crate::Result<()> {
    ProcessState::global().set_test_mode(global.test_mode);

    let layout = validator::resolve_layout(global);
    let (planner, inputs, _framework) = validator::build_planner(global, &args.planner)?;
    let plan = planner.plan(&inputs, &layout).await?;

    write_plan(&layout, &plan)?;
    info!(
        worker_count = plan.worker_count,
        skippable_percentage = plan.skippable_percentage,
        plan_dir = %layout.root().display(),
        "plan written"
    );

    let ci_provider = validator::resolve_ci_provider(&args.planner.ci_provider)?;
    if let Err(e) = ci_provider.configure(layout.root(), plan.worker_count) {
        warn!(%e, "CI-provider configuration failed; plan was still written");
    }

    Ok(())
}
