//! testoptimizer CLI entry point

use clap::Parser;

use testoptimizer::cancel::CancellationToken;
use testoptimizer::commands::{plan_cmd, run_cmd};
use testoptimizer::config::cli::{Cli, Command, GlobalArgs};
use testoptimizer::config::init_tracing;
use testoptimizer::error::{ConfigError, EnvironmentError, PlanCorruption};

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.global.log_level);

    let runtime = tokio::runtime::Runtime::new().expect("failed to start tokio runtime");
    let result = runtime.block_on(run(cli));

    if let Err(e) = result {
        tracing::error!(%e, "fatal error");
        std::process::exit(exit_code(&e));
    }
}

async fn run(cli: Cli) -> testoptimizer::Result<()> {
    match cli.command {
        Command::Plan(args) => plan_cmd::execute(&cli.global, &args).await,
        Command::Run(args) => run_with_cancellation(&cli.global, &args).await,
    }
}

async fn run_with_cancellation(
    global: &GlobalArgs,
    args: &testoptimizer::config::cli::RunArgs,
) -> testoptimizer::Result<()> {
    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        tracing::warn!("shutdown signal received; cancelling in-flight workers");
        signal_cancel.cancel();
    });

    run_cmd::execute(global, args, cancel).await
}

/// Resolves on SIGINT or (on Unix) SIGTERM, whichever comes first.
async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm =
            signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

/// Maps the leaf error kind to a process exit code (spec.md §7):
/// `ConfigError`/`PlanCorruption` -> 2, `EnvironmentError` -> 3, everything
/// else fatal -> 1. Walks the whole source chain since `PlannerError` wraps
/// its causes as `#[error(transparent)]` rather than re-exposing them at the
/// top level.
fn exit_code(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if cause.downcast_ref::<ConfigError>().is_some()
            || cause.downcast_ref::<PlanCorruption>().is_some()
        {
            return 2;
        }
        if cause.downcast_ref::<EnvironmentError>().is_some() {
            return 3;
        }
    }
    1
}
