//! Built-in commands: `up`, `down`, `status`.

pub mod down;
pub mod status;
pub mod up;

use std::sync::atomic::Ordering;
use std::time::Duration;

use stratum_core::{Config, StratumResult};
use stratum_db::DatabaseBackend;
use stratum_migrations::{
    editor_for_vendor, ChangeSetLoader, ExecutionReport, Executor, ExecutorOptions, Ledger, Plan,
    Planner, Registry, Target,
};

use crate::command::CommandRegistry;

pub use down::DownCommand;
pub use status::StatusCommand;
pub use up::UpCommand;

/// Registers the built-in commands.
pub fn register_builtin_commands(registry: &mut CommandRegistry) {
    registry.register(Box::new(UpCommand));
    registry.register(Box::new(DownCommand));
    registry.register(Box::new(StatusCommand));
}

/// Loads the registry and opens the configured database connection.
pub(crate) async fn open_engine(
    config: &Config,
) -> StratumResult<(Registry, Box<dyn DatabaseBackend>)> {
    let registry = ChangeSetLoader::new(&config.migrations_dir).load()?;
    let backend = stratum_db::connect(config.require_database_url()?).await?;
    Ok((registry, backend))
}

/// Plans for the given target and executes the plan, with Ctrl-C honored at
/// changeset boundaries.
pub(crate) async fn plan_and_run(
    config: &Config,
    registry: &Registry,
    backend: &dyn DatabaseBackend,
    target: &Target,
) -> StratumResult<ExecutionReport> {
    let ledger = Ledger::entries(backend).await?;
    let plan = Planner::new(registry).plan(&ledger, target)?;
    describe_plan(&plan);

    let editor = editor_for_vendor(backend.vendor())?;
    let executor = Executor::new(
        backend,
        editor,
        ExecutorOptions {
            statement_timeout: Duration::from_secs(config.statement_timeout_secs),
            lock_wait: Duration::from_secs(config.lock_wait_secs),
        },
    );

    let cancel = executor.cancel_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received; finishing the current changeset");
            cancel.store(true, Ordering::SeqCst);
        }
    });

    executor.run(registry, &plan).await
}

/// Logs the plan before execution.
fn describe_plan(plan: &Plan) {
    if plan.is_empty() {
        tracing::info!("nothing to do");
        return;
    }
    tracing::info!("planned {} changeset(s)", plan.len());
    for step in &plan.steps {
        let direction = match step.direction {
            stratum_migrations::Direction::Up => "apply",
            stratum_migrations::Direction::Down => "revert",
        };
        tracing::info!("  {direction} {}", step.version);
    }
}
