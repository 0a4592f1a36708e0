//! The `up` command: apply pending changesets.

use async_trait::async_trait;
use stratum_core::{Config, StratumResult};
use stratum_migrations::{Target, Version};

use crate::command::ManagementCommand;
use crate::commands::{open_engine, plan_and_run};

/// Applies pending changesets, optionally stopping at a target version.
pub struct UpCommand;

#[async_trait]
impl ManagementCommand for UpCommand {
    fn name(&self) -> &'static str {
        "up"
    }

    fn help(&self) -> &'static str {
        "Apply pending changesets"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(
            clap::Arg::new("to")
                .long("to")
                .value_name("VERSION")
                .help("Stop after applying this version"),
        )
    }

    async fn handle(&self, matches: &clap::ArgMatches, config: &Config) -> StratumResult<()> {
        let target = match matches.get_one::<String>("to") {
            Some(raw) => Target::UpTo(Version::parse(raw)?),
            None => Target::Latest,
        };

        let (registry, backend) = open_engine(config).await?;
        if registry.is_empty() {
            tracing::info!("no changesets found in {}", config.migrations_dir.display());
            return Ok(());
        }

        let report = plan_and_run(config, &registry, backend.as_ref(), &target).await?;
        if report.interrupted {
            tracing::warn!(
                "interrupted after applying {} changeset(s)",
                report.applied.len()
            );
        } else {
            tracing::info!("applied {} changeset(s)", report.applied.len());
        }
        Ok(())
    }
}
