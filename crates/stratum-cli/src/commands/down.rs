//! The `down` command: revert applied changesets.

use async_trait::async_trait;
use stratum_core::{Config, StratumError, StratumResult};
use stratum_migrations::{Target, Version};

use crate::command::ManagementCommand;
use crate::commands::{open_engine, plan_and_run};

/// Reverts applied changesets down to a target version, or all of them.
pub struct DownCommand;

#[async_trait]
impl ManagementCommand for DownCommand {
    fn name(&self) -> &'static str {
        "down"
    }

    fn help(&self) -> &'static str {
        "Revert applied changesets"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(
            clap::Arg::new("to")
                .long("to")
                .value_name("VERSION")
                .help("Revert changesets newer than this version")
                .conflicts_with("all"),
        )
        .arg(
            clap::Arg::new("all")
                .long("all")
                .action(clap::ArgAction::SetTrue)
                .help("Revert every applied changeset"),
        )
    }

    async fn handle(&self, matches: &clap::ArgMatches, config: &Config) -> StratumResult<()> {
        let target = match (matches.get_one::<String>("to"), matches.get_flag("all")) {
            (Some(raw), false) => Target::DownTo(Version::parse(raw)?),
            (None, true) => Target::Zero,
            (None, false) => {
                return Err(StratumError::Planning(
                    "down requires --to VERSION or --all".to_string(),
                ))
            }
            (Some(_), true) => unreachable!("clap rejects --to with --all"),
        };

        let (registry, backend) = open_engine(config).await?;
        let report = plan_and_run(config, &registry, backend.as_ref(), &target).await?;
        if report.interrupted {
            tracing::warn!(
                "interrupted after reverting {} changeset(s)",
                report.reverted.len()
            );
        } else {
            tracing::info!("reverted {} changeset(s)", report.reverted.len());
        }
        Ok(())
    }
}
