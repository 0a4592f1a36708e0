//! The `status` command: list applied vs. pending changesets.

use std::collections::BTreeMap;

use async_trait::async_trait;
use stratum_core::{Config, StratumResult};
use stratum_migrations::Ledger;

use crate::command::ManagementCommand;
use crate::commands::open_engine;

/// Lists every known changeset with its state: applied, pending, or drifted.
///
/// Unlike planning, `status` reports drift and orphaned ledger rows instead
/// of failing, so operators can inspect a broken history before fixing it.
pub struct StatusCommand;

#[async_trait]
impl ManagementCommand for StatusCommand {
    fn name(&self) -> &'static str {
        "status"
    }

    fn help(&self) -> &'static str {
        "Show applied and pending changesets"
    }

    async fn handle(&self, _matches: &clap::ArgMatches, config: &Config) -> StratumResult<()> {
        let (registry, backend) = open_engine(config).await?;
        let entries = Ledger::entries(backend.as_ref()).await?;
        let by_version: BTreeMap<_, _> = entries
            .iter()
            .map(|e| (e.version.clone(), e))
            .collect();

        let mut applied = 0_usize;
        let mut pending = 0_usize;
        for changeset in registry.changesets() {
            match by_version.get(&changeset.version) {
                Some(entry) if entry.checksum == changeset.checksum() => {
                    applied += 1;
                    println!("[applied] {} ({})", changeset.version, entry.applied_at);
                }
                Some(_) => {
                    applied += 1;
                    println!("[drifted] {} (content changed since apply)", changeset.version);
                }
                None => {
                    pending += 1;
                    println!("[pending] {}", changeset.version);
                }
            }
        }

        // Ledger rows whose changeset no longer exists in the tree.
        for entry in &entries {
            if registry.get(&entry.version).is_none() {
                println!("[orphaned] {} (not in the registry)", entry.version);
            }
        }

        println!("{applied} applied, {pending} pending, {} known", registry.len());
        Ok(())
    }
}
