//! Plan computation.
//!
//! The [`Planner`] turns "where the database is" (ledger entries) and "where
//! it should be" (a [`Target`]) into an ordered [`Plan`] of changesets to
//! apply or revert. Before emitting any plan it verifies two invariants:
//!
//! - every applied version still exists in the registry with an unchanged
//!   checksum (otherwise the history has drifted);
//! - the applied set is a contiguous prefix of the registry's version order
//!   (a gap means a revert or deletion happened outside the engine).
//!
//! Revert plans always cover the full applied suffix above the target, so a
//! plan can never introduce a gap of its own.

use std::collections::BTreeSet;

use stratum_core::{StratumError, StratumResult};

use crate::changeset::Version;
use crate::ledger::LedgerEntry;
use crate::registry::Registry;

/// Where an invocation should take the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Apply everything not yet applied.
    Latest,
    /// Revert everything.
    Zero,
    /// Apply forward until the given version is applied (inclusive).
    UpTo(Version),
    /// Revert until the given version is the newest applied (exclusive).
    DownTo(Version),
}

/// The direction of one plan step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Apply the changeset's forward operations.
    Up,
    /// Apply the changeset's derived backward operations.
    Down,
}

/// One step of a plan: a changeset and a direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanStep {
    /// The changeset version.
    pub version: Version,
    /// Whether to apply or revert it.
    pub direction: Direction,
}

/// An ordered, computed sequence of steps for one invocation.
///
/// Plans are never persisted; a plan is owned by a single executor run and
/// discarded afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    /// The steps, in execution order.
    pub steps: Vec<PlanStep>,
}

impl Plan {
    /// Whether there is nothing to do.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }
}

/// Computes plans against one registry.
pub struct Planner<'a> {
    registry: &'a Registry,
}

impl<'a> Planner<'a> {
    /// Creates a planner over the given registry.
    pub fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    /// Computes the plan that takes the database from the ledger state to
    /// the target.
    ///
    /// An already-satisfied target yields an empty plan, which is a
    /// successful no-op, not an error.
    pub fn plan(&self, ledger: &[LedgerEntry], target: &Target) -> StratumResult<Plan> {
        let applied = self.verify(ledger)?;

        let steps = match target {
            Target::Latest => self.up_steps(&applied, None),
            Target::UpTo(version) => {
                self.require_known(version)?;
                self.up_steps(&applied, Some(version))
            }
            Target::Zero => self.down_steps(&applied, None)?,
            Target::DownTo(version) => {
                self.require_known(version)?;
                self.down_steps(&applied, Some(version))?
            }
        };

        Ok(Plan { steps })
    }

    /// Checks the ledger against the registry: no unknown applied versions,
    /// no checksum drift, and the applied set is a contiguous prefix.
    ///
    /// Returns the applied version set.
    pub fn verify(&self, ledger: &[LedgerEntry]) -> StratumResult<BTreeSet<Version>> {
        let mut applied = BTreeSet::new();
        for entry in ledger {
            let changeset = self.registry.get(&entry.version).ok_or_else(|| {
                StratumError::InvalidPlan(format!(
                    "applied version {} is missing from the registry",
                    entry.version
                ))
            })?;
            let current = changeset.checksum();
            if current != entry.checksum {
                return Err(StratumError::Drift {
                    version: entry.version.to_string(),
                    ledger: entry.checksum.clone(),
                    registry: current,
                });
            }
            applied.insert(entry.version.clone());
        }

        let mut seen_unapplied: Option<&Version> = None;
        for changeset in self.registry.changesets() {
            if applied.contains(&changeset.version) {
                if let Some(gap) = seen_unapplied {
                    return Err(StratumError::InvalidPlan(format!(
                        "applied versions are not contiguous: {} is applied but {gap} is not",
                        changeset.version
                    )));
                }
            } else if seen_unapplied.is_none() {
                seen_unapplied = Some(&changeset.version);
            }
        }

        Ok(applied)
    }

    fn require_known(&self, version: &Version) -> StratumResult<()> {
        if self.registry.contains(version) {
            Ok(())
        } else {
            Err(StratumError::UnknownVersion(version.to_string()))
        }
    }

    /// Forward steps: every unapplied changeset up to and including `until`
    /// (or all of them), ascending.
    fn up_steps(&self, applied: &BTreeSet<Version>, until: Option<&Version>) -> Vec<PlanStep> {
        self.registry
            .changesets()
            .iter()
            .filter(|cs| !applied.contains(&cs.version))
            .filter(|cs| until.map_or(true, |u| cs.version <= *u))
            .map(|cs| PlanStep {
                version: cs.version.clone(),
                direction: Direction::Up,
            })
            .collect()
    }

    /// Backward steps: every applied changeset above `above` (or all of
    /// them), descending. Refuses irreversible changesets.
    fn down_steps(
        &self,
        applied: &BTreeSet<Version>,
        above: Option<&Version>,
    ) -> StratumResult<Vec<PlanStep>> {
        let mut steps = Vec::new();
        for changeset in self.registry.changesets().iter().rev() {
            if !applied.contains(&changeset.version) {
                continue;
            }
            if above.is_some_and(|a| changeset.version <= *a) {
                continue;
            }
            if !changeset.is_reversible() {
                return Err(StratumError::IrreversibleChangeSet(
                    changeset.version.to_string(),
                ));
            }
            steps.push(PlanStep {
                version: changeset.version.clone(),
                direction: Direction::Down,
            });
        }
        Ok(steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changeset::ChangeSet;
    use crate::operation::Operation;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    fn cs(version: &str) -> ChangeSet {
        ChangeSet::new(version)
            .unwrap()
            .add_operation(Operation::raw("SELECT 1", "SELECT 1"))
    }

    fn entry(changeset: &ChangeSet) -> LedgerEntry {
        LedgerEntry {
            version: changeset.version.clone(),
            applied_at: "2026-02-07T00:57:36Z".into(),
            checksum: changeset.checksum(),
        }
    }

    fn three_changesets() -> Registry {
        Registry::new(vec![
            cs("20260207005736_first"),
            cs("20260209204235_second"),
            cs("20260213151935_third"),
        ])
        .unwrap()
    }

    #[test]
    fn test_latest_from_empty() {
        let registry = three_changesets();
        let plan = Planner::new(&registry).plan(&[], &Target::Latest).unwrap();
        assert_eq!(plan.len(), 3);
        assert!(plan.steps.iter().all(|s| s.direction == Direction::Up));
        assert_eq!(plan.steps[0].version, v("20260207005736_first"));
        assert_eq!(plan.steps[2].version, v("20260213151935_third"));
    }

    #[test]
    fn test_latest_already_satisfied_is_empty() {
        let registry = three_changesets();
        let ledger: Vec<LedgerEntry> = registry.changesets().iter().map(entry).collect();
        let plan = Planner::new(&registry)
            .plan(&ledger, &Target::Latest)
            .unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn test_latest_partial() {
        let registry = three_changesets();
        let ledger = vec![entry(&registry.changesets()[0])];
        let plan = Planner::new(&registry)
            .plan(&ledger, &Target::Latest)
            .unwrap();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.steps[0].version, v("20260209204235_second"));
    }

    #[test]
    fn test_up_to_stops_at_target() {
        let registry = three_changesets();
        let plan = Planner::new(&registry)
            .plan(&[], &Target::UpTo(v("20260209204235_second")))
            .unwrap();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.steps[1].version, v("20260209204235_second"));
    }

    #[test]
    fn test_zero_reverts_everything_descending() {
        let registry = three_changesets();
        let ledger: Vec<LedgerEntry> = registry.changesets().iter().map(entry).collect();
        let plan = Planner::new(&registry).plan(&ledger, &Target::Zero).unwrap();
        assert_eq!(plan.len(), 3);
        assert!(plan.steps.iter().all(|s| s.direction == Direction::Down));
        assert_eq!(plan.steps[0].version, v("20260213151935_third"));
        assert_eq!(plan.steps[2].version, v("20260207005736_first"));
    }

    #[test]
    fn test_down_to_reverts_suffix_only() {
        let registry = three_changesets();
        let ledger: Vec<LedgerEntry> = registry.changesets().iter().map(entry).collect();
        let plan = Planner::new(&registry)
            .plan(&ledger, &Target::DownTo(v("20260207005736_first")))
            .unwrap();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.steps[0].version, v("20260213151935_third"));
        assert_eq!(plan.steps[1].version, v("20260209204235_second"));
    }

    #[test]
    fn test_down_to_unapplied_target_is_noop() {
        let registry = three_changesets();
        let ledger = vec![entry(&registry.changesets()[0])];
        let plan = Planner::new(&registry)
            .plan(&ledger, &Target::DownTo(v("20260209204235_second")))
            .unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn test_unknown_target_version() {
        let registry = three_changesets();
        let err = Planner::new(&registry)
            .plan(&[], &Target::UpTo(v("20990101000000_nope")))
            .unwrap_err();
        assert!(matches!(err, StratumError::UnknownVersion(_)));

        let err = Planner::new(&registry)
            .plan(&[], &Target::DownTo(v("20990101000000_nope")))
            .unwrap_err();
        assert!(matches!(err, StratumError::UnknownVersion(_)));
    }

    #[test]
    fn test_applied_version_missing_from_registry() {
        let registry = three_changesets();
        let stranger = cs("20250101000000_deleted_from_tree");
        let err = Planner::new(&registry)
            .plan(&[entry(&stranger)], &Target::Latest)
            .unwrap_err();
        assert!(matches!(err, StratumError::InvalidPlan(_)));
    }

    #[test]
    fn test_gap_in_applied_set() {
        let registry = three_changesets();
        // first and third applied, second not: a hole in the history.
        let ledger = vec![
            entry(&registry.changesets()[0]),
            entry(&registry.changesets()[2]),
        ];
        let err = Planner::new(&registry)
            .plan(&ledger, &Target::Latest)
            .unwrap_err();
        assert!(matches!(err, StratumError::InvalidPlan(_)));
    }

    #[test]
    fn test_checksum_drift_detected() {
        let registry = three_changesets();
        let mut drifted = entry(&registry.changesets()[0]);
        drifted.checksum = "0000000000000000".into();
        let err = Planner::new(&registry)
            .plan(&[drifted], &Target::Latest)
            .unwrap_err();
        assert!(matches!(err, StratumError::Drift { .. }));
    }

    #[test]
    fn test_down_refuses_irreversible() {
        let irreversible = ChangeSet::new("20260209204235_one_way")
            .unwrap()
            .add_operation(Operation::raw_irreversible("VACUUM"));
        let registry =
            Registry::new(vec![cs("20260207005736_first"), irreversible.clone()]).unwrap();
        let ledger = vec![entry(&registry.changesets()[0]), entry(&irreversible)];
        let err = Planner::new(&registry).plan(&ledger, &Target::Zero).unwrap_err();
        assert!(matches!(err, StratumError::IrreversibleChangeSet(_)));
    }

    #[test]
    fn test_irreversible_does_not_block_up_plans() {
        let irreversible = ChangeSet::new("20260209204235_one_way")
            .unwrap()
            .add_operation(Operation::raw_irreversible("VACUUM"));
        let registry = Registry::new(vec![irreversible]).unwrap();
        let plan = Planner::new(&registry).plan(&[], &Target::Latest).unwrap();
        assert_eq!(plan.len(), 1);
    }

    #[test]
    fn test_down_to_below_irreversible_suffix_fails() {
        // Reverting past an irreversible changeset must fail even when other
        // steps in the suffix are reversible.
        let first = cs("20260207005736_first");
        let one_way = ChangeSet::new("20260209204235_one_way")
            .unwrap()
            .add_operation(Operation::raw_irreversible("VACUUM"));
        let third = cs("20260213151935_third");
        let registry = Registry::new(vec![first.clone(), one_way.clone(), third.clone()]).unwrap();
        let ledger = vec![entry(&first), entry(&one_way), entry(&third)];
        let err = Planner::new(&registry)
            .plan(&ledger, &Target::DownTo(v("20260207005736_first")))
            .unwrap_err();
        assert!(matches!(err, StratumError::IrreversibleChangeSet(_)));
    }
}
