//! Diagnoser: leave-one-constraint-group-out infeasibility classification
//! (§4.4). Not a true IIS computation — a fixed, heuristic pattern match
//! over which single-group removals restore feasibility.

use std::collections::HashMap;
use std::fmt;

use crate::model::{build_excluding, ConstraintGroup};
use crate::solve::{solve, SolveConfig, SolveOutcome};
use crate::types::{ModellerConfig, PipelineConfig};

/// Result of the leave-one-group-out procedure: which groups' removal
/// restored feasibility, and the resulting classification.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnosis {
    pub per_group_feasible: HashMap<ConstraintGroup, bool>,
    pub condition: &'static str,
}

impl fmt::Display for Diagnosis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.condition)
    }
}

/// Worker-count knob (§9, "Diagnoser parallelism"). `parallel = true` only
/// takes effect when the crate is built with the `parallel-diagnosis`
/// feature; otherwise probes still run sequentially, in the §4.4 step 1
/// enumeration order, for deterministic logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiagnoserConfig {
    pub parallel: bool,
}

fn probe_feasible(
    group: ConstraintGroup,
    input: &crate::types::ModelInput,
    modeller_cfg: &ModellerConfig,
    pipeline_cfg: &PipelineConfig,
    solve_cfg: &SolveConfig,
) -> bool {
    let excluded = std::collections::HashSet::from([group]);
    let spec = build_excluding(input, modeller_cfg, pipeline_cfg, &excluded);
    match solve(spec, input, solve_cfg) {
        SolveOutcome::Optimal(_) => {
            tracing::info!(group = %group, "probe restored feasibility");
            true
        }
        SolveOutcome::SolverError(err) => {
            // A broken probe must not prevent classification (§4.4,
            // "Failure semantics"); treated as still infeasible.
            tracing::warn!(group = %group, error = %err, "probe solver error, treated infeasible");
            false
        }
        _ => {
            tracing::info!(group = %group, "probe still infeasible");
            false
        }
    }
}

/// Run the leave-one-group-out procedure and classify the result (§4.4).
#[tracing::instrument(skip_all)]
pub fn diagnose(
    input: &crate::types::ModelInput,
    modeller_cfg: &ModellerConfig,
    pipeline_cfg: &PipelineConfig,
    solve_cfg: &SolveConfig,
    diag_cfg: &DiagnoserConfig,
) -> Diagnosis {
    let groups = ConstraintGroup::ALL;

    #[cfg(feature = "parallel-diagnosis")]
    let results: Vec<(ConstraintGroup, bool)> = if diag_cfg.parallel {
        use rayon::prelude::*;
        groups
            .par_iter()
            .map(|&g| (g, probe_feasible(g, input, modeller_cfg, pipeline_cfg, solve_cfg)))
            .collect()
    } else {
        groups
            .iter()
            .map(|&g| (g, probe_feasible(g, input, modeller_cfg, pipeline_cfg, solve_cfg)))
            .collect()
    };

    #[cfg(not(feature = "parallel-diagnosis"))]
    let results: Vec<(ConstraintGroup, bool)> = {
        let _ = diag_cfg;
        groups
            .iter()
            .map(|&g| (g, probe_feasible(g, input, modeller_cfg, pipeline_cfg, solve_cfg)))
            .collect()
    };

    let per_group_feasible: HashMap<ConstraintGroup, bool> = results.into_iter().collect();
    let condition = classify(&per_group_feasible);
    tracing::warn!(condition, "infeasibility classified");

    Diagnosis {
        per_group_feasible,
        condition,
    }
}

/// "Exactly" means feasible for every group in `pattern`, and infeasible for
/// every *core* group not in `pattern` (§4.4 step 4). Mirrors
/// `original_source/optimisation.py::_condition`, which checks `all(
/// constraint_status[c] for c in _constraints)` together with `all(not
/// constraint_status[c] for c in CONSTRAINT_NAMES if c not in _constraints)`
/// — the second clause ranges only over `CONSTRAINT_NAMES`
/// ([`ConstraintGroup::CORE`]), not the full ten-group enumeration, so the
/// four block-loading groups never spoil a core-pattern match.
fn exactly(map: &HashMap<ConstraintGroup, bool>, pattern: &[ConstraintGroup]) -> bool {
    let all_pattern_feasible = pattern.iter().all(|g| map.get(g).copied().unwrap_or(false));
    let core_rest_infeasible = ConstraintGroup::CORE
        .iter()
        .all(|g| pattern.contains(g) || !map.get(g).copied().unwrap_or(false));
    all_pattern_feasible && core_rest_infeasible
}

fn classify(map: &HashMap<ConstraintGroup, bool>) -> &'static str {
    use ConstraintGroup::*;

    if exactly(map, &[MaxPower, Demand]) {
        "Insufficient available power to meet demand."
    } else if exactly(map, &[CoolDown]) {
        "Generators cannot cool down in time."
    } else if exactly(map, &[InitialCondition, TargetDemand, DemandIncrease]) {
        "Cannot achieve block loading in time for targets."
    } else if exactly(map, &[StartUp]) {
        "Generators cannot start up in time."
    } else if exactly(map, &[Status]) {
        "Cannot enforce status variable."
    } else {
        "UNKNOWN infeasibility condition."
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feasible_only(groups: &[ConstraintGroup]) -> HashMap<ConstraintGroup, bool> {
        ConstraintGroup::ALL
            .iter()
            .map(|&g| (g, groups.contains(&g)))
            .collect()
    }

    #[test]
    fn classifies_insufficient_power() {
        let map = feasible_only(&[ConstraintGroup::MaxPower, ConstraintGroup::Demand]);
        assert_eq!(classify(&map), "Insufficient available power to meet demand.");
    }

    #[test]
    fn classifies_cool_down() {
        let map = feasible_only(&[ConstraintGroup::CoolDown]);
        assert_eq!(classify(&map), "Generators cannot cool down in time.");
    }

    #[test]
    fn classifies_block_loading() {
        let map = feasible_only(&[
            ConstraintGroup::InitialCondition,
            ConstraintGroup::TargetDemand,
            ConstraintGroup::DemandIncrease,
        ]);
        assert_eq!(classify(&map), "Cannot achieve block loading in time for targets.");
    }

    #[test]
    fn classifies_start_up() {
        let map = feasible_only(&[ConstraintGroup::StartUp]);
        assert_eq!(classify(&map), "Generators cannot start up in time.");
    }

    #[test]
    fn classifies_status() {
        let map = feasible_only(&[ConstraintGroup::Status]);
        assert_eq!(classify(&map), "Cannot enforce status variable.");
    }

    #[test]
    fn falls_back_to_unknown_on_ambiguous_pattern() {
        let map = feasible_only(&[ConstraintGroup::MaxPower, ConstraintGroup::CoolDown]);
        assert_eq!(classify(&map), "UNKNOWN infeasibility condition.");
    }

    #[test]
    fn all_feasible_does_not_match_any_named_pattern() {
        let map = feasible_only(&ConstraintGroup::ALL);
        assert_eq!(classify(&map), "UNKNOWN infeasibility condition.");
    }
}
