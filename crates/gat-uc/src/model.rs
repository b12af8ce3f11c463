//! Modeller: allocates decision variables and emits the named, grouped
//! constraint system plus the lexicographic objective (§4.2).
//!
//! Pure model construction — this module never calls a solver. Constraints
//! are tagged by [`ConstraintGroup`] so the Diagnoser can rebuild the
//! problem with one group's constraints omitted without duplicating the
//! emission logic.

use good_lp::{constraint, variable, Constraint, Expression, ProblemVariables, Variable};
use std::collections::HashSet;
use std::fmt;

use crate::types::{ModelInput, ModellerConfig, PipelineConfig};

/// Stable names for the ten diagnosable constraint groups of §4.2/§4.4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintGroup {
    InitialCondition,
    TargetDemand,
    DemandIncrease,
    DemandDecrease,
    Demand,
    Status,
    MinPower,
    MaxPower,
    StartUp,
    CoolDown,
}

impl ConstraintGroup {
    /// All ten groups, in the enumeration order of §4.4 step 1.
    pub const ALL: [ConstraintGroup; 10] = [
        ConstraintGroup::Demand,
        ConstraintGroup::Status,
        ConstraintGroup::MinPower,
        ConstraintGroup::MaxPower,
        ConstraintGroup::StartUp,
        ConstraintGroup::CoolDown,
        ConstraintGroup::InitialCondition,
        ConstraintGroup::TargetDemand,
        ConstraintGroup::DemandIncrease,
        ConstraintGroup::DemandDecrease,
    ];

    /// The six "core" dispatch/commitment groups the Diagnoser's exclusivity
    /// check ranges over (`original_source/optimisation.py::CONSTRAINT_NAMES`).
    /// The four block-loading groups (`initial-condition`, `target-demand`,
    /// `demand-increase`, `demand-decrease`) are deliberately excluded from
    /// this set: dropping `target-demand` alone trivially restores
    /// feasibility in any checkpoint-bearing problem (it lets `d` collapse
    /// to 0), so requiring those groups to stay infeasible-on-removal would
    /// make the insufficient-capacity/cool-down/start-up/status patterns
    /// unmatchable whenever checkpoints are present.
    pub const CORE: [ConstraintGroup; 6] = [
        ConstraintGroup::Demand,
        ConstraintGroup::Status,
        ConstraintGroup::MinPower,
        ConstraintGroup::MaxPower,
        ConstraintGroup::StartUp,
        ConstraintGroup::CoolDown,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ConstraintGroup::InitialCondition => "initial-condition",
            ConstraintGroup::TargetDemand => "target-demand",
            ConstraintGroup::DemandIncrease => "demand-increase",
            ConstraintGroup::DemandDecrease => "demand-decrease",
            ConstraintGroup::Demand => "demand",
            ConstraintGroup::Status => "status",
            ConstraintGroup::MinPower => "min_power",
            ConstraintGroup::MaxPower => "max_power",
            ConstraintGroup::StartUp => "start_up",
            ConstraintGroup::CoolDown => "cool_down",
        }
    }
}

impl fmt::Display for ConstraintGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A fully constructed MILP, ready to be handed to a back-end.
///
/// `grouped` holds every constraint belonging to one of the ten diagnosable
/// groups; `always_on` holds the objective-linearisation constraints (and,
/// optionally, the strict startup-indicator linkage) that are never subject
/// to leave-one-group-out removal because they are not named groups in
/// §4.2/§4.4.
pub struct ModelSpec {
    pub vars: ProblemVariables,
    pub u: Vec<Vec<Variable>>,
    pub c: Vec<Vec<Variable>>,
    pub p: Vec<Vec<Variable>>,
    pub d: Vec<Variable>,
    pub e: Vec<Variable>,
    pub grouped: Vec<(ConstraintGroup, Constraint)>,
    pub always_on: Vec<Constraint>,
    pub objective: Expression,
}

impl ModelSpec {
    /// Every constraint live in this build: `grouped` (already filtered by
    /// the exclusion set passed to [`build_excluding`]) plus `always_on`.
    pub fn all_constraints(&self) -> Vec<Constraint> {
        self.grouped
            .iter()
            .map(|(_, c)| c.clone())
            .chain(self.always_on.iter().cloned())
            .collect()
    }
}

fn sum_vars<'a>(vars: impl Iterator<Item = &'a Variable>) -> Expression {
    let mut expr = Expression::from(0.0);
    for v in vars {
        expr += *v;
    }
    expr
}

/// Build the model, omitting the constraints of any group in `excluded`.
/// The main solve calls this with an empty exclusion set; the Diagnoser
/// calls it once per group (§4.4 step 2).
pub fn build_excluding(
    input: &ModelInput,
    modeller_cfg: &ModellerConfig,
    pipeline_cfg: &PipelineConfig,
    excluded: &HashSet<ConstraintGroup>,
) -> ModelSpec {
    let n = input.n_units();
    let t_len = input.t_len();

    let mut vars = ProblemVariables::new();

    let u: Vec<Vec<Variable>> = (0..n)
        .map(|_| (0..t_len).map(|_| vars.add(variable().binary())).collect())
        .collect();
    let c: Vec<Vec<Variable>> = (0..n)
        .map(|_| (0..t_len).map(|_| vars.add(variable().binary())).collect())
        .collect();
    // Lower-bounded at 0 only (I1's non-negativity half); the Pmax cap is
    // deliberately left to the named `max_power`/`status` groups below, not
    // baked into the variable's own bound, so that a Diagnoser probe which
    // excludes one of those groups actually relaxes the cap it names.
    let p: Vec<Vec<Variable>> = (0..n)
        .map(|_| (0..t_len).map(|_| vars.add(variable().min(0.0))).collect())
        .collect();
    let d: Vec<Variable> = (0..t_len).map(|_| vars.add(variable().min(0.0))).collect();
    let e: Vec<Variable> = (0..t_len).map(|_| vars.add(variable().min(0.0))).collect();

    let mut grouped: Vec<(ConstraintGroup, Constraint)> = Vec::new();
    let mut always_on: Vec<Constraint> = Vec::new();

    let demand = &input.series.demand_mw;
    let renewable = &input.series.renewable_mw;
    let target_curve = &input.series.target_curve_mw;
    let checkpoints = &input.checkpoints;

    // initial-condition: d[0] = 0
    grouped.push((
        ConstraintGroup::InitialCondition,
        constraint!(d[0] == 0.0),
    ));

    // target-demand: per-checkpoint floor, and hard pin after the last one.
    for cp in checkpoints.iter() {
        grouped.push((
            ConstraintGroup::TargetDemand,
            constraint!(d[cp.t.value()] >= cp.volume_mw),
        ));
    }
    if let Some(last) = checkpoints.last() {
        for t in (last.t.value() + 1)..t_len {
            grouped.push((
                ConstraintGroup::TargetDemand,
                constraint!(d[t] == demand[t]),
            ));
        }
    }

    // demand-increase / demand-decrease: ramp bound up to and including the
    // next checkpoint (or the full horizon if there are no checkpoints at
    // all — §4.2 edge case).
    for t in 0..t_len.saturating_sub(1) {
        let next_checkpoint = checkpoints.next_at_or_after(crate::types::TimestepIndex(t));
        if !checkpoints.is_empty() && next_checkpoint.is_none() {
            continue;
        }
        let block_limit = next_checkpoint
            .map(|cp| cp.block_limit)
            .unwrap_or(input.block_limit);
        grouped.push((
            ConstraintGroup::DemandIncrease,
            constraint!(d[t + 1] - d[t] <= block_limit),
        ));
        grouped.push((
            ConstraintGroup::DemandDecrease,
            constraint!(d[t + 1] - d[t] >= 0.0),
        ));
    }

    // demand balance
    for t in 0..t_len {
        let supply = sum_vars(p.iter().map(|row| &row[t]));
        grouped.push((
            ConstraintGroup::Demand,
            constraint!(supply + renewable[t] >= d[t]),
        ));
    }

    for i in 0..n {
        let unit = input.fleet.get(crate::types::UnitId(i));
        let big_m = if modeller_cfg.tighten_big_m {
            unit.p_max
        } else {
            modeller_cfg.big_m
        };
        let min_on = unit.min_on as usize;
        let min_off = unit.min_off as usize;

        for t in 0..t_len {
            // status: p <= M * u
            grouped.push((
                ConstraintGroup::Status,
                constraint!(p[i][t] <= big_m * u[i][t]),
            ));
            // min_power: p >= Pmin * u
            grouped.push((
                ConstraintGroup::MinPower,
                constraint!(p[i][t] >= unit.p_min * u[i][t]),
            ));
            // max_power: p <= Pmax * u
            grouped.push((
                ConstraintGroup::MaxPower,
                constraint!(p[i][t] <= unit.p_max * u[i][t]),
            ));

            // start_up: aggregate min-up encoding over the rolling window.
            let start_up_sum = if t >= min_on {
                sum_vars(c[i][(t - min_on + 1)..=t].iter())
            } else {
                sum_vars(c[i][0..=t].iter())
            };
            let rhs_coeff = if t >= min_on {
                min_on as f64
            } else {
                (t + 1) as f64
            };
            grouped.push((
                ConstraintGroup::StartUp,
                constraint!(start_up_sum >= rhs_coeff * u[i][t]),
            ));

            // cool_down: only emitted once the rolling window fits (t >= MinOff).
            if t >= min_off {
                let off_sum: Expression = ((t - min_off + 1)..=t)
                    .fold(Expression::from(0.0), |acc, tau| acc + (1.0 - u[i][tau]));
                grouped.push((
                    ConstraintGroup::CoolDown,
                    constraint!(off_sum >= 1.0 - u[i][t]),
                ));
            }
        }

        if pipeline_cfg.strict_startup_indicator {
            // c[i,t] pinned to the exact 0->1 transition of u, rather than
            // only bounded below in aggregate. Not a named diagnostic group
            // (see DESIGN.md, "startup-indicator semantics").
            always_on.push(constraint!(c[i][0] == u[i][0]));
            for t in 1..t_len {
                always_on.push(constraint!(c[i][t] >= u[i][t] - u[i][t - 1]));
                always_on.push(constraint!(c[i][t] <= u[i][t]));
            }
        }
    }

    // Linearise |d[t] - Dtarget[t]| via e[t] >= d[t]-Dtarget[t], e[t] >= Dtarget[t]-d[t].
    for t in 0..t_len {
        always_on.push(constraint!(e[t] >= d[t] - target_curve[t]));
        always_on.push(constraint!(e[t] >= target_curve[t] - d[t]));
    }

    let fuel_scale = if pipeline_cfg.scale_to_mwh { 0.5 } else { 1.0 };
    let mut objective = Expression::from(0.0);
    for t in 0..t_len {
        objective += modeller_cfg.target_penalty_weight * e[t];
        for i in 0..n {
            let unit = input.fleet.get(crate::types::UnitId(i));
            objective += fuel_scale * unit.c_fuel * p[i][t];
            objective += unit.c_start * c[i][t];
        }
    }

    let grouped: Vec<(ConstraintGroup, Constraint)> = grouped
        .into_iter()
        .filter(|(g, _)| !excluded.contains(g))
        .collect();

    ModelSpec {
        vars,
        u,
        c,
        p,
        d,
        e,
        grouped,
        always_on,
        objective,
    }
}
