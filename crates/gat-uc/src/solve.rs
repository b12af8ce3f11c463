//! SolveDriver: hands a constructed model to a MILP back-end, blocks until
//! termination, and exposes primal values only on `optimal` (§4.3).

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use good_lp::{Solution, SolverModel};

use crate::error::SolveError;
use crate::model::ModelSpec;
use crate::solution::PrimalBundle;
use crate::types::{ModelInput, TimestepIndex, UnitId};

/// Candidate MILP back-ends. HiGHS is the default: a true branch-and-cut
/// MIP solver with a pure-Rust-friendly static build. `coin_cbc` is kept
/// for parity with the reference back-end named in the spec; `clarabel` is
/// a continuous-only interior-point solver, useful for relaxation probes
/// but never for the final integer solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LpSolverKind {
    #[cfg(feature = "solver-highs")]
    Highs,
    #[cfg(feature = "solver-coin_cbc")]
    CoinCbc,
    #[cfg(feature = "solver-clarabel")]
    Clarabel,
}

impl LpSolverKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            #[cfg(feature = "solver-highs")]
            LpSolverKind::Highs => "highs",
            #[cfg(feature = "solver-coin_cbc")]
            LpSolverKind::CoinCbc => "coin_cbc",
            #[cfg(feature = "solver-clarabel")]
            LpSolverKind::Clarabel => "clarabel",
        }
    }

    pub fn available() -> &'static [LpSolverKind] {
        &[
            #[cfg(feature = "solver-highs")]
            LpSolverKind::Highs,
            #[cfg(feature = "solver-coin_cbc")]
            LpSolverKind::CoinCbc,
            #[cfg(feature = "solver-clarabel")]
            LpSolverKind::Clarabel,
        ]
    }
}

impl Default for LpSolverKind {
    fn default() -> Self {
        #[cfg(feature = "solver-highs")]
        {
            LpSolverKind::Highs
        }
        #[cfg(all(not(feature = "solver-highs"), feature = "solver-coin_cbc"))]
        {
            LpSolverKind::CoinCbc
        }
        #[cfg(all(
            not(feature = "solver-highs"),
            not(feature = "solver-coin_cbc"),
            feature = "solver-clarabel"
        ))]
        {
            LpSolverKind::Clarabel
        }
    }
}

impl FromStr for LpSolverKind {
    type Err = SolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LpSolverKind::available()
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| SolveError::Backend(format!("unknown solver backend {s:?}")))
    }
}

/// Per-solve tuning: which back-end, and an optional wall-clock budget
/// applied independently to the main solve and to every Diagnoser probe
/// (§5, "Timeouts").
#[derive(Debug, Clone, Copy)]
pub struct SolveConfig {
    pub backend: LpSolverKind,
    pub time_limit: Option<Duration>,
}

impl Default for SolveConfig {
    fn default() -> Self {
        Self {
            backend: LpSolverKind::default(),
            time_limit: None,
        }
    }
}

/// Outcome of a single solve call, covering the status taxonomy of §4.3.
pub enum SolveOutcome {
    Optimal(PrimalBundle),
    Infeasible,
    Unbounded,
    SolverError(SolveError),
    Timeout,
}

fn extract_bundle<S: Solution>(
    solution: &S,
    spec: &ModelSpec,
    input: &ModelInput,
) -> PrimalBundle {
    let n = input.n_units();
    let t_len = input.t_len();

    let mut u = vec![vec![false; t_len]; n];
    let mut c = vec![vec![false; t_len]; n];
    let mut p = vec![vec![0.0; t_len]; n];
    let mut d = vec![0.0; t_len];

    for i in 0..n {
        for t in 0..t_len {
            u[i][t] = solution.value(spec.u[i][t]) > 0.5;
            c[i][t] = solution.value(spec.c[i][t]) > 0.5;
            p[i][t] = solution.value(spec.p[i][t]);
        }
    }
    for t in 0..t_len {
        d[t] = solution.value(spec.d[t]);
    }

    PrimalBundle {
        u,
        c,
        p,
        d,
        objective: solution.eval(&spec.objective),
    }
}

/// Solve a fully-built model, converting the back-end's resolution result
/// into the §4.3 status taxonomy.
#[tracing::instrument(skip_all, fields(backend = cfg.backend.as_str(), n = input.n_units(), t = input.t_len()))]
pub fn solve(spec: ModelSpec, input: &ModelInput, cfg: &SolveConfig) -> SolveOutcome {
    match cfg.backend {
        #[cfg(feature = "solver-highs")]
        LpSolverKind::Highs => solve_with_highs(spec, input, cfg),
        #[cfg(feature = "solver-coin_cbc")]
        LpSolverKind::CoinCbc => solve_with_coin_cbc(spec, input, cfg),
        #[cfg(feature = "solver-clarabel")]
        LpSolverKind::Clarabel => solve_with_clarabel(spec, input, cfg),
    }
}

#[cfg(feature = "solver-highs")]
fn solve_with_highs(spec: ModelSpec, input: &ModelInput, cfg: &SolveConfig) -> SolveOutcome {
    use good_lp::solvers::highs::highs;

    let objective = spec.objective.clone();
    let constraints = spec.all_constraints();
    let mut model = spec.vars.clone().minimise(objective).using(highs);
    if let Some(limit) = cfg.time_limit {
        model.set_time_limit(limit.as_secs_f64());
    }
    for constraint in constraints {
        model = model.with(constraint);
    }

    match model.solve() {
        Ok(solution) => SolveOutcome::Optimal(extract_bundle(&solution, &spec, input)),
        Err(err) => classify_resolution_error(err),
    }
}

#[cfg(feature = "solver-coin_cbc")]
fn solve_with_coin_cbc(spec: ModelSpec, input: &ModelInput, cfg: &SolveConfig) -> SolveOutcome {
    use good_lp::solvers::coin_cbc::coin_cbc;

    let objective = spec.objective.clone();
    let constraints = spec.all_constraints();
    let mut model = spec.vars.clone().minimise(objective).using(coin_cbc);
    if let Some(limit) = cfg.time_limit {
        // CBC's own CLI flag is named "seconds"; good_lp forwards arbitrary
        // parameters to the underlying solver unchanged.
        model.set_parameter("seconds", &limit.as_secs_f64().to_string());
    }
    for constraint in constraints {
        model = model.with(constraint);
    }

    match model.solve() {
        Ok(solution) => SolveOutcome::Optimal(extract_bundle(&solution, &spec, input)),
        Err(err) => classify_resolution_error(err),
    }
}

#[cfg(feature = "solver-clarabel")]
fn solve_with_clarabel(spec: ModelSpec, input: &ModelInput, cfg: &SolveConfig) -> SolveOutcome {
    use good_lp::solvers::clarabel::clarabel;

    let _ = cfg;
    let objective = spec.objective.clone();
    let constraints = spec.all_constraints();
    let mut model = spec.vars.clone().minimise(objective).using(clarabel);
    for constraint in constraints {
        model = model.with(constraint);
    }

    match model.solve() {
        Ok(solution) => SolveOutcome::Optimal(extract_bundle(&solution, &spec, input)),
        Err(err) => classify_resolution_error(err),
    }
}

fn classify_resolution_error(err: good_lp::ResolutionError) -> SolveOutcome {
    use good_lp::ResolutionError;
    match err {
        ResolutionError::Infeasible => {
            tracing::info!("solver reported infeasible");
            SolveOutcome::Infeasible
        }
        ResolutionError::Unbounded => {
            tracing::warn!("solver reported unbounded (likely a modelling bug)");
            SolveOutcome::Unbounded
        }
        other => {
            let message = other.to_string();
            if message.to_lowercase().contains("time limit") {
                tracing::warn!("solver exceeded its wall-clock budget");
                SolveOutcome::Timeout
            } else {
                tracing::warn!(error = %message, "solver back-end error");
                SolveOutcome::SolverError(SolveError::Backend(message))
            }
        }
    }
}

/// Index dispatch by unit/timestep for callers that hold a [`PrimalBundle`]
/// but prefer the newtype-indexed accessors used elsewhere in the crate.
pub fn dispatch_at(bundle: &PrimalBundle, unit: UnitId, t: TimestepIndex) -> f64 {
    bundle.p[unit.value()][t.value()]
}

pub fn committed_at(bundle: &PrimalBundle, unit: UnitId, t: TimestepIndex) -> bool {
    bundle.u[unit.value()][t.value()]
}

#[allow(dead_code)]
fn solver_catalogue() -> HashMap<&'static str, LpSolverKind> {
    LpSolverKind::available()
        .iter()
        .map(|k| (k.as_str(), *k))
        .collect()
}
