//! Generation-side unit-commitment MILP core.
//!
//! ```text
//!   demand, wind, solar        restart targets          unit table
//!          |                   (days, proportion)            |
//!          v                         |                        v
//!   +----------------------------------------------------------------+
//!   |                          InputAdapter                          |
//!   |   snaps restart targets onto the horizon, derives the          |
//!   |   checkpoint table and the dense Dtarget step curve             |
//!   +----------------------------------------------------------------+
//!                                  |
//!                                  v
//!   +----------------------------------------------------------------+
//!   |                            Modeller                             |
//!   |   u[i,t], c[i,t], p[i,t], d[t]; ten named constraint groups;    |
//!   |   objective = 1e6*sum|d-Dtarget| + sum(Cfuel*p + Cstart*c)      |
//!   +----------------------------------------------------------------+
//!                                  |
//!                                  v
//!   +----------------------------------------------------------------+
//!   |                          SolveDriver                            |
//!   |   hands (objective, constraints) to a MILP back-end (HiGHS      |
//!   |   default, CoinCBC reference, Clarabel LP-only)                 |
//!   +----------------------------------------------------------------+
//!                          |                    |
//!                     optimal               non-optimal
//!                          |                    |
//!                          v                    v
//!                  primal bundle      +-------------------------+
//!                                     |        Diagnoser          |
//!                                     |  leave-one-group-out,     |
//!                                     |  classify into one of     |
//!                                     |  five named conditions    |
//!                                     +-------------------------+
//! ```
//!
//! No AC/DC power flow, no stochastic or rolling-horizon optimisation, no
//! quadratic heat-rate curves or reserves market, and no guarantee of
//! infeasibility-proof minimality: the Diagnoser's classification is a
//! fixed heuristic pattern match, not a minimal infeasible subsystem.

pub mod diagnose;
pub mod error;
pub mod input;
pub mod model;
pub mod solve;
pub mod solution;
pub mod types;

pub use diagnose::{DiagnoserConfig, Diagnosis};
pub use error::{InputError, SolveError, UcError, UcResult};
pub use model::ConstraintGroup;
pub use solution::PrimalBundle;
pub use solve::{LpSolverKind, SolveConfig, SolveOutcome};
pub use types::{
    Checkpoint, CheckpointTable, ExogenousSeries, Horizon, ModelInput, ModellerConfig,
    PipelineConfig, RestartTarget, TimestepIndex, UnitFleet, UnitId, UnitParams,
};

use std::collections::HashSet;

/// Outcome of the full pipeline: either a primal bundle, or a classified
/// infeasibility/unbounded/solver-error result (§6, "Outputs from the
/// core").
pub enum PipelineOutcome {
    Optimal(PrimalBundle),
    Diagnosed(Diagnosis),
}

/// Run the whole pipeline: Modeller → SolveDriver → (optimal ⇒ done) or
/// (non-optimal ⇒ Diagnoser).
///
/// `input` is assumed already validated by [`input::adapt`]; this function
/// never raises `InputValidation` itself.
#[tracing::instrument(skip_all, fields(n = input.n_units(), t = input.t_len()))]
pub fn run_pipeline(
    input: &ModelInput,
    modeller_cfg: &ModellerConfig,
    pipeline_cfg: &PipelineConfig,
    solve_cfg: &SolveConfig,
    diag_cfg: &DiagnoserConfig,
) -> UcResult<PipelineOutcome> {
    let spec = model::build_excluding(input, modeller_cfg, pipeline_cfg, &HashSet::new());

    match solve::solve(spec, input, solve_cfg) {
        SolveOutcome::Optimal(bundle) => Ok(PipelineOutcome::Optimal(bundle)),
        SolveOutcome::Unbounded => Err(UcError::Unbounded),
        SolveOutcome::SolverError(err) => Err(UcError::SolverError(err)),
        SolveOutcome::Timeout => Err(UcError::SolverError(SolveError::Timeout)),
        SolveOutcome::Infeasible => {
            let diagnosis = diagnose::diagnose(input, modeller_cfg, pipeline_cfg, solve_cfg, diag_cfg);
            Ok(PipelineOutcome::Diagnosed(diagnosis))
        }
    }
}
