//! InputAdapter: turns external series and a unit table into the fixed-shape
//! tensors the Modeller consumes.
//!
//! Target-checkpoint derivation follows §4.1: snap each `(target_days,
//! target_proportion)` pair to the nearest horizon timestep, then build a
//! dense, right-open step function for the objective's reference curve.

use chrono::{DateTime, Duration, Utc};

use crate::error::InputError;
use crate::types::{
    Checkpoint, CheckpointTable, ExogenousSeries, Horizon, ModelInput, RestartTarget,
    TimestepIndex, UnitFleet, UnitParams,
};

/// Snap `target` to the horizon timestep with the smallest absolute time
/// delta. Ties resolve to the earlier timestep, since we only replace the
/// running best on a strictly smaller delta.
fn snap_timestep(horizon: &Horizon, target: DateTime<Utc>) -> TimestepIndex {
    let mut best = TimestepIndex(0);
    let mut best_delta_ms = i64::MAX;
    for t in horizon.indices() {
        let delta_ms = (horizon.timestamp(t) - target).num_milliseconds().abs();
        if delta_ms < best_delta_ms {
            best_delta_ms = delta_ms;
            best = t;
        }
    }
    best
}

/// Derive the checkpoint table from restart targets expressed as
/// `(target_days, target_proportion)` pairs, per §4.1 steps 1-6.
pub fn derive_checkpoints(
    horizon: &Horizon,
    demand_mw: &[f64],
    restart_targets: &[RestartTarget],
    block_limit: f64,
) -> Result<CheckpointTable, InputError> {
    if block_limit <= 0.0 {
        return Err(InputError::NonPositiveBlockLimit { block_limit });
    }
    let first_date = horizon.first_timestamp();
    let mut checkpoints = Vec::with_capacity(restart_targets.len());
    for target in restart_targets {
        if !(0.0..=1.0).contains(&target.target_proportion) {
            return Err(InputError::ProportionOutOfRange {
                proportion: target.target_proportion,
            });
        }
        let target_datetime =
            first_date + Duration::milliseconds((target.target_days * 86_400_000.0) as i64);
        let t_k = snap_timestep(horizon, target_datetime);
        let vol_k = demand_mw[t_k.value()] * target.target_proportion;
        checkpoints.push(Checkpoint {
            t: t_k,
            volume_mw: vol_k,
            block_limit,
        });
    }
    CheckpointTable::new(checkpoints)
}

/// Build the dense per-timestep target curve `Dtarget`, a right-open step
/// function equal to `vol_k` on `[t_{k-1}, t_k)` and to `D[t]` from the last
/// checkpoint onward (§4.1, final paragraph).
///
/// Scans checkpoints ascending and paints each `vol_k` backward over the
/// timesteps strictly before `t_k` not yet assigned — algebraically
/// equivalent to, and simpler than, painting checkpoints in descending
/// order (see DESIGN.md for why this direction was chosen).
pub fn build_target_curve(t_len: usize, demand_mw: &[f64], checkpoints: &CheckpointTable) -> Vec<f64> {
    let mut target = vec![0.0; t_len];
    let mut assigned = vec![false; t_len];
    for cp in checkpoints.iter() {
        for t in 0..cp.t.value() {
            if !assigned[t] {
                target[t] = cp.volume_mw;
                assigned[t] = true;
            }
        }
    }
    for t in 0..t_len {
        if !assigned[t] {
            target[t] = demand_mw[t];
        }
    }
    target
}

fn validate_series(name: &'static str, series: &[f64]) -> Result<(), InputError> {
    for (idx, &value) in series.iter().enumerate() {
        if value < 0.0 {
            return Err(InputError::NegativeSeriesValue {
                series: name,
                index: idx,
                value,
            });
        }
    }
    Ok(())
}

/// Normalise raw collaborator inputs into a validated [`ModelInput`].
#[tracing::instrument(skip_all, fields(t_len = timestamps.len(), n_units = fleet.len()))]
pub fn adapt(
    timestamps: Vec<DateTime<Utc>>,
    demand_mw: Vec<f64>,
    wind_mw: Vec<f64>,
    solar_mw: Vec<f64>,
    fleet: Vec<UnitParams>,
    restart_targets: &[RestartTarget],
    block_limit: f64,
) -> Result<ModelInput, InputError> {
    let horizon = Horizon::new(timestamps)?;
    let t_len = horizon.len();

    if demand_mw.len() != t_len || wind_mw.len() != t_len || solar_mw.len() != t_len {
        return Err(InputError::ShapeMismatch {
            demand: demand_mw.len(),
            wind: wind_mw.len(),
            solar: solar_mw.len(),
        });
    }
    validate_series("demand", &demand_mw)?;
    validate_series("wind", &wind_mw)?;
    validate_series("solar", &solar_mw)?;

    let renewable_mw: Vec<f64> = wind_mw
        .iter()
        .zip(solar_mw.iter())
        .map(|(w, s)| w + s)
        .collect();

    let fleet = UnitFleet::new(fleet)?;
    let checkpoints = derive_checkpoints(&horizon, &demand_mw, restart_targets, block_limit)?;
    let target_curve_mw = build_target_curve(t_len, &demand_mw, &checkpoints);

    tracing::debug!(
        checkpoints = checkpoints.iter().count(),
        "input adapter normalised series"
    );

    Ok(ModelInput {
        horizon,
        fleet,
        series: ExogenousSeries {
            demand_mw,
            renewable_mw,
            target_curve_mw,
        },
        checkpoints,
        block_limit,
    })
}
