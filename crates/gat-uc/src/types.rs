//! Core data model: horizon, unit fleet, checkpoints and pipeline config.
//!
//! Everything here is immutable for the life of one solve, matching the
//! "no globals" rule of the concurrency model: configuration that the
//! original prototype kept as module-level constants is an explicit,
//! constructed value here instead.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::InputError;

/// Index of a dispatchable unit in the fleet, 0..N.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(pub usize);

impl UnitId {
    pub fn value(&self) -> usize {
        self.0
    }
}

/// Index of a timestep in the horizon, 0..T.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimestepIndex(pub usize);

impl TimestepIndex {
    pub fn value(&self) -> usize {
        self.0
    }
}

/// An ordered sequence of half-hour settlement periods, each tagged with a
/// UTC timestamp.
#[derive(Debug, Clone)]
pub struct Horizon {
    timestamps: Vec<DateTime<Utc>>,
}

impl Horizon {
    pub fn new(timestamps: Vec<DateTime<Utc>>) -> Result<Self, InputError> {
        if timestamps.is_empty() {
            return Err(InputError::EmptyHorizon);
        }
        for (idx, pair) in timestamps.windows(2).enumerate() {
            if pair[1] <= pair[0] {
                return Err(InputError::NonMonotoneTimestamps { index: idx + 1 });
            }
        }
        Ok(Self { timestamps })
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamp(&self, t: TimestepIndex) -> DateTime<Utc> {
        self.timestamps[t.value()]
    }

    pub fn first_timestamp(&self) -> DateTime<Utc> {
        self.timestamps[0]
    }

    pub fn indices(&self) -> impl Iterator<Item = TimestepIndex> {
        (0..self.timestamps.len()).map(TimestepIndex)
    }
}

/// Per-unit physical and cost parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitParams {
    pub name: String,
    /// Minimum power output, MW.
    pub p_min: f64,
    /// Maximum power output, MW.
    pub p_max: f64,
    /// Linear fuel cost, £/MWh.
    pub c_fuel: f64,
    /// Lump-sum startup cost, £.
    pub c_start: f64,
    /// Minimum on-time, timesteps.
    pub min_on: u32,
    /// Minimum off-time, timesteps.
    pub min_off: u32,
}

/// The ordered fleet of dispatchable units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitFleet {
    units: Vec<UnitParams>,
}

impl UnitFleet {
    pub fn new(units: Vec<UnitParams>) -> Result<Self, InputError> {
        for (i, unit) in units.iter().enumerate() {
            if unit.p_min < 0.0 || unit.p_max < 0.0 {
                return Err(InputError::NegativeBound {
                    unit: i,
                    pmin: unit.p_min,
                    pmax: unit.p_max,
                });
            }
            if unit.p_min > unit.p_max {
                return Err(InputError::InvalidBounds {
                    unit: i,
                    pmin: unit.p_min,
                    pmax: unit.p_max,
                });
            }
            if unit.min_on < 1 || unit.min_off < 1 {
                return Err(InputError::InvalidMinUpDown {
                    unit: i,
                    min_on: unit.min_on as i64,
                    min_off: unit.min_off as i64,
                });
            }
        }
        Ok(Self { units })
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn get(&self, id: UnitId) -> &UnitParams {
        &self.units[id.value()]
    }

    pub fn ids(&self) -> impl Iterator<Item = UnitId> {
        (0..self.units.len()).map(UnitId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (UnitId, &UnitParams)> {
        self.units.iter().enumerate().map(|(i, u)| (UnitId(i), u))
    }
}

/// A restart checkpoint: `(t_k, vol_k, blocklimit_k)`.
///
/// `t_k` is strictly increasing across a sorted [`CheckpointTable`]; after
/// the last checkpoint, served demand is pinned to forecast demand.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Checkpoint {
    pub t: TimestepIndex,
    pub volume_mw: f64,
    pub block_limit: f64,
}

/// A target expressed the way a collaborator supplies it, before being
/// snapped onto the horizon: `(target_days, target_proportion)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RestartTarget {
    pub target_days: f64,
    pub target_proportion: f64,
}

/// Checkpoints sorted ascending by timestep, with no collisions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointTable {
    checkpoints: Vec<Checkpoint>,
}

impl CheckpointTable {
    /// Build from already-snapped, unsorted checkpoints; sorts and rejects
    /// duplicate timesteps, per §4.1 step 6.
    pub fn new(mut checkpoints: Vec<Checkpoint>) -> Result<Self, InputError> {
        checkpoints.sort_by_key(|c| c.t.value());
        for pair in checkpoints.windows(2) {
            if pair[0].t.value() == pair[1].t.value() {
                return Err(InputError::CheckpointCollision {
                    timestep: pair[0].t.value(),
                });
            }
        }
        Ok(Self { checkpoints })
    }

    pub fn is_empty(&self) -> bool {
        self.checkpoints.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Checkpoint> {
        self.checkpoints.iter()
    }

    pub fn last(&self) -> Option<&Checkpoint> {
        self.checkpoints.last()
    }

    /// The smallest checkpoint index `k` with `t <= t_k`, if any remains
    /// ahead of `t`. Used to pick the active `blocklimit_k` for the ramp
    /// constraints (§4.2, `demand-increase`/`demand-decrease`).
    pub fn next_at_or_after(&self, t: TimestepIndex) -> Option<&Checkpoint> {
        self.checkpoints.iter().find(|c| t.value() <= c.t.value())
    }
}

/// Exogenous, immutable-for-the-solve series: forecast demand, renewable
/// feed-in, and the derived per-timestep block-loading target curve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExogenousSeries {
    pub demand_mw: Vec<f64>,
    pub renewable_mw: Vec<f64>,
    pub target_curve_mw: Vec<f64>,
}

/// The complete, validated, fixed-shape input to the Modeller.
#[derive(Debug, Clone)]
pub struct ModelInput {
    pub horizon: Horizon,
    pub fleet: UnitFleet,
    pub series: ExogenousSeries,
    pub checkpoints: CheckpointTable,
    /// The raw collaborator-supplied ramp ceiling. Checkpoints carry their
    /// own `block_limit` (currently always this same scalar, per §4.1 step
    /// 5), but the Modeller also needs a value when there are no
    /// checkpoints at all (§4.2 edge case), so it travels on the input
    /// alongside the table rather than only inside it.
    pub block_limit: f64,
}

impl ModelInput {
    pub fn t_len(&self) -> usize {
        self.horizon.len()
    }

    pub fn n_units(&self) -> usize {
        self.fleet.len()
    }
}

/// Open-question switches, recorded as explicit configuration rather than
/// silently resolved one way or the other.
#[derive(Debug, Clone, Copy)]
pub struct PipelineConfig {
    /// When `true`, constrains `c[i,t]` to equal the exact 0→1 transition
    /// of `u` rather than only bounding its aggregate mass in the rolling
    /// window. Default `false` preserves the source prototype's (looser,
    /// possibly cost-understating) behaviour.
    pub strict_startup_indicator: bool,
    /// When `true`, scale fuel-cost coefficients by 0.5 before model
    /// construction so the objective reports cost in true £ rather than
    /// £-per-timestep. Does not change the optimal commitment/dispatch.
    pub scale_to_mwh: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            strict_startup_indicator: false,
            scale_to_mwh: false,
        }
    }
}

/// Modeller-level tuning knobs.
#[derive(Debug, Clone, Copy)]
pub struct ModellerConfig {
    /// Big-M constant for the `status` group. Spec default `1e6`.
    pub big_m: f64,
    /// Replace `big_m` with `Pmax[i]` per unit, tightening the LP
    /// relaxation without changing the feasible integer set.
    pub tighten_big_m: bool,
    /// Coefficient on `|d[t] - Dtarget[t]|` in the objective.
    pub target_penalty_weight: f64,
}

impl Default for ModellerConfig {
    fn default() -> Self {
        Self {
            big_m: 1e6,
            tighten_big_m: false,
            target_penalty_weight: 1e6,
        }
    }
}

/// Numerical tolerance used when checking invariants P2–P6 in tests and in
/// any defensive post-solve validation.
pub const EPSILON: f64 = 1e-6;
