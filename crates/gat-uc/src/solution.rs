//! The primal bundle returned on a successful (`optimal`) solve.

use serde::{Deserialize, Serialize};

use crate::types::{TimestepIndex, UnitId};

/// Commitment, startup, dispatch and served-demand arrays, plus the
/// realised objective value, as specified in §6 ("Outputs from the core").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrimalBundle {
    /// `u[i][t]`: unit `i` committed at timestep `t`.
    pub u: Vec<Vec<bool>>,
    /// `c[i][t]`: unit `i`'s startup indicator at timestep `t`.
    pub c: Vec<Vec<bool>>,
    /// `p[i][t]`: dispatch of unit `i` at timestep `t`, MW.
    pub p: Vec<Vec<f64>>,
    /// `d[t]`: served block demand at timestep `t`, MW.
    pub d: Vec<f64>,
    pub objective: f64,
}

impl PrimalBundle {
    pub fn dispatch(&self, unit: UnitId, t: TimestepIndex) -> f64 {
        self.p[unit.value()][t.value()]
    }

    pub fn committed(&self, unit: UnitId, t: TimestepIndex) -> bool {
        self.u[unit.value()][t.value()]
    }

    pub fn served_demand(&self, t: TimestepIndex) -> f64 {
        self.d[t.value()]
    }

    /// Total dispatch across all units at timestep `t`.
    pub fn total_generation(&self, t: TimestepIndex) -> f64 {
        self.p.iter().map(|row| row[t.value()]).sum()
    }

    /// Units whose commitment is identically zero across the whole horizon
    /// (used by R2: such a unit can be dropped without affecting the
    /// objective).
    pub fn inactive_units(&self) -> Vec<UnitId> {
        self.u
            .iter()
            .enumerate()
            .filter(|(_, row)| row.iter().all(|&committed| !committed))
            .map(|(i, _)| UnitId(i))
            .collect()
    }
}
