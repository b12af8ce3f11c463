//! Error taxonomy for the unit-commitment core.
//!
//! Mirrors the "domain errors + unifying enum" shape used across the rest of
//! the solver stack: each component gets its own `thiserror` enum, and
//! [`UcError`] unifies them at the pipeline boundary.

use thiserror::Error;

use crate::diagnose::Diagnosis;

/// Errors raised by [`crate::input`] while normalising external inputs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error("demand/wind/solar series have mismatched lengths: demand={demand}, wind={wind}, solar={solar}")]
    ShapeMismatch {
        demand: usize,
        wind: usize,
        solar: usize,
    },

    #[error("generator table column {column:?} has length {got}, expected {expected}")]
    GeneratorShapeMismatch {
        column: &'static str,
        got: usize,
        expected: usize,
    },

    #[error("horizon timestamps are not strictly increasing at index {index}")]
    NonMonotoneTimestamps { index: usize },

    #[error("unit {unit} has Pmin ({pmin}) > Pmax ({pmax})")]
    InvalidBounds {
        unit: usize,
        pmin: f64,
        pmax: f64,
    },

    #[error("unit {unit} has a negative bound (Pmin={pmin}, Pmax={pmax})")]
    NegativeBound { unit: usize, pmin: f64, pmax: f64 },

    #[error("unit {unit} has MinOn/MinOff below 1 (MinOn={min_on}, MinOff={min_off})")]
    InvalidMinUpDown {
        unit: usize,
        min_on: i64,
        min_off: i64,
    },

    #[error("restart target proportion {proportion} out of range [0,1]")]
    ProportionOutOfRange { proportion: f64 },

    #[error("block_limit must be positive, got {block_limit}")]
    NonPositiveBlockLimit { block_limit: f64 },

    #[error("demand/wind/solar series must be non-negative: {series} at index {index} is {value}")]
    NegativeSeriesValue {
        series: &'static str,
        index: usize,
        value: f64,
    },

    #[error("two restart targets snapped to the same timestep {timestep}")]
    CheckpointCollision { timestep: usize },

    #[error("horizon is empty")]
    EmptyHorizon,
}

/// Errors raised by the solver back-end, distinct from infeasibility.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolveError {
    #[error("solver exceeded its wall-clock budget")]
    Timeout,

    #[error("numerical difficulty reported by the solver: {0}")]
    Numerical(String),

    #[error("solver backend failure: {0}")]
    Backend(String),
}

/// Unified error type returned at the pipeline boundary.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UcError {
    #[error("input validation failed: {0}")]
    InputValidation(#[from] InputError),

    /// Solver returned `infeasible`; carries the diagnoser's classification.
    #[error("infeasible: {0}")]
    Infeasible(Diagnosis),

    /// Solver returned `unbounded`. Indicates a modelling bug, since the
    /// objective has a closed-form lower bound of zero.
    #[error("problem is unbounded (this indicates a modelling bug)")]
    Unbounded,

    #[error("solver error: {0}")]
    SolverError(#[from] SolveError),
}

pub type UcResult<T> = Result<T, UcError>;
