//! End-to-end scenarios from the specification (S1-S6), plus the boundary
//! behaviours B1-B4. Each test builds inputs through the public
//! `InputAdapter` entry point and drives the full pipeline.

use chrono::{Duration, TimeZone, Utc};

use gat_uc::{
    input, run_pipeline, DiagnoserConfig, ModellerConfig, PipelineConfig, PipelineOutcome,
    RestartTarget, SolveConfig, UnitParams,
};

fn half_hourly(n: usize) -> Vec<chrono::DateTime<Utc>> {
    let base = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    (0..n).map(|i| base + Duration::minutes(30 * i as i64)).collect()
}

fn unit(p_min: f64, p_max: f64, c_fuel: f64, c_start: f64, min_on: u32, min_off: u32) -> UnitParams {
    UnitParams {
        name: format!("G-{p_max}"),
        p_min,
        p_max,
        c_fuel,
        c_start,
        min_on,
        min_off,
    }
}

/// S1: trivial feasibility, single unit, single checkpoint at t=3.
#[test]
fn s1_trivial_feasibility() {
    let demand = vec![50.0, 50.0, 50.0, 50.0];
    let input = input::adapt(
        half_hourly(4),
        demand.clone(),
        vec![0.0; 4],
        vec![0.0; 4],
        vec![unit(0.0, 100.0, 10.0, 0.0, 1, 1)],
        &[RestartTarget {
            target_days: 1.5 / 24.0,
            target_proportion: 1.0,
        }],
        25.0,
    )
    .unwrap();

    let outcome = run_pipeline(
        &input,
        &ModellerConfig::default(),
        &PipelineConfig::default(),
        &SolveConfig::default(),
        &DiagnoserConfig::default(),
    )
    .unwrap();

    match outcome {
        PipelineOutcome::Optimal(bundle) => {
            assert!((bundle.d[0] - 0.0).abs() < 1e-3);
            assert!(bundle.d[1] <= 25.0 + 1e-3);
            for t in 0..3 {
                assert!(bundle.d[t + 1] >= bundle.d[t] - 1e-6);
            }
            assert!(bundle.d[3] >= 50.0 - 1e-3);
        }
        PipelineOutcome::Diagnosed(d) => panic!("expected optimal, got diagnosis: {}", d.condition),
    }
}

/// S2: multi-checkpoint staircase, cheaper unit dispatched first.
#[test]
fn s2_multi_checkpoint_staircase_prefers_cheap_unit() {
    let demand = vec![100.0; 8];
    let input = input::adapt(
        half_hourly(8),
        demand,
        vec![0.0; 8],
        vec![0.0; 8],
        vec![
            unit(0.0, 100.0, 5.0, 0.0, 1, 1),
            unit(0.0, 100.0, 20.0, 0.0, 1, 1),
        ],
        &[
            RestartTarget {
                target_days: 1.5 / 24.0,
                target_proportion: 0.6,
            },
            RestartTarget {
                target_days: 3.5 / 24.0,
                target_proportion: 1.0,
            },
        ],
        30.0,
    )
    .unwrap();

    let outcome = run_pipeline(
        &input,
        &ModellerConfig::default(),
        &PipelineConfig::default(),
        &SolveConfig::default(),
        &DiagnoserConfig::default(),
    )
    .unwrap();

    match outcome {
        PipelineOutcome::Optimal(bundle) => {
            assert!(bundle.d[3] >= 60.0 - 1e-3);
            assert!(bundle.d[7] >= 100.0 - 1e-3);
            // The cheap unit (index 0) should supply the bulk of dispatch
            // whenever total demand is within its own capacity.
            for t in 0..8 {
                if bundle.total_generation(gat_uc::TimestepIndex(t)) <= 100.0 + 1e-3 {
                    assert!(bundle.p[1][t] <= 1e-3, "expensive unit dispatched unnecessarily at t={t}");
                }
            }
        }
        PipelineOutcome::Diagnosed(d) => panic!("expected optimal, got diagnosis: {}", d.condition),
    }
}

/// S3: min-up enforcement forces the unit to stay on for MinOn=3 steps.
#[test]
fn s3_min_up_enforcement() {
    let demand = vec![0.0, 80.0, 0.0, 0.0, 0.0, 0.0];
    let input = input::adapt(
        half_hourly(6),
        demand,
        vec![0.0; 6],
        vec![0.0; 6],
        vec![unit(50.0, 100.0, 1.0, 1000.0, 3, 1)],
        &[RestartTarget {
            target_days: 5.5 / 24.0,
            target_proportion: 0.0,
        }],
        100.0,
    )
    .unwrap();

    let outcome = run_pipeline(
        &input,
        &ModellerConfig::default(),
        &PipelineConfig::default(),
        &SolveConfig::default(),
        &DiagnoserConfig::default(),
    )
    .unwrap();

    if let PipelineOutcome::Optimal(bundle) = outcome {
        if bundle.u[0][1] {
            // Once committed to meet the t=1 spike, min-up forces the unit
            // to remain committed at least through t=3.
            assert!(bundle.u[0][2] || bundle.u[0][3], "unit dropped before MinOn window elapsed");
        }
    }
}

/// S4: insufficient capacity, both units capped at 40 MW.
#[test]
fn s4_insufficient_capacity_diagnosed() {
    let demand = vec![100.0; 8];
    let input = input::adapt(
        half_hourly(8),
        demand,
        vec![0.0; 8],
        vec![0.0; 8],
        vec![
            unit(0.0, 40.0, 5.0, 0.0, 1, 1),
            unit(0.0, 40.0, 20.0, 0.0, 1, 1),
        ],
        &[
            RestartTarget {
                target_days: 1.5 / 24.0,
                target_proportion: 0.6,
            },
            RestartTarget {
                target_days: 3.5 / 24.0,
                target_proportion: 1.0,
            },
        ],
        30.0,
    )
    .unwrap();

    let outcome = run_pipeline(
        &input,
        &ModellerConfig::default(),
        &PipelineConfig::default(),
        &SolveConfig::default(),
        &DiagnoserConfig::default(),
    )
    .unwrap();

    match outcome {
        PipelineOutcome::Diagnosed(d) => {
            assert_eq!(d.condition, "Insufficient available power to meet demand.");
        }
        PipelineOutcome::Optimal(_) => panic!("expected infeasibility"),
    }
}

/// S5: cool-down violation, demand spikes more often than MinOff allows.
#[test]
fn s5_cool_down_violation_diagnosed() {
    let demand = vec![100.0, 0.0, 100.0, 0.0, 100.0, 0.0];
    let input = input::adapt(
        half_hourly(6),
        demand,
        vec![0.0; 6],
        vec![0.0; 6],
        vec![unit(0.0, 100.0, 1.0, 0.0, 1, 4)],
        &[],
        100.0,
    )
    .unwrap();

    let outcome = run_pipeline(
        &input,
        &ModellerConfig::default(),
        &PipelineConfig::default(),
        &SolveConfig::default(),
        &DiagnoserConfig::default(),
    )
    .unwrap();

    match outcome {
        PipelineOutcome::Diagnosed(d) => {
            assert_eq!(d.condition, "Generators cannot cool down in time.");
        }
        PipelineOutcome::Optimal(_) => panic!("expected infeasibility"),
    }
}

/// S6: ramp-bound target, five units with ample aggregate capacity but a
/// block limit too tight to reach the t=1 checkpoint.
#[test]
fn s6_ramp_bound_target_diagnosed() {
    let demand = vec![300.0; 10];
    let input = input::adapt(
        half_hourly(10),
        demand,
        vec![0.0; 10],
        vec![0.0; 10],
        (0..5).map(|_| unit(0.0, 100.0, 10.0, 0.0, 1, 1)).collect(),
        &[RestartTarget {
            target_days: 0.5 / 24.0,
            target_proportion: 1.0,
        }],
        10.0,
    )
    .unwrap();

    let outcome = run_pipeline(
        &input,
        &ModellerConfig::default(),
        &PipelineConfig::default(),
        &SolveConfig::default(),
        &DiagnoserConfig::default(),
    )
    .unwrap();

    match outcome {
        PipelineOutcome::Diagnosed(d) => {
            assert_eq!(d.condition, "Cannot achieve block loading in time for targets.");
        }
        PipelineOutcome::Optimal(_) => panic!("expected infeasibility"),
    }
}

/// B1: T=1, N=1, F=[0], D=[x]. Optimum has d[0]=0, p[0,0]=0.
#[test]
fn b1_single_timestep_boundary() {
    let x = 42.0;
    let input = input::adapt(
        half_hourly(1),
        vec![x],
        vec![0.0],
        vec![0.0],
        vec![unit(0.0, 100.0, 10.0, 0.0, 1, 1)],
        &[],
        10.0,
    )
    .unwrap();

    let outcome = run_pipeline(
        &input,
        &ModellerConfig::default(),
        &PipelineConfig::default(),
        &SolveConfig::default(),
        &DiagnoserConfig::default(),
    )
    .unwrap();

    if let PipelineOutcome::Optimal(bundle) = outcome {
        assert!((bundle.d[0]).abs() < 1e-6);
        assert!((bundle.p[0][0]).abs() < 1e-6);
    } else {
        panic!("T=1 case should always be feasible");
    }
}

/// B2: no checkpoints; target curve equals demand; demand-increase ramps
/// served demand up from zero toward D.
#[test]
fn b2_no_checkpoints_stairsteps_toward_demand() {
    let demand = vec![40.0, 40.0, 40.0, 40.0];
    let input = input::adapt(
        half_hourly(4),
        demand.clone(),
        vec![0.0; 4],
        vec![0.0; 4],
        vec![unit(0.0, 100.0, 10.0, 0.0, 1, 1)],
        &[],
        15.0,
    )
    .unwrap();

    assert_eq!(input.series.target_curve_mw, demand);

    let outcome = run_pipeline(
        &input,
        &ModellerConfig::default(),
        &PipelineConfig::default(),
        &SolveConfig::default(),
        &DiagnoserConfig::default(),
    )
    .unwrap();

    if let PipelineOutcome::Optimal(bundle) = outcome {
        assert!((bundle.d[0]).abs() < 1e-6);
        for t in 0..3 {
            assert!(bundle.d[t + 1] - bundle.d[t] <= 15.0 + 1e-6);
        }
    } else {
        panic!("expected optimal");
    }
}

/// B3: checkpoint volume exceeds total available capacity.
#[test]
fn b3_checkpoint_exceeds_available_power() {
    let demand = vec![500.0; 4];
    let input = input::adapt(
        half_hourly(4),
        demand,
        vec![0.0; 4],
        vec![0.0; 4],
        vec![unit(0.0, 50.0, 10.0, 0.0, 1, 1)],
        &[RestartTarget {
            target_days: 1.5 / 24.0,
            target_proportion: 1.0,
        }],
        100.0,
    )
    .unwrap();

    let outcome = run_pipeline(
        &input,
        &ModellerConfig::default(),
        &PipelineConfig::default(),
        &SolveConfig::default(),
        &DiagnoserConfig::default(),
    )
    .unwrap();

    match outcome {
        PipelineOutcome::Diagnosed(d) => {
            assert_eq!(d.condition, "Insufficient available power to meet demand.");
        }
        PipelineOutcome::Optimal(_) => panic!("expected infeasibility"),
    }
}

/// B4: checkpoint at t_k=1 requiring more volume than the block limit
/// allows to ramp to from a cold start.
#[test]
fn b4_checkpoint_violates_ramp_limit() {
    let demand = vec![200.0; 4];
    let input = input::adapt(
        half_hourly(4),
        demand,
        vec![0.0; 4],
        vec![0.0; 4],
        vec![unit(0.0, 200.0, 10.0, 0.0, 1, 1)],
        &[RestartTarget {
            target_days: 0.5 / 24.0,
            target_proportion: 1.0,
        }],
        20.0,
    )
    .unwrap();

    let outcome = run_pipeline(
        &input,
        &ModellerConfig::default(),
        &PipelineConfig::default(),
        &SolveConfig::default(),
        &DiagnoserConfig::default(),
    )
    .unwrap();

    match outcome {
        PipelineOutcome::Diagnosed(d) => {
            assert_eq!(d.condition, "Cannot achieve block loading in time for targets.");
        }
        PipelineOutcome::Optimal(_) => panic!("expected infeasibility"),
    }
}

/// R1: running the pipeline twice on the same inputs yields identical
/// primals (deterministic given a fixed back-end).
#[test]
fn r1_deterministic_repeat_solve() {
    let demand = vec![50.0, 50.0, 50.0, 50.0];
    let input = input::adapt(
        half_hourly(4),
        demand,
        vec![0.0; 4],
        vec![0.0; 4],
        vec![unit(0.0, 100.0, 10.0, 0.0, 1, 1)],
        &[RestartTarget {
            target_days: 1.5 / 24.0,
            target_proportion: 1.0,
        }],
        25.0,
    )
    .unwrap();

    let run = || {
        run_pipeline(
            &input,
            &ModellerConfig::default(),
            &PipelineConfig::default(),
            &SolveConfig::default(),
            &DiagnoserConfig::default(),
        )
        .unwrap()
    };

    let (a, b) = (run(), run());
    match (a, b) {
        (PipelineOutcome::Optimal(a), PipelineOutcome::Optimal(b)) => {
            assert!((a.objective - b.objective).abs() < 1e-6);
            assert_eq!(a.d, b.d);
        }
        _ => panic!("expected both solves optimal"),
    }
}
