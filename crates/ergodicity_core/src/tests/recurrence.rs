//! Tests for the leveraged wealth recurrence
//!
//! These tests verify that:
//! - Full leverage reduces to plain compounding
//! - Zero leverage leaves wealth untouched
//! - Partial leverage mixes exposed and held wealth
//! - Leverage above one can drive wealth negative without erroring

use crate::model::{EventSequence, ReturnEvent};
use crate::recurrence::{compute_trajectory, final_wealth, step};

fn events(fractions: &[f64]) -> EventSequence {
    EventSequence::from_fractions(fractions)
}

#[test]
fn test_full_leverage_gain_then_loss() {
    let trajectory = compute_trajectory(1_000.0, 1.0, events(&[0.5, -0.4]).as_slice());
    let values = trajectory.values();

    assert_eq!(values.len(), 3);
    assert_eq!(values[0], 1_000.0);
    assert!((values[1] - 1_500.0).abs() < 1e-9);
    assert!((values[2] - 900.0).abs() < 1e-9);
}

#[test]
fn test_half_leverage_single_gain() {
    // 500 held + 500 exposed at +50% = 1250
    let trajectory = compute_trajectory(1_000.0, 0.5, events(&[0.5]).as_slice());
    assert!((trajectory.final_value() - 1_250.0).abs() < 1e-9);
}

#[test]
fn test_full_leverage_is_plain_compounding() {
    let fractions = [0.12, -0.07, 0.03, -0.25, 0.4, 0.0, -0.01];
    let trajectory = compute_trajectory(2_500.0, 1.0, events(&fractions).as_slice());

    let mut expected = 2_500.0;
    for (t, r) in fractions.iter().enumerate() {
        expected *= 1.0 + r;
        let actual = trajectory.get(t + 1).unwrap();
        assert!(
            (actual - expected).abs() < 1e-9,
            "step {}: expected {:.6}, got {:.6}",
            t + 1,
            expected,
            actual
        );
    }
}

#[test]
fn test_zero_leverage_never_changes() {
    let trajectory = compute_trajectory(1_000.0, 0.0, events(&[0.5, -0.4, 3.0, -0.99]).as_slice());
    assert!(trajectory.values().iter().all(|w| *w == 1_000.0));
}

#[test]
fn test_length_is_events_plus_one() {
    for n in [0, 1, 2, 17, 60] {
        let fractions = vec![0.01; n];
        let trajectory = compute_trajectory(1_000.0, 0.7, events(&fractions).as_slice());
        assert_eq!(trajectory.len(), n + 1);
        assert_eq!(trajectory.steps(), n);
        assert_eq!(trajectory.initial(), 1_000.0);
    }
}

#[test]
fn test_empty_events_is_initial_only() {
    let trajectory = compute_trajectory(1_000.0, 1.0, &[]);
    assert_eq!(trajectory.values(), &[1_000.0]);
    assert_eq!(trajectory.time_average_growth(), None);
}

#[test]
fn test_repeated_computation_is_bit_identical() {
    let seq = events(&[0.5, -0.4, 0.5, 0.5, -0.4, -0.4, 0.5]);
    let a = compute_trajectory(1_234.56, 0.8, seq.as_slice());
    let b = compute_trajectory(1_234.56, 0.8, seq.as_slice());
    assert!(
        a.values()
            .iter()
            .zip(b.values())
            .all(|(x, y)| x.to_bits() == y.to_bits())
    );
}

#[test]
fn test_leverage_above_one_can_go_negative() {
    // 2x exposure to a 60% loss: 1000 * (1 - 2 * 0.6) = -200
    let trajectory = compute_trajectory(1_000.0, 2.0, events(&[-0.6]).as_slice());
    assert!((trajectory.final_value() + 200.0).abs() < 1e-9);
    assert_eq!(trajectory.time_average_growth(), None);
}

#[test]
fn test_final_wealth_matches_trajectory() {
    let seq = events(&[0.5, -0.4, 0.2, -0.1]);
    let trajectory = compute_trajectory(1_000.0, 0.6, seq.as_slice());
    let last = final_wealth(1_000.0, 0.6, seq.as_slice());
    assert_eq!(last.to_bits(), trajectory.final_value().to_bits());
}

#[test]
fn test_step_forms_agree() {
    let wealth = 1_000.0;
    for leverage in [0.0, 0.25, 1.0, 1.5] {
        let r = -0.4;
        let direct = wealth * (1.0 + leverage * r);
        assert!((step(wealth, leverage, ReturnEvent(r)) - direct).abs() < 1e-9);
    }
}

#[test]
fn test_time_average_growth_of_alternating_path() {
    // One gain and one loss: (1.5 * 0.6)^(1/2) - 1
    let trajectory = compute_trajectory(1_000.0, 1.0, events(&[0.5, -0.4]).as_slice());
    let rate = trajectory.time_average_growth().unwrap();
    assert!((rate - (0.9_f64.sqrt() - 1.0)).abs() < 1e-12);
}
