//! The leveraged wealth recurrence shared by every variant.
//!
//! A fraction `leverage` of current wealth is exposed to the period's return;
//! the remainder is held at zero return:
//!
//! ```text
//! W_0 = initial_amount
//! W_t = W_{t-1} * (1 - leverage) + W_{t-1} * leverage * (1 + r_t)
//! ```
//!
//! `leverage = 1` is plain compounding and `leverage = 0` freezes wealth.
//! Above 1 the unexposed term turns negative and losses can push wealth below
//! zero; that is a valid outcome and is kept as-is.

use crate::model::{ReturnEvent, WealthTrajectory};

/// Advance wealth by one period
#[inline]
#[must_use]
pub fn step(wealth: f64, leverage: f64, event: ReturnEvent) -> f64 {
    wealth * (1.0 - leverage) + wealth * leverage * (1.0 + event.fraction())
}

/// Full trajectory including the initial amount; length is `events.len() + 1`
#[must_use]
pub fn compute_trajectory(initial_amount: f64, leverage: f64, events: &[ReturnEvent]) -> WealthTrajectory {
    let mut values = Vec::with_capacity(events.len() + 1);
    let mut wealth = initial_amount;
    values.push(wealth);

    for event in events {
        wealth = step(wealth, leverage, *event);
        values.push(wealth);
    }

    WealthTrajectory::from_values(values)
}

/// Final wealth only, without materializing the trajectory
#[must_use]
pub fn final_wealth(initial_amount: f64, leverage: f64, events: &[ReturnEvent]) -> f64 {
    events
        .iter()
        .fold(initial_amount, |wealth, event| step(wealth, leverage, *event))
}
