//! Ergodicity simulation library
//!
//! This crate simulates repeated multiplicative gain/loss processes and
//! contrasts the ensemble average with individual realized trajectories.
//! It supports:
//! - Synthetic coin-flip events (fixed gain/loss percentages per flip)
//! - Returns derived from historical price series (forward-filled, date sliced)
//! - A leveraged wealth recurrence shared by both variants
//! - Ensemble statistics (mean, median, percentiles) across many trials
//! - Time-average growth analysis and the final-wealth distribution
//!
//! # Example
//!
//! ```ignore
//! use ergodicity_core::{EnsembleBuilder, simulation::run_ensemble};
//!
//! let config = EnsembleBuilder::coin_flip()
//!     .initial_amount(1_000.0)
//!     .gain(0.5)
//!     .loss(0.4)
//!     .steps(60)
//!     .trials(10_000)
//!     .seed(9)
//!     .build()?;
//!
//! let result = run_ensemble(&config)?;
//! if let Some(last) = result.ensemble.final_snapshot() {
//!     println!("ensemble mean after 60 flips: {}", last.mean);
//! }
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod analysis;
pub mod error;
pub mod recurrence;
pub mod simulation;
pub mod source;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod config;
pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use config::{DateRange, EnsembleBuilder, EnsembleConfig, MarketConfig};
pub use error::{Result, SimulationError};
pub use recurrence::compute_trajectory;
pub use simulation::{run_ensemble, run_market};
pub use source::{EventSource, generate_events};
