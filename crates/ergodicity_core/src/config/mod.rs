//! Experiment configuration
//!
//! `EnsembleConfig` describes a synthetic multi-trial run and `MarketConfig`
//! a run over historical prices. Both are plain serde types so a front end
//! can load them from a settings file; call `validate()` before running.
//!
//! # Builder DSL
//!
//! ```ignore
//! use ergodicity_core::config::EnsembleBuilder;
//!
//! let config = EnsembleBuilder::coin_flip()
//!     .initial_amount(1_000.0)
//!     .leverage(0.5)
//!     .steps(60)
//!     .trials(100_000)
//!     .build()?;
//! ```

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};
use crate::source::EventSource;

pub mod builder;

pub use builder::EnsembleBuilder;

/// Default number of synthetic trials
pub const DEFAULT_TRIALS: usize = 100_000;
/// Default initial wealth
pub const DEFAULT_INITIAL_AMOUNT: f64 = 1_000.0;
/// Default trial shown as the single-trajectory contrast (the 100th person)
pub const DEFAULT_SAMPLE_TRIAL: usize = 99;

fn default_initial_amount() -> f64 {
    DEFAULT_INITIAL_AMOUNT
}

fn default_leverage() -> f64 {
    1.0
}

fn default_trials() -> usize {
    DEFAULT_TRIALS
}

fn default_sample_trial() -> usize {
    DEFAULT_SAMPLE_TRIAL
}

pub(crate) fn validate_wealth_inputs(initial_amount: f64, leverage: f64) -> Result<()> {
    if !initial_amount.is_finite() || initial_amount <= 0.0 {
        return Err(SimulationError::invalid(
            "initial_amount",
            initial_amount,
            "must be positive and finite",
        ));
    }
    if !leverage.is_finite() {
        return Err(SimulationError::invalid("leverage", leverage, "must be finite"));
    }
    Ok(())
}

/// Configuration for a synthetic multi-trial run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleConfig {
    #[serde(default = "default_initial_amount")]
    pub initial_amount: f64,
    #[serde(default = "default_leverage")]
    pub leverage: f64,
    /// Number of independent trials (`p_N`)
    #[serde(default = "default_trials")]
    pub trials: usize,
    #[serde(default)]
    pub source: EventSource,
    /// Seed for reproducible runs; `None` draws a fresh seed each run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Index of the trial presented as the single realized trajectory
    #[serde(default = "default_sample_trial")]
    pub sample_trial: usize,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            initial_amount: DEFAULT_INITIAL_AMOUNT,
            leverage: 1.0,
            trials: DEFAULT_TRIALS,
            source: EventSource::default(),
            seed: None,
            sample_trial: DEFAULT_SAMPLE_TRIAL,
        }
    }
}

impl EnsembleConfig {
    /// Number of events per trial (`t_N`)
    #[must_use]
    pub fn steps(&self) -> usize {
        self.source.steps()
    }

    pub fn validate(&self) -> Result<()> {
        validate_wealth_inputs(self.initial_amount, self.leverage)?;
        if self.trials == 0 {
            return Err(SimulationError::invalid(
                "trials",
                0.0,
                "at least one trial is required for ensemble statistics",
            ));
        }
        self.source.validate()
    }
}

/// Inclusive calendar range used to slice price history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Date,
    pub end: Date,
}

impl DateRange {
    pub fn new(start: Date, end: Date) -> Result<Self> {
        let range = Self { start, end };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> Result<()> {
        if self.start > self.end {
            return Err(SimulationError::invalid(
                "date_range",
                f64::from(self.start.year()),
                "start date is after end date",
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Configuration for a run over historical prices, one trial per asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketConfig {
    #[serde(default = "default_initial_amount")]
    pub initial_amount: f64,
    #[serde(default = "default_leverage")]
    pub leverage: f64,
    /// Restrict every series to this range; `None` uses the full history
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<DateRange>,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            initial_amount: DEFAULT_INITIAL_AMOUNT,
            leverage: 1.0,
            range: None,
        }
    }
}

impl MarketConfig {
    pub fn validate(&self) -> Result<()> {
        validate_wealth_inputs(self.initial_amount, self.leverage)?;
        if let Some(range) = &self.range {
            range.validate()?;
        }
        Ok(())
    }
}
