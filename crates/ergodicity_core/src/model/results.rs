//! Simulation results and snapshots
//!
//! Contains trajectories for individual trials, the per-step ensemble
//! statistics, and the combined outputs of the synthetic and market runs.

use jiff::civil::Date;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::events::EventSequence;
use super::ids::TrialLabel;
use super::market::SeriesWarning;
use crate::analysis;
use crate::config::{EnsembleConfig, MarketConfig};
use crate::error::{Result, SimulationError};

/// Wealth at every step of one trial; index 0 is the initial amount
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct WealthTrajectory {
    values: Vec<f64>,
}

impl<'de> Deserialize<'de> for WealthTrajectory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let values = Vec::<f64>::deserialize(deserializer)?;
        if values.is_empty() {
            return Err(D::Error::custom(
                "a wealth trajectory holds at least the initial amount",
            ));
        }
        Ok(Self { values })
    }
}

impl WealthTrajectory {
    pub(crate) fn from_values(values: Vec<f64>) -> Self {
        debug_assert!(!values.is_empty());
        Self { values }
    }

    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of points, always `steps() + 1`
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false; a trajectory holds at least the initial amount
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn steps(&self) -> usize {
        self.values.len().saturating_sub(1)
    }

    #[must_use]
    pub fn get(&self, step: usize) -> Option<f64> {
        self.values.get(step).copied()
    }

    #[must_use]
    pub fn initial(&self) -> f64 {
        self.values[0]
    }

    #[must_use]
    pub fn final_value(&self) -> f64 {
        self.values[self.values.len() - 1]
    }

    /// Realized per-step geometric growth rate, `(W_N / W_0)^(1/N) - 1`.
    ///
    /// `None` for an empty sequence or when wealth ends at or below zero.
    #[must_use]
    pub fn time_average_growth(&self) -> Option<f64> {
        let steps = self.steps();
        let (initial, last) = (self.initial(), self.final_value());
        if steps == 0 || initial <= 0.0 || last <= 0.0 {
            return None;
        }
        Some((last / initial).powf(1.0 / steps as f64) - 1.0)
    }
}

/// One entity's complete run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trial {
    pub label: TrialLabel,
    pub events: EventSequence,
    pub trajectory: WealthTrajectory,
    /// Date of every trajectory point (market-data trials only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dates: Option<Vec<Date>>,
}

/// Cross-trial statistics at one time step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnsembleSnapshot {
    pub step: usize,
    pub mean: f64,
    pub median: f64,
    pub p5: f64,
    pub p95: f64,
    pub min: f64,
    pub max: f64,
    /// Share of trials holding less than the initial amount
    pub fraction_below_initial: f64,
}

impl EnsembleSnapshot {
    /// Reduce the values of all trials at `step`.
    ///
    /// Sorts `values` in place. Returns `None` when `values` is empty.
    pub(crate) fn from_values(step: usize, values: &mut [f64], initial_amount: f64) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mean = analysis::mean(values)?;
        values.sort_unstable_by(f64::total_cmp);
        let below = values.partition_point(|v| *v < initial_amount);

        Some(Self {
            step,
            mean,
            median: analysis::percentile_sorted(values, 0.5)?,
            p5: analysis::percentile_sorted(values, 0.05)?,
            p95: analysis::percentile_sorted(values, 0.95)?,
            min: values[0],
            max: values[values.len() - 1],
            fraction_below_initial: below as f64 / values.len() as f64,
        })
    }
}

/// One snapshot per step, aligned with every trial's trajectory
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnsembleTrajectory {
    snapshots: Vec<EnsembleSnapshot>,
}

impl EnsembleTrajectory {
    pub(crate) fn new(snapshots: Vec<EnsembleSnapshot>) -> Self {
        Self { snapshots }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    #[must_use]
    pub fn snapshots(&self) -> &[EnsembleSnapshot] {
        &self.snapshots
    }

    #[must_use]
    pub fn get(&self, step: usize) -> Option<&EnsembleSnapshot> {
        self.snapshots.get(step)
    }

    #[must_use]
    pub fn final_snapshot(&self) -> Option<&EnsembleSnapshot> {
        self.snapshots.last()
    }

    #[must_use]
    pub fn means(&self) -> Vec<f64> {
        self.snapshots.iter().map(|s| s.mean).collect()
    }

    #[must_use]
    pub fn medians(&self) -> Vec<f64> {
        self.snapshots.iter().map(|s| s.median).collect()
    }
}

/// Output of a synthetic multi-trial run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnsembleResult {
    pub config: EnsembleConfig,
    /// Seed every trial's random source was derived from
    pub seed: u64,
    pub ensemble: EnsembleTrajectory,
    pub trajectories: Vec<WealthTrajectory>,
}

impl EnsembleResult {
    #[must_use]
    pub fn trial_count(&self) -> usize {
        self.trajectories.len()
    }

    #[must_use]
    pub fn trajectory(&self, index: usize) -> Option<&WealthTrajectory> {
        self.trajectories.get(index)
    }

    /// The configured "specific case" trajectory, clamped to the last trial
    #[must_use]
    pub fn sample_trajectory(&self) -> Option<(usize, &WealthTrajectory)> {
        let last = self.trajectories.len().checked_sub(1)?;
        let index = self.config.sample_trial.min(last);
        Some((index, &self.trajectories[index]))
    }

    /// Re-derive the full trial, events included, from the stored seed
    pub fn trial(&self, index: usize) -> Result<Trial> {
        if index >= self.trajectories.len() {
            return Err(SimulationError::invalid(
                "trial",
                index as f64,
                "index is beyond the number of trials",
            ));
        }
        crate::simulation::rederive_trial(&self.config, self.seed, index)
    }

    #[must_use]
    pub fn final_wealth_values(&self) -> Vec<f64> {
        self.trajectories.iter().map(WealthTrajectory::final_value).collect()
    }

    /// Distinct final wealth values with the number of trials ending there
    #[must_use]
    pub fn final_wealth_counts(&self) -> Vec<(f64, usize)> {
        analysis::value_counts(&self.final_wealth_values())
    }

    /// Median over trials of the realized per-step growth rate
    #[must_use]
    pub fn median_time_average_growth(&self) -> Option<f64> {
        let mut rates: Vec<f64> = self
            .trajectories
            .iter()
            .filter_map(WealthTrajectory::time_average_growth)
            .collect();
        rates.sort_unstable_by(f64::total_cmp);
        analysis::percentile_sorted(&rates, 0.5)
    }
}

/// An asset that could not produce a trajectory
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetFailure {
    pub ticker: String,
    #[serde(serialize_with = "serialize_display")]
    pub error: SimulationError,
}

fn serialize_display<S: Serializer>(
    error: &SimulationError,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

/// Output of a market-data run: one realized trial per asset
#[derive(Debug, Clone, Serialize)]
pub struct MarketResult {
    pub config: MarketConfig,
    pub trials: Vec<Trial>,
    pub failures: Vec<AssetFailure>,
    pub warnings: Vec<SeriesWarning>,
}

impl MarketResult {
    #[must_use]
    pub fn trial(&self, ticker: &str) -> Option<&Trial> {
        self.trials
            .iter()
            .find(|t| matches!(&t.label, TrialLabel::Ticker(name) if name == ticker))
    }

    /// Trials ordered by final wealth, best first
    #[must_use]
    pub fn ranked(&self) -> Vec<&Trial> {
        let mut ranked: Vec<&Trial> = self.trials.iter().collect();
        ranked.sort_by(|a, b| {
            b.trajectory
                .final_value()
                .total_cmp(&a.trajectory.final_value())
        });
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trajectory_deserialize_requires_initial_amount() {
        let trajectory: WealthTrajectory = serde_json::from_str("[1000.0, 1500.0, 900.0]").unwrap();
        assert_eq!(trajectory.initial(), 1_000.0);
        assert_eq!(trajectory.final_value(), 900.0);
        assert_eq!(serde_json::to_string(&trajectory).unwrap(), "[1000.0,1500.0,900.0]");

        assert!(serde_json::from_str::<WealthTrajectory>("[]").is_err());
    }
}
