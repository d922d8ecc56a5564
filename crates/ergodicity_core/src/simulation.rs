//! Trial fan-out and ensemble aggregation.
//!
//! Every trial owns a random source seeded from `(run seed, trial index)`, so
//! a run gives the same trajectories whether trials execute sequentially or on
//! the rayon pool. Results are joined in trial order and then reduced step by
//! step into ensemble snapshots.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};

use crate::config::{EnsembleConfig, MarketConfig};
use crate::error::{Result, SimulationError};
use crate::model::{
    AssetFailure, EnsembleResult, EnsembleSnapshot, EnsembleTrajectory, MarketResult, PriceSeries,
    SeriesWarning, Trial, TrialLabel, WealthTrajectory, derive_returns,
};
use crate::recurrence::compute_trajectory;

/// Trials sharing one seed-derivation stream
const MAX_BATCH_SIZE: usize = 100;

/// Progress tracking and cancellation shared with the caller
#[derive(Debug, Clone)]
pub struct EnsembleProgress {
    completed: Arc<AtomicUsize>,
    total: Arc<AtomicUsize>,
    cancelled: Arc<AtomicBool>,
}

impl EnsembleProgress {
    #[must_use]
    pub fn new(total: usize) -> Self {
        Self {
            completed: Arc::new(AtomicUsize::new(0)),
            total: Arc::new(AtomicUsize::new(total)),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    #[must_use]
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total.load(Ordering::Relaxed)
    }

    pub fn increment(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn reset(&self, total: usize) {
        self.completed.store(0, Ordering::Relaxed);
        self.total.store(total, Ordering::Relaxed);
    }

    /// Request that the run stop at the next trial boundary
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

impl Default for EnsembleProgress {
    fn default() -> Self {
        Self::new(0)
    }
}

/// Apply `f` to every item, in parallel when the `parallel` feature is on.
/// Output order always matches input order.
fn fan_out<I, T, F>(items: &[I], f: F) -> Vec<T>
where
    I: Sync,
    T: Send,
    F: Fn(usize, &I) -> T + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        items.par_iter().enumerate().map(|(i, item)| f(i, item)).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        items.iter().enumerate().map(|(i, item)| f(i, item)).collect()
    }
}

/// SplitMix64 finalizer
fn mix(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Stream for one batch, keyed on the full `(base_seed, batch)` pair
fn batch_rng(base_seed: u64, batch: usize) -> SmallRng {
    let batch_key = (batch as u64).wrapping_add(1).wrapping_mul(0x9e37_79b9_7f4a_7c15);
    SmallRng::seed_from_u64(mix(mix(base_seed) ^ batch_key))
}

/// Per-trial seeds for a run, in trial order
#[must_use]
pub fn trial_seeds(base_seed: u64, count: usize) -> Vec<u64> {
    let mut seeds = Vec::with_capacity(count);
    for batch in 0..count.div_ceil(MAX_BATCH_SIZE) {
        let mut rng = batch_rng(base_seed, batch);
        let batch_size = MAX_BATCH_SIZE.min(count - batch * MAX_BATCH_SIZE);
        seeds.extend((0..batch_size).map(|_| rng.next_u64()));
    }
    seeds
}

/// The seed `trial_seeds(base_seed, n)[index]` would produce, for any `n > index`
#[must_use]
pub fn trial_seed(base_seed: u64, index: usize) -> u64 {
    let mut rng = batch_rng(base_seed, index / MAX_BATCH_SIZE);
    for _ in 0..index % MAX_BATCH_SIZE {
        rng.next_u64();
    }
    rng.next_u64()
}

fn simulate_trial(config: &EnsembleConfig, index: usize, seed: u64) -> Result<Trial> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let events = config.source.sample_sequence(&mut rng)?;
    let trajectory = compute_trajectory(config.initial_amount, config.leverage, events.as_slice());
    Ok(Trial {
        label: TrialLabel::Index(index),
        events,
        trajectory,
        dates: config.source.dates().map(|d| d.to_vec()),
    })
}

pub(crate) fn rederive_trial(config: &EnsembleConfig, base_seed: u64, index: usize) -> Result<Trial> {
    simulate_trial(config, index, trial_seed(base_seed, index))
}

/// Reduce trajectories of equal length into one snapshot per step
#[must_use]
pub fn aggregate(trajectories: &[WealthTrajectory], initial_amount: f64) -> EnsembleTrajectory {
    let len = trajectories.first().map_or(0, WealthTrajectory::len);
    let steps: Vec<usize> = (0..len).collect();

    let snapshots = fan_out(&steps, |_, &step| {
        let mut values: Vec<f64> = trajectories.iter().filter_map(|t| t.get(step)).collect();
        EnsembleSnapshot::from_values(step, &mut values, initial_amount)
    });

    EnsembleTrajectory::new(snapshots.into_iter().flatten().collect())
}

/// Run `config.trials` independent trials and aggregate them
pub fn run_ensemble(config: &EnsembleConfig) -> Result<EnsembleResult> {
    run_ensemble_with_progress(config, &EnsembleProgress::default())
}

/// As `run_ensemble`, reporting completed trials and honoring cancellation
pub fn run_ensemble_with_progress(
    config: &EnsembleConfig,
    progress: &EnsembleProgress,
) -> Result<EnsembleResult> {
    config.validate()?;

    let seed = config.seed.unwrap_or_else(|| rand::rng().random());
    progress.reset(config.trials);
    tracing::info!(
        trials = config.trials,
        steps = config.steps(),
        leverage = config.leverage,
        seed,
        "starting ensemble run"
    );

    let seeds = trial_seeds(seed, config.trials);
    let trajectories = fan_out(&seeds, |index, &own_seed| {
        if progress.is_cancelled() {
            return Err(SimulationError::Cancelled);
        }
        let trial = simulate_trial(config, index, own_seed)?;
        progress.increment();
        Ok(trial.trajectory)
    })
    .into_iter()
    .collect::<Result<Vec<_>>>()?;

    let ensemble = aggregate(&trajectories, config.initial_amount);
    if let Some(last) = ensemble.final_snapshot() {
        tracing::info!(
            mean = last.mean,
            median = last.median,
            "ensemble run complete"
        );
    }

    Ok(EnsembleResult {
        config: config.clone(),
        seed,
        ensemble,
        trajectories,
    })
}

/// One asset's realized trial and the data-quality warnings met on the way
pub fn run_asset(config: &MarketConfig, series: &PriceSeries) -> Result<(Trial, Vec<SeriesWarning>)> {
    let derived = match &config.range {
        Some(range) => derive_returns(&series.slice(range))?,
        None => derive_returns(series)?,
    };
    let trajectory = compute_trajectory(
        config.initial_amount,
        config.leverage,
        derived.events.as_slice(),
    );

    let trial = Trial {
        label: TrialLabel::Ticker(derived.ticker),
        events: derived.events,
        trajectory,
        dates: Some(derived.dates),
    };
    Ok((trial, derived.warnings))
}

/// One trial per asset; failing assets are reported, the rest still run
pub fn run_market(config: &MarketConfig, series: &[PriceSeries]) -> Result<MarketResult> {
    run_market_with_progress(config, series, &EnsembleProgress::default())
}

pub fn run_market_with_progress(
    config: &MarketConfig,
    series: &[PriceSeries],
    progress: &EnsembleProgress,
) -> Result<MarketResult> {
    config.validate()?;
    progress.reset(series.len());
    tracing::info!(
        assets = series.len(),
        leverage = config.leverage,
        "starting market run"
    );

    let outcomes = fan_out(series, |_, s| {
        if progress.is_cancelled() {
            return Err(SimulationError::Cancelled);
        }
        let outcome = run_asset(config, s);
        progress.increment();
        Ok(outcome)
    });

    let mut trials = Vec::new();
    let mut failures = Vec::new();
    let mut warnings = Vec::new();
    for (s, outcome) in series.iter().zip(outcomes) {
        match outcome? {
            Ok((trial, w)) => {
                trials.push(trial);
                warnings.extend(w);
            }
            Err(error) => {
                tracing::warn!(ticker = %s.ticker, %error, "asset excluded from market run");
                failures.push(AssetFailure {
                    ticker: s.ticker.clone(),
                    error,
                });
            }
        }
    }

    Ok(MarketResult {
        config: config.clone(),
        trials,
        failures,
        warnings,
    })
}
