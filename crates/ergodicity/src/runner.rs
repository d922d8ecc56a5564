//! Glue between parsed settings and the core runners

use std::thread;
use std::time::{Duration, Instant};

use color_eyre::eyre::{Result, bail};
use ergodicity_core::config::{EnsembleConfig, MarketConfig};
use ergodicity_core::model::{EnsembleResult, MarketResult, PriceSeries, PriceTable};
use ergodicity_core::simulation::{EnsembleProgress, run_ensemble_with_progress, run_market};
use jiff::civil::Date;

const POLL_INTERVAL: Duration = Duration::from_millis(20);
const LOG_INTERVAL: Duration = Duration::from_secs(1);

/// Run the ensemble on a worker thread, logging progress about once a second
pub fn run_coin_flip(config: &EnsembleConfig) -> Result<EnsembleResult> {
    let progress = EnsembleProgress::new(config.trials);

    let outcome = thread::scope(|s| {
        let handle = s.spawn(|| run_ensemble_with_progress(config, &progress));

        let mut last_log = Instant::now();
        while !handle.is_finished() {
            thread::sleep(POLL_INTERVAL);
            if last_log.elapsed() >= LOG_INTERVAL {
                tracing::info!(
                    completed = progress.completed(),
                    total = progress.total(),
                    "ensemble progress"
                );
                last_log = Instant::now();
            }
        }
        handle
            .join()
            .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
    });

    Ok(outcome?)
}

/// First and last date of the table
#[must_use]
pub fn table_bounds(table: &PriceTable) -> Option<(Date, Date)> {
    Some((*table.dates().first()?, *table.dates().last()?))
}

/// The series for `tickers`, or every column when `tickers` is empty
pub fn select_series(table: &PriceTable, tickers: &[String]) -> Result<Vec<PriceSeries>> {
    if tickers.is_empty() {
        return Ok(table.all_series());
    }

    let unknown: Vec<&str> = tickers
        .iter()
        .filter(|t| !table.contains(t))
        .map(String::as_str)
        .collect();
    if !unknown.is_empty() {
        bail!(
            "unknown ticker(s) {}; the price file has {}",
            unknown.join(", "),
            table.tickers().join(", ")
        );
    }

    Ok(tickers.iter().filter_map(|t| table.series(t)).collect())
}

pub fn run_market_table(config: &MarketConfig, table: &PriceTable, tickers: &[String]) -> Result<MarketResult> {
    let series = select_series(table, tickers)?;
    tracing::debug!(assets = series.len(), "selected market series");
    Ok(run_market(config, &series)?)
}
