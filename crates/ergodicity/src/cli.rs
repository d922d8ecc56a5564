use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use ergodicity_core::config::{DateRange, EnsembleBuilder, EnsembleConfig, MarketConfig};
use ergodicity_core::error::Result;
use jiff::civil::Date;

use crate::data::settings::{SETTINGS_FILE_NAME, default_data_dir};

#[derive(Parser, Debug)]
#[command(name = "ergodicity")]
#[command(about = "Ensemble versus time averages of leveraged multiplicative wealth")]
pub struct Cli {
    /// Path to the data directory (default: ~/.ergodicity/)
    #[arg(short, long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Settings file (default: <data-dir>/settings.yaml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Write logs to <log-dir>/ergodicity.log instead of stderr
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    #[must_use]
    pub fn settings_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(|| {
            self.data_dir
                .clone()
                .unwrap_or_else(default_data_dir)
                .join(SETTINGS_FILE_NAME)
        })
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the synthetic coin-flip ensemble
    CoinFlip(CoinFlipArgs),
    /// Replay historical prices, one trajectory per asset
    Market(MarketArgs),
    /// Write the default settings file
    InitConfig {
        /// Destination (default: the settings path)
        path: Option<PathBuf>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Overrides for the `coin_flip` settings section
#[derive(Args, Debug, Default)]
pub struct CoinFlipArgs {
    #[arg(long)]
    pub initial_amount: Option<f64>,
    /// Fraction of wealth exposed each step
    #[arg(long, allow_negative_numbers = true)]
    pub leverage: Option<f64>,
    /// Fractional gain on heads
    #[arg(long)]
    pub gain: Option<f64>,
    /// Fractional loss on tails
    #[arg(long)]
    pub loss: Option<f64>,
    #[arg(long)]
    pub steps: Option<usize>,
    #[arg(long)]
    pub trials: Option<usize>,
    #[arg(long)]
    pub seed: Option<u64>,
    /// Trial shown as the single realized trajectory (0-based)
    #[arg(long)]
    pub sample_trial: Option<usize>,
    /// Print every Nth step of the ensemble table
    #[arg(long, default_value_t = 5)]
    pub every: usize,
    /// Print the full result as JSON
    #[arg(long)]
    pub json: bool,
}

impl CoinFlipArgs {
    /// Apply flag overrides to `base` and validate the result
    pub fn apply(&self, base: EnsembleConfig) -> Result<EnsembleConfig> {
        let mut builder = EnsembleBuilder::coin_flip()
            .source(base.source)
            .initial_amount(self.initial_amount.unwrap_or(base.initial_amount))
            .leverage(self.leverage.unwrap_or(base.leverage))
            .trials(self.trials.unwrap_or(base.trials))
            .sample_trial(self.sample_trial.unwrap_or(base.sample_trial));

        if let Some(seed) = self.seed.or(base.seed) {
            builder = builder.seed(seed);
        }
        if let Some(steps) = self.steps {
            builder = builder.steps(steps);
        }
        if let Some(gain) = self.gain {
            builder = builder.gain(gain);
        }
        if let Some(loss) = self.loss {
            builder = builder.loss(loss);
        }
        builder.build()
    }

    /// Whether any flag targets the synthetic source
    #[must_use]
    pub fn overrides_source(&self) -> bool {
        self.steps.is_some() || self.gain.is_some() || self.loss.is_some()
    }
}

/// Overrides for the `market` settings section
#[derive(Args, Debug, Default)]
pub struct MarketArgs {
    /// Wide price CSV: DATE,<TICKER>...
    #[arg(long)]
    pub prices: Option<PathBuf>,
    /// Restrict to these tickers (repeatable)
    #[arg(long = "ticker")]
    pub tickers: Vec<String>,
    /// First date of the range (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<Date>,
    /// Last date of the range (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<Date>,
    #[arg(long)]
    pub initial_amount: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    pub leverage: Option<f64>,
    #[arg(long)]
    pub json: bool,
}

impl MarketArgs {
    /// Apply flag overrides to `base`. A lone `--start` or `--end` keeps the
    /// other bound from `base`, falling back to `table_bounds`.
    pub fn apply(&self, base: MarketConfig, table_bounds: Option<(Date, Date)>) -> Result<MarketConfig> {
        let range = match (self.start, self.end) {
            (None, None) => base.range,
            (start, end) => {
                let fallback = base.range.map(|r| (r.start, r.end)).or(table_bounds);
                match (start.or(fallback.map(|b| b.0)), end.or(fallback.map(|b| b.1))) {
                    (Some(start), Some(end)) => Some(DateRange::new(start, end)?),
                    _ => None,
                }
            }
        };

        let config = MarketConfig {
            initial_amount: self.initial_amount.unwrap_or(base.initial_amount),
            leverage: self.leverage.unwrap_or(base.leverage),
            range,
        };
        config.validate()?;
        Ok(config)
    }
}
