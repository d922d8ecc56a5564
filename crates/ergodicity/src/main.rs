use clap::Parser;
use color_eyre::eyre::{WrapErr, bail, eyre};
use ergodicity::cli::{Cli, CoinFlipArgs, Command, MarketArgs};
use ergodicity::data::{Settings, load_price_csv};
use ergodicity::init_logging;
use ergodicity::report::{render_ensemble, render_market};
use ergodicity::runner::{run_coin_flip, run_market_table, table_bounds};
use std::path::{Path, PathBuf};

fn coin_flip(settings: Settings, args: &CoinFlipArgs) -> color_eyre::Result<()> {
    let config = args.apply(settings.coin_flip)?;
    if args.overrides_source() && !config.source.is_random() {
        tracing::warn!("--steps, --gain and --loss have no effect on a historical source");
    }

    let result = run_coin_flip(&config)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", render_ensemble(&result, args.every));
    }
    Ok(())
}

fn market(settings: Settings, args: &MarketArgs) -> color_eyre::Result<()> {
    let prices = args
        .prices
        .clone()
        .or(settings.market.prices_path)
        .ok_or_else(|| eyre!("no price file: pass --prices or set market.prices_path"))?;
    let table = load_price_csv(&prices).wrap_err_with(|| format!("loading {}", prices.display()))?;

    let config = args.apply(settings.market.simulation, table_bounds(&table))?;
    let tickers = if args.tickers.is_empty() {
        settings.market.tickers
    } else {
        args.tickers.clone()
    };

    let result = run_market_table(&config, &table, &tickers)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", render_market(&result));
    }
    if result.trials.is_empty() {
        bail!("no asset produced a trajectory");
    }
    Ok(())
}

fn init_config(path: &Path, force: bool) -> color_eyre::Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    Settings::default().save(path)?;
    println!("wrote {}", path.display());
    Ok(())
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let _guard = init_logging(cli.log_dir.as_deref(), &cli.log_level)?;
    let settings_path = cli.settings_path();

    match &cli.command {
        Command::CoinFlip(args) => {
            tracing::debug!(settings = %settings_path.display(), "coin-flip");
            coin_flip(Settings::load_or_default(&settings_path)?, args)
        }
        Command::Market(args) => {
            tracing::debug!(settings = %settings_path.display(), "market");
            market(Settings::load_or_default(&settings_path)?, args)
        }
        Command::InitConfig { path, force } => {
            let target: PathBuf = path.clone().unwrap_or(settings_path);
            init_config(&target, *force)
        }
    }
}
