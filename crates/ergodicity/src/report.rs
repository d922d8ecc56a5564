//! Plain-text reports for the terminal

use ergodicity_core::analysis::{ensemble_growth_factor, optimal_leverage, time_average_growth_factor};
use ergodicity_core::model::{EnsembleResult, MarketResult, Trial};
use ergodicity_core::source::EventSource;

use crate::util::format::{
    format_compact_currency, format_currency, format_currency_short, format_growth, format_percentage,
};

/// Distinct final values listed before the distribution is summarized
const MAX_DISTRIBUTION_ROWS: usize = 30;

fn source_description(source: &EventSource) -> String {
    match source {
        EventSource::Synthetic {
            gain_pct,
            loss_pct,
            gain_probability,
            ..
        } => format!(
            "coin flip, +{} / -{} (p = {gain_probability:.2})",
            format_percentage(*gain_pct),
            format_percentage(*loss_pct)
        ),
        EventSource::HistoricalPriceDerived { returns } => {
            let span = match (returns.dates.first(), returns.dates.last()) {
                (Some(first), Some(last)) => format!(" {first} to {last}"),
                _ => String::new(),
            };
            format!("historical {}{span}", returns.ticker)
        }
    }
}

fn step_rows(len: usize, every: usize) -> Vec<usize> {
    let every = every.max(1);
    let mut rows: Vec<usize> = (0..len).step_by(every).collect();
    if let Some(last) = len.checked_sub(1)
        && rows.last() != Some(&last)
    {
        rows.push(last);
    }
    rows
}

fn ergodicity_summary(result: &EnsembleResult, lines: &mut Vec<String>) {
    let EventSource::Synthetic {
        gain_pct,
        loss_pct,
        gain_probability,
        ..
    } = &result.config.source
    else {
        return;
    };
    let (gain_pct, loss_pct, gain_probability) = (*gain_pct, *loss_pct, *gain_probability);
    let leverage = result.config.leverage;

    let ensemble = ensemble_growth_factor(leverage, gain_pct, loss_pct, gain_probability);
    let time_average = time_average_growth_factor(leverage, gain_pct, loss_pct, gain_probability);

    lines.push(String::new());
    lines.push("Ergodicity".to_string());
    lines.push(format!(
        "  ensemble average growth    {} per step",
        format_growth(Some(ensemble - 1.0))
    ));
    lines.push(format!(
        "  time-average growth        {} per step",
        format_growth(time_average.map(|f| f - 1.0))
    ));
    lines.push(format!(
        "  realized median growth     {} per step",
        format_growth(result.median_time_average_growth())
    ));
    match optimal_leverage(gain_pct, loss_pct, gain_probability) {
        Some(kelly) => lines.push(format!("  growth-optimal leverage    {kelly:.3}")),
        None => lines.push("  growth-optimal leverage    n/a".to_string()),
    }
}

/// Parameters, per-step ensemble table, final distribution and summary
#[must_use]
pub fn render_ensemble(result: &EnsembleResult, every: usize) -> String {
    let config = &result.config;
    let mut lines = vec![
        "Experiment parameters".to_string(),
        format!("  initial amount   {}", format_currency(config.initial_amount)),
        format!("  leverage         {:.2}", config.leverage),
        format!("  trials           {}", result.trial_count()),
        format!("  steps            {}", config.steps()),
        format!("  source           {}", source_description(&config.source)),
        format!("  seed             {}", result.seed),
        String::new(),
    ];

    let sample = result.sample_trajectory();
    let sample_header = sample.map_or_else(String::new, |(index, _)| format!("  trial #{}", index + 1));
    lines.push(format!(
        "{:>6}  {:>16}  {:>16}  {:>12}  {:>12}  {:>8}{sample_header}",
        "step", "ensemble mean", "median", "p5", "p95", "below"
    ));

    for step in step_rows(result.ensemble.len(), every) {
        let Some(snapshot) = result.ensemble.get(step) else {
            continue;
        };
        let sample_value = sample
            .and_then(|(_, t)| t.get(step))
            .map_or_else(String::new, |v| format!("  {:>12}", format_currency_short(v)));
        lines.push(format!(
            "{:>6}  {:>16}  {:>16}  {:>12}  {:>12}  {:>8}{sample_value}",
            step,
            format_currency(snapshot.mean),
            format_currency(snapshot.median),
            format_currency_short(snapshot.p5),
            format_currency_short(snapshot.p95),
            format_percentage(snapshot.fraction_below_initial),
        ));
    }

    let counts = result.final_wealth_counts();
    let trials = result.trial_count() as f64;
    lines.push(String::new());
    lines.push(format!("Final wealth ({} distinct values)", counts.len()));
    if counts.len() <= MAX_DISTRIBUTION_ROWS {
        for (wealth, count) in &counts {
            lines.push(format!(
                "  {:>16}  {:>8}  {:>8}",
                format_currency(*wealth),
                count,
                format_percentage(*count as f64 / trials)
            ));
        }
    } else if let Some(last) = result.ensemble.final_snapshot() {
        lines.push(format!(
            "  min {}  p5 {}  median {}  p95 {}  max {}",
            format_compact_currency(last.min),
            format_compact_currency(last.p5),
            format_compact_currency(last.median),
            format_compact_currency(last.p95),
            format_compact_currency(last.max),
        ));
    }

    ergodicity_summary(result, &mut lines);
    lines.push(String::new());
    lines.join("\n")
}

fn trial_row(trial: &Trial) -> String {
    let dates = trial.dates.as_deref().unwrap_or_default();
    let first = dates.first().map_or_else(|| "-".to_string(), ToString::to_string);
    let last = dates.last().map_or_else(|| "-".to_string(), ToString::to_string);
    format!(
        "  {:<10}  {:>10}  {:>10}  {:>8}  {:>16}  {:>10}",
        trial.label.to_string(),
        first,
        last,
        trial.events.len(),
        format_currency(trial.trajectory.final_value()),
        format_growth(trial.trajectory.time_average_growth()),
    )
}

/// One row per asset (best first), then failures and data warnings
#[must_use]
pub fn render_market(result: &MarketResult) -> String {
    let config = &result.config;
    let range = config
        .range
        .map_or_else(|| "full history".to_string(), |r| format!("{} to {}", r.start, r.end));
    let mut lines = vec![
        format!(
            "Market replay: {} at leverage {:.2}, {range}",
            format_currency(config.initial_amount),
            config.leverage
        ),
        String::new(),
        format!(
            "  {:<10}  {:>10}  {:>10}  {:>8}  {:>16}  {:>10}",
            "asset", "start", "end", "periods", "final wealth", "growth"
        ),
    ];
    lines.extend(result.ranked().into_iter().map(trial_row));

    if !result.failures.is_empty() {
        lines.push(String::new());
        lines.push("Failed assets".to_string());
        for failure in &result.failures {
            lines.push(format!("  {}: {}", failure.ticker, failure.error));
        }
    }
    if !result.warnings.is_empty() {
        lines.push(String::new());
        lines.push("Data warnings".to_string());
        lines.extend(result.warnings.iter().map(|w| format!("  {w}")));
    }

    lines.push(String::new());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ergodicity_core::config::{EnsembleBuilder, MarketConfig};
    use ergodicity_core::model::PriceSeries;
    use ergodicity_core::{run_ensemble, run_market};
    use jiff::civil::date;

    #[test]
    fn test_step_rows_include_last() {
        assert_eq!(step_rows(7, 3), [0, 3, 6]);
        assert_eq!(step_rows(8, 3), [0, 3, 6, 7]);
        assert_eq!(step_rows(3, 0), [0, 1, 2]);
        assert!(step_rows(0, 5).is_empty());
    }

    #[test]
    fn test_render_ensemble() {
        let config = EnsembleBuilder::coin_flip()
            .trials(500)
            .steps(10)
            .seed(3)
            .sample_trial(4)
            .build()
            .unwrap();
        let result = run_ensemble(&config).unwrap();
        let text = render_ensemble(&result, 5);

        assert!(text.contains("initial amount   $1,000.00"));
        assert!(text.contains("trial #5"));
        assert!(text.contains("Final wealth ("));
        assert!(text.contains("ensemble average growth    +5.000% per step"));
        assert!(text.contains("growth-optimal leverage    0.250"));
        // The step-0 row holds the exact initial amount
        assert!(
            text.lines()
                .any(|l| l.trim_start().starts_with("0 ") && l.contains("$1,000.00"))
        );
    }

    #[test]
    fn test_render_market() {
        let up = PriceSeries::from_prices(
            "UP",
            vec![date(2020, 1, 1), date(2020, 1, 2), date(2020, 1, 3)],
            &[100.0, 110.0, 99.0],
        )
        .unwrap();
        let broken = PriceSeries::from_prices("ZERO", vec![date(2020, 1, 1), date(2020, 1, 2)], &[0.0, 1.0]).unwrap();

        let result = run_market(&MarketConfig::default(), &[up, broken]).unwrap();
        let text = render_market(&result);

        assert!(text.contains("full history"));
        assert!(text.contains("UP"));
        assert!(text.contains("$990.00"));
        assert!(text.contains("Failed assets"));
        assert!(text.contains("ZERO:"));
    }
}
