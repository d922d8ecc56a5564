//! Historical price series and the returns derived from them
//!
//! Prices may have gaps. Interior gaps are forward-filled from the last valid
//! observation; leading gaps have nothing to fill from and are dropped. The
//! first retained observation is the base of the trajectory and produces no
//! return of its own.

use jiff::civil::Date;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::events::{EventSequence, ReturnEvent};
use crate::config::DateRange;
use crate::error::{Result, SimulationError};

/// Non-fatal data-quality findings recorded while deriving returns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SeriesWarning {
    /// Leading observations were missing and had to be dropped
    LeadingGap { ticker: String, dropped: usize },
    /// Interior observations were missing and carried forward
    ForwardFilled { ticker: String, filled: usize },
}

impl std::fmt::Display for SeriesWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeriesWarning::LeadingGap { ticker, dropped } => {
                write!(f, "{ticker}: dropped {dropped} leading missing observation(s)")
            }
            SeriesWarning::ForwardFilled { ticker, filled } => {
                write!(f, "{ticker}: carried forward {filled} missing observation(s)")
            }
        }
    }
}

/// A single asset's price history; `None` marks a missing observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPriceSeries")]
pub struct PriceSeries {
    pub ticker: String,
    dates: Vec<Date>,
    prices: Vec<Option<f64>>,
}

/// Unchecked wire form; `PriceSeries::new` enforces equal lengths
#[derive(Deserialize)]
struct RawPriceSeries {
    ticker: String,
    dates: Vec<Date>,
    prices: Vec<Option<f64>>,
}

impl TryFrom<RawPriceSeries> for PriceSeries {
    type Error = SimulationError;

    fn try_from(raw: RawPriceSeries) -> Result<Self> {
        PriceSeries::new(raw.ticker, raw.dates, raw.prices)
    }
}

impl PriceSeries {
    pub fn new(ticker: impl Into<String>, dates: Vec<Date>, prices: Vec<Option<f64>>) -> Result<Self> {
        let ticker = ticker.into();
        if dates.len() != prices.len() {
            return Err(SimulationError::MismatchedSeries {
                ticker,
                dates: dates.len(),
                prices: prices.len(),
            });
        }
        Ok(Self {
            ticker,
            dates,
            prices,
        })
    }

    /// Build a series with every observation present
    pub fn from_prices(ticker: impl Into<String>, dates: Vec<Date>, prices: &[f64]) -> Result<Self> {
        Self::new(ticker, dates, prices.iter().copied().map(Some).collect())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    #[must_use]
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    #[must_use]
    pub fn prices(&self) -> &[Option<f64>] {
        &self.prices
    }

    /// Observations dated inside `range` (inclusive on both ends)
    #[must_use]
    pub fn slice(&self, range: &DateRange) -> Self {
        let (dates, prices) = self
            .dates
            .iter()
            .zip(&self.prices)
            .filter(|(d, _)| range.contains(**d))
            .map(|(d, p)| (*d, *p))
            .unzip();
        Self {
            ticker: self.ticker.clone(),
            dates,
            prices,
        }
    }

    /// Carry the last valid price over missing or non-finite observations.
    ///
    /// Returns the retained dates and prices along with the number of leading
    /// observations dropped and interior observations filled.
    fn forward_filled(&self) -> (Vec<Date>, Vec<f64>, usize, usize) {
        let mut dates = Vec::with_capacity(self.dates.len());
        let mut prices = Vec::with_capacity(self.prices.len());
        let mut last: Option<f64> = None;
        let mut dropped = 0;
        let mut filled = 0;

        for (date, price) in self.dates.iter().zip(&self.prices) {
            match (price.filter(|p| p.is_finite()), last) {
                (Some(p), _) => {
                    last = Some(p);
                    dates.push(*date);
                    prices.push(p);
                }
                (None, Some(prev)) => {
                    filled += 1;
                    dates.push(*date);
                    prices.push(prev);
                }
                (None, None) => dropped += 1,
            }
        }

        (dates, prices, dropped, filled)
    }
}

/// Period-over-period returns of one asset, ready to drive the recurrence.
///
/// `dates[0]` is the base observation; `dates[i]` is the date of the period
/// that produced `events[i - 1]`, so `dates` lines up with the trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedReturns {
    pub ticker: String,
    pub dates: Vec<Date>,
    pub events: EventSequence,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<SeriesWarning>,
}

impl DerivedReturns {
    /// Date of the observation the trajectory starts from
    #[must_use]
    pub fn base_date(&self) -> Option<Date> {
        self.dates.first().copied()
    }

    #[must_use]
    pub fn periods(&self) -> usize {
        self.events.len()
    }
}

/// Convert a price series into fractional changes, dropping the first period.
///
/// Fails with `EmptyRange` when fewer than two usable observations remain and
/// with `DegenerateSeries` when a zero price would be a denominator.
pub fn derive_returns(series: &PriceSeries) -> Result<DerivedReturns> {
    let (dates, prices, dropped, filled) = series.forward_filled();

    let mut warnings = Vec::new();
    if dropped > 0 {
        tracing::warn!(ticker = %series.ticker, dropped, "dropping leading gap in price series");
        warnings.push(SeriesWarning::LeadingGap {
            ticker: series.ticker.clone(),
            dropped,
        });
    }
    if filled > 0 {
        tracing::debug!(ticker = %series.ticker, filled, "forward-filled missing prices");
        warnings.push(SeriesWarning::ForwardFilled {
            ticker: series.ticker.clone(),
            filled,
        });
    }

    if prices.len() < 2 {
        return Err(SimulationError::EmptyRange {
            ticker: series.ticker.clone(),
        });
    }

    let mut events = Vec::with_capacity(prices.len() - 1);
    for (i, pair) in prices.windows(2).enumerate() {
        let (prev, curr) = (pair[0], pair[1]);
        if prev == 0.0 {
            return Err(SimulationError::DegenerateSeries {
                ticker: series.ticker.clone(),
                date: dates[i],
            });
        }
        events.push(ReturnEvent((curr - prev) / prev));
    }

    Ok(DerivedReturns {
        ticker: series.ticker.clone(),
        dates,
        events: EventSequence::new(events),
        warnings,
    })
}

/// Date-aligned prices for several assets (one column per ticker)
#[derive(Debug, Clone)]
pub struct PriceTable {
    tickers: Vec<String>,
    dates: Vec<Date>,
    columns: Vec<Vec<Option<f64>>>,
    index: FxHashMap<String, usize>,
}

impl PriceTable {
    /// Create a table; every column must have one entry per date.
    pub fn new(tickers: Vec<String>, dates: Vec<Date>, columns: Vec<Vec<Option<f64>>>) -> Result<Self> {
        if tickers.len() != columns.len() {
            return Err(SimulationError::MismatchedSeries {
                ticker: tickers.join(","),
                dates: tickers.len(),
                prices: columns.len(),
            });
        }
        for (ticker, column) in tickers.iter().zip(&columns) {
            if column.len() != dates.len() {
                return Err(SimulationError::MismatchedSeries {
                    ticker: ticker.clone(),
                    dates: dates.len(),
                    prices: column.len(),
                });
            }
        }

        let index = tickers
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i))
            .collect();

        Ok(Self {
            tickers,
            dates,
            columns,
            index,
        })
    }

    #[must_use]
    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    #[must_use]
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    #[must_use]
    pub fn contains(&self, ticker: &str) -> bool {
        self.index.contains_key(ticker)
    }

    /// Extract one ticker's column as a standalone series
    #[must_use]
    pub fn series(&self, ticker: &str) -> Option<PriceSeries> {
        let idx = *self.index.get(ticker)?;
        Some(PriceSeries {
            ticker: self.tickers[idx].clone(),
            dates: self.dates.clone(),
            prices: self.columns[idx].clone(),
        })
    }

    /// Every column in table order
    #[must_use]
    pub fn all_series(&self) -> Vec<PriceSeries> {
        self.tickers
            .iter()
            .filter_map(|t| self.series(t))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;

    fn days(n: usize) -> Vec<Date> {
        (0..n)
            .map(|i| date(2020, 1, 1 + i as i8))
            .collect()
    }

    #[test]
    fn test_derive_returns_drops_first_period() {
        let series = PriceSeries::from_prices("IDX", days(3), &[100.0, 110.0, 99.0]).unwrap();
        let derived = derive_returns(&series).unwrap();

        let fractions: Vec<f64> = derived.events.fractions().collect();
        assert_eq!(fractions.len(), 2);
        assert!((fractions[0] - 0.1).abs() < 1e-12);
        assert!((fractions[1] + 0.1).abs() < 1e-12);
        assert_eq!(derived.dates.len(), 3);
        assert_eq!(derived.base_date(), Some(date(2020, 1, 1)));
        assert!(derived.warnings.is_empty());
    }

    #[test]
    fn test_forward_fill_interior_gap() {
        let series = PriceSeries::new(
            "IDX",
            days(4),
            vec![Some(100.0), None, Some(120.0), Some(f64::NAN)],
        )
        .unwrap();
        let derived = derive_returns(&series).unwrap();

        let fractions: Vec<f64> = derived.events.fractions().collect();
        assert_eq!(fractions, vec![0.0, 0.2, 0.0]);
        assert_eq!(
            derived.warnings,
            vec![SeriesWarning::ForwardFilled {
                ticker: "IDX".to_string(),
                filled: 2,
            }]
        );
    }

    #[test]
    fn test_leading_gap_dropped() {
        let series = PriceSeries::new(
            "IDX",
            days(4),
            vec![None, None, Some(50.0), Some(75.0)],
        )
        .unwrap();
        let derived = derive_returns(&series).unwrap();

        assert_eq!(derived.periods(), 1);
        assert_eq!(derived.base_date(), Some(date(2020, 1, 3)));
        assert_eq!(
            derived.warnings,
            vec![SeriesWarning::LeadingGap {
                ticker: "IDX".to_string(),
                dropped: 2,
            }]
        );
    }

    #[test]
    fn test_zero_price_is_degenerate() {
        let series = PriceSeries::from_prices("BUST", days(3), &[10.0, 0.0, 5.0]).unwrap();
        let err = derive_returns(&series).unwrap_err();
        assert_eq!(
            err,
            SimulationError::DegenerateSeries {
                ticker: "BUST".to_string(),
                date: date(2020, 1, 2),
            }
        );
    }

    #[test]
    fn test_zero_final_price_is_total_loss() {
        let series = PriceSeries::from_prices("BUST", days(2), &[10.0, 0.0]).unwrap();
        let derived = derive_returns(&series).unwrap();
        assert_eq!(derived.events.fractions().collect::<Vec<_>>(), vec![-1.0]);
    }

    #[test]
    fn test_too_few_observations_is_empty_range() {
        let single = PriceSeries::from_prices("ONE", days(1), &[10.0]).unwrap();
        assert!(matches!(
            derive_returns(&single),
            Err(SimulationError::EmptyRange { .. })
        ));

        let missing = PriceSeries::new("NONE", days(2), vec![None, None]).unwrap();
        assert!(matches!(
            derive_returns(&missing),
            Err(SimulationError::EmptyRange { .. })
        ));
    }

    #[test]
    fn test_slice_is_inclusive() {
        let series =
            PriceSeries::from_prices("IDX", days(5), &[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        let range = DateRange::new(date(2020, 1, 2), date(2020, 1, 4)).unwrap();
        let sliced = series.slice(&range);

        assert_eq!(sliced.len(), 3);
        assert_eq!(sliced.prices(), &[Some(2.0), Some(3.0), Some(4.0)]);
    }

    #[test]
    fn test_mismatched_lengths_rejected() {
        let err = PriceSeries::new("IDX", days(2), vec![Some(1.0)]).unwrap_err();
        assert!(matches!(err, SimulationError::MismatchedSeries { dates: 2, prices: 1, .. }));
    }

    #[test]
    fn test_price_table_lookup() {
        let table = PriceTable::new(
            vec!["A".to_string(), "B".to_string()],
            days(2),
            vec![vec![Some(1.0), Some(2.0)], vec![None, Some(3.0)]],
        )
        .unwrap();

        assert!(table.contains("B"));
        assert!(!table.contains("C"));
        let b = table.series("B").unwrap();
        assert_eq!(b.prices(), &[None, Some(3.0)]);
        assert_eq!(table.all_series().len(), 2);
        assert!(table.series("C").is_none());
    }

    #[test]
    fn test_deserialize_rejects_mismatched_lengths() {
        let ok: PriceSeries = serde_json::from_str(
            r#"{"ticker":"IDX","dates":["2020-01-01","2020-01-02"],"prices":[100.0,null]}"#,
        )
        .unwrap();
        assert_eq!(ok.prices(), [Some(100.0), None]);

        let short = serde_json::from_str::<PriceSeries>(
            r#"{"ticker":"IDX","dates":["2020-01-01","2020-01-02"],"prices":[100.0]}"#,
        );
        let err = short.unwrap_err().to_string();
        assert!(err.contains("IDX"), "{err}");
    }

    #[test]
    fn test_warning_display_names_ticker() {
        let warning = SeriesWarning::ForwardFilled {
            ticker: "NASDAQ".to_string(),
            filled: 3,
        };
        assert_eq!(
            warning.to_string(),
            "NASDAQ: carried forward 3 missing observation(s)"
        );
    }
}
