//! Wide price CSV loading
//!
//! ```text
//! DATE,NASDAQ,SP500
//! 1995-01-10,755.54,461.68
//! 1995-01-11,.,461.66
//! ```
//!
//! The first column holds ISO dates, every other column one ticker. Empty
//! cells and `.` mark missing observations. Rows are sorted by date.

use std::fs;
use std::path::Path;

use ergodicity_core::SimulationError;
use ergodicity_core::model::PriceTable;
use jiff::civil::Date;

/// Error types for price-file loading
#[derive(Debug)]
pub enum PriceLoadError {
    Io(String),
    /// `line` is 1-based
    Parse { line: usize, message: String },
    Empty,
    Table(SimulationError),
}

impl std::fmt::Display for PriceLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PriceLoadError::Io(msg) => write!(f, "IO error: {msg}"),
            PriceLoadError::Parse { line, message } => write!(f, "line {line}: {message}"),
            PriceLoadError::Empty => write!(f, "price file has no header row"),
            PriceLoadError::Table(err) => write!(f, "invalid price table: {err}"),
        }
    }
}

impl std::error::Error for PriceLoadError {}

fn parse_cell(cell: &str, line: usize, ticker: &str) -> Result<Option<f64>, PriceLoadError> {
    let cell = cell.trim();
    if cell.is_empty() || cell == "." {
        return Ok(None);
    }
    cell.parse::<f64>()
        .map(Some)
        .map_err(|e| PriceLoadError::Parse {
            line,
            message: format!("{ticker} price {cell:?}: {e}"),
        })
}

pub fn parse_price_csv(text: &str) -> Result<PriceTable, PriceLoadError> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim_end_matches('\r')))
        .filter(|(_, l)| !l.trim().is_empty());

    let (header_line, header) = lines.next().ok_or(PriceLoadError::Empty)?;
    let tickers: Vec<String> = header
        .split(',')
        .skip(1)
        .map(|t| t.trim().to_string())
        .collect();
    if let Some(blank) = tickers.iter().position(String::is_empty) {
        return Err(PriceLoadError::Parse {
            line: header_line,
            message: format!("column {} has no ticker name", blank + 2),
        });
    }

    let mut rows: Vec<(Date, Vec<Option<f64>>)> = Vec::new();
    for (line, row) in lines {
        let cells: Vec<&str> = row.split(',').collect();
        if cells.len() != tickers.len() + 1 {
            return Err(PriceLoadError::Parse {
                line,
                message: format!("expected {} prices, found {}", tickers.len(), cells.len() - 1),
            });
        }

        let date_cell = cells[0].trim();
        let date: Date = date_cell.parse().map_err(|e| PriceLoadError::Parse {
            line,
            message: format!("date {date_cell:?}: {e}"),
        })?;
        let values = cells[1..]
            .iter()
            .zip(&tickers)
            .map(|(cell, ticker)| parse_cell(cell, line, ticker))
            .collect::<Result<Vec<_>, _>>()?;
        rows.push((date, values));
    }
    rows.sort_by_key(|(date, _)| *date);

    let dates: Vec<Date> = rows.iter().map(|(d, _)| *d).collect();
    let columns = (0..tickers.len())
        .map(|col| rows.iter().map(|(_, values)| values[col]).collect())
        .collect();

    tracing::debug!(tickers = tickers.len(), rows = dates.len(), "parsed price table");
    PriceTable::new(tickers, dates, columns).map_err(PriceLoadError::Table)
}

pub fn load_price_csv(path: &Path) -> Result<PriceTable, PriceLoadError> {
    let text = fs::read_to_string(path)
        .map_err(|e| PriceLoadError::Io(format!("Failed to read {}: {e}", path.display())))?;
    parse_price_csv(&text)
}
