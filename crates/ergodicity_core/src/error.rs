use std::fmt;

use jiff::civil::Date;

/// Errors produced by event generation, return derivation and aggregation
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// A caller-supplied parameter is unusable; nothing was computed
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
    /// A zero price was about to be used as a fractional-change denominator
    DegenerateSeries { ticker: String, date: Date },
    /// The requested range holds fewer than two usable observations
    EmptyRange { ticker: String },
    /// Dates and prices of a series have different lengths
    MismatchedSeries {
        ticker: String,
        dates: usize,
        prices: usize,
    },
    /// A run was abandoned between trials
    Cancelled,
}

impl SimulationError {
    pub(crate) fn invalid(name: &'static str, value: f64, reason: &'static str) -> Self {
        SimulationError::InvalidParameter {
            name,
            value,
            reason,
        }
    }
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::InvalidParameter {
                name,
                value,
                reason,
            } => write!(f, "invalid parameter {name}={value}: {reason}"),
            SimulationError::DegenerateSeries { ticker, date } => {
                write!(f, "series {ticker} has a zero price on {date}")
            }
            SimulationError::EmptyRange { ticker } => {
                write!(f, "series {ticker} has nothing to compute in the requested range")
            }
            SimulationError::MismatchedSeries {
                ticker,
                dates,
                prices,
            } => write!(
                f,
                "series {ticker} has {dates} dates but {prices} price observations"
            ),
            SimulationError::Cancelled => write!(f, "simulation cancelled"),
        }
    }
}

impl std::error::Error for SimulationError {}

pub type Result<T> = std::result::Result<T, SimulationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = SimulationError::invalid("leverage", f64::NAN, "must be finite");
        assert_eq!(err.to_string(), "invalid parameter leverage=NaN: must be finite");

        let err = SimulationError::DegenerateSeries {
            ticker: "NASDAQ".to_string(),
            date: jiff::civil::date(2008, 10, 1),
        };
        assert_eq!(err.to_string(), "series NASDAQ has a zero price on 2008-10-01");

        assert_eq!(SimulationError::Cancelled.to_string(), "simulation cancelled");
    }
}
