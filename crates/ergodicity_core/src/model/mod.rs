mod events;
mod ids;
mod market;
mod results;

pub use events::{EventSequence, ReturnEvent};
pub use ids::TrialLabel;
pub use market::{DerivedReturns, PriceSeries, PriceTable, SeriesWarning, derive_returns};
pub use results::{
    AssetFailure, EnsembleResult, EnsembleSnapshot, EnsembleTrajectory, MarketResult, Trial,
    WealthTrajectory,
};
