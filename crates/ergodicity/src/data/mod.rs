//! Files the CLI reads and writes
//!
//! `settings` is the YAML settings file in the data directory, `prices` the
//! wide price CSV consumed by the `market` command.

pub mod prices;
pub mod settings;

pub use prices::{PriceLoadError, load_price_csv, parse_price_csv};
pub use settings::{MarketSettings, Settings, StorageError};
