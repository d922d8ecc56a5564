//! Command-line front end for the ergodicity simulator.
//!
//! The binary in `main.rs` parses arguments, loads the YAML settings file and
//! hands the merged configuration to `ergodicity_core`. Everything here is
//! presentation: settings storage, price-file loading and text reports.

pub mod cli;
pub mod data;
pub mod logging;
pub mod report;
pub mod runner;
pub mod util;

pub use logging::init_logging;
