//! Identifiers for simulated entities
//!
//! A trial is either one synthetic sequence (numbered from zero) or the single
//! realized history of a tracked asset.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies the entity a trajectory belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum TrialLabel {
    /// Zero-based index of a synthetic trial
    Index(usize),
    /// Ticker of a tracked asset
    Ticker(String),
}

impl fmt::Display for TrialLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrialLabel::Index(i) => write!(f, "trial #{}", i + 1),
            TrialLabel::Ticker(t) => write!(f, "{t}"),
        }
    }
}
