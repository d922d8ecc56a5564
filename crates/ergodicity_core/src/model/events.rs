//! Per-period return events

use serde::{Deserialize, Serialize};

/// The outcome of a single period as a fractional return
/// (`0.5` is a 50% gain, `-0.4` a 40% loss)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReturnEvent(pub f64);

impl ReturnEvent {
    #[must_use]
    pub fn fraction(self) -> f64 {
        self.0
    }
}

/// Ordered return events; position `i` drives trajectory step `i + 1`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventSequence {
    events: Vec<ReturnEvent>,
}

impl EventSequence {
    #[must_use]
    pub fn new(events: Vec<ReturnEvent>) -> Self {
        Self { events }
    }

    #[must_use]
    pub fn from_fractions(fractions: &[f64]) -> Self {
        Self {
            events: fractions.iter().copied().map(ReturnEvent).collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[ReturnEvent] {
        &self.events
    }

    pub fn fractions(&self) -> impl Iterator<Item = f64> + '_ {
        self.events.iter().map(|e| e.0)
    }

    /// Number of events with a strictly positive return
    #[must_use]
    pub fn gain_count(&self) -> usize {
        self.events.iter().filter(|e| e.0 > 0.0).count()
    }
}

impl From<Vec<ReturnEvent>> for EventSequence {
    fn from(events: Vec<ReturnEvent>) -> Self {
        Self::new(events)
    }
}

impl FromIterator<ReturnEvent> for EventSequence {
    fn from_iter<I: IntoIterator<Item = ReturnEvent>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
