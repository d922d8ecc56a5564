//! Return-event sources
//!
//! Synthetic sources flip a coin per period and map heads to a fixed gain and
//! tails to a fixed loss. Historical sources replay returns derived from a
//! price series. Both produce an `EventSequence` for the recurrence.

use jiff::civil::Date;
use rand::Rng;
use rand_distr::{Bernoulli, Distribution};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};
use crate::model::{DerivedReturns, EventSequence, ReturnEvent};

fn fair_coin() -> f64 {
    0.5
}

/// Where a trial's return events come from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EventSource {
    /// Independent coin flips: `+gain_pct` with `gain_probability`, else `-loss_pct`
    Synthetic {
        steps: usize,
        gain_pct: f64,
        loss_pct: f64,
        #[serde(default = "fair_coin")]
        gain_probability: f64,
    },
    /// Returns derived once from a historical price series
    HistoricalPriceDerived { returns: DerivedReturns },
}

impl Default for EventSource {
    fn default() -> Self {
        Self::coin_flip(60, 0.5, 0.4)
    }
}

impl EventSource {
    /// Fair coin with the given gain and loss fractions
    #[must_use]
    pub fn coin_flip(steps: usize, gain_pct: f64, loss_pct: f64) -> Self {
        EventSource::Synthetic {
            steps,
            gain_pct,
            loss_pct,
            gain_probability: fair_coin(),
        }
    }

    #[must_use]
    pub fn historical(returns: DerivedReturns) -> Self {
        EventSource::HistoricalPriceDerived { returns }
    }

    /// Number of events every sampled sequence holds
    #[must_use]
    pub fn steps(&self) -> usize {
        match self {
            EventSource::Synthetic { steps, .. } => *steps,
            EventSource::HistoricalPriceDerived { returns } => returns.periods(),
        }
    }

    /// Whether repeated samples differ (and so need a random source)
    #[must_use]
    pub fn is_random(&self) -> bool {
        matches!(self, EventSource::Synthetic { .. })
    }

    /// Trajectory dates for historical sources
    #[must_use]
    pub fn dates(&self) -> Option<&[Date]> {
        match self {
            EventSource::Synthetic { .. } => None,
            EventSource::HistoricalPriceDerived { returns } => Some(&returns.dates),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let EventSource::HistoricalPriceDerived { returns } = self {
            return validate_returns(returns);
        }
        if let EventSource::Synthetic {
            gain_pct,
            loss_pct,
            gain_probability,
            ..
        } = self
        {
            if !gain_pct.is_finite() {
                return Err(SimulationError::invalid("gain_pct", *gain_pct, "must be finite"));
            }
            if !loss_pct.is_finite() {
                return Err(SimulationError::invalid("loss_pct", *loss_pct, "must be finite"));
            }
            if !(0.0..=1.0).contains(gain_probability) {
                return Err(SimulationError::invalid(
                    "gain_probability",
                    *gain_probability,
                    "must lie in [0, 1]",
                ));
            }
        }
        Ok(())
    }

    /// Draw one event sequence. Historical sources ignore `rng`.
    pub fn sample_sequence<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<EventSequence> {
        match self {
            EventSource::Synthetic {
                steps,
                gain_pct,
                loss_pct,
                gain_probability,
            } => {
                if *gain_probability == fair_coin() {
                    return Ok(generate_events(rng, *steps, *gain_pct, *loss_pct));
                }
                let flip = Bernoulli::new(*gain_probability).map_err(|_| {
                    SimulationError::invalid(
                        "gain_probability",
                        *gain_probability,
                        "must lie in [0, 1]",
                    )
                })?;
                Ok(draw_events(rng, *steps, *gain_pct, *loss_pct, |r| {
                    flip.sample(r)
                }))
            }
            EventSource::HistoricalPriceDerived { returns } => Ok(returns.events.clone()),
        }
    }
}

/// What `derive_returns` guarantees, rechecked for deserialized returns
fn validate_returns(returns: &DerivedReturns) -> Result<()> {
    if returns.dates.len() != returns.events.len() + 1 {
        return Err(SimulationError::invalid(
            "returns",
            returns.dates.len() as f64,
            "historical returns need exactly one more date than return events",
        ));
    }
    if let Some(bad) = returns.events.fractions().find(|r| !r.is_finite()) {
        return Err(SimulationError::invalid(
            "returns",
            bad,
            "every historical return must be finite",
        ));
    }
    Ok(())
}

fn draw_events<R, F>(rng: &mut R, steps: usize, gain_pct: f64, loss_pct: f64, mut flip: F) -> EventSequence
where
    R: Rng + ?Sized,
    F: FnMut(&mut R) -> bool,
{
    (0..steps)
        .map(|_| {
            if flip(rng) {
                ReturnEvent(gain_pct)
            } else {
                ReturnEvent(-loss_pct)
            }
        })
        .collect()
}

/// `steps` fair coin flips: heads is `+gain_pct`, tails is `-loss_pct`
pub fn generate_events<R: Rng + ?Sized>(rng: &mut R, steps: usize, gain_pct: f64, loss_pct: f64) -> EventSequence {
    draw_events(rng, steps, gain_pct, loss_pct, |r| r.random::<bool>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn test_generate_events_maps_outcomes() {
        let mut rng = SmallRng::seed_from_u64(10);
        let events = generate_events(&mut rng, 1_000, 0.5, 0.4);

        assert_eq!(events.len(), 1_000);
        assert!(events.fractions().all(|r| r == 0.5 || r == -0.4));

        // A fair coin lands heads roughly half the time
        let gains = events.gain_count();
        assert!((400..=600).contains(&gains), "got {gains} gains");
    }

    #[test]
    fn test_generate_zero_steps() {
        let mut rng = SmallRng::seed_from_u64(1);
        assert!(generate_events(&mut rng, 0, 0.5, 0.4).is_empty());
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let source = EventSource::coin_flip(60, 0.5, 0.4);
        let a = source
            .sample_sequence(&mut SmallRng::seed_from_u64(42))
            .unwrap();
        let b = source
            .sample_sequence(&mut SmallRng::seed_from_u64(42))
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_biased_coin_extremes() {
        let always = EventSource::Synthetic {
            steps: 20,
            gain_pct: 0.1,
            loss_pct: 0.2,
            gain_probability: 1.0,
        };
        let mut rng = SmallRng::seed_from_u64(3);
        let events = always.sample_sequence(&mut rng).unwrap();
        assert_eq!(events.gain_count(), 20);

        let never = EventSource::Synthetic {
            steps: 20,
            gain_pct: 0.1,
            loss_pct: 0.2,
            gain_probability: 0.0,
        };
        assert_eq!(never.sample_sequence(&mut rng).unwrap().gain_count(), 0);
    }

    #[test]
    fn test_validate_rejects_bad_parameters() {
        assert!(EventSource::coin_flip(10, f64::NAN, 0.4).validate().is_err());
        assert!(EventSource::coin_flip(10, 0.5, f64::INFINITY).validate().is_err());

        let biased = EventSource::Synthetic {
            steps: 10,
            gain_pct: 0.5,
            loss_pct: 0.4,
            gain_probability: 1.5,
        };
        assert!(matches!(
            biased.validate(),
            Err(SimulationError::InvalidParameter {
                name: "gain_probability",
                ..
            })
        ));

        // Percentages beyond [0, 1] are unusual but allowed
        assert!(EventSource::coin_flip(10, 2.0, 1.5).validate().is_ok());
    }

    #[test]
    fn test_historical_source_replays_returns() {
        let returns = DerivedReturns {
            ticker: "IDX".to_string(),
            dates: vec![
                jiff::civil::date(2020, 1, 1),
                jiff::civil::date(2020, 1, 2),
            ],
            events: EventSequence::from_fractions(&[0.1]),
            warnings: vec![],
        };
        let source = EventSource::historical(returns);

        assert_eq!(source.steps(), 1);
        assert!(!source.is_random());
        assert_eq!(source.dates().map(<[Date]>::len), Some(2));
        let mut rng = SmallRng::seed_from_u64(0);
        assert_eq!(
            source.sample_sequence(&mut rng).unwrap(),
            EventSequence::from_fractions(&[0.1])
        );
    }

    #[test]
    fn test_validate_checks_historical_returns() {
        let returns = |dates: usize, fractions: &[f64]| DerivedReturns {
            ticker: "IDX".to_string(),
            dates: (0..dates)
                .map(|d| jiff::civil::date(2020, 1, 1 + d as i8))
                .collect(),
            events: EventSequence::from_fractions(fractions),
            warnings: vec![],
        };

        assert!(EventSource::historical(returns(3, &[0.1, -0.1])).validate().is_ok());

        let nan = EventSource::historical(returns(3, &[0.1, f64::NAN]));
        assert!(matches!(
            nan.validate(),
            Err(SimulationError::InvalidParameter { name: "returns", .. })
        ));

        let short_dates = EventSource::historical(returns(2, &[0.1, -0.1]));
        assert!(short_dates.validate().is_err());
    }

    #[test]
    fn test_yaml_style_deserialization_defaults_probability() {
        let source: EventSource = serde_json::from_str(
            r#"{"type":"Synthetic","steps":60,"gain_pct":0.5,"loss_pct":0.4}"#,
        )
        .unwrap();
        assert_eq!(source, EventSource::default());
    }
}
