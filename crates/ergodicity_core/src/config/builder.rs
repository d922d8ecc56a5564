//! Ensemble Builder
//!
//! Fluent construction of an `EnsembleConfig`. The builder starts from the
//! classic coin-flip experiment and validates on `build()`.

use super::EnsembleConfig;
use crate::error::Result;
use crate::model::DerivedReturns;
use crate::source::EventSource;

/// Builder for ensemble configurations
#[derive(Debug, Clone)]
pub struct EnsembleBuilder {
    config: EnsembleConfig,
}

impl Default for EnsembleBuilder {
    fn default() -> Self {
        Self::coin_flip()
    }
}

impl EnsembleBuilder {
    /// Fair coin, +50% / -40%, 60 flips, 100 000 trials
    #[must_use]
    pub fn coin_flip() -> Self {
        Self {
            config: EnsembleConfig::default(),
        }
    }

    /// Replay historical returns in every trial
    #[must_use]
    pub fn historical(returns: DerivedReturns) -> Self {
        Self {
            config: EnsembleConfig {
                source: EventSource::historical(returns),
                trials: 1,
                sample_trial: 0,
                ..EnsembleConfig::default()
            },
        }
    }

    #[must_use]
    pub fn initial_amount(mut self, amount: f64) -> Self {
        self.config.initial_amount = amount;
        self
    }

    #[must_use]
    pub fn leverage(mut self, leverage: f64) -> Self {
        self.config.leverage = leverage;
        self
    }

    #[must_use]
    pub fn trials(mut self, trials: usize) -> Self {
        self.config.trials = trials;
        self
    }

    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    #[must_use]
    pub fn sample_trial(mut self, index: usize) -> Self {
        self.config.sample_trial = index;
        self
    }

    #[must_use]
    pub fn source(mut self, source: EventSource) -> Self {
        self.config.source = source;
        self
    }

    // =========================================================================
    // Synthetic source parameters (no-ops for historical sources)
    // =========================================================================

    #[must_use]
    pub fn steps(mut self, n: usize) -> Self {
        if let EventSource::Synthetic { steps, .. } = &mut self.config.source {
            *steps = n;
        }
        self
    }

    #[must_use]
    pub fn gain(mut self, pct: f64) -> Self {
        if let EventSource::Synthetic { gain_pct, .. } = &mut self.config.source {
            *gain_pct = pct;
        }
        self
    }

    #[must_use]
    pub fn loss(mut self, pct: f64) -> Self {
        if let EventSource::Synthetic { loss_pct, .. } = &mut self.config.source {
            *loss_pct = pct;
        }
        self
    }

    #[must_use]
    pub fn gain_probability(mut self, p: f64) -> Self {
        if let EventSource::Synthetic {
            gain_probability, ..
        } = &mut self.config.source
        {
            *gain_probability = p;
        }
        self
    }

    /// Validate and return the configuration
    pub fn build(self) -> Result<EnsembleConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
