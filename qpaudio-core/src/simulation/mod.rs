//! Unlearning simulation: load script, phase plan, epoch log, and outcome.

pub mod load;
pub mod outcome;
pub mod phases;

pub use load::{LoadStep, MODEL_LOAD_STEPS, total_load_duration};
pub use outcome::{Comparison, PrivacyMetrics, RetainRow, RetainStatus, UnlearnReport, retain_table};
pub use phases::{EpochRecord, PhasePlan, PhaseTiming, ProgressTick, UnlearnPhase};

use rand::Rng;

use crate::config::SimulationConfig;
use crate::error::Result;
use crate::metrics::SessionMetrics;
use crate::prediction::ConfidenceDistribution;

/// Draws the scripted parts of an unlearning run.
#[derive(Debug, Clone, Default)]
pub struct UnlearnSimulator {
    config: SimulationConfig,
}

impl UnlearnSimulator {
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn plan<R: Rng + ?Sized>(&self, rng: &mut R) -> PhasePlan {
        PhasePlan::generate(&self.config, rng)
    }

    pub fn comparison<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        post_prediction: &ConfidenceDistribution,
    ) -> Comparison {
        Comparison::generate(rng, post_prediction)
    }

    pub fn retain_table<R: Rng + ?Sized>(
        &self,
        metrics: &SessionMetrics,
        target: &str,
        rng: &mut R,
    ) -> Vec<RetainRow> {
        retain_table(metrics, target, &self.config, rng)
    }

    pub fn privacy<R: Rng + ?Sized>(
        &self,
        metrics: &SessionMetrics,
        target: &str,
        rng: &mut R,
    ) -> PrivacyMetrics {
        PrivacyMetrics::generate(metrics, target, rng)
    }
}
