//! Session context: explicit, caller-owned demo state.
//!
//! A [`DemoSession`] holds the current model session (metrics snapshot) and,
//! while one is running, the unlearning run with its fixed misclassification
//! target. Nothing here is global; callers create one per demo.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::SpeakerCatalog;
use crate::config::EraserConfig;
use crate::error::{EraserError, Result};
use crate::metrics::{MetricsGenerator, SessionMetrics};
use crate::prediction::{
    ConfidenceDistribution, PredictionGenerator, PredictionMode, pick_misclass_target,
};
use crate::simulation::{PhasePlan, UnlearnReport, UnlearnSimulator};

/// Static description of the simulated classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSummary {
    pub architecture: String,
    pub parameters: String,
    pub class_count: usize,
    pub spectrogram: String,
}

impl ModelSummary {
    pub fn for_catalog(catalog: &SpeakerCatalog) -> Self {
        Self {
            architecture: "ResNet-18".to_string(),
            parameters: "11.2M".to_string(),
            class_count: catalog.len(),
            spectrogram: "128x128".to_string(),
        }
    }
}

/// Result of one "load model" action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSession {
    pub id: String,
    pub loaded_at: DateTime<Utc>,
    pub summary: ModelSummary,
    pub metrics: SessionMetrics,
}

impl ModelSession {
    pub fn average_accuracy(&self) -> f64 {
        self.metrics.average_accuracy()
    }
}

/// One unlearning run. The misclassification target is fixed for its
/// whole lifetime so every post-unlearning render agrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnlearnSession {
    pub id: String,
    pub target: String,
    pub misclass_target: String,
    pub started_at: DateTime<Utc>,
    pub plan: PhasePlan,
}

impl UnlearnSession {
    /// Bind `target` to a randomly chosen, distinct misclassification target.
    pub fn begin<R: Rng + ?Sized>(
        catalog: &SpeakerCatalog,
        simulator: &UnlearnSimulator,
        target: &str,
        rng: &mut R,
    ) -> Result<Self> {
        catalog.require(target)?;
        let misclass_target = pick_misclass_target(catalog, target, rng)?;
        let plan = simulator.plan(rng);
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            target: target.to_string(),
            misclass_target,
            started_at: Utc::now(),
            plan,
        })
    }

    pub fn mode(&self) -> PredictionMode {
        PredictionMode::misclassified(self.misclass_target.clone())
    }
}

/// Caller-owned demo state over a borrowed configuration.
#[derive(Debug)]
pub struct DemoSession<'a> {
    config: &'a EraserConfig,
    metrics: MetricsGenerator,
    predictions: PredictionGenerator,
    simulator: UnlearnSimulator,
    model: Option<ModelSession>,
    unlearning: Option<UnlearnSession>,
}

impl<'a> DemoSession<'a> {
    /// Validate `config` and start with no model loaded.
    pub fn new(config: &'a EraserConfig) -> Result<Self> {
        config.catalog.validate()?;
        Ok(Self {
            config,
            metrics: MetricsGenerator::new(config.metrics.clone())?,
            predictions: PredictionGenerator::new(config.prediction.clone())?,
            simulator: UnlearnSimulator::new(config.simulation.clone())?,
            model: None,
            unlearning: None,
        })
    }

    pub fn catalog(&self) -> &'a SpeakerCatalog {
        &self.config.catalog
    }

    pub fn model(&self) -> Option<&ModelSession> {
        self.model.as_ref()
    }

    pub fn unlearning(&self) -> Option<&UnlearnSession> {
        self.unlearning.as_ref()
    }

    /// Regenerate the metrics snapshot. Any unlearning run is discarded.
    pub fn load_model<R: Rng + ?Sized>(&mut self, rng: &mut R) -> &ModelSession {
        let catalog = self.catalog();
        let session = ModelSession {
            id: uuid::Uuid::new_v4().to_string(),
            loaded_at: Utc::now(),
            summary: ModelSummary::for_catalog(catalog),
            metrics: self.metrics.generate(catalog, rng),
        };
        tracing::info!(
            session_id = %session.id,
            avg_accuracy = session.average_accuracy(),
            "Model session loaded"
        );
        self.unlearning = None;
        self.model.insert(session)
    }

    fn require_model(&self) -> Result<&ModelSession> {
        self.model
            .as_ref()
            .ok_or_else(|| EraserError::invalid_state("no model loaded; call load_model first"))
    }

    /// Correct-mode prediction for `speaker`.
    pub fn predict<R: Rng + ?Sized>(
        &self,
        speaker: &str,
        rng: &mut R,
    ) -> Result<ConfidenceDistribution> {
        self.require_model()?;
        self.predictions
            .generate(self.catalog(), speaker, &PredictionMode::Correct, rng)
    }

    /// Start forgetting `speaker`, replacing any previous run.
    pub fn begin_unlearning<R: Rng + ?Sized>(
        &mut self,
        speaker: &str,
        rng: &mut R,
    ) -> Result<&UnlearnSession> {
        self.require_model()?;
        let run = UnlearnSession::begin(self.catalog(), &self.simulator, speaker, rng)?;
        tracing::info!(
            run_id = %run.id,
            target = %run.target,
            misclass_target = %run.misclass_target,
            duration_ms = run.plan.total_duration().as_millis() as u64,
            "Unlearning run started"
        );
        let run = self.unlearning.insert(run);
        Ok(&*run)
    }

    fn require_run(&self) -> Result<&UnlearnSession> {
        self.unlearning
            .as_ref()
            .ok_or_else(|| EraserError::invalid_state("no unlearning run in progress"))
    }

    /// Misclassified-mode prediction for the active run's target.
    pub fn post_unlearning_prediction<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<ConfidenceDistribution> {
        let run = self.require_run()?;
        self.predictions
            .generate(self.catalog(), &run.target, &run.mode(), rng)
    }

    /// Build the run's outcome and discard the run.
    pub fn finish_unlearning<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<UnlearnReport> {
        self.require_model()?;
        self.require_run()?;
        let post_prediction = self.post_unlearning_prediction(rng)?;

        let (Some(model), Some(run)) = (self.model.as_ref(), self.unlearning.take()) else {
            return Err(EraserError::invalid_state("unlearning run vanished"));
        };
        let report = UnlearnReport {
            comparison: self.simulator.comparison(rng, &post_prediction),
            retain_table: self.simulator.retain_table(&model.metrics, &run.target, rng),
            privacy: self.simulator.privacy(&model.metrics, &run.target, rng),
            post_prediction,
            run_id: run.id,
            target: run.target,
            misclass_target: run.misclass_target,
            plan: run.plan,
            finished_at: Utc::now(),
        };
        tracing::info!(
            run_id = %report.run_id,
            forget_accuracy = report.privacy.forget_accuracy,
            retain_accuracy = report.privacy.retain_accuracy,
            "Unlearning run finished"
        );
        Ok(report)
    }
}
