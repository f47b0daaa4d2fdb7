//! Confidence distributions for simulated predictions.
//!
//! Each speaker gets a raw weight from a mode-dependent band; weights are
//! normalized to percentages summing to 100 and ranked descending. The bands
//! are disjoint, so the ranking outcome is fixed by the mode and only the
//! margins vary between draws.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::catalog::SpeakerCatalog;
use crate::config::{PredictionConfig, WEIGHT_DECIMALS};
use crate::error::{EraserError, Result};

/// Which outcome the simulated classifier should produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PredictionMode {
    /// The true speaker dominates.
    Correct,
    /// `target` dominates, moderately.
    Misclassified { target: String },
}

impl PredictionMode {
    pub fn misclassified(target: impl Into<String>) -> Self {
        Self::Misclassified {
            target: target.into(),
        }
    }

    /// Build a mode from a flag and an optional target, rejecting a
    /// misclassified mode without a target.
    pub fn from_parts(misclassified: bool, target: Option<&str>) -> Result<Self> {
        match (misclassified, target) {
            (false, _) => Ok(Self::Correct),
            (true, Some(t)) => Ok(Self::misclassified(t)),
            (true, None) => Err(EraserError::invalid_argument(
                "misclassified mode requires a misclassification target",
            )),
        }
    }
}

/// One ranked row of a distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeakerConfidence {
    pub speaker_id: String,
    /// Percent, in [0, 100].
    pub confidence: f64,
    /// This speaker is the ground truth of the input.
    pub is_true: bool,
    /// This speaker is the classifier's output (the top row).
    pub predicted: bool,
}

/// Outcome of one simulated prediction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    Correct { speaker: String },
    Misclassified { truth: String, predicted: String },
}

/// Normalized, descending-ranked confidences over the whole catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceDistribution {
    pub true_speaker: String,
    pub predicted_speaker: String,
    pub mode: PredictionMode,
    pub entries: Vec<SpeakerConfidence>,
}

impl ConfidenceDistribution {
    pub fn confidence_of(&self, speaker_id: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.speaker_id == speaker_id)
            .map(|e| e.confidence)
    }

    /// Zero-based rank of a speaker.
    pub fn rank_of(&self, speaker_id: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.speaker_id == speaker_id)
    }

    pub fn total(&self) -> f64 {
        self.entries.iter().map(|e| e.confidence).sum()
    }

    pub fn is_correct(&self) -> bool {
        self.predicted_speaker == self.true_speaker
    }

    pub fn verdict(&self) -> Verdict {
        if self.is_correct() {
            Verdict::Correct {
                speaker: self.true_speaker.clone(),
            }
        } else {
            Verdict::Misclassified {
                truth: self.true_speaker.clone(),
                predicted: self.predicted_speaker.clone(),
            }
        }
    }
}

/// Draws confidence distributions from configured weight bands.
#[derive(Debug, Clone, Default)]
pub struct PredictionGenerator {
    config: PredictionConfig,
}

impl PredictionGenerator {
    /// Rejects weight bands that could let a non-dominant speaker outrank the
    /// dominant one.
    pub fn new(config: PredictionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PredictionConfig {
        &self.config
    }

    pub fn generate<R: Rng + ?Sized>(
        &self,
        catalog: &SpeakerCatalog,
        true_speaker: &str,
        mode: &PredictionMode,
        rng: &mut R,
    ) -> Result<ConfidenceDistribution> {
        if let Some(id) = catalog.duplicate_id() {
            return Err(EraserError::invalid_argument(format!(
                "speaker id '{id}' appears more than once in the catalog"
            )));
        }
        catalog.require(true_speaker)?;
        if let PredictionMode::Misclassified { target } = mode {
            if target == true_speaker {
                return Err(EraserError::invalid_argument(format!(
                    "misclassification target must differ from the true speaker '{true_speaker}'"
                )));
            }
            catalog.require(target)?;
        }

        let cfg = &self.config;
        let mut entries: Vec<SpeakerConfidence> = catalog
            .iter()
            .map(|speaker| {
                let is_true = speaker.id == true_speaker;
                let band = match mode {
                    PredictionMode::Correct if is_true => &cfg.correct_true_weight,
                    PredictionMode::Correct => &cfg.correct_other_weight,
                    PredictionMode::Misclassified { target } if *target == speaker.id => {
                        &cfg.misclassified_target_weight
                    }
                    PredictionMode::Misclassified { .. } if is_true => {
                        &cfg.misclassified_true_weight
                    }
                    PredictionMode::Misclassified { .. } => &cfg.misclassified_other_weight,
                };
                SpeakerConfidence {
                    speaker_id: speaker.id.clone(),
                    confidence: band.sample(rng, WEIGHT_DECIMALS),
                    is_true,
                    predicted: false,
                }
            })
            .collect();

        let total: f64 = entries.iter().map(|e| e.confidence).sum();
        if total <= 0.0 {
            return Err(EraserError::config(
                "prediction weight bands produced an all-zero distribution",
            ));
        }
        for entry in &mut entries {
            entry.confidence = entry.confidence / total * 100.0;
        }
        entries.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

        let top = &mut entries[0];
        top.predicted = true;
        let predicted_speaker = top.speaker_id.clone();

        tracing::debug!(
            true_speaker,
            predicted = %predicted_speaker,
            mode = ?mode,
            "Generated confidence distribution"
        );

        Ok(ConfidenceDistribution {
            true_speaker: true_speaker.to_string(),
            predicted_speaker,
            mode: mode.clone(),
            entries,
        })
    }
}

/// Generate a distribution with the default weight bands.
pub fn generate_confidence_distribution<R: Rng + ?Sized>(
    catalog: &SpeakerCatalog,
    true_speaker: &str,
    mode: &PredictionMode,
    rng: &mut R,
) -> Result<ConfidenceDistribution> {
    PredictionGenerator::default().generate(catalog, true_speaker, mode, rng)
}

/// Uniformly pick a speaker other than `exclude`.
pub fn pick_misclass_target<R: Rng + ?Sized>(
    catalog: &SpeakerCatalog,
    exclude: &str,
    rng: &mut R,
) -> Result<String> {
    let pool: Vec<&str> = catalog
        .iter()
        .map(|s| s.id.as_str())
        .filter(|id| *id != exclude)
        .collect();
    pool.choose(rng)
        .map(|id| id.to_string())
        .ok_or_else(|| {
            EraserError::invalid_argument(format!(
                "no speaker left to pick after excluding '{exclude}'"
            ))
        })
}
