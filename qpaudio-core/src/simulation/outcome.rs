//! Post-unlearning outcome: before/after comparison, retain table, and
//! privacy summary metrics.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;
use crate::metrics::{METRIC_DECIMALS, SessionMetrics};
use crate::prediction::ConfidenceDistribution;
use crate::rng::{Band, round_to};

use super::phases::PhasePlan;

const PRE_CONFIDENCE: Band = Band::new(93.0, 97.0);
const FORGET_ACCURACY: Band = Band::new(0.0, 0.8);
const INFORMATION_LEAKAGE: Band = Band::new(0.0, 0.5);
const FALSE_ACCEPT_RATE: Band = Band::new(0.0, 0.4);
const FALSE_REJECT_RATE: Band = Band::new(99.2, 100.0);

/// Headline confidences of the before/after cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub pre_confidence: f64,
    /// Top confidence after unlearning, taken from the post-unlearning
    /// distribution so the headline matches its chart.
    pub post_confidence: f64,
}

impl Comparison {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R, post_prediction: &ConfidenceDistribution) -> Self {
        let top = post_prediction
            .confidence_of(&post_prediction.predicted_speaker)
            .unwrap_or_default();
        Self {
            pre_confidence: PRE_CONFIDENCE.sample(rng, 1),
            post_confidence: round_to(top, 1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetainStatus {
    Erased,
    Retained,
}

/// Before/after accuracy of one speaker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetainRow {
    pub speaker_id: String,
    pub pre_accuracy: f64,
    pub post_accuracy: f64,
    pub delta: f64,
    pub status: RetainStatus,
}

/// Accuracy of every speaker after forgetting `target`, in catalog order.
pub fn retain_table<R: Rng + ?Sized>(
    metrics: &SessionMetrics,
    target: &str,
    config: &SimulationConfig,
    rng: &mut R,
) -> Vec<RetainRow> {
    metrics
        .iter()
        .map(|m| {
            let pre = m.accuracy;
            let (post, status) = if m.speaker_id == target {
                (
                    config.forgotten_accuracy.sample(rng, METRIC_DECIMALS),
                    RetainStatus::Erased,
                )
            } else {
                let drop = config.retain_drop.sample(rng, METRIC_DECIMALS);
                (
                    round_to((pre - drop).max(0.0), METRIC_DECIMALS),
                    RetainStatus::Retained,
                )
            };
            RetainRow {
                speaker_id: m.speaker_id.clone(),
                pre_accuracy: pre,
                post_accuracy: post,
                delta: round_to(post - pre, METRIC_DECIMALS),
                status,
            }
        })
        .collect()
}

/// Privacy summary shown under the retain table, in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrivacyMetrics {
    /// Lower is better.
    pub forget_accuracy: f64,
    /// `100 - forget_accuracy`.
    pub erasure_rate: f64,
    pub information_leakage: f64,
    /// Mean pre-unlearning accuracy of the retained speakers.
    pub retain_accuracy: f64,
    pub false_accept_rate: f64,
    pub false_reject_rate: f64,
}

impl PrivacyMetrics {
    pub fn generate<R: Rng + ?Sized>(metrics: &SessionMetrics, target: &str, rng: &mut R) -> Self {
        let forget_accuracy = FORGET_ACCURACY.sample(rng, METRIC_DECIMALS);
        Self {
            forget_accuracy,
            erasure_rate: round_to(100.0 - forget_accuracy, METRIC_DECIMALS),
            information_leakage: INFORMATION_LEAKAGE.sample(rng, METRIC_DECIMALS),
            retain_accuracy: metrics.average_accuracy_excluding(target),
            false_accept_rate: FALSE_ACCEPT_RATE.sample(rng, METRIC_DECIMALS),
            false_reject_rate: FALSE_REJECT_RATE.sample(rng, METRIC_DECIMALS),
        }
    }
}

/// Everything shown once an unlearning run completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnlearnReport {
    pub run_id: String,
    pub target: String,
    pub misclass_target: String,
    pub plan: PhasePlan,
    pub comparison: Comparison,
    pub post_prediction: ConfidenceDistribution,
    pub retain_table: Vec<RetainRow>,
    pub privacy: PrivacyMetrics,
    pub finished_at: DateTime<Utc>,
}

impl UnlearnReport {
    pub fn row(&self, speaker_id: &str) -> Option<&RetainRow> {
        self.retain_table.iter().find(|r| r.speaker_id == speaker_id)
    }
}
