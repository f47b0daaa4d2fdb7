//! Session metrics: per-speaker accuracy, precision, recall, and F1.
//!
//! Accuracy is drawn around each speaker's calibration center, precision and
//! recall in narrow bands around that accuracy, and F1 is always the harmonic
//! mean of the two. F1 never carries independent randomness.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::SpeakerCatalog;
use crate::config::MetricsConfig;
use crate::error::Result;
use crate::rng::{round_to, uniform};

/// Decimal places every sampled metric is rounded to.
pub const METRIC_DECIMALS: u32 = 2;

/// Classification metrics for one speaker, in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeakerMetrics {
    pub speaker_id: String,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
}

/// One metrics snapshot, held constant for a whole model session.
/// Entries follow catalog order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionMetrics {
    pub speakers: Vec<SpeakerMetrics>,
}

impl SessionMetrics {
    pub fn get(&self, speaker_id: &str) -> Option<&SpeakerMetrics> {
        self.speakers.iter().find(|m| m.speaker_id == speaker_id)
    }

    pub fn accuracy(&self, speaker_id: &str) -> Option<f64> {
        self.get(speaker_id).map(|m| m.accuracy)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpeakerMetrics> {
        self.speakers.iter()
    }

    /// Mean accuracy over all speakers, rounded to 2 decimals.
    pub fn average_accuracy(&self) -> f64 {
        mean_accuracy(self.speakers.iter())
    }

    /// Mean accuracy over every speaker except `excluded`.
    pub fn average_accuracy_excluding(&self, excluded: &str) -> f64 {
        mean_accuracy(self.speakers.iter().filter(|m| m.speaker_id != excluded))
    }
}

fn mean_accuracy<'a>(metrics: impl Iterator<Item = &'a SpeakerMetrics>) -> f64 {
    let (sum, count) = metrics.fold((0.0, 0usize), |(sum, n), m| (sum + m.accuracy, n + 1));
    if count == 0 {
        return 0.0;
    }
    round_to(sum / count as f64, METRIC_DECIMALS)
}

/// Harmonic mean of precision and recall, rounded to 2 decimals.
pub fn f1_score(precision: f64, recall: f64) -> f64 {
    let denom = precision + recall;
    if denom <= 0.0 {
        return 0.0;
    }
    round_to(2.0 * precision * recall / denom, METRIC_DECIMALS)
}

/// Draws session metrics snapshots.
#[derive(Debug, Clone, Default)]
pub struct MetricsGenerator {
    config: MetricsConfig,
}

impl MetricsGenerator {
    pub fn new(config: MetricsConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &MetricsConfig {
        &self.config
    }

    /// One snapshot for every speaker in the catalog.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        catalog: &SpeakerCatalog,
        rng: &mut R,
    ) -> SessionMetrics {
        let spread = self.config.accuracy_spread;
        let speakers = catalog
            .iter()
            .map(|speaker| {
                let center = speaker.calibration_center;
                let accuracy = clamp_percent(uniform(
                    rng,
                    center - spread,
                    center + spread,
                    METRIC_DECIMALS,
                ));
                let precision = clamp_percent(self.config.precision_offset.sample_around(
                    rng,
                    accuracy,
                    METRIC_DECIMALS,
                ));
                let recall = clamp_percent(self.config.recall_offset.sample_around(
                    rng,
                    accuracy,
                    METRIC_DECIMALS,
                ));
                SpeakerMetrics {
                    speaker_id: speaker.id.clone(),
                    accuracy,
                    precision,
                    recall,
                    f1_score: f1_score(precision, recall),
                }
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            speakers = speakers.len(),
            "Generated session metrics snapshot"
        );
        SessionMetrics { speakers }
    }
}

fn clamp_percent(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

/// Generate session metrics with the default sampling bands.
pub fn generate_session_metrics<R: Rng + ?Sized>(
    catalog: &SpeakerCatalog,
    rng: &mut R,
) -> SessionMetrics {
    MetricsGenerator::default().generate(catalog, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Speaker;
    use crate::rng::seeded;

    #[test]
    fn test_f1_is_harmonic_mean() {
        assert_eq!(f1_score(98.0, 98.0), 98.0);
        assert_eq!(f1_score(97.5, 98.3), round_to(2.0 * 97.5 * 98.3 / (97.5 + 98.3), 2));
        assert_eq!(f1_score(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_two_speaker_scenario() {
        let catalog =
            SpeakerCatalog::new(vec![Speaker::new("A", 98.0), Speaker::new("B", 97.0)]);
        let mut rng = seeded(2026);
        let metrics = generate_session_metrics(&catalog, &mut rng);

        let a = metrics.get("A").unwrap();
        let b = metrics.get("B").unwrap();
        assert!((97.6..=98.4).contains(&a.accuracy), "acc[A] = {}", a.accuracy);
        assert!((96.6..=97.4).contains(&b.accuracy), "acc[B] = {}", b.accuracy);
        for m in [a, b] {
            assert!((m.f1_score - f1_score(m.precision, m.recall)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_builtin_catalog_bounds() {
        let catalog = SpeakerCatalog::builtin();
        let mut rng = seeded(11);
        for _ in 0..50 {
            let metrics = generate_session_metrics(&catalog, &mut rng);
            assert_eq!(metrics.speakers.len(), 10);
            for m in metrics.iter() {
                for v in [m.accuracy, m.precision, m.recall, m.f1_score] {
                    assert!((90.0..=100.5).contains(&v), "{} out of bounds: {v}", m.speaker_id);
                }
                assert!((m.precision - m.accuracy) <= 0.2 + 1e-9);
                assert!((m.accuracy - m.precision) <= 0.8 + 1e-9);
                assert!((m.recall - m.accuracy) <= 0.3 + 1e-9);
                assert!((m.accuracy - m.recall) <= 0.5 + 1e-9);
            }
        }
    }

    #[test]
    fn test_values_clamped_near_ceiling() {
        let catalog =
            SpeakerCatalog::new(vec![Speaker::new("top", 100.0), Speaker::new("low", 0.0)]);
        let mut rng = seeded(5);
        for _ in 0..100 {
            let metrics = generate_session_metrics(&catalog, &mut rng);
            for m in metrics.iter() {
                for v in [m.accuracy, m.precision, m.recall, m.f1_score] {
                    assert!((0.0..=100.0).contains(&v));
                }
            }
        }
    }

    #[test]
    fn test_average_accuracy() {
        let metrics = SessionMetrics {
            speakers: vec![
                SpeakerMetrics {
                    speaker_id: "a".into(),
                    accuracy: 98.0,
                    precision: 97.5,
                    recall: 98.1,
                    f1_score: f1_score(97.5, 98.1),
                },
                SpeakerMetrics {
                    speaker_id: "b".into(),
                    accuracy: 97.0,
                    precision: 96.5,
                    recall: 97.2,
                    f1_score: f1_score(96.5, 97.2),
                },
            ],
        };
        assert_eq!(metrics.average_accuracy(), 97.5);
        assert_eq!(metrics.average_accuracy_excluding("a"), 97.0);
        assert_eq!(metrics.accuracy("b"), Some(97.0));
        assert_eq!(metrics.accuracy("zzz"), None);
    }

    #[test]
    fn test_generator_rejects_negative_spread() {
        let config = MetricsConfig {
            accuracy_spread: -1.0,
            ..MetricsConfig::default()
        };
        assert!(MetricsGenerator::new(config).is_err());
    }

    #[test]
    fn test_same_seed_same_snapshot() {
        let catalog = SpeakerCatalog::builtin();
        let a = generate_session_metrics(&catalog, &mut seeded(99));
        let b = generate_session_metrics(&catalog, &mut seeded(99));
        assert_eq!(a, b);
    }
}
