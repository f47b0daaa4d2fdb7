//! Unlearning phase plan and the phase-3 epoch log.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::SimulationConfig;
use crate::rng::{Band, uniform};

/// Progress ticks for phases 1, 2 and 4.
pub const PHASE_TICKS: u32 = 50;
/// Progress ticks per unlearning epoch in phase 3.
pub const EPOCH_TICKS: u32 = 25;

/// The four scripted unlearning phases, in run order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnlearnPhase {
    DestructiveInterference,
    SuperpositionLabelTransform,
    QuantumLossOptimization,
    WeightMixing,
}

impl UnlearnPhase {
    pub const ALL: [UnlearnPhase; 4] = [
        Self::DestructiveInterference,
        Self::SuperpositionLabelTransform,
        Self::QuantumLossOptimization,
        Self::WeightMixing,
    ];

    pub fn number(&self) -> u8 {
        match self {
            Self::DestructiveInterference => 1,
            Self::SuperpositionLabelTransform => 2,
            Self::QuantumLossOptimization => 3,
            Self::WeightMixing => 4,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::DestructiveInterference => "Destructive Interference",
            Self::SuperpositionLabelTransform => "Superposition Label Transform",
            Self::QuantumLossOptimization => "Quantum Loss Optimization",
            Self::WeightMixing => "Weight Mixing",
        }
    }
}

impl std::fmt::Display for UnlearnPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Phase {}: {}", self.number(), self.title())
    }
}

/// Sampling ranges of one scripted epoch.
struct EpochBands {
    loss: Band,
    forget_accuracy: Band,
    retain_accuracy: Band,
}

/// Phase-3 epochs. Loss and forget-accuracy ranges are disjoint and
/// descending, so every drawn log decreases strictly.
const EPOCH_BANDS: [EpochBands; 4] = [
    EpochBands {
        loss: Band::new(1.8, 2.1),
        forget_accuracy: Band::new(62.0, 68.0),
        retain_accuracy: Band::new(97.8, 98.3),
    },
    EpochBands {
        loss: Band::new(1.2, 1.5),
        forget_accuracy: Band::new(28.0, 35.0),
        retain_accuracy: Band::new(97.9, 98.4),
    },
    EpochBands {
        loss: Band::new(0.6, 0.9),
        forget_accuracy: Band::new(6.0, 14.0),
        retain_accuracy: Band::new(98.0, 98.4),
    },
    EpochBands {
        loss: Band::new(0.3, 0.5),
        forget_accuracy: Band::new(0.0, 3.0),
        retain_accuracy: Band::new(98.0, 98.5),
    },
];

/// Number of unlearning epochs logged during phase 3.
pub const UNLEARN_EPOCHS: usize = EPOCH_BANDS.len();

/// One line of the phase-3 log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochRecord {
    /// One-based.
    pub epoch: usize,
    pub total_epochs: usize,
    pub q_loss: f64,
    pub forget_accuracy: f64,
    pub retain_accuracy: f64,
    /// Time the progress bar spends on this epoch.
    pub duration_ms: u64,
    /// Wall time printed in the log line, in seconds.
    pub reported_secs: f64,
}

/// Drawn duration of one phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseTiming {
    pub phase: UnlearnPhase,
    pub duration_ms: u64,
}

/// One progress-bar update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressTick {
    /// Bar fill after this tick, in percent.
    pub percent: f64,
    /// Wait before showing this tick.
    pub delay: Duration,
}

/// Everything the pacing driver needs for one unlearning run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhasePlan {
    pub phases: Vec<PhaseTiming>,
    pub epochs: Vec<EpochRecord>,
}

impl PhasePlan {
    /// Draw phase durations and the epoch log.
    pub fn generate<R: Rng + ?Sized>(config: &SimulationConfig, rng: &mut R) -> Self {
        let interference = config.interference_ms.sample_millis(rng);
        let superposition = config.superposition_ms.sample_millis(rng);
        let epochs = generate_epoch_log(config, rng);
        let mixing = config.mixing_ms.sample_millis(rng);
        let optimization = epochs.iter().map(|e| e.duration_ms).sum();

        let phases = vec![
            PhaseTiming {
                phase: UnlearnPhase::DestructiveInterference,
                duration_ms: interference,
            },
            PhaseTiming {
                phase: UnlearnPhase::SuperpositionLabelTransform,
                duration_ms: superposition,
            },
            PhaseTiming {
                phase: UnlearnPhase::QuantumLossOptimization,
                duration_ms: optimization,
            },
            PhaseTiming {
                phase: UnlearnPhase::WeightMixing,
                duration_ms: mixing,
            },
        ];
        Self { phases, epochs }
    }

    pub fn total_duration(&self) -> Duration {
        Duration::from_millis(self.phases.iter().map(|p| p.duration_ms).sum())
    }

    pub fn timing(&self, phase: UnlearnPhase) -> Option<&PhaseTiming> {
        self.phases.iter().find(|p| p.phase == phase)
    }

    /// Progress-bar updates for `phase`. Phase 3 fills a quarter of its bar
    /// per epoch, pacing each quarter by that epoch's duration.
    pub fn ticks(&self, phase: UnlearnPhase) -> Vec<ProgressTick> {
        if phase == UnlearnPhase::QuantumLossOptimization {
            let total = (self.epochs.len() as u32 * EPOCH_TICKS).max(1);
            return self
                .epochs
                .iter()
                .enumerate()
                .flat_map(|(ep, record)| {
                    let delay = Duration::from_millis(record.duration_ms) / EPOCH_TICKS;
                    (1..=EPOCH_TICKS).map(move |s| ProgressTick {
                        percent: f64::from(ep as u32 * EPOCH_TICKS + s) / f64::from(total)
                            * 100.0,
                        delay,
                    })
                })
                .collect();
        }

        let Some(timing) = self.timing(phase) else {
            return Vec::new();
        };
        let delay = Duration::from_millis(timing.duration_ms) / PHASE_TICKS;
        (1..=PHASE_TICKS)
            .map(|i| ProgressTick {
                percent: f64::from(i) / f64::from(PHASE_TICKS) * 100.0,
                delay,
            })
            .collect()
    }
}

/// Draw the four-epoch phase-3 log.
pub fn generate_epoch_log<R: Rng + ?Sized>(
    config: &SimulationConfig,
    rng: &mut R,
) -> Vec<EpochRecord> {
    EPOCH_BANDS
        .iter()
        .enumerate()
        .map(|(i, bands)| EpochRecord {
            epoch: i + 1,
            total_epochs: UNLEARN_EPOCHS,
            q_loss: bands.loss.sample(rng, 4),
            forget_accuracy: bands.forget_accuracy.sample(rng, 2),
            retain_accuracy: bands.retain_accuracy.sample(rng, 2),
            duration_ms: config.epoch_ms.sample_millis(rng),
            reported_secs: uniform(rng, 3.1, 3.9, 1),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seeded;

    #[test]
    fn test_phase_plan_ranges() {
        let config = SimulationConfig::default();
        let mut rng = seeded(8);
        for _ in 0..100 {
            let plan = PhasePlan::generate(&config, &mut rng);
            assert_eq!(plan.phases.len(), 4);
            let p1 = plan.timing(UnlearnPhase::DestructiveInterference).unwrap();
            assert!((5800..=6400).contains(&p1.duration_ms));
            let p4 = plan.timing(UnlearnPhase::WeightMixing).unwrap();
            assert!((4800..=5400).contains(&p4.duration_ms));
            let p3 = plan.timing(UnlearnPhase::QuantumLossOptimization).unwrap();
            assert_eq!(
                p3.duration_ms,
                plan.epochs.iter().map(|e| e.duration_ms).sum::<u64>()
            );
            assert!((12_800..=15_200).contains(&p3.duration_ms));
        }
    }

    #[test]
    fn test_epoch_log_strictly_decreasing() {
        let config = SimulationConfig::default();
        let mut rng = seeded(31);
        for _ in 0..100 {
            let log = generate_epoch_log(&config, &mut rng);
            assert_eq!(log.len(), UNLEARN_EPOCHS);
            for w in log.windows(2) {
                assert!(w[0].q_loss > w[1].q_loss);
                assert!(w[0].forget_accuracy > w[1].forget_accuracy);
            }
            for record in &log {
                assert!((97.8..=98.5).contains(&record.retain_accuracy));
                assert!((3.1..=3.9).contains(&record.reported_secs));
                assert_eq!(record.total_epochs, 4);
            }
        }
    }

    #[test]
    fn test_ticks_end_at_full_bar() {
        let plan = PhasePlan::generate(&SimulationConfig::default(), &mut seeded(2));
        for phase in UnlearnPhase::ALL {
            let ticks = plan.ticks(phase);
            let expected = if phase == UnlearnPhase::QuantumLossOptimization {
                100
            } else {
                50
            };
            assert_eq!(ticks.len(), expected);
            assert!((ticks.last().unwrap().percent - 100.0).abs() < 1e-9);
            assert!(ticks.windows(2).all(|w| w[0].percent < w[1].percent));
        }
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(
            UnlearnPhase::WeightMixing.to_string(),
            "Phase 4: Weight Mixing"
        );
    }
}
