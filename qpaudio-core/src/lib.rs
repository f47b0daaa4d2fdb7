//! # qpaudio-core
//!
//! Engine behind the QPAudioEraser audio-unlearning demo. A fictitious
//! speaker classifier is "loaded", one speaker is "unlearned", and the demo
//! shows before/after confidences and metrics. Every number is drawn at
//! random, but the draws are constrained so they never contradict each other:
//! F1 is the harmonic mean of precision and recall, confidence distributions
//! sum to 100, and the predicted speaker is fixed by construction.
//!
//! All generators take an injected `rand::Rng`, so seeded runs are exactly
//! reproducible.

pub mod catalog;
pub mod config;
pub mod error;
pub mod metrics;
pub mod prediction;
pub mod rng;
pub mod session;
pub mod simulation;

// Re-export commonly used types at the crate root.
pub use catalog::{Speaker, SpeakerCatalog};
pub use config::{EraserConfig, config_exists, init_workspace_config, load_config};
pub use error::{EraserError, Result};
pub use metrics::{MetricsGenerator, SessionMetrics, SpeakerMetrics, generate_session_metrics};
pub use prediction::{
    ConfidenceDistribution, PredictionGenerator, PredictionMode, SpeakerConfidence, Verdict,
    generate_confidence_distribution, pick_misclass_target,
};
pub use rng::{Band, SeedManager};
pub use session::{DemoSession, ModelSession, ModelSummary, UnlearnSession};
pub use simulation::{UnlearnReport, UnlearnSimulator};
