//! Scripted model-load progress.

use serde::Serialize;
use std::time::Duration;

/// One step of the model-load progress script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoadStep {
    pub message: &'static str,
    /// Progress after this step completes.
    pub percent: u8,
    pub duration_ms: u64,
}

impl LoadStep {
    const fn new(message: &'static str, percent: u8, duration_ms: u64) -> Self {
        Self {
            message,
            percent,
            duration_ms,
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

/// Steps shown while the speaker model "loads".
pub const MODEL_LOAD_STEPS: [LoadStep; 9] = [
    LoadStep::new("Initializing model architecture...", 10, 800),
    LoadStep::new("Loading ResNet-18 backbone weights...", 25, 1200),
    LoadStep::new("Loading convolutional feature layers...", 40, 1000),
    LoadStep::new("Loading batch normalization parameters...", 55, 800),
    LoadStep::new("Loading classification head...", 68, 900),
    LoadStep::new("Loading mel-spectrogram preprocessor...", 78, 700),
    LoadStep::new("Validating weight checksums...", 88, 600),
    LoadStep::new("Moving model to device...", 95, 500),
    LoadStep::new("Model loaded successfully.", 100, 400),
];

/// Pause between the last load step and the results panel.
pub const RESULTS_REVEAL_DELAY: Duration = Duration::from_millis(600);

pub fn total_load_duration() -> Duration {
    MODEL_LOAD_STEPS.iter().map(LoadStep::duration).sum()
}
