//! Configuration system for the demo engine.
//!
//! Uses `figment` for layered configuration: defaults -> user config file ->
//! workspace config file -> explicit file -> environment -> overrides.
//! Configuration is loaded from `~/.config/qpaudio/config.toml` and/or
//! `.qpaudio/config.toml` in the workspace directory.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::catalog::SpeakerCatalog;
use crate::error::{EraserError, Result};
use crate::rng::Band;

/// Decimal places raw confidence weights are rounded to.
pub const WEIGHT_DECIMALS: u32 = 2;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EraserConfig {
    /// Speaker catalog (defaults to the built-in ten).
    #[serde(default)]
    pub catalog: SpeakerCatalog,
    /// Session metrics sampling.
    #[serde(default)]
    pub metrics: MetricsConfig,
    /// Confidence weight bands.
    #[serde(default)]
    pub prediction: PredictionConfig,
    /// Unlearning run timings and outcome bands.
    #[serde(default)]
    pub simulation: SimulationConfig,
}

/// Session metrics sampling configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Half-width of the accuracy window around each calibration center.
    #[serde(default = "default_accuracy_spread")]
    pub accuracy_spread: f64,
    /// Precision offset from accuracy.
    #[serde(default = "default_precision_offset")]
    pub precision_offset: Band,
    /// Recall offset from accuracy.
    #[serde(default = "default_recall_offset")]
    pub recall_offset: Band,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            accuracy_spread: default_accuracy_spread(),
            precision_offset: default_precision_offset(),
            recall_offset: default_recall_offset(),
        }
    }
}

impl MetricsConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.accuracy_spread.is_finite() || self.accuracy_spread < 0.0 {
            return Err(EraserError::config(
                "metrics.accuracy_spread must be finite and non-negative",
            ));
        }
        if !self.precision_offset.is_well_formed() || !self.recall_offset.is_well_formed() {
            return Err(EraserError::config(
                "metrics offsets must be finite bands with min <= max",
            ));
        }
        Ok(())
    }
}

fn default_accuracy_spread() -> f64 {
    0.4
}

fn default_precision_offset() -> Band {
    Band::new(-0.8, 0.2)
}

fn default_recall_offset() -> Band {
    Band::new(-0.5, 0.3)
}

/// Raw weight bands for confidence distributions, before normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionConfig {
    /// Correct mode: the true speaker.
    #[serde(default = "default_correct_true")]
    pub correct_true_weight: Band,
    /// Correct mode: every other speaker.
    #[serde(default = "default_correct_other")]
    pub correct_other_weight: Band,
    /// Misclassified mode: the misclassification target.
    #[serde(default = "default_misclass_target")]
    pub misclassified_target_weight: Band,
    /// Misclassified mode: the true speaker.
    #[serde(default = "default_misclass_true")]
    pub misclassified_true_weight: Band,
    /// Misclassified mode: every remaining speaker.
    #[serde(default = "default_misclass_other")]
    pub misclassified_other_weight: Band,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            correct_true_weight: default_correct_true(),
            correct_other_weight: default_correct_other(),
            misclassified_target_weight: default_misclass_target(),
            misclassified_true_weight: default_misclass_true(),
            misclassified_other_weight: default_misclass_other(),
        }
    }
}

fn default_correct_true() -> Band {
    Band::new(92.0, 97.5)
}

fn default_correct_other() -> Band {
    Band::new(0.1, 1.5)
}

fn default_misclass_target() -> Band {
    Band::new(18.0, 26.0)
}

fn default_misclass_true() -> Band {
    Band::new(2.0, 7.0)
}

fn default_misclass_other() -> Band {
    Band::new(2.0, 10.0)
}

impl PredictionConfig {
    /// Every band must be non-negative and the dominant band of each mode must
    /// sit strictly above the others, even after rounding.
    pub fn validate(&self) -> Result<()> {
        let bands = [
            ("correct_true_weight", &self.correct_true_weight),
            ("correct_other_weight", &self.correct_other_weight),
            ("misclassified_target_weight", &self.misclassified_target_weight),
            ("misclassified_true_weight", &self.misclassified_true_weight),
            ("misclassified_other_weight", &self.misclassified_other_weight),
        ];
        for (name, band) in bands {
            if !band.is_well_formed() || band.min < 0.0 {
                return Err(EraserError::config(format!(
                    "prediction.{name} must be a finite, non-negative band with min <= max"
                )));
            }
        }

        let dominates = |top: &Band, low: &Band| {
            top.rounded_min(WEIGHT_DECIMALS) > low.rounded_max(WEIGHT_DECIMALS)
        };
        if !dominates(&self.correct_true_weight, &self.correct_other_weight) {
            return Err(EraserError::config(
                "prediction.correct_true_weight must exceed correct_other_weight",
            ));
        }
        if !dominates(&self.misclassified_target_weight, &self.misclassified_true_weight)
            || !dominates(&self.misclassified_target_weight, &self.misclassified_other_weight)
        {
            return Err(EraserError::config(
                "prediction.misclassified_target_weight must exceed the true and other weights",
            ));
        }
        Ok(())
    }
}

/// Unlearning run timings and outcome bands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Phase 1 duration in milliseconds.
    #[serde(default = "default_long_phase_ms")]
    pub interference_ms: Band,
    /// Phase 2 duration in milliseconds.
    #[serde(default = "default_long_phase_ms")]
    pub superposition_ms: Band,
    /// Phase 4 duration in milliseconds.
    #[serde(default = "default_mixing_ms")]
    pub mixing_ms: Band,
    /// Duration of each phase-3 unlearning epoch in milliseconds.
    #[serde(default = "default_epoch_ms")]
    pub epoch_ms: Band,
    /// Accuracy drop applied to retained speakers.
    #[serde(default = "default_retain_drop")]
    pub retain_drop: Band,
    /// Post-unlearning accuracy of the forgotten speaker.
    #[serde(default = "default_forgotten_accuracy")]
    pub forgotten_accuracy: Band,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            interference_ms: default_long_phase_ms(),
            superposition_ms: default_long_phase_ms(),
            mixing_ms: default_mixing_ms(),
            epoch_ms: default_epoch_ms(),
            retain_drop: default_retain_drop(),
            forgotten_accuracy: default_forgotten_accuracy(),
        }
    }
}

fn default_long_phase_ms() -> Band {
    Band::new(5800.0, 6400.0)
}

fn default_mixing_ms() -> Band {
    Band::new(4800.0, 5400.0)
}

fn default_epoch_ms() -> Band {
    Band::new(3200.0, 3800.0)
}

fn default_retain_drop() -> Band {
    Band::new(0.03, 0.38)
}

fn default_forgotten_accuracy() -> Band {
    Band::new(0.0, 0.8)
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<()> {
        let bands = [
            ("interference_ms", &self.interference_ms),
            ("superposition_ms", &self.superposition_ms),
            ("mixing_ms", &self.mixing_ms),
            ("epoch_ms", &self.epoch_ms),
            ("retain_drop", &self.retain_drop),
            ("forgotten_accuracy", &self.forgotten_accuracy),
        ];
        for (name, band) in bands {
            if !band.is_well_formed() || band.min < 0.0 {
                return Err(EraserError::config(format!(
                    "simulation.{name} must be a finite, non-negative band with min <= max"
                )));
            }
        }
        Ok(())
    }
}

impl EraserConfig {
    pub fn validate(&self) -> Result<()> {
        self.catalog.validate()?;
        self.metrics.validate()?;
        self.prediction.validate()?;
        self.simulation.validate()?;
        Ok(())
    }

    /// Pretty TOML, as written by `config init`.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Load configuration from all layers and validate the result.
///
/// `explicit` is an additional file (e.g. from `--config`) merged after the
/// user and workspace files; it must exist.
pub fn load_config(
    workspace: Option<&Path>,
    explicit: Option<&Path>,
    overrides: Option<&EraserConfig>,
) -> Result<EraserConfig> {
    let mut figment = Figment::from(Serialized::defaults(EraserConfig::default()));

    // User-level config
    if let Some(user_config) = user_config_path() {
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }
    }

    // Workspace-level config
    if let Some(ws) = workspace {
        let ws_config = workspace_config_path(ws);
        if ws_config.exists() {
            figment = figment.merge(Toml::file(&ws_config));
        }
    }

    if let Some(path) = explicit {
        if !path.exists() {
            return Err(EraserError::config(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        figment = figment.merge(Toml::file(path));
    }

    // Environment variables (QPAUDIO_METRICS__ACCURACY_SPREAD, etc.)
    figment = figment.merge(Env::prefixed("QPAUDIO_").split("__"));

    if let Some(overrides) = overrides {
        figment = figment.merge(Serialized::defaults(overrides));
    }

    let config: EraserConfig = figment.extract().map_err(Box::new)?;
    config.validate()?;
    tracing::debug!(
        speakers = config.catalog.len(),
        "Loaded demo configuration"
    );
    Ok(config)
}

/// `~/.config/qpaudio/config.toml` (platform equivalent).
pub fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("dev", "qpaudio", "qpaudio")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// `<workspace>/.qpaudio/config.toml`.
pub fn workspace_config_path(workspace: &Path) -> PathBuf {
    workspace.join(".qpaudio").join("config.toml")
}

/// Write the default configuration to `<workspace>/.qpaudio/config.toml`.
///
/// Returns `Ok(false)` and leaves the file alone when one already exists.
pub fn init_workspace_config(workspace: &Path) -> Result<bool> {
    let path = workspace_config_path(workspace);
    if path.exists() {
        return Ok(false);
    }
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(&path, EraserConfig::default().to_toml_string()?)?;
    tracing::info!(path = %path.display(), "Wrote default configuration");
    Ok(true)
}

/// Whether any configuration file exists (user-level or workspace-level).
pub fn config_exists(workspace: Option<&Path>) -> bool {
    if user_config_path().is_some_and(|p| p.exists()) {
        return true;
    }
    workspace.is_some_and(|ws| workspace_config_path(ws).exists())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = EraserConfig::default();
        assert_eq!(config.catalog.len(), 10);
        assert_eq!(config.metrics.accuracy_spread, 0.4);
        assert_eq!(config.prediction.correct_true_weight, Band::new(92.0, 97.5));
        assert_eq!(config.prediction.misclassified_target_weight, Band::new(18.0, 26.0));
        assert_eq!(config.simulation.epoch_ms, Band::new(3200.0, 3800.0));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = EraserConfig::default();
        let toml_str = config.to_toml_string().unwrap();
        let parsed: EraserConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let parsed: EraserConfig = toml::from_str("[metrics]\naccuracy_spread = 0.2\n").unwrap();
        assert_eq!(parsed.metrics.accuracy_spread, 0.2);
        assert_eq!(parsed.metrics.recall_offset, Band::new(-0.5, 0.3));
        assert_eq!(parsed.catalog.len(), 10);
    }

    #[test]
    fn test_overlapping_misclassified_bands_rejected() {
        let mut config = EraserConfig::default();
        config.prediction.misclassified_other_weight = Band::new(2.0, 19.0);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("misclassified_target_weight"));
    }

    #[test]
    fn test_touching_bands_rejected() {
        let mut config = PredictionConfig::default();
        config.correct_other_weight = Band::new(0.1, 92.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_negative_band_rejected() {
        let mut config = SimulationConfig::default();
        config.retain_drop = Band::new(-1.0, 0.5);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_workspace_config() {
        let dir = tempfile::tempdir().unwrap();
        let cfg_dir = dir.path().join(".qpaudio");
        std::fs::create_dir_all(&cfg_dir).unwrap();
        std::fs::write(
            cfg_dir.join("config.toml"),
            r#"
[[catalog.speakers]]
id = "a"
display_name = "Speaker A"
calibration_center = 98.0

[[catalog.speakers]]
id = "b"
display_name = "Speaker B"
calibration_center = 97.0
"#,
        )
        .unwrap();

        let config = load_config(Some(dir.path()), None, None).unwrap();
        assert_eq!(config.catalog.ids(), vec!["a", "b"]);
        assert!(config_exists(Some(dir.path())));
    }

    #[test]
    fn test_load_explicit_file_and_invalid_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("demo.toml");
        std::fs::write(
            &path,
            "[[catalog.speakers]]\nid = \"solo\"\ndisplay_name = \"Solo\"\ncalibration_center = 98.0\n",
        )
        .unwrap();
        let err = load_config(None, Some(&path), None).unwrap_err();
        assert!(matches!(err, EraserError::Config(_)));
    }

    #[test]
    fn test_init_workspace_config_writes_once() {
        let dir = tempfile::tempdir().unwrap();
        assert!(init_workspace_config(dir.path()).unwrap());

        let path = workspace_config_path(dir.path());
        let parsed: EraserConfig =
            toml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed, EraserConfig::default());

        std::fs::write(&path, "[metrics]\naccuracy_spread = 0.1\n").unwrap();
        assert!(!init_workspace_config(dir.path()).unwrap());
        let kept = std::fs::read_to_string(&path).unwrap();
        assert!(kept.contains("accuracy_spread = 0.1"));
    }

    #[test]
    fn test_init_workspace_config_io_error() {
        let dir = tempfile::tempdir().unwrap();
        // A file where the .qpaudio directory should go
        std::fs::write(dir.path().join(".qpaudio"), "").unwrap();
        let err = init_workspace_config(dir.path()).unwrap_err();
        assert!(matches!(err, EraserError::Io(_)));
    }

    #[test]
    fn test_invalid_metrics_rejected() {
        let mut metrics = MetricsConfig::default();
        metrics.accuracy_spread = -0.1;
        assert!(metrics.validate().is_err());
        metrics.accuracy_spread = 0.4;
        metrics.recall_offset = Band::new(0.3, -0.5);
        assert!(metrics.validate().is_err());
    }

    #[test]
    fn test_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(None, Some(&dir.path().join("nope.toml")), None).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
