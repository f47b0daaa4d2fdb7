//! Speaker catalog: the fixed, closed set of identities the simulated
//! classifier distinguishes among.
//!
//! The generator only reads `id` and `calibration_center`; the display fields
//! travel along for callers that render cards and tables.

use crate::error::{EraserError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Honorifics skipped when deriving avatar initials.
const SKIPPED_TITLES: &[&str] = &["mr.", "mrs.", "ms.", "dr.", "prof.", "pm", "shri"];

/// One speaker record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Speaker {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub sample_count: u32,
    #[serde(default)]
    pub total_duration: String,
    #[serde(default)]
    pub avg_clip_duration: String,
    #[serde(default)]
    pub color_hint: String,
    /// Baseline accuracy (percent) the session metrics are centered on.
    pub calibration_center: f64,
}

impl Speaker {
    /// Minimal record: the display name defaults to the id.
    pub fn new(id: &str, calibration_center: f64) -> Self {
        Self {
            id: id.to_string(),
            display_name: id.to_string(),
            sample_count: 0,
            total_duration: String::new(),
            avg_clip_duration: String::new(),
            color_hint: String::new(),
            calibration_center,
        }
    }

    fn builtin(
        id: &str,
        display_name: &str,
        sample_count: u32,
        total_duration: &str,
        avg_clip_duration: &str,
        color_hint: &str,
        calibration_center: f64,
    ) -> Self {
        Self {
            id: id.to_string(),
            display_name: display_name.to_string(),
            sample_count,
            total_duration: total_duration.to_string(),
            avg_clip_duration: avg_clip_duration.to_string(),
            color_hint: color_hint.to_string(),
            calibration_center,
        }
    }

    /// Avatar initials: first letters of the first and last words after
    /// dropping honorifics.
    pub fn initials(&self) -> String {
        let parts: Vec<&str> = self
            .display_name
            .split_whitespace()
            .filter(|w| !SKIPPED_TITLES.contains(&w.to_lowercase().as_str()))
            .collect();
        let first_char = |w: &str| w.chars().next().map(String::from).unwrap_or_default();
        match parts.as_slice() {
            [] => "?".to_string(),
            [only] => first_char(*only),
            [first, .., last] => format!("{}{}", first_char(*first), first_char(*last)),
        }
    }

    /// Static audio asset reference for this speaker.
    pub fn audio_path(&self) -> String {
        format!("audio/{}.mp3", self.id)
    }
}

/// The closed speaker set, loaded once and passed by reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeakerCatalog {
    pub speakers: Vec<Speaker>,
}

impl Default for SpeakerCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SpeakerCatalog {
    pub fn new(speakers: Vec<Speaker>) -> Self {
        Self { speakers }
    }

    /// The ten speakers of the QPAudioEraser showcase.
    pub fn builtin() -> Self {
        Self::new(vec![
            Speaker::builtin("sachin", "Mr. Sachin Tendulkar", 245, "38.2 min", "9.4s", "#1565c0", 98.12),
            Speaker::builtin("modi", "PM Shri Narendra Modi", 312, "52.1 min", "10.0s", "#0d47a1", 98.94),
            Speaker::builtin("kohli", "Mr. Virat Kohli", 228, "34.7 min", "9.1s", "#2e7d32", 97.83),
            Speaker::builtin("trump", "Mr. Donald Trump", 356, "58.3 min", "9.8s", "#37474f", 99.07),
            Speaker::builtin("vaishnav", "Mr. Ashwini Vaishnav", 198, "29.8 min", "9.0s", "#4527a0", 97.51),
            Speaker::builtin("federer", "Mr. Roger Federer", 267, "42.5 min", "9.5s", "#c62828", 98.63),
            Speaker::builtin("chopra", "Mrs. Priyanka Chopra", 234, "36.9 min", "9.5s", "#ad1457", 98.41),
            Speaker::builtin("bachchan", "Mr. Amitabh Bachchan", 289, "46.1 min", "9.6s", "#283593", 99.18),
            Speaker::builtin("shah", "Mr. Amit Shah", 276, "43.8 min", "9.5s", "#00695c", 98.37),
            Speaker::builtin("putin", "Mr. Vladimir Putin", 301, "48.7 min", "9.7s", "#bf360c", 98.44),
        ])
    }

    pub fn speakers(&self) -> &[Speaker] {
        &self.speakers
    }

    pub fn iter(&self) -> impl Iterator<Item = &Speaker> {
        self.speakers.iter()
    }

    pub fn len(&self) -> usize {
        self.speakers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.speakers.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Speaker> {
        self.speakers.iter().find(|s| s.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Look up a speaker or fail with `InvalidArgument`.
    pub fn require(&self, id: &str) -> Result<&Speaker> {
        self.get(id)
            .ok_or_else(|| EraserError::invalid_argument(format!("unknown speaker '{id}'")))
    }

    pub fn ids(&self) -> Vec<&str> {
        self.speakers.iter().map(|s| s.id.as_str()).collect()
    }

    /// First id that appears more than once, if any.
    pub fn duplicate_id(&self) -> Option<&str> {
        let mut seen = HashSet::new();
        self.speakers
            .iter()
            .map(|s| s.id.as_str())
            .find(|id| !seen.insert(*id))
    }

    /// Check the catalog is usable by the generator.
    pub fn validate(&self) -> Result<()> {
        if self.speakers.len() < 2 {
            return Err(EraserError::config(format!(
                "catalog needs at least 2 speakers, found {}",
                self.speakers.len()
            )));
        }
        if let Some(id) = self.duplicate_id() {
            return Err(EraserError::config(format!("duplicate speaker id '{id}'")));
        }
        for speaker in &self.speakers {
            if speaker.id.trim().is_empty() {
                return Err(EraserError::config("speaker id must not be empty"));
            }
            if !(0.0..=100.0).contains(&speaker.calibration_center) {
                return Err(EraserError::config(format!(
                    "calibration center {} for '{}' is outside [0, 100]",
                    speaker.calibration_center, speaker.id
                )));
            }
        }
        Ok(())
    }
}
