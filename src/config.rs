// Editor configuration, loaded from RON

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("RON error: {0}")]
    Ron(#[from] ron::error::SpannedError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Timing values used when baking the runtime chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Shortest time a note occupies for judgement, in seconds
    pub minimum_judge_window: f64,
    /// Notes closer than this (seconds) count as simultaneous
    pub simultaneous_epsilon: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            minimum_judge_window: 0.16,
            simultaneous_epsilon: 0.001,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Drags shorter than this (pixels) are treated as clicks
    pub min_drag_distance: f32,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            min_drag_distance: 0.0,
        }
    }
}

/// Ring buffer capacities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessagingConfig {
    pub event_capacity: usize,
    pub edit_capacity: usize,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            event_capacity: 256,
            edit_capacity: 64,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub timing: TimingConfig,
    pub selection: SelectionConfig,
    pub messaging: MessagingConfig,
}

impl EditorConfig {
    /// Parse and validate a RON document
    pub fn from_ron_str(content: &str) -> Result<EditorConfig, ConfigError> {
        let config: EditorConfig = ron::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a RON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<EditorConfig, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_ron_str(&content)?;
        log::info!("Loaded editor config from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let window = self.timing.minimum_judge_window;
        if !window.is_finite() || window < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "minimum_judge_window must be >= 0 (found {})",
                window
            )));
        }

        let epsilon = self.timing.simultaneous_epsilon;
        if !epsilon.is_finite() || epsilon < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "simultaneous_epsilon must be >= 0 (found {})",
                epsilon
            )));
        }

        let distance = self.selection.min_drag_distance;
        if !distance.is_finite() || distance < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "min_drag_distance must be >= 0 (found {})",
                distance
            )));
        }

        if self.messaging.event_capacity == 0 || self.messaging.edit_capacity == 0 {
            return Err(ConfigError::Invalid(
                "Channel capacities must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
