//! Editor configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ConfigError;

/// Tunables for the editing engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
    /// Defer preview refreshes by the last measured render time.
    pub lazy_rendering: bool,
    /// Maximum number of undo entries kept.
    pub undo_capacity: usize,
    /// Same-mode edits closer together than this share one undo entry.
    pub coalesce_window_ms: u64,
    /// Upper bound for the adaptive preview delay.
    pub max_render_delay_ms: u64,
    /// Debounce before the pre-edit selection is captured for undo.
    pub selection_capture_delay_ms: u64,
    /// Cap on the margin kept between the caret and the viewport edges.
    pub max_scroll_adjust: f64,
    /// Text inserted by one indent step.
    pub indent_unit: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            lazy_rendering: false,
            undo_capacity: 100,
            coalesce_window_ms: 1000,
            max_render_delay_ms: 2000,
            selection_capture_delay_ms: 10,
            max_scroll_adjust: 130.0,
            indent_unit: "\t".to_owned(),
        }
    }
}

impl EditorConfig {
    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.undo_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "undo_capacity",
                reason: "must be at least 1",
            });
        }
        if self.indent_unit.is_empty() {
            return Err(ConfigError::Invalid {
                field: "indent_unit",
                reason: "must not be empty",
            });
        }
        if self.indent_unit.contains('\n') {
            return Err(ConfigError::Invalid {
                field: "indent_unit",
                reason: "must not contain a line break",
            });
        }
        Ok(())
    }

    pub fn coalesce_window(&self) -> Duration {
        Duration::from_millis(self.coalesce_window_ms)
    }

    pub fn max_render_delay(&self) -> Duration {
        Duration::from_millis(self.max_render_delay_ms)
    }

    pub fn selection_capture_delay(&self) -> Duration {
        Duration::from_millis(self.selection_capture_delay_ms)
    }
}
