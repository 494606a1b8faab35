//! Configuration system for the chart interaction layer
//! Holds debounce windows, DOM selectors, tooltip styling and formatting limits

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod validation;

pub use validation::ConfigValidator;

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Configuration parse error: {0}")]
    Parse(String),

    #[error("Configuration validation failed: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Complete interaction layer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct InteractionConfig {
    pub timing: TimingConfig,
    pub dom: DomConfig,
    pub tooltip: TooltipConfig,
    pub format: FormatConfig,
}

/// Debounce windows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TimingConfig {
    /// Quiet period before a container resize triggers a redraw
    pub resize_debounce_ms: u32,
    /// Quiet period before a dimension swap triggers a re-render
    pub dimension_swap_debounce_ms: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            resize_debounce_ms: 250,
            dimension_swap_debounce_ms: 100,
        }
    }
}

/// Selectors and names shared with the page markup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DomConfig {
    pub container_selector: String,
    pub tooltip_id: String,
    pub tooltip_class: String,
    pub dimension_swap_event: String,
}

impl Default for DomConfig {
    fn default() -> Self {
        Self {
            container_selector: ".viz-container".to_string(),
            tooltip_id: "chart-tooltip-singleton".to_string(),
            tooltip_class: "chart-tooltip".to_string(),
            dimension_swap_event: "dimensionSwap".to_string(),
        }
    }
}

/// Tooltip placement and hover highlight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TooltipConfig {
    /// Horizontal offset from the pointer in pixels
    pub offset_x: f64,
    /// Vertical offset from the pointer in pixels
    pub offset_y: f64,
    /// Strength of the default "darker" highlight (d3 semantics)
    pub highlight_darken: f64,
    /// Opacity applied when the tooltip is shown
    pub visible_opacity: f64,
}

impl Default for TooltipConfig {
    fn default() -> Self {
        Self {
            offset_x: 10.0,
            offset_y: -28.0,
            highlight_darken: 0.3,
            visible_opacity: 0.9,
        }
    }
}

/// Value and label formatting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormatConfig {
    pub label_max_length: usize,
    pub no_data_message: String,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            label_max_length: 25,
            no_data_message: "No data available to display".to_string(),
        }
    }
}

impl InteractionConfig {
    /// Parse and validate a JSON configuration. Missing keys take defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: InteractionConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        ConfigValidator::validate(&config)?;
        log::debug!("Loaded interaction config: {config:?}");
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}
