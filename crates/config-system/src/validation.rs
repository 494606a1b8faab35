//! Configuration validation utilities

use crate::{ConfigError, DomConfig, FormatConfig, InteractionConfig, Result, TimingConfig, TooltipConfig};

const MAX_DEBOUNCE_MS: u32 = 10_000;

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate a complete configuration
    pub fn validate(config: &InteractionConfig) -> Result<()> {
        Self::validate_timing(&config.timing)?;
        Self::validate_dom(&config.dom)?;
        Self::validate_tooltip(&config.tooltip)?;
        Self::validate_format(&config.format)?;
        Ok(())
    }

    fn validate_timing(timing: &TimingConfig) -> Result<()> {
        for (name, value) in [
            ("resize_debounce_ms", timing.resize_debounce_ms),
            ("dimension_swap_debounce_ms", timing.dimension_swap_debounce_ms),
        ] {
            if value == 0 || value > MAX_DEBOUNCE_MS {
                return Err(ConfigError::Validation(format!(
                    "Invalid {name}: {value}. Must be between 1 and {MAX_DEBOUNCE_MS}"
                )));
            }
        }
        Ok(())
    }

    fn validate_dom(dom: &DomConfig) -> Result<()> {
        for (name, value) in [
            ("container_selector", &dom.container_selector),
            ("tooltip_id", &dom.tooltip_id),
            ("tooltip_class", &dom.tooltip_class),
            ("dimension_swap_event", &dom.dimension_swap_event),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!("{name} cannot be empty")));
            }
        }

        // The tooltip class is used both as a selector and a class attribute
        if dom.tooltip_class.contains(char::is_whitespace) {
            return Err(ConfigError::Validation(format!(
                "tooltip_class must be a single class name, got '{}'",
                dom.tooltip_class
            )));
        }
        Ok(())
    }

    fn validate_tooltip(tooltip: &TooltipConfig) -> Result<()> {
        if !tooltip.offset_x.is_finite() || !tooltip.offset_y.is_finite() {
            return Err(ConfigError::Validation(
                "Tooltip offsets must be finite".to_string(),
            ));
        }

        if !(0.0..=5.0).contains(&tooltip.highlight_darken) {
            return Err(ConfigError::Validation(format!(
                "Invalid highlight_darken: {}. Must be between 0.0 and 5.0",
                tooltip.highlight_darken
            )));
        }

        if !(0.0..=1.0).contains(&tooltip.visible_opacity) {
            return Err(ConfigError::Validation(format!(
                "Invalid visible_opacity: {}. Must be between 0.0 and 1.0",
                tooltip.visible_opacity
            )));
        }
        Ok(())
    }

    fn validate_format(format: &FormatConfig) -> Result<()> {
        if format.label_max_length == 0 {
            return Err(ConfigError::Validation(
                "label_max_length must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
