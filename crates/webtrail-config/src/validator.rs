//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::{Config, RESOLUTION_MODES};

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> Result<ValidationResult, ConfigError> {
        let mut result = ValidationResult::default();

        Self::validate_browser(config, &mut result);
        Self::validate_recorder(config, &mut result);
        Self::validate_compiler(config, &mut result);
        Self::validate_replay(config, &mut result);
        Self::validate_relaxation(config, &mut result);

        Ok(result)
    }

    fn validate_browser(config: &Config, result: &mut ValidationResult) {
        let browser = &config.browser;
        if browser.debug_port == 0 {
            result.add_error(ValidationError::new("browser.debug_port", "Port cannot be 0"));
        }
        if browser.viewport_width == 0 {
            result.add_error(ValidationError::new(
                "browser.viewport_width",
                "viewport_width must be greater than 0",
            ));
        }
        if browser.viewport_height == 0 {
            result.add_error(ValidationError::new(
                "browser.viewport_height",
                "viewport_height must be greater than 0",
            ));
        }
        if browser.request_timeout_secs == 0 {
            result.add_error(ValidationError::new(
                "browser.request_timeout_secs",
                "request_timeout_secs must be greater than 0",
            ));
        }
        if let Some(ref path) = browser.chrome_path {
            if !path.exists() {
                result.add_warning(ValidationWarning::new(
                    "browser.chrome_path",
                    format!("Chrome executable does not exist: {:?}", path),
                ));
            }
        }
    }

    fn validate_recorder(config: &Config, result: &mut ValidationResult) {
        let recorder = &config.recorder;
        if recorder.typing_debounce_ms < 100 {
            result.add_warning(ValidationWarning::new(
                "recorder.typing_debounce_ms",
                "typing_debounce_ms below 100 will split words into separate actions",
            ));
        }
        if recorder.backup_interval_ms == 0 {
            result.add_error(ValidationError::new(
                "recorder.backup_interval_ms",
                "backup_interval_ms must be greater than 0",
            ));
        }
        if recorder.context_padding_px < 0.0 {
            result.add_error(ValidationError::new(
                "recorder.context_padding_px",
                "context_padding_px cannot be negative",
            ));
        }
        if recorder.injection_retries == 0 {
            result.add_warning(ValidationWarning::new(
                "recorder.injection_retries",
                "injection_retries is 0, capture will not re-arm after navigation",
            ));
        }
        if recorder.stability_idle_ms > recorder.stability_timeout_ms {
            result.add_error(ValidationError::new(
                "recorder.stability_idle_ms",
                "stability_idle_ms cannot exceed stability_timeout_ms",
            ));
        }
    }

    fn validate_compiler(config: &Config, result: &mut ValidationResult) {
        let compiler = &config.compiler;
        if compiler.wait_min_ms > compiler.wait_max_ms {
            result.add_error(ValidationError::new(
                "compiler.wait_min_ms",
                "wait_min_ms cannot exceed wait_max_ms",
            ));
        }
        if !RESOLUTION_MODES.contains(&compiler.default_resolution_mode.as_str()) {
            result.add_error(ValidationError::new(
                "compiler.default_resolution_mode",
                format!(
                    "Unknown resolution mode '{}', valid values: {:?}",
                    compiler.default_resolution_mode, RESOLUTION_MODES
                ),
            ));
        }
    }

    fn validate_replay(config: &Config, result: &mut ValidationResult) {
        let replay = &config.replay;
        if replay.max_retries > 10 {
            result.add_warning(ValidationWarning::new(
                "replay.max_retries",
                "max_retries is very high (>10), failing actions will stall the run",
            ));
        }
        if replay.timeout_secs == Some(0) {
            result.add_error(ValidationError::new(
                "replay.timeout_secs",
                "timeout_secs must be greater than 0 when set",
            ));
        }
    }

    fn validate_relaxation(config: &Config, result: &mut ValidationResult) {
        let relax = &config.relaxation;
        for (path, value) in [
            ("relaxation.base_min_confidence", relax.base_min_confidence),
            ("relaxation.min_confidence_floor", relax.min_confidence_floor),
        ] {
            if !(0.0..=1.0).contains(&value) {
                result.add_error(ValidationError::new(path, "confidence must be within 0..=1"));
            }
        }
        if relax.min_confidence_floor > relax.base_min_confidence {
            result.add_error(ValidationError::new(
                "relaxation.min_confidence_floor",
                "min_confidence_floor cannot exceed base_min_confidence",
            ));
        }
        if relax.base_tolerance < 0.0 || relax.tolerance_step < 0.0 || relax.confidence_step < 0.0 {
            result.add_error(ValidationError::new(
                "relaxation",
                "tolerances and steps cannot be negative",
            ));
        }
        if relax.max_tolerance < relax.base_tolerance {
            result.add_error(ValidationError::new(
                "relaxation.max_tolerance",
                "max_tolerance cannot be below base_tolerance",
            ));
        }
        if relax.max_tolerance > 100.0 {
            result.add_warning(ValidationWarning::new(
                "relaxation.max_tolerance",
                "max_tolerance above 100% of the viewport matches anything",
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
