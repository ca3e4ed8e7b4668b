use crate::config::types::HarnessConfig;
use crate::errors::ConfigError;
use crate::input::KeyCombo;

/// Validate the configuration.
///
/// # Errors
///
/// Returns `ConfigError::InvalidConfiguration` for empty identifiers, a zero
/// poll interval, or an unparseable command palette key combination.
pub fn validate_config(config: &HarnessConfig) -> Result<(), ConfigError> {
    if config.application.command().trim().is_empty() {
        return Err(invalid("application.command must not be empty"));
    }

    if config.application.window_title().trim().is_empty() {
        return Err(invalid("application.window_title must not be empty"));
    }

    if let Some(name) = &config.application.process_name
        && name.trim().is_empty()
    {
        return Err(invalid("application.process_name must not be empty"));
    }

    if config.timing.poll_interval_ms == Some(0) {
        return Err(invalid("timing.poll_interval_ms must be greater than 0"));
    }

    if let Some(line) = &config.readiness.log_line
        && line.is_empty()
    {
        return Err(invalid("readiness.log_line must not be empty"));
    }

    KeyCombo::parse(config.keys.command_palette()).map_err(|e| {
        invalid(&format!("keys.command_palette is not a valid key combination: {}", e))
    })?;

    Ok(())
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::InvalidConfiguration {
        message: message.to_string(),
    }
}
