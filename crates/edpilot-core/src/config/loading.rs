//! Configuration loading and merging logic.
//!
//! Sources, later overriding earlier:
//! 1. **Hardcoded defaults**
//! 2. **User config** - `~/.edpilot/config.toml`
//! 3. **Project config** - `./.edpilot/config.toml`

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::types::{
    ApplicationConfig, CleanupConfig, HarnessConfig, KeysConfig, PathsConfig, ReadinessConfig,
    TimingConfig,
};
use crate::config::validation::validate_config;
use crate::errors::ConfigError;

const CONFIG_DIR: &str = ".edpilot";
const CONFIG_FILE: &str = "config.toml";

/// Load configuration from the hierarchy of config files.
///
/// # Errors
///
/// Returns an error if a present file cannot be read or parsed, or if
/// validation fails. Missing config files are not errors.
pub fn load_hierarchy() -> Result<HarnessConfig, ConfigError> {
    let mut config = HarnessConfig::default();

    if let Some(home_dir) = dirs::home_dir()
        && let Some(user_config) = load_optional(&home_dir.join(CONFIG_DIR).join(CONFIG_FILE))?
    {
        config = merge_configs(config, user_config);
    }

    let project_path = project_config_path(&std::env::current_dir()?);
    if let Some(project_config) = load_optional(&project_path)? {
        config = merge_configs(config, project_config);
    }

    validate_config(&config)?;

    Ok(config)
}

/// Load a config file, treating a missing file as `None`.
fn load_optional(path: &Path) -> Result<Option<HarnessConfig>, ConfigError> {
    match load_config_file(path) {
        Ok(config) => {
            info!(event = "core.config.file_loaded", path = %path.display());
            Ok(Some(config))
        }
        Err(ConfigError::IoError { source }) if source.kind() == ErrorKind::NotFound => {
            debug!(event = "core.config.file_missing", path = %path.display());
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Load a configuration file from the given path.
pub fn load_config_file(path: &Path) -> Result<HarnessConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => ConfigError::IoError { source },
        _ => ConfigError::ConfigReadError {
            path: path.display().to_string(),
            message: source.to_string(),
        },
    })?;
    toml::from_str(&content).map_err(|e| ConfigError::ConfigParseError {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Merge two configurations, with override_config taking precedence.
///
/// Optional fields are replaced only when the override sets them.
/// `extra_args` are concatenated, base first.
pub fn merge_configs(base: HarnessConfig, override_config: HarnessConfig) -> HarnessConfig {
    HarnessConfig {
        application: ApplicationConfig {
            executable: override_config
                .application
                .executable
                .or(base.application.executable),
            command: override_config.application.command.or(base.application.command),
            process_name: override_config
                .application
                .process_name
                .or(base.application.process_name),
            window_title: override_config
                .application
                .window_title
                .or(base.application.window_title),
            extra_args: {
                let mut args = base.application.extra_args;
                args.extend(override_config.application.extra_args);
                args
            },
        },
        paths: PathsConfig {
            extension_path: override_config
                .paths
                .extension_path
                .or(base.paths.extension_path),
            screenshots_dir: override_config
                .paths
                .screenshots_dir
                .or(base.paths.screenshots_dir),
            logs_dir: override_config.paths.logs_dir.or(base.paths.logs_dir),
        },
        timing: merge_timing(base.timing, override_config.timing),
        readiness: ReadinessConfig {
            marker_file: override_config
                .readiness
                .marker_file
                .or(base.readiness.marker_file),
            log_line: override_config.readiness.log_line.or(base.readiness.log_line),
        },
        cleanup: CleanupConfig {
            policy: override_config.cleanup.policy.or(base.cleanup.policy),
        },
        keys: KeysConfig {
            command_palette: override_config
                .keys
                .command_palette
                .or(base.keys.command_palette),
        },
    }
}

fn merge_timing(base: TimingConfig, over: TimingConfig) -> TimingConfig {
    TimingConfig {
        launch_wait_ms: over.launch_wait_ms.or(base.launch_wait_ms),
        connect_timeout_ms: over.connect_timeout_ms.or(base.connect_timeout_ms),
        stabilize_ms: over.stabilize_ms.or(base.stabilize_ms),
        poll_interval_ms: over.poll_interval_ms.or(base.poll_interval_ms),
        ready_threshold_ms: over.ready_threshold_ms.or(base.ready_threshold_ms),
        extension_timeout_ms: over.extension_timeout_ms.or(base.extension_timeout_ms),
        terminate_grace_ms: over.terminate_grace_ms.or(base.terminate_grace_ms),
        kill_grace_ms: over.kill_grace_ms.or(base.kill_grace_ms),
    }
}

/// Path of the project-level config file relative to a directory.
pub fn project_config_path(dir: &Path) -> PathBuf {
    dir.join(CONFIG_DIR).join(CONFIG_FILE)
}
