//! # Configuration System
//!
//! Hierarchical TOML configuration for edpilot.
//!
//! ## Configuration Hierarchy
//!
//! Configuration is loaded in the following order (later sources override earlier ones):
//! 1. **Hardcoded defaults** - Built-in fallback values
//! 2. **User config** - `~/.edpilot/config.toml` (global user preferences)
//! 3. **Project config** - `./.edpilot/config.toml` (project-specific overrides)
//! 4. **CLI arguments** - Command-line flags (highest priority)
//!
//! ## Usage Example
//!
//! ```toml
//! # ./.edpilot/config.toml
//! [application]
//! command = "code"
//! window_title = "Visual Studio Code"
//!
//! [timing]
//! launch_wait_ms = 8000
//!
//! [readiness]
//! log_line = "Extension activated"
//!
//! [cleanup]
//! policy = "process_tree"
//! ```
//!
//! ## Loading Configuration
//!
//! ```rust,no_run
//! use edpilot_core::config::HarnessConfig;
//!
//! fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = HarnessConfig::load_hierarchy()?;
//!     println!("{}", config.application.command());
//!     Ok(())
//! }
//! ```

pub mod defaults;
pub mod loading;
pub mod types;
pub mod validation;

pub use types::{
    ApplicationConfig, CleanupConfig, CleanupPolicy, HarnessConfig, KeysConfig, PathsConfig,
    ReadinessConfig, TimingConfig,
};
pub use validation::validate_config;

impl HarnessConfig {
    /// Load configuration from the hierarchy of config files.
    ///
    /// See [`loading::load_hierarchy`] for details.
    pub fn load_hierarchy() -> Result<Self, crate::errors::ConfigError> {
        loading::load_hierarchy()
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), crate::errors::ConfigError> {
        validation::validate_config(self)
    }
}
