//! edpilot-core: Core library for driving an editor through GUI tests
//!
//! This library launches an editor with an extension under development,
//! locates its window, sends it keystrokes, inspects its UI text, captures
//! screenshots and tears everything down again. It is used by the CLI and
//! directly from `#[test]` functions.
//!
//! # Main Entry Points
//!
//! - [`harness`] - The `Harness` controller and `HarnessFixture` guard
//! - [`config`] - Configuration management
//! - [`backend`] - Desktop automation backends
//! - [`process`] - Process tree inspection and cleanup

pub mod backend;
pub mod config;
pub mod element;
pub mod errors;
pub mod events;
pub mod harness;
pub mod input;
pub mod launch;
pub mod logging;
pub mod process;
pub mod screenshot;
pub mod window;

// Re-export commonly used types at crate root for convenience
pub use backend::{DesktopBackend, SystemBackend};
pub use config::{CleanupPolicy, HarnessConfig};
pub use errors::{ConfigError, HarnessError, HarnessResult};
pub use harness::{
    FixtureError, Harness, HarnessFixture, HarnessState, InteractionDelays, ReadinessSignal,
    SetupError,
};
pub use input::{InputError, KeyCombo};
pub use launch::{LaunchFailure, LaunchOptions};
pub use window::WindowInfo;

// Re-export logging initialization
pub use logging::init_logging;
