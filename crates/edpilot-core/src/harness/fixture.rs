use std::ops::{Deref, DerefMut};
use std::path::Path;

use tracing::{info, warn};

use super::controller::Harness;
use super::errors::FixtureError;
use crate::backend::{DesktopBackend, SystemBackend};
use crate::config::HarnessConfig;

const WORKSPACE_README: &str = "test.md";
const WORKSPACE_README_CONTENT: &str = "# Test Workspace\n\nFor E2E testing";

/// Scope guard owning a launched editor for the duration of one test.
///
/// On drop it captures `failure_<name>.png` if the test is panicking, then
/// closes the editor.
///
/// ```rust,no_run
/// use edpilot_core::{HarnessConfig, HarnessFixture};
///
/// let mut editor = HarnessFixture::launch("smoke", HarnessConfig::default()).unwrap();
/// assert!(editor.run_command("View: Toggle Terminal"));
/// ```
pub struct HarnessFixture<B: DesktopBackend = SystemBackend> {
    name: String,
    harness: Harness<B>,
}

impl HarnessFixture<SystemBackend> {
    /// Launch into the default test workspace
    pub fn launch(name: &str, config: HarnessConfig) -> Result<Self, FixtureError> {
        Self::launch_with_backend(name, config, SystemBackend, None)
    }

    /// Create `dir` with a `test.md` file and launch into it
    pub fn with_workspace(
        name: &str,
        config: HarnessConfig,
        dir: &Path,
    ) -> Result<Self, FixtureError> {
        Self::launch_with_backend(name, config, SystemBackend, Some(dir))
    }
}

impl<B: DesktopBackend> HarnessFixture<B> {
    pub fn launch_with_backend(
        name: &str,
        config: HarnessConfig,
        backend: B,
        workspace: Option<&Path>,
    ) -> Result<Self, FixtureError> {
        if let Some(dir) = workspace {
            prepare_workspace(dir)?;
        }

        let mut harness = Harness::with_backend(config, backend)?;

        if harness.config().cleanup.policy().sweeps_by_name() {
            harness.sweep_stragglers();
        }

        let options = harness.launch_options();
        let options = match workspace {
            Some(dir) => options.with_workspace(dir),
            None => options,
        };

        info!(event = "core.fixture.launch_started", name = name);
        if !harness.launch_with(&options) {
            let reason = harness
                .last_launch_failure()
                .map(ToString::to_string)
                .unwrap_or_else(|| "editor is not running".to_string());
            return Err(FixtureError::LaunchFailed {
                name: name.to_string(),
                reason,
            });
        }

        Ok(Self {
            name: name.to_string(),
            harness,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

fn prepare_workspace(dir: &Path) -> Result<(), FixtureError> {
    let to_error = |source| FixtureError::WorkspaceFailed {
        path: dir.to_path_buf(),
        source,
    };
    std::fs::create_dir_all(dir).map_err(to_error)?;
    std::fs::write(dir.join(WORKSPACE_README), WORKSPACE_README_CONTENT).map_err(to_error)
}

impl<B: DesktopBackend> Deref for HarnessFixture<B> {
    type Target = Harness<B>;

    fn deref(&self) -> &Self::Target {
        &self.harness
    }
}

impl<B: DesktopBackend> DerefMut for HarnessFixture<B> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.harness
    }
}

impl<B: DesktopBackend> Drop for HarnessFixture<B> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            let path = self
                .harness
                .take_screenshot(&format!("failure_{}.png", self.name));
            warn!(
                event = "core.fixture.failure_captured",
                name = %self.name,
                path = %path.display()
            );
        }
        self.harness.close();
    }
}
