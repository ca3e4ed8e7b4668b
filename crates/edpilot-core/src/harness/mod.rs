//! The test harness controller.
//!
//! [`Harness`] owns one editor process from launch to close and exposes the
//! interaction primitives a GUI test needs. [`HarnessFixture`] wraps it as a
//! scope guard for use inside `#[test]` functions.

pub mod controller;
pub mod errors;
pub mod fixture;
pub mod readiness;
#[cfg(all(test, unix))]
pub(crate) mod test_support;
pub mod types;

pub use controller::Harness;
pub use errors::{FixtureError, SetupError};
pub use fixture::HarnessFixture;
pub use readiness::ReadinessTiming;
pub use types::{HarnessState, InteractionDelays, ReadinessSignal};
