//! Desktop automation backends.
//!
//! [`DesktopBackend`] is the seam between the harness and the operating
//! system's window, keyboard, element and capture facilities.
//! [`SystemBackend`] drives the real desktop.

#[cfg(test)]
pub(crate) mod mock;
pub mod system;
pub mod traits;

pub use system::SystemBackend;
pub use traits::DesktopBackend;
