pub mod errors;
pub mod operations;
pub mod types;

pub use errors::LaunchError;
pub use operations::{
    build_launch_args, ensure_workspace, extension_entry_compiled, probe_version,
    resolve_executable, resolve_extension_path,
};
pub use types::{LaunchFailure, LaunchOptions, LaunchPaths, VersionProbe};
