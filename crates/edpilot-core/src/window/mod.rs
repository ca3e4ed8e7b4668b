pub mod errors;
pub mod handler;
pub mod types;

pub use errors::WindowError;
pub use handler::{
    find_window_for_pids, find_window_for_pids_with_wait, list_windows, select_window,
};
pub use types::{WindowInfo, WindowMatch};
