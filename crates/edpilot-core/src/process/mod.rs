pub mod errors;
pub mod operations;
pub mod types;

pub use errors::ProcessError;
pub use operations::{
    find_processes_by_name, is_process_running, kill_process, kill_processes_by_name,
    process_name_matches, process_tree, terminate_process,
};
pub use types::{ProcessInfo, ProcessStatus};
